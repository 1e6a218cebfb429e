//! 查询图描述文件
//!
//! 用 TOML 描述查询图，供命令行工具与测试使用：
//!
//! ```toml
//! [[relation]]
//! name = "A"
//! rows = 5
//!
//! [[relation]]
//! name = "C"
//! rows = 8
//!
//! [[join]]
//! relations = ["A", "C"]
//! condition = "A.id = C.aid"
//! selectivity = 0.1
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::cnf::Cnf;
use super::query_graph::{QueryGraph, QueryGraphBuilder};
use crate::core::{GraphError, GraphResult};

/// 关系描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationSpec {
    pub name: String,
    /// 基表名，缺省与 `name` 相同
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    pub rows: u64,
}

/// 连接谓词描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinSpec {
    pub relations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectivity: Option<f64>,
}

/// 查询图描述
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphSpec {
    #[serde(default, rename = "relation")]
    pub relations: Vec<RelationSpec>,
    #[serde(default, rename = "join")]
    pub joins: Vec<JoinSpec>,
}

impl GraphSpec {
    /// 构建查询图
    pub fn build(&self) -> GraphResult<QueryGraph> {
        let mut builder = QueryGraphBuilder::new();
        for rel in &self.relations {
            let table = rel.table.clone().unwrap_or_else(|| rel.name.clone());
            builder.add_base_table(rel.name.clone(), table, rel.rows)?;
        }
        for join in &self.joins {
            let aliases: Vec<&str> = join.relations.iter().map(String::as_str).collect();
            let condition = match &join.condition {
                Some(text) => Cnf::parse(text),
                None => Cnf::parse(&default_condition(&aliases)),
            };
            builder.add_join(&aliases, condition, join.selectivity)?;
        }
        Ok(builder.build())
    }

    /// 序列化为 TOML 文本
    pub fn to_toml(&self) -> GraphResult<String> {
        toml::to_string_pretty(self).map_err(|e| GraphError::Parse(e.to_string()))
    }

    /// 随机生成指定形状的连通查询图
    pub fn random(shape: GraphShape, num_relations: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let relations: Vec<RelationSpec> = (0..num_relations)
            .map(|i| RelationSpec {
                name: relation_name(i),
                table: None,
                rows: rng.gen_range(10..=10_000),
            })
            .collect();

        let mut edges: Vec<(usize, usize)> = Vec::new();
        match shape {
            GraphShape::Chain => {
                edges.extend((1..num_relations).map(|i| (i - 1, i)));
            }
            GraphShape::Cycle => {
                edges.extend((1..num_relations).map(|i| (i - 1, i)));
                if num_relations > 2 {
                    edges.push((0, num_relations - 1));
                }
            }
            GraphShape::Star => {
                edges.extend((1..num_relations).map(|i| (0, i)));
            }
            GraphShape::Clique => {
                for i in 0..num_relations {
                    edges.extend((i + 1..num_relations).map(|j| (i, j)));
                }
            }
            GraphShape::Random => {
                // 随机生成树保证连通，再以一定概率补充边
                for i in 1..num_relations {
                    edges.push((rng.gen_range(0..i), i));
                }
                for i in 0..num_relations {
                    for j in i + 1..num_relations {
                        if !edges.contains(&(i, j)) && rng.gen_bool(0.2) {
                            edges.push((i, j));
                        }
                    }
                }
            }
        }

        let joins = edges
            .into_iter()
            .map(|(i, j)| JoinSpec {
                relations: vec![relation_name(i), relation_name(j)],
                condition: None,
                selectivity: Some(rng.gen_range(0.001..0.5)),
            })
            .collect();

        Self { relations, joins }
    }
}

/// 解析 TOML 文本
pub fn parse_query_graph(text: &str) -> GraphResult<QueryGraph> {
    let spec: GraphSpec = toml::from_str(text)?;
    spec.build()
}

/// 从文件加载查询图
pub fn load_query_graph<P: AsRef<Path>>(path: P) -> GraphResult<QueryGraph> {
    let content = std::fs::read_to_string(path)?;
    parse_query_graph(&content)
}

/// 随机查询图的形状
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphShape {
    Chain,
    Cycle,
    Star,
    Clique,
    Random,
}

impl GraphShape {
    pub fn name(&self) -> &'static str {
        match self {
            GraphShape::Chain => "chain",
            GraphShape::Cycle => "cycle",
            GraphShape::Star => "star",
            GraphShape::Clique => "clique",
            GraphShape::Random => "random",
        }
    }
}

impl fmt::Display for GraphShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for GraphShape {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chain" => Ok(GraphShape::Chain),
            "cycle" => Ok(GraphShape::Cycle),
            "star" => Ok(GraphShape::Star),
            "clique" => Ok(GraphShape::Clique),
            "random" => Ok(GraphShape::Random),
            other => Err(GraphError::Parse(format!("未知的图形状: {}", other))),
        }
    }
}

/// 第 `i` 个关系的名称：R0, R1, ...
fn relation_name(i: usize) -> String {
    format!("R{}", i)
}

fn default_condition(aliases: &[&str]) -> String {
    aliases
        .windows(2)
        .map(|w| format!("{}.id = {}.id", w[0], w[1]))
        .collect::<Vec<_>>()
        .join(" AND ")
}

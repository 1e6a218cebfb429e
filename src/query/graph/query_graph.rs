//! 查询图模块
//!
//! 查询图由前端（语法解析与语义分析）构建，优化器只读取它：
//! - 关系按顺序编号，id 即在 `sources` 中的位置
//! - 每个连接谓词携带规范化条件和它引用的关系集合
//! - 邻接矩阵在构建时计算一次
//!
//! ## 使用示例
//!
//! ```rust
//! use joinopt::query::graph::{Cnf, QueryGraphBuilder};
//!
//! let mut builder = QueryGraphBuilder::new();
//! builder.add_base_table("A", "A", 5).unwrap();
//! builder.add_base_table("C", "C", 8).unwrap();
//! builder.add_join(&["A", "C"], Cnf::parse("A.id = C.aid"), None).unwrap();
//! let graph = builder.build();
//! assert!(graph.is_connected());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::adjacency::AdjacencyMatrix;
use super::cnf::Cnf;
use crate::core::{GraphError, GraphResult, Subproblem};

/// 查询图的全局唯一编号，用于识别计划表所属的图
static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(1);

/// 数据源类型
#[derive(Debug, Clone)]
pub enum DataSourceKind {
    /// 基表
    BaseTable { table: String },
    /// 嵌套子查询
    Query { graph: Box<QueryGraph> },
}

/// 数据源（查询中的一个关系）
#[derive(Debug, Clone)]
pub struct DataSource {
    id: usize,
    alias: String,
    kind: DataSourceKind,
    /// 前端从目录统计信息中读取的行数
    num_rows: u64,
}

impl DataSource {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn kind(&self) -> &DataSourceKind {
        &self.kind
    }

    pub fn num_rows(&self) -> u64 {
        self.num_rows
    }

    pub fn is_base_table(&self) -> bool {
        matches!(self.kind, DataSourceKind::BaseTable { .. })
    }

    /// 单元素子问题
    pub fn subproblem(&self) -> Subproblem {
        Subproblem::singleton(self.id)
    }
}

/// 连接谓词
#[derive(Debug, Clone)]
pub struct Join {
    sources: Subproblem,
    condition: Cnf,
    /// 前端给出的选择性提示（0.0 ~ 1.0）
    selectivity: Option<f64>,
}

impl Join {
    /// 谓词引用的关系集合
    pub fn sources(&self) -> Subproblem {
        self.sources
    }

    pub fn condition(&self) -> &Cnf {
        &self.condition
    }

    pub fn selectivity(&self) -> Option<f64> {
        self.selectivity
    }
}

/// 查询图
#[derive(Debug, Clone)]
pub struct QueryGraph {
    id: u64,
    sources: Vec<DataSource>,
    joins: Vec<Join>,
    adjacency: AdjacencyMatrix,
}

impl QueryGraph {
    /// 图编号（同一进程内唯一）
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn num_sources(&self) -> usize {
        self.sources.len()
    }

    pub fn sources(&self) -> &[DataSource] {
        &self.sources
    }

    pub fn source(&self, id: usize) -> &DataSource {
        &self.sources[id]
    }

    pub fn source_by_alias(&self, alias: &str) -> Option<&DataSource> {
        self.sources.iter().find(|s| s.alias == alias)
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn adjacency_matrix(&self) -> &AdjacencyMatrix {
        &self.adjacency
    }

    /// 包含全部关系的子问题
    pub fn all(&self) -> Subproblem {
        Subproblem::all(self.sources.len())
    }

    /// 整个查询图是否连通
    pub fn is_connected(&self) -> bool {
        self.adjacency.is_connected(self.all())
    }

    /// `left` 与 `right` 连接时适用的谓词视图
    pub fn join_condition(&self, left: Subproblem, right: Subproblem) -> JoinCondition<'_> {
        JoinCondition {
            joins: &self.joins,
            left,
            right,
        }
    }

    /// 根据别名列表构造子问题
    pub fn subproblem_of(&self, aliases: &[&str]) -> GraphResult<Subproblem> {
        aliases.iter().try_fold(Subproblem::empty(), |acc, alias| {
            self.source_by_alias(alias)
                .map(|s| acc | s.subproblem())
                .ok_or_else(|| GraphError::UnknownRelation(alias.to_string()))
        })
    }

    /// 以别名形式显示子问题，例如 `{A,C}`
    pub fn display(&self, s: Subproblem) -> String {
        let names: Vec<&str> = s
            .iter()
            .filter(|id| *id < self.sources.len())
            .map(|id| self.sources[id].alias.as_str())
            .collect();
        format!("{{{}}}", names.join(","))
    }
}

/// 查询图构建器
#[derive(Debug, Default)]
pub struct QueryGraphBuilder {
    sources: Vec<DataSource>,
    aliases: HashMap<String, usize>,
    joins: Vec<Join>,
}

impl QueryGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加基表，返回关系 id
    pub fn add_base_table(
        &mut self,
        alias: impl Into<String>,
        table: impl Into<String>,
        num_rows: u64,
    ) -> GraphResult<usize> {
        self.add_source(
            alias.into(),
            DataSourceKind::BaseTable {
                table: table.into(),
            },
            num_rows,
        )
    }

    /// 添加嵌套子查询，`num_rows` 为其结果行数估计
    pub fn add_query(
        &mut self,
        alias: impl Into<String>,
        graph: QueryGraph,
        num_rows: u64,
    ) -> GraphResult<usize> {
        self.add_source(
            alias.into(),
            DataSourceKind::Query {
                graph: Box::new(graph),
            },
            num_rows,
        )
    }

    fn add_source(
        &mut self,
        alias: String,
        kind: DataSourceKind,
        num_rows: u64,
    ) -> GraphResult<usize> {
        if self.sources.len() >= Subproblem::CAPACITY {
            return Err(GraphError::TooManyRelations {
                count: self.sources.len() + 1,
                max: Subproblem::CAPACITY,
            });
        }
        if self.aliases.contains_key(&alias) {
            return Err(GraphError::DuplicateRelation(alias));
        }
        let id = self.sources.len();
        self.aliases.insert(alias.clone(), id);
        self.sources.push(DataSource {
            id,
            alias,
            kind,
            num_rows,
        });
        Ok(id)
    }

    /// 按别名添加连接谓词
    pub fn add_join(
        &mut self,
        aliases: &[&str],
        condition: Cnf,
        selectivity: Option<f64>,
    ) -> GraphResult<()> {
        let mut sources = Subproblem::empty();
        for alias in aliases {
            let id = self
                .aliases
                .get(*alias)
                .ok_or_else(|| GraphError::UnknownRelation(alias.to_string()))?;
            sources |= Subproblem::singleton(*id);
        }
        self.add_join_between(sources, condition, selectivity)
    }

    /// 按关系集合添加连接谓词
    pub fn add_join_between(
        &mut self,
        sources: Subproblem,
        condition: Cnf,
        selectivity: Option<f64>,
    ) -> GraphResult<()> {
        if sources.size() < 2 {
            return Err(GraphError::InvalidJoin(format!(
                "谓词 `{}` 引用的关系少于两个",
                condition
            )));
        }
        if !sources.is_subset_of(Subproblem::all(self.sources.len())) {
            return Err(GraphError::UnknownRelation(sources.to_string()));
        }
        self.joins.push(Join {
            sources,
            condition,
            selectivity: selectivity.map(|s| s.clamp(0.0, 1.0)),
        });
        Ok(())
    }

    pub fn num_sources(&self) -> usize {
        self.sources.len()
    }

    /// 构建查询图并计算邻接矩阵
    pub fn build(self) -> QueryGraph {
        let mut adjacency = AdjacencyMatrix::new(self.sources.len());
        for join in &self.joins {
            adjacency.connect_all(join.sources);
        }
        QueryGraph {
            id: NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed),
            sources: self.sources,
            joins: self.joins,
            adjacency,
        }
    }
}

/// 一对子问题之间的连接条件视图
///
/// 只借用查询图中的谓词，不分配内存；包含所有引用关系落在
/// `left | right` 内且同时触及两侧的谓词。
#[derive(Debug, Clone, Copy)]
pub struct JoinCondition<'a> {
    joins: &'a [Join],
    left: Subproblem,
    right: Subproblem,
}

impl<'a> JoinCondition<'a> {
    pub fn left(&self) -> Subproblem {
        self.left
    }

    pub fn right(&self) -> Subproblem {
        self.right
    }

    /// 适用的连接谓词
    pub fn iter(&self) -> impl Iterator<Item = &'a Join> {
        let (joins, left, right) = (self.joins, self.left, self.right);
        let both = left | right;
        joins.iter().filter(move |j| {
            j.sources.is_subset_of(both) && j.sources.intersects(left) && j.sources.intersects(right)
        })
    }

    /// 没有适用谓词（即笛卡尔积）
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// 物化为 CNF
    pub fn to_cnf(&self) -> Cnf {
        self.iter()
            .fold(Cnf::new(), |acc, join| acc.and(&join.condition))
    }
}

impl fmt::Display for JoinCondition<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_cnf())
    }
}

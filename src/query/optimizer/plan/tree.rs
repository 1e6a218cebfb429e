//! 连接树
//!
//! 从计划表的根条目沿 `left`/`right` 递归重建的二元连接树。

use std::fmt;
use std::fmt::Write;

use serde::Serialize;

use super::table::PlanTable;
use crate::core::Subproblem;
use crate::query::graph::dot::escape;
use crate::query::graph::QueryGraph;
use crate::query::optimizer::cost::CardinalityEstimator;

/// 二元连接树
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JoinTree {
    /// 单个关系
    Leaf {
        id: usize,
        alias: String,
        cost: f64,
        cardinality: f64,
    },
    /// 连接两个子树
    Join {
        subproblem: Subproblem,
        cost: f64,
        cardinality: f64,
        left: Box<JoinTree>,
        right: Box<JoinTree>,
    },
}

impl JoinTree {
    /// 重建子问题 `s` 的连接树；`s` 或任何子计划缺失时返回 `None`
    pub fn build(
        graph: &QueryGraph,
        plan_table: &PlanTable,
        estimator: &dyn CardinalityEstimator,
        s: Subproblem,
    ) -> Option<JoinTree> {
        let entry = plan_table.get(s)?;
        let cardinality = estimator.predict_cardinality(entry.model.as_ref());
        if s.size() == 1 {
            let id = s.lowest_id()?;
            return Some(JoinTree::Leaf {
                id,
                alias: graph.source(id).alias().to_string(),
                cost: entry.cost,
                cardinality,
            });
        }
        if entry.is_base_case() {
            return None;
        }
        let left = Self::build(graph, plan_table, estimator, entry.left)?;
        let right = Self::build(graph, plan_table, estimator, entry.right)?;
        Some(JoinTree::Join {
            subproblem: s,
            cost: entry.cost,
            cardinality,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn subproblem(&self) -> Subproblem {
        match self {
            JoinTree::Leaf { id, .. } => Subproblem::singleton(*id),
            JoinTree::Join { subproblem, .. } => *subproblem,
        }
    }

    /// 子树总代价，叶子为计划表中的扫描代价
    pub fn cost(&self) -> f64 {
        match self {
            JoinTree::Leaf { cost, .. } | JoinTree::Join { cost, .. } => *cost,
        }
    }

    pub fn cardinality(&self) -> f64 {
        match self {
            JoinTree::Leaf { cardinality, .. } | JoinTree::Join { cardinality, .. } => *cardinality,
        }
    }

    /// 树高，叶子为 0
    pub fn depth(&self) -> usize {
        match self {
            JoinTree::Leaf { .. } => 0,
            JoinTree::Join { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// 从左到右的叶子别名
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            JoinTree::Leaf { alias, .. } => out.push(alias),
            JoinTree::Join { left, right, .. } => {
                left.collect_leaves(out);
                right.collect_leaves(out);
            }
        }
    }

    /// 每个连接的右输入都是单个关系
    pub fn is_left_deep(&self) -> bool {
        match self {
            JoinTree::Leaf { .. } => true,
            JoinTree::Join { left, right, .. } => {
                matches!(**right, JoinTree::Leaf { .. }) && left.is_left_deep()
            }
        }
    }

    /// 以 Graphviz DOT 格式渲染
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "digraph join_tree {{");
        let _ = writeln!(out, "    node [shape=box];");
        let mut next_id = 0;
        self.write_dot(&mut out, &mut next_id);
        let _ = writeln!(out, "}}");
        out
    }

    fn write_dot(&self, out: &mut String, next_id: &mut usize) -> usize {
        let id = *next_id;
        *next_id += 1;
        match self {
            JoinTree::Leaf {
                alias, cardinality, ..
            } => {
                let _ = writeln!(
                    out,
                    "    n{} [label=\"{}\\n{:.0} rows\", style=rounded];",
                    id,
                    escape(alias),
                    cardinality
                );
            }
            JoinTree::Join {
                cost,
                cardinality,
                left,
                right,
                ..
            } => {
                let _ = writeln!(
                    out,
                    "    n{} [label=\"⋈\\ncost {:.2}\\n{:.0} rows\"];",
                    id, cost, cardinality
                );
                let l = left.write_dot(out, next_id);
                let r = right.write_dot(out, next_id);
                let _ = writeln!(out, "    n{} -> n{};", id, l);
                let _ = writeln!(out, "    n{} -> n{};", id, r);
            }
        }
        id
    }
}

impl fmt::Display for JoinTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinTree::Leaf { alias, .. } => write!(f, "{}", alias),
            JoinTree::Join { left, right, .. } => write!(f, "({} ⋈ {})", left, right),
        }
    }
}

impl PlanTable {
    /// 重建全部关系的连接树
    pub fn join_tree(
        &self,
        graph: &QueryGraph,
        estimator: &dyn CardinalityEstimator,
    ) -> Option<JoinTree> {
        JoinTree::build(graph, self, estimator, graph.all())
    }
}

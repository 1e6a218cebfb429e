//! 连接顺序枚举策略模块
//!
//! 所有枚举器实现同一个 `PlanEnumerator` 接口，在位集编码的子问题
//! 空间上填充计划表。
//!
//! ## 模块结构
//!
//! - `dp_size` - 按子问题大小自底向上的动态规划（DPsize、DPsizeOpt、DPsizeSub）
//! - `dp_sub` - 按子集数值顺序的动态规划（DPsub、DPsubOpt）
//! - `dp_ccp` - 基于连通子图/补图对的动态规划（DPccp）
//! - `top_down` - 记忆化自顶向下枚举（TDbasic、TDMinCutAGaT）
//! - `greedy` - 贪心启发式（GOO、TDGOO）
//!
//! 约定：
//! - 只为连通子问题创建条目，不产生笛卡尔积
//! - 只从连通子问题的条目读取子计划，计划表中残留的非连通条目既不读取也不修改
//! - 候选划分必须严格更优才会替换已有条目

pub mod dp_ccp;
pub mod dp_size;
pub mod dp_sub;
pub mod greedy;
pub mod top_down;

use std::fmt;

use log::debug;

use crate::core::Subproblem;
use crate::query::graph::QueryGraph;
use crate::query::optimizer::cost::{CardinalityEstimator, CostFunction};
use crate::query::optimizer::plan::PlanTable;

pub use dp_ccp::DPccp;
pub use dp_size::{DPsize, DPsizeOpt, DPsizeSub};
pub use dp_sub::{DPsub, DPsubOpt};
pub use greedy::{Goo, TdGoo};
pub use top_down::{TDbasic, TDMinCutAGaT};

/// 连接顺序枚举器
pub trait PlanEnumerator: fmt::Debug + Send + Sync {
    /// 注册名称
    fn name(&self) -> &'static str;

    /// 是否保证为每个连通子问题找到最优计划
    fn is_exhaustive(&self) -> bool {
        true
    }

    /// 填充计划表
    ///
    /// # Panics
    /// 关系数超过 64，或计划表缺少某个关系的基础情形时 panic
    fn enumerate(
        &self,
        graph: &QueryGraph,
        cost_function: &dyn CostFunction,
        estimator: &dyn CardinalityEstimator,
        plan_table: &mut PlanTable,
    );
}

/// 一次枚举的共享状态：模型引用与统计
pub(crate) struct Enumeration<'a> {
    pub graph: &'a QueryGraph,
    pub cost_function: &'a dyn CostFunction,
    pub estimator: &'a dyn CardinalityEstimator,
    considered: u64,
    updated: u64,
}

impl<'a> Enumeration<'a> {
    /// 检查前置条件并开始一次枚举
    pub fn begin(
        graph: &'a QueryGraph,
        cost_function: &'a dyn CostFunction,
        estimator: &'a dyn CardinalityEstimator,
        plan_table: &PlanTable,
    ) -> Self {
        assert!(
            graph.num_sources() <= Subproblem::CAPACITY,
            "关系数量 {} 超出上限 {}",
            graph.num_sources(),
            Subproblem::CAPACITY
        );
        plan_table.assert_base_case(graph);
        Self {
            graph,
            cost_function,
            estimator,
            considered: 0,
            updated: 0,
        }
    }

    pub fn is_connected(&self, s: Subproblem) -> bool {
        self.graph.adjacency_matrix().is_connected(s)
    }

    pub fn is_adjacent(&self, left: Subproblem, right: Subproblem) -> bool {
        self.graph.adjacency_matrix().is_connected_between(left, right)
    }

    pub fn neighbors(&self, s: Subproblem) -> Subproblem {
        self.graph.adjacency_matrix().neighbors(s)
    }

    /// 子问题已有可用的计划：有条目且连通
    pub fn is_solved(&self, plan_table: &PlanTable, s: Subproblem) -> bool {
        plan_table.has_plan(s) && (s.size() == 1 || self.is_connected(s))
    }

    /// 考察以 `left` 为左输入、`right` 为右输入的连接
    pub fn consider(&mut self, plan_table: &mut PlanTable, left: Subproblem, right: Subproblem) {
        self.considered += 1;
        let s = left | right;
        let condition = self.graph.join_condition(left, right);
        let cost = self.cost_function.calculate_join_cost(
            self.graph,
            plan_table,
            self.estimator,
            left,
            right,
            &condition,
        );
        if !plan_table.improves(s, cost) {
            return;
        }
        let model = self.estimator.estimate_join(
            self.graph,
            plan_table.model(left),
            plan_table.model(right),
            &condition,
        );
        if plan_table.update_best(s, left, right, cost, model) {
            self.updated += 1;
        }
    }

    /// 两个方向都考察
    pub fn consider_both(&mut self, plan_table: &mut PlanTable, s1: Subproblem, s2: Subproblem) {
        self.consider(plan_table, s1, s2);
        self.consider(plan_table, s2, s1);
    }

    /// 预测连接后的基数，不写入计划表
    pub fn predict_join(&self, plan_table: &PlanTable, left: Subproblem, right: Subproblem) -> f64 {
        let condition = self.graph.join_condition(left, right);
        let model = self.estimator.estimate_join(
            self.graph,
            plan_table.model(left),
            plan_table.model(right),
            &condition,
        );
        self.estimator.predict_cardinality(model.as_ref())
    }

    pub fn finish(self, name: &str, plan_table: &PlanTable) {
        debug!(
            "{} 枚举完成: {} 个关系, 考察 {} 个候选, 更新 {} 次, 计划表 {} 项",
            name,
            self.graph.num_sources(),
            self.considered,
            self.updated,
            plan_table.len()
        );
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::PlanEnumerator;
    use crate::core::Subproblem;
    use crate::query::graph::{Cnf, QueryGraph, QueryGraphBuilder};
    use crate::query::optimizer::cost::{CartesianProductEstimator, CostFunctionCout};
    use crate::query::optimizer::plan::PlanTable;

    fn build(rows: [u64; 4], edges: &[(&str, &str)]) -> QueryGraph {
        let mut builder = QueryGraphBuilder::new();
        for (name, rows) in ["A", "B", "C", "D"].into_iter().zip(rows) {
            builder.add_base_table(name, name, rows).unwrap();
        }
        for &(l, r) in edges {
            let text = format!("{}.id = {}.id", l, r);
            builder.add_join(&[l, r], Cnf::parse(&text), None).unwrap();
        }
        builder.build()
    }

    /// A–C, A–D, B–D, C–D
    pub fn cyclic_asymmetric() -> QueryGraph {
        build([5, 10, 8, 12], &[("A", "C"), ("A", "D"), ("B", "D"), ("C", "D")])
    }

    /// A–B, B–C, C–D, D–A
    pub fn symmetric() -> QueryGraph {
        build([5, 8, 10, 12], &[("A", "B"), ("B", "C"), ("C", "D"), ("D", "A")])
    }

    pub fn run(enumerator: &dyn PlanEnumerator, graph: &QueryGraph) -> PlanTable {
        let estimator = CartesianProductEstimator::new();
        let mut pt = PlanTable::new(graph);
        pt.init_base_case(graph, &estimator);
        enumerator.enumerate(graph, &CostFunctionCout::new(), &estimator, &mut pt);
        pt
    }

    pub fn set(graph: &QueryGraph, aliases: &[&str]) -> Subproblem {
        graph.subproblem_of(aliases).unwrap()
    }

    /// 条目 `s` 的划分（不区分左右）是否为 `{l, r}`
    pub fn has_split(pt: &PlanTable, s: Subproblem, l: Subproblem, r: Subproblem) -> bool {
        let entry = pt.entry(s);
        (entry.left == l && entry.right == r) || (entry.left == r && entry.right == l)
    }

    /// 检查穷举算法在环形非对称图上的结果
    pub fn assert_cyclic_optimum(enumerator: &dyn PlanEnumerator) {
        let g = cyclic_asymmetric();
        let pt = run(enumerator, &g);
        let s = |aliases: &[&str]| set(&g, aliases);

        // 4 个基础情形 + AC, AD, BD, CD, ABD, ACD, BCD, ABCD
        assert_eq!(pt.len(), 12, "{}", enumerator.name());
        assert!(has_split(&pt, s(&["A", "B", "D"]), s(&["B"]), s(&["A", "D"])));
        assert!(has_split(&pt, s(&["A", "C", "D"]), s(&["A", "C"]), s(&["D"])));
        assert!(has_split(&pt, s(&["B", "C", "D"]), s(&["B"]), s(&["C", "D"])));
        assert!(has_split(&pt, g.all(), s(&["A", "C"]), s(&["B", "D"])));
        assert_eq!(pt.cost(g.all()), 195.0);
        assert!(!pt.has_plan(s(&["A", "B"])));
        assert!(!pt.has_plan(s(&["A", "B", "C"])));
    }
}

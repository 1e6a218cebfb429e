//! 连接代价函数
//!
//! 代价函数只读取计划表中 `left` 和 `right` 两个条目，
//! 通过估计器把它们的模型换算成行数。

use std::fmt;

use super::config::CostModelConfig;
use super::estimate::CardinalityEstimator;
use crate::core::Subproblem;
use crate::query::graph::{JoinCondition, QueryGraph};
use crate::query::optimizer::plan::PlanTable;

/// 连接代价函数
pub trait CostFunction: fmt::Debug + Send + Sync {
    /// 注册名称
    fn name(&self) -> &'static str;

    /// 计算以 `left` 为左输入、`right` 为右输入的连接代价（包含子计划代价）
    fn calculate_join_cost(
        &self,
        graph: &QueryGraph,
        plan_table: &PlanTable,
        estimator: &dyn CardinalityEstimator,
        left: Subproblem,
        right: Subproblem,
        condition: &JoinCondition<'_>,
    ) -> f64;

    /// 代价是否单调：连接代价不低于 `cost(left) + cost(right)`
    ///
    /// 单调的代价函数允许枚举器按下界剪枝
    fn is_monotone(&self) -> bool {
        false
    }
}

/// C_out：中间结果基数之和
#[derive(Debug, Clone, Copy, Default)]
pub struct CostFunctionCout;

impl CostFunctionCout {
    pub fn new() -> Self {
        Self
    }
}

impl CostFunction for CostFunctionCout {
    fn name(&self) -> &'static str {
        "C_out"
    }

    fn calculate_join_cost(
        &self,
        _graph: &QueryGraph,
        plan_table: &PlanTable,
        estimator: &dyn CardinalityEstimator,
        left: Subproblem,
        right: Subproblem,
        _condition: &JoinCondition<'_>,
    ) -> f64 {
        let left_rows = estimator.predict_cardinality(plan_table.model(left));
        let right_rows = estimator.predict_cardinality(plan_table.model(right));
        plan_table.cost(left) + plan_table.cost(right) + left_rows + right_rows
    }

    fn is_monotone(&self) -> bool {
        true
    }
}

/// 哈希连接代价
///
/// 左输入为构建侧，右输入为探测侧，因此代价与输入顺序有关
#[derive(Debug, Clone, Copy, Default)]
pub struct HashJoinCostFunction {
    config: CostModelConfig,
}

impl HashJoinCostFunction {
    pub fn new(config: CostModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CostModelConfig {
        &self.config
    }

    /// 不含子计划代价的连接代价
    pub fn calculate_hash_join_cost(&self, build_rows: f64, probe_rows: f64) -> f64 {
        let build_cost = build_rows;
        let probe_cost = probe_rows * self.config.probe_cost_factor;
        let hash_overhead = build_rows * self.config.hash_build_overhead;

        build_cost + probe_cost + hash_overhead
    }
}

impl CostFunction for HashJoinCostFunction {
    fn name(&self) -> &'static str {
        "hash_join"
    }

    fn calculate_join_cost(
        &self,
        _graph: &QueryGraph,
        plan_table: &PlanTable,
        estimator: &dyn CardinalityEstimator,
        left: Subproblem,
        right: Subproblem,
        _condition: &JoinCondition<'_>,
    ) -> f64 {
        let build_rows = estimator.predict_cardinality(plan_table.model(left));
        let probe_rows = estimator.predict_cardinality(plan_table.model(right));
        plan_table.cost(left)
            + plan_table.cost(right)
            + self.calculate_hash_join_cost(build_rows, probe_rows)
    }

    fn is_monotone(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::graph::{Cnf, QueryGraphBuilder};
    use crate::query::optimizer::cost::CartesianProductEstimator;

    fn setup() -> (QueryGraph, PlanTable) {
        let mut builder = QueryGraphBuilder::new();
        builder.add_base_table("A", "A", 5).unwrap();
        builder.add_base_table("B", "B", 10).unwrap();
        builder.add_join(&["A", "B"], Cnf::parse("A.id = B.aid"), None).unwrap();
        let graph = builder.build();
        let mut pt = PlanTable::new(&graph);
        pt.init_base_case(&graph, &CartesianProductEstimator::new());
        (graph, pt)
    }

    #[test]
    fn test_cout() {
        let (g, pt) = setup();
        let (a, b) = (Subproblem::singleton(0), Subproblem::singleton(1));
        let condition = g.join_condition(a, b);
        let cost = CostFunctionCout::new().calculate_join_cost(
            &g,
            &pt,
            &CartesianProductEstimator::new(),
            a,
            b,
            &condition,
        );
        assert_eq!(cost, 15.0);
    }

    #[test]
    fn test_hash_join_is_asymmetric() {
        let (g, pt) = setup();
        let (a, b) = (Subproblem::singleton(0), Subproblem::singleton(1));
        let cf = HashJoinCostFunction::new(CostModelConfig::default());
        let ce = CartesianProductEstimator::new();
        let ab = cf.calculate_join_cost(&g, &pt, &ce, a, b, &g.join_condition(a, b));
        let ba = cf.calculate_join_cost(&g, &pt, &ce, b, a, &g.join_condition(b, a));
        assert!((ab - 15.5).abs() < 1e-9);
        assert!((ba - 16.0).abs() < 1e-9);
        assert!(cf.is_monotone());
    }

    #[test]
    fn test_calculate_hash_join_cost() {
        let cf = HashJoinCostFunction::new(CostModelConfig::new().with_hash_build_overhead(0.5));
        assert_eq!(cf.calculate_hash_join_cost(10.0, 4.0), 19.0);
    }
}

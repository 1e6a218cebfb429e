//! 按子集数值顺序的动态规划
//!
//! 以数值升序遍历子问题 S 时，S 的任何真子集都先于 S 被处理，
//! 因此枚举 S 的划分时两侧的最优计划都已确定。

use std::iter;

use super::{Enumeration, PlanEnumerator};
use crate::core::Subproblem;
use crate::query::graph::QueryGraph;
use crate::query::optimizer::cost::{CardinalityEstimator, CostFunction};
use crate::query::optimizer::plan::PlanTable;

/// DPsub：对每个子问题枚举全部真子集作为左输入
#[derive(Debug, Clone, Copy, Default)]
pub struct DPsub;

impl PlanEnumerator for DPsub {
    fn name(&self) -> &'static str {
        "DPsub"
    }

    fn enumerate(
        &self,
        graph: &QueryGraph,
        cost_function: &dyn CostFunction,
        estimator: &dyn CardinalityEstimator,
        plan_table: &mut PlanTable,
    ) {
        let mut ctx = Enumeration::begin(graph, cost_function, estimator, plan_table);

        for s in graph.all().subsets() {
            if s.size() < 2 {
                continue;
            }
            for s1 in s.proper_subsets() {
                let s2 = s - s1;
                if ctx.is_solved(plan_table, s1)
                    && ctx.is_solved(plan_table, s2)
                    && ctx.is_adjacent(s1, s2)
                {
                    ctx.consider(plan_table, s1, s2);
                }
            }
        }

        ctx.finish(self.name(), plan_table);
    }
}

/// DPsubOpt：跳过非连通子问题，只枚举包含最低位关系的左输入
///
/// 每个无序划分只生成一次，并考察两个方向。连通子问题的两个连通半部
/// 之间必然有边，不需要再检查相邻性。
#[derive(Debug, Clone, Copy, Default)]
pub struct DPsubOpt;

impl PlanEnumerator for DPsubOpt {
    fn name(&self) -> &'static str {
        "DPsubOpt"
    }

    fn enumerate(
        &self,
        graph: &QueryGraph,
        cost_function: &dyn CostFunction,
        estimator: &dyn CardinalityEstimator,
        plan_table: &mut PlanTable,
    ) {
        let mut ctx = Enumeration::begin(graph, cost_function, estimator, plan_table);

        for s in graph.all().subsets() {
            if s.size() < 2 || !ctx.is_connected(s) {
                continue;
            }
            let low = s.lowest();
            let rest = s - low;
            for t in iter::once(Subproblem::empty()).chain(rest.proper_subsets()) {
                let s1 = low | t;
                let s2 = s - s1;
                if ctx.is_solved(plan_table, s1) && ctx.is_solved(plan_table, s2) {
                    ctx.consider_both(plan_table, s1, s2);
                }
            }
        }

        ctx.finish(self.name(), plan_table);
    }
}

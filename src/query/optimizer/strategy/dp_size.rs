//! 按子问题大小自底向上的动态规划
//!
//! 对 s = 2..n，由较小的已解子问题组合出大小为 s 的子问题。

use super::{Enumeration, PlanEnumerator};
use crate::core::Subproblem;
use crate::query::graph::QueryGraph;
use crate::query::optimizer::cost::{CardinalityEstimator, CostFunction};
use crate::query::optimizer::plan::PlanTable;

/// DPsize：枚举所有大小为 s1 和 s - s1 的子问题对
#[derive(Debug, Clone, Copy, Default)]
pub struct DPsize;

impl PlanEnumerator for DPsize {
    fn name(&self) -> &'static str {
        "DPsize"
    }

    fn enumerate(
        &self,
        graph: &QueryGraph,
        cost_function: &dyn CostFunction,
        estimator: &dyn CardinalityEstimator,
        plan_table: &mut PlanTable,
    ) {
        let mut ctx = Enumeration::begin(graph, cost_function, estimator, plan_table);
        let n = graph.num_sources();

        for size in 2..=n {
            for left_size in 1..size {
                let right_size = size - left_size;
                for s1 in Subproblem::k_subsets(n, left_size) {
                    if !ctx.is_solved(plan_table, s1) {
                        continue;
                    }
                    for s2 in Subproblem::k_subsets(n, right_size) {
                        if s1.is_disjoint_with(s2)
                            && ctx.is_solved(plan_table, s2)
                            && ctx.is_adjacent(s1, s2)
                        {
                            ctx.consider(plan_table, s1, s2);
                        }
                    }
                }
            }
        }

        ctx.finish(self.name(), plan_table);
    }
}

/// DPsizeOpt：DPsize 加对称性剪枝与代价下界剪枝
///
/// 只枚举 s1 <= s / 2 的无序对（大小相同时要求 S2 > S1），每对考察两个方向。
/// 代价函数单调时，`cost(S1) + cost(S2)` 不低于已知最优代价的对直接跳过。
#[derive(Debug, Clone, Copy, Default)]
pub struct DPsizeOpt;

impl PlanEnumerator for DPsizeOpt {
    fn name(&self) -> &'static str {
        "DPsizeOpt"
    }

    fn enumerate(
        &self,
        graph: &QueryGraph,
        cost_function: &dyn CostFunction,
        estimator: &dyn CardinalityEstimator,
        plan_table: &mut PlanTable,
    ) {
        let mut ctx = Enumeration::begin(graph, cost_function, estimator, plan_table);
        let n = graph.num_sources();
        let prune = cost_function.is_monotone();

        for size in 2..=n {
            for left_size in 1..=size / 2 {
                let right_size = size - left_size;
                for s1 in Subproblem::k_subsets(n, left_size) {
                    if !ctx.is_solved(plan_table, s1) {
                        continue;
                    }
                    for s2 in Subproblem::k_subsets(n, right_size) {
                        if left_size == right_size && s2 <= s1 {
                            continue;
                        }
                        if !s1.is_disjoint_with(s2)
                            || !ctx.is_solved(plan_table, s2)
                            || !ctx.is_adjacent(s1, s2)
                        {
                            continue;
                        }
                        if prune {
                            if let Some(best) = plan_table.get(s1 | s2) {
                                if plan_table.cost(s1) + plan_table.cost(s2) >= best.cost {
                                    continue;
                                }
                            }
                        }
                        ctx.consider_both(plan_table, s1, s2);
                    }
                }
            }
        }

        ctx.finish(self.name(), plan_table);
    }
}

/// DPsizeSub：按大小遍历连通子问题，再枚举其真子集作为左输入
#[derive(Debug, Clone, Copy, Default)]
pub struct DPsizeSub;

impl PlanEnumerator for DPsizeSub {
    fn name(&self) -> &'static str {
        "DPsizeSub"
    }

    fn enumerate(
        &self,
        graph: &QueryGraph,
        cost_function: &dyn CostFunction,
        estimator: &dyn CardinalityEstimator,
        plan_table: &mut PlanTable,
    ) {
        let mut ctx = Enumeration::begin(graph, cost_function, estimator, plan_table);
        let n = graph.num_sources();

        for size in 2..=n {
            for s in Subproblem::k_subsets(n, size) {
                if !ctx.is_connected(s) {
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
        }

        ctx.finish(self.name(), plan_table);
    }
}

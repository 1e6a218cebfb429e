//! DPccp：连通子图/补图对枚举
//!
//! 只生成 (S1, S2) 满足 S1、S2 都连通、互不相交且相邻的对，每个无序对
//! 恰好生成一次，生成顺序保证两侧的子计划都已确定。
//!
//! - `emit_csg(S1)`：以 S1 为连通子图，枚举其补图 S2 的起点
//! - `enumerate_csg_rec(S1, X)`：沿邻居扩展 S1，X 为排除集
//! - `enumerate_cmp_rec(S1, S2, X)`：沿邻居扩展补图 S2

use super::{Enumeration, PlanEnumerator};
use crate::core::Subproblem;
use crate::query::graph::QueryGraph;
use crate::query::optimizer::cost::{CardinalityEstimator, CostFunction};
use crate::query::optimizer::plan::PlanTable;

#[derive(Debug, Clone, Copy, Default)]
pub struct DPccp;

impl PlanEnumerator for DPccp {
    fn name(&self) -> &'static str {
        "DPccp"
    }

    fn enumerate(
        &self,
        graph: &QueryGraph,
        cost_function: &dyn CostFunction,
        estimator: &dyn CardinalityEstimator,
        plan_table: &mut PlanTable,
    ) {
        let ctx = Enumeration::begin(graph, cost_function, estimator, plan_table);
        let mut search = CcpSearch { ctx, plan_table };

        for i in (0..graph.num_sources()).rev() {
            let v = Subproblem::singleton(i);
            search.emit_csg(v);
            search.enumerate_csg_rec(v, Subproblem::up_to(i));
        }

        let CcpSearch { ctx, plan_table } = search;
        ctx.finish(self.name(), plan_table);
    }
}

struct CcpSearch<'a, 'p> {
    ctx: Enumeration<'a>,
    plan_table: &'p mut PlanTable,
}

impl CcpSearch<'_, '_> {
    fn enumerate_csg_rec(&mut self, s1: Subproblem, excluded: Subproblem) {
        let neighbors = self.ctx.neighbors(s1) - excluded;
        for n in neighbors.subsets() {
            self.emit_csg(s1 | n);
        }
        for n in neighbors.subsets() {
            self.enumerate_csg_rec(s1 | n, excluded | neighbors);
        }
    }

    fn emit_csg(&mut self, s1: Subproblem) {
        let min_id = match s1.lowest_id() {
            Some(id) => id,
            None => return,
        };
        let excluded = s1 | Subproblem::up_to(min_id);
        let neighbors = self.ctx.neighbors(s1) - excluded;

        for v in neighbors.iter().rev() {
            let s2 = Subproblem::singleton(v);
            self.emit_csg_cmp(s1, s2);
            self.enumerate_cmp_rec(s1, s2, excluded | (Subproblem::up_to(v) & neighbors));
        }
    }

    fn enumerate_cmp_rec(&mut self, s1: Subproblem, s2: Subproblem, excluded: Subproblem) {
        let neighbors = self.ctx.neighbors(s2) - excluded;
        for n in neighbors.subsets() {
            self.emit_csg_cmp(s1, s2 | n);
        }
        for n in neighbors.subsets() {
            self.enumerate_cmp_rec(s1, s2 | n, excluded | neighbors);
        }
    }

    fn emit_csg_cmp(&mut self, s1: Subproblem, s2: Subproblem) {
        if self.ctx.is_solved(self.plan_table, s1) && self.ctx.is_solved(self.plan_table, s2) {
            self.ctx.consider_both(self.plan_table, s1, s2);
        }
    }
}

//! 记忆化自顶向下枚举
//!
//! 从全部关系出发递归划分：先求解两侧子问题，再考察该划分。
//! 每个子问题只展开一次。图不连通时分别求解每个连通分量。

use std::collections::HashSet;
use std::iter;

use super::{Enumeration, PlanEnumerator};
use crate::core::Subproblem;
use crate::query::graph::QueryGraph;
use crate::query::optimizer::cost::{CardinalityEstimator, CostFunction};
use crate::query::optimizer::plan::PlanTable;

/// 划分生成方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Partitioning {
    /// 枚举包含最低位关系的全部子集，再检查两侧连通性
    Naive,
    /// 从最低位关系出发沿邻居扩展连通集合（Advanced Generate and Test）
    MinCutAgat,
}

/// TDbasic：朴素划分的自顶向下枚举
#[derive(Debug, Clone, Copy, Default)]
pub struct TDbasic;

impl PlanEnumerator for TDbasic {
    fn name(&self) -> &'static str {
        "TDbasic"
    }

    fn enumerate(
        &self,
        graph: &QueryGraph,
        cost_function: &dyn CostFunction,
        estimator: &dyn CardinalityEstimator,
        plan_table: &mut PlanTable,
    ) {
        run_top_down(self.name(), Partitioning::Naive, graph, cost_function, estimator, plan_table);
    }
}

/// TDMinCutAGaT：以连通集合扩展生成划分的自顶向下枚举
///
/// 连通集合 C 从最低位关系 t 出发，每次加入一个邻居；已经分支过的邻居
/// 进入排除集 X，因此每个包含 t 的连通集合只生成一次。S\C 连通时产生划分。
/// X 中的关系落在 S\C 的两个不同连通分量中时，继续扩展 C 不可能再使
/// 补集连通，剪掉该分支。
#[derive(Debug, Clone, Copy, Default)]
pub struct TDMinCutAGaT;

impl PlanEnumerator for TDMinCutAGaT {
    fn name(&self) -> &'static str {
        "TDMinCutAGaT"
    }

    fn enumerate(
        &self,
        graph: &QueryGraph,
        cost_function: &dyn CostFunction,
        estimator: &dyn CardinalityEstimator,
        plan_table: &mut PlanTable,
    ) {
        run_top_down(
            self.name(),
            Partitioning::MinCutAgat,
            graph,
            cost_function,
            estimator,
            plan_table,
        );
    }
}

fn run_top_down(
    name: &str,
    partitioning: Partitioning,
    graph: &QueryGraph,
    cost_function: &dyn CostFunction,
    estimator: &dyn CardinalityEstimator,
    plan_table: &mut PlanTable,
) {
    let ctx = Enumeration::begin(graph, cost_function, estimator, plan_table);
    let mut search = TopDownSearch {
        ctx,
        plan_table,
        partitioning,
        expanded: HashSet::new(),
    };
    for component in graph.adjacency_matrix().connected_components(graph.all()) {
        search.solve(component);
    }
    let TopDownSearch {
        ctx, plan_table, ..
    } = search;
    ctx.finish(name, plan_table);
}

struct TopDownSearch<'a, 'p> {
    ctx: Enumeration<'a>,
    plan_table: &'p mut PlanTable,
    partitioning: Partitioning,
    expanded: HashSet<Subproblem>,
}

impl TopDownSearch<'_, '_> {
    fn solve(&mut self, s: Subproblem) {
        if s.size() < 2 || !self.expanded.insert(s) {
            return;
        }
        match self.partitioning {
            Partitioning::Naive => self.partition_naive(s),
            Partitioning::MinCutAgat => self.partition_agat(s, s.lowest(), Subproblem::empty()),
        }
    }

    fn partition_naive(&mut self, s: Subproblem) {
        let low = s.lowest();
        let rest = s - low;
        for t in iter::once(Subproblem::empty()).chain(rest.proper_subsets()) {
            let s1 = low | t;
            let s2 = s - s1;
            if self.ctx.is_connected(s1) && self.ctx.is_connected(s2) {
                self.emit(s1, s2);
            }
        }
    }

    fn partition_agat(&mut self, s: Subproblem, c: Subproblem, excluded: Subproblem) {
        let complement = s - c;
        if complement.is_empty() {
            return;
        }
        if self.ctx.is_connected(complement) {
            self.emit(c, complement);
        } else if !excluded.is_empty() {
            let split_exclusions = self
                .ctx
                .graph
                .adjacency_matrix()
                .connected_components(complement)
                .into_iter()
                .filter(|component| component.intersects(excluded))
                .count();
            if split_exclusions >= 2 {
                return;
            }
        }

        let candidates = (self.ctx.neighbors(c) & s) - excluded;
        let mut branch_excluded = excluded;
        for v in candidates.singletons() {
            self.partition_agat(s, c | v, branch_excluded);
            branch_excluded |= v;
        }
    }

    fn emit(&mut self, s1: Subproblem, s2: Subproblem) {
        self.solve(s1);
        self.solve(s2);
        if self.ctx.is_solved(self.plan_table, s1) && self.ctx.is_solved(self.plan_table, s2) {
            self.ctx.consider_both(self.plan_table, s1, s2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::graph::loader::{GraphShape, GraphSpec};
    use crate::query::optimizer::strategy::test_support::*;
    use crate::query::optimizer::strategy::DPccp;

    #[test]
    fn test_td_basic_cyclic() {
        assert_cyclic_optimum(&TDbasic);
    }

    #[test]
    fn test_td_min_cut_agat_cyclic() {
        assert_cyclic_optimum(&TDMinCutAGaT);
    }

    #[test]
    fn test_top_down_matches_dp_ccp() {
        for (shape, seed) in [
            (GraphShape::Chain, 3),
            (GraphShape::Cycle, 5),
            (GraphShape::Star, 8),
            (GraphShape::Random, 13),
        ] {
            let g = GraphSpec::random(shape, 7, seed).build().unwrap();
            let expected = run(&DPccp, &g).cost(g.all());
            assert_eq!(run(&TDbasic, &g).cost(g.all()), expected, "{}", shape);
            assert_eq!(run(&TDMinCutAGaT, &g).cost(g.all()), expected, "{}", shape);
        }
    }
}

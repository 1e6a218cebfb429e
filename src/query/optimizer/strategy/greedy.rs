//! 贪心启发式
//!
//! 只保证得到可行的连接树，计划表中只包含贪心路径上的子问题。

use std::collections::HashMap;

use super::{Enumeration, PlanEnumerator};
use crate::core::Subproblem;
use crate::query::graph::QueryGraph;
use crate::query::optimizer::cost::{CardinalityEstimator, CostFunction};
use crate::query::optimizer::plan::PlanTable;

/// GOO（Greedy Operator Ordering）
///
/// 维护一个子问题列表，初始为全部单个关系。每轮连接预测结果基数最小的
/// 一对相邻节点（相同时取先出现的 i < j），合并结果替换位置 i，
/// 位置 j 被 `swap_remove`。没有相邻节点对时停止。
///
/// 节点对的预测基数跨轮缓存，合并后只重新估计与新节点相关的节点对。
/// 缓存键不区分左右，预测基数与输入顺序无关。
#[derive(Debug, Clone, Copy, Default)]
pub struct Goo;

impl PlanEnumerator for Goo {
    fn name(&self) -> &'static str {
        "GOO"
    }

    fn is_exhaustive(&self) -> bool {
        false
    }

    fn enumerate(
        &self,
        graph: &QueryGraph,
        cost_function: &dyn CostFunction,
        estimator: &dyn CardinalityEstimator,
        plan_table: &mut PlanTable,
    ) {
        let mut ctx = Enumeration::begin(graph, cost_function, estimator, plan_table);
        let mut nodes: Vec<Subproblem> = graph.sources().iter().map(|s| s.subproblem()).collect();
        let mut pair_cardinalities: HashMap<(Subproblem, Subproblem), f64> = HashMap::new();

        while nodes.len() > 1 {
            let mut best: Option<(usize, usize, f64)> = None;
            for i in 0..nodes.len() {
                for j in i + 1..nodes.len() {
                    let (left, right) = (nodes[i], nodes[j]);
                    if !ctx.is_adjacent(left, right) {
                        continue;
                    }
                    let cardinality = *pair_cardinalities
                        .entry(pair_key(left, right))
                        .or_insert_with(|| ctx.predict_join(plan_table, left, right));
                    if best.map_or(true, |(_, _, c)| cardinality < c) {
                        best = Some((i, j, cardinality));
                    }
                }
            }
            let (i, j) = match best {
                Some((i, j, _)) => (i, j),
                None => break,
            };
            let (left, right) = (nodes[i], nodes[j]);
            ctx.consider(plan_table, left, right);
            let merged = left | right;
            nodes[i] = merged;
            nodes.swap_remove(j);
            pair_cardinalities
                .retain(|&(a, b), _| a.is_disjoint_with(merged) && b.is_disjoint_with(merged));
        }

        ctx.finish(self.name(), plan_table);
    }
}

fn pair_key(a: Subproblem, b: Subproblem) -> (Subproblem, Subproblem) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// TDGOO：自顶向下的贪心划分
///
/// 对子问题 S，从 S 中每个关系出发贪心扩展连通集合 C（每次加入使 C
/// 基数最小的邻居）。扩展过程中补集连通的 C 都是候选划分，选择
/// `card(C) + card(S\C)` 最小者（相同时取先出现者），递归求解两侧后考察该划分。
#[derive(Debug, Clone, Copy, Default)]
pub struct TdGoo;

impl PlanEnumerator for TdGoo {
    fn name(&self) -> &'static str {
        "TDGOO"
    }

    fn is_exhaustive(&self) -> bool {
        false
    }

    fn enumerate(
        &self,
        graph: &QueryGraph,
        cost_function: &dyn CostFunction,
        estimator: &dyn CardinalityEstimator,
        plan_table: &mut PlanTable,
    ) {
        let ctx = Enumeration::begin(graph, cost_function, estimator, plan_table);
        let mut search = TdGooSearch {
            ctx,
            plan_table,
            cardinalities: HashMap::new(),
        };
        for component in graph.adjacency_matrix().connected_components(graph.all()) {
            search.solve(component);
        }
        let TdGooSearch {
            ctx, plan_table, ..
        } = search;
        ctx.finish(self.name(), plan_table);
    }
}

struct TdGooSearch<'a, 'p> {
    ctx: Enumeration<'a>,
    plan_table: &'p mut PlanTable,
    cardinalities: HashMap<Subproblem, f64>,
}

impl TdGooSearch<'_, '_> {
    /// 子问题全部关系连接后的预测基数（与连接顺序无关）
    fn cardinality(&mut self, s: Subproblem) -> f64 {
        if let Some(card) = self.cardinalities.get(&s) {
            return *card;
        }
        let estimator = self.ctx.estimator;
        let model = estimator.estimate_join_all(self.ctx.graph, self.plan_table, s);
        let card = estimator.predict_cardinality(model.as_ref());
        self.cardinalities.insert(s, card);
        card
    }

    fn solve(&mut self, s: Subproblem) {
        if s.size() < 2 {
            return;
        }
        let (c, rest) = match self.best_split(s) {
            Some(split) => split,
            None => return,
        };
        self.solve(c);
        self.solve(rest);
        if self.ctx.is_solved(self.plan_table, c) && self.ctx.is_solved(self.plan_table, rest) {
            self.ctx.consider(self.plan_table, c, rest);
        }
    }

    fn best_split(&mut self, s: Subproblem) -> Option<(Subproblem, Subproblem)> {
        let mut best: Option<(Subproblem, f64)> = None;

        for start in s.singletons() {
            let mut c = start;
            while c != s {
                let rest = s - c;
                if self.ctx.is_connected(rest) {
                    let score = self.cardinality(c) + self.cardinality(rest);
                    if best.map_or(true, |(_, b)| score < b) {
                        best = Some((c, score));
                    }
                }

                let mut next: Option<(Subproblem, f64)> = None;
                for u in (self.ctx.neighbors(c) & s).singletons() {
                    let card = self.cardinality(c | u);
                    if next.map_or(true, |(_, b)| card < b) {
                        next = Some((u, card));
                    }
                }
                match next {
                    Some((u, _)) => c |= u,
                    None => break,
                }
            }
        }

        best.map(|(c, _)| (c, s - c))
    }
}

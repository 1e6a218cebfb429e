//! 集成测试共享工具模块
//!
//! 提供测试用查询图、参考计划表构建和运行枚举器的辅助函数

#![allow(dead_code)]

pub mod assertions;

use joinopt::core::Subproblem;
use joinopt::query::graph::{Cnf, QueryGraph, QueryGraphBuilder};
use joinopt::query::optimizer::{
    CardinalityEstimator, CartesianProductEstimator, CostFunction, CostFunctionCout,
    EnumeratorRegistry, PlanTable,
};

/// 全部内置算法
pub const ALL_ALGORITHMS: [&str; 10] = [
    "DPsize",
    "DPsizeOpt",
    "DPsizeSub",
    "DPsub",
    "DPsubOpt",
    "DPccp",
    "TDbasic",
    "TDMinCutAGaT",
    "GOO",
    "TDGOO",
];

/// 保证最优的算法
pub const EXHAUSTIVE_ALGORITHMS: [&str; 8] = [
    "DPsize",
    "DPsizeOpt",
    "DPsizeSub",
    "DPsub",
    "DPsubOpt",
    "DPccp",
    "TDbasic",
    "TDMinCutAGaT",
];

fn four_relations(rows: [u64; 4], edges: &[(&str, &str)]) -> QueryGraph {
    let mut builder = QueryGraphBuilder::new();
    for (name, rows) in ["A", "B", "C", "D"].into_iter().zip(rows) {
        builder.add_base_table(name, name, rows).expect("添加关系失败");
    }
    for &(l, r) in edges {
        let condition = Cnf::parse(&format!("{}.id = {}.id", l, r));
        builder.add_join(&[l, r], condition, None).expect("添加谓词失败");
    }
    builder.build()
}

/// 环形非对称图：A–C, A–D, B–D, C–D，行数 5/10/8/12
pub fn cyclic_asymmetric() -> QueryGraph {
    four_relations([5, 10, 8, 12], &[("A", "C"), ("A", "D"), ("B", "D"), ("C", "D")])
}

/// 对称环形图：A–B, B–C, C–D, D–A，行数 5/8/10/12
pub fn symmetric() -> QueryGraph {
    four_relations([5, 8, 10, 12], &[("A", "B"), ("B", "C"), ("C", "D"), ("D", "A")])
}

pub fn set(graph: &QueryGraph, aliases: &[&str]) -> Subproblem {
    graph.subproblem_of(aliases).expect("未知的关系")
}

/// 写好基础情形的计划表
pub fn seeded_table(graph: &QueryGraph, estimator: &dyn CardinalityEstimator) -> PlanTable {
    let mut pt = PlanTable::new(graph);
    pt.init_base_case(graph, estimator);
    pt
}

/// 用代价函数与估计器计算 (left, right) 的条目并直接写入
pub fn make_entry(
    pt: &mut PlanTable,
    graph: &QueryGraph,
    cost_function: &dyn CostFunction,
    estimator: &dyn CardinalityEstimator,
    left: Subproblem,
    right: Subproblem,
) {
    let condition = graph.join_condition(left, right);
    let cost = cost_function.calculate_join_cost(graph, pt, estimator, left, right, &condition);
    let model = estimator.estimate_join(graph, pt.model(left), pt.model(right), &condition);
    pt.update_best(left | right, left, right, cost, model);
}

/// 按给定划分（自底向上顺序）构建参考计划表，使用 C_out 与笛卡尔积估计器
pub fn reference_table(graph: &QueryGraph, splits: &[(&[&str], &[&str])]) -> PlanTable {
    let estimator = CartesianProductEstimator::new();
    let cost_function = CostFunctionCout::new();
    let mut pt = seeded_table(graph, &estimator);
    for (left, right) in splits {
        let (l, r) = (set(graph, left), set(graph, right));
        make_entry(&mut pt, graph, &cost_function, &estimator, l, r);
    }
    pt
}

/// 以 C_out 与笛卡尔积估计器运行指定算法
pub fn run_algorithm(name: &str, graph: &QueryGraph) -> PlanTable {
    run_with(name, graph, &CostFunctionCout::new(), &CartesianProductEstimator::new())
}

pub fn run_with(
    name: &str,
    graph: &QueryGraph,
    cost_function: &dyn CostFunction,
    estimator: &dyn CardinalityEstimator,
) -> PlanTable {
    let enumerator = EnumeratorRegistry::get(name).expect("算法未注册");
    let mut pt = seeded_table(graph, estimator);
    enumerator.enumerate(graph, cost_function, estimator, &mut pt);
    pt
}

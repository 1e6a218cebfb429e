//! 自定义断言辅助模块
//!
//! 提供测试中的常用断言函数

use joinopt::query::graph::QueryGraph;
use joinopt::query::optimizer::PlanTable;

/// 断言结果失败并匹配错误消息
pub fn assert_err_with<T: std::fmt::Debug, E: std::fmt::Display>(result: Result<T, E>, expected_msg: &str) {
    let err = result.expect_err("操作应该失败");
    let err_str = err.to_string();
    assert!(
        err_str.contains(expected_msg),
        "错误消息应包含 '{}', 实际是 '{}'",
        expected_msg,
        err_str
    );
}

/// 断言两个代价在相对误差内相等
pub fn assert_cost_eq(actual: f64, expected: f64, context: &str) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "{}: 代价不匹配: 期望 {}, 实际 {}",
        context,
        expected,
        actual
    );
}

/// 断言计划表中每个条目满足结构不变量
///
/// - 基础情形：单个关系，左右为空
/// - 其余条目：左右不相交、并集等于子问题、两侧都有条目、子问题连通
pub fn assert_entry_invariants(graph: &QueryGraph, pt: &PlanTable, context: &str) {
    for (s, entry) in pt.iter() {
        if s.size() == 1 {
            assert!(entry.is_base_case(), "{}: {} 应为基础情形", context, s);
            continue;
        }
        assert!(!entry.left.is_empty() && !entry.right.is_empty(), "{}: {} 划分为空", context, s);
        assert_eq!(entry.left | entry.right, s, "{}: {} 划分并集错误", context, s);
        assert!(entry.left.is_disjoint_with(entry.right), "{}: {} 划分相交", context, s);
        assert!(pt.has_plan(entry.left), "{}: {} 缺少左子计划", context, s);
        assert!(pt.has_plan(entry.right), "{}: {} 缺少右子计划", context, s);
        assert!(
            graph.adjacency_matrix().is_connected(s),
            "{}: {} 不连通却有条目",
            context,
            s
        );
    }
}

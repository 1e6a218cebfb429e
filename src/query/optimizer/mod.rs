//! 连接顺序优化器模块
//!
//! 在查询图上搜索代价最小的二元连接树
//!
//! ## 模块结构
//!
//! - `cost` - 基数估计与代价函数
//! - `plan` - 计划表与连接树
//! - `strategy` - 计划枚举算法
//! - `enumerator_registry` - 按名称创建枚举器
//! - `optimizer` - 优化器入口

pub mod cost;
pub mod enumerator_registry;
pub mod optimizer;
pub mod plan;
pub mod strategy;

// 重新导出主要类型
pub use cost::{
    CardinalityEstimator, CartesianProductEstimator, CostFunction, CostFunctionCout,
    CostFunctionKind, CostModelConfig, DataModel, EstimatorKind, HashJoinCostFunction,
    SelectivityEstimator,
};
pub use enumerator_registry::EnumeratorRegistry;
pub use optimizer::{JoinOrderOptimizer, JoinOrderResult};
pub use plan::{Entry, JoinTree, PlanTable, PlanTableLayout};
pub use strategy::PlanEnumerator;

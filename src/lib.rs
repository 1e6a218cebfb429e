//! joinopt - 连接顺序计划枚举器
//!
//! 给定由关系和连接谓词组成的查询图，在二元连接树空间中搜索代价最小的
//! 连接顺序。提供多种可互换的动态规划与启发式枚举算法，基数估计与
//! 代价模型可插拔。

pub mod config;
pub mod core;
pub mod query;
pub mod utils;

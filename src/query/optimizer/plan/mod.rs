//! 计划表与连接树模块

pub mod table;
pub mod tree;

pub use table::{Entry, PlanTable, PlanTableLayout, DEFAULT_DENSE_THRESHOLD, MAX_DENSE_RELATIONS};
pub use tree::JoinTree;

//! 查询图模块
//!
//! 提供优化器的输入：关系、连接谓词与邻接关系
//!
//! ## 模块结构
//!
//! - `query_graph` - 查询图、数据源、连接谓词与构建器
//! - `adjacency` - 邻接矩阵与连通性检查
//! - `cnf` - 连接条件的合取范式表示
//! - `loader` - TOML 图描述文件与随机图生成
//! - `dot` - DOT 格式输出

pub mod adjacency;
pub mod cnf;
pub mod dot;
pub mod loader;
pub mod query_graph;

pub use adjacency::AdjacencyMatrix;
pub use cnf::{Clause, Cnf, Literal};
pub use loader::{load_query_graph, parse_query_graph, GraphShape, GraphSpec, JoinSpec, RelationSpec};
pub use query_graph::{
    DataSource, DataSourceKind, Join, JoinCondition, QueryGraph, QueryGraphBuilder,
};

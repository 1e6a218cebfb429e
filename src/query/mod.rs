// 查询模块
//
// - graph: 查询图（优化器的输入）
// - optimizer: 连接顺序优化

pub mod graph;
pub mod optimizer;

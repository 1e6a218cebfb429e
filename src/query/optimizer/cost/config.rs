//! 代价模型配置模块
//!
//! ## 使用示例
//!
//! ```rust
//! use joinopt::query::optimizer::cost::CostModelConfig;
//!
//! let config = CostModelConfig::default();
//! assert_eq!(config.hash_build_overhead, 0.1);
//!
//! let custom = CostModelConfig::new().with_hash_build_overhead(0.25);
//! assert_eq!(custom.hash_build_overhead, 0.25);
//! ```

use serde::{Deserialize, Serialize};

/// 代价模型配置
///
/// 只影响哈希连接代价函数；C_out 没有可调参数。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostModelConfig {
    /// 哈希构建开销系数
    ///
    /// 在构建侧每行基础代价之上的额外开销。默认值 0.1
    pub hash_build_overhead: f64,

    /// 探测侧每行代价系数。默认值 1.0
    pub probe_cost_factor: f64,
}

impl Default for CostModelConfig {
    fn default() -> Self {
        Self {
            hash_build_overhead: 0.1,
            probe_cost_factor: 1.0,
        }
    }
}

impl CostModelConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置哈希构建开销系数
    pub fn with_hash_build_overhead(mut self, overhead: f64) -> Self {
        self.hash_build_overhead = overhead.max(0.0);
        self
    }

    /// 设置探测侧每行代价系数
    pub fn with_probe_cost_factor(mut self, factor: f64) -> Self {
        self.probe_cost_factor = factor.max(0.0);
        self
    }
}

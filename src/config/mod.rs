use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::ConfigResult;
use crate::query::optimizer::cost::{CostModelConfig, DEFAULT_JOIN_SELECTIVITY};
use crate::query::optimizer::plan::DEFAULT_DENSE_THRESHOLD;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub log: LogConfig,
    pub optimizer: OptimizerConfig,
}

/// 日志配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub dir: String,
    pub file: String,
    pub max_file_size: u64,
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "logs".to_string(),
            file: "joinopt".to_string(),
            max_file_size: 100 * 1024 * 1024, // 100MB
            max_files: 5,
        }
    }
}

/// 连接顺序优化配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct OptimizerConfig {
    /// 枚举器名称，见 `EnumeratorRegistry`
    pub algorithm: String,
    /// 代价函数名称：`C_out` 或 `hash_join`
    pub cost_function: String,
    /// 基数估计器名称：`cartesian` 或 `selectivity`
    pub cardinality_estimator: String,
    /// 关系数不超过该值时计划表使用稠密布局
    pub dense_table_threshold: usize,
    /// 没有选择性提示的谓词使用的选择性
    pub default_selectivity: f64,
    /// 穷举算法处理的关系数超过该值时输出警告
    pub exhaustive_warn_threshold: usize,
    pub cost_model: CostModelConfig,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            algorithm: "DPccp".to_string(),
            cost_function: "C_out".to_string(),
            cardinality_estimator: "cartesian".to_string(),
            dense_table_threshold: DEFAULT_DENSE_THRESHOLD,
            default_selectivity: DEFAULT_JOIN_SELECTIVITY,
            exhaustive_warn_threshold: 16,
            cost_model: CostModelConfig::default(),
        }
    }
}

impl OptimizerConfig {
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    pub fn with_cost_function(mut self, cost_function: impl Into<String>) -> Self {
        self.cost_function = cost_function.into();
        self
    }

    pub fn with_cardinality_estimator(mut self, estimator: impl Into<String>) -> Self {
        self.cardinality_estimator = estimator.into();
        self
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

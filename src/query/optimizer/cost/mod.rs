//! 代价计算模块
//!
//! 提供连接顺序优化所需的基数估计与代价计算
//!
//! ## 模块结构
//!
//! - `estimate` - 基数模型与估计器接口，笛卡尔积估计器
//! - `selectivity` - 基于谓词选择性的估计器
//! - `calculator` - 连接代价函数（C_out、哈希连接）
//! - `config` - 代价模型配置

pub mod calculator;
pub mod config;
pub mod estimate;
pub mod selectivity;

pub use calculator::{CostFunction, CostFunctionCout, HashJoinCostFunction};
pub use config::CostModelConfig;
pub use estimate::{CardinalityEstimator, CartesianModel, CartesianProductEstimator, DataModel};
pub use selectivity::{SelectivityEstimator, SelectivityModel, DEFAULT_JOIN_SELECTIVITY};

/// 可按名称选择的代价函数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CostFunctionKind {
    Cout,
    HashJoin,
}

impl CostFunctionKind {
    pub const ALL: [CostFunctionKind; 2] = [CostFunctionKind::Cout, CostFunctionKind::HashJoin];

    pub fn name(&self) -> &'static str {
        match self {
            CostFunctionKind::Cout => "C_out",
            CostFunctionKind::HashJoin => "hash_join",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn create(&self, config: &CostModelConfig) -> Box<dyn CostFunction> {
        match self {
            CostFunctionKind::Cout => Box::new(CostFunctionCout::new()),
            CostFunctionKind::HashJoin => Box::new(HashJoinCostFunction::new(*config)),
        }
    }
}

/// 可按名称选择的基数估计器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EstimatorKind {
    Cartesian,
    Selectivity,
}

impl EstimatorKind {
    pub const ALL: [EstimatorKind; 2] = [EstimatorKind::Cartesian, EstimatorKind::Selectivity];

    pub fn name(&self) -> &'static str {
        match self {
            EstimatorKind::Cartesian => "cartesian",
            EstimatorKind::Selectivity => "selectivity",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// `default_selectivity` 只对选择性估计器有效
    pub fn create(&self, default_selectivity: f64) -> Box<dyn CardinalityEstimator> {
        match self {
            EstimatorKind::Cartesian => Box::new(CartesianProductEstimator::new()),
            EstimatorKind::Selectivity => {
                Box::new(SelectivityEstimator::with_default_selectivity(default_selectivity))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_from_name() {
        assert_eq!(CostFunctionKind::from_name("C_out"), Some(CostFunctionKind::Cout));
        assert_eq!(CostFunctionKind::from_name("hash_join"), Some(CostFunctionKind::HashJoin));
        assert_eq!(CostFunctionKind::from_name("c_out"), None);
        assert_eq!(EstimatorKind::from_name("selectivity"), Some(EstimatorKind::Selectivity));
        assert_eq!(EstimatorKind::from_name("histogram"), None);
    }

    #[test]
    fn test_created_names_match() {
        for kind in CostFunctionKind::ALL {
            assert_eq!(kind.create(&CostModelConfig::default()).name(), kind.name());
        }
        for kind in EstimatorKind::ALL {
            assert_eq!(kind.create(0.3).name(), kind.name());
        }
    }
}

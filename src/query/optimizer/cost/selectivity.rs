//! 基于选择性的基数估计器
//!
//! 连接结果行数 = 左侧行数 × 右侧行数 × 适用谓词选择性之积。
//! 谓词没有选择性提示时使用默认选择性。

use std::any::Any;

use super::estimate::{CardinalityEstimator, DataModel};
use crate::core::Subproblem;
use crate::query::graph::{JoinCondition, QueryGraph};

/// 默认连接选择性
pub const DEFAULT_JOIN_SELECTIVITY: f64 = 0.3;

/// 选择性估计器的模型：估计行数（至少为 1）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectivityModel {
    pub rows: f64,
}

impl DataModel for SelectivityModel {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_model(&self) -> Box<dyn DataModel> {
        Box::new(*self)
    }

    fn eq_model(&self, other: &dyn DataModel) -> bool {
        other
            .as_any()
            .downcast_ref::<SelectivityModel>()
            .map_or(false, |o| o == self)
    }
}

/// 选择性基数估计器
#[derive(Debug, Clone, Copy)]
pub struct SelectivityEstimator {
    default_selectivity: f64,
}

impl Default for SelectivityEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectivityEstimator {
    pub fn new() -> Self {
        Self {
            default_selectivity: DEFAULT_JOIN_SELECTIVITY,
        }
    }

    /// 指定没有提示的谓词使用的选择性
    pub fn with_default_selectivity(selectivity: f64) -> Self {
        Self {
            default_selectivity: selectivity.clamp(0.0, 1.0),
        }
    }

    pub fn default_selectivity(&self) -> f64 {
        self.default_selectivity
    }

    /// 适用谓词的合并选择性（假设谓词相互独立）
    pub fn combined_selectivity(&self, condition: &JoinCondition<'_>) -> f64 {
        condition
            .iter()
            .map(|join| join.selectivity().unwrap_or(self.default_selectivity))
            .product()
    }

    fn model<'m>(&self, model: &'m dyn DataModel) -> &'m SelectivityModel {
        match model.as_any().downcast_ref::<SelectivityModel>() {
            Some(m) => m,
            None => panic!("选择性估计器收到了其他估计器的模型: {:?}", model),
        }
    }
}

impl CardinalityEstimator for SelectivityEstimator {
    fn name(&self) -> &'static str {
        "selectivity"
    }

    fn estimate_scan(&self, graph: &QueryGraph, s: Subproblem) -> Box<dyn DataModel> {
        assert_eq!(s.size(), 1, "扫描估计只接受单元素子问题");
        let id = s.lowest_id().unwrap_or_default();
        Box::new(SelectivityModel {
            rows: (graph.source(id).num_rows() as f64).max(1.0),
        })
    }

    fn estimate_join(
        &self,
        _graph: &QueryGraph,
        left: &dyn DataModel,
        right: &dyn DataModel,
        condition: &JoinCondition<'_>,
    ) -> Box<dyn DataModel> {
        let rows = self.model(left).rows * self.model(right).rows * self.combined_selectivity(condition);
        Box::new(SelectivityModel {
            rows: rows.max(1.0),
        })
    }

    fn predict_cardinality(&self, model: &dyn DataModel) -> f64 {
        self.model(model).rows
    }
}

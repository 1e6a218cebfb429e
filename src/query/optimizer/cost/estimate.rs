//! 基数估计接口
//!
//! 基数模型（`DataModel`）对枚举器是不透明的：只有产生它的估计器知道
//! 如何解释它。计划表中的每个条目独占一个模型。

use std::any::Any;
use std::fmt;

use crate::core::Subproblem;
use crate::query::graph::{JoinCondition, QueryGraph};
use crate::query::optimizer::plan::PlanTable;

/// 不透明的基数模型
pub trait DataModel: fmt::Debug + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;

    fn clone_model(&self) -> Box<dyn DataModel>;

    /// 与另一个模型比较，类型不同视为不相等
    fn eq_model(&self, other: &dyn DataModel) -> bool;
}

impl Clone for Box<dyn DataModel> {
    fn clone(&self) -> Self {
        self.clone_model()
    }
}

impl PartialEq for dyn DataModel {
    fn eq(&self, other: &Self) -> bool {
        self.eq_model(other)
    }
}

/// 基数估计器
pub trait CardinalityEstimator: fmt::Debug + Send + Sync {
    /// 注册名称
    fn name(&self) -> &'static str;

    /// 估计单个基表（单元素子问题）的基数
    fn estimate_scan(&self, graph: &QueryGraph, s: Subproblem) -> Box<dyn DataModel>;

    /// 估计两个子问题连接结果的基数
    fn estimate_join(
        &self,
        graph: &QueryGraph,
        left: &dyn DataModel,
        right: &dyn DataModel,
        condition: &JoinCondition<'_>,
    ) -> Box<dyn DataModel>;

    /// 从模型中读出预测的行数
    fn predict_cardinality(&self, model: &dyn DataModel) -> f64;

    /// 估计 `s` 中全部关系连接后的基数
    ///
    /// 按 id 升序依次连接计划表中的基础模型；每个谓词恰好在其
    /// 最后一个关系加入时生效一次，因此结果与连接顺序无关。
    fn estimate_join_all(
        &self,
        graph: &QueryGraph,
        plan_table: &PlanTable,
        s: Subproblem,
    ) -> Box<dyn DataModel> {
        assert!(!s.is_empty(), "不能估计空子问题的基数");
        let mut joined = s.lowest();
        let mut model = plan_table.model(joined).clone_model();
        for next in (s - joined).singletons() {
            let condition = graph.join_condition(joined, next);
            model = self.estimate_join(graph, model.as_ref(), plan_table.model(next), &condition);
            joined |= next;
        }
        model
    }
}

/// 笛卡尔积估计器的模型：行数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartesianModel {
    pub size: u64,
}

impl DataModel for CartesianModel {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_model(&self) -> Box<dyn DataModel> {
        Box::new(*self)
    }

    fn eq_model(&self, other: &dyn DataModel) -> bool {
        other
            .as_any()
            .downcast_ref::<CartesianModel>()
            .map_or(false, |o| o == self)
    }
}

/// 笛卡尔积基数估计器
///
/// 忽略谓词选择性，连接结果基数为两侧基数之积；用于测试和作为最坏情况基线
#[derive(Debug, Clone, Copy, Default)]
pub struct CartesianProductEstimator;

impl CartesianProductEstimator {
    pub fn new() -> Self {
        Self
    }

    fn model<'m>(&self, model: &'m dyn DataModel) -> &'m CartesianModel {
        match model.as_any().downcast_ref::<CartesianModel>() {
            Some(m) => m,
            None => panic!("笛卡尔积估计器收到了其他估计器的模型: {:?}", model),
        }
    }
}

impl CardinalityEstimator for CartesianProductEstimator {
    fn name(&self) -> &'static str {
        "cartesian"
    }

    fn estimate_scan(&self, graph: &QueryGraph, s: Subproblem) -> Box<dyn DataModel> {
        assert_eq!(s.size(), 1, "扫描估计只接受单元素子问题");
        let id = s.lowest_id().unwrap_or_default();
        Box::new(CartesianModel {
            size: graph.source(id).num_rows(),
        })
    }

    fn estimate_join(
        &self,
        _graph: &QueryGraph,
        left: &dyn DataModel,
        right: &dyn DataModel,
        _condition: &JoinCondition<'_>,
    ) -> Box<dyn DataModel> {
        let size = self.model(left).size.saturating_mul(self.model(right).size);
        Box::new(CartesianModel { size })
    }

    fn predict_cardinality(&self, model: &dyn DataModel) -> f64 {
        self.model(model).size as f64
    }
}

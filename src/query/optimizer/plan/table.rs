//! 计划表
//!
//! 计划表把子问题映射到至多一个条目，记录该子问题当前最优的
//! 二元划分、代价和基数模型。每次编译独占一个计划表：
//! 创建、写入基础情形、由一个枚举器填充，之后只读。
//!
//! 两种存储布局：
//! - 稠密：以位掩码为下标的 `Vec`，关系数较少时使用
//! - 稀疏：`HashMap`，关系数较多时使用

use std::collections::HashMap;
use std::fmt::Write;

use crate::core::Subproblem;
use crate::query::graph::QueryGraph;
use crate::query::optimizer::cost::{CardinalityEstimator, DataModel};

/// 稠密布局默认的关系数上限
pub const DEFAULT_DENSE_THRESHOLD: usize = 20;

/// 稠密布局允许的最大关系数，超过时即使指定稠密布局也使用稀疏布局
pub const MAX_DENSE_RELATIONS: usize = 22;

/// 计划表条目
#[derive(Debug, Clone)]
pub struct Entry {
    pub cost: f64,
    pub left: Subproblem,
    pub right: Subproblem,
    pub model: Box<dyn DataModel>,
}

impl Entry {
    pub fn new(cost: f64, left: Subproblem, right: Subproblem, model: Box<dyn DataModel>) -> Self {
        Self {
            cost,
            left,
            right,
            model,
        }
    }

    /// 基础情形条目（单个关系，没有子计划）
    pub fn base_case(cost: f64, model: Box<dyn DataModel>) -> Self {
        Self::new(cost, Subproblem::empty(), Subproblem::empty(), model)
    }

    pub fn is_base_case(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    /// 划分是否相同（不区分左右）
    pub fn same_split(&self, other: &Entry) -> bool {
        (self.left == other.left && self.right == other.right)
            || (self.left == other.right && self.right == other.left)
    }
}

/// 代价、模型相同且划分相同（不区分左右）即视为相等
impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.same_split(other) && self.model.eq_model(other.model.as_ref())
    }
}

/// 存储布局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanTableLayout {
    Dense,
    Sparse,
}

impl PlanTableLayout {
    /// 按关系数选择布局
    pub fn for_relations(num_sources: usize, dense_threshold: usize) -> Self {
        if num_sources <= dense_threshold.min(MAX_DENSE_RELATIONS) {
            PlanTableLayout::Dense
        } else {
            PlanTableLayout::Sparse
        }
    }
}

#[derive(Debug, Clone)]
enum Storage {
    Dense(Vec<Option<Entry>>),
    Sparse(HashMap<Subproblem, Entry>),
}

/// 计划表
#[derive(Debug, Clone)]
pub struct PlanTable {
    graph_id: u64,
    num_sources: usize,
    storage: Storage,
    len: usize,
}

impl PlanTable {
    /// 为查询图创建空计划表，按关系数选择布局
    pub fn new(graph: &QueryGraph) -> Self {
        let layout = PlanTableLayout::for_relations(graph.num_sources(), DEFAULT_DENSE_THRESHOLD);
        Self::with_layout(graph, layout)
    }

    pub fn with_layout(graph: &QueryGraph, layout: PlanTableLayout) -> Self {
        let num_sources = graph.num_sources();
        let storage = match layout {
            PlanTableLayout::Dense if num_sources <= MAX_DENSE_RELATIONS => {
                let mut slots = Vec::new();
                slots.resize_with(1usize << num_sources, || None);
                Storage::Dense(slots)
            }
            _ => Storage::Sparse(HashMap::new()),
        };
        Self {
            graph_id: graph.id(),
            num_sources,
            storage,
            len: 0,
        }
    }

    /// 所属查询图的编号
    pub fn graph_id(&self) -> u64 {
        self.graph_id
    }

    pub fn num_sources(&self) -> usize {
        self.num_sources
    }

    pub fn layout(&self) -> PlanTableLayout {
        match self.storage {
            Storage::Dense(_) => PlanTableLayout::Dense,
            Storage::Sparse(_) => PlanTableLayout::Sparse,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, s: Subproblem) -> Option<&Entry> {
        match &self.storage {
            Storage::Dense(slots) => slots.get(s.bits() as usize).and_then(Option::as_ref),
            Storage::Sparse(map) => map.get(&s),
        }
    }

    pub fn has_plan(&self, s: Subproblem) -> bool {
        self.get(s).is_some()
    }

    /// 条目；不存在时 panic
    pub fn entry(&self, s: Subproblem) -> &Entry {
        match self.get(s) {
            Some(entry) => entry,
            None => panic!("子问题 {} 没有计划", s),
        }
    }

    pub fn cost(&self, s: Subproblem) -> f64 {
        self.entry(s).cost
    }

    pub fn model(&self, s: Subproblem) -> &dyn DataModel {
        self.entry(s).model.as_ref()
    }

    /// 全部关系对应的条目
    pub fn root(&self) -> Option<&Entry> {
        self.get(Subproblem::all(self.num_sources))
    }

    /// 直接写入条目，返回被替换的旧条目
    pub fn insert(&mut self, s: Subproblem, entry: Entry) -> Option<Entry> {
        let old = match &mut self.storage {
            Storage::Dense(slots) => {
                let idx = s.bits() as usize;
                assert!(idx < slots.len(), "子问题 {} 超出计划表范围", s);
                slots[idx].replace(entry)
            }
            Storage::Sparse(map) => map.insert(s, entry),
        };
        if old.is_none() {
            self.len += 1;
        }
        old
    }

    /// `cost` 是否会被 `update_best` 采纳
    pub fn improves(&self, s: Subproblem, cost: f64) -> bool {
        self.get(s).map_or(true, |entry| cost < entry.cost)
    }

    /// 条目不存在或新代价严格更低时写入，返回是否写入
    ///
    /// 代价相同时保留先写入的条目；被替换的模型立即释放。
    pub fn update_best(
        &mut self,
        s: Subproblem,
        left: Subproblem,
        right: Subproblem,
        cost: f64,
        model: Box<dyn DataModel>,
    ) -> bool {
        if !self.improves(s, cost) {
            return false;
        }
        self.insert(s, Entry::new(cost, left, right, model));
        true
    }

    /// 为每个关系写入代价为 0 的基础情形
    pub fn init_base_case(&mut self, graph: &QueryGraph, estimator: &dyn CardinalityEstimator) {
        for source in graph.sources() {
            let s = source.subproblem();
            self.set_base_case(s, 0.0, estimator.estimate_scan(graph, s));
        }
    }

    /// 写入单个关系的基础情形（可指定扫描代价）
    pub fn set_base_case(&mut self, s: Subproblem, cost: f64, model: Box<dyn DataModel>) {
        assert_eq!(s.size(), 1, "基础情形只能是单个关系");
        self.insert(s, Entry::base_case(cost, model));
    }

    /// 检查计划表属于 `graph` 且每个关系都有基础情形
    pub fn assert_base_case(&self, graph: &QueryGraph) {
        assert_eq!(self.graph_id, graph.id(), "计划表不属于该查询图");
        for source in graph.sources() {
            assert!(
                self.has_plan(source.subproblem()),
                "关系 {} 缺少基础情形",
                source.alias()
            );
        }
    }

    /// 按子问题数值升序遍历全部条目
    pub fn iter(&self) -> Box<dyn Iterator<Item = (Subproblem, &Entry)> + '_> {
        match &self.storage {
            Storage::Dense(slots) => Box::new(slots.iter().enumerate().filter_map(|(idx, slot)| {
                slot.as_ref()
                    .map(|entry| (Subproblem::from_bits(idx as u64), entry))
            })),
            Storage::Sparse(map) => {
                let mut entries: Vec<(Subproblem, &Entry)> =
                    map.iter().map(|(s, entry)| (*s, entry)).collect();
                entries.sort_by_key(|(s, _)| *s);
                Box::new(entries.into_iter())
            }
        }
    }

    /// 以表格形式输出全部条目
    pub fn dump(&self, graph: &QueryGraph, estimator: &dyn CardinalityEstimator) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<24} {:>14} {:>14}  {}",
            "subproblem", "cost", "cardinality", "split"
        );
        for (s, entry) in self.iter() {
            let split = if entry.is_base_case() {
                "-".to_string()
            } else {
                format!("{} ⋈ {}", graph.display(entry.left), graph.display(entry.right))
            };
            let _ = writeln!(
                out,
                "{:<24} {:>14.2} {:>14.2}  {}",
                graph.display(s),
                entry.cost,
                estimator.predict_cardinality(entry.model.as_ref()),
                split
            );
        }
        out
    }
}

/// 只能比较同一查询图的计划表
///
/// # Panics
/// 两个计划表属于不同查询图时 panic
impl PartialEq for PlanTable {
    fn eq(&self, other: &Self) -> bool {
        assert_eq!(self.graph_id, other.graph_id, "不能比较不同查询图的计划表");
        self.num_sources == other.num_sources
            && self.len == other.len
            && self
                .iter()
                .all(|(s, entry)| other.get(s).map_or(false, |o| entry == o))
    }
}

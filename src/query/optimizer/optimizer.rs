//! 连接顺序优化器
//!
//! 按配置中的名称解析枚举器、代价函数和基数估计器，为查询图建立计划表，
//! 运行枚举并重建最优连接树。
//!
//! ## 使用示例
//!
//! ```rust
//! use joinopt::config::OptimizerConfig;
//! use joinopt::query::graph::{Cnf, QueryGraphBuilder};
//! use joinopt::query::optimizer::JoinOrderOptimizer;
//!
//! let mut builder = QueryGraphBuilder::new();
//! builder.add_base_table("A", "A", 5).unwrap();
//! builder.add_base_table("C", "C", 8).unwrap();
//! builder.add_join(&["A", "C"], Cnf::parse("A.id = C.aid"), None).unwrap();
//! let graph = builder.build();
//!
//! let optimizer = JoinOrderOptimizer::new(OptimizerConfig::default());
//! let result = optimizer.optimize(&graph).unwrap();
//! assert_eq!(result.total_cost, 13.0);
//! ```

use std::path::Path;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::config::OptimizerConfig;
use crate::core::{JoinOptResult, OptimizeError, OptimizeResult};
use crate::query::graph::{load_query_graph, QueryGraph};
use crate::query::optimizer::cost::{
    CardinalityEstimator, CostFunction, CostFunctionKind, EstimatorKind,
};
use crate::query::optimizer::enumerator_registry::EnumeratorRegistry;
use crate::query::optimizer::plan::{JoinTree, PlanTable, PlanTableLayout};
use crate::query::optimizer::strategy::PlanEnumerator;

/// 连接顺序优化结果
#[derive(Debug, Clone)]
pub struct JoinOrderResult {
    /// 使用的枚举算法
    pub algorithm: String,
    /// 最优连接树
    pub tree: JoinTree,
    /// 总估计代价
    pub total_cost: f64,
    /// 最终估计输出行数
    pub cardinality: f64,
    /// 枚举后的计划表
    pub plan_table: PlanTable,
    /// 枚举耗时
    pub elapsed: Duration,
}

/// 连接顺序优化器
#[derive(Debug, Clone, Default)]
pub struct JoinOrderOptimizer {
    config: OptimizerConfig,
}

impl JoinOrderOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn create_enumerator(&self, name: &str) -> OptimizeResult<Box<dyn PlanEnumerator>> {
        EnumeratorRegistry::get(name).ok_or_else(|| OptimizeError::UnknownEnumerator(name.to_string()))
    }

    pub fn create_cost_function(&self) -> OptimizeResult<Box<dyn CostFunction>> {
        let name = &self.config.cost_function;
        CostFunctionKind::from_name(name)
            .map(|kind| kind.create(&self.config.cost_model))
            .ok_or_else(|| OptimizeError::UnknownCostFunction(name.clone()))
    }

    pub fn create_estimator(&self) -> OptimizeResult<Box<dyn CardinalityEstimator>> {
        let name = &self.config.cardinality_estimator;
        EstimatorKind::from_name(name)
            .map(|kind| kind.create(self.config.default_selectivity))
            .ok_or_else(|| OptimizeError::UnknownEstimator(name.clone()))
    }

    /// 使用配置中的算法优化
    pub fn optimize(&self, graph: &QueryGraph) -> OptimizeResult<JoinOrderResult> {
        self.optimize_with(graph, &self.config.algorithm)
    }

    /// 加载图描述文件并用配置中的算法优化，同时返回加载的查询图
    pub fn optimize_file<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> JoinOptResult<(QueryGraph, JoinOrderResult)> {
        let graph = load_query_graph(path)?;
        let result = self.optimize(&graph)?;
        Ok((graph, result))
    }

    /// 使用指定算法优化
    pub fn optimize_with(&self, graph: &QueryGraph, algorithm: &str) -> OptimizeResult<JoinOrderResult> {
        let enumerator = self.create_enumerator(algorithm)?;
        let cost_function = self.create_cost_function()?;
        let estimator = self.create_estimator()?;

        let n = graph.num_sources();
        if n == 0 {
            return Err(OptimizeError::EmptyGraph);
        }
        if enumerator.is_exhaustive() && n > self.config.exhaustive_warn_threshold {
            warn!(
                "穷举算法 {} 处理 {} 个关系（阈值 {}），枚举时间可能很长",
                enumerator.name(),
                n,
                self.config.exhaustive_warn_threshold
            );
        }

        let layout = PlanTableLayout::for_relations(n, self.config.dense_table_threshold);
        let mut plan_table = PlanTable::with_layout(graph, layout);
        plan_table.init_base_case(graph, estimator.as_ref());

        let start = Instant::now();
        enumerator.enumerate(graph, cost_function.as_ref(), estimator.as_ref(), &mut plan_table);
        let elapsed = start.elapsed();

        let tree = plan_table
            .join_tree(graph, estimator.as_ref())
            .ok_or_else(|| OptimizeError::NoPlan(graph.display(graph.all())))?;
        let total_cost = tree.cost();
        let cardinality = tree.cardinality();

        info!(
            "{} 完成: {} 个关系, 代价 {:.2}, 基数 {:.0}, 耗时 {:?}",
            enumerator.name(),
            n,
            total_cost,
            cardinality,
            elapsed
        );
        debug!("{} 连接树: {}, 计划表 {} 项 ({:?})", enumerator.name(), tree, plan_table.len(), layout);

        Ok(JoinOrderResult {
            algorithm: enumerator.name().to_string(),
            tree,
            total_cost,
            cardinality,
            plan_table,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use tempfile::NamedTempFile;

    use crate::core::{GraphError, JoinOptError};
    use crate::query::graph::{Cnf, QueryGraphBuilder};

    fn cyclic() -> QueryGraph {
        let mut builder = QueryGraphBuilder::new();
        for (name, rows) in [("A", 5), ("B", 10), ("C", 8), ("D", 12)] {
            builder.add_base_table(name, name, rows).unwrap();
        }
        for (l, r) in [("A", "C"), ("A", "D"), ("B", "D"), ("C", "D")] {
            builder.add_join(&[l, r], Cnf::parse("x = y"), None).unwrap();
        }
        builder.build()
    }

    #[test]
    fn test_optimize_default() {
        let g = cyclic();
        let result = JoinOrderOptimizer::default().optimize(&g).unwrap();
        assert_eq!(result.algorithm, "DPccp");
        assert_eq!(result.total_cost, 195.0);
        assert_eq!(result.cardinality, 4800.0);
        assert_eq!(result.tree.leaves().len(), 4);
        assert_eq!(result.plan_table.layout(), PlanTableLayout::Dense);
    }

    #[test]
    fn test_unknown_names() {
        let g = cyclic();
        let optimizer = JoinOrderOptimizer::default();
        assert_eq!(
            optimizer.optimize_with(&g, "DPhyp").unwrap_err(),
            OptimizeError::UnknownEnumerator("DPhyp".to_string())
        );

        let config = OptimizerConfig::default().with_cost_function("C_max");
        assert!(matches!(
            JoinOrderOptimizer::new(config).optimize(&g),
            Err(OptimizeError::UnknownCostFunction(_))
        ));

        let config = OptimizerConfig::default().with_cardinality_estimator("histogram");
        assert!(matches!(
            JoinOrderOptimizer::new(config).optimize(&g),
            Err(OptimizeError::UnknownEstimator(_))
        ));
    }

    #[test]
    fn test_empty_and_disconnected() {
        let optimizer = JoinOrderOptimizer::default();
        let empty = QueryGraphBuilder::new().build();
        assert_eq!(optimizer.optimize(&empty).unwrap_err(), OptimizeError::EmptyGraph);

        let mut builder = QueryGraphBuilder::new();
        builder.add_base_table("A", "A", 1).unwrap();
        builder.add_base_table("B", "B", 1).unwrap();
        let disconnected = builder.build();
        assert!(matches!(
            optimizer.optimize(&disconnected),
            Err(OptimizeError::NoPlan(_))
        ));
    }

    #[test]
    fn test_single_relation() {
        let mut builder = QueryGraphBuilder::new();
        builder.add_base_table("A", "A", 42).unwrap();
        let g = builder.build();
        let result = JoinOrderOptimizer::default().optimize(&g).unwrap();
        assert_eq!(result.total_cost, 0.0);
        assert_eq!(result.cardinality, 42.0);
        assert_eq!(result.tree.to_string(), "A");
    }

    #[test]
    fn test_sparse_layout_and_hash_join() {
        let g = cyclic();
        let mut config = OptimizerConfig::default()
            .with_cost_function("hash_join")
            .with_cardinality_estimator("selectivity");
        config.dense_table_threshold = 2;
        let result = JoinOrderOptimizer::new(config).optimize(&g).unwrap();
        assert_eq!(result.plan_table.layout(), PlanTableLayout::Sparse);
        assert!(result.total_cost > 0.0);
    }

    #[test]
    fn test_optimize_file() {
        let mut file = NamedTempFile::new().expect("创建临时文件失败");
        file.write_all(
            b"[[relation]]\nname = \"A\"\nrows = 5\n\n[[relation]]\nname = \"C\"\nrows = 8\n\n\
              [[join]]\nrelations = [\"A\", \"C\"]\n",
        )
        .expect("写入临时文件失败");

        let (graph, result) = JoinOrderOptimizer::default()
            .optimize_file(file.path())
            .expect("优化失败");
        assert_eq!(graph.num_sources(), 2);
        assert_eq!(result.total_cost, 13.0);
    }

    #[test]
    fn test_optimize_file_errors() {
        let optimizer = JoinOrderOptimizer::default();
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        assert!(matches!(
            optimizer.optimize_file(dir.path().join("missing.toml")),
            Err(JoinOptError::Graph(GraphError::Io(_)))
        ));

        let mut file = NamedTempFile::new().expect("创建临时文件失败");
        file.write_all(b"[[relation]]\nname = \"A\"\nrows = 1\n\n[[relation]]\nname = \"B\"\nrows = 1\n")
            .expect("写入临时文件失败");
        let err = optimizer.optimize_file(file.path()).unwrap_err();
        assert!(matches!(err, JoinOptError::Optimize(OptimizeError::NoPlan(_))));
        assert!(err.to_string().starts_with("优化错误"));
    }
}

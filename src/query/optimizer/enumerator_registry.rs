//! 枚举器注册机制
//! 提供静态枚举器注册表，按名称创建枚举器实例

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::query::optimizer::strategy::{
    DPccp, DPsize, DPsizeOpt, DPsizeSub, DPsub, DPsubOpt, Goo, PlanEnumerator, TDMinCutAGaT,
    TDbasic, TdGoo,
};

type EnumeratorCreator = Arc<dyn Fn() -> Box<dyn PlanEnumerator> + Send + Sync>;

static ENUMERATOR_REGISTRY: OnceLock<RwLock<HashMap<String, EnumeratorCreator>>> = OnceLock::new();

pub struct EnumeratorRegistry;

impl EnumeratorRegistry {
    /// 注册（或替换）一个枚举器
    pub fn register<F>(name: impl Into<String>, creator: F)
    where
        F: Fn() -> Box<dyn PlanEnumerator> + Send + Sync + 'static,
    {
        let registry = get_registry();
        let mut writer = registry.write().unwrap_or_else(|e| e.into_inner());
        writer.insert(name.into(), Arc::new(creator));
    }

    pub fn get(name: &str) -> Option<Box<dyn PlanEnumerator>> {
        let registry = get_registry();
        let reader = registry.read().unwrap_or_else(|e| e.into_inner());
        reader.get(name).map(|creator| creator())
    }

    pub fn is_registered(name: &str) -> bool {
        let registry = get_registry();
        let reader = registry.read().unwrap_or_else(|e| e.into_inner());
        reader.contains_key(name)
    }

    /// 已注册的名称，按字典序排列
    pub fn names() -> Vec<String> {
        let registry = get_registry();
        let reader = registry.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = reader.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn count() -> usize {
        let registry = get_registry();
        let reader = registry.read().unwrap_or_else(|e| e.into_inner());
        reader.len()
    }
}

fn get_registry() -> &'static RwLock<HashMap<String, EnumeratorCreator>> {
    ENUMERATOR_REGISTRY.get_or_init(|| RwLock::new(builtin_enumerators()))
}

fn creator<E>() -> EnumeratorCreator
where
    E: PlanEnumerator + Default + 'static,
{
    Arc::new(|| Box::new(E::default()) as Box<dyn PlanEnumerator>)
}

fn builtin_enumerators() -> HashMap<String, EnumeratorCreator> {
    let builtins = [
        ("DPsize", creator::<DPsize>()),
        ("DPsizeOpt", creator::<DPsizeOpt>()),
        ("DPsizeSub", creator::<DPsizeSub>()),
        ("DPsub", creator::<DPsub>()),
        ("DPsubOpt", creator::<DPsubOpt>()),
        ("DPccp", creator::<DPccp>()),
        ("TDbasic", creator::<TDbasic>()),
        ("TDMinCutAGaT", creator::<TDMinCutAGaT>()),
        ("GOO", creator::<Goo>()),
        ("TDGOO", creator::<TdGoo>()),
    ];
    builtins
        .into_iter()
        .map(|(name, creator)| (name.to_string(), creator))
        .collect()
}

#[macro_export]
macro_rules! register_enumerator {
    ($name:expr, $creator:expr) => {
        $crate::query::optimizer::enumerator_registry::EnumeratorRegistry::register($name, $creator);
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::graph::QueryGraph;
    use crate::query::optimizer::cost::{CardinalityEstimator, CostFunction};
    use crate::query::optimizer::plan::PlanTable;

    #[derive(Debug)]
    struct NoopEnumerator;

    impl PlanEnumerator for NoopEnumerator {
        fn name(&self) -> &'static str {
            "Noop"
        }

        fn is_exhaustive(&self) -> bool {
            false
        }

        fn enumerate(
            &self,
            _graph: &QueryGraph,
            _cost_function: &dyn CostFunction,
            _estimator: &dyn CardinalityEstimator,
            _plan_table: &mut PlanTable,
        ) {
        }
    }

    #[test]
    fn test_builtins_are_registered() {
        for name in [
            "DPsize",
            "DPsizeOpt",
            "DPsizeSub",
            "DPsub",
            "DPsubOpt",
            "DPccp",
            "TDbasic",
            "TDMinCutAGaT",
            "GOO",
            "TDGOO",
        ] {
            let enumerator = EnumeratorRegistry::get(name).expect("内置枚举器应已注册");
            assert_eq!(enumerator.name(), name);
        }
        assert!(EnumeratorRegistry::count() >= 10);
    }

    #[test]
    fn test_register_and_get() {
        register_enumerator!("Noop", || Box::new(NoopEnumerator) as Box<dyn PlanEnumerator>);
        assert!(EnumeratorRegistry::is_registered("Noop"));
        assert!(!EnumeratorRegistry::get("Noop").unwrap().is_exhaustive());
    }

    #[test]
    fn test_get_unregistered() {
        assert!(EnumeratorRegistry::get("DPhyp").is_none());
        assert!(!EnumeratorRegistry::is_registered("dpccp"));
    }

    #[test]
    fn test_names_sorted() {
        let names = EnumeratorRegistry::names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(names.iter().any(|n| n == "TDMinCutAGaT"));
    }
}

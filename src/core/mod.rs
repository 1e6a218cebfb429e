pub mod error;
pub mod subproblem;

// 错误和结果类型
pub use error::{
    ConfigError, ConfigResult, GraphError, GraphResult, JoinOptError, JoinOptResult,
    OptimizeError, OptimizeResult,
};

// 核心数据类型
pub use subproblem::Subproblem;

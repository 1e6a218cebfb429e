//! 统一错误处理
//!
//! 可恢复错误按来源划分：
//! - `GraphError`：查询图构建与图描述文件加载
//! - `OptimizeError`：优化器的名称解析与结果读取
//! - `ConfigError`：配置文件读写
//!
//! 跨越多个来源的入口（如从文件加载并优化）返回 `JoinOptError`。
//!
//! 前置条件违反（位集宽度不足、计划表缺少基础项、跨图比较计划表）
//! 属于集成错误，直接 panic，不在此处建模。

use thiserror::Error;

/// 查询图错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// 关系数量超出位集宽度
    #[error("关系数量过多: {count}，最多支持 {max} 个")]
    TooManyRelations { count: usize, max: usize },

    /// 关系别名重复
    #[error("关系名称重复: {0}")]
    DuplicateRelation(String),

    /// 引用了不存在的关系
    #[error("未知的关系: {0}")]
    UnknownRelation(String),

    /// 连接谓词引用的关系少于两个
    #[error("无效的连接谓词: {0}")]
    InvalidJoin(String),

    /// 图描述文件读取失败
    #[error("IO错误: {0}")]
    Io(String),

    /// 图描述文件解析失败
    #[error("图描述解析错误: {0}")]
    Parse(String),
}

/// 查询图结果类型
pub type GraphResult<T> = Result<T, GraphError>;

impl From<std::io::Error> for GraphError {
    fn from(err: std::io::Error) -> Self {
        GraphError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for GraphError {
    fn from(err: toml::de::Error) -> Self {
        GraphError::Parse(err.to_string())
    }
}

/// 优化器错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizeError {
    /// 未注册的计划枚举算法
    #[error("未知的计划枚举算法: {0}")]
    UnknownEnumerator(String),

    /// 未知的代价函数
    #[error("未知的代价函数: {0}")]
    UnknownCostFunction(String),

    /// 未知的基数估计器
    #[error("未知的基数估计器: {0}")]
    UnknownEstimator(String),

    /// 查询图中没有关系
    #[error("查询图为空")]
    EmptyGraph,

    /// 全集没有可行计划（查询图不连通且不允许笛卡尔积）
    #[error("没有可行的连接计划: {0}")]
    NoPlan(String),
}

/// 优化器结果类型
pub type OptimizeResult<T> = Result<T, OptimizeError>;

/// 配置错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("配置文件读写失败: {0}")]
    Io(String),

    #[error("配置文件解析失败: {0}")]
    Parse(String),

    #[error("配置序列化失败: {0}")]
    Serialize(String),
}

/// 配置结果类型
pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::Serialize(err.to_string())
    }
}

/// 顶层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JoinOptError {
    #[error("查询图错误: {0}")]
    Graph(#[from] GraphError),

    #[error("优化错误: {0}")]
    Optimize(#[from] OptimizeError),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 顶层结果类型
pub type JoinOptResult<T> = Result<T, JoinOptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_error_display() {
        let err = GraphError::TooManyRelations { count: 70, max: 64 };
        assert!(err.to_string().contains("70"));

        let err = GraphError::UnknownRelation("X".to_string());
        assert!(err.to_string().contains("未知的关系"));
    }

    #[test]
    fn test_optimize_error_display() {
        let err = OptimizeError::UnknownEnumerator("DPfoo".to_string());
        assert!(err.to_string().contains("DPfoo"));
    }

    #[test]
    fn test_error_conversion() {
        let err: JoinOptError = OptimizeError::EmptyGraph.into();
        assert!(matches!(err, JoinOptError::Optimize(OptimizeError::EmptyGraph)));

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: GraphError = io.into();
        assert!(matches!(err, GraphError::Io(_)));
    }
}

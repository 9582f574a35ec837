//! 错误处理模块
//!
//! 定义应用程序的统一错误类型

use thiserror::Error;

/// Students 应用程序的主要错误类型
#[derive(Error, Debug)]
pub enum StudentsError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 数据库相关错误
    #[error("数据库错误: {0}")]
    Storage(#[from] rusqlite::Error),

    /// 成绩数量或格式不正确
    #[error("成绩无效: {0}")]
    InvalidPerformance(String),

    /// 学生姓名为空
    #[error("学生姓名不能为空")]
    InvalidName,

    /// 未指定班级且配置中没有默认班级
    #[error("未指定班级，请使用 --group 或在配置文件中设置 defaults.group")]
    MissingGroup,

    /// 已有数据库中班级编号重复，无法建立唯一索引
    #[error("数据库中存在重复的班级编号: {}，请先合并这些班级", .0.join(", "))]
    DuplicateGroups(Vec<String>),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON序列化/反序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, StudentsError>;

//! Students - 学生成绩记录工具
//!
//! 把学生的姓名、班级和五门成绩记录到 SQLite 数据库中，支持：
//! - 添加学生（自动创建班级）
//! - 按姓名排序显示全部学生
//! - 查找至少有一门不及格（2分）的学生
//! - TOML 配置文件与结构化日志

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod presenter;
pub mod storage;
pub mod student;

// 重新导出主要类型
pub use config::{Config, DatabaseConfig, LoggingConfig};
pub use error::StudentsError;
pub use storage::{Database, SqliteStudentStore, StudentStore};
pub use student::{Group, NewStudent, Performance, StudentRecord};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

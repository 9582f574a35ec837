//! 存储模块
//!
//! 提供 SQLite 连接管理、表结构初始化以及学生记录的读写

pub mod db;
pub mod repository;

// 重新导出主要类型
pub use db::{ConnectionTarget, Database};
pub use repository::{SqliteStudentStore, StudentStore};

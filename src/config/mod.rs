//! 配置管理模块
//!
//! 提供配置文件解析、环境变量替换和验证功能

pub mod loader;
pub mod types;

// 重新导出主要类型
pub use loader::{
    load_config, locate_config, resolve_database_url, ConfigLoader, TomlConfigLoader,
};
pub use types::{validate_config, Config, DatabaseConfig, DefaultsConfig, LoggingConfig};

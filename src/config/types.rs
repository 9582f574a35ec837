//! 配置数据结构定义
//!
//! 定义应用程序的配置结构体和验证逻辑

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// 主配置结构
///
/// 所有配置节都是可选的，缺省时使用默认值。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 命令默认值
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// 数据库配置
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    /// 数据库连接字符串（文件路径、`:memory:`、`sqlite://` 或 `file:` URI）
    pub url: Option<String>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 是否使用JSON格式
    #[serde(default)]
    pub json_format: bool,
    /// 日志文件路径，未设置时输出到标准错误
    pub file_path: Option<PathBuf>,
    /// 模块级别日志，如 `"students::storage" = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            file_path: None,
            modules: HashMap::new(),
        }
    }
}

/// 命令默认值
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DefaultsConfig {
    /// `add` 未指定 `--group` 时使用的班级
    pub group: Option<String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// 配置验证函数
///
/// # 参数
/// * `config` - 要验证的配置
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_config(config: &Config) -> Result<(), String> {
    // 验证日志级别
    let valid_log_levels = ["debug", "info", "warn", "error"];
    if !valid_log_levels.contains(&config.logging.level.as_str()) {
        return Err(format!(
            "无效的日志级别: {}，支持的级别: {:?}",
            config.logging.level, valid_log_levels
        ));
    }

    for (module, level) in &config.logging.modules {
        if !valid_log_levels.contains(&level.as_str()) {
            return Err(format!("模块 {module} 的日志级别无效: {level}"));
        }
    }

    if let Some(ref url) = config.database.url {
        if url.trim().is_empty() {
            return Err("数据库连接字符串不能为空".to_string());
        }
    }

    if let Some(ref group) = config.defaults.group {
        if group.trim().is_empty() {
            return Err("默认班级不能为空".to_string());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();

        assert_eq!(config.logging.level, "warn");
        assert!(!config.logging.json_format);
        assert!(config.logging.file_path.is_none());
        assert!(config.database.url.is_none());
        assert!(config.defaults.group.is_none());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();

        let err = validate_config(&config).unwrap_err();
        assert!(err.contains("verbose"));
    }

    #[test]
    fn test_config_validation_invalid_module_level() {
        let mut config = Config::default();
        config
            .logging
            .modules
            .insert("students::storage".to_string(), "debug".to_string());
        assert!(validate_config(&config).is_ok());

        config
            .logging
            .modules
            .insert("rusqlite".to_string(), "loud".to_string());
        let err = validate_config(&config).unwrap_err();
        assert!(err.contains("rusqlite"));
        assert!(err.contains("loud"));
    }

    #[test]
    fn test_config_validation_empty_database_url() {
        let mut config = Config::default();
        config.database.url = Some("  ".to_string());

        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_config_validation_empty_default_group() {
        let mut config = Config::default();
        config.defaults.group = Some(String::new());

        assert!(validate_config(&config).is_err());
    }
}

//! 日志系统模块
//!
//! 提供结构化日志配置和管理功能。日志写到标准错误或文件，
//! 标准输出只留给学生列表。

use crate::config::LoggingConfig;
use log::LevelFilter;
use serde_json::json;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter, Layer};

/// 日志配置结构
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 日志级别
    pub level: LevelFilter,
    /// 日志文件路径（可选）
    pub file_path: Option<PathBuf>,
    /// 是否使用JSON格式
    pub json_format: bool,
    /// 模块级别日志控制
    pub module_levels: HashMap<String, LevelFilter>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Warn,
            file_path: None,
            json_format: false,
            module_levels: HashMap::new(),
        }
    }
}

impl LogConfig {
    /// 由配置文件的日志配置生成，`level_override` 来自命令行
    pub fn from_config(config: &LoggingConfig, level_override: Option<LevelFilter>) -> Self {
        let level = level_override
            .or_else(|| config.level.parse().ok())
            .unwrap_or(LevelFilter::Warn);

        // 级别已在加载配置时校验
        let module_levels = config
            .modules
            .iter()
            .filter_map(|(module, level)| {
                level
                    .parse::<LevelFilter>()
                    .ok()
                    .map(|level| (module.clone(), level))
            })
            .collect();

        Self {
            level,
            file_path: config.file_path.clone(),
            json_format: config.json_format,
            module_levels,
        }
    }

    /// 构造过滤器：`RUST_LOG` + 全局级别 + 模块级别
    fn env_filter(&self) -> anyhow::Result<EnvFilter> {
        let mut env_filter =
            EnvFilter::from_default_env().add_directive(level_directive(None, self.level)?);

        for (module, level) in &self.module_levels {
            env_filter = env_filter.add_directive(level_directive(Some(module), *level)?);
        }

        Ok(env_filter)
    }
}

/// 日志系统管理器
pub struct LoggingSystem {
    /// 配置
    config: LogConfig,
}

impl LoggingSystem {
    /// 创建日志系统，不安装 subscriber
    pub fn new(config: LogConfig) -> Self {
        Self { config }
    }

    /// 初始化日志系统
    ///
    /// 安装全局 tracing subscriber（同时桥接 log crate）。
    /// 进程内已安装过时直接返回新的 `LoggingSystem` 实例。
    pub fn setup_logging(config: LogConfig) -> anyhow::Result<Self> {
        let env_filter = config.env_filter()?;

        let fmt_layer = if let Some(file_path) = &config.file_path {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)
                .map_err(|e| anyhow::anyhow!("创建日志文件失败: {}", e))?;
            let layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true);
            if config.json_format {
                layer
                    .json()
                    .with_timer(fmt::time::ChronoUtc::rfc_3339())
                    .boxed()
            } else {
                layer.with_timer(fmt::time::ChronoUtc::rfc_3339()).boxed()
            }
        } else {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true);
            if config.json_format {
                layer
                    .json()
                    .with_timer(fmt::time::ChronoUtc::rfc_3339())
                    .boxed()
            } else {
                layer
                    .with_timer(fmt::time::ChronoUtc::rfc_3339())
                    .with_ansi(true)
                    .boxed()
            }
        };

        match registry().with(env_filter).with(fmt_layer).try_init() {
            Ok(()) => tracing::debug!("日志系统初始化完成: {:?}", config),
            Err(e) => {
                let error_msg = e.to_string();
                if error_msg.contains(
                    "attempted to set a logger after the logging system was already initialized",
                ) || error_msg.contains("a global default trace dispatcher has already been set")
                {
                    tracing::debug!("日志系统已经初始化过了");
                } else {
                    return Err(anyhow::anyhow!(
                        "tracing subscriber初始化失败: {}",
                        error_msg
                    ));
                }
            }
        }

        Ok(Self::new(config))
    }

    /// 记录审计日志
    pub fn audit_log(&self, operation: &str, result: &str, details: Option<&str>) {
        if self.config.json_format {
            let audit_entry = json!({
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "type": "audit",
                "operation": operation,
                "result": result,
                "details": details.unwrap_or(""),
            });
            tracing::info!("{audit_entry}");
        } else {
            tracing::info!(
                "AUDIT: {} - {} ({})",
                operation,
                result,
                details.unwrap_or("")
            );
        }
    }
}

/// 生成级别指令，`module` 为空时作用于全局
fn level_directive(module: Option<&str>, level: LevelFilter) -> anyhow::Result<Directive> {
    let level = level.as_str().to_ascii_lowercase();
    let directive = match module {
        Some(module) => format!("{module}={level}"),
        None => level,
    };
    directive
        .parse::<Directive>()
        .map_err(|e| anyhow::anyhow!("无效的日志级别指令 {}: {}", directive, e))
}

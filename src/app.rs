//! 应用程序核心逻辑
//!
//! 加载配置、初始化日志、打开数据库并分派子命令

use crate::cli::args::Args;
use crate::cli::commands::{build_command, CommandContext};
use crate::config::{load_config, locate_config, resolve_database_url, Config};
use crate::logging::{LogConfig, LoggingSystem};
use crate::storage::{Database, SqliteStudentStore};
use anyhow::{Context, Result};
use std::io::Write;
use tracing::{debug, info};

/// 运行一次命令行调用
pub fn run(args: &Args, out: &mut dyn Write) -> Result<()> {
    let config_path = locate_config(args.config.as_deref());
    let config = load_config(config_path.as_deref()).context("加载配置失败")?;

    let log_config = LogConfig::from_config(&config.logging, args.log_level_override());
    let logging = LoggingSystem::setup_logging(log_config).context("初始化日志系统失败")?;

    info!("Students v{} 启动", crate::VERSION);
    match &config_path {
        Some(path) => info!("已加载配置文件: {}", path.display()),
        None => debug!("未找到配置文件，使用默认配置"),
    }

    execute_command(args, config, logging, out)
}

/// 执行CLI命令
///
/// 打开连接并初始化表结构后执行子命令，最后关闭连接。
/// 未指定子命令时只初始化表结构。
pub fn execute_command(
    args: &Args,
    config: Config,
    logging: LoggingSystem,
    out: &mut dyn Write,
) -> Result<()> {
    let db_url = resolve_database_url(args.db.as_deref(), &config);
    let db = Database::open_with_schema(&db_url)
        .with_context(|| format!("打开数据库失败: {db_url}"))?;

    let mut ctx = CommandContext {
        config,
        store: SqliteStudentStore::new(db),
        logging,
    };

    let result = match &args.command {
        Some(command) => build_command(command).execute(&mut ctx, out),
        None => {
            info!("未指定子命令，仅初始化数据库");
            Ok(())
        }
    };

    let close_result = ctx.store.into_database().close();

    result.context("命令执行失败")?;
    close_result.context("关闭数据库失败")?;
    Ok(())
}

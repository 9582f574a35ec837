//! 命令行参数定义
//!
//! 使用clap定义应用程序的命令行接口

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Students - 学生成绩记录工具
#[derive(Parser, Debug, Clone)]
#[command(
    name = crate::APP_NAME,
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None
)]
pub struct Args {
    /// 数据库连接字符串
    #[arg(
        long,
        global = true,
        value_name = "CONNSTR",
        help = "数据库连接字符串（文件路径、:memory:、sqlite://PATH 或 file: URI）",
        env = "STUDENTS_DB"
    )]
    pub db: Option<String>,

    /// 配置文件路径
    #[arg(
        short,
        long,
        global = true,
        value_name = "FILE",
        help = "配置文件路径",
        env = "STUDENTS_CONFIG"
    )]
    pub config: Option<PathBuf>,

    /// 日志级别
    #[arg(
        short,
        long,
        global = true,
        value_enum,
        help = "日志级别",
        env = "STUDENTS_LOG_LEVEL"
    )]
    pub log_level: Option<LogLevel>,

    /// 子命令，缺省时只初始化数据库
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// 日志级别枚举
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum LogLevel {
    /// 调试级别
    Debug,
    /// 信息级别
    Info,
    /// 警告级别
    Warn,
    /// 错误级别
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

/// 子命令定义
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// 添加学生
    Add {
        /// 学生姓名
        #[arg(short, long, value_name = "NAME", help = "学生姓名")]
        name: String,

        /// 班级编号
        #[arg(short, long, value_name = "GROUP", help = "班级编号")]
        group: Option<String>,

        /// 五门成绩
        #[arg(
            short,
            long,
            value_name = "GRADE",
            num_args = 5,
            required = true,
            action = ArgAction::Set,
            help = "五门成绩"
        )]
        performance: Vec<i32>,
    },

    /// 显示全部学生
    Display {
        /// 输出格式
        #[arg(short, long, value_enum, default_value = "table", help = "输出格式")]
        format: OutputFormat,
    },

    /// 查找有不及格成绩（2分）的学生
    Find {
        /// 输出格式
        #[arg(short, long, value_enum, default_value = "table", help = "输出格式")]
        format: OutputFormat,
    },
}

/// 输出格式枚举
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum OutputFormat {
    /// 表格格式
    Table,
    /// JSON格式
    Json,
}

impl Args {
    /// 命令行指定的日志级别
    pub fn log_level_override(&self) -> Option<log::LevelFilter> {
        self.log_level.clone().map(Into::into)
    }
}

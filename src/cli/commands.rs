//! 命令处理逻辑
//!
//! 实现 add / display / find 三个子命令

use crate::cli::args::{Commands, OutputFormat};
use crate::config::Config;
use crate::error::{Result, StudentsError};
use crate::logging::LoggingSystem;
use crate::presenter;
use crate::storage::{SqliteStudentStore, StudentStore};
use crate::student::{NewStudent, StudentRecord};
use std::io::Write;
use tracing::info;

/// 命令执行上下文
pub struct CommandContext {
    /// 已加载的配置
    pub config: Config,
    /// 学生存储
    pub store: SqliteStudentStore,
    /// 日志系统（审计日志）
    pub logging: LoggingSystem,
}

/// 命令处理器trait
pub trait Command {
    /// 执行命令，结果写入 `out`
    fn execute(&self, ctx: &mut CommandContext, out: &mut dyn Write) -> Result<()>;
}

/// 根据子命令创建处理器
pub fn build_command(command: &Commands) -> Box<dyn Command> {
    match command {
        Commands::Add {
            name,
            group,
            performance,
        } => Box::new(AddCommand {
            name: name.clone(),
            group: group.clone(),
            performance: performance.clone(),
        }),
        Commands::Display { format } => Box::new(DisplayCommand { format: *format }),
        Commands::Find { format } => Box::new(FindCommand { format: *format }),
    }
}

/// 添加命令
pub struct AddCommand {
    /// 学生姓名
    pub name: String,
    /// 班级编号，缺省时使用配置中的默认班级
    pub group: Option<String>,
    /// 成绩
    pub performance: Vec<i32>,
}

impl Command for AddCommand {
    fn execute(&self, ctx: &mut CommandContext, _out: &mut dyn Write) -> Result<()> {
        let group = self
            .group
            .clone()
            .or_else(|| ctx.config.defaults.group.clone())
            .ok_or(StudentsError::MissingGroup)?;

        let student = NewStudent::new(self.name.clone(), group, self.performance.clone())?;
        let student_id = ctx.store.add_student(&student)?;

        info!("已添加学生: {} ({})", student.name, student.group);
        ctx.logging.audit_log(
            "add_student",
            "success",
            Some(&format!(
                "id={} name={} group={} performance={}",
                student_id,
                student.name,
                student.group,
                student.performance.to_blob()
            )),
        );

        Ok(())
    }
}

/// 显示命令
pub struct DisplayCommand {
    /// 输出格式
    pub format: OutputFormat,
}

impl Command for DisplayCommand {
    fn execute(&self, ctx: &mut CommandContext, out: &mut dyn Write) -> Result<()> {
        let students = ctx.store.select_all()?;
        print_students(&students, self.format, out)
    }
}

/// 查找命令
pub struct FindCommand {
    /// 输出格式
    pub format: OutputFormat,
}

impl Command for FindCommand {
    fn execute(&self, ctx: &mut CommandContext, out: &mut dyn Write) -> Result<()> {
        let students = ctx.store.select_failing()?;
        print_students(&students, self.format, out)
    }
}

/// 按格式输出学生列表
fn print_students(
    students: &[StudentRecord],
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    let rendered = match format {
        OutputFormat::Table => presenter::render_table(students),
        OutputFormat::Json => presenter::render_json(students)?,
    };
    writeln!(out, "{rendered}")?;
    Ok(())
}

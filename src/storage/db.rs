//! 数据库连接与表结构
//!
//! 解析连接字符串、打开 SQLite 连接并保证 groups / students 两张表存在

use crate::error::{ConfigError, Result, StudentsError};
use rusqlite::Connection;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 连接字符串解析后的目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionTarget {
    /// 内存数据库，进程结束即丢弃
    Memory,
    /// 数据库文件路径
    File(PathBuf),
    /// SQLite `file:` URI
    Uri(String),
}

impl ConnectionTarget {
    /// 解析连接字符串
    ///
    /// 支持的格式：
    /// - `:memory:` 或 `sqlite::memory:`
    /// - `sqlite://path/to/students.db`
    /// - `file:students.db?mode=rwc`
    /// - 普通文件路径
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ConfigError::ValidationError("数据库连接字符串不能为空".to_string()).into());
        }

        if url == ":memory:" || url == "sqlite::memory:" {
            return Ok(Self::Memory);
        }

        if let Some(path) = url.strip_prefix("sqlite://") {
            if path.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "数据库连接字符串缺少路径: {url}"
                ))
                .into());
            }
            if path == ":memory:" {
                return Ok(Self::Memory);
            }
            return Ok(Self::File(PathBuf::from(path)));
        }

        if url.starts_with("file:") {
            return Ok(Self::Uri(url.to_string()));
        }

        Ok(Self::File(PathBuf::from(url)))
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionTarget::Memory => write!(f, ":memory:"),
            ConnectionTarget::File(path) => write!(f, "{}", path.display()),
            ConnectionTarget::Uri(uri) => write!(f, "{uri}"),
        }
    }
}

/// 数据库连接
#[derive(Debug)]
pub struct Database {
    conn: Connection,
    target: ConnectionTarget,
}

impl Database {
    /// 根据连接字符串打开数据库
    pub fn open(url: &str) -> Result<Self> {
        let target = ConnectionTarget::parse(url)?;

        let conn = match &target {
            ConnectionTarget::Memory => Connection::open_in_memory()?,
            ConnectionTarget::File(path) => {
                ensure_parent_dir(path)?;
                Connection::open(path)?
            }
            // 默认打开标志已包含 SQLITE_OPEN_URI
            ConnectionTarget::Uri(uri) => Connection::open(uri)?,
        };

        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        debug!("已打开数据库: {}", target);
        Ok(Self { conn, target })
    }

    /// 打开数据库并初始化表结构
    pub fn open_with_schema(url: &str) -> Result<Self> {
        let db = Self::open(url)?;
        db.init_schema()?;
        Ok(db)
    }

    /// 创建表结构（可重复执行）
    pub fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS groups (
                group_id     INTEGER PRIMARY KEY AUTOINCREMENT,
                group_number TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS students (
                student_id   INTEGER PRIMARY KEY AUTOINCREMENT,
                student_name TEXT NOT NULL,
                group_id     INTEGER NOT NULL REFERENCES groups(group_id),
                performance  TEXT NOT NULL
            )",
            [],
        )?;

        // 班级编号唯一，添加学生时的 upsert 依赖此索引
        let duplicates = self.duplicate_group_numbers()?;
        if !duplicates.is_empty() {
            return Err(StudentsError::DuplicateGroups(duplicates));
        }
        self.conn.execute(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_groups_group_number ON groups(group_number)",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_students_group_id ON students(group_id)",
            [],
        )?;

        info!("数据库表结构已就绪: {}", self.target);
        Ok(())
    }

    /// 出现不止一次的班级编号（旧库可能存在）
    fn duplicate_group_numbers(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT group_number FROM groups
             GROUP BY group_number
             HAVING COUNT(*) > 1
             ORDER BY group_number",
        )?;
        let numbers = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(numbers)
    }

    /// 只读连接
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// 可变连接（用于事务）
    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// 关闭连接
    pub fn close(self) -> Result<()> {
        let target = self.target;
        self.conn.close().map_err(|(_, e)| e)?;
        debug!("已关闭数据库: {}", target);
        Ok(())
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn table_names(db: &Database) -> Vec<String> {
        let mut stmt = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap();
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        tables
    }

    #[test]
    fn test_parse_connection_targets() {
        assert_eq!(ConnectionTarget::parse(":memory:").unwrap(), ConnectionTarget::Memory);
        assert_eq!(
            ConnectionTarget::parse("sqlite::memory:").unwrap(),
            ConnectionTarget::Memory
        );
        assert_eq!(
            ConnectionTarget::parse("sqlite://data/students.db").unwrap(),
            ConnectionTarget::File(PathBuf::from("data/students.db"))
        );
        assert_eq!(
            ConnectionTarget::parse("file:students.db?mode=rwc").unwrap(),
            ConnectionTarget::Uri("file:students.db?mode=rwc".to_string())
        );
        assert_eq!(
            ConnectionTarget::parse(" students.db ").unwrap(),
            ConnectionTarget::File(PathBuf::from("students.db"))
        );
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(ConnectionTarget::parse("").is_err());
        assert!(ConnectionTarget::parse("   ").is_err());
        assert!(ConnectionTarget::parse("sqlite://").is_err());
    }

    #[test]
    fn test_db_creation_and_schema() {
        let db = Database::open_with_schema(":memory:").unwrap();

        let tables = table_names(&db);
        assert!(tables.contains(&"groups".to_string()));
        assert!(tables.contains(&"students".to_string()));
    }

    #[test]
    fn test_init_schema_is_idempotent() {
        let db = Database::open_with_schema(":memory:").unwrap();
        db.init_schema().unwrap();
        db.init_schema().unwrap();

        let tables = table_names(&db);
        assert_eq!(tables.iter().filter(|t| t.as_str() == "groups").count(), 1);
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let db = Database::open_with_schema(":memory:").unwrap();

        let result = db.conn().execute(
            "INSERT INTO students (student_name, group_id, performance) VALUES ('X', 42, '5,5,5,5,5')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_existing_duplicate_groups_reported() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("students.db");
        let url = db_path.to_str().unwrap();

        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(
            "CREATE TABLE groups (
                 group_id     INTEGER PRIMARY KEY AUTOINCREMENT,
                 group_number TEXT NOT NULL
             );
             INSERT INTO groups (group_number) VALUES ('101'), ('101'), ('102');",
        )
        .unwrap();
        drop(conn);

        match Database::open_with_schema(url) {
            Err(StudentsError::DuplicateGroups(numbers)) => {
                assert_eq!(numbers, vec!["101".to_string()]);
            }
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("duplicate group numbers were accepted"),
        }

        let err = Database::open_with_schema(url).unwrap_err();
        assert!(err.to_string().contains("101"));
        assert!(!err.to_string().contains("102"));
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("students.db");

        let db = Database::open_with_schema(db_path.to_str().unwrap()).unwrap();
        db.close().unwrap();

        assert!(db_path.exists());
    }
}

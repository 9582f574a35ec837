//! 学生记录仓库
//!
//! 在内存中的学生记录与 groups / students 两张表之间做映射

use crate::error::Result;
use crate::storage::db::Database;
use crate::student::{
    Group, NewStudent, Performance, StudentRecord, FAILING_GRADE, GRADE_DELIMITER,
};
use rusqlite::{params, OptionalExtension};
use tracing::debug;

/// 关联查询学生与班级的公共部分
const SELECT_STUDENTS: &str = "SELECT students.student_id, students.student_name,
        groups.group_number, students.performance
    FROM students
    INNER JOIN groups ON groups.group_id = students.group_id";

/// 按姓名排序，同名时按写入顺序
const ORDER_BY_NAME: &str = "ORDER BY students.student_name, students.student_id";

/// 学生存储trait，定义记录读写接口
pub trait StudentStore {
    /// 添加学生，必要时创建班级
    ///
    /// # 返回
    /// * `Result<i64>` - 新学生的ID
    fn add_student(&mut self, student: &NewStudent) -> Result<i64>;

    /// 查询全部学生（按姓名排序）
    fn select_all(&self) -> Result<Vec<StudentRecord>>;

    /// 查询至少有一门不及格的学生（按姓名排序）
    fn select_failing(&self) -> Result<Vec<StudentRecord>>;
}

/// 基于 SQLite 的学生存储
pub struct SqliteStudentStore {
    db: Database,
}

impl SqliteStudentStore {
    /// 使用已初始化表结构的数据库创建存储
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// 底层数据库
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// 释放存储并返回数据库连接
    pub fn into_database(self) -> Database {
        self.db
    }

    /// 按编号查找班级
    pub fn find_group(&self, number: &str) -> Result<Option<Group>> {
        let group = self
            .db
            .conn()
            .query_row(
                "SELECT group_id, group_number FROM groups WHERE group_number = ?1",
                params![number],
                |row| {
                    Ok(Group {
                        id: row.get(0)?,
                        number: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(group)
    }

    /// 查询全部班级
    pub fn groups(&self) -> Result<Vec<Group>> {
        let mut stmt = self
            .db
            .conn()
            .prepare("SELECT group_id, group_number FROM groups ORDER BY group_id")?;

        let rows = stmt.query_map([], |row| {
            Ok(Group {
                id: row.get(0)?,
                number: row.get(1)?,
            })
        })?;

        let mut result = Vec::new();
        for group in rows {
            result.push(group?);
        }
        Ok(result)
    }

    fn query_students(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<StudentRecord>> {
        let mut stmt = self.db.conn().prepare(sql)?;

        let rows = stmt.query_map(params, |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut result = Vec::new();
        for row in rows {
            let (id, name, group, blob) = row?;
            result.push(StudentRecord {
                id,
                name,
                group,
                performance: Performance::from_blob(&blob)?,
            });
        }
        Ok(result)
    }
}

impl StudentStore for SqliteStudentStore {
    fn add_student(&mut self, student: &NewStudent) -> Result<i64> {
        let tx = self.db.conn_mut().transaction()?;

        // 已有班级时 DO UPDATE 不改变数据，只为让 RETURNING 返回现有ID
        let group_id: i64 = tx.query_row(
            "INSERT INTO groups (group_number) VALUES (?1)
             ON CONFLICT(group_number) DO UPDATE SET group_number = excluded.group_number
             RETURNING group_id",
            params![student.group],
            |row| row.get(0),
        )?;

        tx.execute(
            "INSERT INTO students (student_name, group_id, performance) VALUES (?1, ?2, ?3)",
            params![student.name, group_id, student.performance.to_blob()],
        )?;
        let student_id = tx.last_insert_rowid();

        tx.commit()?;

        debug!(
            "已添加学生 {} (ID {})，班级 {} (ID {})",
            student.name, student_id, student.group, group_id
        );
        Ok(student_id)
    }

    fn select_all(&self) -> Result<Vec<StudentRecord>> {
        let sql = format!("{SELECT_STUDENTS} {ORDER_BY_NAME}");
        let students = self.query_students(&sql, &[])?;
        debug!("查询到 {} 名学生", students.len());
        Ok(students)
    }

    fn select_failing(&self) -> Result<Vec<StudentRecord>> {
        // 两端补分隔符后按整项匹配，避免 12 之类的成绩被误判
        let sql = format!(
            "{SELECT_STUDENTS}
            WHERE ('{d}' || students.performance || '{d}') LIKE ?1
            {ORDER_BY_NAME}",
            d = GRADE_DELIMITER
        );
        let pattern = format!("%{d}{FAILING_GRADE}{d}%", d = GRADE_DELIMITER);

        let students = self.query_students(&sql, &[&pattern as &dyn rusqlite::ToSql])?;
        debug!("查询到 {} 名有不及格成绩的学生", students.len());
        Ok(students)
    }
}

//! 学生数据模型
//!
//! 定义班级、学生以及成绩序列的内存表示，以及成绩与数据库文本字段之间的转换

use crate::error::{Result, StudentsError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 每个学生的成绩数量
pub const GRADE_COUNT: usize = 5;

/// 不及格成绩
pub const FAILING_GRADE: i32 = 2;

/// 成绩在数据库中的分隔符
pub const GRADE_DELIMITER: char = ',';

/// 班级
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// 班级ID
    pub id: i64,
    /// 班级编号
    pub number: String,
}

/// 学生成绩序列
///
/// 新建时必须恰好包含 [`GRADE_COUNT`] 个成绩；从数据库读回时按原样解析，
/// 保持成绩顺序不变。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Performance(Vec<i32>);

impl Performance {
    /// 创建成绩序列，成绩数量必须为5
    pub fn new(grades: Vec<i32>) -> Result<Self> {
        if grades.len() != GRADE_COUNT {
            return Err(StudentsError::InvalidPerformance(format!(
                "需要 {} 个成绩，实际 {} 个",
                GRADE_COUNT,
                grades.len()
            )));
        }
        Ok(Self(grades))
    }

    /// 从数据库中的逗号分隔文本解析成绩
    pub fn from_blob(blob: &str) -> Result<Self> {
        let grades = blob
            .split(GRADE_DELIMITER)
            .map(|grade| {
                grade.trim().parse::<i32>().map_err(|e| {
                    StudentsError::InvalidPerformance(format!("无法解析成绩 '{grade}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self(grades))
    }

    /// 转换为数据库中存储的逗号分隔文本，例如 `5,4,3,2,5`
    pub fn to_blob(&self) -> String {
        self.0
            .iter()
            .map(|grade| grade.to_string())
            .collect::<Vec<_>>()
            .join(&GRADE_DELIMITER.to_string())
    }

    /// 是否至少有一门不及格
    pub fn has_failing_grade(&self) -> bool {
        self.0.contains(&FAILING_GRADE)
    }

    /// 成绩切片
    pub fn grades(&self) -> &[i32] {
        &self.0
    }
}

impl fmt::Display for Performance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|grade| grade.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{joined}")
    }
}

/// 待写入的新学生
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    /// 姓名
    pub name: String,
    /// 班级编号
    pub group: String,
    /// 成绩
    pub performance: Performance,
}

impl NewStudent {
    /// 创建新学生记录，姓名不能为空
    pub fn new(name: impl Into<String>, group: impl Into<String>, grades: Vec<i32>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(StudentsError::InvalidName);
        }

        Ok(Self {
            name,
            group: group.into(),
            performance: Performance::new(grades)?,
        })
    }
}

/// 从数据库读出的学生记录（已关联班级）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// 学生ID
    pub id: i64,
    /// 姓名
    pub name: String,
    /// 班级编号
    pub group: String,
    /// 成绩
    pub performance: Performance,
}

//! 学生列表输出
//!
//! 把学生记录渲染为固定列宽的表格或 JSON

use crate::error::Result;
use crate::student::StudentRecord;

/// 学生列表为空时的提示
pub const EMPTY_LIST_MESSAGE: &str = "学生列表为空。";

/// 序号列宽
const NUMBER_WIDTH: usize = 4;
/// 姓名列宽
const NAME_WIDTH: usize = 30;
/// 班级列宽
const GROUP_WIDTH: usize = 10;
/// 成绩列宽
const PERFORMANCE_WIDTH: usize = 20;

/// 渲染表格
///
/// 列宽固定，超长内容不截断（边框会错位）。
pub fn render_table(students: &[StudentRecord]) -> String {
    if students.is_empty() {
        return EMPTY_LIST_MESSAGE.to_string();
    }

    let line = format!(
        "+-{}-+-{}-+-{}-+-{}-+",
        "-".repeat(NUMBER_WIDTH),
        "-".repeat(NAME_WIDTH),
        "-".repeat(GROUP_WIDTH),
        "-".repeat(PERFORMANCE_WIDTH)
    );

    let mut lines = Vec::with_capacity(students.len() * 2 + 3);
    lines.push(line.clone());
    lines.push(format!(
        "| {:^nw$} | {:^aw$} | {:^gw$} | {:^pw$} |",
        "No",
        "姓名",
        "班级",
        "成绩",
        nw = NUMBER_WIDTH,
        aw = NAME_WIDTH,
        gw = GROUP_WIDTH,
        pw = PERFORMANCE_WIDTH
    ));
    lines.push(line.clone());

    for (idx, student) in students.iter().enumerate() {
        lines.push(format!(
            "| {:>nw$} | {:<aw$} | {:<gw$} | {:<pw$} |",
            idx + 1,
            student.name,
            student.group,
            student.performance.to_string(),
            nw = NUMBER_WIDTH,
            aw = NAME_WIDTH,
            gw = GROUP_WIDTH,
            pw = PERFORMANCE_WIDTH
        ));
        lines.push(line.clone());
    }

    lines.join("\n")
}

/// 渲染 JSON 数组
pub fn render_json(students: &[StudentRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(students)?)
}

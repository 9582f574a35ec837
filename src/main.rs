//! Students 主程序入口
//!
//! 学生成绩记录工具

use clap::Parser;
use students::app;
use students::cli::Args;

fn main() {
    // 解析命令行参数
    let args = Args::parse();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if let Err(e) = app::run(&args, &mut out) {
        eprintln!("错误: {e:#}");
        std::process::exit(1);
    }
}

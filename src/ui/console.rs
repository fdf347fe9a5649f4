//! 控制台交互：清屏、欢迎信息、多行流程描述与附加指令输入
//!
//! 读取函数对 BufRead 泛型，便于测试时用内存输入替代 stdin。

use std::io::{self, BufRead, Write};

use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};

use crate::core::ProcessRequest;

const BANNER: &str = "==============================================\n\
  Business Process Automation Advisor\n\
==============================================";

/// 清屏并把光标移到左上角；非终端输出时忽略失败
pub fn clear_screen() {
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, Clear(ClearType::All), MoveTo(0, 0)) {
        tracing::debug!("Clear screen skipped: {}", e);
    }
}

pub fn print_banner() {
    println!("{BANNER}");
    println!("Describe the business process you want analysed.");
    println!("Finish the description with an empty line.\n");
}

/// 逐行读取直到空行或 EOF
pub fn read_description<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.trim().is_empty() {
            break;
        }
        lines.push(trimmed.to_string());
    }
    Ok(lines.join("\n"))
}

/// 读取一行附加指令；空行或 EOF 视为 "none"
pub fn read_instructions<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    let trimmed = line.trim();
    Ok(if trimmed.is_empty() {
        "none".to_string()
    } else {
        trimmed.to_string()
    })
}

/// 完整交互：描述 + 附加指令
pub fn prompt_request<R: BufRead>(reader: &mut R) -> io::Result<ProcessRequest> {
    println!("Process description:");
    io::stdout().flush()?;
    let description = read_description(reader)?;

    print!("Additional instructions (or 'none'): ");
    io::stdout().flush()?;
    let instructions = read_instructions(reader)?;

    Ok(ProcessRequest::new(description, Some(instructions)))
}

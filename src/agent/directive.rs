//! 动作指令解析
//!
//! 模型的自由文本指令约定形如 "<工具提示> : <参数>"。解析与路由分离：这里只产出封闭的
//! ActionDirective，编排器再把它映射到唯一一个工具。匹配为大小写不敏感的全文子串，
//! 优先级 sandbox > read > retrieve/vector；参数取最后一个冒号之后的部分，无冒号时取全文。

/// 解析后的动作指令
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionDirective {
    /// 在沙箱中执行 shell 命令
    Sandbox(String),
    /// 读取受限根下的文件
    ReadFile(String),
    /// 查询检索索引
    Retrieve(String),
    /// 无法识别的指令（原文保留，便于诊断）
    Unknown(String),
}

/// 从模型文本解析动作指令
pub fn parse_directive(text: &str) -> ActionDirective {
    let lower = text.to_lowercase();
    if lower.contains("sandbox") {
        ActionDirective::Sandbox(trailing_argument(text))
    } else if lower.contains("read") {
        ActionDirective::ReadFile(trailing_argument(text))
    } else if lower.contains("retrieve") || lower.contains("vector") {
        ActionDirective::Retrieve(trailing_argument(text))
    } else {
        ActionDirective::Unknown(text.trim().to_string())
    }
}

/// 最后一个冒号之后的参数；没有冒号时整个文本即参数
fn trailing_argument(text: &str) -> String {
    match text.rfind(':') {
        Some(idx) => text[idx + 1..].trim().to_string(),
        None => text.trim().to_string(),
    }
}

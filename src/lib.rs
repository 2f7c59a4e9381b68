//! Scout - 有界自治任务循环
//!
//! 给定目标后反复 计划 -> 执行 -> 反思，直到判定完成或迭代预算耗尽。
//! 模块划分：
//! - **agent**: 编排器状态机（plan/act/reflect）与动作指令解析
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型
//! - **index**: 内容寻址摄取、分块与向量检索索引
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Mock）
//! - **observability**: tracing 初始化
//! - **tools**: 沙箱命令执行、受限文件访问、审计日志

pub mod agent;
pub mod config;
pub mod core;
pub mod index;
pub mod llm;
pub mod observability;
pub mod tools;

//! Agent 错误类型
//!
//! 仅基础设施级失败（LLM 重试耗尽、索引/审计 IO、配置、取消）会作为 AgentError 逃出 run；
//! 工具级失败一律折叠为 ToolResult{ok:false} 写回对话。

use thiserror::Error;

/// 单次运行的致命错误（工具失败不在此列）
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM 服务在自身重试策略耗尽后仍失败
    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Index error: {0}")]
    IndexError(String),

    #[error("Audit log error: {0}")]
    AuditError(String),

    #[error("Ingest failed: {0}")]
    IngestFailed(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    /// 外部调用方通过 CancellationToken 中断运行
    #[error("Cancelled")]
    Cancelled,
}

//! 工具层：沙箱命令执行、受限文件访问、审计日志
//!
//! 所有工具调用恰好返回一个 ToolResult；失败（拒绝访问、未找到、执行失败、不可识别）
//! 折叠为 ok=false，从不向调用方抛异常。

pub mod audit;
pub mod sandbox;
pub mod scoped_fs;

use serde::Serialize;
use serde_json::{Map, Value};

pub use audit::AuditLog;
pub use sandbox::SandboxTool;
pub use scoped_fs::ScopedFs;

/// 工具调用结果：输出文本、成功标志与只读附加信息
#[derive(Clone, Debug, Serialize)]
pub struct ToolResult {
    pub output: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl ToolResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            ok: true,
            metadata: None,
        }
    }

    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            ok: false,
            metadata: None,
        }
    }

    /// 附加一条元数据（duration、path、hits 等）
    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }
}

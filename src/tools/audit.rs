//! 审计日志
//!
//! 追加式 JSONL：文件以 append 模式打开一次，每个事件写一行 JSON，带 RFC 3339 时间戳，
//! 从不回读或改写已有行。并发运行共享同一实例时由互斥锁串行化，避免交错的半行。

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;

use crate::core::AgentError;

/// 追加式审计日志：每行一个结构化事件
pub struct AuditLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl AuditLog {
    /// 打开（或创建）审计日志文件，父目录按需创建
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AgentError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AgentError::AuditError(e.to_string()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| AgentError::AuditError(e.to_string()))?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 追加一个事件：补上时间戳与事件名后序列化为单行 JSON
    pub fn append(&self, event: &str, mut payload: Value) -> Result<(), AgentError> {
        if let Value::Object(map) = &mut payload {
            map.insert(
                "ts".to_string(),
                Value::String(chrono::Utc::now().to_rfc3339()),
            );
            map.insert("type".to_string(), Value::String(event.to_string()));
        }
        let mut file = self
            .file
            .lock()
            .map_err(|_| AgentError::AuditError("audit lock poisoned".to_string()))?;
        writeln!(file, "{}", payload).map_err(|e| AgentError::AuditError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_appends_one_json_line_per_event() {
        let dir = TempDir::new().unwrap();
        let log = AuditLog::open(dir.path().join("logs/audit.log")).unwrap();
        log.append("plan", json!({ "goal": "g", "plan": ["a"] })).unwrap();
        log.append("act", json!({ "action": "read: x", "ok": false })).unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["type"], "plan");
        assert!(first["ts"].is_string());
        let second: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["type"], "act");
    }

    #[test]
    fn test_reopen_preserves_prior_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("audit.log");
        {
            let log = AuditLog::open(&path).unwrap();
            log.append("plan", json!({ "goal": "g1" })).unwrap();
        }
        let log = AuditLog::open(&path).unwrap();
        log.append("plan", json!({ "goal": "g2" })).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("g1"));
        assert!(lines[1].contains("g2"));
    }
}

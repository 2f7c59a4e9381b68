//! 受限文件访问
//!
//! 绑定根目录，读写路径经完全解析（词法归一化 + canonicalize，消除 ../ 与符号链接）后
//! 必须等于根或严格位于根下，否则拒绝；拒绝与未找到返回不同的失败消息，均不抛异常。
//! 包含性检查先于任何文件系统写动作，根外路径连瞬时都不会被触碰。

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use serde_json::json;

use crate::tools::ToolResult;

/// 受限文件系统：所有操作限定在 root 下
#[derive(Debug, Clone)]
pub struct ScopedFs {
    root: PathBuf,
}

impl ScopedFs {
    /// 创建并规范化根目录（不存在时先建立）
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let _ = std::fs::create_dir_all(&root);
        let root = root.canonicalize().unwrap_or(root);
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 读取相对路径的文本内容；越界 -> "Access denied"，不存在 -> "Not found"
    pub fn read(&self, relative_path: &str) -> ToolResult {
        let target = match self.resolve_existing(relative_path) {
            Ok(Some(p)) => p,
            Ok(None) => return ToolResult::failure("Not found"),
            Err(()) => return ToolResult::failure("Access denied"),
        };
        match std::fs::read_to_string(&target) {
            Ok(content) => ToolResult::success(content),
            Err(e) => ToolResult::failure(format!("Read failed: {}", e)),
        }
    }

    /// 写入（覆盖）相对路径，按需创建父目录；返回解析后的绝对路径
    pub fn write(&self, relative_path: &str, content: &str) -> ToolResult {
        let target = match self.resolve_for_write(relative_path) {
            Ok(p) => p,
            Err(()) => return ToolResult::failure("Access denied"),
        };
        if let Some(parent) = target.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return ToolResult::failure(format!("Write failed: {}", e));
            }
        }
        match std::fs::write(&target, content) {
            Ok(()) => ToolResult::success("written")
                .with_meta("path", json!(target.display().to_string())),
            Err(e) => ToolResult::failure(format!("Write failed: {}", e)),
        }
    }

    /// 解析已存在路径：canonicalize 后必须位于根下；不存在返回 Ok(None)
    fn resolve_existing(&self, relative_path: &str) -> Result<Option<PathBuf>, ()> {
        let normalized = self.normalize(relative_path)?;
        let full = self.root.join(normalized);
        match full.canonicalize() {
            Ok(resolved) => {
                if resolved.starts_with(&self.root) {
                    Ok(Some(resolved))
                } else {
                    Err(()) // 经符号链接逃出根
                }
            }
            Err(_) => Ok(None),
        }
    }

    /// 解析写目标：逐级找到已存在的祖先并 canonicalize，余下部分原样拼回，
    /// 在创建任何目录/文件之前完成包含性检查
    fn resolve_for_write(&self, relative_path: &str) -> Result<PathBuf, ()> {
        let normalized = self.normalize(relative_path)?;
        if normalized.as_os_str().is_empty() {
            return Err(()); // 根本身不可作为写目标
        }
        let full = self.root.join(normalized);
        let mut existing = full.clone();
        let mut rest: Vec<OsString> = Vec::new();
        while !existing.exists() {
            match (existing.parent(), existing.file_name()) {
                (Some(parent), Some(name)) => {
                    rest.push(name.to_os_string());
                    existing = parent.to_path_buf();
                }
                _ => return Err(()),
            }
        }
        let mut resolved = existing.canonicalize().map_err(|_| ())?;
        for name in rest.iter().rev() {
            resolved.push(name);
        }
        if resolved.starts_with(&self.root) {
            Ok(resolved)
        } else {
            Err(())
        }
    }

    /// 词法归一化：拒绝绝对路径与越出根的 ..，返回根下相对路径
    fn normalize(&self, relative_path: &str) -> Result<PathBuf, ()> {
        let path = Path::new(relative_path.trim());
        let mut parts: Vec<OsString> = Vec::new();
        for comp in path.components() {
            match comp {
                Component::Normal(name) => parts.push(name.to_os_string()),
                Component::CurDir => {}
                Component::ParentDir => {
                    if parts.pop().is_none() {
                        return Err(()); // ../ 越出根
                    }
                }
                Component::RootDir | Component::Prefix(_) => return Err(()), // 绝对路径覆盖
            }
        }
        Ok(parts.iter().collect())
    }
}

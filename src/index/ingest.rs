//! 内容寻址摄取
//!
//! 递归扫描目录（按扩展名白名单过滤），逐文件流式计算指纹；指纹已存在则整文件跳过，
//! 否则分块后以 "{fingerprint}:{i}" 为 id 摄取，元数据带来源路径与指纹。
//! 空文件零块，但指纹仍标记为已见，重复扫描不会反复处理。

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use walkdir::WalkDir;

use crate::core::AgentError;
use crate::index::chunk::{fingerprint_file, Chunker};
use crate::index::KnowledgeIndex;

/// 内容寻址摄取器：同一字节内容无论出现在多少路径下都只进索引一次
pub struct Ingester {
    index: Arc<dyn KnowledgeIndex>,
    chunker: Chunker,
    allowed_exts: Vec<String>,
}

impl Ingester {
    pub fn new(index: Arc<dyn KnowledgeIndex>, chunker: Chunker, allowed_exts: Vec<String>) -> Self {
        let allowed_exts = allowed_exts.into_iter().map(|e| e.to_lowercase()).collect();
        Self {
            index,
            chunker,
            allowed_exts,
        }
    }

    /// 摄取目录下所有候选文件，返回新增块数
    pub async fn ingest_dir(&self, root: impl AsRef<Path>) -> Result<usize, AgentError> {
        let mut added = 0;
        for entry in WalkDir::new(root.as_ref()) {
            let entry = entry.map_err(|e| AgentError::IngestFailed(e.to_string()))?;
            if !entry.file_type().is_file() || !self.is_allowed(entry.path()) {
                continue;
            }
            added += self.ingest_file(entry.path()).await?;
        }
        Ok(added)
    }

    /// 摄取单个文件；指纹已存在时返回 0
    pub async fn ingest_file(&self, path: &Path) -> Result<usize, AgentError> {
        let fingerprint = fingerprint_file(path)?;
        if self.index.exists(&fingerprint).await {
            tracing::debug!(file = %path.display(), "already ingested, skipping");
            return Ok(0);
        }
        let bytes = std::fs::read(path)
            .map_err(|e| AgentError::IngestFailed(format!("{}: {}", path.display(), e)))?;
        let text = String::from_utf8_lossy(&bytes);
        let chunks = self.chunker.chunk_text(&text);
        if chunks.is_empty() {
            // 空文件：零块，但指纹标记已见
            self.index.mark_seen(&fingerprint).await;
            return Ok(0);
        }
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), path.display().to_string());
        metadata.insert("fingerprint".to_string(), fingerprint.clone());
        let count = chunks.len();
        for (i, chunk) in chunks.into_iter().enumerate() {
            let id = format!("{}:{}", fingerprint, i);
            self.index.ingest(&id, &chunk, metadata.clone()).await?;
        }
        tracing::info!(file = %path.display(), chunks = count, "ingested");
        Ok(count)
    }

    fn is_allowed(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let dotted = format!(".{}", e.to_lowercase());
                self.allowed_exts.iter().any(|a| a == &dotted)
            })
            .unwrap_or(false)
    }
}

//! 向量索引
//!
//! KnowledgeIndex 为索引的外部契约；VectorIndex 是进程内实现：嵌入由 LlmClient::embed
//! 提供，查询按余弦相似度降序取 k，读写由 RwLock 保护，可并发使用。
//! 快照（条目 + 已见指纹）序列化到 {collection}.json，供 ingest/run/cleanup 多进程共享。

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::core::AgentError;
use crate::llm::LlmClient;

/// 检索命中：文本与元数据，按相关度降序返回
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Hit {
    pub text: String,
    pub metadata: HashMap<String, String>,
}

/// 检索索引契约：摄取、查询、指纹去重、集合删除
#[async_trait]
pub trait KnowledgeIndex: Send + Sync {
    /// 摄取一个块；id 形如 "{fingerprint}:{i}"
    async fn ingest(
        &self,
        id: &str,
        text: &str,
        metadata: HashMap<String, String>,
    ) -> Result<(), AgentError>;

    /// 查询最相关的 k 个块
    async fn query(&self, text: &str, k: usize) -> Result<Vec<Hit>, AgentError>;

    /// 指纹是否已摄取（含零块的空文件）
    async fn exists(&self, fingerprint: &str) -> bool;

    /// 标记指纹已见；空文件零块时也要去重
    async fn mark_seen(&self, fingerprint: &str);

    /// 删除集合；不存在视为非致命，记日志后吞掉
    async fn delete_collection(&self, name: &str);
}

/// 单个条目：id、文本、向量与元数据
#[derive(Clone, Debug, Serialize, Deserialize)]
struct Entry {
    id: String,
    text: String,
    embedding: Vec<f32>,
    metadata: HashMap<String, String>,
}

/// 持久化快照（集合文件内容）
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    entries: Vec<Entry>,
    seen: HashSet<String>,
}

/// 进程内向量索引
pub struct VectorIndex {
    collection: String,
    dir: PathBuf,
    embedder: Arc<dyn LlmClient>,
    state: RwLock<Snapshot>,
}

impl VectorIndex {
    /// 打开集合：目录下 {collection}.json 存在则载入快照，否则从空开始
    pub fn open(
        dir: impl AsRef<Path>,
        collection: &str,
        embedder: Arc<dyn LlmClient>,
    ) -> Result<Self, AgentError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| AgentError::IndexError(e.to_string()))?;
        let file = dir.join(format!("{}.json", collection));
        let snapshot = if file.exists() {
            let data =
                std::fs::read_to_string(&file).map_err(|e| AgentError::IndexError(e.to_string()))?;
            serde_json::from_str(&data).map_err(|e| AgentError::IndexError(e.to_string()))?
        } else {
            Snapshot::default()
        };
        Ok(Self {
            collection: collection.to_string(),
            dir,
            embedder,
            state: RwLock::new(snapshot),
        })
    }

    fn collection_file(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    /// 将当前快照写回集合文件
    pub async fn save(&self) -> Result<(), AgentError> {
        let state = self.state.read().await;
        let data =
            serde_json::to_string(&*state).map_err(|e| AgentError::IndexError(e.to_string()))?;
        std::fs::write(self.collection_file(&self.collection), data)
            .map_err(|e| AgentError::IndexError(e.to_string()))
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }
}

#[async_trait]
impl KnowledgeIndex for VectorIndex {
    async fn ingest(
        &self,
        id: &str,
        text: &str,
        metadata: HashMap<String, String>,
    ) -> Result<(), AgentError> {
        let embedding = self
            .embedder
            .embed(&[text.to_string()])
            .await
            .map_err(AgentError::IndexError)?
            .into_iter()
            .next()
            .unwrap_or_default();
        let mut state = self.state.write().await;
        if let Some(fp) = metadata.get("fingerprint") {
            state.seen.insert(fp.clone());
        }
        state.entries.push(Entry {
            id: id.to_string(),
            text: text.to_string(),
            embedding,
            metadata,
        });
        Ok(())
    }

    async fn query(&self, text: &str, k: usize) -> Result<Vec<Hit>, AgentError> {
        let query_embedding = self
            .embedder
            .embed(&[text.to_string()])
            .await
            .map_err(AgentError::IndexError)?
            .into_iter()
            .next()
            .unwrap_or_default();
        if query_embedding.is_empty() {
            return Ok(Vec::new());
        }
        let state = self.state.read().await;
        let mut scored: Vec<(f32, &Entry)> = state
            .entries
            .iter()
            .map(|e| (cosine_similarity(&query_embedding, &e.embedding), e))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, e)| Hit {
                text: e.text.clone(),
                metadata: e.metadata.clone(),
            })
            .collect())
    }

    async fn exists(&self, fingerprint: &str) -> bool {
        self.state.read().await.seen.contains(fingerprint)
    }

    async fn mark_seen(&self, fingerprint: &str) {
        self.state.write().await.seen.insert(fingerprint.to_string());
    }

    async fn delete_collection(&self, name: &str) {
        let file = self.collection_file(name);
        match std::fs::remove_file(&file) {
            Ok(()) => tracing::info!(collection = %name, "collection removed"),
            Err(e) => tracing::warn!(collection = %name, error = %e, "cleanup failed"),
        }
        if name == self.collection {
            let mut state = self.state.write().await;
            state.entries.clear();
            state.seen.clear();
        }
    }
}

/// 余弦相似度
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

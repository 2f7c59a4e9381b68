//! 清理入口：删除集合文件
//!
//! 用法：scout-cleanup [collection]；集合不存在只告警，不视为错误。

use std::sync::Arc;

use anyhow::Context;

use scout::config::load_config;
use scout::index::{KnowledgeIndex, VectorIndex};
use scout::llm::OpenAiClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    scout::observability::init();

    let cfg = load_config(None).context("Failed to load config")?;
    let collection = std::env::args()
        .nth(1)
        .unwrap_or_else(|| cfg.app.collection.clone());

    let llm = Arc::new(OpenAiClient::new(&cfg.llm, None));
    let index = VectorIndex::open(&cfg.app.index_dir, &collection, llm)
        .context("Failed to open index")?;
    index.delete_collection(&collection).await;
    Ok(())
}

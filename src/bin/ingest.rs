//! 摄取入口：把目录下的文档分块写入检索索引
//!
//! 用法：scout-ingest [path] [collection]；分块参数读配置（SCOUT__INGEST__* 可覆盖）。

use std::sync::Arc;

use anyhow::Context;

use scout::config::load_config;
use scout::index::{Chunker, Ingester, VectorIndex};
use scout::llm::OpenAiClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    scout::observability::init();

    let cfg = load_config(None).context("Failed to load config")?;
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .unwrap_or_else(|| cfg.app.data_root.display().to_string());
    let collection = args.next().unwrap_or_else(|| cfg.app.collection.clone());

    let llm = Arc::new(OpenAiClient::new(&cfg.llm, None));
    let index = Arc::new(
        VectorIndex::open(&cfg.app.index_dir, &collection, llm).context("Failed to open index")?,
    );
    let chunker = Chunker::new(cfg.ingest.chunk_size, cfg.ingest.chunk_overlap)?;
    let ingester = Ingester::new(index.clone(), chunker, cfg.ingest.allowed_exts.clone());

    let added = ingester.ingest_dir(&path).await?;
    index.save().await?;
    tracing::info!(added, collection = %collection, "ingest finished");
    Ok(())
}

//! Scout - 有界自治任务循环
//!
//! 入口：初始化日志与配置，组装编排器，对命令行给定的 goal 运行一次并打印终态。

use std::sync::Arc;

use anyhow::Context;

use scout::agent::Orchestrator;
use scout::config::load_config;
use scout::index::VectorIndex;
use scout::llm::OpenAiClient;
use scout::tools::{AuditLog, SandboxTool, ScopedFs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    scout::observability::init();

    let mut args = std::env::args().skip(1);
    let goal = args.next().context("usage: scout <goal> [max_iters]")?;
    let max_iters: usize = match args.next() {
        Some(raw) => raw.parse().context("max_iters must be a positive integer")?,
        None => 3,
    };

    let cfg = load_config(None).context("Failed to load config")?;
    let llm = Arc::new(OpenAiClient::new(&cfg.llm, None));
    let index = Arc::new(
        VectorIndex::open(&cfg.app.index_dir, &cfg.app.collection, llm.clone())
            .context("Failed to open index")?,
    );
    let orchestrator = Orchestrator::new(
        llm,
        index,
        SandboxTool::new(&cfg.sandbox),
        ScopedFs::new(&cfg.app.data_root),
        AuditLog::open(&cfg.app.audit_log)?,
    );

    let state = orchestrator.run(&goal, max_iters).await?;
    println!("goal: {}", state.goal);
    println!(
        "completed: {} after {} iterations",
        state.completed, state.iterations
    );
    if let Some(result) = &state.last_result {
        println!("last result (ok={}):\n{}", result.ok, result.output);
    }
    Ok(())
}

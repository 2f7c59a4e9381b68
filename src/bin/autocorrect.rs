//! 自动纠错外环
//!
//! 每轮：先用小迭代预算跑一次 agent，再执行校验命令；agent 判定完成且校验通过即停，
//! 否则带着新上下文重试，直到外环预算耗尽。

use std::sync::Arc;

use anyhow::Context;

use scout::agent::Orchestrator;
use scout::config::load_config;
use scout::index::VectorIndex;
use scout::llm::OpenAiClient;
use scout::tools::{AuditLog, SandboxTool, ScopedFs};

/// 每轮内环的 act/reflect 预算
const INNER_ITERS: usize = 2;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    scout::observability::init();

    let mut args = std::env::args().skip(1);
    let goal = args
        .next()
        .context("usage: scout-autocorrect <goal> [max_rounds] [check_command]")?;
    let max_rounds: usize = match args.next() {
        Some(raw) => raw.parse().context("max_rounds must be a positive integer")?,
        None => 3,
    };
    let check_command = args.next().unwrap_or_else(|| "cargo test -q".to_string());

    let cfg = load_config(None).context("Failed to load config")?;
    let llm = Arc::new(OpenAiClient::new(&cfg.llm, None));
    let index = Arc::new(
        VectorIndex::open(&cfg.app.index_dir, &cfg.app.collection, llm.clone())
            .context("Failed to open index")?,
    );
    // 校验命令需要访问本仓库与构建缓存，跑在宿主机上，仅套墙钟超时
    let checker = SandboxTool::with_backend(&cfg.sandbox, None);
    let orchestrator = Orchestrator::new(
        llm,
        index,
        SandboxTool::new(&cfg.sandbox),
        ScopedFs::new(&cfg.app.data_root),
        AuditLog::open(&cfg.app.audit_log)?,
    );

    for round in 1..=max_rounds {
        tracing::info!(round, "autocorrect round");
        let state = orchestrator.run(&goal, INNER_ITERS).await?;
        let check = checker.run(&check_command).await;
        tracing::info!(completed = state.completed, check_ok = check.ok, "round finished");
        if state.completed && check.ok {
            tracing::info!("goal achieved with passing checks");
            return Ok(());
        }
        tracing::info!("retrying with new context");
    }
    tracing::warn!("autocorrect budget exhausted");
    Ok(())
}

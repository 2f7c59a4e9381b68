//! 编排循环集成测试：终止条件、历史顺序、指令路由与审计

use std::sync::Arc;

use tempfile::TempDir;

use scout::agent::Orchestrator;
use scout::config::SandboxSection;
use scout::core::AgentError;
use scout::index::VectorIndex;
use scout::llm::{MockLlm, Role};
use scout::tools::{AuditLog, SandboxTool, ScopedFs};

fn orchestrator_with(responses: Vec<&str>, dir: &TempDir) -> Orchestrator {
    let llm = Arc::new(MockLlm::scripted(responses));
    let index = Arc::new(
        VectorIndex::open(dir.path().join("index"), "knowledge", llm.clone()).unwrap(),
    );
    let sandbox = SandboxTool::with_backend(&SandboxSection::default(), None);
    let files = ScopedFs::new(dir.path().join("root"));
    let audit = AuditLog::open(dir.path().join("audit.log")).unwrap();
    Orchestrator::new(llm, index, sandbox, files, audit)
}

#[tokio::test]
async fn test_budget_exhausted_after_three_pairs() {
    let dir = TempDir::new().unwrap();
    // plan + 3 × (act, reflect)，反思从不包含 success/done
    let orchestrator = orchestrator_with(
        vec![
            "- inspect the notes",
            "read: missing.txt",
            "keep going",
            "read: missing.txt",
            "keep going",
            "read: missing.txt",
            "keep going",
        ],
        &dir,
    );

    let state = orchestrator.run("summarize notes", 3).await.unwrap();
    assert!(!state.completed);
    assert_eq!(state.iterations, 3);
    // plan 1 条 + 每对 act/reflect 各 2 条
    assert_eq!(state.history.len(), 7);
}

#[tokio::test]
async fn test_done_reflection_stops_after_one_pair() {
    let dir = TempDir::new().unwrap();
    let orchestrator = orchestrator_with(
        vec!["- single step", "read: notes.txt", "All done."],
        &dir,
    );

    let state = orchestrator.run("finish early", 3).await.unwrap();
    assert!(state.completed);
    assert_eq!(state.iterations, 1);
}

#[tokio::test]
async fn test_success_token_is_case_insensitive() {
    let dir = TempDir::new().unwrap();
    let orchestrator = orchestrator_with(
        vec!["- step", "read: x.txt", "Clear SUCCESS on this one"],
        &dir,
    );

    let state = orchestrator.run("goal", 3).await.unwrap();
    assert!(state.completed);
    assert_eq!(state.iterations, 1);
}

#[tokio::test]
async fn test_history_preserves_execution_order() {
    let dir = TempDir::new().unwrap();
    let orchestrator = orchestrator_with(
        vec!["- first plan", "read: missing.txt", "reflecting, done"],
        &dir,
    );

    let state = orchestrator.run("ordered", 3).await.unwrap();
    assert_eq!(state.history.len(), 3);
    assert!(state.history.iter().all(|m| m.role == Role::Assistant));
    assert_eq!(state.history[0].content, "- first plan");
    assert_eq!(state.history[1].content, "read: missing.txt");
    assert_eq!(state.history[2].content, "reflecting, done");
    // 计划去掉了列表前缀
    assert_eq!(state.plan, vec!["first plan".to_string()]);
}

#[tokio::test]
async fn test_unknown_action_folds_into_failed_result() {
    let dir = TempDir::new().unwrap();
    let orchestrator = orchestrator_with(vec!["- plan", "dance around", "done"], &dir);

    let state = orchestrator.run("goal", 3).await.unwrap();
    let result = state.last_result.unwrap();
    assert!(!result.ok);
    assert_eq!(result.output, "Unknown action: dance around");
}

#[tokio::test]
async fn test_read_action_reaches_scoped_root() {
    let dir = TempDir::new().unwrap();
    let orchestrator = orchestrator_with(vec!["- plan", "read: notes.txt", "done"], &dir);
    std::fs::write(dir.path().join("root/notes.txt"), "note body").unwrap();

    let state = orchestrator.run("goal", 3).await.unwrap();
    let result = state.last_result.unwrap();
    assert!(result.ok);
    assert_eq!(result.output, "note body");
}

#[tokio::test]
async fn test_zero_budget_completes_without_acting() {
    let dir = TempDir::new().unwrap();
    let orchestrator = orchestrator_with(vec!["- plan"], &dir);

    let state = orchestrator.run("goal", 0).await.unwrap();
    assert!(state.completed);
    assert_eq!(state.iterations, 0);
    assert!(state.last_result.is_none());
}

#[tokio::test]
async fn test_audit_records_plan_and_acts() {
    let dir = TempDir::new().unwrap();
    let orchestrator = orchestrator_with(
        vec![
            "- plan",
            "read: a.txt",
            "keep going",
            "read: b.txt",
            "now done",
        ],
        &dir,
    );

    orchestrator.run("audited", 3).await.unwrap();
    let content = std::fs::read_to_string(dir.path().join("audit.log")).unwrap();
    let events: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(events.len(), 3); // 1 plan + 2 act
    assert_eq!(events[0]["type"], "plan");
    assert_eq!(events[1]["type"], "act");
    assert_eq!(events[1]["action"], "read: a.txt");
    assert_eq!(events[1]["ok"], false);
    assert_eq!(events[2]["type"], "act");
}

#[tokio::test]
async fn test_cancelled_token_aborts_run() {
    let dir = TempDir::new().unwrap();
    let orchestrator = orchestrator_with(vec!["- plan", "read: x", "done"], &dir);
    let cancel = tokio_util::sync::CancellationToken::new();
    cancel.cancel();

    let err = orchestrator
        .run_with_cancel("goal", 3, cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Cancelled));
}

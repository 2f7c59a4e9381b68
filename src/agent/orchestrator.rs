//! 编排器状态机
//!
//! Planning -> Acting -> Reflecting -> {Acting | Terminal} 的显式循环：plan 每次运行仅一次，
//! act 前检索上下文并把模型指令分派给唯一一个工具，reflect 以子串启发式判定完成。
//! 工具失败折叠进对话供下一轮反应；只有 LLM / 索引 / 审计级故障会让 run 返回 Err。

use std::sync::Arc;

use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::agent::directive::{parse_directive, ActionDirective};
use crate::agent::state::AgentState;
use crate::core::AgentError;
use crate::index::KnowledgeIndex;
use crate::llm::{LlmClient, Message};
use crate::tools::{AuditLog, SandboxTool, ScopedFs, ToolResult};

/// act 步检索的上下文条数
const CONTEXT_DOCS: usize = 2;
/// retrieval 工具返回的命中条数
const RETRIEVE_HITS: usize = 4;

/// 编排器：持有模型客户端与全部工具，驱动 plan/act/reflect
pub struct Orchestrator {
    llm: Arc<dyn LlmClient>,
    index: Arc<dyn KnowledgeIndex>,
    sandbox: SandboxTool,
    files: ScopedFs,
    audit: AuditLog,
}

impl Orchestrator {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        index: Arc<dyn KnowledgeIndex>,
        sandbox: SandboxTool,
        files: ScopedFs,
        audit: AuditLog,
    ) -> Self {
        Self {
            llm,
            index,
            sandbox,
            files,
            audit,
        }
    }

    /// 运行到终态：恰好一次 plan，随后至多 max_iters 对 act/reflect
    pub async fn run(&self, goal: &str, max_iters: usize) -> Result<AgentState, AgentError> {
        self.run_with_cancel(goal, max_iters, CancellationToken::new())
            .await
    }

    /// 可中断版本：取消令牌在步骤间与模型调用期间被观察，触发时返回 Cancelled
    pub async fn run_with_cancel(
        &self,
        goal: &str,
        max_iters: usize,
        cancel: CancellationToken,
    ) -> Result<AgentState, AgentError> {
        let mut state = AgentState::new(goal, max_iters);
        self.plan(&mut state, &cancel).await?;
        loop {
            self.act(&mut state, &cancel).await?;
            if state.completed {
                break; // 预算在 act 内耗尽
            }
            self.reflect(&mut state, &cancel).await?;
            if state.completed || state.iterations >= state.max_iters {
                break;
            }
        }
        Ok(state)
    }

    /// plan：请模型产出至多 4 步计划；空响应/坏响应只得到空计划，不使运行失败
    async fn plan(
        &self,
        state: &mut AgentState,
        cancel: &CancellationToken,
    ) -> Result<(), AgentError> {
        let prompt = vec![
            Message::system("Plan up to 4 steps to achieve the goal."),
            Message::user(state.goal.clone()),
        ];
        let plan_text = self.complete(&prompt, cancel).await?;
        state.plan = plan_text
            .lines()
            .map(|line| line.trim().trim_start_matches(['-', '*', ' ']).trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        self.audit
            .append("plan", json!({ "goal": state.goal, "plan": state.plan }))?;
        state.history.push(Message::assistant(plan_text));
        Ok(())
    }

    /// act：检索上下文、请模型选工具、分派并记录结果
    async fn act(
        &self,
        state: &mut AgentState,
        cancel: &CancellationToken,
    ) -> Result<(), AgentError> {
        if state.iterations >= state.max_iters {
            // 预算已耗尽：置完成并直接返回，防止再次进入 act
            state.completed = true;
            return Ok(());
        }
        let context_docs = self.index.query(&state.goal, CONTEXT_DOCS).await?;
        let context =
            serde_json::to_string(&context_docs).unwrap_or_else(|_| "[]".to_string());
        let prompt = vec![
            Message::system("Use the tools to progress. Tools: sandbox, file_read, retrieval."),
            Message::user(format!(
                "Goal: {}. Context: {}. Plan: {:?}",
                state.goal, context, state.plan
            )),
        ];
        let action_text = self.complete(&prompt, cancel).await?;
        let result = self.dispatch(&action_text).await?;
        self.audit.append(
            "act",
            json!({
                "action": action_text,
                "result": result.output,
                "ok": result.ok,
            }),
        )?;
        state.last_result = Some(result);
        state.history.push(Message::assistant(action_text));
        state.iterations += 1;
        Ok(())
    }

    /// reflect：基于最近一条历史与最近结果判断是否达成
    async fn reflect(
        &self,
        state: &mut AgentState,
        cancel: &CancellationToken,
    ) -> Result<(), AgentError> {
        let last_entry = state
            .history
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let last_output = state
            .last_result
            .as_ref()
            .map(|r| r.output.clone())
            .unwrap_or_default();
        let prompt = vec![
            Message::system(
                "Reflect on the last result. Mark success if goal reached. Keep responses short.",
            ),
            Message::assistant(last_entry),
            Message::user(format!("Result: {}", last_output)),
        ];
        let reflection = self.complete(&prompt, cancel).await?;
        // 完成判定：子串启发式，"done" 偶然出现也会触发
        let lower = reflection.to_lowercase();
        if lower.contains("success") || lower.contains("done") {
            state.completed = true;
        }
        state.history.push(Message::assistant(reflection));
        Ok(())
    }

    /// 把解析出的指令路由到唯一一个工具；每条路径恰好产出一个 ToolResult
    async fn dispatch(&self, action_text: &str) -> Result<ToolResult, AgentError> {
        let result = match parse_directive(action_text) {
            ActionDirective::Sandbox(cmd) => self.sandbox.run(&cmd).await,
            ActionDirective::ReadFile(path) => self.files.read(&path),
            ActionDirective::Retrieve(query) => {
                let hits = self.index.query(&query, RETRIEVE_HITS).await?;
                let rendered =
                    serde_json::to_string(&hits).unwrap_or_else(|_| "[]".to_string());
                ToolResult::success(rendered).with_meta("hits", json!(hits.len()))
            }
            ActionDirective::Unknown(text) => {
                ToolResult::failure(format!("Unknown action: {}", text))
            }
        };
        Ok(result)
    }

    /// 模型调用点：可被取消令牌打断
    async fn complete(
        &self,
        messages: &[Message],
        cancel: &CancellationToken,
    ) -> Result<String, AgentError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AgentError::Cancelled),
            result = self.llm.complete(messages) => result.map_err(AgentError::LlmError),
        }
    }
}

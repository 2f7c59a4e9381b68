//! 运行状态
//!
//! 一次编排运行的全部可变状态；仅由编排器的三个步骤函数修改，run 返回后即丢弃（不持久化）。

use serde::Serialize;

use crate::llm::Message;
use crate::tools::ToolResult;

/// 一次运行的状态：目标、只增历史、迭代计数、计划与完成标志
#[derive(Debug, Serialize)]
pub struct AgentState {
    /// 本次运行的目标（创建后不变）
    pub goal: String,
    /// 角色标注的历史，按执行顺序追加，原样回放进 Prompt
    pub history: Vec<Message>,
    /// 已完成的 act 步数，单调递增，不超过 max_iters
    pub iterations: usize,
    pub max_iters: usize,
    /// 计划步骤（每次运行只计算一次）
    pub plan: Vec<String>,
    /// 最近一次工具结果；首次动作前为 None
    pub last_result: Option<ToolResult>,
    /// 一旦为 true 运行即终止，运行内不会被重置
    pub completed: bool,
}

impl AgentState {
    pub fn new(goal: impl Into<String>, max_iters: usize) -> Self {
        Self {
            goal: goal.into(),
            history: Vec::new(),
            iterations: 0,
            max_iters,
            plan: Vec::new(),
            last_result: None,
            completed: false,
        }
    }
}

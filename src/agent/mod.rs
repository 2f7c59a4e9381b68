//! 编排层：状态机、运行状态与动作指令解析

pub mod directive;
pub mod orchestrator;
pub mod state;

pub use directive::{parse_directive, ActionDirective};
pub use orchestrator::Orchestrator;
pub use state::AgentState;

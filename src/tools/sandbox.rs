//! 沙箱命令执行器
//!
//! 优先在一次性 docker 容器内执行（断网、限 CPU/内存、进程数上限），容器内再套 timeout；
//! 宿主机无 docker 时退化为直接 sh -c 执行，仅保留墙钟超时，并在 metadata 与日志中标明。
//! 任何启动异常都被捕获并转为失败的 ToolResult，从不向调用方抛出。

use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde_json::json;
use tokio::process::Command;

use crate::config::SandboxSection;
use crate::tools::ToolResult;

/// 容器内进程数硬上限（固定值，不随配置变化）
const PIDS_LIMIT: u32 = 128;

/// 容器路径在墙钟超时外留出的清理余量
const CONTAINER_GRACE_SECS: u64 = 5;

/// 沙箱执行器：单条命令 + 资源与时间上限
pub struct SandboxTool {
    memory: String,
    cpus: String,
    timeout: Duration,
    image: String,
    docker: Option<PathBuf>,
}

impl SandboxTool {
    pub fn new(cfg: &SandboxSection) -> Self {
        Self::with_backend(cfg, find_docker())
    }

    /// 显式指定 docker 路径；None 表示强制退化路径（测试用）
    pub fn with_backend(cfg: &SandboxSection, docker: Option<PathBuf>) -> Self {
        Self {
            memory: cfg.memory.clone(),
            cpus: cfg.cpus.clone(),
            timeout: Duration::from_secs(cfg.timeout_secs),
            image: cfg.image.clone(),
            docker,
        }
    }

    /// 当前是否具备容器隔离
    pub fn isolated(&self) -> bool {
        self.docker.is_some()
    }

    /// 执行单条 shell 命令，返回合并的 stdout+stderr 与退出状态；超时视为失败
    pub async fn run(&self, command: &str) -> ToolResult {
        let timeout_secs = self.timeout.as_secs().to_string();
        let pids_limit = PIDS_LIMIT.to_string();
        let (mut cmd, isolation) = match &self.docker {
            Some(docker) => {
                let mut c = Command::new(docker);
                c.args([
                    "run",
                    "--rm",
                    "--network",
                    "none",
                    "--cpus",
                    self.cpus.as_str(),
                    "--memory",
                    self.memory.as_str(),
                    "--pids-limit",
                    pids_limit.as_str(),
                    self.image.as_str(),
                    "timeout",
                    timeout_secs.as_str(),
                    "/bin/sh",
                    "-c",
                    command,
                ]);
                (c, "container")
            }
            None => {
                // 无 docker：退化为直接执行，隔离保证减弱，必须可观测
                tracing::warn!(command = %command, "docker unavailable, running without isolation");
                let mut c = Command::new("sh");
                c.args(["-c", command]);
                (c, "none")
            }
        };
        cmd.kill_on_drop(true);
        tracing::info!(isolation, command = %command, "sandbox run");

        let wall = if isolation == "container" {
            self.timeout + Duration::from_secs(CONTAINER_GRACE_SECS)
        } else {
            self.timeout
        };
        let start = Instant::now();
        let result = tokio::time::timeout(wall, cmd.output()).await;
        let duration = start.elapsed().as_secs_f64();

        let outcome = match result {
            Ok(Ok(output)) => {
                let mut text = String::from_utf8_lossy(&output.stdout).to_string();
                text.push_str(&String::from_utf8_lossy(&output.stderr));
                ToolResult {
                    output: text,
                    ok: output.status.success(),
                    metadata: None,
                }
            }
            // 启动失败（二进制缺失、权限不足）：吞掉并转为失败结果
            Ok(Err(e)) => ToolResult::failure(e.to_string()),
            Err(_) => ToolResult::failure(format!("timed out after {}s", self.timeout.as_secs())),
        };
        outcome
            .with_meta("duration", json!(duration))
            .with_meta("isolation", json!(isolation))
    }
}

/// 在 PATH 中查找 docker 可执行文件
fn find_docker() -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path) {
        let candidate = dir.join("docker");
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

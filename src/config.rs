//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `SCOUT__*` 覆盖（双下划线表示嵌套，
//! 如 `SCOUT__SANDBOX__TIMEOUT_SECS=10`）。配置以显式结构体传入各组件的构造函数，
//! 进程内不保留全局可变状态。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub sandbox: SandboxSection,
    pub ingest: IngestSection,
}

/// [app] 段：受限文件根目录、索引数据目录、审计日志与默认集合名
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub data_root: PathBuf,
    pub index_dir: PathBuf,
    pub audit_log: PathBuf,
    pub collection: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("data"),
            index_dir: PathBuf::from("data/index"),
            audit_log: PathBuf::from("logs/audit.log"),
            collection: "knowledge".to_string(),
        }
    }
}

/// [llm] 段：端点、模型与重试策略
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// OpenAI 兼容端点；None 时用 async-openai 默认
    pub base_url: Option<String>,
    pub model: String,
    pub embedding_model: String,
    pub max_tokens: u32,
    /// 固定退避重试：最多 retry_attempts 次，间隔 retry_backoff_secs 秒
    pub retry_attempts: u32,
    pub retry_backoff_secs: u64,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            base_url: Some("http://localhost:8000/v1".to_string()),
            model: "local-model".to_string(),
            embedding_model: "embedding-model".to_string(),
            max_tokens: 512,
            retry_attempts: 3,
            retry_backoff_secs: 2,
        }
    }
}

/// [sandbox] 段：容器资源限制与超时；进程数上限为固定常量，不随配置变化
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SandboxSection {
    pub memory: String,
    pub cpus: String,
    pub timeout_secs: u64,
    pub image: String,
}

impl Default for SandboxSection {
    fn default() -> Self {
        Self {
            memory: "512m".to_string(),
            cpus: "0.5".to_string(),
            timeout_secs: 30,
            image: "alpine".to_string(),
        }
    }
}

/// [ingest] 段：分块参数与扩展名白名单
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestSection {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub allowed_exts: Vec<String>,
}

impl Default for IngestSection {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 80,
            allowed_exts: vec![".md".to_string(), ".txt".to_string(), ".pdf".to_string()],
        }
    }
}

/// 从 config 目录加载配置，环境变量 SCOUT__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 SCOUT__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("SCOUT")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

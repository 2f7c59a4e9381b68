//! 检索索引：内容寻址摄取、分块与向量检索
//!
//! KnowledgeIndex 是索引的外部契约（ingest / query / exists / delete）；VectorIndex 为
//! 进程内实现，通过 LlmClient::embed 向量化并按余弦相似度排序，快照持久化到集合文件。

pub mod chunk;
pub mod ingest;
pub mod store;

pub use chunk::{fingerprint_file, Chunker};
pub use ingest::Ingester;
pub use store::{Hit, KnowledgeIndex, VectorIndex};

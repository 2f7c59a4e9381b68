//! 内容寻址摄取集成测试：指纹去重、空文件标记与快照持久化

use std::sync::Arc;

use tempfile::TempDir;

use scout::index::{Chunker, Ingester, KnowledgeIndex, VectorIndex};
use scout::llm::MockLlm;

/// 空字节串的 sha-256
const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

fn setup(dir: &TempDir) -> (Arc<VectorIndex>, Ingester) {
    let llm = Arc::new(MockLlm::new());
    let index =
        Arc::new(VectorIndex::open(dir.path().join("index"), "knowledge", llm).unwrap());
    let chunker = Chunker::new(8, 2).unwrap();
    let ingester = Ingester::new(
        index.clone(),
        chunker,
        vec![".md".to_string(), ".txt".to_string()],
    );
    (index, ingester)
}

#[tokio::test]
async fn test_second_ingest_adds_nothing() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir_all(&docs).unwrap();
    std::fs::write(docs.join("a.txt"), "the quick brown fox jumps").unwrap();

    let (index, ingester) = setup(&dir);
    let first = ingester.ingest_dir(&docs).await.unwrap();
    assert!(first > 0);
    let second = ingester.ingest_dir(&docs).await.unwrap();
    assert_eq!(second, 0);
    assert_eq!(index.len().await, first);
}

#[tokio::test]
async fn test_same_bytes_under_other_path_skipped() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir_all(docs.join("nested")).unwrap();
    std::fs::write(docs.join("a.txt"), "identical body of text").unwrap();

    let (index, ingester) = setup(&dir);
    let first = ingester.ingest_dir(&docs).await.unwrap();

    // 同样的字节换个路径与扩展名再来一遍
    std::fs::write(docs.join("nested/copy.md"), "identical body of text").unwrap();
    let second = ingester.ingest_dir(&docs).await.unwrap();
    assert_eq!(second, 0);
    assert_eq!(index.len().await, first);
}

#[tokio::test]
async fn test_chunk_ids_and_metadata() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir_all(&docs).unwrap();
    std::fs::write(docs.join("a.txt"), "abcdefghij").unwrap();

    let (index, ingester) = setup(&dir);
    let added = ingester.ingest_dir(&docs).await.unwrap();
    // chunk_size=8, overlap=2 -> 步长 6，起点 0,6 -> 两块
    assert_eq!(added, 2);
    let hits = index.query("abcdefgh", 2).await.unwrap();
    assert_eq!(hits.len(), 2);
    for hit in hits {
        assert!(hit.metadata.get("source").unwrap().ends_with("a.txt"));
        assert_eq!(hit.metadata.get("fingerprint").unwrap().len(), 64);
    }
}

#[tokio::test]
async fn test_empty_file_marked_seen_with_zero_chunks() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir_all(&docs).unwrap();
    std::fs::write(docs.join("empty.txt"), "").unwrap();

    let (index, ingester) = setup(&dir);
    let added = ingester.ingest_dir(&docs).await.unwrap();
    assert_eq!(added, 0);
    assert_eq!(index.len().await, 0);
    // 指纹仍被标记，重复扫描不再处理
    assert!(index.exists(EMPTY_SHA256).await);
    assert_eq!(ingester.ingest_dir(&docs).await.unwrap(), 0);
}

#[tokio::test]
async fn test_extension_allow_list_filters() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir_all(&docs).unwrap();
    std::fs::write(docs.join("image.bin"), "binary-ish").unwrap();
    std::fs::write(docs.join("no_extension"), "plain").unwrap();

    let (index, ingester) = setup(&dir);
    assert_eq!(ingester.ingest_dir(&docs).await.unwrap(), 0);
    assert!(index.is_empty().await);
}

#[tokio::test]
async fn test_snapshot_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir_all(&docs).unwrap();
    std::fs::write(docs.join("a.txt"), "persistent content here").unwrap();

    let added;
    {
        let (index, ingester) = setup(&dir);
        added = ingester.ingest_dir(&docs).await.unwrap();
        index.save().await.unwrap();
    }

    // 新进程视角：重开同一集合，去重依旧生效
    let (index, ingester) = setup(&dir);
    assert_eq!(index.len().await, added);
    assert_eq!(ingester.ingest_dir(&docs).await.unwrap(), 0);
}

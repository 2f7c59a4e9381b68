//! 内容指纹与分块
//!
//! 指纹为文件字节的 sha-256（8 KiB 流式读取，内存有界，任意大文件均可）；
//! 分块为固定字符窗口，相邻窗口起点相距 chunk_size - chunk_overlap，末窗可短于 chunk_size。

use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::core::AgentError;

/// 流式计算文件内容的 sha-256 十六进制摘要
pub fn fingerprint_file(path: &Path) -> Result<String, AgentError> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| AgentError::IngestFailed(format!("{}: {}", path.display(), e)))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file
            .read(&mut buf)
            .map_err(|e| AgentError::IngestFailed(format!("{}: {}", path.display(), e)))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// 固定窗口分块器；构造时校验 overlap < size，杜绝不前进的窗口
#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Chunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, AgentError> {
        if chunk_size == 0 {
            return Err(AgentError::ConfigError(
                "chunk_size must be positive".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(AgentError::ConfigError(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// 切分文本：每窗至多 chunk_size 个字符，步长 chunk_size - chunk_overlap（按字符计，UTF-8 安全）
    pub fn chunk_text(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let step = self.chunk_size - self.chunk_overlap;
        let mut chunks = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            chunks.push(chars[start..end].iter().collect());
            start += step;
        }
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_chunk_text_overlap() {
        let chunker = Chunker::new(4, 2).unwrap();
        let chunks = chunker.chunk_text("abcdefghij");
        assert_eq!(chunks[0], "abcd");
        assert!(chunks[1].starts_with("cd"));
        // 窗口起点 0,2,4,6,8；末窗短于 chunk_size
        assert_eq!(chunks, vec!["abcd", "cdef", "efgh", "ghij", "ij"]);
    }

    #[test]
    fn test_chunk_covers_every_char() {
        let text = "abcdefghijklmnopqrstuvwxyz";
        for (size, overlap) in [(4, 2), (5, 0), (3, 1), (8, 7)] {
            let chunker = Chunker::new(size, overlap).unwrap();
            let chunks = chunker.chunk_text(text);
            let step = size - overlap;
            assert_eq!(chunks.len(), (text.len() + step - 1) / step);
            let mut covered = vec![false; text.len()];
            for (i, chunk) in chunks.iter().enumerate() {
                let start = i * step;
                assert_eq!(chunk.as_str(), &text[start..(start + size).min(text.len())]);
                for flag in covered.iter_mut().skip(start).take(chunk.chars().count()) {
                    *flag = true;
                }
            }
            assert!(covered.into_iter().all(|c| c));
        }
    }

    #[test]
    fn test_chunk_utf8_boundaries() {
        let chunker = Chunker::new(3, 1).unwrap();
        let chunks = chunker.chunk_text("日月星辰风");
        assert_eq!(chunks[0], "日月星");
        assert_eq!(chunks[1], "星辰风");
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let chunker = Chunker::new(4, 2).unwrap();
        assert!(chunker.chunk_text("").is_empty());
    }

    #[test]
    fn test_rejects_bad_config() {
        assert!(Chunker::new(4, 4).is_err());
        assert!(Chunker::new(4, 9).is_err());
        assert!(Chunker::new(0, 0).is_err());
    }

    #[test]
    fn test_fingerprint_matches_known_digest() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello").unwrap();
        let digest = fingerprint_file(file.path()).unwrap();
        assert_eq!(
            digest,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_fingerprint_same_bytes_same_digest() {
        let dir = tempfile::TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "same content").unwrap();
        std::fs::write(&b, "same content").unwrap();
        assert_eq!(fingerprint_file(&a).unwrap(), fingerprint_file(&b).unwrap());
        let c = dir.path().join("c.txt");
        std::fs::write(&c, "other content").unwrap();
        assert_ne!(fingerprint_file(&a).unwrap(), fingerprint_file(&c).unwrap());
    }
}

//! Content hashing
//!
//! Hashes are SHA-256 over the UTF-8 bytes of the content after line endings are
//! normalized, so a checkout with CRLF endings hashes the same as one with LF.

use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::fs;

use crate::core::error::PublishError;

lazy_static! {
    static ref LINE_ENDING: Regex = Regex::new(r"\r\n?").expect("valid line ending pattern");
}

/// Lowercase hex SHA-256 of `content` with `\r\n` and `\r` normalized to `\n`
pub fn compute_hash(content: &str) -> String {
    let normalized = LINE_ENDING.replace_all(content, "\n");

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// [`compute_hash`] of a UTF-8 text file
pub async fn compute_file_hash(path: &Path) -> Result<String, PublishError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| PublishError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(compute_hash(&content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_hash_is_repeatable() {
        let content = "declare module \"foo\" {\n    export const x: number;\n}\n";
        assert_eq!(compute_hash(content), compute_hash(content));
    }

    #[test]
    fn test_hash_ignores_line_ending_style() {
        let lf = "line one\nline two\n";
        let crlf = "line one\r\nline two\r\n";
        let cr = "line one\rline two\r";

        assert_eq!(compute_hash(lf), compute_hash(crlf));
        assert_eq!(compute_hash(lf), compute_hash(cr));
    }

    #[test]
    fn test_hash_distinguishes_content() {
        assert_ne!(compute_hash("a\n"), compute_hash("b\n"));
        // "\n\r" is two line breaks, not one
        assert_ne!(compute_hash("a\n\rb"), compute_hash("a\nb"));
    }

    #[test]
    fn test_hash_known_value() {
        // SHA-256 of the empty string
        assert_eq!(
            compute_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        let digest = compute_hash("anything");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[tokio::test]
    async fn test_compute_file_hash() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("index.d.ts");
        std::fs::write(&path, "export {};\r\n").unwrap();

        let hash = compute_file_hash(&path).await.unwrap();
        assert_eq!(hash, compute_hash("export {};\n"));
    }

    #[tokio::test]
    async fn test_compute_file_hash_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = compute_file_hash(&temp_dir.path().join("missing.d.ts")).await;
        assert!(matches!(result, Err(PublishError::Io { .. })));
    }
}

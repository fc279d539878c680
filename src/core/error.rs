//! Error handling for types publishing
//!
//! This module provides the error taxonomy of the publisher with recovery guidance
//! using the thiserror crate for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::logging::PublishLog;

/// Main error type for catalog loading, publishing and unpublishing
#[derive(Error, Debug)]
pub enum PublishError {
    // Catalog errors
    #[error("パッケージが見つかりません: {package}")]
    NotFound { package: String },

    #[error("[{field}] not-neededパッケージの検証に失敗しました: {message}")]
    Validation { field: String, message: String },

    // Manifest errors
    #[error("[{}] package.jsonが不正です: {message}", .path.display())]
    MalformedManifest { path: PathBuf, message: String },

    // Registry errors (client message surfaced verbatim)
    #[error("{message}")]
    Registry { operation: String, message: String },

    // Command execution errors (message is the captured stderr)
    #[error("{stderr}")]
    CommandFailure { stderr: String },

    // Ambient errors
    #[error("[{}] ファイルの読み書きに失敗しました: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[{}] JSONの解析に失敗しました: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("設定エラー: {0}")]
    Settings(String),
}

impl PublishError {
    /// Shorthand for a validation failure on a single field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a failed registry client call
    pub fn registry(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Registry {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Check if retrying the same run could succeed without changing any input
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Registry { .. } | Self::CommandFailure { .. })
    }

    /// Get suggested actions for this error
    pub fn suggested_actions(&self) -> Vec<&'static str> {
        match self {
            Self::NotFound { .. } => vec![
                "パッケージ名のスペルを確認してください",
                "data/definitions.jsonを再生成してください",
            ],
            Self::Validation { .. } => vec![
                "notNeededPackages.jsonのエントリを確認してください",
                "許可されているキーはlibraryName, typingsPackageName, sourceRepoURL, asOfVersionのみです",
            ],
            Self::MalformedManifest { .. } => vec![
                "生成されたpackage.jsonを確認してください",
                "versionフィールドは文字列である必要があります",
            ],
            Self::Registry { .. } => vec![
                "エラーメッセージを確認してください",
                "ネットワーク接続を確認してください",
                "NPM_TOKENが正しく設定されているか確認してください",
            ],
            Self::CommandFailure { .. } => vec![
                "コマンドの出力を確認してください",
                "npmがインストールされているか確認してください",
            ],
            Self::Io { .. } => vec!["ファイルのパスと権限を確認してください"],
            Self::Json { .. } => vec!["JSONの構文を確認してください"],
            Self::Settings(_) => vec!["settings.jsonを確認してください"],
        }
    }

    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::MalformedManifest { .. } => "MALFORMED_MANIFEST",
            Self::Registry { .. } => "REGISTRY_ERROR",
            Self::CommandFailure { .. } => "COMMAND_FAILURE",
            Self::Io { .. } => "IO_ERROR",
            Self::Json { .. } => "JSON_ERROR",
            Self::Settings(_) => "SETTINGS_ERROR",
        }
    }
}

/// A failed publish together with everything logged before the failure
#[derive(Error, Debug)]
#[error("{error}")]
pub struct PublishFailure {
    #[source]
    pub error: PublishError,
    pub log: PublishLog,
}

impl PublishFailure {
    pub fn new(error: PublishError, log: PublishLog) -> Self {
        Self { error, log }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error_mentions_package() {
        let error = PublishError::NotFound {
            package: "bar".to_string(),
        };

        assert_eq!(error.code(), "NOT_FOUND");
        assert!(!error.is_recoverable());
        assert!(error.to_string().contains("bar"));
        assert!(!error.suggested_actions().is_empty());
    }

    #[test]
    fn test_validation_error_mentions_field() {
        let error = PublishError::validation("projectName", "Unexpected key");

        assert_eq!(error.code(), "VALIDATION_ERROR");
        let display = error.to_string();
        assert!(display.contains("projectName"));
        assert!(display.contains("Unexpected key"));
    }

    #[test]
    fn test_registry_error_is_verbatim() {
        let error = PublishError::registry("publish", "E403 forbidden");

        assert_eq!(error.to_string(), "E403 forbidden");
        assert!(error.is_recoverable());
        assert_eq!(error.code(), "REGISTRY_ERROR");
    }

    #[test]
    fn test_command_failure_message_is_stderr() {
        let error = PublishError::CommandFailure {
            stderr: "npm ERR! 404".to_string(),
        };

        assert_eq!(error.to_string(), "npm ERR! 404");
        assert_eq!(error.code(), "COMMAND_FAILURE");
    }

    #[test]
    fn test_malformed_manifest_display() {
        let error = PublishError::MalformedManifest {
            path: PathBuf::from("output/foo/package.json"),
            message: "version must be a string".to_string(),
        };

        let display = error.to_string();
        assert!(display.contains("output/foo/package.json"));
        assert!(display.contains("version must be a string"));
    }

    #[test]
    fn test_publish_failure_keeps_log() {
        let mut log = PublishLog::quiet();
        log.info("Publishing foo");

        let failure = PublishFailure::new(PublishError::registry("publish", "boom"), log);

        assert_eq!(failure.to_string(), "boom");
        assert_eq!(failure.log.lines(), vec!["Publishing foo"]);
    }
}

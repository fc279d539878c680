//! Generated package manifest
//!
//! Each generated package directory carries a `package.json`. Publishing only needs
//! its `version`, but the whole document is handed to the registry client.

use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::core::error::PublishError;

/// Manifest file name inside a generated package directory
pub const MANIFEST_FILENAME: &str = "package.json";

/// A generated `package.json` with a known string version
#[derive(Debug, Clone, PartialEq)]
pub struct PackageManifest {
    pub path: PathBuf,
    pub version: String,
    pub contents: Value,
}

impl PackageManifest {
    /// Read `<package_dir>/package.json`, failing unless `version` is a string
    pub async fn read(package_dir: &Path) -> Result<Self, PublishError> {
        let path = package_dir.join(MANIFEST_FILENAME);
        let content = fs::read_to_string(&path)
            .await
            .map_err(|source| PublishError::Io {
                path: path.clone(),
                source,
            })?;
        let contents: Value = serde_json::from_str(&content).map_err(|source| {
            PublishError::Json {
                path: path.clone(),
                source,
            }
        })?;

        Self::from_value(path, contents)
    }

    pub fn from_value(path: PathBuf, contents: Value) -> Result<Self, PublishError> {
        let version = match contents.get("version") {
            Some(Value::String(version)) => version.clone(),
            Some(other) => {
                return Err(PublishError::MalformedManifest {
                    path,
                    message: format!("version must be a string, got {}", other),
                });
            }
            None => {
                return Err(PublishError::MalformedManifest {
                    path,
                    message: "version is missing".to_string(),
                });
            }
        };

        Ok(Self {
            path,
            version,
            contents,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.contents.get("name").and_then(Value::as_str)
    }
}

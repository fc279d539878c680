//! Publisher settings
//!
//! Settings are loaded once at startup from `settings.json` in the publisher's home
//! directory, then overridden by environment variables.
//!
//! Priority (high to low):
//! 1. Environment variables (`TYPES_PUBLISHER_*`)
//! 2. `<home>/settings.json`

use crate::core::error::PublishError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Settings file name
const SETTINGS_FILENAME: &str = "settings.json";

/// Directory under home holding generated data files
const DATA_DIRNAME: &str = "data";

/// Catalog file name inside the data directory
pub const TYPES_DATA_FILENAME: &str = "definitions.json";

/// Stub package list file name inside the definitions tree
pub const NOT_NEEDED_PACKAGES_FILENAME: &str = "notNeededPackages.json";

/// The tag a registry applies when none is given
pub const DEFAULT_DIST_TAG: &str = "latest";

const ENV_SCOPE: &str = "TYPES_PUBLISHER_SCOPE";
const ENV_TAG: &str = "TYPES_PUBLISHER_TAG";
const ENV_OUTPUT_PATH: &str = "TYPES_PUBLISHER_OUTPUT_PATH";

/// On-disk settings file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    definitely_typed_path: PathBuf,
    output_path: PathBuf,
    scope_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tag: Option<String>,
}

/// Process-wide publisher configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Publisher home; holds `settings.json` and the `data/` directory
    pub home: PathBuf,

    /// Root of the source definitions tree
    pub definitely_typed_path: PathBuf,

    /// Where generated packages live, one directory per package
    pub output_path: PathBuf,

    /// Registry scope, without the leading `@`
    pub scope_name: String,

    /// Distribution tag applied after publishing, if any
    pub tag: Option<String>,
}

impl Settings {
    /// Load `<home>/settings.json` and apply environment overrides from `env`
    pub async fn load(home: &Path, env: &HashMap<String, String>) -> Result<Self, PublishError> {
        let path = home.join(SETTINGS_FILENAME);
        let content = fs::read_to_string(&path)
            .await
            .map_err(|source| PublishError::Io {
                path: path.clone(),
                source,
            })?;
        let file: SettingsFile = serde_json::from_str(&content)
            .map_err(|source| PublishError::Json { path, source })?;

        let settings = Self {
            home: home.to_path_buf(),
            definitely_typed_path: resolve(home, file.definitely_typed_path),
            output_path: resolve(home, file.output_path),
            scope_name: file.scope_name,
            tag: file.tag,
        };

        let settings = settings.with_env_overrides(env);
        settings.validate()?;
        Ok(settings)
    }

    /// Apply `TYPES_PUBLISHER_*` overrides
    pub fn with_env_overrides(mut self, env: &HashMap<String, String>) -> Self {
        if let Some(scope) = env.get(ENV_SCOPE) {
            self.scope_name = scope.clone();
        }
        if let Some(tag) = env.get(ENV_TAG) {
            self.tag = if tag.is_empty() { None } else { Some(tag.clone()) };
        }
        if let Some(output) = env.get(ENV_OUTPUT_PATH) {
            self.output_path = resolve(&self.home, PathBuf::from(output));
        }
        self
    }

    fn validate(&self) -> Result<(), PublishError> {
        if self.scope_name.is_empty() {
            return Err(PublishError::Settings("scopeName is required".to_string()));
        }
        if self.scope_name.starts_with('@') {
            return Err(PublishError::Settings(format!(
                "scopeName must not start with '@': {}",
                self.scope_name
            )));
        }
        Ok(())
    }

    /// Directory holding generated data files
    pub fn data_dir(&self) -> PathBuf {
        self.home.join(DATA_DIRNAME)
    }

    /// Path of a file inside the data directory
    pub fn data_file_path(&self, filename: &str) -> PathBuf {
        self.data_dir().join(filename)
    }

    pub fn not_needed_packages_path(&self) -> PathBuf {
        self.definitely_typed_path.join(NOT_NEEDED_PACKAGES_FILENAME)
    }

    /// Path of a folder inside the definitions tree
    pub fn definitely_typed_dir(&self, dir_name: &str) -> PathBuf {
        self.definitely_typed_path.join(dir_name)
    }

    /// The configured tag, unless it is absent or the registry default
    pub fn non_default_tag(&self) -> Option<&str> {
        self.tag
            .as_deref()
            .filter(|tag| !tag.is_empty() && *tag != DEFAULT_DIST_TAG)
    }
}

fn resolve(home: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        home.join(path)
    }
}

//! Package catalog reader
//!
//! The catalog (`data/definitions.json`) and the stub package list
//! (`notNeededPackages.json`) are loaded in bulk, once per run. Lookups happen on the
//! in-memory [`Catalog`]; there is deliberately no way to read a single record from
//! disk.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;

use crate::core::error::PublishError;
use crate::core::settings::{Settings, TYPES_DATA_FILENAME};
use crate::packages::model::{
    AnyPackage, NotNeededKind, NotNeededPackage, PackageCommonProperties, TypingsData,
};

/// Keys a stub package entry may carry
const NOT_NEEDED_ALLOWED_KEYS: &[&str] = &[
    "libraryName",
    "typingsPackageName",
    "sourceRepoURL",
    "asOfVersion",
];

/// Keys a stub package entry must carry as non-empty strings
const NOT_NEEDED_REQUIRED_KEYS: &[&str] = &["libraryName", "typingsPackageName", "sourceRepoURL"];

/// Publishable packages keyed by definitions folder name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog(BTreeMap<String, TypingsData>);

impl Catalog {
    pub fn new(entries: BTreeMap<String, TypingsData>) -> Self {
        Self(entries)
    }

    /// Look up a package by folder name
    pub fn get_package(&self, package_name: &str) -> Result<&TypingsData, PublishError> {
        self.0.get(package_name).ok_or_else(|| PublishError::NotFound {
            package: package_name.to_string(),
        })
    }

    /// All packages, ordered by folder name
    pub fn typings(&self) -> impl Iterator<Item = &TypingsData> {
        self.0.values()
    }

    pub fn folder_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_typings(self) -> Vec<TypingsData> {
        self.0.into_values().collect()
    }
}

/// Both package sources of one run, not merged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllPackages {
    pub typings: Vec<TypingsData>,
    pub not_needed: Vec<NotNeededPackage>,
}

impl AllPackages {
    /// Typings first, then stub packages in file order
    pub fn into_any_packages(self) -> Vec<AnyPackage> {
        self.typings
            .into_iter()
            .map(AnyPackage::from)
            .chain(self.not_needed.into_iter().map(AnyPackage::from))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.typings.len() + self.not_needed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Look up a package in an already loaded catalog
pub fn get_package<'a>(
    catalog: &'a Catalog,
    package_name: &str,
) -> Result<&'a TypingsData, PublishError> {
    catalog.get_package(package_name)
}

/// Whether the catalog file has been generated
pub fn types_data_file_exists(settings: &Settings) -> bool {
    settings.data_file_path(TYPES_DATA_FILENAME).is_file()
}

/// Read `data/definitions.json`
pub async fn read_types_catalog(settings: &Settings) -> Result<Catalog, PublishError> {
    read_json(&settings.data_file_path(TYPES_DATA_FILENAME)).await
}

/// All publishable packages
pub async fn read_typings(settings: &Settings) -> Result<Vec<TypingsData>, PublishError> {
    Ok(read_types_catalog(settings).await?.into_typings())
}

/// Read and validate the stub package list, completing each record
pub async fn read_not_needed_packages(
    settings: &Settings,
) -> Result<Vec<NotNeededPackage>, PublishError> {
    let raw: Value = read_json(&settings.not_needed_packages_path()).await?;
    parse_not_needed_packages(raw)
}

/// Load the catalog and the stub list concurrently
pub async fn read_all_packages(settings: &Settings) -> Result<AllPackages, PublishError> {
    let (typings, not_needed) =
        tokio::try_join!(read_typings(settings), read_not_needed_packages(settings))?;
    Ok(AllPackages {
        typings,
        not_needed,
    })
}

/// [`read_all_packages`], merged
pub async fn read_all_packages_array(settings: &Settings) -> Result<Vec<AnyPackage>, PublishError> {
    Ok(read_all_packages(settings).await?.into_any_packages())
}

/// Write `content` as JSON into the data directory, creating it if needed
///
/// Formatted output uses 4-space indentation.
pub async fn write_data_file<T: Serialize>(
    settings: &Settings,
    filename: &str,
    content: &T,
    formatted: bool,
) -> Result<(), PublishError> {
    let data_dir = settings.data_dir();
    fs::create_dir_all(&data_dir)
        .await
        .map_err(|source| PublishError::Io {
            path: data_dir.clone(),
            source,
        })?;

    let path = data_dir.join(filename);
    let bytes = if formatted {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        content
            .serialize(&mut serializer)
            .map_err(|source| PublishError::Json {
                path: path.clone(),
                source,
            })?;
        buffer
    } else {
        serde_json::to_vec(content).map_err(|source| PublishError::Json {
            path: path.clone(),
            source,
        })?
    };

    fs::write(&path, bytes)
        .await
        .map_err(|source| PublishError::Io { path, source })
}

fn parse_not_needed_packages(raw: Value) -> Result<Vec<NotNeededPackage>, PublishError> {
    let entries = match raw {
        Value::Object(mut root) => match root.remove("packages") {
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                return Err(PublishError::validation(
                    "packages",
                    "packages must be an array",
                ));
            }
            None => return Err(PublishError::validation("packages", "packages is missing")),
        },
        _ => {
            return Err(PublishError::validation(
                "packages",
                "not-needed package list must be an object",
            ));
        }
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::Object(fields) => complete_not_needed_package(fields),
            _ => Err(PublishError::validation(
                format!("packages[{}]", index),
                "entry must be an object",
            )),
        })
        .collect()
}

fn complete_not_needed_package(fields: Map<String, Value>) -> Result<NotNeededPackage, PublishError> {
    // Also rejects projectName, packageKind, globals and declaredModules,
    // which are derived below and must not be authored.
    if let Some(key) = fields
        .keys()
        .find(|key| !NOT_NEEDED_ALLOWED_KEYS.contains(&key.as_str()))
    {
        return Err(PublishError::validation(
            key.clone(),
            format!("Unexpected key in not-needed package: {}", key),
        ));
    }

    for key in NOT_NEEDED_REQUIRED_KEYS {
        match fields.get(*key) {
            Some(Value::String(value)) if !value.is_empty() => {}
            _ => {
                return Err(PublishError::validation(
                    *key,
                    format!("{} must be a non-empty string", key),
                ));
            }
        }
    }

    let as_of_version = match fields.get("asOfVersion") {
        None => None,
        Some(Value::String(version)) => Some(version.clone()),
        Some(_) => {
            return Err(PublishError::validation(
                "asOfVersion",
                "asOfVersion must be a string",
            ));
        }
    };

    let string_field = |key: &str| {
        fields
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let source_repo_url = string_field("sourceRepoURL");

    Ok(NotNeededPackage {
        common: PackageCommonProperties {
            library_name: string_field("libraryName"),
            typings_package_name: string_field("typingsPackageName"),
            project_name: Some(source_repo_url.clone()),
            source_repo_url,
            globals: Vec::new(),
            declared_modules: Vec::new(),
        },
        package_kind: NotNeededKind::NotNeeded,
        as_of_version,
    })
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PublishError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| PublishError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_str(&content).map_err(|source| PublishError::Json {
        path: path.to_path_buf(),
        source,
    })
}

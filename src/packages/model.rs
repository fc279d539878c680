//! Package record model
//!
//! Two kinds of package flow through the publisher: [`TypingsData`], a generated
//! definitions package that gets published, and [`NotNeededPackage`], a stub that is
//! published once and then deprecated in favor of the library's own types. Both share
//! [`PackageCommonProperties`]; [`AnyPackage`] is the union the publisher works on.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::settings::Settings;

/// Scope the deprecation notice of stub packages points users to
const DEPRECATION_TARGET_SCOPE: &str = "@types";

/// Metadata shared by every package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageCommonProperties {
    /// Human readable name, e.g. "Moment.js" even though the package is "moment"
    pub library_name: String,

    /// Registry name to publish under, e.g. "jquery". May not be lower-cased yet.
    pub typings_package_name: String,

    #[serde(rename = "sourceRepoURL")]
    pub source_repo_url: String,

    /// Name or URL of the project, e.g. "http://cordova.apache.org"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,

    /// Names introduced into the global scope
    #[serde(default)]
    pub globals: Vec<String>,

    /// External modules declared by this package
    #[serde(default)]
    pub declared_modules: Vec<String>,
}

/// A publishable definitions package, as written by catalog generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingsData {
    #[serde(flatten)]
    pub common: PackageCommonProperties,

    /// Definition file kind, e.g. "ProperModule"
    pub kind: String,

    pub module_dependencies: Vec<String>,
    pub library_dependencies: Vec<String>,

    /// e.g. "master"
    pub source_branch: String,

    /// Primary definition file, e.g. "jquery.d.ts"
    pub definition_filename: String,

    /// Parsed from "Definitions by:"
    pub authors: String,

    pub library_major_version: u32,
    pub library_minor_version: u32,

    /// Folder containing all files of the package
    pub root: PathBuf,

    /// Files published with the package; never includes a partial `package.json`
    pub files: Vec<String>,

    /// Whether a partial `package.json` exists in `root`
    pub has_package_json: bool,

    /// Hash over all files of the package
    pub content_hash: String,
}

/// Discriminant carried by stub packages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NotNeededKind {
    #[default]
    #[serde(rename = "not-needed")]
    NotNeeded,
}

/// A stub package whose library now ships its own types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotNeededPackage {
    #[serde(flatten)]
    pub common: PackageCommonProperties,

    pub package_kind: NotNeededKind,

    /// Types are deprecated as of this library version, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of_version: Option<String>,
}

/// Why catalog generation rejected a definitions folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectionReason {
    TooManyFiles,
    BadFileFormat,
    ReferencePaths,
}

/// Either kind of package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnyPackage {
    NotNeeded(NotNeededPackage),
    Typings(TypingsData),
}

impl AnyPackage {
    pub fn common(&self) -> &PackageCommonProperties {
        match self {
            Self::Typings(typings) => &typings.common,
            Self::NotNeeded(stub) => &stub.common,
        }
    }

    pub fn typings_package_name(&self) -> &str {
        &self.common().typings_package_name
    }

    pub fn library_name(&self) -> &str {
        &self.common().library_name
    }

    pub fn is_not_needed(&self) -> bool {
        matches!(self, Self::NotNeeded(_))
    }

    pub fn as_not_needed(&self) -> Option<&NotNeededPackage> {
        match self {
            Self::NotNeeded(stub) => Some(stub),
            Self::Typings(_) => None,
        }
    }

    /// Directory holding the generated package
    pub fn output_path(&self, settings: &Settings) -> PathBuf {
        settings.output_path.join(self.typings_package_name())
    }

    /// Scoped, lower-cased registry name, e.g. `@types/jquery`
    pub fn full_name(&self, settings: &Settings) -> String {
        full_package_name(&settings.scope_name, self.typings_package_name())
    }
}

impl From<TypingsData> for AnyPackage {
    fn from(typings: TypingsData) -> Self {
        Self::Typings(typings)
    }
}

impl From<NotNeededPackage> for AnyPackage {
    fn from(stub: NotNeededPackage) -> Self {
        Self::NotNeeded(stub)
    }
}

/// `@scope/name` with the name lower-cased
pub fn full_package_name(scope_name: &str, typings_package_name: &str) -> String {
    format!("@{}/{}", scope_name, typings_package_name.to_lowercase())
}

/// README text of a stub package
///
/// With `use_newline` false the two sentences are joined by a space, which is what
/// registries that render deprecation messages literally need.
pub fn not_needed_readme(package: &NotNeededPackage, use_newline: bool) -> String {
    let lines = [
        format!(
            "This is a stub package for the experimental types definitions of {}.",
            package.common.library_name
        ),
        format!(
            "Use {}/{} instead.",
            DEPRECATION_TARGET_SCOPE, package.common.typings_package_name
        ),
    ];
    lines.join(if use_newline { "\n" } else { " " })
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_full_package_name_lowercases_only_the_name() {
        assert_eq!(full_package_name("types", "JQuery"), "@types/jquery");
        assert_eq!(full_package_name("types", "node"), "@types/node");
    }

    #[test]
    fn test_full_name_does_not_mutate_record() {
        let package = AnyPackage::from(typings("JQuery"));
        let settings = Settings {
            home: PathBuf::from("/p"),
            definitely_typed_path: PathBuf::from("/dt"),
            output_path: PathBuf::from("/p/output"),
            scope_name: "types".to_string(),
            tag: None,
        };

        assert_eq!(package.full_name(&settings), "@types/jquery");
        assert_eq!(package.typings_package_name(), "JQuery");
        assert_eq!(package.output_path(&settings), PathBuf::from("/p/output/JQuery"));
    }

    #[test]
    fn test_is_not_needed() {
        let stub = AnyPackage::from(not_needed("Foo", "foo"));
        let typed = AnyPackage::from(typings("foo"));

        assert!(stub.is_not_needed());
        assert!(stub.as_not_needed().is_some());
        assert!(!typed.is_not_needed());
        assert!(typed.as_not_needed().is_none());
    }

    #[test]
    fn test_not_needed_readme() {
        let stub = not_needed("Foo", "foo");

        assert_eq!(
            not_needed_readme(&stub, true),
            "This is a stub package for the experimental types definitions of Foo.\nUse @types/foo instead."
        );
        let single_line = not_needed_readme(&stub, false);
        assert!(!single_line.contains('\n'));
        assert!(single_line.ends_with("Use @types/foo instead."));
    }

    #[test]
    fn test_typings_data_json_field_names() {
        let json = serde_json::to_value(typings("jquery")).unwrap();

        assert_eq!(json["typingsPackageName"], "jquery");
        assert_eq!(
            json["sourceRepoURL"],
            "https://github.com/DefinitelyTyped/DefinitelyTyped"
        );
        assert_eq!(json["libraryMajorVersion"], 1);
        assert_eq!(json["hasPackageJson"], false);
        assert!(json.get("packageKind").is_none());
    }

    #[test]
    fn test_not_needed_package_serializes_discriminant() {
        let json = serde_json::to_value(not_needed("Foo", "foo")).unwrap();
        assert_eq!(json["packageKind"], "not-needed");
        assert!(json.get("asOfVersion").is_none());
    }

    #[test]
    fn test_any_package_untagged_deserialization() {
        let stub_json = serde_json::to_string(&not_needed("Foo", "foo")).unwrap();
        let typings_json = serde_json::to_string(&typings("bar")).unwrap();

        let stub: AnyPackage = serde_json::from_str(&stub_json).unwrap();
        let typed: AnyPackage = serde_json::from_str(&typings_json).unwrap();

        assert!(stub.is_not_needed());
        assert!(!typed.is_not_needed());
        assert_eq!(typed.typings_package_name(), "bar");
    }

    #[test]
    fn test_rejection_reason_serialization() {
        let json = serde_json::to_string(&RejectionReason::ReferencePaths).unwrap();
        assert_eq!(json, r#""ReferencePaths""#);
    }
}

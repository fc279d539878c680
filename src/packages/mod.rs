//! Package records and the files that describe them
//!
//! This module holds the package model, the bulk catalog reader, the content hasher
//! and the generated manifest reader.

pub mod catalog;
pub mod hash;
pub mod manifest;
pub mod model;

pub use catalog::{
    AllPackages, Catalog, get_package, read_all_packages, read_all_packages_array,
    read_not_needed_packages, read_types_catalog, read_typings, types_data_file_exists,
    write_data_file,
};
pub use hash::{compute_file_hash, compute_hash};
pub use manifest::PackageManifest;
pub use model::{
    AnyPackage, NotNeededKind, NotNeededPackage, PackageCommonProperties, RejectionReason,
    TypingsData, full_package_name, not_needed_readme,
};

//! Package Publisher - publishes a single package
//!
//! Manages the publishing workflow of one package:
//! - Reading the generated manifest and its version
//! - Publishing through the registry client
//! - Applying a non-default distribution tag
//! - Deprecating stub packages
//!
//! Each step is written to a [`PublishLog`] that is returned on success and attached
//! to the error on failure. Nothing is retried.

use crate::core::error::{PublishError, PublishFailure};
use crate::core::logging::PublishLog;
use crate::core::settings::Settings;
use crate::core::traits::{CommandRunner, RegistryClient};
use crate::packages::manifest::PackageManifest;
use crate::packages::model::{AnyPackage, not_needed_readme};
use crate::security::command_executor::run_command;

/// Publish `package` and return the log of what was done
///
/// In a dry run the client is asked to simulate the publish, and the tag and
/// deprecate calls are only logged.
pub async fn publish_package<C: RegistryClient + ?Sized>(
    client: &C,
    settings: &Settings,
    package: &AnyPackage,
    dry_run: bool,
) -> Result<PublishLog, PublishFailure> {
    let mut log = PublishLog::quiet();
    match publish_steps(client, settings, package, dry_run, &mut log).await {
        Ok(()) => Ok(log),
        Err(error) => {
            log.error(format!("Publishing {} failed: {}", package.typings_package_name(), error));
            Err(PublishFailure::new(error, log))
        }
    }
}

async fn publish_steps<C: RegistryClient + ?Sized>(
    client: &C,
    settings: &Settings,
    package: &AnyPackage,
    dry_run: bool,
    log: &mut PublishLog,
) -> Result<(), PublishError> {
    let name = package.typings_package_name();
    let full_name = package.full_name(settings);
    log.info(format!("Publishing {}", name));

    let package_dir = package.output_path(settings);
    let manifest = PackageManifest::read(&package_dir).await?;
    let version = manifest.version.as_str();

    client
        .publish(&package_dir, &manifest, dry_run)
        .await
        .map_err(|e| PublishError::registry("publish", e.to_string()))?;
    log.info(format!(
        "Published {}@{}{}",
        full_name,
        version,
        if dry_run { " (dry run)" } else { "" }
    ));

    if let Some(tag) = settings.non_default_tag() {
        if dry_run {
            log.info(format!("Would tag {}@{} as {}", full_name, version, tag));
        } else {
            log.info(format!("Tagging {}@{} as {}", full_name, version, tag));
            client
                .tag(&full_name, version, tag)
                .await
                .map_err(|e| PublishError::registry("tag", e.to_string()))?;
        }
    }

    match package {
        AnyPackage::NotNeeded(stub) => {
            log.info(format!("Deprecating {}", name));
            // Registries show deprecation messages literally, so keep it on one line.
            let message = not_needed_readme(stub, false);
            if dry_run {
                log.info(format!("(dry run) deprecation message: {}", message));
            } else {
                client
                    .deprecate(&full_name, version, &message)
                    .await
                    .map_err(|e| PublishError::registry("deprecate", e.to_string()))?;
            }
        }
        AnyPackage::Typings(_) => {}
    }

    Ok(())
}

/// Unpublish every version of `package`; used for testing and rollback only
pub async fn unpublish_package<R: CommandRunner + ?Sized>(
    runner: &R,
    settings: &Settings,
    package: &AnyPackage,
    dry_run: bool,
    log: &mut PublishLog,
) -> Result<(), PublishError> {
    let args = vec![
        "npm".to_string(),
        "unpublish".to_string(),
        package.full_name(settings),
        "--force".to_string(),
    ];
    run_command(runner, "Unpublish", log, dry_run, &args).await
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Publish { dir: PathBuf, version: String, dry_run: bool },
        Tag { name: String, version: String, tag: String },
        Deprecate { name: String, version: String, message: String },
    }

    /// Registry client recording calls; `fail_on` names the operation that errors
    #[derive(Default)]
    pub struct FakeRegistry {
        pub calls: Mutex<Vec<Call>>,
        pub fail_on: Option<&'static str>,
    }

    impl FakeRegistry {
        pub fn failing_on(operation: &'static str) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on: Some(operation),
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, operation: &str, call: Call) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push(call);
            if self.fail_on == Some(operation) {
                anyhow::bail!("npm ERR! {} failed", operation);
            }
            Ok(())
        }
    }

    #[async_trait]
    impl RegistryClient for FakeRegistry {
        async fn publish(
            &self,
            package_dir: &Path,
            manifest: &PackageManifest,
            dry_run: bool,
        ) -> anyhow::Result<()> {
            self.record(
                "publish",
                Call::Publish {
                    dir: package_dir.to_path_buf(),
                    version: manifest.version.clone(),
                    dry_run,
                },
            )
        }

        async fn tag(&self, package_name: &str, version: &str, tag: &str) -> anyhow::Result<()> {
            self.record(
                "tag",
                Call::Tag {
                    name: package_name.to_string(),
                    version: version.to_string(),
                    tag: tag.to_string(),
                },
            )
        }

        async fn deprecate(
            &self,
            full_name: &str,
            version: &str,
            message: &str,
        ) -> anyhow::Result<()> {
            self.record(
                "deprecate",
                Call::Deprecate {
                    name: full_name.to_string(),
                    version: version.to_string(),
                    message: message.to_string(),
                },
            )
        }
    }
}

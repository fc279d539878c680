//! npm registry client
//!
//! Implements [`RegistryClient`] by running the `npm` CLI:
//! - `npm publish --access public [--dry-run]` in the package directory
//! - `npm dist-tag add <name>@<version> <tag>`
//! - `npm deprecate <name>@<version> <message>`
//!
//! Authentication is left to npm itself (`NPM_TOKEN` via `.npmrc`); the token is
//! masked out of any error text surfaced to the publisher.

use async_trait::async_trait;
use std::path::Path;

use crate::core::traits::{CommandRunner, RegistryClient};
use crate::packages::manifest::PackageManifest;
use crate::security::command_executor::SafeCommandExecutor;
use crate::security::token_manager::SecureTokenManager;

/// npm registry client over any [`CommandRunner`]
pub struct NpmClient<R: CommandRunner = SafeCommandExecutor> {
    runner: R,
    tokens: SecureTokenManager,
}

impl<R: CommandRunner> NpmClient<R> {
    /// Create a new npm client
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            tokens: SecureTokenManager::new(),
        }
    }

    pub fn with_token_manager(mut self, tokens: SecureTokenManager) -> Self {
        self.tokens = tokens;
        self
    }

    fn publish_args(dry_run: bool) -> Vec<String> {
        let mut args = vec![
            "npm".to_string(),
            "publish".to_string(),
            "--access".to_string(),
            "public".to_string(),
        ];
        if dry_run {
            args.push("--dry-run".to_string());
        }
        args
    }

    /// Run npm, returning stdout or the masked stderr as the error
    async fn npm(&self, args: Vec<String>, cwd: Option<&Path>) -> anyhow::Result<String> {
        let output = self
            .runner
            .run(&args, cwd)
            .await
            .map_err(|e| anyhow::anyhow!("{}", self.tokens.mask_tokens_in_string(&e.to_string())))?;

        if !output.success() {
            let stderr = self.tokens.mask_tokens_in_string(output.stderr.trim_end());
            anyhow::bail!("{}", stderr);
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl<R: CommandRunner> RegistryClient for NpmClient<R> {
    async fn publish(
        &self,
        package_dir: &Path,
        manifest: &PackageManifest,
        dry_run: bool,
    ) -> anyhow::Result<()> {
        tracing::debug!(
            dir = %package_dir.display(),
            version = %manifest.version,
            dry_run,
            "npm publish"
        );
        self.npm(Self::publish_args(dry_run), Some(package_dir))
            .await
            .map(|_| ())
    }

    async fn tag(&self, package_name: &str, version: &str, tag: &str) -> anyhow::Result<()> {
        let args = vec![
            "npm".to_string(),
            "dist-tag".to_string(),
            "add".to_string(),
            format!("{}@{}", package_name, version),
            tag.to_string(),
        ];
        self.npm(args, None).await.map(|_| ())
    }

    async fn deprecate(
        &self,
        full_name: &str,
        version: &str,
        message: &str,
    ) -> anyhow::Result<()> {
        let args = vec![
            "npm".to_string(),
            "deprecate".to_string(),
            format!("{}@{}", full_name, version),
            message.to_string(),
        ];
        self.npm(args, None).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::command_executor::fakes::FakeRunner;
    use serde_json::json;
    use std::path::PathBuf;

    fn manifest() -> PackageManifest {
        PackageManifest::from_value(
            PathBuf::from("/out/foo/package.json"),
            json!({"name": "@types/foo", "version": "1.0.0"}),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_publish_runs_in_package_dir() {
        let client = NpmClient::new(FakeRunner::succeeding("+ @types/foo@1.0.0"));

        client
            .publish(Path::new("/out/foo"), &manifest(), false)
            .await
            .unwrap();

        let calls = client.runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, vec!["npm", "publish", "--access", "public"]);
        assert_eq!(calls[0].1, Some(PathBuf::from("/out/foo")));
    }

    #[tokio::test]
    async fn test_publish_dry_run_flag() {
        let client = NpmClient::new(FakeRunner::succeeding(""));

        client
            .publish(Path::new("/out/foo"), &manifest(), true)
            .await
            .unwrap();

        let calls = client.runner.calls();
        assert_eq!(calls[0].0.last().map(String::as_str), Some("--dry-run"));
    }

    #[tokio::test]
    async fn test_tag_and_deprecate_args() {
        let client = NpmClient::new(FakeRunner::succeeding(""));

        client.tag("@types/foo", "1.0.0", "next").await.unwrap();
        client
            .deprecate("@types/foo", "1.0.0", "Use @types/foo instead.")
            .await
            .unwrap();

        let calls = client.runner.calls();
        assert_eq!(
            calls[0].0,
            vec!["npm", "dist-tag", "add", "@types/foo@1.0.0", "next"]
        );
        assert_eq!(
            calls[1].0,
            vec!["npm", "deprecate", "@types/foo@1.0.0", "Use @types/foo instead."]
        );
        assert_eq!(calls[1].1, None);
    }

    #[tokio::test]
    async fn test_failure_surfaces_stderr() {
        let client = NpmClient::new(FakeRunner::failing("", "npm ERR! 403 Forbidden\n"))
            .with_token_manager(SecureTokenManager::with_env_var(
                "TYPES_PUBLISHER_TEST_TOKEN_UNSET",
            ));

        let error = client
            .tag("@types/foo", "1.0.0", "next")
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "npm ERR! 403 Forbidden");
    }
}

//! Batch Publisher - publishes many packages
//!
//! Features:
//! - Parallel publishing with a caller-chosen concurrency limit
//! - Independent packages: one failure never blocks or retries another
//! - A log for every package, successful or not

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info};
use uuid::Uuid;

use crate::core::logging::PublishLog;
use crate::core::settings::Settings;
use crate::core::traits::RegistryClient;
use crate::orchestration::package_publisher::publish_package;
use crate::packages::model::AnyPackage;

/// Batch publishing options
#[derive(Debug, Clone)]
pub struct BatchPublishOptions {
    /// Simulate every publish
    pub dry_run: bool,

    /// Maximum concurrent publishes (default: 3)
    pub max_concurrency: usize,
}

impl Default for BatchPublishOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            max_concurrency: 3,
        }
    }
}

/// Outcome of publishing a batch
#[derive(Debug, Clone)]
pub struct BatchPublishResult {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Published package names, in input order
    pub succeeded: Vec<String>,

    /// Failed package names with error messages, in input order
    pub failed: Vec<(String, String)>,

    /// Log of every package in input order; duplicate names each keep their own entry
    pub logs: Vec<(String, PublishLog)>,
}

impl BatchPublishResult {
    pub fn success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Logs recorded for `name`, one per input record with that name
    pub fn logs_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a PublishLog> + 'a {
        self.logs
            .iter()
            .filter(move |(package, _)| package == name)
            .map(|(_, log)| log)
    }
}

/// Publishes packages through a shared registry client
pub struct BatchPublisher<C: RegistryClient + 'static> {
    client: Arc<C>,
    settings: Arc<Settings>,
}

impl<C: RegistryClient + 'static> BatchPublisher<C> {
    pub fn new(client: Arc<C>, settings: Arc<Settings>) -> Self {
        Self { client, settings }
    }

    /// Publish every package in `packages`
    pub async fn publish_all(
        &self,
        packages: Vec<AnyPackage>,
        options: BatchPublishOptions,
    ) -> BatchPublishResult {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(
            %run_id,
            packages = packages.len(),
            max_concurrency = options.max_concurrency,
            dry_run = options.dry_run,
            "Starting batch publish"
        );

        let semaphore = Arc::new(Semaphore::new(options.max_concurrency.max(1)));
        let mut tasks = Vec::with_capacity(packages.len());

        for package in packages {
            let semaphore = Arc::clone(&semaphore);
            let client = Arc::clone(&self.client);
            let settings = Arc::clone(&self.settings);
            let dry_run = options.dry_run;
            let name = package.typings_package_name().to_string();

            let task = tokio::spawn(async move {
                // The semaphore is never closed
                let _permit = semaphore.acquire_owned().await.ok();
                publish_package(client.as_ref(), &settings, &package, dry_run).await
            });

            tasks.push((name, task));
        }

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        let mut logs = Vec::new();

        for (name, task) in tasks {
            match task.await {
                Ok(Ok(log)) => {
                    info!(%run_id, package = %name, "Published successfully");
                    succeeded.push(name.clone());
                    logs.push((name, log));
                }
                Ok(Err(failure)) => {
                    error!(%run_id, package = %name, error = %failure.error, "Publish failed");
                    failed.push((name.clone(), failure.error.to_string()));
                    logs.push((name, failure.log));
                }
                Err(e) => {
                    let message = format!("Task failed: {}", e);
                    error!(%run_id, package = %name, "{}", message);
                    let mut log = PublishLog::quiet();
                    log.error(message.clone());
                    failed.push((name.clone(), message));
                    logs.push((name, log));
                }
            }
        }

        let result = BatchPublishResult {
            run_id,
            started_at,
            finished_at: Utc::now(),
            succeeded,
            failed,
            logs,
        };
        info!(
            %run_id,
            succeeded = result.succeeded.len(),
            failed = result.failed.len(),
            "Batch publish finished"
        );
        result
    }
}

//! types-publisher CLI
//!
//! Publishes generated type definition packages, deprecates stub packages and
//! unpublishes packages for rollback.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use types_publisher::{
    AnyPackage, BatchPublishOptions, BatchPublisher, NpmClient, PublishLog, SafeCommandExecutor,
    Settings, TYPES_DATA_FILENAME, compute_file_hash, read_all_packages, types_data_file_exists,
    unpublish_package,
};

/// Publish generated type definition packages
#[derive(Parser)]
#[command(name = "types-publisher")]
#[command(version)]
#[command(about = "Publish generated type definition packages", long_about = None)]
struct Cli {
    /// Publisher home holding settings.json and data/ (defaults to current directory)
    #[arg(long, env = "TYPES_PUBLISHER_HOME", global = true, value_name = "PATH")]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish packages from the catalog and the not-needed list
    Publish {
        /// Only publish these packages (repeatable)
        #[arg(short, long = "package", value_name = "NAME")]
        packages: Vec<String>,

        /// Log what would happen without changing the registry
        #[arg(long)]
        dry_run: bool,

        /// Maximum concurrent publishes
        #[arg(long, default_value = "3")]
        max_concurrency: usize,
    },

    /// Unpublish packages (testing and rollback only)
    Unpublish {
        /// Packages to unpublish (repeatable)
        #[arg(short, long = "package", value_name = "NAME", required = true)]
        packages: Vec<String>,

        /// Log the command without running it
        #[arg(long)]
        dry_run: bool,
    },

    /// Check that the catalog and the not-needed list load
    Check,

    /// Print the content hash of a file
    Hash {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "types_publisher=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run().await {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("\n❌ Error");
            eprintln!("{:#}", e);
            process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let home = match cli.home {
        Some(home) => home,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    match cli.command {
        Commands::Publish {
            packages,
            dry_run,
            max_concurrency,
        } => {
            let settings = load_settings(&home).await?;
            publish_command(settings, packages, dry_run, max_concurrency).await
        }
        Commands::Unpublish { packages, dry_run } => {
            let settings = load_settings(&home).await?;
            unpublish_command(settings, packages, dry_run).await
        }
        Commands::Check => {
            let settings = load_settings(&home).await?;
            check_command(settings).await
        }
        Commands::Hash { file } => {
            println!("{}", compute_file_hash(&file).await?);
            Ok(0)
        }
    }
}

async fn load_settings(home: &Path) -> Result<Settings> {
    let env: HashMap<String, String> = std::env::vars().collect();
    Settings::load(home, &env)
        .await
        .with_context(|| format!("Failed to load settings from {}", home.display()))
}

/// Load everything, keeping only `filter` when it is non-empty
async fn select_packages(settings: &Settings, filter: &[String]) -> Result<Vec<AnyPackage>> {
    let packages = read_all_packages(settings).await?.into_any_packages();
    if filter.is_empty() {
        return Ok(packages);
    }

    let selected: Vec<AnyPackage> = packages
        .into_iter()
        .filter(|p| filter.iter().any(|name| name == p.typings_package_name()))
        .collect();

    for name in filter {
        if !selected.iter().any(|p| p.typings_package_name() == name) {
            anyhow::bail!("Can't find package {}", name);
        }
    }

    Ok(selected)
}

async fn publish_command(
    settings: Settings,
    filter: Vec<String>,
    dry_run: bool,
    max_concurrency: usize,
) -> Result<i32> {
    println!("\n📦 types-publisher{}\n", if dry_run { " (dry run)" } else { "" });

    let packages = select_packages(&settings, &filter).await?;
    if packages.is_empty() {
        println!("⚠️  Nothing to publish");
        return Ok(0);
    }

    let executor = SafeCommandExecutor::new(&settings.output_path)?;
    let client = Arc::new(NpmClient::new(executor));
    let publisher = BatchPublisher::new(client, Arc::new(settings));

    let result = publisher
        .publish_all(
            packages,
            BatchPublishOptions {
                dry_run,
                max_concurrency,
            },
        )
        .await;

    for (name, log) in &result.logs {
        println!("── {}", name);
        println!("{}\n", log.transcript());
    }

    println!("✅ Succeeded: {}", result.succeeded.len());
    if !result.failed.is_empty() {
        println!("❌ Failed: {}", result.failed.len());
        for (name, error) in &result.failed {
            eprintln!("  - {}: {}", name, error);
        }
        return Ok(1);
    }

    Ok(0)
}

async fn unpublish_command(settings: Settings, filter: Vec<String>, dry_run: bool) -> Result<i32> {
    let packages = select_packages(&settings, &filter).await?;
    let executor = SafeCommandExecutor::new(&settings.home)?;
    let mut exit_code = 0;

    for package in &packages {
        let mut log = PublishLog::console();
        if let Err(e) = unpublish_package(&executor, &settings, package, dry_run, &mut log).await {
            eprintln!("❌ {}: {}", package.typings_package_name(), e);
            exit_code = 1;
        }
    }

    Ok(exit_code)
}

async fn check_command(settings: Settings) -> Result<i32> {
    println!("\n🔍 Catalog Check\n");

    if !types_data_file_exists(&settings) {
        let catalog_path = settings.data_file_path(TYPES_DATA_FILENAME);
        println!("❌ {} not found", catalog_path.display());
        return Ok(1);
    }

    let all = read_all_packages(&settings).await?;
    println!("  ✅ Typings packages: {}", all.typings.len());
    println!("  ✅ Not-needed packages: {}", all.not_needed.len());
    println!();
    Ok(0)
}

//! Orchestration layer for types publishing
//!
//! This module provides the single-package publish and unpublish workflows and the
//! batch publisher that drives them across many packages.

pub mod batch_publisher;
pub mod package_publisher;

// Re-export main types for convenience
pub use batch_publisher::{BatchPublishOptions, BatchPublishResult, BatchPublisher};
pub use package_publisher::{publish_package, unpublish_package};

pub mod core;
pub mod orchestration;
pub mod packages;
pub mod plugins;
pub mod security;

pub use crate::core::*;
pub use orchestration::*;
pub use packages::*;
pub use plugins::NpmClient;
pub use security::{SafeCommandExecutor, SecureTokenManager, run_command};

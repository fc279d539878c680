pub mod command_executor;
pub mod token_manager;

pub use command_executor::{SafeCommandExecutor, run_command};
pub use token_manager::SecureTokenManager;

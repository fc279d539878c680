pub mod error;
pub mod logging;
pub mod settings;
pub mod traits;

pub use error::*;
pub use logging::*;
pub use settings::*;
pub use traits::*;

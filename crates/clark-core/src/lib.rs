pub mod config;
pub mod error;
pub mod types;

pub use config::ClarkConfig;
pub use error::{ClarkError, Result};
pub use types::*;

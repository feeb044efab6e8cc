pub mod config;
pub mod error;
pub mod types;

pub use config::CafeHunterConfig;
pub use error::{CafeHunterError, Result};
pub use types::*;

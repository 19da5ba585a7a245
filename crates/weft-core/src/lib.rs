pub mod config;
pub mod error;
pub mod model;
pub mod traits;

pub use config::AppConfig;
pub use error::{Result, WeftError};
pub use model::*;

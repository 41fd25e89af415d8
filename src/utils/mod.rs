pub mod config;
pub mod errors;

pub use config::{AppConfig, BackendCredentials};
pub use errors::{BloomTranslateError, Result};

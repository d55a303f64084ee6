//! Cross-cutting configuration shared by the binaries.

pub mod config;
pub mod services;

pub use config::AppConfig;
pub use services::ServiceKind;

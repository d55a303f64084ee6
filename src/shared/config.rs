//! Application configuration. Data directory, service addresses, gateway and paging.

use super::services::ServiceKind;
use crate::domain::DomainError;
use crate::usecases::PageLimits;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_GATEWAY_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Directory holding the SQLite database. Read from BIZDESK_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Host the microservices bind to and the gateway connects to. Read from BIZDESK_HOST.
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub clients_port: Option<u16>,
    #[serde(default)]
    pub projects_port: Option<u16>,
    #[serde(default)]
    pub resources_port: Option<u16>,
    #[serde(default)]
    pub planning_port: Option<u16>,
    #[serde(default)]
    pub documents_port: Option<u16>,

    /// HTTP gateway listen address. Read from BIZDESK_GATEWAY_ADDR.
    #[serde(default)]
    pub gateway_addr: Option<String>,

    /// Gateway-to-service request timeout. Read from BIZDESK_REQUEST_TIMEOUT_MS.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,

    #[serde(default)]
    pub default_page_size: Option<u32>,
    #[serde(default)]
    pub max_page_size: Option<u32>,
}

impl AppConfig {
    /// Loads `.env`, then `BIZDESK_*` variables, then the file named by `BIZDESK_CONFIG` if set.
    pub fn load() -> Result<Self, DomainError> {
        dotenv::dotenv().ok();
        Self::build(std::env::var("BIZDESK_CONFIG").ok().as_deref())
            .map_err(|e| DomainError::Config(e.to_string()))
    }

    fn build(file: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("BIZDESK"));
        if let Some(path) = file {
            c = c.add_source(config::File::with_name(path));
        }
        c.build()?.try_deserialize()
    }

    pub fn data_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.data_dir.as_deref().unwrap_or(DEFAULT_DATA_DIR))
    }

    pub fn host_or_default(&self) -> String {
        self.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_string())
    }

    /// Port of a service; falls back to its well-known default.
    pub fn port_or_default(&self, kind: ServiceKind) -> u16 {
        let configured = match kind {
            ServiceKind::Clients => self.clients_port,
            ServiceKind::Projects => self.projects_port,
            ServiceKind::Resources => self.resources_port,
            ServiceKind::Planning => self.planning_port,
            ServiceKind::Documents => self.documents_port,
        };
        configured.unwrap_or_else(|| kind.default_port())
    }

    /// `host:port` a service listens on and the gateway dials.
    pub fn service_addr(&self, kind: ServiceKind) -> String {
        format!("{}:{}", self.host_or_default(), self.port_or_default(kind))
    }

    pub fn gateway_addr_or_default(&self) -> String {
        self.gateway_addr
            .clone()
            .unwrap_or_else(|| DEFAULT_GATEWAY_ADDR.to_string())
    }

    pub fn request_timeout_or_default(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS))
    }

    /// Page size bounds. A default above the maximum is clamped to it.
    pub fn page_limits_or_default(&self) -> PageLimits {
        let fallback = PageLimits::default();
        let max_size = self.max_page_size.unwrap_or(fallback.max_size).max(1);
        let default_size = self
            .default_page_size
            .unwrap_or(fallback.default_size)
            .clamp(1, max_size);
        PageLimits {
            default_size,
            max_size,
        }
    }
}

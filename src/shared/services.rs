//! The five microservices and their defaults.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ServiceKind {
    Clients,
    Projects,
    Resources,
    Planning,
    Documents,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 5] = [
        ServiceKind::Clients,
        ServiceKind::Projects,
        ServiceKind::Resources,
        ServiceKind::Planning,
        ServiceKind::Documents,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Projects => "projects",
            Self::Resources => "resources",
            Self::Planning => "planning",
            Self::Documents => "documents",
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            Self::Clients => 3001,
            Self::Projects => 3002,
            Self::Resources => 3003,
            Self::Planning => 3004,
            Self::Documents => 3005,
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ServiceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown service: {s}"))
    }
}

//! bizdesk: small-business management microservices (clients, projects,
//! resources, planning, documents) behind an HTTP gateway, with Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;

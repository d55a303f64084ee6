//! Infrastructure adapters.
//!
//! SQLite persistence implements the outbound ports, the TCP transport hosts
//! the inbound port, the HTTP gateway and the data hook sit in front of it.
//! Infrastructure errors are mapped to DomainError.

pub mod fetch;
pub mod http;
pub mod persistence;
pub mod transport;

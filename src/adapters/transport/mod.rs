//! Microservice transport: `<length>#<json>` framed messages over TCP.
//!
//! `server` hosts a `MessageHandler`, `client` is used by the gateway to reach
//! the services, `controllers` bind message patterns to the use cases.

pub mod client;
pub mod controllers;
pub mod framing;
pub mod message;
pub mod server;

pub use client::ServiceClient;
pub use message::{IncomingMessage, MessageId, OutgoingResponse, WireError};
pub use server::MicroserviceServer;

//! Inbound port. Transport adapters call into the application.

use crate::domain::DomainError;
use serde_json::Value;

/// Message-pattern handler: one per microservice.
///
/// `cmd` is the `{cmd}` routing key of the request, `data` its JSON payload.
/// The returned value becomes the `response` of the reply.
#[async_trait::async_trait]
pub trait MessageHandler: Send + Sync {
    /// Service name used in logs.
    fn service(&self) -> &'static str;

    /// Every pattern this handler answers.
    fn patterns(&self) -> &'static [&'static str];

    async fn handle(&self, cmd: &str, data: Value) -> Result<Value, DomainError>;
}

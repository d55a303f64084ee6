//! Client side of the microservice transport, used by the gateway.
//!
//! Keeps one lazily opened connection per service. Requests are serialized on
//! it; replies are matched by id so a late reply to a timed-out request is skipped.

use super::framing::{decode_frame, encode_frame};
use super::message::{IncomingMessage, MessageId, OutgoingResponse};
use super::server::PING;
use crate::domain::DomainError;
use bytes::BytesMut;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

struct Connection {
    stream: TcpStream,
    buf: BytesMut,
}

pub struct ServiceClient {
    service: &'static str,
    addr: String,
    timeout: Duration,
    conn: Mutex<Option<Connection>>,
}

impl ServiceClient {
    pub fn new(service: &'static str, addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            service,
            addr: addr.into(),
            timeout,
            conn: Mutex::new(None),
        }
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Sends `{cmd}` with `payload` and decodes the reply's `response`.
    pub async fn send<P, R>(&self, cmd: &str, payload: &P) -> Result<R, DomainError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let data = serde_json::to_value(payload)?;
        let value = self.send_value(cmd, data).await?;
        serde_json::from_value(value).map_err(|e| {
            DomainError::Transport(format!("{} replied with unexpected shape: {e}", self.service))
        })
    }

    /// Sends a request and returns the raw `response`.
    /// Remote errors come back as `DomainError::Remote`.
    pub async fn send_value(&self, cmd: &str, data: Value) -> Result<Value, DomainError> {
        let id = MessageId::from(Uuid::new_v4().to_string());
        let request = IncomingMessage::request(cmd, data, id.clone());
        let frame = encode_frame(&request)?;

        let mut guard = self.conn.lock().await;
        let exchange = async {
            if guard.is_none() {
                *guard = Some(self.connect().await?);
            }
            let conn = guard
                .as_mut()
                .ok_or_else(|| DomainError::Transport("connection unavailable".into()))?;
            conn.stream.write_all(&frame).await.map_err(transport_err)?;
            read_reply(conn, &id).await
        };

        let outcome = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::Transport(format!(
                "{} did not answer {cmd} within {} ms",
                self.service,
                self.timeout.as_millis()
            ))),
        };

        match outcome {
            Ok(reply) => {
                debug!(service = self.service, cmd, "reply received");
                reply.into_result()
            }
            Err(e) => {
                warn!(
                    service = self.service,
                    cmd,
                    error = %e,
                    "request failed, dropping connection"
                );
                *guard = None;
                Err(e)
            }
        }
    }

    /// Fire-and-forget message without an id; the service sends no reply.
    pub async fn emit<P: Serialize + ?Sized>(
        &self,
        cmd: &str,
        payload: &P,
    ) -> Result<(), DomainError> {
        let message = IncomingMessage {
            pattern: serde_json::json!({ "cmd": cmd }),
            data: serde_json::to_value(payload)?,
            id: None,
        };
        let frame = encode_frame(&message)?;
        let mut guard = self.conn.lock().await;
        if guard.is_none() {
            *guard = Some(self.connect().await?);
        }
        if let Some(conn) = guard.as_mut() {
            if let Err(e) = conn.stream.write_all(&frame).await {
                *guard = None;
                return Err(transport_err(e));
            }
        }
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), DomainError> {
        match self.send_value(PING, Value::Null).await? {
            Value::String(s) if s == "pong" => Ok(()),
            other => Err(DomainError::Transport(format!(
                "{} answered ping with {other}",
                self.service
            ))),
        }
    }

    async fn connect(&self) -> Result<Connection, DomainError> {
        let stream = TcpStream::connect(&self.addr).await.map_err(|e| {
            DomainError::Transport(format!("{} unreachable at {}: {e}", self.service, self.addr))
        })?;
        stream.set_nodelay(true).map_err(transport_err)?;
        debug!(service = self.service, addr = %self.addr, "connected");
        Ok(Connection {
            stream,
            buf: BytesMut::with_capacity(8 * 1024),
        })
    }
}

async fn read_reply(
    conn: &mut Connection,
    id: &MessageId,
) -> Result<OutgoingResponse, DomainError> {
    loop {
        while let Some(payload) = decode_frame(&mut conn.buf)? {
            let reply: OutgoingResponse = serde_json::from_slice(&payload)
                .map_err(|e| DomainError::Transport(format!("undecodable reply: {e}")))?;
            if reply.id == *id {
                return Ok(reply);
            }
            debug!(stale = %reply.id, "skipping reply to an earlier request");
        }
        let read = conn.stream.read_buf(&mut conn.buf).await.map_err(transport_err)?;
        if read == 0 {
            return Err(DomainError::Transport("connection closed by service".into()));
        }
    }
}

fn transport_err(err: std::io::Error) -> DomainError {
    DomainError::Transport(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::transport::server::MicroserviceServer;
    use crate::ports::MessageHandler;
    use serde_json::json;
    use std::sync::Arc;
    use tokio::net::TcpListener;

    struct Slow;

    #[async_trait::async_trait]
    impl MessageHandler for Slow {
        fn service(&self) -> &'static str {
            "slow"
        }

        fn patterns(&self) -> &'static [&'static str] {
            &["wait", "double", "missing"]
        }

        async fn handle(&self, cmd: &str, data: Value) -> Result<Value, DomainError> {
            match cmd {
                "wait" => {
                    tokio::time::sleep(Duration::from_millis(300)).await;
                    Ok(json!("late"))
                }
                "double" => Ok(json!(data.as_i64().unwrap_or(0) * 2)),
                "missing" => Err(DomainError::not_found("client", 8)),
                other => Err(DomainError::UnknownPattern(other.into())),
            }
        }
    }

    async fn client(timeout_ms: u64) -> ServiceClient {
        let server = MicroserviceServer::bind("127.0.0.1:0", Arc::new(Slow)).await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());
        ServiceClient::new("slow", addr.to_string(), Duration::from_millis(timeout_ms))
    }

    #[tokio::test]
    async fn typed_roundtrip_and_ping() {
        let client = client(1000).await;
        client.ping().await.unwrap();
        let doubled: i64 = client.send("double", &21).await.unwrap();
        assert_eq!(doubled, 42);
    }

    #[tokio::test]
    async fn events_get_no_reply_and_do_not_disturb_requests() {
        let client = client(1000).await;
        assert_eq!(client.service(), "slow");
        client.emit("double", &1).await.unwrap();
        let doubled: i64 = client.send("double", &4).await.unwrap();
        assert_eq!(doubled, 8);
    }

    #[tokio::test]
    async fn remote_error_keeps_code() {
        let client = client(1000).await;
        let err = client.send_value("missing", Value::Null).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
        assert_eq!(err.to_string(), "client 8 not found");
    }

    #[tokio::test]
    async fn timeout_is_transport_error_and_client_recovers() {
        let client = client(50).await;
        let err = client.send_value("wait", Value::Null).await.unwrap_err();
        assert_eq!(err.code(), "TRANSPORT");

        let doubled: i64 = client.send("double", &5).await.unwrap();
        assert_eq!(doubled, 10);
    }

    #[tokio::test]
    async fn unreachable_service_is_transport_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ServiceClient::new("gone", addr.to_string(), Duration::from_millis(500));
        assert_eq!(client.ping().await.unwrap_err().code(), "TRANSPORT");
    }
}

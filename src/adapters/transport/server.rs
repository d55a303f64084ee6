//! TCP microservice server. One task per connection; requests on a connection
//! are handled in arrival order and each gets exactly one reply.

use super::framing::{decode_frame, encode_frame};
use super::message::{IncomingMessage, MessageId, OutgoingResponse};
use crate::domain::DomainError;
use crate::ports::MessageHandler;
use bytes::BytesMut;
use serde::Deserialize;
use serde_json::Value;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// Pattern answered by every service without reaching the handler.
pub const PING: &str = "ping";

pub struct MicroserviceServer {
    listener: TcpListener,
    handler: Arc<dyn MessageHandler>,
}

impl MicroserviceServer {
    pub async fn bind(addr: &str, handler: Arc<dyn MessageHandler>) -> Result<Self, DomainError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| DomainError::Transport(format!("failed to listen on {addr}: {e}")))?;
        Ok(Self { listener, handler })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, DomainError> {
        self.listener
            .local_addr()
            .map_err(|e| DomainError::Transport(e.to_string()))
    }

    /// Accepts connections until the process stops.
    pub async fn run(self) -> Result<(), DomainError> {
        self.run_until(std::future::pending()).await
    }

    /// Accepts connections until `shutdown` resolves. Open connections finish on their own.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) -> Result<(), DomainError> {
        let service = self.handler.service();
        info!(
            service,
            addr = %self.local_addr()?,
            patterns = self.handler.patterns().len(),
            "microservice listening"
        );
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!(service, "microservice stopping");
                    return Ok(());
                }
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            warn!(service, error = %e, "accept failed");
                            continue;
                        }
                    };
                    let handler = Arc::clone(&self.handler);
                    tokio::spawn(async move {
                        debug!(service, %peer, "connection opened");
                        if let Err(e) = serve_connection(stream, handler).await {
                            warn!(service, %peer, error = %e, "connection closed with error");
                        } else {
                            debug!(service, %peer, "connection closed");
                        }
                    });
                }
            }
        }
    }
}

async fn serve_connection(
    mut stream: TcpStream,
    handler: Arc<dyn MessageHandler>,
) -> Result<(), DomainError> {
    let mut buf = BytesMut::with_capacity(8 * 1024);
    loop {
        while let Some(payload) = decode_frame(&mut buf)? {
            if let Some(reply) = process_frame(&payload, handler.as_ref()).await {
                let frame = encode_frame(&reply)?;
                stream
                    .write_all(&frame)
                    .await
                    .map_err(|e| DomainError::Transport(e.to_string()))?;
            }
        }
        let read = stream
            .read_buf(&mut buf)
            .await
            .map_err(|e| DomainError::Transport(e.to_string()))?;
        if read == 0 {
            return Ok(());
        }
    }
}

/// Handles one decoded frame. Returns the reply for requests, `None` for events.
async fn process_frame(payload: &[u8], handler: &dyn MessageHandler) -> Option<OutgoingResponse> {
    let service = handler.service();
    let raw: Value = match serde_json::from_slice(payload) {
        Ok(v) => v,
        Err(e) => {
            warn!(service, error = %e, "dropping undecodable frame");
            return None;
        }
    };
    let reply_id = raw
        .get("id")
        .and_then(|id| MessageId::deserialize(id).ok());

    let message = match serde_json::from_value::<IncomingMessage>(raw) {
        Ok(m) => m,
        Err(e) => {
            warn!(service, error = %e, "malformed message");
            return reply_id.map(|id| OutgoingResponse::reply(id, &Err(e.into())));
        }
    };

    let result = dispatch(&message, handler).await;
    match (&result, &message.id) {
        (Err(e), Some(id)) => {
            debug!(service, id = %id, code = e.code(), error = %e, "request failed")
        }
        (Err(e), None) => warn!(service, code = e.code(), error = %e, "event failed"),
        (Ok(_), _) => {}
    }
    message.id.map(|id| OutgoingResponse::reply(id, &result))
}

async fn dispatch(
    message: &IncomingMessage,
    handler: &dyn MessageHandler,
) -> Result<Value, DomainError> {
    let cmd = message.command()?;
    if cmd == PING {
        return Ok(Value::String("pong".into()));
    }
    debug!(service = handler.service(), cmd = %cmd, "dispatch");
    handler.handle(&cmd, message.data.clone()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Echoes `data` for `echo`, counts `tick` events.
    #[derive(Default)]
    struct Echo {
        ticks: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl MessageHandler for Echo {
        fn service(&self) -> &'static str {
            "echo"
        }

        fn patterns(&self) -> &'static [&'static str] {
            &["echo", "tick"]
        }

        async fn handle(&self, cmd: &str, data: Value) -> Result<Value, DomainError> {
            match cmd {
                "echo" => Ok(data),
                "tick" => {
                    self.ticks.fetch_add(1, Ordering::SeqCst);
                    Ok(Value::Null)
                }
                other => Err(DomainError::UnknownPattern(other.to_string())),
            }
        }
    }

    async fn start(handler: Arc<Echo>) -> SocketAddr {
        let server = MicroserviceServer::bind("127.0.0.1:0", handler).await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());
        addr
    }

    async fn read_reply(stream: &mut TcpStream, buf: &mut BytesMut) -> Value {
        loop {
            if let Some(payload) = decode_frame(buf).unwrap() {
                return serde_json::from_slice(&payload).unwrap();
            }
            assert!(stream.read_buf(buf).await.unwrap() > 0, "server closed");
        }
    }

    #[tokio::test]
    async fn replies_in_order_to_coalesced_requests() {
        let addr = start(Arc::new(Echo::default())).await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        let mut batch = Vec::new();
        let echo = IncomingMessage::request("echo", json!({"n": 1}), "a");
        batch.extend(encode_frame(&echo).unwrap());
        batch.extend(encode_frame(&IncomingMessage::request("ping", Value::Null, "b")).unwrap());
        batch.extend(encode_frame(&IncomingMessage::request("nope", Value::Null, "c")).unwrap());
        stream.write_all(&batch).await.unwrap();

        let mut buf = BytesMut::new();
        let first = read_reply(&mut stream, &mut buf).await;
        assert_eq!(first, json!({"id": "a", "response": {"n": 1}, "isDisposed": true}));
        let second = read_reply(&mut stream, &mut buf).await;
        assert_eq!(second["response"], "pong");
        let third = read_reply(&mut stream, &mut buf).await;
        assert_eq!(third["id"], "c");
        assert_eq!(third["err"]["code"], "UNKNOWN_PATTERN");
    }

    #[tokio::test]
    async fn split_request_is_reassembled() {
        let addr = start(Arc::new(Echo::default())).await;
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let frame = encode_frame(&IncomingMessage::request("echo", json!("hello"), "x")).unwrap();
        for chunk in frame.chunks(3) {
            stream.write_all(chunk).await.unwrap();
            stream.flush().await.unwrap();
        }
        let reply = read_reply(&mut stream, &mut BytesMut::new()).await;
        assert_eq!(reply["response"], "hello");
    }

    #[tokio::test]
    async fn events_get_no_reply() {
        let echo = Arc::new(Echo::default());
        let addr = start(Arc::clone(&echo)).await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        let event = IncomingMessage {
            pattern: json!({"cmd": "tick"}),
            data: Value::Null,
            id: None,
        };
        let mut batch = encode_frame(&event).unwrap();
        batch.extend(encode_frame(&IncomingMessage::request("ping", Value::Null, "p")).unwrap());
        stream.write_all(&batch).await.unwrap();

        // The first reply on the wire belongs to the ping, not the event.
        let reply = read_reply(&mut stream, &mut BytesMut::new()).await;
        assert_eq!(reply["id"], "p");
        assert_eq!(echo.ticks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn numeric_ids_are_echoed_back() {
        let addr = start(Arc::new(Echo::default())).await;
        let mut stream = TcpStream::connect(addr).await.unwrap();

        let echo = json!({"pattern": {"cmd": "echo"}, "data": 5, "id": 7});
        let mut batch = encode_frame(&echo).unwrap();
        batch.extend(encode_frame(&json!({"data": 1, "id": 8})).unwrap());
        stream.write_all(&batch).await.unwrap();

        let mut buf = BytesMut::new();
        let reply = read_reply(&mut stream, &mut buf).await;
        assert_eq!(reply, json!({"id": 7, "response": 5, "isDisposed": true}));
        let reply = read_reply(&mut stream, &mut buf).await;
        assert_eq!(reply["id"], 8);
        assert_eq!(reply["err"]["status"], "error");
    }

    #[tokio::test]
    async fn malformed_length_closes_connection() {
        let addr = start(Arc::new(Echo::default())).await;
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"xx#{}").await.unwrap();
        let mut buf = BytesMut::new();
        assert_eq!(stream.read_buf(&mut buf).await.unwrap(), 0);
    }
}

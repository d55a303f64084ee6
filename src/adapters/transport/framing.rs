//! Message framing for the microservice TCP transport.
//!
//! Each frame is `<byte length>#<json>`: the payload length as decimal ASCII,
//! a `#` delimiter, then exactly that many bytes of JSON.

use crate::domain::DomainError;
use bytes::{Buf, Bytes, BytesMut};
use serde::Serialize;

/// Maximum payload size (4 MiB). Larger frames close the connection.
pub const MAX_FRAME_SIZE: usize = 4 * 1024 * 1024;

const DELIMITER: u8 = b'#';

/// Longest length prefix accepted before the delimiter must appear.
const MAX_PREFIX_DIGITS: usize = 10;

/// Serializes `message` and prefixes it with its byte length.
pub fn encode_frame<T: Serialize>(message: &T) -> Result<Vec<u8>, DomainError> {
    let payload = serde_json::to_vec(message)
        .map_err(|e| DomainError::Transport(format!("encode failed: {e}")))?;
    if payload.len() > MAX_FRAME_SIZE {
        return Err(DomainError::Transport(format!(
            "payload size {} exceeds maximum {MAX_FRAME_SIZE}",
            payload.len()
        )));
    }
    let prefix = payload.len().to_string();
    let mut frame = Vec::with_capacity(prefix.len() + 1 + payload.len());
    frame.extend_from_slice(prefix.as_bytes());
    frame.push(DELIMITER);
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Takes one complete frame payload off the front of `buf`.
///
/// Returns `Ok(None)` when more bytes are needed. A malformed or oversized
/// length prefix is an error; the caller should drop the connection.
pub fn decode_frame(buf: &mut BytesMut) -> Result<Option<Bytes>, DomainError> {
    let Some(delim) = buf.iter().position(|&b| b == DELIMITER) else {
        if buf.len() > MAX_PREFIX_DIGITS || !buf.iter().all(u8::is_ascii_digit) {
            return Err(DomainError::Transport("malformed frame length".into()));
        }
        return Ok(None);
    };

    let prefix = &buf[..delim];
    if prefix.is_empty()
        || prefix.len() > MAX_PREFIX_DIGITS
        || !prefix.iter().all(u8::is_ascii_digit)
    {
        return Err(DomainError::Transport("malformed frame length".into()));
    }
    let len: usize = std::str::from_utf8(prefix)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| DomainError::Transport("malformed frame length".into()))?;
    if len > MAX_FRAME_SIZE {
        return Err(DomainError::Transport(format!(
            "frame length {len} exceeds maximum {MAX_FRAME_SIZE}"
        )));
    }

    let total = delim + 1 + len;
    if buf.len() < total {
        buf.reserve(total - buf.len());
        return Ok(None);
    }
    buf.advance(delim + 1);
    Ok(Some(buf.split_to(len).freeze()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn encodes_byte_length_prefix() {
        let frame = encode_frame(&json!({"name": "Zoë"})).unwrap();
        let text = String::from_utf8(frame).unwrap();
        // "ë" is two bytes in UTF-8.
        assert_eq!(text, "15#{\"name\":\"Zoë\"}");
    }

    #[test]
    fn split_frame_waits_for_remaining_bytes() {
        let frame = encode_frame(&json!({"pattern": "ping", "id": "1"})).unwrap();
        let (head, tail) = frame.split_at(5);

        let mut buf = BytesMut::from(head);
        assert!(decode_frame(&mut buf).unwrap().is_none());
        buf.extend_from_slice(tail);
        let payload = decode_frame(&mut buf).unwrap().unwrap();
        let value: Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(value["pattern"], "ping");
        assert!(buf.is_empty());
    }

    #[test]
    fn prefix_split_before_delimiter() {
        let frame = encode_frame(&json!([1, 2, 3, 4, 5, 6])).unwrap();
        let mut buf = BytesMut::from(&frame[..1]);
        assert!(decode_frame(&mut buf).unwrap().is_none());
        buf.extend_from_slice(&frame[1..]);
        assert_eq!(&decode_frame(&mut buf).unwrap().unwrap()[..], b"[1,2,3,4,5,6]");
    }

    #[test]
    fn coalesced_frames_decode_in_order() {
        let mut buf = BytesMut::new();
        buf.extend_from_slice(&encode_frame(&json!({"n": 1})).unwrap());
        buf.extend_from_slice(&encode_frame(&json!({"n": 2})).unwrap());

        let first = decode_frame(&mut buf).unwrap().unwrap();
        let second = decode_frame(&mut buf).unwrap().unwrap();
        assert_eq!(&first[..], br#"{"n":1}"#);
        assert_eq!(&second[..], br#"{"n":2}"#);
        assert!(decode_frame(&mut buf).unwrap().is_none());
    }

    #[test]
    fn rejects_bad_prefixes() {
        let mut buf = BytesMut::from(&b"abc#{}"[..]);
        assert!(decode_frame(&mut buf).is_err());

        let mut buf = BytesMut::from(&b"#{}"[..]);
        assert!(decode_frame(&mut buf).is_err());

        let mut buf = BytesMut::from(&b"99999999999"[..]);
        assert!(decode_frame(&mut buf).is_err());

        let oversized = format!("{}#", MAX_FRAME_SIZE + 1);
        let mut buf = BytesMut::from(oversized.as_bytes());
        assert!(decode_frame(&mut buf).is_err());
    }
}

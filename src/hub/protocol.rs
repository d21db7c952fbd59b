/// Wire protocol for the notification hub: JSON records terminated by the
/// `0x1e` record separator, carried in websocket text frames. A frame may
/// hold several records. Only the record types the client consumes are
/// modeled; everything else is skipped on decode.
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const RECORD_SEPARATOR: char = '\u{1e}';

/// Opening record sent before any hub traffic. The server replies with an
/// empty object, or an error that aborts the connection.
pub const HANDSHAKE_REQUEST: &str = "{\"protocol\":\"json\",\"version\":1}\u{1e}";

const MESSAGE_INVOCATION: u8 = 1;
const MESSAGE_PING: u8 = 6;
const MESSAGE_CLOSE: u8 = 7;

#[derive(Debug, Clone, PartialEq)]
pub enum HubMessage {
    /// A hub method call in either direction: named target plus positional
    /// JSON arguments.
    Invocation { target: String, arguments: Vec<Value> },
    /// Keepalive record; carries nothing.
    Ping,
    /// Server-initiated shutdown of the logical connection.
    Close { error: Option<String> },
}

/// On-the-wire shape. The `type` discriminant is numeric, which rules out a
/// serde-tagged enum, so records round-trip through this struct.
#[derive(Debug, Serialize, Deserialize)]
struct RawRecord {
    #[serde(rename = "type")]
    kind: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    arguments: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl HubMessage {
    pub fn invocation(target: impl Into<String>, arguments: Vec<Value>) -> Self {
        HubMessage::Invocation {
            target: target.into(),
            arguments,
        }
    }

    /// The `Join` call that subscribes this connection to an account's
    /// notification group.
    pub fn join(account_id: i64) -> Self {
        HubMessage::invocation("Join", vec![Value::from(account_id)])
    }
}

/// Serializes one record, separator included.
pub fn encode(message: &HubMessage) -> String {
    let raw = match message {
        HubMessage::Invocation { target, arguments } => RawRecord {
            kind: MESSAGE_INVOCATION,
            target: Some(target.clone()),
            arguments: Some(arguments.clone()),
            error: None,
        },
        HubMessage::Ping => RawRecord {
            kind: MESSAGE_PING,
            target: None,
            arguments: None,
            error: None,
        },
        HubMessage::Close { error } => RawRecord {
            kind: MESSAGE_CLOSE,
            target: None,
            arguments: None,
            error: error.clone(),
        },
    };

    let mut out = serde_json::to_string(&raw).unwrap_or_else(|_| "{}".to_string());
    out.push(RECORD_SEPARATOR);
    out
}

/// Decodes every recognized record in a frame. Empty segments, malformed
/// JSON, and record types the client does not consume are skipped.
pub fn decode_frame(frame: &str) -> Vec<HubMessage> {
    frame
        .split(RECORD_SEPARATOR)
        .filter(|record| !record.is_empty())
        .filter_map(decode_record)
        .collect()
}

fn decode_record(record: &str) -> Option<HubMessage> {
    let raw: RawRecord = serde_json::from_str(record).ok()?;
    match raw.kind {
        MESSAGE_INVOCATION => Some(HubMessage::Invocation {
            target: raw.target.unwrap_or_default(),
            arguments: raw.arguments.unwrap_or_default(),
        }),
        MESSAGE_PING => Some(HubMessage::Ping),
        MESSAGE_CLOSE => Some(HubMessage::Close { error: raw.error }),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct HandshakeResponse {
    #[serde(default)]
    error: Option<String>,
}

/// Interprets the server's handshake reply record.
pub fn parse_handshake(record: &str) -> Result<(), String> {
    match serde_json::from_str::<HandshakeResponse>(record) {
        Ok(HandshakeResponse { error: None }) => Ok(()),
        Ok(HandshakeResponse { error: Some(e) }) => Err(e),
        Err(e) => Err(format!("malformed handshake response: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_handshake_request_is_terminated() {
        assert!(HANDSHAKE_REQUEST.ends_with(RECORD_SEPARATOR));
        let body = HANDSHAKE_REQUEST.trim_end_matches(RECORD_SEPARATOR);
        let value: Value = serde_json::from_str(body).unwrap();
        assert_eq!(value["protocol"], "json");
        assert_eq!(value["version"], 1);
    }

    #[test]
    fn test_parse_handshake() {
        assert!(parse_handshake("{}").is_ok());
        assert_eq!(
            parse_handshake(r#"{"error":"unsupported protocol"}"#),
            Err("unsupported protocol".to_string())
        );
        assert!(parse_handshake("garbage").is_err());
    }

    #[test]
    fn test_encode_join_invocation() {
        let encoded = encode(&HubMessage::join(42));
        assert!(encoded.ends_with(RECORD_SEPARATOR));

        let body = encoded.trim_end_matches(RECORD_SEPARATOR);
        let value: Value = serde_json::from_str(body).unwrap();
        assert_eq!(value["type"], 1);
        assert_eq!(value["target"], "Join");
        assert_eq!(value["arguments"], json!([42]));
    }

    #[test]
    fn test_decode_multi_record_frame() {
        let frame = format!(
            "{}{}{}{}",
            r#"{"type":1,"target":"Notification","arguments":[{"id":1}]}"#,
            RECORD_SEPARATOR,
            r#"{"type":6}"#,
            RECORD_SEPARATOR,
        );

        let messages = decode_frame(&frame);
        assert_eq!(messages.len(), 2);
        assert!(matches!(
            &messages[0],
            HubMessage::Invocation { target, .. } if target == "Notification"
        ));
        assert_eq!(messages[1], HubMessage::Ping);
    }

    #[test]
    fn test_decode_close_record() {
        let frame = format!(
            "{}{}",
            r#"{"type":7,"error":"server going away"}"#,
            RECORD_SEPARATOR
        );
        let messages = decode_frame(&frame);
        assert_eq!(
            messages[0],
            HubMessage::Close {
                error: Some("server going away".to_string())
            }
        );
    }

    #[test]
    fn test_unconsumed_record_types_are_skipped() {
        // completion (3) and stream item (2) records arrive for invocations
        // the client fired off; they carry nothing it needs
        let frame = format!(
            "{}{}{}{}{}{}",
            r#"{"type":3,"invocationId":"1","result":null}"#,
            RECORD_SEPARATOR,
            r#"{"type":2,"invocationId":"1","item":5}"#,
            RECORD_SEPARATOR,
            r#"{"type":6}"#,
            RECORD_SEPARATOR,
        );

        let messages = decode_frame(&frame);
        assert_eq!(messages, vec![HubMessage::Ping]);
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let frame = format!(
            "not json{}{}{}",
            RECORD_SEPARATOR,
            r#"{"type":6}"#,
            RECORD_SEPARATOR
        );
        assert_eq!(decode_frame(&frame), vec![HubMessage::Ping]);
        assert!(decode_frame("").is_empty());
    }
}

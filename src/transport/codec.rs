//! # Wire Codec
//!
//! Encodes snapshots and decodes listener notifications.
//!
//! Every message is one JSON envelope terminated by `\n`:
//!
//! ```text
//! {"event":"input","data":{"ls":{"x":0.0,"y":0.0},"rs":{"x":0.0,"y":0.0},"buttons":{"a":true},"lt":0.0,"rt":0.0}}
//! {"event":"player_id","data":1}
//! {"event":"error","data":"Server full"}
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::controller::state::ControllerState;
use crate::error::{PadlinkError, Result};

/// Client → listener: controller snapshot.
pub const EVENT_INPUT: &str = "input";
/// Listener → client: assigned player number.
pub const EVENT_PLAYER_ID: &str = "player_id";
/// Listener → client: error message.
pub const EVENT_ERROR: &str = "error";

/// Message delimiter.
pub const DELIMITER: u8 = b'\n';

#[derive(Serialize)]
struct OutboundEnvelope<'a, T> {
    event: &'a str,
    data: T,
}

#[derive(Deserialize)]
struct InboundEnvelope {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Notification received from the listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    PlayerId(u32),
    Error(String),
}

/// Encode a snapshot as one `input` message, delimiter included.
///
/// # Examples
///
/// ```
/// use padlink::controller::state::ControllerState;
/// use padlink::transport::codec::encode_input;
///
/// let frame = encode_input(&ControllerState::new())?;
/// assert!(frame.starts_with(b"{\"event\":\"input\""));
/// assert_eq!(frame.last(), Some(&b'\n'));
/// # Ok::<(), padlink::error::PadlinkError>(())
/// ```
pub fn encode_input(state: &ControllerState) -> Result<Bytes> {
    let mut writer = BytesMut::with_capacity(256).writer();
    serde_json::to_writer(
        &mut writer,
        &OutboundEnvelope {
            event: EVENT_INPUT,
            data: state,
        },
    )?;
    let mut buf = writer.into_inner();
    buf.put_u8(DELIMITER);
    Ok(buf.freeze())
}

/// Decode an `input` message back into a snapshot.
///
/// This is the listener's side of [`encode_input`], for listener
/// implementations written in Rust on top of this crate.
pub fn decode_input(line: &str) -> Result<ControllerState> {
    let envelope: InboundEnvelope = serde_json::from_str(line.trim_end())?;
    if envelope.event != EVENT_INPUT {
        return Err(PadlinkError::Protocol(format!(
            "expected '{}' event, got '{}'",
            EVENT_INPUT, envelope.event
        )));
    }
    Ok(serde_json::from_value(envelope.data)?)
}

/// Decode one line received from the listener.
///
/// # Errors
///
/// Returns error if:
/// - The line is not a JSON envelope
/// - The event name is unknown
/// - The payload does not match the event
pub fn decode_line(line: &str) -> Result<Inbound> {
    let envelope: InboundEnvelope = serde_json::from_str(line.trim_end())?;

    match envelope.event.as_str() {
        EVENT_PLAYER_ID => Ok(Inbound::PlayerId(serde_json::from_value(envelope.data)?)),
        EVENT_ERROR => {
            let message = match envelope.data {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            Ok(Inbound::Error(message))
        }
        other => Err(PadlinkError::Protocol(format!("unknown event '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::state::{Button, StickPosition};

    #[test]
    fn test_encode_input_envelope() {
        let mut state = ControllerState::new();
        state.set_button(Button::A, false);
        state.right_stick = StickPosition::new(-1.0, 0.5);
        state.left_trigger = 1.0;

        let frame = encode_input(&state).unwrap();
        assert_eq!(frame.last(), Some(&DELIMITER));
        assert_eq!(frame.iter().filter(|&&b| b == DELIMITER).count(), 1);

        let value: serde_json::Value = serde_json::from_slice(&frame[..frame.len() - 1]).unwrap();
        assert_eq!(value["event"], "input");
        assert_eq!(value["data"]["buttons"]["a"], false);
        assert_eq!(value["data"]["rs"]["x"], -1.0);
        assert_eq!(value["data"]["lt"], 1.0);
    }

    #[test]
    fn test_decode_input_recovers_snapshot() {
        let mut state = ControllerState::new();
        state.set_button(Button::DpadRight, true);
        state.left_stick = StickPosition::new(0.25, -0.75);
        state.right_trigger = 0.42;

        let frame = encode_input(&state).unwrap();
        let line = std::str::from_utf8(&frame).unwrap();
        assert_eq!(decode_input(line).unwrap(), state);
    }

    #[test]
    fn test_decode_input_rejects_other_events() {
        let result = decode_input(r#"{"event":"player_id","data":1}"#);
        assert!(matches!(result, Err(PadlinkError::Protocol(_))));
    }

    #[test]
    fn test_decode_player_id() {
        assert_eq!(
            decode_line("{\"event\":\"player_id\",\"data\":3}\n").unwrap(),
            Inbound::PlayerId(3)
        );
    }

    #[test]
    fn test_decode_error() {
        assert_eq!(
            decode_line(r#"{"event":"error","data":"Server full - max 4 players"}"#).unwrap(),
            Inbound::Error("Server full - max 4 players".to_string())
        );
    }

    #[test]
    fn test_decode_error_with_structured_payload() {
        assert_eq!(
            decode_line(r#"{"event":"error","data":{"code":7}}"#).unwrap(),
            Inbound::Error(r#"{"code":7}"#.to_string())
        );
    }

    #[test]
    fn test_decode_unknown_event() {
        match decode_line(r#"{"event":"rumble","data":1}"#) {
            Err(PadlinkError::Protocol(msg)) => assert!(msg.contains("rumble")),
            other => panic!("Expected Protocol error, got: {:?}", other),
        }
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(decode_line("not json"), Err(PadlinkError::Json(_))));
        assert!(matches!(
            decode_line(r#"{"event":"player_id","data":"one"}"#),
            Err(PadlinkError::Json(_))
        ));
    }
}

//! Protocol module - JSON packet types for the remote agent
//!
//! One JSON object per line. Every packet shares the same envelope; the
//! `command` field selects the kind. Binary frame bytes never travel raw in
//! packet mode: they are base64-encoded into `payload` before sending and
//! decoded back on receipt.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::core::turn::AckPacket;

pub const CMD_HANDSHAKE: &str = "Handshake";
pub const CMD_INTERACTION: &str = "GameInteraction";
pub const CMD_ACTION_ACK: &str = "ActionAck";
pub const CMD_SCREENSHOT: &str = "Screenshot";
pub const CMD_SETUP: &str = "Setup";
pub const CMD_ERROR: &str = "Error";

/// Sender id the simulation uses in outbound packets.
pub const SERVER_ID: &str = "simulation";

pub const SOLVED_LINE: &str = "puzzle solved correctly";
pub const UNSOLVED_LINE: &str = "not solved correctly, try again";

/// The wire envelope. Absent fields deserialize to empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPacket {
    pub command: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub message: String,
    /// Ordered: command lines inbound, status and log lines outbound.
    #[serde(default)]
    pub messages: Vec<String>,
    /// Base64 of a binary frame; empty when nothing accompanies the packet.
    #[serde(default)]
    pub payload: String,
}

impl DataPacket {
    fn outbound(command: &str, to: &str) -> Self {
        Self {
            command: command.to_string(),
            from: SERVER_ID.to_string(),
            to: to.to_string(),
            message: String::new(),
            messages: Vec::new(),
            payload: String::new(),
        }
    }

    /// Greeting sent to every new packet-mode connection.
    pub fn handshake(to: &str) -> Self {
        let mut packet = Self::outbound(CMD_HANDSHAKE, to);
        packet.message = "connection established, awaiting commands".to_string();
        packet
    }

    /// Build the acknowledgment for one processed turn.
    ///
    /// `messages` carries, in order: the solved verdict (only when the batch
    /// evaluated the board), one status line per object, and the structured
    /// log serialized as a single JSON array string.
    pub fn action_ack(to: &str, ack: &AckPacket, frame: Option<&[u8]>) -> Self {
        let mut packet = Self::outbound(CMD_ACTION_ACK, to);
        if ack.evaluated {
            let verdict = if ack.solved { SOLVED_LINE } else { UNSOLVED_LINE };
            packet.messages.push(verdict.to_string());
        }
        packet.messages.extend(ack.object_status.iter().cloned());
        if let Ok(log) = serde_json::to_string(&ack.log) {
            packet.messages.push(log);
        }
        if let Some(bytes) = frame {
            packet.payload = encode_payload(bytes);
        }
        packet
    }

    /// A standalone frame reply (answering a `Screenshot` request).
    pub fn screenshot(to: &str, frame: &[u8]) -> Self {
        let mut packet = Self::outbound(CMD_SCREENSHOT, to);
        packet.payload = encode_payload(frame);
        packet
    }

    /// Acknowledges a successfully applied Setup.
    pub fn setup_loaded(to: &str) -> Self {
        let mut packet = Self::outbound(CMD_SETUP, to);
        packet.message = "configuration loaded".to_string();
        packet
    }

    pub fn error(to: &str, message: &str) -> Self {
        let mut packet = Self::outbound(CMD_ERROR, to);
        packet.message = message.to_string();
        packet
    }

    pub fn has_payload(&self) -> bool {
        !self.payload.is_empty()
    }
}

pub fn encode_payload(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

pub fn decode_payload(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64.decode(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::turn::ActionRecord;

    #[test]
    fn test_payload_roundtrip_empty_single_and_large() {
        for len in [0usize, 1, 100_000] {
            let bytes: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            assert_eq!(decode_payload(&encode_payload(&bytes)).unwrap(), bytes);
        }
    }

    #[test]
    fn test_missing_fields_deserialize_to_empty() {
        let packet: DataPacket =
            serde_json::from_str(r#"{"command":"GameInteraction"}"#).unwrap();
        assert_eq!(packet.command, CMD_INTERACTION);
        assert!(packet.messages.is_empty());
        assert!(!packet.has_payload());
    }

    #[test]
    fn test_action_ack_layout() {
        let ack = AckPacket {
            object_status: vec!["red cube is at (4,4)".to_string()],
            log: vec![ActionRecord {
                command_index: 0,
                action_index: 0,
                prompt: "done".to_string(),
                validity: "valid command. evaluating the board".to_string(),
            }],
            evaluated: true,
            solved: true,
        };
        let packet = DataPacket::action_ack("client-1", &ack, Some(b"frame"));

        assert_eq!(packet.command, CMD_ACTION_ACK);
        assert_eq!(packet.messages[0], SOLVED_LINE);
        assert_eq!(packet.messages[1], "red cube is at (4,4)");
        let log: Vec<ActionRecord> = serde_json::from_str(&packet.messages[2]).unwrap();
        assert_eq!(log, ack.log);
        assert_eq!(decode_payload(&packet.payload).unwrap(), b"frame");
    }

    #[test]
    fn test_unevaluated_ack_has_no_verdict() {
        let ack = AckPacket {
            object_status: vec!["red cube is at (0,0)".to_string()],
            log: Vec::new(),
            evaluated: false,
            solved: false,
        };
        let packet = DataPacket::action_ack("client-1", &ack, None);
        assert_eq!(packet.messages[0], "red cube is at (0,0)");
        assert!(!packet.has_payload());
    }
}

//! Wire messages and line framing.

use hand_landmarks::Landmark;
use serde::{Deserialize, Serialize};

/// Sent by participants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    Register {
        username: String,
    },
    #[serde(rename_all = "camelCase")]
    Landmarks {
        target_user: String,
        landmarks:   Vec<Landmark>,
    },
}

/// Sent by the relay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    Registered {
        username: String,
    },
    UserList {
        users: Vec<String>,
    },
    Landmarks {
        sender:    String,
        landmarks: Vec<Landmark>,
    },
}

/// Serialize `msg` as one newline-terminated line.
pub fn encode_line<T: Serialize>(msg: &T) -> Result<String, serde_json::Error> {
    let mut line = serde_json::to_string(msg)?;
    line.push('\n');
    Ok(line)
}

pub fn decode_client(line: &str) -> Result<ClientMessage, serde_json::Error> {
    serde_json::from_str(line.trim())
}

pub fn decode_server(line: &str) -> Result<ServerMessage, serde_json::Error> {
    serde_json::from_str(line.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_shape() {
        let line = encode_line(&ClientMessage::Register { username: "alice".into() }).unwrap();
        assert_eq!(line, "{\"type\":\"register\",\"username\":\"alice\"}\n");
    }

    #[test]
    fn landmarks_use_target_user_key() {
        let msg = ClientMessage::Landmarks {
            target_user: "bob".into(),
            landmarks:   vec![Landmark::new(0.5, 0.25, 0.0)],
        };
        let line = encode_line(&msg).unwrap();
        assert!(line.contains("\"type\":\"landmarks\""));
        assert!(line.contains("\"targetUser\":\"bob\""));
        assert_eq!(decode_client(&line).unwrap(), msg);
    }

    #[test]
    fn user_list_tag_is_camel_case() {
        let msg = decode_server(r#"{"type":"userList","users":["a","b"]}"#).unwrap();
        assert_eq!(msg, ServerMessage::UserList { users: vec!["a".into(), "b".into()] });
    }

    #[test]
    fn short_joint_lists_still_decode() {
        // Validation belongs to the receiver, not the framing.
        let msg = decode_server(r#"{"type":"landmarks","sender":"a","landmarks":[{"x":0,"y":0,"z":0}]}"#)
            .unwrap();
        match msg {
            ServerMessage::Landmarks { landmarks, .. } => assert_eq!(landmarks.len(), 1),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_type_is_an_error() {
        assert!(decode_client(r#"{"type":"shout","text":"hi"}"#).is_err());
    }
}

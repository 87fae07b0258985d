//! JSON framing between browser clients and the hub.
//!
//! Clients invoke hub methods with `{ "method": "SendMessage", "args": [...] }`
//! text frames. Server pushes are the serialized [`hub::Message`] values,
//! `{ "type": "ReceiveMessage", "data": {...} }`.

use hub::{ChatService, ConnectionId, Message};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Deserialize)]
struct Invocation {
    method: String,
    #[serde(default)]
    args: Vec<Value>,
}

/// A decoded client invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCall {
    /// `SendMessage(sender, body)` or `newMessage(sender, body)`: public message
    /// under a client-chosen name.
    SendMessage { sender_name: String, body: String },
    /// `SendMessage(body)`: public message under the caller's registered name.
    SendMessageAsCaller { body: String },
    SendPrivateMessage { target_name: String, body: String },
    GetConnectedUsers,
    SendWink { target_name: String },
}

#[derive(Debug, PartialEq, Eq)]
pub enum ProtocolError {
    Malformed(String),
    UnknownMethod(String),
    InvalidArguments { method: String, expected: &'static str },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProtocolError::Malformed(reason) => write!(f, "malformed invocation: {reason}"),
            ProtocolError::UnknownMethod(method) => write!(f, "unknown method {method}"),
            ProtocolError::InvalidArguments { method, expected } => {
                write!(f, "{method} expects {expected}")
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Decode a text frame into a [`ClientCall`].
pub fn parse_invocation(text: &str) -> Result<ClientCall, ProtocolError> {
    let invocation: Invocation =
        serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
    let method = invocation.method.as_str();
    let args = string_args(method, &invocation.args)?;

    match (method, args.as_slice()) {
        ("SendMessage" | "newMessage", [sender_name, body]) => Ok(ClientCall::SendMessage {
            sender_name: sender_name.clone(),
            body: body.clone(),
        }),
        ("SendMessage", [body]) => Ok(ClientCall::SendMessageAsCaller { body: body.clone() }),
        ("SendMessage", _) => Err(invalid(method, "(body) or (sender, body)")),
        ("newMessage", _) => Err(invalid(method, "(sender, body)")),
        ("SendPrivateMessage", [target_name, body]) => Ok(ClientCall::SendPrivateMessage {
            target_name: target_name.clone(),
            body: body.clone(),
        }),
        ("SendPrivateMessage", _) => Err(invalid(method, "(target, body)")),
        ("GetConnectedUsers", []) => Ok(ClientCall::GetConnectedUsers),
        ("GetConnectedUsers", _) => Err(invalid(method, "no arguments")),
        ("SendWink", [target_name]) => Ok(ClientCall::SendWink {
            target_name: target_name.clone(),
        }),
        ("SendWink", _) => Err(invalid(method, "(target)")),
        _ => Err(ProtocolError::UnknownMethod(invocation.method.clone())),
    }
}

/// Run a decoded call against the chat service on behalf of `connection_id`.
pub fn dispatch(
    chat: &ChatService,
    connection_id: &ConnectionId,
    call: ClientCall,
) -> Result<(), hub::Error> {
    match call {
        ClientCall::SendMessage { sender_name, body } => {
            chat.send_public(&sender_name, &body);
            Ok(())
        }
        ClientCall::SendMessageAsCaller { body } => {
            chat.send_from_connection(connection_id, &body);
            Ok(())
        }
        ClientCall::SendPrivateMessage { target_name, body } => {
            chat.send_private(connection_id, &target_name, &body)
        }
        ClientCall::GetConnectedUsers => {
            chat.list_participants(connection_id);
            Ok(())
        }
        ClientCall::SendWink { target_name } => chat.send_wink(connection_id, &target_name),
    }
}

/// Encode a server push as a text frame payload.
pub fn encode(message: &Message) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}

// Clients may send `null` for an empty field; anything else must be a string.
fn string_args(method: &str, args: &[Value]) -> Result<Vec<String>, ProtocolError> {
    args.iter()
        .map(|arg| match arg {
            Value::String(s) => Ok(s.clone()),
            Value::Null => Ok(String::new()),
            _ => Err(invalid(method, "string arguments")),
        })
        .collect()
}

fn invalid(method: &str, expected: &'static str) -> ProtocolError {
    ProtocolError::InvalidArguments {
        method: method.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_public_message_with_sender() {
        assert_eq!(
            parse_invocation(r#"{"method":"SendMessage","args":["Alice","hello"]}"#),
            Ok(ClientCall::SendMessage {
                sender_name: "Alice".to_string(),
                body: "hello".to_string(),
            })
        );
    }

    #[test]
    fn parses_public_message_without_sender() {
        assert_eq!(
            parse_invocation(r#"{"method":"SendMessage","args":["hello"]}"#),
            Ok(ClientCall::SendMessageAsCaller {
                body: "hello".to_string(),
            })
        );
    }

    #[test]
    fn new_message_is_public_message_with_sender() {
        assert_eq!(
            parse_invocation(r#"{"method":"newMessage","args":["User_1","hello"]}"#),
            Ok(ClientCall::SendMessage {
                sender_name: "User_1".to_string(),
                body: "hello".to_string(),
            })
        );
        assert!(matches!(
            parse_invocation(r#"{"method":"newMessage","args":["hello"]}"#),
            Err(ProtocolError::InvalidArguments { .. })
        ));
    }

    #[test]
    fn parses_private_message_and_treats_null_as_empty() {
        assert_eq!(
            parse_invocation(r#"{"method":"SendPrivateMessage","args":[null,"hi"]}"#),
            Ok(ClientCall::SendPrivateMessage {
                target_name: String::new(),
                body: "hi".to_string(),
            })
        );
    }

    #[test]
    fn parses_roster_request_without_args_field() {
        assert_eq!(
            parse_invocation(r#"{"method":"GetConnectedUsers"}"#),
            Ok(ClientCall::GetConnectedUsers)
        );
    }

    #[test]
    fn parses_wink() {
        assert_eq!(
            parse_invocation(r#"{"method":"SendWink","args":["Bob"]}"#),
            Ok(ClientCall::SendWink {
                target_name: "Bob".to_string(),
            })
        );
    }

    #[test]
    fn rejects_bad_frames() {
        assert!(matches!(
            parse_invocation("not json"),
            Err(ProtocolError::Malformed(_))
        ));
        assert_eq!(
            parse_invocation(r#"{"method":"DropTables","args":[]}"#),
            Err(ProtocolError::UnknownMethod("DropTables".to_string()))
        );
        assert!(matches!(
            parse_invocation(r#"{"method":"SendPrivateMessage","args":["Bob"]}"#),
            Err(ProtocolError::InvalidArguments { .. })
        ));
        assert!(matches!(
            parse_invocation(r#"{"method":"SendMessage","args":["Alice", 42]}"#),
            Err(ProtocolError::InvalidArguments { .. })
        ));
    }

    #[test]
    fn encode_uses_client_event_names() {
        let frame = encode(&Message::PresenceLeft {
            sender_name: "Bob".to_string(),
        })
        .expect("message serializes");

        assert_eq!(
            frame,
            r#"{"type":"UserDisconnected","data":{"sender_name":"Bob"}}"#
        );
    }
}

use serde::Serialize;

/// Trait for getting the client-facing event name of a message
pub trait EventType {
    fn event_type(&self) -> &'static str;
}

/// Ephemeral message pushed to connected clients. Never persisted.
///
/// Serialized as `{ "type": <event name>, "data": {...} }` so adapters can
/// forward it without knowing the individual variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum Message {
    #[serde(rename = "ReceiveMessage")]
    PublicChat { sender_name: String, body: String },

    /// Also used for the confirmation echo, where `sender_name` is "To <target>".
    #[serde(rename = "ReceivePrivateMessage")]
    PrivateChat { sender_name: String, body: String },

    // Presence
    #[serde(rename = "UserConnected")]
    PresenceJoined { sender_name: String },
    #[serde(rename = "UserDisconnected")]
    PresenceLeft { sender_name: String },

    /// Connected participant names in join order at snapshot time.
    #[serde(rename = "ConnectedUsersList")]
    RosterSnapshot { names: Vec<String> },
}

impl Message {
    /// Label used on the echo a private sender receives for its own message.
    pub fn private_echo_label(target_name: &str) -> String {
        format!("To {target_name}")
    }
}

impl EventType for Message {
    fn event_type(&self) -> &'static str {
        match self {
            Message::PublicChat { .. } => "ReceiveMessage",
            Message::PrivateChat { .. } => "ReceivePrivateMessage",
            Message::PresenceJoined { .. } => "UserConnected",
            Message::PresenceLeft { .. } => "UserDisconnected",
            Message::RosterSnapshot { .. } => "ConnectedUsersList",
        }
    }
}

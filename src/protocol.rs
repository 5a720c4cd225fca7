use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    /// One chat line, commands included.
    Chat { text: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    /// First frame after connect: the name assigned to this connection.
    Welcome {
        name: String,
        stream: String,
        help: String,
    },
    /// One chat line from another participant or the bot itself.
    Chat { from: String, text: String },
    Error { message: String },
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single chat message as retained and fanned out by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The display name of the sender
    #[serde(rename = "u")]
    pub user: String,
    /// The message body
    #[serde(rename = "c")]
    pub text: String,
    /// Server-side receipt time, never taken from the client
    #[serde(rename = "ts")]
    pub time: DateTime<Utc>,
}

/// A room's segment list changed, carrying the full authoritative list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSegmentsEvent {
    /// The current segment list of the room
    #[serde(rename = "s")]
    pub segments: Vec<String>,
}

/// The authoritative outcome of a spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinRouletteEvent {
    /// The label of the winning segment
    #[serde(rename = "res")]
    pub result: String,
    /// The index of the winning segment in `segments`
    #[serde(rename = "i")]
    pub result_index: usize,
    /// The segment list the outcome is interpreted against
    #[serde(rename = "s")]
    pub segments: Vec<String>,
}

/// The retained chat log of a room, oldest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatHistoryEvent {
    #[serde(rename = "m")]
    pub messages: Vec<ChatMessage>,
}

/// A single new chat message in a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessageEvent {
    #[serde(rename = "m")]
    pub message: ChatMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
/// Events that can be sent to the client.
/// An event is either a unicast replay to a connection that just joined a
/// room, or a broadcast to every connection in the room, sender included.
pub enum Event {
    SyncSegments(SyncSegmentsEvent),
    SpinRoulette(SpinRouletteEvent),
    ChatHistory(ChatHistoryEvent),
    ChatMessage(ChatMessageEvent),
}

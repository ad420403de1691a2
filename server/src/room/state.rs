use std::collections::VecDeque;

use comms::event::{self, ChatMessage, Event};

/// How many chat messages a room retains; the oldest are evicted first.
pub const CHAT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq)]
/// The authoritative outcome of the most recent spin in a room.
///
/// `result_index` points into the segment list that was submitted with the
/// spin and `result` is the label at that index. Keeping both in a single
/// struct guarantees a room can never hold one without the other.
pub struct SpinOutcome {
    pub result: String,
    pub result_index: usize,
}

#[derive(Debug, Default)]
/// One room's authoritative truth: the current segment list, the latest spin
/// outcome if any, and the retained chat log.
pub struct RoomState {
    segments: Vec<String>,
    outcome: Option<SpinOutcome>,
    chat: VecDeque<ChatMessage>,
}

#[derive(Debug, Default)]
/// A field-level update to a [RoomState]: fields that are `Some` overwrite
/// the stored value, fields that are `None` leave it untouched.
pub struct RoomStatePatch {
    pub segments: Option<Vec<String>>,
    pub outcome: Option<SpinOutcome>,
}

impl RoomStatePatch {
    pub fn segments(segments: Vec<String>) -> Self {
        RoomStatePatch {
            segments: Some(segments),
            outcome: None,
        }
    }

    pub fn spin(segments: Vec<String>, outcome: SpinOutcome) -> Self {
        RoomStatePatch {
            segments: Some(segments),
            outcome: Some(outcome),
        }
    }
}

impl RoomState {
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn outcome(&self) -> Option<&SpinOutcome> {
        self.outcome.as_ref()
    }

    pub fn chat(&self) -> &VecDeque<ChatMessage> {
        &self.chat
    }

    /// Merge a patch into the state, field by field
    pub fn apply(&mut self, patch: RoomStatePatch) {
        if let Some(segments) = patch.segments {
            self.segments = segments;
        }

        if let Some(outcome) = patch.outcome {
            self.outcome = Some(outcome);
        }
    }

    /// Append a chat message, evicting the oldest entries once the log
    /// grows past [CHAT_HISTORY_LIMIT]
    pub fn push_chat(&mut self, message: ChatMessage) {
        self.chat.push_back(message);

        while self.chat.len() > CHAT_HISTORY_LIMIT {
            self.chat.pop_front();
        }
    }

    /// The events a connection that just joined the room should receive,
    /// in replay order: segments first, then the stored spin outcome, then
    /// the chat log. A room that has seen no writes replays nothing.
    ///
    /// The outcome is replayed against the room's current segment list,
    /// which a later sync may have replaced since the spin happened.
    pub fn replay_events(&self) -> Vec<Event> {
        let mut events = Vec::new();

        if !self.segments.is_empty() {
            events.push(Event::SyncSegments(event::SyncSegmentsEvent {
                segments: self.segments.clone(),
            }));
        }

        if let Some(outcome) = &self.outcome {
            events.push(Event::SpinRoulette(event::SpinRouletteEvent {
                result: outcome.result.clone(),
                result_index: outcome.result_index,
                segments: self.segments.clone(),
            }));
        }

        if !self.chat.is_empty() {
            events.push(Event::ChatHistory(event::ChatHistoryEvent {
                messages: self.chat.iter().cloned().collect(),
            }));
        }

        events
    }
}

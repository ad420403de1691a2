use chrono::Utc;
use comms::event::{self, ChatMessage, Event};
use rand::Rng;
use tokio::sync::broadcast;

use super::state::{RoomState, RoomStatePatch, SpinOutcome};

const BROADCAST_CHANNEL_CAPACITY: usize = 100;

#[derive(Debug)]
/// [RouletteRoom] pairs one room's [RoomState] with the broadcast channel
/// that fans events out to every connection in the room.
///
/// All mutation goes through methods on this type while the caller holds the
/// room's lock, so a state update and its broadcast form one atomic step and
/// every subscriber observes the same event order.
pub struct RouletteRoom {
    broadcast_tx: broadcast::Sender<Event>,
    state: RoomState,
}

impl Default for RouletteRoom {
    fn default() -> Self {
        Self::new()
    }
}

impl RouletteRoom {
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CHANNEL_CAPACITY);

        RouletteRoom {
            broadcast_tx,
            state: RoomState::default(),
        }
    }

    /// Add a connection to the room.
    ///
    /// Subscribes to the broadcast channel and snapshots the replay for the
    /// joining connection in the same critical section, so no broadcast can
    /// slip between the snapshot and the subscription. The replay goes to
    /// the joining connection only; nothing is broadcast on join.
    pub fn join(&self) -> (broadcast::Receiver<Event>, Vec<Event>) {
        (self.broadcast_tx.subscribe(), self.state.replay_events())
    }

    /// Replace the room's segment list and rebroadcast it to every member,
    /// sender included
    pub fn sync_segments(&mut self, segments: Vec<String>) {
        self.state.apply(RoomStatePatch::segments(segments.clone()));

        let _ = self
            .broadcast_tx
            .send(Event::SyncSegments(event::SyncSegmentsEvent { segments }));
    }

    /// Spin against the submitted segment list and record the outcome.
    ///
    /// The list is rebroadcast before the outcome so every member interprets
    /// the result against the same segments it was drawn from. This is the
    /// only operation that writes the room's outcome.
    ///
    /// # Panics
    ///
    /// Panics if `segments` is empty; callers validate before calling.
    pub fn spin(&mut self, segments: Vec<String>) -> SpinOutcome {
        let _ = self
            .broadcast_tx
            .send(Event::SyncSegments(event::SyncSegmentsEvent {
                segments: segments.clone(),
            }));

        let result_index = rand::thread_rng().gen_range(0..segments.len());
        let outcome = SpinOutcome {
            result: segments[result_index].clone(),
            result_index,
        };

        self.state
            .apply(RoomStatePatch::spin(segments.clone(), outcome.clone()));

        let _ = self
            .broadcast_tx
            .send(Event::SpinRoulette(event::SpinRouletteEvent {
                result: outcome.result.clone(),
                result_index,
                segments,
            }));

        outcome
    }

    /// Timestamp a chat message, retain it and rebroadcast it to every
    /// member, sender included. Only the new message is broadcast, never the
    /// whole log.
    pub fn chat(&mut self, user: String, text: String) -> ChatMessage {
        let message = ChatMessage {
            user,
            text,
            time: Utc::now(),
        };

        self.state.push_chat(message.clone());

        let _ = self
            .broadcast_tx
            .send(Event::ChatMessage(event::ChatMessageEvent {
                message: message.clone(),
            }));

        message
    }
}

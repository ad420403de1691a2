use std::{collections::HashMap, sync::Arc};

use comms::event::{ChatMessage, Event};
use tokio::sync::{broadcast, Mutex};
use tracing::info;

use crate::room::{RouletteRoom, SpinOutcome};

pub type RoomJoinResult = (broadcast::Receiver<Event>, Vec<Event>);

#[derive(Debug, Default)]
/// [RoomManager] owns every active room, keyed by room id.
///
/// Rooms are created lazily the first time a command names them and retained
/// for the life of the process. Each room sits behind its own lock, so
/// traffic in one room never serializes against another; commands that fail
/// validation are dropped before a room is ever created for them.
pub struct RoomManager {
    rooms: Mutex<HashMap<String, Arc<Mutex<RouletteRoom>>>>,
}

impl RoomManager {
    pub fn new() -> Self {
        RoomManager::default()
    }

    async fn room(&self, room_id: &str) -> Arc<Mutex<RouletteRoom>> {
        let mut rooms = self.rooms.lock().await;

        rooms
            .entry(String::from(room_id))
            .or_insert_with(|| Arc::new(Mutex::new(RouletteRoom::new())))
            .clone()
    }

    /// Joins a room given its id
    ///
    /// # Returns
    ///
    /// - A broadcast receiver for the joining connection to receive room events
    /// - The replay of the room's current truth, unicast to this connection only
    pub async fn join_room(&self, room_id: &str) -> RoomJoinResult {
        let room = self.room(room_id).await;
        let room = room.lock().await;

        room.join()
    }

    /// Store a submitted segment list as the room's authoritative one and
    /// rebroadcast it. Returns false when the command fails validation and
    /// is dropped without touching any state.
    pub async fn sync_segments(&self, room_id: &str, segments: Vec<String>) -> bool {
        if room_id.is_empty() {
            return false;
        }

        let item_count = segments.len();
        let room = self.room(room_id).await;
        room.lock().await.sync_segments(segments);

        info!(room = room_id, items = item_count, "segments synced");

        true
    }

    /// Spin a room's roulette against a submitted segment list. Returns the
    /// authoritative outcome, or `None` when the command fails validation
    /// and is dropped without touching any state.
    pub async fn spin_roulette(&self, room_id: &str, segments: Vec<String>) -> Option<SpinOutcome> {
        if room_id.is_empty() || segments.is_empty() {
            return None;
        }

        let room = self.room(room_id).await;
        let outcome = room.lock().await.spin(segments);

        info!(
            room = room_id,
            result = %outcome.result,
            result_index = outcome.result_index,
            "spin broadcast"
        );

        Some(outcome)
    }

    /// Timestamp, retain and rebroadcast a chat message. Returns the stored
    /// message, or `None` when the command fails validation and is dropped
    /// without touching any state.
    pub async fn chat_message(
        &self,
        room_id: &str,
        user: String,
        text: String,
    ) -> Option<ChatMessage> {
        if room_id.is_empty() || user.is_empty() || text.is_empty() {
            return None;
        }

        let room = self.room(room_id).await;
        let message = room.lock().await.chat(user, text);

        Some(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|label| label.to_string()).collect()
    }

    #[tokio::test]
    async fn test_joining_an_untouched_room_replays_nothing() {
        let manager = RoomManager::new();

        let (_rx, replay) = manager.join_room("room-1").await;

        assert!(replay.is_empty());
    }

    #[tokio::test]
    async fn test_join_replays_synced_segments() {
        let manager = RoomManager::new();

        assert!(manager.sync_segments("room-1", segments(&["x", "y"])).await);

        let (_rx, replay) = manager.join_room("room-1").await;

        match &replay[..] {
            [Event::SyncSegments(event)] => assert_eq!(event.segments, segments(&["x", "y"])),
            other => panic!("unexpected replay {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rooms_are_isolated() {
        let manager = RoomManager::new();

        manager.sync_segments("room-1", segments(&["x"])).await;

        let (_rx, replay) = manager.join_room("room-2").await;

        assert!(replay.is_empty());
    }

    #[tokio::test]
    async fn test_join_replays_segments_then_outcome_then_chat() {
        let manager = RoomManager::new();

        manager.sync_segments("room-1", segments(&["x", "y"])).await;
        manager
            .spin_roulette("room-1", segments(&["x", "y", "z"]))
            .await
            .unwrap();
        manager
            .chat_message("room-1", "user-1".to_string(), "gg".to_string())
            .await
            .unwrap();

        let (_rx, replay) = manager.join_room("room-1").await;

        assert_eq!(replay.len(), 3);
        assert!(matches!(replay[0], Event::SyncSegments(_)));
        assert!(matches!(replay[1], Event::SpinRoulette(_)));
        assert!(matches!(replay[2], Event::ChatHistory(_)));
    }

    #[tokio::test]
    async fn test_sender_also_receives_room_broadcasts() {
        let manager = RoomManager::new();

        // the joining connection triggers the sync itself and still
        // receives the broadcast
        let (mut rx, _) = manager.join_room("room-1").await;
        manager.sync_segments("room-1", segments(&["x"])).await;

        match rx.recv().await.unwrap() {
            Event::SyncSegments(event) => assert_eq!(event.segments, segments(&["x"])),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_commands_are_dropped_without_creating_state() {
        let manager = RoomManager::new();

        assert!(manager.spin_roulette("room-1", Vec::new()).await.is_none());
        assert!(!manager.sync_segments("", segments(&["x"])).await);
        assert!(manager
            .chat_message("room-1", String::new(), "hi".to_string())
            .await
            .is_none());
        assert!(manager
            .chat_message("room-1", "user-1".to_string(), String::new())
            .await
            .is_none());

        let (_rx, replay) = manager.join_room("room-1").await;
        assert!(replay.is_empty());
    }

    #[tokio::test]
    async fn test_spin_records_outcome_for_late_joiners() {
        let manager = RoomManager::new();

        let outcome = manager
            .spin_roulette("room-1", segments(&["x", "y", "z"]))
            .await
            .unwrap();

        let (_rx, replay) = manager.join_room("room-1").await;

        match &replay[..] {
            [Event::SyncSegments(_), Event::SpinRoulette(event)] => {
                assert_eq!(event.result, outcome.result);
                assert_eq!(event.result_index, outcome.result_index);
                assert_eq!(event.segments, segments(&["x", "y", "z"]));
            }
            other => panic!("unexpected replay {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_syncing_an_empty_list_is_accepted() {
        let manager = RoomManager::new();

        manager.sync_segments("room-1", segments(&["x"])).await;

        let (mut rx, _) = manager.join_room("room-1").await;
        assert!(manager.sync_segments("room-1", Vec::new()).await);

        match rx.recv().await.unwrap() {
            Event::SyncSegments(event) => assert!(event.segments.is_empty()),
            other => panic!("unexpected event {:?}", other),
        }
    }
}

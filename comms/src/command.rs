use serde::{Deserialize, Serialize};

/// Command for joining a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRoomCommand {
    // The id of the room to join.
    #[serde(rename = "r")]
    pub room: String,
}

/// Command for replacing a room's segment list wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSegmentsCommand {
    // The room whose segments are replaced.
    #[serde(rename = "r")]
    pub room: String,
    // The full new segment list. May be empty.
    #[serde(rename = "s")]
    pub segments: Vec<String>,
}

/// Command for spinning the roulette against a segment list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinRouletteCommand {
    // The room to spin in.
    #[serde(rename = "r")]
    pub room: String,
    // The segment list the outcome is drawn from.
    #[serde(rename = "s")]
    pub segments: Vec<String>,
}

/// Command for sending a chat message to a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessageCommand {
    // The room to send the message to.
    #[serde(rename = "r")]
    pub room: String,
    // The sender's display name.
    #[serde(rename = "u")]
    pub user: String,
    // The message body.
    #[serde(rename = "c")]
    pub text: String,
}

/// A client command which can be sent to the server by a single connection.
/// A payload that does not match any variant, for example segments that are
/// not an array, fails deserialization and the server drops the line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_ct", rename_all = "snake_case")]
pub enum ClientCommand {
    JoinRoom(JoinRoomCommand),
    SyncSegments(SyncSegmentsCommand),
    SpinRoulette(SpinRouletteCommand),
    ChatMessage(ChatMessageCommand),
}

#[cfg(test)]
mod tests {
    use super::*;

    // given a command enum, and an expect string, asserts that command is serialized / deserialized appropiately
    fn assert_command_serialization(command: &ClientCommand, expected: &str) {
        let serialized = serde_json::to_string(&command).unwrap();
        assert_eq!(serialized, expected);
        let deserialized: ClientCommand = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, *command);
    }

    #[test]
    fn test_join_command() {
        let command = ClientCommand::JoinRoom(JoinRoomCommand {
            room: "snack-picker".to_string(),
        });

        assert_command_serialization(&command, r#"{"_ct":"join_room","r":"snack-picker"}"#);
    }

    #[test]
    fn test_sync_segments_command() {
        let command = ClientCommand::SyncSegments(SyncSegmentsCommand {
            room: "snack-picker".to_string(),
            segments: vec!["pizza".to_string(), "sushi".to_string()],
        });

        assert_command_serialization(
            &command,
            r#"{"_ct":"sync_segments","r":"snack-picker","s":["pizza","sushi"]}"#,
        );
    }

    #[test]
    fn test_spin_roulette_command() {
        let command = ClientCommand::SpinRoulette(SpinRouletteCommand {
            room: "snack-picker".to_string(),
            segments: vec!["pizza".to_string()],
        });

        assert_command_serialization(
            &command,
            r#"{"_ct":"spin_roulette","r":"snack-picker","s":["pizza"]}"#,
        );
    }

    #[test]
    fn test_chat_message_command() {
        let command = ClientCommand::ChatMessage(ChatMessageCommand {
            room: "snack-picker".to_string(),
            user: "bora".to_string(),
            text: "hello".to_string(),
        });

        assert_command_serialization(
            &command,
            r#"{"_ct":"chat_message","r":"snack-picker","u":"bora","c":"hello"}"#,
        );
    }

    #[test]
    fn test_segments_must_be_an_array() {
        let result = serde_json::from_str::<ClientCommand>(
            r#"{"_ct":"sync_segments","r":"snack-picker","s":"not-a-list"}"#,
        );

        assert!(result.is_err());
    }
}

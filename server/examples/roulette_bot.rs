use comms::{
    command::{self, ClientCommand},
    transport,
};
use tokio::net::TcpStream;
use tokio_stream::StreamExt;

/// Demo client for the roulette server.
///
/// Joins a room, submits a segment list, spins once and sends a chat
/// message, printing every event the server fans back. Run the server first,
/// then one or more bots against the same room to watch the broadcasts stay
/// in lockstep.

const SERVER_ADDR: &str = "localhost:3001";
const ROOM: &str = "demo-room";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let tcp_stream = TcpStream::connect(SERVER_ADDR).await?;
    let (mut event_stream, mut command_writer) = transport::client::split_tcp_stream(tcp_stream);

    command_writer
        .write(&ClientCommand::JoinRoom(command::JoinRoomCommand {
            room: ROOM.into(),
        }))
        .await?;

    command_writer
        .write(&ClientCommand::SyncSegments(command::SyncSegmentsCommand {
            room: ROOM.into(),
            segments: vec!["pizza".into(), "sushi".into(), "tacos".into()],
        }))
        .await?;

    command_writer
        .write(&ClientCommand::SpinRoulette(command::SpinRouletteCommand {
            room: ROOM.into(),
            segments: vec!["pizza".into(), "sushi".into(), "tacos".into()],
        }))
        .await?;

    command_writer
        .write(&ClientCommand::ChatMessage(command::ChatMessageCommand {
            room: ROOM.into(),
            user: "bot".into(),
            text: "good luck everyone".into(),
        }))
        .await?;

    while let Some(event) = event_stream.next().await {
        match event {
            Ok(event) => println!("received event: {:?}", event),
            Err(e) => println!("failed to read event: {}", e),
        }
    }

    Ok(())
}

use std::sync::Arc;

use comms::transport;
use nanoid::nanoid;
use tokio::{net::TcpStream, sync::broadcast};
use tokio_stream::StreamExt;
use tracing::{info, warn};

use crate::room_manager::RoomManager;

use self::client_session::ClientSession;

mod client_session;

/// Given a tcp stream and the room manager, handles the client session
/// until the tcp stream is closed for some reason, or the server shuts down
pub async fn handle_user_session(
    room_manager: Arc<RoomManager>,
    mut quit_rx: broadcast::Receiver<()>,
    stream: TcpStream,
) -> anyhow::Result<()> {
    // Generate a random id for the connection, since we don't have a login system
    let session_id = nanoid!();
    // Split the tcp stream into a command stream and an event writer with better ergonomics
    let (mut commands, mut event_writer) = transport::server::split_tcp_stream(stream);
    let mut session = ClientSession::new(room_manager);

    info!(session_id = %session_id, "client connected");

    loop {
        tokio::select! {
            cmd = commands.next() => match cmd {
                // The client closed the tcp stream; membership cleanup happens
                // below, room state stays as it is
                None => break,
                Some(Ok(cmd)) => {
                    session.handle_command(cmd).await?;
                }
                // Malformed input is dropped without surfacing anything to any
                // client and without tearing down the session
                Some(Err(e)) => {
                    warn!(session_id = %session_id, error = %e, "dropping malformed command");
                }
            },
            // Aggregated events from all joined rooms are sent to the client
            Ok(event) = session.recv() => {
                event_writer.write(&event).await?;
            }
            // If the server is shutting down, we can just close the tcp stream
            // and exit the session handler
            Ok(_) = quit_rx.recv() => {
                drop(event_writer);
                break;
            }
        }
    }

    session.leave_all_rooms();
    info!(session_id = %session_id, "client disconnected");

    Ok(())
}

#[cfg(test)]
mod tests {
    use comms::event::Event;
    use tokio::{
        io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
        net::{TcpListener, TcpStream},
        sync::broadcast,
    };

    use super::*;

    async fn connect_session(manager: Arc<RoomManager>) -> TcpStream {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let (_quit_tx, quit_rx) = broadcast::channel::<()>(1);
            let _ = handle_user_session(manager, quit_rx, socket).await;
        });

        TcpStream::connect(addr).await.unwrap()
    }

    #[tokio::test]
    async fn test_malformed_line_does_not_end_the_session() {
        let manager = Arc::new(RoomManager::new());
        manager
            .sync_segments("room-1", vec!["x".to_string(), "y".to_string()])
            .await;

        let mut stream = connect_session(Arc::clone(&manager)).await;

        // garbage first; the session must drop it silently and keep going
        stream.write_all(b"this is not json\r\n").await.unwrap();
        stream
            .write_all(b"{\"_ct\":\"join_room\",\"r\":\"room-1\"}\r\n")
            .await
            .unwrap();

        let (reader, _writer) = stream.split();
        let mut lines = BufReader::new(reader).lines();

        // the join replay still arrives, nothing was sent for the garbage
        let line = lines.next_line().await.unwrap().unwrap();
        match serde_json::from_str::<Event>(&line).unwrap() {
            Event::SyncSegments(event) => {
                assert_eq!(event.segments, vec!["x".to_string(), "y".to_string()])
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_chat_broadcast_includes_the_sender() {
        let manager = Arc::new(RoomManager::new());
        let mut stream = connect_session(manager).await;

        stream
            .write_all(b"{\"_ct\":\"join_room\",\"r\":\"room-1\"}\r\n")
            .await
            .unwrap();
        stream
            .write_all(b"{\"_ct\":\"chat_message\",\"r\":\"room-1\",\"u\":\"user-1\",\"c\":\"hi\"}\r\n")
            .await
            .unwrap();

        let (reader, _writer) = stream.split();
        let mut lines = BufReader::new(reader).lines();

        let line = lines.next_line().await.unwrap().unwrap();
        match serde_json::from_str::<Event>(&line).unwrap() {
            Event::ChatMessage(event) => {
                assert_eq!(event.message.user, "user-1");
                assert_eq!(event.message.text, "hi");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}

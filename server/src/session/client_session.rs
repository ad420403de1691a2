use std::{collections::HashMap, sync::Arc};

use anyhow::Context;
use comms::{command::ClientCommand, event::Event};
use tokio::{
    sync::mpsc,
    task::{AbortHandle, JoinSet},
};

use crate::room_manager::RoomManager;

/// [ClientSession] tracks which rooms one connection has joined and funnels
/// the events of all of them into a single channel the session task reads.
pub(super) struct ClientSession {
    room_manager: Arc<RoomManager>,
    joined_rooms: HashMap<String, AbortHandle>,
    join_set: JoinSet<()>,
    mpsc_tx: mpsc::Sender<Event>,
    mpsc_rx: mpsc::Receiver<Event>,
}

impl ClientSession {
    pub fn new(room_manager: Arc<RoomManager>) -> Self {
        let (mpsc_tx, mpsc_rx) = mpsc::channel(100);

        ClientSession {
            room_manager,
            joined_rooms: HashMap::new(),
            join_set: JoinSet::new(),
            mpsc_tx,
            mpsc_rx,
        }
    }

    /// Handle one inbound command. Commands that fail validation are
    /// dropped silently; nothing is ever sent back for them.
    pub async fn handle_command(&mut self, cmd: ClientCommand) -> anyhow::Result<()> {
        match cmd {
            ClientCommand::JoinRoom(cmd) => {
                if self.joined_rooms.contains_key(&cmd.room) {
                    return Ok(());
                }

                let (mut broadcast_rx, replay) = self.room_manager.join_room(&cmd.room).await;

                // spawn a task to forward the room's broadcasts to the session's mpsc channel
                // hence the connection can receive events from different rooms via single channel
                let abort_handle = self.join_set.spawn({
                    let mpsc_tx = self.mpsc_tx.clone();

                    // replay the room's current truth to this connection only,
                    // before any forwarded broadcast
                    for event in replay {
                        mpsc_tx.send(event).await?;
                    }

                    async move {
                        while let Ok(event) = broadcast_rx.recv().await {
                            let _ = mpsc_tx.send(event).await;
                        }
                    }
                });

                self.joined_rooms.insert(cmd.room, abort_handle);
            }
            ClientCommand::SyncSegments(cmd) => {
                self.room_manager
                    .sync_segments(&cmd.room, cmd.segments)
                    .await;
            }
            ClientCommand::SpinRoulette(cmd) => {
                self.room_manager
                    .spin_roulette(&cmd.room, cmd.segments)
                    .await;
            }
            ClientCommand::ChatMessage(cmd) => {
                self.room_manager
                    .chat_message(&cmd.room, cmd.user, cmd.text)
                    .await;
            }
        }

        Ok(())
    }

    /// Drop the broadcast subscriptions of every joined room. Room state is
    /// untouched; only this connection's membership ends.
    pub fn leave_all_rooms(&mut self) {
        for (_, abort_handle) in self.joined_rooms.drain() {
            abort_handle.abort();
        }
    }

    /// Receive an event that may have originated from any of the rooms the
    /// connection is currently joined to
    pub async fn recv(&mut self) -> anyhow::Result<Event> {
        self.mpsc_rx
            .recv()
            .await
            .context("could not recv from the session channel")
    }
}

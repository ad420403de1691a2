use std::sync::Arc;

use anyhow::Context;
use tokio::{
    net::TcpListener,
    signal::unix::{signal, SignalKind},
    sync::broadcast,
    task::JoinSet,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::room_manager::RoomManager;

mod room;
mod room_manager;
mod session;

const DEFAULT_PORT: u16 = 3001;

fn listen_port() -> anyhow::Result<u16> {
    match std::env::var("PORT") {
        Ok(port) => port
            .parse::<u16>()
            .with_context(|| format!("PORT is not a valid port number: {}", port)),
        Err(_) => Ok(DEFAULT_PORT),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port = listen_port()?;
    let room_manager = Arc::new(RoomManager::new());
    let mut join_set: JoinSet<anyhow::Result<()>> = JoinSet::new();

    let mut interrupt =
        signal(SignalKind::interrupt()).context("failed to create interrupt signal stream")?;
    let server = TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("could not bind to port {}", port))?;
    let (quit_tx, quit_rx) = broadcast::channel::<()>(1);

    info!(port, "listening");
    loop {
        tokio::select! {
            _ = interrupt.recv() => {
                info!("server interrupted, gracefully shutting down");
                let _ = quit_tx.send(());
                break;
            }
            Ok((socket, _)) = server.accept() => {
                join_set.spawn(session::handle_user_session(
                    Arc::clone(&room_manager),
                    quit_rx.resubscribe(),
                    socket,
                ));
            }
        }
    }

    while join_set.join_next().await.is_some() {}
    info!("server shut down");

    Ok(())
}

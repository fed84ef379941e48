//! Demo binary: a thin accept loop wiring this crate's [`imap_core::Session`]
//! onto a real TCP listener, grounded on
//! `aero-proto/src/imap/mod.rs`'s `Server::run`/`NetLoop` pattern.
//!
//! The wire tokenizer that turns raw bytes into [`imap_core::field::Field`]
//! lists is an external collaborator this crate does not implement (§1);
//! this binary uses `imap-flow` only far enough to accept connections, send
//! the greeting, and answer every received command with BAD until a
//! production embedder plugs in a real tokenizer and backend.

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use imap_codec::imap_types::core::Text;
use imap_codec::imap_types::response::{Greeting, Status};
use imap_flow::server::{ServerFlow, ServerFlowEvent, ServerFlowOptions};
use imap_flow::stream::AnyStream;
use tokio::net::TcpListener;

use imap_core::config::Config;
use imap_core::session::Session;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut config = Config::default();
    if config.bind_addr.is_none() {
        config.bind_addr = "127.0.0.1:1143".parse().ok();
    }
    let bind_addr = config.bind_addr.expect("bind address must be configured");

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("imap-core demo listening on {bind_addr}");

    let mut connections = FuturesUnordered::new();
    loop {
        let wait_conn_finished = async {
            if connections.is_empty() {
                futures::future::pending::<()>().await;
            } else {
                connections.next().await;
            }
        };
        tokio::select! {
            accepted = listener.accept() => {
                let (socket, remote_addr) = accepted?;
                tracing::info!("accepted connection from {remote_addr}");
                connections.push(tokio::spawn(handle_connection(socket)));
            }
            _ = wait_conn_finished => continue,
        }
    }
}

async fn handle_connection(socket: tokio::net::TcpStream) {
    if let Err(e) = run_connection(socket).await {
        tracing::error!("connection closed with error: {e:#}");
    }
}

async fn run_connection(socket: tokio::net::TcpStream) -> Result<()> {
    let mut opts = ServerFlowOptions::default();
    opts.literal_accept_text = Text::unvalidated("OK");
    opts.literal_reject_text = Text::unvalidated("Literal rejected");

    let (mut server, _) = ServerFlow::send_greeting(
        AnyStream::new(socket),
        opts,
        Greeting::ok(None, "imap-core demo ready").map_err(|e| anyhow::anyhow!("{e:?}"))?,
    )
    .await
    .map_err(|e| anyhow::anyhow!("{e:?}"))?;

    // The session state machine is constructed per-connection; a real
    // embedder would route each `CommandReceived` event through its own
    // tokenizer, this crate's `handlers::dispatch`, and back out through
    // `server.enqueue_status`/`enqueue_data`.
    let mut _session = Session::new();

    loop {
        let event = server.progress().await.map_err(|e| anyhow::anyhow!("{e:?}"))?;
        match event {
            ServerFlowEvent::CommandReceived { command } => {
                tracing::debug!(?command, "received command (no tokenizer wired into this demo)");
                let _handle = server.enqueue_status(
                    Status::bad(
                        Some(command.tag.clone()),
                        None,
                        "this demo binary has no wire tokenizer wired in",
                    )
                    .map_err(|e| anyhow::anyhow!("{e:?}"))?,
                );
            }
            ServerFlowEvent::ResponseSent { response, .. } => {
                if matches!(response, imap_codec::imap_types::response::Response::Status(Status::Bye(_))) {
                    return Ok(());
                }
                tracing::trace!(?response, "sent");
            }
            other => {
                tracing::debug!(?other, "unhandled server flow event in demo binary");
            }
        }
    }
}

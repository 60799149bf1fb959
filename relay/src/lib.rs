//! Forwarding relay between the game client and the authoritative server
//!
//! The relay owns two sockets: a client-facing one on the well-known relay
//! port and a server-facing one on an ephemeral port, so neither side ever
//! learns the other's address. Two concurrent tasks run the two
//! directions:
//!
//! - The **client loop** receives from the client socket, acknowledges
//!   immediately, drops protocol control tokens, and hands the command to
//!   the server loop.
//! - The **server loop** gates forwarding on the server's `REQUEST_DATA`
//!   readiness poll, relays one full request/response exchange at a time,
//!   and passes stray server payloads through to the most recent client.
//!
//! Connection context is never shared mutable state between the loops:
//! the client's address rides inside the per-request [`Exchange`] value
//! handed through a one-slot rendezvous channel, so one exchange fully
//! completes before the next begins and a response can never be delivered
//! with another exchange's address.

use log::{debug, error, info, warn};
use shared::channel::{AckChannel, ChannelError};
use shared::protocol::{ACKNOWLEDGMENT, QUIT, REQUEST_DATA};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinError;

/// One in-flight client request together with the address the eventual
/// response must be delivered to.
#[derive(Debug)]
struct Exchange {
    payload: String,
    client_addr: SocketAddr,
}

/// The relay process: two channels and the address of the server.
pub struct Relay {
    client_channel: Arc<AckChannel>,
    server_channel: AckChannel,
    server_addr: SocketAddr,
}

impl Relay {
    /// Binds the client-facing socket on `client_addr` and the
    /// server-facing socket on an ephemeral port.
    pub async fn bind(client_addr: &str, server_addr: SocketAddr) -> io::Result<Self> {
        Ok(Self {
            client_channel: Arc::new(AckChannel::bind(client_addr).await?),
            server_channel: AckChannel::bind("0.0.0.0:0").await?,
            server_addr,
        })
    }

    /// Address clients should send commands to.
    pub fn client_addr(&self) -> io::Result<SocketAddr> {
        self.client_channel.local_addr()
    }

    /// Runs both forwarding loops until the first one finishes: an error
    /// on either hop, or a graceful shutdown after forwarding a quit.
    pub async fn run(self) -> Result<(), ChannelError> {
        // One-slot rendezvous serializing exchanges between the two loops.
        let (pending_tx, pending_rx) = mpsc::channel::<Exchange>(1);

        let client_task = tokio::spawn(client_loop(
            Arc::clone(&self.client_channel),
            pending_tx,
        ));
        let server_task = tokio::spawn(server_loop(
            self.server_channel,
            Arc::clone(&self.client_channel),
            self.server_addr,
            pending_rx,
        ));

        tokio::select! {
            result = client_task => result.map_err(join_failure)?,
            result = server_task => result.map_err(join_failure)?,
        }
    }
}

fn join_failure(e: JoinError) -> ChannelError {
    error!("Forwarding task failed: {}", e);
    ChannelError::Io(io::Error::new(io::ErrorKind::Other, e))
}

/// Client-to-server direction: receive, acknowledge, filter, enqueue.
///
/// Control tokens (the server's readiness poll and the acknowledgment
/// payload) are never treated as client commands.
async fn client_loop(
    channel: Arc<AckChannel>,
    pending: mpsc::Sender<Exchange>,
) -> Result<(), ChannelError> {
    loop {
        let (payload, client_addr) = channel.recv().await?;
        channel.acknowledge(client_addr).await?;

        if payload == ACKNOWLEDGMENT || payload == REQUEST_DATA {
            debug!("Dropping control token {:?} from {}", payload, client_addr);
            continue;
        }

        info!("[Client -> Relay] {} from {}", payload, client_addr);
        if pending
            .send(Exchange {
                payload,
                client_addr,
            })
            .await
            .is_err()
        {
            // The server loop has shut down; nothing left to forward to.
            return Ok(());
        }
    }
}

/// Server-to-client direction: poll-gated forwarding of one exchange at a
/// time.
///
/// The server only learns this socket's address from the first forwarded
/// command, so the first exchange skips the poll gate; every later one
/// waits for `REQUEST_DATA`.
async fn server_loop(
    server: AckChannel,
    client: Arc<AckChannel>,
    server_addr: SocketAddr,
    mut pending: mpsc::Receiver<Exchange>,
) -> Result<(), ChannelError> {
    let mut last_client: Option<SocketAddr> = None;
    let mut first_exchange = true;

    loop {
        if !first_exchange {
            await_poll(&server, &client, &mut last_client).await?;
        }
        first_exchange = false;

        let Some(exchange) = pending.recv().await else {
            // The client loop has shut down.
            return Ok(());
        };
        last_client = Some(exchange.client_addr);

        info!("[Relay -> Server] Forwarding {}", exchange.payload);
        server
            .send_and_await_ack(&exchange.payload, server_addr)
            .await?;

        if exchange.payload == QUIT {
            info!("Quit forwarded, relay shutting down");
            return Ok(());
        }

        let (response, from) = server.recv_message().await?;
        server.acknowledge(from).await?;
        info!(
            "[Server -> Client] Forwarding {} to {}",
            response, exchange.client_addr
        );
        client.send(&response, exchange.client_addr).await?;
    }
}

/// Blocks until the server announces readiness for the next command.
///
/// Any non-poll payload arriving here is outside an exchange; it is
/// acknowledged and passed through unchanged to the most recent client,
/// or dropped with a warning before any client has spoken.
async fn await_poll(
    server: &AckChannel,
    client: &AckChannel,
    last_client: &mut Option<SocketAddr>,
) -> Result<(), ChannelError> {
    loop {
        let (payload, from) = server.recv_message().await?;
        server.acknowledge(from).await?;

        if payload == REQUEST_DATA {
            return Ok(());
        }
        match last_client {
            Some(addr) => {
                info!("[Server -> Client] Passing through {} to {}", payload, addr);
                client.send(&payload, *addr).await?;
            }
            None => warn!("Dropping server payload {:?}, no client yet", payload),
        }
    }
}

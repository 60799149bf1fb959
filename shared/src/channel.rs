//! Send/receive-with-acknowledgment primitive over raw UDP
//!
//! [`AckChannel`] turns an unreliable datagram socket into the simple
//! request/acknowledge handshake used identically on both hops
//! (client ↔ relay and relay ↔ server): the receiver of any datagram
//! immediately answers with the fixed acknowledgment payload, then sends
//! the real reply at its own pace.
//!
//! Known reliability gap, preserved as the contract: there are no
//! correlation ids, no retransmission timers, and no sequence numbers.
//! [`AckChannel::send_and_await_ack`] matches acknowledgments to requests
//! by arrival order only, and a dropped request, acknowledgment, or
//! response all look the same to the sender ("nothing received"). Endpoints
//! report such a desync and terminate rather than guess and retransmit.

use crate::protocol::ACKNOWLEDGMENT;
use log::debug;
use std::fmt;
use std::io;
use std::net::SocketAddr;
use tokio::net::UdpSocket;

/// Largest datagram body accepted on a single receive.
const MAX_DATAGRAM: usize = 2048;

/// Failure of the acknowledgment handshake.
#[derive(Debug)]
pub enum ChannelError {
    Io(io::Error),
    /// The datagram in the acknowledgment slot was something else; the
    /// endpoint cannot tell a lost request from a lost acknowledgment and
    /// must treat this as fatal.
    AckMismatch { got: String },
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelError::Io(e) => write!(f, "channel I/O error: {}", e),
            ChannelError::AckMismatch { got } => {
                write!(f, "expected acknowledgment, got {:?}", got)
            }
        }
    }
}

impl std::error::Error for ChannelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChannelError::Io(e) => Some(e),
            ChannelError::AckMismatch { .. } => None,
        }
    }
}

impl From<io::Error> for ChannelError {
    fn from(e: io::Error) -> Self {
        ChannelError::Io(e)
    }
}

/// A UDP socket speaking the acknowledged-datagram protocol.
pub struct AckChannel {
    socket: UdpSocket,
}

impl AckChannel {
    pub async fn bind(addr: &str) -> io::Result<Self> {
        Ok(Self {
            socket: UdpSocket::bind(addr).await?,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Transmits one datagram carrying the payload verbatim.
    pub async fn send(&self, payload: &str, to: SocketAddr) -> io::Result<()> {
        self.socket.send_to(payload.as_bytes(), to).await?;
        Ok(())
    }

    /// Blocks until one datagram arrives, capturing the sender's address
    /// for the immediate acknowledgment and for addressing the eventual
    /// reply.
    pub async fn recv(&self) -> io::Result<(String, SocketAddr)> {
        let mut buffer = [0u8; MAX_DATAGRAM];
        let (len, from) = self.socket.recv_from(&mut buffer).await?;
        Ok((String::from_utf8_lossy(&buffer[..len]).into_owned(), from))
    }

    /// Like [`recv`](Self::recv), but silently drops stray acknowledgment
    /// datagrams so callers waiting for a real payload never mistake one
    /// for it.
    pub async fn recv_message(&self) -> io::Result<(String, SocketAddr)> {
        loop {
            let (payload, from) = self.recv().await?;
            if payload == ACKNOWLEDGMENT {
                debug!("Dropping stray acknowledgment from {}", from);
                continue;
            }
            return Ok((payload, from));
        }
    }

    /// Sends the fixed acknowledgment payload to the given peer.
    pub async fn acknowledge(&self, to: SocketAddr) -> io::Result<()> {
        self.send(ACKNOWLEDGMENT, to).await
    }

    /// Sends a payload and treats the next inbound datagram as its
    /// acknowledgment.
    ///
    /// Matching is by arrival order only; there is no correlation id. A
    /// non-acknowledgment datagram in that slot is a protocol desync and
    /// surfaces as [`ChannelError::AckMismatch`].
    pub async fn send_and_await_ack(
        &self,
        payload: &str,
        to: SocketAddr,
    ) -> Result<(), ChannelError> {
        self.send(payload, to).await?;
        let (reply, from) = self.recv().await?;
        if reply == ACKNOWLEDGMENT {
            debug!("Acknowledged by {}", from);
            Ok(())
        } else {
            Err(ChannelError::AckMismatch { got: reply })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    async fn pair() -> (AckChannel, AckChannel, SocketAddr, SocketAddr) {
        let a = AckChannel::bind("127.0.0.1:0").await.unwrap();
        let b = AckChannel::bind("127.0.0.1:0").await.unwrap();
        let a_addr = a.local_addr().unwrap();
        let b_addr = b.local_addr().unwrap();
        (a, b, a_addr, b_addr)
    }

    #[tokio::test]
    async fn send_recv_captures_sender() {
        let (a, b, a_addr, b_addr) = pair().await;

        assert_ok!(a.send("JOIN:Alice", b_addr).await);
        let (payload, from) = b.recv().await.unwrap();

        assert_eq!(payload, "JOIN:Alice");
        assert_eq!(from, a_addr);
    }

    #[tokio::test]
    async fn acknowledge_sends_the_fixed_payload() {
        let (a, b, _, b_addr) = pair().await;

        assert_ok!(a.acknowledge(b_addr).await);
        let (payload, _) = b.recv().await.unwrap();
        assert_eq!(payload, ACKNOWLEDGMENT);
    }

    #[tokio::test]
    async fn handshake_succeeds_when_peer_acknowledges() {
        let (a, b, _, b_addr) = pair().await;

        let receiver = tokio::spawn(async move {
            let (payload, from) = b.recv().await.unwrap();
            b.acknowledge(from).await.unwrap();
            payload
        });

        assert_ok!(a.send_and_await_ack("STATE", b_addr).await);
        assert_eq!(receiver.await.unwrap(), "STATE");
    }

    #[tokio::test]
    async fn handshake_fails_on_non_acknowledgment_reply() {
        let (a, b, _, b_addr) = pair().await;

        let receiver = tokio::spawn(async move {
            let (_, from) = b.recv().await.unwrap();
            // Reply with a real payload where the ack belongs.
            b.send("MOVE_OK", from).await.unwrap();
        });

        let result = a.send_and_await_ack("STATE", b_addr).await;
        match result {
            Err(ChannelError::AckMismatch { got }) => assert_eq!(got, "MOVE_OK"),
            other => panic!("expected AckMismatch, got {:?}", other),
        }
        receiver.await.unwrap();
    }

    #[tokio::test]
    async fn recv_message_skips_stray_acknowledgments() {
        let (a, b, _, b_addr) = pair().await;

        assert_ok!(a.acknowledge(b_addr).await);
        assert_ok!(a.acknowledge(b_addr).await);
        assert_ok!(a.send("PICKUP_OK", b_addr).await);

        let (payload, _) = b.recv_message().await.unwrap();
        assert_eq!(payload, "PICKUP_OK");
    }
}

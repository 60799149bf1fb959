//! Protocol layer shared by the gridloot client, relay, and server
//!
//! This crate holds everything all three processes must agree on:
//! - The colon-delimited command codec and the protocol's fixed tokens
//!   (`protocol`)
//! - The acknowledged datagram channel that every hop of the
//!   client → relay → server path is built on (`channel`)
//!
//! The wire format is plain ASCII text: one command or response per UDP
//! datagram, no length prefix, no sequence numbers. Reliability is limited
//! to a single fixed-payload acknowledgment per datagram; see the `channel`
//! module for the exact contract and its documented gaps.

pub mod channel;
pub mod protocol;

pub use channel::{AckChannel, ChannelError};
pub use protocol::{Command, DecodeError};

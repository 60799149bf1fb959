//! # Authoritative Game Server
//!
//! This library implements the authoritative side of the gridloot protocol.
//! It owns the canonical game state and is the only process allowed to
//! mutate it; clients reach it exclusively through the relay.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! The game state engine: player roster, positions, and the loot field.
//! Every operation is atomic with respect to the aggregate and reports
//! application-level failures (unknown player, unavailable loot) as plain
//! return values, never as panics.
//!
//! ### Network Module (`network`)
//! The RPC loop binding the engine to the acknowledged datagram channel:
//! receive a forwarded command, acknowledge it, decode and apply it, send
//! the response, then poll the relay for the next command.
//!
//! ## Failure Policy
//!
//! Transport failures are fatal to the process (exit code 1). Decode
//! failures and application-level failures are answered with
//! `INVALID_COMMAND` or the matching failure token and never terminate
//! the server.

pub mod game;
pub mod network;

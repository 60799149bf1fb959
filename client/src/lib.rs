//! Thin console front end for the gridloot protocol
//!
//! The client holds no game logic: it translates console input into wire
//! commands, runs the send/await-ack/receive-response round trip against
//! the relay, and prints every response verbatim. The translation lives in
//! the `console` module as pure functions so it stays unit-testable.

pub mod console;

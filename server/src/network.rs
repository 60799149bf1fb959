//! RPC loop binding the game engine to the acknowledged datagram channel
//!
//! The server never initiates contact: it waits for the relay to forward a
//! command, acknowledges it, applies it, sends the response, and only then
//! announces readiness for the next command with the `REQUEST_DATA` poll.
//! The poll also tells the relay where this process lives, so every later
//! exchange can be gated on it.

use crate::game::GameState;
use log::info;
use shared::channel::{AckChannel, ChannelError};
use shared::protocol::{
    Command, INVALID_COMMAND, JOINED, MOVE_FAIL, MOVE_OK, NOT_A_COMMAND, PICKUP_FAIL, PICKUP_OK,
    REQUEST_DATA,
};
use std::io;
use std::net::SocketAddr;

/// The authoritative backend: one channel, one game state, one
/// sequential request/response loop.
pub struct Backend {
    channel: AckChannel,
    game: GameState,
}

impl Backend {
    pub async fn bind(addr: &str) -> io::Result<Self> {
        Ok(Self {
            channel: AckChannel::bind(addr).await?,
            game: GameState::new(),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.channel.local_addr()
    }

    /// Mutable access to the game state, used to seed the loot field
    /// before the loop starts.
    pub fn game_mut(&mut self) -> &mut GameState {
        &mut self.game
    }

    /// Runs the request/response loop until a quit command arrives.
    ///
    /// Transport failures and acknowledgment desyncs abort the loop with
    /// an error; the caller is expected to terminate the process on them.
    pub async fn run(&mut self) -> Result<(), ChannelError> {
        info!("Server listening on {}", self.channel.local_addr()?);

        loop {
            let (payload, from) = self.channel.recv_message().await?;
            self.channel.acknowledge(from).await?;
            info!("[Relay -> Server] {} from {}", payload, from);

            match process_request(&mut self.game, &payload) {
                Some(response) => {
                    self.channel.send_and_await_ack(&response, from).await?;
                    info!("[Server -> Relay] {}", response);
                    // Ready for the next command.
                    self.channel.send_and_await_ack(REQUEST_DATA, from).await?;
                }
                None => {
                    info!("Quit received, server shutting down");
                    return Ok(());
                }
            }
        }
    }
}

/// Decodes one wire command and applies it to the game state, producing
/// the response payload. Returns `None` for a quit command, which has no
/// response and ends the session.
///
/// Decode failures never reach the engine: an unknown first token answers
/// `NOT_A_COMMAND`, malformed fields of a known kind answer
/// `INVALID_COMMAND`.
pub fn process_request(game: &mut GameState, payload: &str) -> Option<String> {
    let response = match Command::decode(payload) {
        Ok(Command::Join { name }) => format!("{}:{}", JOINED, game.join(&name)),
        Ok(Command::Move { player_id, dx, dy }) => {
            if game.move_player(player_id, dx, dy) {
                MOVE_OK.to_string()
            } else {
                MOVE_FAIL.to_string()
            }
        }
        Ok(Command::Pickup { player_id, loot_id }) => {
            if game.pickup(player_id, loot_id) {
                PICKUP_OK.to_string()
            } else {
                PICKUP_FAIL.to_string()
            }
        }
        Ok(Command::State) => game.snapshot(),
        Ok(Command::Quit) => return None,
        Ok(Command::Unrecognized(raw)) => {
            info!("Unrecognized command {:?}", raw);
            NOT_A_COMMAND.to_string()
        }
        Err(error) => {
            info!("Rejecting malformed command {:?}: {}", payload, error);
            INVALID_COMMAND.to_string()
        }
    };
    Some(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[test]
    fn join_then_move_then_state_scenario() {
        let mut game = GameState::new();

        assert_eq!(
            process_request(&mut game, "JOIN:Alice"),
            Some("JOINED:0".to_string())
        );
        assert_eq!(
            process_request(&mut game, "MOVE:0:3:-2"),
            Some(MOVE_OK.to_string())
        );

        let snapshot = process_request(&mut game, "STATE").unwrap();
        assert_eq!(snapshot, "PLAYER:0:Alice:3:-2:");
    }

    #[test]
    fn pickup_of_absent_loot_fails() {
        let mut game = GameState::new();
        process_request(&mut game, "JOIN:Alice");
        assert_eq!(
            process_request(&mut game, "PICKUP:0:7"),
            Some(PICKUP_FAIL.to_string())
        );
    }

    #[test]
    fn pickup_of_seeded_loot_succeeds_once() {
        let mut game = GameState::new();
        game.spawn_loot(7, 1, 1);
        process_request(&mut game, "JOIN:Alice");

        assert_eq!(
            process_request(&mut game, "PICKUP:0:7"),
            Some(PICKUP_OK.to_string())
        );
        assert_eq!(
            process_request(&mut game, "PICKUP:0:7"),
            Some(PICKUP_FAIL.to_string())
        );
    }

    #[test]
    fn unknown_player_move_is_a_failure_token() {
        let mut game = GameState::new();
        assert_eq!(
            process_request(&mut game, "MOVE:42:1:1"),
            Some(MOVE_FAIL.to_string())
        );
    }

    #[test]
    fn malformed_fields_answer_invalid_command() {
        let mut game = GameState::new();
        assert_eq!(
            process_request(&mut game, "MOVE:zero:1:2"),
            Some(INVALID_COMMAND.to_string())
        );
        assert_eq!(
            process_request(&mut game, "PICKUP:0"),
            Some(INVALID_COMMAND.to_string())
        );
        // The engine state is untouched afterwards.
        assert_eq!(game.snapshot(), "EMPTY");
    }

    #[test]
    fn unknown_first_token_answers_not_a_command() {
        let mut game = GameState::new();
        assert_eq!(
            process_request(&mut game, "FROBNICATE"),
            Some(NOT_A_COMMAND.to_string())
        );
    }

    #[test]
    fn quit_has_no_response() {
        let mut game = GameState::new();
        assert_eq!(process_request(&mut game, "QUIT"), None);
    }

    #[tokio::test]
    async fn backend_binds_an_addressable_socket() {
        let backend = assert_ok!(Backend::bind("127.0.0.1:0").await);
        let addr = assert_ok!(backend.local_addr());
        assert_ne!(addr.port(), 0);
    }
}

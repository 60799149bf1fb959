//! Colon-delimited command codec and the protocol's fixed tokens
//!
//! Every payload on the wire is a single ASCII string whose first
//! `:`-separated token names the message. Commands travel client → server,
//! response tokens travel back, and two control tokens never leave the
//! relay/server pair: the acknowledgment payload and the server's
//! readiness poll.

use std::fmt;

/// Field delimiter of the wire format.
pub const DELIMITER: char = ':';

/// Fixed acknowledgment payload, sent immediately upon receipt of a
/// datagram and before the real reply. Distinct from every command and
/// response token.
pub const ACKNOWLEDGMENT: &str = "RELAY_ACK";

/// Poll token the server sends when it is ready for the next forwarded
/// command. Never forwarded to a client.
pub const REQUEST_DATA: &str = "REQUEST_DATA";

/// Response prefix for a successful join; the full response is
/// `JOINED:<playerId>`.
pub const JOINED: &str = "JOINED";
pub const MOVE_OK: &str = "MOVE_OK";
pub const MOVE_FAIL: &str = "MOVE_FAIL";
pub const PICKUP_OK: &str = "PICKUP_OK";
pub const PICKUP_FAIL: &str = "PICKUP_FAIL";
/// Response to a command whose first token is unknown.
pub const NOT_A_COMMAND: &str = "NOT_A_COMMAND";
/// Response to a known command with missing or malformed fields.
pub const INVALID_COMMAND: &str = "INVALID_COMMAND";
/// Shutdown request; propagated along the relay, answered by nothing.
pub const QUIT: &str = "QUIT";

/// Well-known client-facing relay port.
pub const DEFAULT_RELAY_PORT: u16 = 5000;
/// Well-known authoritative server port.
pub const DEFAULT_SERVER_PORT: u16 = 6000;

/// A decoded game command.
///
/// `JOIN`'s name is its only and last field, so the decoder takes
/// everything after the first delimiter as the name; display names may
/// therefore contain `:` without escaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Join { name: String },
    Move { player_id: u32, dx: i32, dy: i32 },
    Pickup { player_id: u32, loot_id: u32 },
    State,
    Quit,
    /// Anything whose first token matches no known kind, kept verbatim.
    Unrecognized(String),
}

/// A known command kind carried malformed fields. The server answers
/// `INVALID_COMMAND` and the game engine is never reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    MissingField {
        kind: &'static str,
        field: &'static str,
    },
    BadNumber {
        kind: &'static str,
        field: &'static str,
        value: String,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::MissingField { kind, field } => {
                write!(f, "{} is missing its {} field", kind, field)
            }
            DecodeError::BadNumber { kind, field, value } => {
                write!(f, "{} field {} is not a number: {:?}", kind, field, value)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

impl Command {
    /// Renders the command in wire form, joining kind and fields with the
    /// delimiter.
    pub fn encode(&self) -> String {
        match self {
            Command::Join { name } => format!("JOIN:{}", name),
            Command::Move { player_id, dx, dy } => {
                format!("MOVE:{}:{}:{}", player_id, dx, dy)
            }
            Command::Pickup { player_id, loot_id } => {
                format!("PICKUP:{}:{}", player_id, loot_id)
            }
            Command::State => "STATE".to_string(),
            Command::Quit => QUIT.to_string(),
            Command::Unrecognized(raw) => raw.clone(),
        }
    }

    /// Splits a wire payload on the delimiter and classifies its first
    /// token.
    ///
    /// An empty payload or an unknown first token decodes to
    /// [`Command::Unrecognized`], never an error. Errors are reserved for
    /// known kinds with missing or non-integer fields. Extra trailing
    /// fields on `MOVE`/`PICKUP` are ignored.
    pub fn decode(wire: &str) -> Result<Self, DecodeError> {
        let (kind, rest) = match wire.split_once(DELIMITER) {
            Some((kind, rest)) => (kind, Some(rest)),
            None => (wire, None),
        };

        match (kind, rest) {
            ("JOIN", rest) => {
                let name = rest.unwrap_or("");
                if name.is_empty() {
                    return Err(DecodeError::MissingField {
                        kind: "JOIN",
                        field: "name",
                    });
                }
                Ok(Command::Join {
                    name: name.to_string(),
                })
            }
            ("MOVE", rest) => {
                let mut fields = rest.unwrap_or("").split(DELIMITER);
                Ok(Command::Move {
                    player_id: parse_field(fields.next(), "MOVE", "playerId")?,
                    dx: parse_field(fields.next(), "MOVE", "dx")?,
                    dy: parse_field(fields.next(), "MOVE", "dy")?,
                })
            }
            ("PICKUP", rest) => {
                let mut fields = rest.unwrap_or("").split(DELIMITER);
                Ok(Command::Pickup {
                    player_id: parse_field(fields.next(), "PICKUP", "playerId")?,
                    loot_id: parse_field(fields.next(), "PICKUP", "lootId")?,
                })
            }
            ("STATE", None) => Ok(Command::State),
            (QUIT, None) => Ok(Command::Quit),
            _ => Ok(Command::Unrecognized(wire.to_string())),
        }
    }
}

fn parse_field<T: std::str::FromStr>(
    raw: Option<&str>,
    kind: &'static str,
    field: &'static str,
) -> Result<T, DecodeError> {
    // Splitting an empty remainder yields one empty token; that is an
    // absent field, not a malformed number.
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(DecodeError::MissingField { kind, field }),
    };
    raw.parse().map_err(|_| DecodeError::BadNumber {
        kind,
        field,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_matches_wire_format() {
        assert_eq!(
            Command::Join {
                name: "Alice".to_string()
            }
            .encode(),
            "JOIN:Alice"
        );
        assert_eq!(
            Command::Move {
                player_id: 0,
                dx: 3,
                dy: -2
            }
            .encode(),
            "MOVE:0:3:-2"
        );
        assert_eq!(
            Command::Pickup {
                player_id: 1,
                loot_id: 7
            }
            .encode(),
            "PICKUP:1:7"
        );
        assert_eq!(Command::State.encode(), "STATE");
        assert_eq!(Command::Quit.encode(), "QUIT");
    }

    #[test]
    fn decode_encode_roundtrip() {
        let commands = vec![
            Command::Join {
                name: "Alice".to_string(),
            },
            Command::Move {
                player_id: 4,
                dx: -11,
                dy: 0,
            },
            Command::Pickup {
                player_id: 0,
                loot_id: 99,
            },
            Command::State,
            Command::Quit,
        ];

        for command in commands {
            assert_eq!(Command::decode(&command.encode()), Ok(command));
        }
    }

    #[test]
    fn join_name_may_contain_the_delimiter() {
        let decoded = Command::decode("JOIN:a:b:c").unwrap();
        assert_eq!(
            decoded,
            Command::Join {
                name: "a:b:c".to_string()
            }
        );
        assert_eq!(decoded.encode(), "JOIN:a:b:c");
    }

    #[test]
    fn empty_join_name_is_an_error() {
        assert_eq!(
            Command::decode("JOIN:"),
            Err(DecodeError::MissingField {
                kind: "JOIN",
                field: "name"
            })
        );
        assert_eq!(
            Command::decode("JOIN"),
            Err(DecodeError::MissingField {
                kind: "JOIN",
                field: "name"
            })
        );
    }

    #[test]
    fn unknown_and_empty_payloads_are_unrecognized() {
        assert_eq!(
            Command::decode("FROBNICATE:1"),
            Ok(Command::Unrecognized("FROBNICATE:1".to_string()))
        );
        assert_eq!(
            Command::decode(""),
            Ok(Command::Unrecognized(String::new()))
        );
        // Known tokens with unexpected trailing fields are not commands.
        assert_eq!(
            Command::decode("STATE:now"),
            Ok(Command::Unrecognized("STATE:now".to_string()))
        );
    }

    #[test]
    fn malformed_numeric_fields_are_decode_errors() {
        assert!(matches!(
            Command::decode("MOVE:zero:1:2"),
            Err(DecodeError::BadNumber { kind: "MOVE", .. })
        ));
        assert!(matches!(
            Command::decode("MOVE:0:1"),
            Err(DecodeError::MissingField {
                kind: "MOVE",
                field: "dy"
            })
        ));
        assert!(matches!(
            Command::decode("PICKUP:0:seven"),
            Err(DecodeError::BadNumber {
                kind: "PICKUP",
                field: "lootId",
                ..
            })
        ));
        assert!(matches!(
            Command::decode("PICKUP"),
            Err(DecodeError::MissingField { kind: "PICKUP", .. })
        ));
        // A trailing delimiter leaves an empty first field, which is
        // missing, not a bad number.
        assert!(matches!(
            Command::decode("MOVE:"),
            Err(DecodeError::MissingField {
                kind: "MOVE",
                field: "playerId"
            })
        ));
        assert!(matches!(
            Command::decode("PICKUP:"),
            Err(DecodeError::MissingField {
                kind: "PICKUP",
                field: "playerId"
            })
        ));
    }

    #[test]
    fn control_tokens_are_distinct_from_all_responses() {
        let tokens = [
            JOINED,
            MOVE_OK,
            MOVE_FAIL,
            PICKUP_OK,
            PICKUP_FAIL,
            NOT_A_COMMAND,
            INVALID_COMMAND,
            QUIT,
            REQUEST_DATA,
        ];
        for token in tokens {
            assert_ne!(token, ACKNOWLEDGMENT);
        }
    }
}

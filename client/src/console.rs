//! Console-to-wire translation

use shared::protocol::{Command, DELIMITER, JOINED};

/// Translates one line of console input into a wire payload, inserting
/// the caller's player id where the wire format requires it.
///
/// Input is upper-cased before matching. `MOVE`/`PICKUP` with missing or
/// non-integer arguments return `None` so the caller can reprompt without
/// touching the wire; an unknown verb is sent verbatim and comes back as
/// `NOT_A_COMMAND` from the server.
pub fn to_wire(line: &str, player_id: u32) -> Option<String> {
    let upper = line.trim().to_uppercase();
    let mut parts = upper.split_whitespace();

    let wire = match parts.next()? {
        "MOVE" => {
            let dx: i32 = parts.next()?.parse().ok()?;
            let dy: i32 = parts.next()?.parse().ok()?;
            Command::Move { player_id, dx, dy }.encode()
        }
        "PICKUP" => {
            let loot_id: u32 = parts.next()?.parse().ok()?;
            Command::Pickup { player_id, loot_id }.encode()
        }
        "STATE" => Command::State.encode(),
        "QUIT" => Command::Quit.encode(),
        _ => upper,
    };
    Some(wire)
}

/// Extracts the player id from a `JOINED:<id>` response.
pub fn parse_joined(response: &str) -> Option<u32> {
    let (token, id) = response.split_once(DELIMITER)?;
    if token != JOINED {
        return None;
    }
    id.parse().ok()
}

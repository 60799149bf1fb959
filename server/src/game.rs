//! Authoritative game state: player roster, positions, and the loot field
//!
//! All maps are ordered so that [`GameState::snapshot`] renders in a
//! deterministic, stable field order regardless of insertion history.

use log::{info, warn};
use std::collections::{BTreeMap, BTreeSet};

/// First player id handed out by the engine; ids grow strictly upward
/// from here and are never reused.
pub const PLAYER_ID_BASE: u32 = 0;

/// Chebyshev distance within which a player can claim a loot item.
pub const PICKUP_RANGE: i32 = 5;

/// One enrolled player. Players are created by [`GameState::join`] and
/// never destroyed during a session; a disconnect leaves them in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub x: i32,
    pub y: i32,
    /// Ids of the loot items this player has claimed, in ascending order.
    pub loot: BTreeSet<u32>,
}

impl Player {
    /// Creates a player at the origin with an empty inventory.
    pub fn new(id: u32, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            x: 0,
            y: 0,
            loot: BTreeSet::new(),
        }
    }
}

/// An unclaimed loot item on the grid. Claimed items leave this table and
/// live on as ids in exactly one player's held set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loot {
    pub id: u32,
    pub x: i32,
    pub y: i32,
}

/// The aggregate of all players and available loot.
#[derive(Debug)]
pub struct GameState {
    next_player_id: u32,
    players: BTreeMap<u32, Player>,
    loot: BTreeMap<u32, Loot>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self {
            next_player_id: PLAYER_ID_BASE,
            players: BTreeMap::new(),
            loot: BTreeMap::new(),
        }
    }

    /// Enrolls a new player and returns the allocated id. Never fails.
    pub fn join(&mut self, name: &str) -> u32 {
        let id = self.next_player_id;
        self.next_player_id += 1;
        self.players.insert(id, Player::new(id, name));
        info!("Player {} ({}) joined at the origin", id, name);
        id
    }

    /// Adds (dx, dy) to the player's position, saturating at the i32
    /// extremes so no move can overflow. Returns `false` for an unknown
    /// player id; the condition is reportable, not fatal.
    pub fn move_player(&mut self, player_id: u32, dx: i32, dy: i32) -> bool {
        match self.players.get_mut(&player_id) {
            Some(player) => {
                player.x = player.x.saturating_add(dx);
                player.y = player.y.saturating_add(dy);
                true
            }
            None => {
                warn!("Move for unknown player {}", player_id);
                false
            }
        }
    }

    /// Places an unclaimed loot item on the grid. Returns `false` when the
    /// id already exists, available or held.
    pub fn spawn_loot(&mut self, id: u32, x: i32, y: i32) -> bool {
        let already_held = self.players.values().any(|p| p.loot.contains(&id));
        if already_held || self.loot.contains_key(&id) {
            warn!("Loot {} already exists, not spawning", id);
            return false;
        }
        self.loot.insert(id, Loot { id, x, y });
        true
    }

    /// Attempts to claim a loot item for a player.
    ///
    /// Succeeds only when the player exists, the loot is still available,
    /// and the loot lies within [`PICKUP_RANGE`] (Chebyshev) of the
    /// player's position; the item then moves into the player's held set.
    /// Repeated calls for already-claimed loot return `false`.
    pub fn pickup(&mut self, player_id: u32, loot_id: u32) -> bool {
        let reachable = match (self.players.get(&player_id), self.loot.get(&loot_id)) {
            (Some(player), Some(item)) => {
                // Widen before subtracting; coordinates may sit at the
                // i32 extremes.
                let dx = (i64::from(item.x) - i64::from(player.x)).abs();
                let dy = (i64::from(item.y) - i64::from(player.y)).abs();
                dx.max(dy) <= i64::from(PICKUP_RANGE)
            }
            _ => false,
        };
        if !reachable {
            return false;
        }

        self.loot.remove(&loot_id);
        if let Some(player) = self.players.get_mut(&player_id) {
            player.loot.insert(loot_id);
            info!("Player {} picked up loot {}", player_id, loot_id);
        }
        true
    }

    /// Renders a point-in-time snapshot of the aggregate.
    ///
    /// Records are `;`-separated, in ascending id order:
    /// `PLAYER:<id>:<name>:<x>:<y>:<l1,l2,...>` for every player, then
    /// `LOOT:<id>:<x>:<y>` for every unclaimed item. An empty aggregate
    /// renders as `EMPTY`.
    pub fn snapshot(&self) -> String {
        let mut records = Vec::new();

        for player in self.players.values() {
            let held: Vec<String> = player.loot.iter().map(|id| id.to_string()).collect();
            records.push(format!(
                "PLAYER:{}:{}:{}:{}:{}",
                player.id,
                player.name,
                player.x,
                player.y,
                held.join(",")
            ));
        }
        for item in self.loot.values() {
            records.push(format!("LOOT:{}:{}:{}", item.id, item.x, item.y));
        }

        if records.is_empty() {
            "EMPTY".to_string()
        } else {
            records.join(";")
        }
    }
}

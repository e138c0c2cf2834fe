use crate::game::{Game, Timeouts};
use cw_storage_plus::{Item, Map};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct Config {
    pub denom: String,
    pub timeouts: Timeouts,
}

pub const CONFIG: Item<Config> = Item::new("config");
/// Games ever created; also the id of the latest one.
pub const GAME_COUNT: Item<u64> = Item::new("game_count");
pub const GAMES: Map<u64, Game> = Map::new("games");

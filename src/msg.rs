use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Binary, Timestamp};

use crate::game::Game;

#[cw_serde]
pub struct InstantiateMsg {
    /// The denomination stakes are paid in.
    pub denom: String,
    /// Seconds a game waits for an opponent. Defaults to one day.
    pub join_timeout: Option<u64>,
    /// Seconds both players have to reveal once the opponent joined. Defaults to one day.
    pub reveal_timeout: Option<u64>,
}

/// Every message that opens or joins a game carries the stake as funds.
#[cw_serde]
pub enum ExecuteMsg {
    /// Open a game anyone can join.
    CreatePublic {
        /// `sha256(tag || secret)` of the creator's pick.
        commitment: Binary,
    },
    /// Open a game only `opponent` can join.
    CreatePrivate {
        commitment: Binary,
        /// The address of the invited player.
        opponent: String,
    },
    /// Take the opponent seat, matching the creator's stake.
    JoinGame { game_id: u64, commitment: Binary },
    /// Disclose a committed pick. The second valid reveal settles the game.
    RevealPick {
        game_id: u64,
        /// Rock (1), paper (2) or scissors (3).
        pick: u8,
        secret: Binary,
    },
    /// Release the escrow of a game whose deadline has passed.
    ClaimTimeout { game_id: u64 },
}

#[cw_serde]
pub enum QueryMsg {
    /// Get the number of games ever created.
    GameCount {},
    /// Get a single game.
    Game { game_id: u64 },
    /// List games in ascending id order.
    Games {
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    /// Get the contract configuration.
    Config {},
}

#[cw_serde]
pub struct GameCountResponse {
    pub count: u64,
}

#[cw_serde]
pub struct GameResponse {
    pub game: Game,
    /// When the currently awaited action times out, if the game is still open.
    pub deadline: Option<Timestamp>,
}

#[cw_serde]
pub struct GamesResponse {
    pub games: Vec<Game>,
}

#[cw_serde]
pub struct ConfigResponse {
    pub denom: String,
    pub join_timeout: u64,
    pub reveal_timeout: u64,
}

use crate::commitment::{COMMITMENT_LEN, SECRET_LEN};
use crate::game::{Game, Payout, Pick, Timeouts};
use crate::state::{Config, CONFIG, GAMES, GAME_COUNT};
use crate::{
    error::ContractError,
    msg::{ExecuteMsg, InstantiateMsg, QueryMsg},
};
use cosmwasm_std::{
    coins, ensure, to_binary, Addr, BankMsg, Binary, Deps, DepsMut, Env, MessageInfo, Response,
    Storage, Uint128, Uint64,
};

/// One day, in seconds.
pub const DEFAULT_JOIN_TIMEOUT: u64 = 24 * 60 * 60;
pub const DEFAULT_REVEAL_TIMEOUT: u64 = 24 * 60 * 60;
/// About ten years. Deadlines are block times in nanoseconds, so timeouts must stay far from
/// `u64::MAX / 1e9` seconds.
pub const MAX_TIMEOUT: u64 = 10 * 365 * 24 * 60 * 60;

pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    ensure!(
        !msg.denom.trim().is_empty(),
        ContractError::InvalidConfig("denom must not be empty".to_string())
    );
    let timeouts = Timeouts {
        join: msg.join_timeout.unwrap_or(DEFAULT_JOIN_TIMEOUT),
        reveal: msg.reveal_timeout.unwrap_or(DEFAULT_REVEAL_TIMEOUT),
    };
    ensure!(
        timeouts.join > 0 && timeouts.reveal > 0,
        ContractError::InvalidConfig("timeouts must be positive".to_string())
    );
    ensure!(
        timeouts.join <= MAX_TIMEOUT && timeouts.reveal <= MAX_TIMEOUT,
        ContractError::InvalidConfig(format!("timeouts must not exceed {MAX_TIMEOUT} seconds"))
    );

    CONFIG.save(
        deps.storage,
        &Config {
            denom: msg.denom.clone(),
            timeouts,
        },
    )?;
    GAME_COUNT.save(deps.storage, &0)?;

    Ok(Response::default()
        .add_attribute("action", "instantiate")
        .add_attribute("denom", msg.denom)
        .add_attribute("join_timeout", timeouts.join.to_string())
        .add_attribute("reveal_timeout", timeouts.reveal.to_string()))
}

pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    let api = deps.api;

    match msg {
        ExecuteMsg::CreatePublic { commitment } => exec::create(deps, env, info, commitment, None),
        ExecuteMsg::CreatePrivate {
            commitment,
            opponent,
        } => {
            let opponent_addr = api.addr_validate(&opponent)?;
            exec::create(deps, env, info, commitment, Some(opponent_addr))
        }
        ExecuteMsg::JoinGame {
            game_id,
            commitment,
        } => exec::join(deps, env, info, game_id, commitment),
        ExecuteMsg::RevealPick {
            game_id,
            pick,
            secret,
        } => exec::reveal(deps, env, info, game_id, pick, secret),
        ExecuteMsg::ClaimTimeout { game_id } => exec::claim_timeout(deps, env, info, game_id),
    }
}

/// Returns the amount of `denom` attached to the message, zero if none.
fn paid_amount(info: &MessageInfo, denom: &str) -> Result<Uint128, ContractError> {
    match info.funds.as_slice() {
        [] => Ok(Uint128::zero()),
        [coin] if coin.denom == denom => Ok(coin.amount),
        [coin] => Err(ContractError::UnexpectedDenom {
            denom: coin.denom.clone(),
        }),
        _ => Err(ContractError::MultipleDenoms),
    }
}

fn nonpayable(info: &MessageInfo) -> Result<(), ContractError> {
    ensure!(info.funds.is_empty(), ContractError::UnexpectedFunds);
    Ok(())
}

fn validate_commitment(commitment: &Binary) -> Result<(), ContractError> {
    ensure!(
        commitment.len() == COMMITMENT_LEN,
        ContractError::InvalidCommitment {
            len: commitment.len()
        }
    );
    Ok(())
}

fn parse_secret(secret: &Binary) -> Result<[u8; SECRET_LEN], ContractError> {
    secret
        .as_slice()
        .try_into()
        .map_err(|_| ContractError::InvalidSecret { len: secret.len() })
}

fn load_game(storage: &dyn Storage, id: u64) -> Result<Game, ContractError> {
    GAMES
        .may_load(storage, id)?
        .ok_or(ContractError::GameNotFound { id })
}

/// Turns payouts into bank transfers. They leave the contract only if the whole execution succeeds.
fn payout_messages(payouts: &[Payout], denom: &str) -> Vec<BankMsg> {
    payouts
        .iter()
        .filter(|payout| !payout.amount.is_zero())
        .map(|payout| BankMsg::Send {
            to_address: payout.recipient.to_string(),
            amount: coins(payout.amount.u128(), denom),
        })
        .collect()
}

/// Attributes describing how a finished game was settled.
fn settlement_attributes(game: &Game) -> Vec<(&'static str, String)> {
    let mut attributes = vec![];
    if let Some(outcome) = game.outcome {
        attributes.push(("outcome", outcome.as_str().to_string()));
    }
    if let Some(winner) = game.winner() {
        attributes.push(("winner", winner.to_string()));
    }
    attributes
}

mod exec {
    use super::*;

    pub fn create(
        deps: DepsMut,
        env: Env,
        info: MessageInfo,
        commitment: Binary,
        opponent: Option<Addr>,
    ) -> Result<Response, ContractError> {
        let config = CONFIG.load(deps.storage)?;
        validate_commitment(&commitment)?;
        if let Some(opponent) = &opponent {
            ensure!(
                *opponent != info.sender,
                ContractError::InvalidOpponent {
                    opponent: opponent.to_string()
                }
            );
        }
        let stake = paid_amount(&info, &config.denom)?;
        ensure!(!stake.is_zero(), ContractError::InvalidStake);

        let id = Uint64::new(GAME_COUNT.load(deps.storage)?)
            .checked_add(Uint64::one())?
            .u64();
        let game = Game::new(
            id,
            info.sender.clone(),
            opponent,
            commitment,
            stake,
            config.timeouts,
            env.block.time,
        );

        GAMES.save(deps.storage, id, &game)?;
        GAME_COUNT.save(deps.storage, &id)?;

        let response = Response::default()
            .add_attribute(
                "action",
                if game.opponent.is_some() {
                    "create_private"
                } else {
                    "create_public"
                },
            )
            .add_attribute("game_id", id.to_string())
            .add_attribute("creator", info.sender.to_string())
            .add_attribute("stake", stake.to_string());

        Ok(match game.opponent {
            Some(opponent) => response.add_attribute("opponent", opponent.to_string()),
            None => response,
        })
    }

    pub fn join(
        deps: DepsMut,
        env: Env,
        info: MessageInfo,
        game_id: u64,
        commitment: Binary,
    ) -> Result<Response, ContractError> {
        let config = CONFIG.load(deps.storage)?;
        validate_commitment(&commitment)?;
        let stake = paid_amount(&info, &config.denom)?;

        let mut game = load_game(deps.storage, game_id)?;
        game.join(info.sender.clone(), commitment, stake, env.block.time)?;

        GAMES.save(deps.storage, game_id, &game)?;

        Ok(Response::default()
            .add_attribute("action", "join")
            .add_attribute("game_id", game_id.to_string())
            .add_attribute("creator", game.creator.to_string())
            .add_attribute("opponent", info.sender.to_string())
            .add_attribute("stake", stake.to_string()))
    }

    pub fn reveal(
        deps: DepsMut,
        env: Env,
        info: MessageInfo,
        game_id: u64,
        pick: u8,
        secret: Binary,
    ) -> Result<Response, ContractError> {
        nonpayable(&info)?;
        let pick = Pick::try_from(pick)?;
        let secret = parse_secret(&secret)?;
        let config = CONFIG.load(deps.storage)?;

        let mut game = load_game(deps.storage, game_id)?;
        let payouts = game.reveal(&info.sender, pick, secret, env.block.time)?;

        GAMES.save(deps.storage, game_id, &game)?;

        let response = Response::default()
            .add_attribute("action", "reveal")
            .add_attribute("game_id", game_id.to_string())
            .add_attribute("player", info.sender.to_string());

        Ok(match payouts {
            Some(payouts) => response
                .add_attribute("state", "resolved")
                .add_attributes(settlement_attributes(&game))
                .add_messages(payout_messages(&payouts, &config.denom)),
            None => response,
        })
    }

    pub fn claim_timeout(
        deps: DepsMut,
        env: Env,
        info: MessageInfo,
        game_id: u64,
    ) -> Result<Response, ContractError> {
        nonpayable(&info)?;
        let config = CONFIG.load(deps.storage)?;

        let mut game = load_game(deps.storage, game_id)?;
        let payouts = game.claim_timeout(&info.sender, env.block.time)?;

        GAMES.save(deps.storage, game_id, &game)?;

        Ok(Response::default()
            .add_attribute("action", "claim_timeout")
            .add_attribute("game_id", game_id.to_string())
            .add_attribute("claimer", info.sender.to_string())
            .add_attribute("state", "expired")
            .add_attributes(settlement_attributes(&game))
            .add_messages(payout_messages(&payouts, &config.denom)))
    }
}

pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> Result<Binary, ContractError> {
    match msg {
        QueryMsg::GameCount {} => Ok(to_binary(&query::game_count(deps)?)?),
        QueryMsg::Game { game_id } => Ok(to_binary(&query::game(deps, game_id)?)?),
        QueryMsg::Games { start_after, limit } => {
            Ok(to_binary(&query::games(deps, start_after, limit)?)?)
        }
        QueryMsg::Config {} => Ok(to_binary(&query::config(deps)?)?),
    }
}

mod query {
    use super::*;
    use crate::msg::{ConfigResponse, GameCountResponse, GameResponse, GamesResponse};
    use cosmwasm_std::{Order, StdResult};
    use cw_storage_plus::Bound;

    const DEFAULT_LIMIT: u32 = 10;
    const MAX_LIMIT: u32 = 30;

    pub fn game_count(deps: Deps) -> Result<GameCountResponse, ContractError> {
        let count = GAME_COUNT.load(deps.storage)?;
        Ok(GameCountResponse { count })
    }

    pub fn game(deps: Deps, game_id: u64) -> Result<GameResponse, ContractError> {
        let game = load_game(deps.storage, game_id)?;
        Ok(GameResponse {
            deadline: game.deadline(),
            game,
        })
    }

    pub fn games(
        deps: Deps,
        start_after: Option<u64>,
        limit: Option<u32>,
    ) -> Result<GamesResponse, ContractError> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
        let games: StdResult<Vec<_>> = GAMES
            .range(
                deps.storage,
                start_after.map(Bound::exclusive),
                None,
                Order::Ascending,
            )
            .take(limit)
            .map(|game| game.map(|(_, game)| game))
            .collect();

        Ok(GamesResponse { games: games? })
    }

    pub fn config(deps: Deps) -> Result<ConfigResponse, ContractError> {
        let config = CONFIG.load(deps.storage)?;
        Ok(ConfigResponse {
            denom: config.denom,
            join_timeout: config.timeouts.join,
            reveal_timeout: config.timeouts.reveal,
        })
    }
}

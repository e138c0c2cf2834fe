use crate::game::GameError;
use cosmwasm_std::{OverflowError, StdError};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    StdError(#[from] StdError),
    #[error("{0}")]
    GameError(#[from] GameError),
    #[error("{0}")]
    Overflow(#[from] OverflowError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("A game must be created with a non-zero stake")]
    InvalidStake,
    #[error("{opponent} cannot be invited to their own game")]
    InvalidOpponent { opponent: String },
    #[error("Commitment must be 32 bytes, got {len}")]
    InvalidCommitment { len: usize },
    #[error("Secret must be 32 bytes, got {len}")]
    InvalidSecret { len: usize },
    #[error("Funds in {denom} are not accepted")]
    UnexpectedDenom { denom: String },
    #[error("Only a single coin can be staked")]
    MultipleDenoms,
    #[error("This message does not accept funds")]
    UnexpectedFunds,
    #[error("Game {id} does not exist")]
    GameNotFound { id: u64 },
}

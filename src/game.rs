use cosmwasm_schema::cw_serde;
use cosmwasm_std::{ensure, Addr, Binary, OverflowError, Timestamp, Uint128};
use thiserror::Error;

use crate::commitment::{self, SECRET_LEN};

/// A hand shown in the game.
#[cw_serde]
#[derive(Copy)]
pub enum Pick {
    Rock,
    Paper,
    Scissors,
}

impl Pick {
    /// The tag hashed into a commitment and sent when revealing.
    pub fn tag(self) -> u8 {
        match self {
            Pick::Rock => 1,
            Pick::Paper => 2,
            Pick::Scissors => 3,
        }
    }

    /// Checks if this pick beats the other one.
    pub fn beats(self, other: Pick) -> bool {
        matches!(
            (self, other),
            (Pick::Rock, Pick::Scissors) | (Pick::Scissors, Pick::Paper) | (Pick::Paper, Pick::Rock)
        )
    }
}

impl TryFrom<u8> for Pick {
    type Error = GameError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            1 => Ok(Pick::Rock),
            2 => Ok(Pick::Paper),
            3 => Ok(Pick::Scissors),
            _ => Err(GameError::InvalidMove(tag)),
        }
    }
}

/// How a finished game turned out, seen from the creator's seat.
#[cw_serde]
#[derive(Copy)]
pub enum Outcome {
    CreatorWins,
    OpponentWins,
    Draw,
}

impl Outcome {
    /// Judges the creator's pick against the opponent's.
    pub fn judge(creator: Pick, opponent: Pick) -> Outcome {
        if creator == opponent {
            Outcome::Draw
        } else if creator.beats(opponent) {
            Outcome::CreatorWins
        } else {
            Outcome::OpponentWins
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::CreatorWins => "creator_wins",
            Outcome::OpponentWins => "opponent_wins",
            Outcome::Draw => "draw",
        }
    }
}

/// Who may take the opponent seat.
#[cw_serde]
#[derive(Copy)]
pub enum Visibility {
    /// Anyone but the creator.
    Public,
    /// Only the invited address.
    Private,
}

/// The phase of a game.
///
/// `AwaitingOpponent -> AwaitingReveal -> Resolved`, with `Expired` reachable from both open
/// phases through a timeout claim. `Resolved` and `Expired` are final.
#[cw_serde]
#[derive(Copy)]
pub enum GameState {
    AwaitingOpponent,
    AwaitingReveal,
    Resolved,
    Expired,
}

impl GameState {
    pub fn is_final(self) -> bool {
        matches!(self, GameState::Resolved | GameState::Expired)
    }
}

/// A pick disclosed together with the secret it was committed with.
#[cw_serde]
pub struct Reveal {
    pub pick: Pick,
    pub secret: Binary,
}

/// Deadlines, in seconds, for each phase that waits on a player.
#[cw_serde]
#[derive(Copy)]
pub struct Timeouts {
    /// How long a game waits for an opponent after creation.
    pub join: u64,
    /// How long both players have to reveal after the opponent joined.
    pub reveal: u64,
}

/// Funds released from a game's escrow to one player.
#[cw_serde]
pub struct Payout {
    pub recipient: Addr,
    pub amount: Uint128,
}

impl Payout {
    fn new(recipient: Addr, amount: Uint128) -> Self {
        Payout { recipient, amount }
    }
}

/// An error that can occur when playing a game.
#[derive(Error, Debug, PartialEq)]
pub enum GameError {
    #[error("{0}")]
    Overflow(#[from] OverflowError),
    /// The revealed pick is not one of the three hands.
    #[error("Pick {0} is not rock (1), paper (2) or scissors (3)")]
    InvalidMove(u8),
    #[error("Game {id} is not waiting for an opponent")]
    GameNotJoinable { id: u64 },
    #[error("Cannot join your own game")]
    SelfPlay,
    #[error("{player} is not allowed to do this")]
    Unauthorized { player: String },
    #[error("Stake must be exactly {expected}, got {got}")]
    StakeMismatch { expected: Uint128, got: Uint128 },
    #[error("{player} is not playing in this game")]
    NotPlayer { player: String },
    #[error("Game {id} has no opponent to reveal against yet")]
    NotRevealable { id: u64 },
    #[error("{player} has already revealed")]
    AlreadyRevealed { player: String },
    /// The (pick, secret) pair does not hash to the stored commitment.
    #[error("Revealed pick does not match the commitment")]
    CommitmentMismatch,
    #[error("The reveal window of game {id} is closed")]
    RevealWindowClosed { id: u64 },
    #[error("Game {id} is already finished")]
    GameAlreadyResolved { id: u64 },
    #[error("Game {id} does not expire before {deadline}")]
    NotExpired { id: u64, deadline: Timestamp },
}

/// A rock-paper-scissors game settled over escrowed stakes.
#[cw_serde]
pub struct Game {
    pub id: u64,
    pub creator: Addr,
    /// The invited address of a private game, or whoever joined a public one.
    pub opponent: Option<Addr>,
    pub visibility: Visibility,
    /// The amount each player escrows.
    pub stake: Uint128,
    /// What the contract currently holds for this game.
    pub escrow: Uint128,
    pub creator_commitment: Binary,
    pub opponent_commitment: Option<Binary>,
    pub creator_reveal: Option<Reveal>,
    pub opponent_reveal: Option<Reveal>,
    pub state: GameState,
    pub outcome: Option<Outcome>,
    pub timeouts: Timeouts,
    pub created_at: Timestamp,
    pub joined_at: Option<Timestamp>,
}

impl Game {
    /// Opens a game with the creator's stake in escrow. Passing an `invited` address makes it private.
    pub fn new(
        id: u64,
        creator: Addr,
        invited: Option<Addr>,
        commitment: Binary,
        stake: Uint128,
        timeouts: Timeouts,
        now: Timestamp,
    ) -> Game {
        let visibility = if invited.is_some() {
            Visibility::Private
        } else {
            Visibility::Public
        };

        Game {
            id,
            creator,
            opponent: invited,
            visibility,
            stake,
            escrow: stake,
            creator_commitment: commitment,
            opponent_commitment: None,
            creator_reveal: None,
            opponent_reveal: None,
            state: GameState::AwaitingOpponent,
            outcome: None,
            timeouts,
            created_at: now,
            joined_at: None,
        }
    }

    /// The last instant at which the currently awaited action is accepted.
    pub fn deadline(&self) -> Option<Timestamp> {
        match self.state {
            GameState::AwaitingOpponent => Some(self.created_at.plus_seconds(self.timeouts.join)),
            GameState::AwaitingReveal => self
                .joined_at
                .map(|joined_at| joined_at.plus_seconds(self.timeouts.reveal)),
            GameState::Resolved | GameState::Expired => None,
        }
    }

    /// The player who took the pot, if any.
    pub fn winner(&self) -> Option<&Addr> {
        match self.outcome? {
            Outcome::CreatorWins => Some(&self.creator),
            Outcome::OpponentWins => self.opponent.as_ref(),
            Outcome::Draw => None,
        }
    }

    fn is_player(&self, player: &Addr) -> bool {
        *player == self.creator || self.opponent.as_ref() == Some(player)
    }

    fn ensure_open(&self) -> Result<(), GameError> {
        ensure!(
            !self.state.is_final(),
            GameError::GameAlreadyResolved { id: self.id }
        );
        Ok(())
    }

    /// Seats `player` as the opponent with their commitment and stake.
    pub fn join(
        &mut self,
        player: Addr,
        commitment: Binary,
        stake: Uint128,
        now: Timestamp,
    ) -> Result<(), GameError> {
        self.ensure_open()?;
        ensure!(
            self.state == GameState::AwaitingOpponent,
            GameError::GameNotJoinable { id: self.id }
        );
        if let Some(deadline) = self.deadline() {
            ensure!(now <= deadline, GameError::GameNotJoinable { id: self.id });
        }
        ensure!(player != self.creator, GameError::SelfPlay);
        if let Some(invited) = &self.opponent {
            ensure!(
                *invited == player,
                GameError::Unauthorized {
                    player: player.to_string()
                }
            );
        }
        ensure!(
            stake == self.stake,
            GameError::StakeMismatch {
                expected: self.stake,
                got: stake
            }
        );
        let escrow = self.escrow.checked_add(stake)?;

        self.opponent = Some(player);
        self.opponent_commitment = Some(commitment);
        self.escrow = escrow;
        self.state = GameState::AwaitingReveal;
        self.joined_at = Some(now);
        Ok(())
    }

    /// Records `player`'s reveal. Returns the payouts when this was the second reveal and the
    /// game got resolved.
    pub fn reveal(
        &mut self,
        player: &Addr,
        pick: Pick,
        secret: [u8; SECRET_LEN],
        now: Timestamp,
    ) -> Result<Option<Vec<Payout>>, GameError> {
        self.ensure_open()?;
        ensure!(
            self.state == GameState::AwaitingReveal,
            GameError::NotRevealable { id: self.id }
        );
        if let Some(deadline) = self.deadline() {
            ensure!(
                now <= deadline,
                GameError::RevealWindowClosed { id: self.id }
            );
        }
        ensure!(
            self.is_player(player),
            GameError::NotPlayer {
                player: player.to_string()
            }
        );

        let is_creator = *player == self.creator;
        let (stored, revealed, other) = if is_creator {
            (
                Some(&self.creator_commitment),
                &self.creator_reveal,
                &self.opponent_reveal,
            )
        } else {
            (
                self.opponent_commitment.as_ref(),
                &self.opponent_reveal,
                &self.creator_reveal,
            )
        };
        ensure!(
            revealed.is_none(),
            GameError::AlreadyRevealed {
                player: player.to_string()
            }
        );
        ensure!(
            stored.map_or(false, |stored| commitment::verify(pick, &secret, stored)),
            GameError::CommitmentMismatch
        );

        // the second reveal settles the game, so its payouts must be known before anything changes
        let outcome = other.as_ref().map(|other| {
            if is_creator {
                Outcome::judge(pick, other.pick)
            } else {
                Outcome::judge(other.pick, pick)
            }
        });
        let payouts = outcome.map(|outcome| self.payouts(outcome)).transpose()?;

        let reveal = Some(Reveal {
            pick,
            secret: Binary::from(secret.as_slice()),
        });
        if is_creator {
            self.creator_reveal = reveal;
        } else {
            self.opponent_reveal = reveal;
        }
        if outcome.is_some() {
            self.finish(outcome, GameState::Resolved);
        }
        Ok(payouts)
    }

    /// Closes a game whose deadline has passed and releases its escrow.
    ///
    /// A game nobody joined refunds the creator. A game stuck in the reveal phase pays the whole
    /// pot to the only player who revealed, or refunds both when neither did.
    pub fn claim_timeout(&mut self, caller: &Addr, now: Timestamp) -> Result<Vec<Payout>, GameError> {
        self.ensure_open()?;
        match self.state {
            GameState::AwaitingOpponent => ensure!(
                *caller == self.creator,
                GameError::Unauthorized {
                    player: caller.to_string()
                }
            ),
            _ => ensure!(
                self.is_player(caller),
                GameError::NotPlayer {
                    player: caller.to_string()
                }
            ),
        }
        if let Some(deadline) = self.deadline() {
            ensure!(
                now > deadline,
                GameError::NotExpired {
                    id: self.id,
                    deadline
                }
            );
        }

        if self.state == GameState::AwaitingOpponent {
            let payouts = vec![Payout::new(self.creator.clone(), self.escrow)];
            self.finish(None, GameState::Expired);
            return Ok(payouts);
        }

        let outcome = match (&self.creator_reveal, &self.opponent_reveal) {
            (Some(creator), Some(opponent)) => Outcome::judge(creator.pick, opponent.pick),
            (Some(_), None) => Outcome::CreatorWins,
            (None, Some(_)) => Outcome::OpponentWins,
            (None, None) => Outcome::Draw,
        };
        let payouts = self.payouts(outcome)?;
        self.finish(Some(outcome), GameState::Expired);
        Ok(payouts)
    }

    /// Splits the escrow of a seated game according to `outcome`.
    fn payouts(&self, outcome: Outcome) -> Result<Vec<Payout>, GameError> {
        let opponent = self
            .opponent
            .clone()
            .ok_or(GameError::NotRevealable { id: self.id })?;

        Ok(match outcome {
            Outcome::CreatorWins => vec![Payout::new(self.creator.clone(), self.escrow)],
            Outcome::OpponentWins => vec![Payout::new(opponent, self.escrow)],
            Outcome::Draw => {
                let refund = self.escrow.checked_sub(self.stake)?;
                vec![
                    Payout::new(self.creator.clone(), self.stake),
                    Payout::new(opponent, refund),
                ]
            }
        })
    }

    /// Empties the escrow and moves the game into its final `state`.
    fn finish(&mut self, outcome: Option<Outcome>, state: GameState) {
        self.escrow = Uint128::zero();
        self.state = state;
        self.outcome = outcome;
    }
}

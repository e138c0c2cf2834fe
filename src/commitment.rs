//! Commit-reveal hashing shared by the contract and its clients.
//!
//! A commitment is `sha256(tag || secret)` where `tag` is the pick's tag as a 32-byte big-endian
//! word and `secret` is exactly 32 bytes. Both fields are fixed width so no two distinct
//! (pick, secret) pairs share an encoding.

use sha2::{Digest, Sha256};

use crate::game::Pick;

/// Length of a commitment hash.
pub const COMMITMENT_LEN: usize = 32;
/// Length of the secret a player mixes into their commitment.
pub const SECRET_LEN: usize = 32;

/// Computes the commitment a player submits before revealing `pick`.
pub fn commit(pick: Pick, secret: &[u8; SECRET_LEN]) -> [u8; COMMITMENT_LEN] {
    let mut tag = [0u8; 32];
    tag[31] = pick.tag();

    let mut hasher = Sha256::new();
    hasher.update(tag);
    hasher.update(secret);
    hasher.finalize().into()
}

/// Checks that `pick` and `secret` hash to `commitment`.
pub fn verify(pick: Pick, secret: &[u8; SECRET_LEN], commitment: &[u8]) -> bool {
    commit(pick, secret).as_slice() == commitment
}

use arena_bracket::BracketError;
use cosmwasm_std::StdError;
use cw_ownable::OwnershipError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    StdError(#[from] StdError),

    #[error("{0}")]
    OwnershipError(#[from] OwnershipError),

    #[error("{msg}")]
    Validation { msg: String },

    #[error("{kind} {id} not found")]
    NotFound { kind: String, id: String },

    #[error("Cannot resolve winner: {0}")]
    IdentityResolution(BracketError),

    #[error("Bracket indexing failed: {0}")]
    Indexing(BracketError),

    #[error("Match {match_id} changed while updating (expected version {expected}, found {found})")]
    VersionConflict {
        match_id: u128,
        expected: u64,
        found: u64,
    },
}

impl ContractError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ContractError::Validation { msg: msg.into() }
    }

    pub fn not_found(kind: &str, id: impl ToString) -> Self {
        ContractError::NotFound {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<BracketError> for ContractError {
    fn from(err: BracketError) -> Self {
        match err {
            BracketError::WinnerNotInMatch { .. }
            | BracketError::UnresolvedSide { .. }
            | BracketError::MissingPartner { .. }
            | BracketError::WinnerMismatch { .. } => ContractError::IdentityResolution(err),
            BracketError::MatchNotInRound { .. }
            | BracketError::NonContiguousRound { .. }
            | BracketError::RoundDidNotAdvance { .. }
            | BracketError::RoundOverflow { .. } => ContractError::Indexing(err),
            BracketError::NextMatchNotFound {
                round_number,
                position,
            } => ContractError::not_found(
                "Next match",
                format!("round {} position {}", round_number, position + 1),
            ),
        }
    }
}

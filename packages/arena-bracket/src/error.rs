use thiserror::Error;

use crate::models::Team;

#[derive(Error, Debug, PartialEq)]
pub enum BracketError {
    #[error("Match {match_number} is not listed in round {round_number}")]
    MatchNotInRound { round_number: u32, match_number: u32 },

    #[error("Round {round_number} is not contiguous: expected match {expected} but found {found}")]
    NonContiguousRound {
        round_number: u32,
        expected: u32,
        found: u32,
    },

    #[error("Round {round_number} has no match at position {position}")]
    NextMatchNotFound { round_number: u32, position: usize },

    #[error("Round {next_round_number} does not follow round {round_number}")]
    RoundDidNotAdvance {
        round_number: u32,
        next_round_number: u32,
    },

    #[error("Round {round_number} is the last representable round")]
    RoundOverflow { round_number: u32 },

    #[error("Winner {winner_id} does not play in match {match_number}")]
    WinnerNotInMatch { winner_id: String, match_number: u32 },

    #[error("The {team} side of match {match_number} is not resolved")]
    UnresolvedSide { team: Team, match_number: u32 },

    #[error("The {team} side of match {match_number} has no partner")]
    MissingPartner { team: Team, match_number: u32 },

    #[error("Match {match_number} records {recorded} as winner but its {team} side holds {found}")]
    WinnerMismatch {
        match_number: u32,
        team: Team,
        recorded: String,
        found: String,
    },
}

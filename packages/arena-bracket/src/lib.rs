mod error;
pub mod indexer;
pub mod models;
pub mod resolver;


pub use crate::error::BracketError;
pub use crate::indexer::{
    ensure_contiguous, feeder_target, locate_next_slot, next_round_number, NextSlot,
};
pub use crate::models::{
    division_key, Category, CompletionType, Match, MatchStatus, Score, Slot, Team,
    DEFAULT_TERMINAL_ROUNDS, TBD,
};
pub use crate::resolver::{
    recorded_winner, resolve_side, resolve_winner, WinnerIdentity, WinnerSpec,
};

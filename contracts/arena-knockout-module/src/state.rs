use arena_bracket::{Match, DEFAULT_TERMINAL_ROUNDS};
use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Order, StdResult, Storage, Timestamp, Uint128};
use cw_storage_plus::{Index, IndexList, IndexedMap, Item, MultiIndex};

use crate::ContractError;

#[cw_serde]
pub struct Config {
    /// Round labels that never feed another round
    pub terminal_rounds: Vec<String>,
    /// Winner's per-game points when a bye is auto-completed; the loser gets zeros
    pub bye_score: Vec<u32>,
    pub bye_detection: ByeDetection,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            terminal_rounds: DEFAULT_TERMINAL_ROUNDS.map(String::from).to_vec(),
            bye_score: vec![21, 0, 0],
            bye_detection: ByeDetection::Explicit,
        }
    }
}

/// How an opponent slot is recognised as a bye
#[cw_serde]
#[derive(Copy, Eq)]
pub enum ByeDetection {
    /// Only slots stamped `is_bye` by bracket generation
    Explicit,
    /// Any slot still named "TBD"; a pending feeder is indistinguishable from a bye
    Sentinel,
}

pub const CONFIG: Item<Config> = Item::new("config");
pub const MATCH_COUNT: Item<Uint128> = Item::new("match_count");

pub struct MatchIndexes<'a> {
    /// (tournament id, division, round number)
    pub bracket: MultiIndex<'a, (u128, String, u32), Match, u128>,
    pub tournament: MultiIndex<'a, u128, Match, u128>,
}

impl IndexList<Match> for MatchIndexes<'_> {
    fn get_indexes(&'_ self) -> Box<dyn Iterator<Item = &'_ dyn Index<Match>> + '_> {
        let v: Vec<&dyn Index<Match>> = vec![&self.bracket, &self.tournament];
        Box::new(v.into_iter())
    }
}

// Map is stored by match id
pub fn matches<'a>() -> IndexedMap<'a, u128, Match, MatchIndexes<'a>> {
    let indexes = MatchIndexes {
        bracket: MultiIndex::new(
            |_, d: &Match| (d.tournament_id.u128(), d.division(), d.round_number),
            "matches",
            "matches__bracket",
        ),
        tournament: MultiIndex::new(
            |_, d: &Match| d.tournament_id.u128(),
            "matches",
            "matches__tournament",
        ),
    };

    IndexedMap::new("matches", indexes)
}

pub fn load_match(storage: &dyn Storage, match_id: u128) -> Result<Match, ContractError> {
    matches()
        .may_load(storage, match_id)?
        .ok_or_else(|| ContractError::not_found("Match", match_id))
}

/// All matches of one bracket round, sorted by match number
pub fn load_round(
    storage: &dyn Storage,
    tournament_id: u128,
    division: String,
    round_number: u32,
) -> StdResult<Vec<Match>> {
    let mut round = matches()
        .idx
        .bracket
        .prefix((tournament_id, division, round_number))
        .range(storage, None, None, Order::Ascending)
        .map(|x| x.map(|y| y.1))
        .collect::<StdResult<Vec<_>>>()?;
    round.sort_by_key(|x| x.match_number);

    Ok(round)
}

pub fn load_tournament(storage: &dyn Storage, tournament_id: u128) -> StdResult<Vec<Match>> {
    matches()
        .idx
        .tournament
        .prefix(tournament_id)
        .range(storage, None, None, Order::Ascending)
        .map(|x| x.map(|y| y.1))
        .collect()
}

/// Saves `match_` only if the stored record still has the version it was read at.
/// Bumps the version and stamps `updated_at`.
pub fn commit_match(
    storage: &mut dyn Storage,
    match_: &mut Match,
    now: Timestamp,
) -> Result<(), ContractError> {
    let id = match_.id.u128();
    let stored = load_match(storage, id)?;
    if stored.version != match_.version {
        return Err(ContractError::VersionConflict {
            match_id: id,
            expected: match_.version,
            found: stored.version,
        });
    }

    match_.version += 1;
    match_.updated_at = now;
    matches().replace(storage, id, Some(&*match_), Some(&stored))?;

    Ok(())
}

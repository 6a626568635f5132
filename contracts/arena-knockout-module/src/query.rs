use arena_bracket::{division_key, Category, Match};
use cosmwasm_std::{Deps, Order, StdResult, Uint128};
use cw_storage_plus::Bound;

use crate::{
    msg::ResyncReport,
    resync::plan_resync,
    state::{load_round, matches, Config, CONFIG},
};

const DEFAULT_LIMIT: u32 = 30;
const MAX_LIMIT: u32 = 100;

pub fn config(deps: Deps) -> StdResult<Config> {
    CONFIG.load(deps.storage)
}

pub fn match_info(deps: Deps, match_id: Uint128) -> StdResult<Match> {
    matches().load(deps.storage, match_id.u128())
}

pub fn round(
    deps: Deps,
    tournament_id: Uint128,
    category: Category,
    age_group: Option<String>,
    round_number: u32,
) -> StdResult<Vec<Match>> {
    let age_group = age_group.map(|x| x.trim().to_string());

    load_round(
        deps.storage,
        tournament_id.u128(),
        division_key(category, age_group.as_deref()),
        round_number,
    )
}

pub fn bracket(
    deps: Deps,
    tournament_id: Uint128,
    start_after: Option<Uint128>,
    limit: Option<u32>,
) -> StdResult<Vec<Match>> {
    let start_after_bound = start_after.map(|x| Bound::exclusive(x.u128()));
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;

    matches()
        .idx
        .tournament
        .prefix(tournament_id.u128())
        .range(deps.storage, start_after_bound, None, Order::Ascending)
        .take(limit)
        .map(|x| x.map(|y| y.1))
        .collect()
}

pub fn resync_preview(deps: Deps, tournament_id: Uint128) -> StdResult<ResyncReport> {
    let config = CONFIG.load(deps.storage)?;

    Ok(plan_resync(deps.storage, &config, tournament_id.u128())?.report)
}

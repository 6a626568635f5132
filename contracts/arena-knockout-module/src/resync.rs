use std::collections::{BTreeMap, BTreeSet, HashMap};

use arena_bracket::{
    locate_next_slot, next_round_number, recorded_winner, Match, Team, WinnerIdentity,
};
use cosmwasm_std::{Event, StdResult, Storage, Timestamp};
use itertools::Itertools;

use crate::{
    events,
    msg::{ResyncError, ResyncReport},
    state::{commit_match, load_tournament, Config},
    ContractError,
};

/// Outcome of a resync pass before it is saved
pub struct ResyncPlan {
    pub report: ResyncReport,
    pub events: Vec<Event>,
    /// Tournament matches with the corrections applied
    working: BTreeMap<u128, Match>,
    touched: BTreeSet<u128>,
}

/// Bracket rounds keyed by (division, round number), match ids in bracket order
type RoundIds = HashMap<(String, u32), Vec<u128>>;

/// Recomputes the next-round slot of every finished match in the tournament.
///
/// Corrections are applied to an in-memory copy in (round, match) order, so a repaired
/// slot is already visible when the match it feeds is examined later in the pass. Byes
/// are not cascaded; a subsequent completion or resync picks them up.
pub fn plan_resync(
    storage: &dyn Storage,
    config: &Config,
    tournament_id: u128,
) -> StdResult<ResyncPlan> {
    let matches = load_tournament(storage, tournament_id)?;

    let rounds: RoundIds = matches
        .iter()
        .sorted_by_key(|x| x.match_number)
        .map(|x| ((x.division(), x.round_number), x.id.u128()))
        .into_group_map();

    let finished = matches
        .iter()
        .filter(|x| x.status.is_finished() && x.winner_team.is_some())
        .sorted_by_key(|x| (x.round_number, x.match_number, x.division(), x.id))
        .map(|x| x.id.u128())
        .collect_vec();

    let mut plan = ResyncPlan {
        report: ResyncReport {
            total_completed: finished.len() as u32,
            ..ResyncReport::default()
        },
        events: vec![],
        working: matches.into_iter().map(|x| (x.id.u128(), x)).collect(),
        touched: BTreeSet::new(),
    };

    for id in finished {
        let current = match plan.working.get(&id) {
            Some(current) => current.clone(),
            None => continue,
        };

        match expected_slot(&plan.working, &rounds, config, &current) {
            Ok(Some((next_id, team, winner))) => {
                if let Some(next) = plan.working.get_mut(&next_id) {
                    let (primary, partner) = winner.slots();
                    next.set_side(team, primary, partner);

                    plan.events
                        .push(events::resync_corrected(&current, next, team));
                    plan.touched.insert(next_id);
                    plan.report.updated += 1;
                }
            }
            Ok(None) => {}
            Err(err) => {
                let error = ResyncError {
                    match_id: current.id,
                    round_number: current.round_number,
                    match_number: current.match_number,
                    error: err.to_string(),
                };
                plan.events.push(events::resync_errored(&error));
                plan.report.errors.push(error);
            }
        }
    }

    Ok(plan)
}

/// Runs a resync pass and saves every corrected match
pub fn resync(
    storage: &mut dyn Storage,
    config: &Config,
    now: Timestamp,
    tournament_id: u128,
) -> Result<(ResyncReport, Vec<Event>), ContractError> {
    let ResyncPlan {
        report,
        mut events,
        mut working,
        touched,
    } = plan_resync(storage, config, tournament_id)?;

    for id in touched {
        if let Some(match_) = working.get_mut(&id) {
            commit_match(storage, match_, now)?;
        }
    }

    events.push(events::resync_completed(tournament_id.into(), &report));

    Ok((report, events))
}

/// The slot `current` should have written, or `None` if it is terminal or already in place
fn expected_slot(
    working: &BTreeMap<u128, Match>,
    rounds: &RoundIds,
    config: &Config,
    current: &Match,
) -> Result<Option<(u128, Team, WinnerIdentity)>, ContractError> {
    let team = match current.winner_team {
        Some(team) if !current.is_terminal(config.terminal_rounds.as_slice()) => team,
        _ => return Ok(None),
    };
    // Slots repaired earlier in the pass must still hold the recorded winner
    let winner = recorded_winner(current, team)?;

    let round = round_matches(working, rounds, current.division(), current.round_number);
    let next_round = round_matches(
        working,
        rounds,
        current.division(),
        next_round_number(current.round_number)?,
    );

    let slot = match locate_next_slot(
        current,
        &round,
        &next_round,
        config.terminal_rounds.as_slice(),
    )? {
        Some(slot) => slot,
        None => return Ok(None),
    };

    let next = slot.next_match;
    if winner.occupies(next.primary(slot.team), next.partner(slot.team)) {
        return Ok(None);
    }

    Ok(Some((next.id.u128(), slot.team, winner)))
}

fn round_matches(
    working: &BTreeMap<u128, Match>,
    rounds: &RoundIds,
    division: String,
    round_number: u32,
) -> Vec<Match> {
    rounds
        .get(&(division, round_number))
        .map(|ids| {
            ids.iter()
                .filter_map(|id| working.get(id).cloned())
                .collect()
        })
        .unwrap_or_default()
}

use std::collections::VecDeque;

use arena_bracket::{
    locate_next_slot, next_round_number, resolve_side, BracketError, CompletionType, Match,
    MatchStatus, Score, Slot, Team, WinnerIdentity,
};
use cosmwasm_std::{Event, Storage, Timestamp};

use crate::{
    events,
    msg::{PropagationResult, PropagationStep, StepOutcome},
    state::{commit_match, load_match, load_round, ByeDetection, Config},
    ContractError,
};

pub const BYE_REASON: &str = "bye";

pub struct Propagation {
    pub result: PropagationResult,
    pub events: Vec<Event>,
}

/// Result of advancing a single winner by one round
struct Advance {
    outcome: StepOutcome,
    /// Set when the next match was auto-completed as a bye and must advance in turn
    cascade: Option<(Match, WinnerIdentity)>,
}

impl Advance {
    fn settled(outcome: StepOutcome) -> Self {
        Advance {
            outcome,
            cascade: None,
        }
    }
}

/// Writes `winner` of `completed` into the next round and walks any byes it uncovers.
///
/// Every cascade step moves at least one round forward, so the number of steps is
/// bounded by the number of rounds in the bracket.
pub fn propagate(
    storage: &mut dyn Storage,
    config: &Config,
    now: Timestamp,
    completed: &Match,
    winner: WinnerIdentity,
) -> Result<Propagation, ContractError> {
    let mut result = PropagationResult::default();
    let mut events = vec![events::propagation_started(completed, &winner)];

    let mut pending = VecDeque::from([(completed.clone(), winner)]);
    let mut last_round: Option<u32> = None;

    while let Some((current, winner)) = pending.pop_front() {
        if let Some(previous) = last_round {
            if current.round_number <= previous {
                return Err(BracketError::RoundDidNotAdvance {
                    round_number: previous,
                    next_round_number: current.round_number,
                }
                .into());
            }
        }
        last_round = Some(current.round_number);

        let advance = advance_winner(storage, config, now, &current, &winner)?;
        let step = PropagationStep {
            match_id: current.id,
            outcome: advance.outcome,
        };
        events.push(events::propagation_step(&step));
        result.steps.push(step);

        if let Some((next, next_winner)) = advance.cascade {
            events.push(events::bye_walkover(&next, &next_winner));
            pending.push_back((next, next_winner));
        }
    }

    events.push(events::propagation_completed(completed.id, &result));

    Ok(Propagation { result, events })
}

fn advance_winner(
    storage: &mut dyn Storage,
    config: &Config,
    now: Timestamp,
    current: &Match,
    winner: &WinnerIdentity,
) -> Result<Advance, ContractError> {
    if current.is_terminal(config.terminal_rounds.as_slice()) {
        return Ok(Advance::settled(StepOutcome::Terminal {}));
    }

    let tournament_id = current.tournament_id.u128();
    let round = load_round(
        storage,
        tournament_id,
        current.division(),
        current.round_number,
    )?;
    let next_round = load_round(
        storage,
        tournament_id,
        current.division(),
        next_round_number(current.round_number)?,
    )?;

    let (mut next, team) = match locate_next_slot(
        current,
        &round,
        &next_round,
        config.terminal_rounds.as_slice(),
    )? {
        Some(slot) => (slot.next_match.clone(), slot.team),
        None => return Ok(Advance::settled(StepOutcome::NoNextRound {})),
    };

    if winner.occupies(next.primary(team), next.partner(team)) {
        return Ok(Advance::settled(StepOutcome::AlreadyAdvanced {
            next_match_id: next.id,
        }));
    }

    let (primary, partner) = winner.slots();
    next.set_side(team, primary, partner);
    commit_match(storage, &mut next, now)?;

    // Decide on a fresh read, the write above is already visible to other readers
    let mut next = load_match(storage, next.id.u128())?;
    let cascade = match bye_winner(&next, config.bye_detection) {
        Some(bye_team) => {
            let bye_identity = resolve_side(&next, bye_team)?;
            complete_as_bye(&mut next, &bye_identity, config, now);
            commit_match(storage, &mut next, now)?;
            Some((next.clone(), bye_identity))
        }
        None => None,
    };

    Ok(Advance {
        outcome: StepOutcome::Advanced {
            next_match_id: next.id,
            team,
            bye_walkover: cascade.is_some(),
        },
        cascade,
    })
}

/// The side that wins `match_` by default because its opponent is a bye
pub fn bye_winner(match_: &Match, detection: ByeDetection) -> Option<Team> {
    if match_.status.is_finished() || match_.status == MatchStatus::Cancelled {
        return None;
    }

    let is_bye = |slot: &Slot| match detection {
        ByeDetection::Explicit => slot.is_bye,
        ByeDetection::Sentinel => slot.is_bye || slot.is_tbd(),
    };

    match (match_.player1.is_resolved(), match_.player2.is_resolved()) {
        (true, false) if is_bye(&match_.player2) => Some(Team::Team1),
        (false, true) if is_bye(&match_.player1) => Some(Team::Team2),
        _ => None,
    }
}

/// Copies the winner identity onto the match record
pub fn record_winner(match_: &mut Match, winner: &WinnerIdentity) {
    match_.winner_team = Some(winner.team);
    match_.winner_id = winner.primary_id();
    match_.winner_ids = winner.ids();
    match_.winner_name = Some(winner.name.clone());
}

fn complete_as_bye(match_: &mut Match, winner: &WinnerIdentity, config: &Config, now: Timestamp) {
    record_winner(match_, winner);
    match_.status = MatchStatus::Completed;
    match_.completion_type = Some(CompletionType::Walkover);
    match_.completion_reason = Some(BYE_REASON.to_string());
    match_.score = Some(Score::sweep(winner.team, &config.bye_score));
    match_.completed_at = Some(now);
}

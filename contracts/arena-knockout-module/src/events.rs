use arena_bracket::{Match, Team, WinnerIdentity};
use cosmwasm_std::{Event, Uint128};

use crate::msg::{PropagationResult, PropagationStep, ResyncError, ResyncReport, StepOutcome};

pub const PROPAGATION_EVENT: &str = "bracket_propagation";
pub const RESYNC_EVENT: &str = "bracket_resync";

pub fn propagation_started(match_: &Match, winner: &WinnerIdentity) -> Event {
    Event::new(PROPAGATION_EVENT)
        .add_attribute("stage", "started")
        .add_attribute("match_id", match_.id)
        .add_attribute("position", match_.label())
        .add_attribute("winner", &winner.name)
}

pub fn propagation_step(step: &PropagationStep) -> Event {
    let event = Event::new(PROPAGATION_EVENT).add_attribute("match_id", step.match_id);

    match &step.outcome {
        StepOutcome::Terminal {} => event
            .add_attribute("stage", "skipped")
            .add_attribute("reason", "terminal_round"),
        StepOutcome::NoNextRound {} => event
            .add_attribute("stage", "skipped")
            .add_attribute("reason", "no_next_round"),
        StepOutcome::AlreadyAdvanced { next_match_id } => event
            .add_attribute("stage", "skipped")
            .add_attribute("reason", "already_advanced")
            .add_attribute("next_match_id", *next_match_id),
        StepOutcome::Advanced {
            next_match_id,
            team,
            bye_walkover,
        } => event
            .add_attribute("stage", "advanced")
            .add_attribute("next_match_id", *next_match_id)
            .add_attribute("team", team.to_string())
            .add_attribute("bye_walkover", bye_walkover.to_string()),
    }
}

pub fn bye_walkover(match_: &Match, winner: &WinnerIdentity) -> Event {
    Event::new(PROPAGATION_EVENT)
        .add_attribute("stage", "bye_walkover")
        .add_attribute("match_id", match_.id)
        .add_attribute("position", match_.label())
        .add_attribute("winner", &winner.name)
}

pub fn propagation_completed(match_id: Uint128, result: &PropagationResult) -> Event {
    Event::new(PROPAGATION_EVENT)
        .add_attribute("stage", "completed")
        .add_attribute("match_id", match_id)
        .add_attribute("steps", result.steps.len().to_string())
        .add_attribute("bye_walkovers", result.bye_walkovers().len().to_string())
}

pub fn resync_corrected(match_: &Match, next_match: &Match, team: Team) -> Event {
    Event::new(RESYNC_EVENT)
        .add_attribute("stage", "corrected")
        .add_attribute("match_id", match_.id)
        .add_attribute("next_match_id", next_match.id)
        .add_attribute("team", team.to_string())
}

pub fn resync_errored(error: &ResyncError) -> Event {
    Event::new(RESYNC_EVENT)
        .add_attribute("stage", "errored")
        .add_attribute("match_id", error.match_id)
        .add_attribute("round_number", error.round_number.to_string())
        .add_attribute("match_number", error.match_number.to_string())
        .add_attribute("error", &error.error)
}

pub fn resync_completed(tournament_id: Uint128, report: &ResyncReport) -> Event {
    Event::new(RESYNC_EVENT)
        .add_attribute("stage", "completed")
        .add_attribute("tournament_id", tournament_id)
        .add_attribute("total_completed", report.total_completed.to_string())
        .add_attribute("updated", report.updated.to_string())
        .add_attribute("errors", report.errors.len().to_string())
}

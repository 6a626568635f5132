use std::collections::HashSet;

use arena_bracket::{
    division_key, resolve_winner, CompletionType, Match, MatchStatus, Score, WinnerIdentity,
    WinnerSpec,
};
use cosmwasm_std::{to_json_binary, DepsMut, Env, Response, Storage, Uint128};

use crate::{
    msg::{CompletionResponse, NewMatch, PropagationResult},
    progression::{propagate, record_winner},
    resync::resync,
    state::{
        commit_match, load_match, load_round, matches, ByeDetection, Config, CONFIG, MATCH_COUNT,
    },
    ContractError,
};

pub fn update_config(
    deps: DepsMut,
    terminal_rounds: Option<Vec<String>>,
    bye_score: Option<Vec<u32>>,
    bye_detection: Option<ByeDetection>,
) -> Result<Response, ContractError> {
    let config = CONFIG.update(deps.storage, |mut config| -> Result<_, ContractError> {
        if let Some(terminal_rounds) = terminal_rounds {
            config.terminal_rounds = terminal_rounds;
        }
        if let Some(bye_score) = bye_score {
            config.bye_score = bye_score;
        }
        if let Some(bye_detection) = bye_detection {
            config.bye_detection = bye_detection;
        }

        validate_config(&config)?;
        Ok(config)
    })?;

    Ok(Response::new()
        .add_attribute("action", "update_config")
        .add_attribute("terminal_rounds", config.terminal_rounds.join(","))
        .add_attribute("bye_detection", format!("{:?}", config.bye_detection)))
}

pub fn validate_config(config: &Config) -> Result<(), ContractError> {
    if config.terminal_rounds.iter().any(|x| x.trim().is_empty()) {
        return Err(ContractError::validation(
            "Terminal round labels cannot be empty",
        ));
    }
    if config.bye_score.is_empty() {
        return Err(ContractError::validation(
            "The bye score needs at least one game",
        ));
    }

    Ok(())
}

pub fn create_matches(
    deps: DepsMut,
    env: Env,
    new_matches: Vec<NewMatch>,
) -> Result<Response, ContractError> {
    if new_matches.is_empty() {
        return Err(ContractError::validation("No matches were provided"));
    }

    let mut match_count = MATCH_COUNT.may_load(deps.storage)?.unwrap_or_default();
    let first_id = match_count + Uint128::one();
    let mut seen = HashSet::new();

    for new_match in new_matches {
        validate_new_match(&new_match)?;

        let age_group = new_match
            .age_group
            .map(|x| x.trim().to_string())
            .filter(|x| !x.is_empty());
        let division = division_key(new_match.category, age_group.as_deref());
        let tournament_id = new_match.tournament_id.u128();

        let is_new = seen.insert((
            tournament_id,
            division.clone(),
            new_match.round_number,
            new_match.match_number,
        ));
        let exists = load_round(
            deps.storage,
            tournament_id,
            division.clone(),
            new_match.round_number,
        )?
        .iter()
        .any(|x| x.match_number == new_match.match_number);
        if !is_new || exists {
            return Err(ContractError::validation(format!(
                "Match {} of round {} already exists in {}",
                new_match.match_number, new_match.round_number, division
            )));
        }

        match_count += Uint128::one();
        matches().save(
            deps.storage,
            match_count.u128(),
            &Match {
                id: match_count,
                tournament_id: new_match.tournament_id,
                category: new_match.category,
                age_group,
                round: new_match.round.trim().to_string(),
                round_number: new_match.round_number,
                match_number: new_match.match_number,
                player1: new_match.player1,
                player2: new_match.player2,
                player3: new_match.player3,
                player4: new_match.player4,
                status: MatchStatus::Scheduled,
                winner_team: None,
                winner_id: None,
                winner_ids: vec![],
                winner_name: None,
                completion_type: None,
                completion_reason: None,
                score: None,
                created_at: env.block.time,
                updated_at: env.block.time,
                started_at: None,
                completed_at: None,
                version: 0,
            },
        )?;
    }

    MATCH_COUNT.save(deps.storage, &match_count)?;

    Ok(Response::new()
        .add_attribute("action", "create_matches")
        .add_attribute("first_match_id", first_id)
        .add_attribute("last_match_id", match_count))
}

fn validate_new_match(new_match: &NewMatch) -> Result<(), ContractError> {
    if new_match.round_number == 0 || new_match.match_number == 0 {
        return Err(ContractError::validation(
            "Round and match numbers start at 1",
        ));
    }
    if new_match.round.trim().is_empty() {
        return Err(ContractError::validation("A round label is required"));
    }

    let has_partners = new_match.player3.is_some() && new_match.player4.is_some();
    let has_any_partner = new_match.player3.is_some() || new_match.player4.is_some();
    if new_match.category.is_team() && !has_partners {
        return Err(ContractError::validation(format!(
            "{} matches need player3 and player4",
            new_match.category
        )));
    }
    if !new_match.category.is_team() && has_any_partner {
        return Err(ContractError::validation(
            "Singles matches cannot have partners",
        ));
    }

    Ok(())
}

pub fn start_match(deps: DepsMut, env: Env, match_id: Uint128) -> Result<Response, ContractError> {
    let mut match_ = load_match(deps.storage, match_id.u128())?;

    if match_.status != MatchStatus::Scheduled {
        return Err(ContractError::validation(format!(
            "Match {} is {}",
            match_id, match_.status
        )));
    }
    ensure_populated(&match_)?;

    match_.status = MatchStatus::InProgress;
    match_.started_at = Some(env.block.time);
    commit_match(deps.storage, &mut match_, env.block.time)?;

    Ok(Response::new()
        .add_attribute("action", "start_match")
        .add_attribute("match_id", match_id))
}

pub fn complete_match(
    deps: DepsMut,
    env: Env,
    match_id: Uint128,
    winner: WinnerSpec,
    score: Score,
) -> Result<Response, ContractError> {
    validate_score(&score)?;

    let mut match_ = load_match(deps.storage, match_id.u128())?;
    ensure_not_cancelled(&match_)?;
    ensure_populated(&match_)?;

    let identity = resolve_winner(&match_, &winner)?;
    let first_completion = !match_.status.is_finished();

    record_winner(&mut match_, &identity);
    match_.status = MatchStatus::Completed;
    match_.completion_type = Some(CompletionType::Normal);
    match_.completion_reason = None;
    match_.score = Some(score);
    if first_completion {
        match_.completed_at = Some(env.block.time);
    }
    commit_match(deps.storage, &mut match_, env.block.time)?;

    finish_result(
        deps.storage,
        env,
        match_,
        identity,
        first_completion,
        "complete_match",
    )
}

#[allow(clippy::too_many_arguments)]
pub fn declare_winner(
    deps: DepsMut,
    env: Env,
    match_id: Uint128,
    winner: WinnerSpec,
    reason: CompletionType,
    note: Option<String>,
    score: Option<Score>,
) -> Result<Response, ContractError> {
    if reason == CompletionType::Normal {
        return Err(ContractError::validation(
            "A declared winner needs a reason other than normal",
        ));
    }
    if let Some(score) = &score {
        validate_score(score)?;
    }

    let mut match_ = load_match(deps.storage, match_id.u128())?;
    ensure_not_cancelled(&match_)?;

    let identity = resolve_winner(&match_, &winner)?;
    let first_completion = !match_.status.is_finished();

    record_winner(&mut match_, &identity);
    match_.status = if reason == CompletionType::Walkover {
        MatchStatus::Walkover
    } else {
        MatchStatus::Completed
    };
    match_.completion_type = Some(reason);
    match_.completion_reason = note
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty());
    match_.score = score;
    if first_completion {
        match_.completed_at = Some(env.block.time);
    }
    commit_match(deps.storage, &mut match_, env.block.time)?;

    finish_result(
        deps.storage,
        env,
        match_,
        identity,
        first_completion,
        "declare_winner",
    )
}

/// Advances the winner on first completion. Edits of a finished match are not propagated.
fn finish_result(
    storage: &mut dyn Storage,
    env: Env,
    match_: Match,
    winner: WinnerIdentity,
    first_completion: bool,
    action: &str,
) -> Result<Response, ContractError> {
    let (propagation, events) = if first_completion {
        let config = CONFIG.load(storage)?;
        let propagation = propagate(storage, &config, env.block.time, &match_, winner.clone())?;
        (propagation.result, propagation.events)
    } else {
        (PropagationResult::default(), vec![])
    };

    let response = CompletionResponse {
        match_id: match_.id,
        winner,
        propagated: first_completion,
        propagation,
    };

    Ok(Response::new()
        .add_attribute("action", action)
        .add_attribute("match_id", match_.id)
        .add_attribute("winner", &response.winner.name)
        .add_attribute("propagated", first_completion.to_string())
        .add_events(events)
        .set_data(to_json_binary(&response)?))
}

pub fn resync_fixtures(
    deps: DepsMut,
    env: Env,
    tournament_id: Uint128,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let (report, events) = resync(
        deps.storage,
        &config,
        env.block.time,
        tournament_id.u128(),
    )?;

    Ok(Response::new()
        .add_attribute("action", "resync_fixtures")
        .add_attribute("tournament_id", tournament_id)
        .add_attribute("total_completed", report.total_completed.to_string())
        .add_attribute("updated", report.updated.to_string())
        .add_attribute("errors", report.errors.len().to_string())
        .add_events(events)
        .set_data(to_json_binary(&report)?))
}

fn validate_score(score: &Score) -> Result<(), ContractError> {
    if score.team1.is_empty() || score.team1.len() != score.team2.len() {
        return Err(ContractError::validation(
            "Scores need the same non-zero number of games for both teams",
        ));
    }

    Ok(())
}

fn ensure_not_cancelled(match_: &Match) -> Result<(), ContractError> {
    if match_.status == MatchStatus::Cancelled {
        return Err(ContractError::validation(format!(
            "Match {} is cancelled",
            match_.id
        )));
    }

    Ok(())
}

fn ensure_populated(match_: &Match) -> Result<(), ContractError> {
    if !match_.player1.is_resolved() || !match_.player2.is_resolved() {
        return Err(ContractError::validation(format!(
            "Match {} is not populated yet",
            match_.id
        )));
    }

    Ok(())
}

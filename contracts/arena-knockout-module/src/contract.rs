#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult};
use cw2::{ensure_from_older_version, set_contract_version};
use cw_ownable::assert_owner;

use crate::{
    execute::{self, validate_config},
    msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg},
    query,
    state::{Config, CONFIG},
    ContractError,
};

pub(crate) const CONTRACT_NAME: &str = "crates.io:arena-knockout-module";
pub(crate) const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let owner = deps.api.addr_validate(&msg.owner)?;
    let ownership = cw_ownable::initialize_owner(deps.storage, deps.api, Some(owner.as_str()))?;

    let default_config = Config::default();
    let config = Config {
        terminal_rounds: msg
            .terminal_rounds
            .unwrap_or(default_config.terminal_rounds),
        bye_score: msg.bye_score.unwrap_or(default_config.bye_score),
        bye_detection: msg.bye_detection.unwrap_or(default_config.bye_detection),
    };
    validate_config(&config)?;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attributes(ownership.into_attributes()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    // Pending owners accept through UpdateOwnership
    if !matches!(msg, ExecuteMsg::UpdateOwnership(_)) {
        assert_owner(deps.storage, &info.sender)?;
    }

    match msg {
        ExecuteMsg::UpdateConfig {
            terminal_rounds,
            bye_score,
            bye_detection,
        } => execute::update_config(deps, terminal_rounds, bye_score, bye_detection),
        ExecuteMsg::CreateMatches { matches } => execute::create_matches(deps, env, matches),
        ExecuteMsg::StartMatch { match_id } => execute::start_match(deps, env, match_id),
        ExecuteMsg::CompleteMatch {
            match_id,
            winner,
            score,
        } => execute::complete_match(deps, env, match_id, winner, score),
        ExecuteMsg::DeclareWinner {
            match_id,
            winner,
            reason,
            note,
            score,
        } => execute::declare_winner(deps, env, match_id, winner, reason, note, score),
        ExecuteMsg::ResyncFixtures { tournament_id } => {
            execute::resync_fixtures(deps, env, tournament_id)
        }
        ExecuteMsg::UpdateOwnership(action) => {
            let ownership = cw_ownable::update_ownership(deps, &env.block, &info.sender, action)?;
            Ok(Response::new().add_attributes(ownership.into_attributes()))
        }
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_json_binary(&query::config(deps)?),
        QueryMsg::MatchInfo { match_id } => to_json_binary(&query::match_info(deps, match_id)?),
        QueryMsg::Round {
            tournament_id,
            category,
            age_group,
            round_number,
        } => to_json_binary(&query::round(
            deps,
            tournament_id,
            category,
            age_group,
            round_number,
        )?),
        QueryMsg::Bracket {
            tournament_id,
            start_after,
            limit,
        } => to_json_binary(&query::bracket(deps, tournament_id, start_after, limit)?),
        QueryMsg::ResyncPreview { tournament_id } => {
            to_json_binary(&query::resync_preview(deps, tournament_id)?)
        }
        QueryMsg::Ownership {} => to_json_binary(&cw_ownable::get_ownership(deps.storage)?),
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let _version = ensure_from_older_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::default())
}

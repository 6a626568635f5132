use arena_bracket::{Category, CompletionType, Score, Slot, Team, WinnerIdentity, WinnerSpec};
use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::Uint128;
use cw_ownable::{cw_ownable_execute, cw_ownable_query};

use crate::state::{ByeDetection, Config};

#[cw_serde]
pub struct InstantiateMsg {
    pub owner: String,
    pub terminal_rounds: Option<Vec<String>>,
    pub bye_score: Option<Vec<u32>>,
    pub bye_detection: Option<ByeDetection>,
}

#[cw_ownable_execute]
#[cw_serde]
#[derive(cw_orch::ExecuteFns)]
pub enum ExecuteMsg {
    UpdateConfig {
        terminal_rounds: Option<Vec<String>>,
        bye_score: Option<Vec<u32>>,
        bye_detection: Option<ByeDetection>,
    },
    /// Stores the output of bracket generation
    CreateMatches { matches: Vec<NewMatch> },
    StartMatch { match_id: Uint128 },
    /// Records a played result. Only the first completion advances the winner.
    CompleteMatch {
        match_id: Uint128,
        winner: WinnerSpec,
        score: Score,
    },
    /// Records a walkover, forfeit, disqualification, retirement or manual decision
    DeclareWinner {
        match_id: Uint128,
        winner: WinnerSpec,
        reason: CompletionType,
        note: Option<String>,
        score: Option<Score>,
    },
    /// Re-derives every next-round slot of a tournament from its finished matches
    ResyncFixtures { tournament_id: Uint128 },
}

#[cw_ownable_query]
#[cw_serde]
#[derive(QueryResponses, cw_orch::QueryFns)]
pub enum QueryMsg {
    #[returns(Config)]
    Config {},
    #[returns(arena_bracket::Match)]
    MatchInfo { match_id: Uint128 },
    #[returns(Vec<arena_bracket::Match>)]
    Round {
        tournament_id: Uint128,
        category: Category,
        age_group: Option<String>,
        round_number: u32,
    },
    #[returns(Vec<arena_bracket::Match>)]
    Bracket {
        tournament_id: Uint128,
        start_after: Option<Uint128>,
        limit: Option<u32>,
    },
    /// Runs a resync pass without saving it
    #[returns(ResyncReport)]
    ResyncPreview { tournament_id: Uint128 },
}

#[cw_serde]
pub enum MigrateMsg {
    FromCompatible {},
}

#[cw_serde]
pub struct NewMatch {
    pub tournament_id: Uint128,
    pub category: Category,
    pub age_group: Option<String>,
    pub round: String,
    pub round_number: u32,
    pub match_number: u32,
    pub player1: Slot,
    pub player2: Slot,
    pub player3: Option<Slot>,
    pub player4: Option<Slot>,
}

#[cw_serde]
pub struct CompletionResponse {
    pub match_id: Uint128,
    pub winner: WinnerIdentity,
    /// False when an already finished match was edited
    pub propagated: bool,
    pub propagation: PropagationResult,
}

#[cw_serde]
#[derive(Default)]
pub struct PropagationResult {
    pub steps: Vec<PropagationStep>,
}

impl PropagationResult {
    /// Matches auto-completed as byes during the cascade
    pub fn bye_walkovers(&self) -> Vec<Uint128> {
        self.steps
            .iter()
            .filter_map(|x| match x.outcome {
                StepOutcome::Advanced {
                    next_match_id,
                    bye_walkover: true,
                    ..
                } => Some(next_match_id),
                _ => None,
            })
            .collect()
    }
}

#[cw_serde]
pub struct PropagationStep {
    /// The finished match whose winner is being advanced
    pub match_id: Uint128,
    pub outcome: StepOutcome,
}

#[cw_serde]
pub enum StepOutcome {
    /// The match is in a terminal round
    Terminal {},
    /// The bracket has no further round
    NoNextRound {},
    /// The next-round slot already holds the winner
    AlreadyAdvanced { next_match_id: Uint128 },
    Advanced {
        next_match_id: Uint128,
        team: Team,
        bye_walkover: bool,
    },
}

#[cw_serde]
#[derive(Default)]
pub struct ResyncReport {
    pub total_completed: u32,
    pub updated: u32,
    pub errors: Vec<ResyncError>,
}

#[cw_serde]
pub struct ResyncError {
    pub match_id: Uint128,
    pub round_number: u32,
    pub match_number: u32,
    pub error: String,
}

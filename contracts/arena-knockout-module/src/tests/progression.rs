use arena_bracket::{
    resolve_winner, BracketError, Category, CompletionType, MatchStatus, Score, Slot, Team,
    WinnerSpec,
};
use cosmwasm_std::{
    from_json,
    testing::{mock_dependencies, mock_env},
    Addr, Timestamp, Uint128,
};
use cw_multi_test::{AppResponse, Executor};
use cw_ownable::OwnershipError;

use super::{new_match, player, setup, setup_with, singles_bracket};
use crate::{
    execute::create_matches,
    msg::{CompletionResponse, ExecuteMsg, PropagationStep, StepOutcome},
    progression::{bye_winner, propagate, BYE_REASON},
    state::{commit_match, load_match, ByeDetection, Config},
    ContractError,
};

const ENTRANTS: [&str; 8] = ["A", "B", "C", "D", "E", "F", "G", "H"];

fn has_stage(response: &AppResponse, stage: &str) -> bool {
    response.events.iter().any(|event| {
        event.ty == "wasm-bracket_propagation"
            && event
                .attributes
                .iter()
                .any(|attr| attr.key == "stage" && attr.value == stage)
    })
}

#[test]
fn test_round_one_winners_fill_round_two() {
    let mut context = setup();
    context.create(singles_bracket(&ENTRANTS));

    for (match_id, winner) in [(1, "a"), (2, "c"), (3, "e"), (4, "g")] {
        let response = context.complete(match_id, winner);
        assert!(response.propagated);
        assert!(response.propagation.bye_walkovers().is_empty());
    }

    let semi_one = context.query_match(5);
    assert_eq!(semi_one.player1, player("A"));
    assert_eq!(semi_one.player2, player("C"));
    assert_eq!(semi_one.status, MatchStatus::Scheduled);

    let semi_two = context.query_match(6);
    assert_eq!(semi_two.player1, player("E"));
    assert_eq!(semi_two.player2, player("G"));
    assert_eq!(semi_two.status, MatchStatus::Scheduled);

    context.complete(5, "c");
    context.complete(6, "e");

    let final_match = context.query_match(7);
    assert_eq!(final_match.player1, player("C"));
    assert_eq!(final_match.player2, player("E"));

    // The final feeds nothing
    let response = context.complete(7, "e");
    assert_eq!(
        response.propagation.steps,
        vec![PropagationStep {
            match_id: Uint128::new(7),
            outcome: StepOutcome::Terminal {},
        }]
    );
    assert_eq!(response.winner.name, "E");
}

#[test]
fn test_pending_feeder_is_not_a_bye() {
    let mut context = setup();
    context.create(singles_bracket(&ENTRANTS));

    let response = context.complete(1, "a");
    assert_eq!(
        response.propagation.steps,
        vec![PropagationStep {
            match_id: Uint128::one(),
            outcome: StepOutcome::Advanced {
                next_match_id: Uint128::new(5),
                team: Team::Team1,
                bye_walkover: false,
            },
        }]
    );

    let semi = context.query_match(5);
    assert_eq!(semi.player1, player("A"));
    assert_eq!(semi.player2, Slot::tbd());
    assert_eq!(semi.status, MatchStatus::Scheduled);
    assert!(semi.winner_team.is_none());
}

#[test]
fn test_sentinel_detection_treats_pending_feeder_as_bye() {
    let mut context = setup_with(Some(ByeDetection::Sentinel));
    context.create(singles_bracket(&["A", "B", "C", "D"]));

    let response = context.complete(1, "a");
    assert_eq!(
        response.propagation.bye_walkovers(),
        vec![Uint128::new(3)]
    );
    assert_eq!(
        response.propagation.steps.last().map(|x| x.outcome.clone()),
        Some(StepOutcome::Terminal {})
    );

    let final_match = context.query_match(3);
    assert_eq!(final_match.status, MatchStatus::Completed);
    assert_eq!(final_match.winner_id, Some("a".to_string()));
    assert_eq!(final_match.completion_reason, Some(BYE_REASON.to_string()));
}

#[test]
fn test_bye_cascade_across_rounds() {
    let mut context = setup();
    context.create(vec![
        new_match(Category::Singles, "Round 1", 1, 1, player("A"), player("B")),
        new_match(Category::Singles, "Quarter Final", 2, 1, Slot::tbd(), Slot::bye()),
        new_match(Category::Singles, "Semi Final", 3, 1, Slot::tbd(), Slot::bye()),
        new_match(Category::Singles, "Final", 4, 1, Slot::tbd(), player("E")),
    ]);

    let response = context
        .execute(&ExecuteMsg::CompleteMatch {
            match_id: Uint128::one(),
            winner: WinnerSpec::Team { team: Team::Team1 },
            score: Score {
                team1: vec![21, 19, 21],
                team2: vec![18, 21, 10],
            },
        })
        .unwrap();
    assert!(has_stage(&response, "started"));
    assert!(has_stage(&response, "bye_walkover"));
    assert!(has_stage(&response, "completed"));

    let completion: CompletionResponse = from_json(response.data.unwrap()).unwrap();
    assert_eq!(
        completion.propagation.bye_walkovers(),
        vec![Uint128::new(2), Uint128::new(3)]
    );
    assert_eq!(completion.propagation.steps.len(), 3);

    for match_id in [2, 3] {
        let bye = context.query_match(match_id);
        assert_eq!(bye.status, MatchStatus::Completed);
        assert_eq!(bye.completion_type, Some(CompletionType::Walkover));
        assert_eq!(bye.completion_reason, Some(BYE_REASON.to_string()));
        assert_eq!(bye.winner_team, Some(Team::Team1));
        assert_eq!(bye.winner_id, Some("a".to_string()));
        assert_eq!(
            bye.score,
            Some(Score {
                team1: vec![21, 0, 0],
                team2: vec![0, 0, 0],
            })
        );
    }

    let final_match = context.query_match(4);
    assert_eq!(final_match.player1, player("A"));
    assert_eq!(final_match.player2, player("E"));
    assert_eq!(final_match.status, MatchStatus::Scheduled);
}

#[test]
fn test_bye_on_first_side_walks_over_to_second() {
    let mut context = setup();
    context.create(vec![
        new_match(Category::Singles, "Round 1", 1, 1, player("C"), player("D")),
        new_match(Category::Singles, "Round 1", 1, 2, player("A"), player("B")),
        new_match(Category::Singles, "Semi Final", 2, 1, Slot::bye(), Slot::tbd()),
        new_match(Category::Singles, "Final", 3, 1, Slot::tbd(), player("E")),
    ]);

    let response = context.complete(2, "a");
    assert_eq!(
        response.propagation.steps,
        vec![
            PropagationStep {
                match_id: Uint128::new(2),
                outcome: StepOutcome::Advanced {
                    next_match_id: Uint128::new(3),
                    team: Team::Team2,
                    bye_walkover: true,
                },
            },
            PropagationStep {
                match_id: Uint128::new(3),
                outcome: StepOutcome::Advanced {
                    next_match_id: Uint128::new(4),
                    team: Team::Team1,
                    bye_walkover: false,
                },
            },
        ]
    );

    let bye = context.query_match(3);
    assert_eq!(bye.status, MatchStatus::Completed);
    assert_eq!(bye.completion_type, Some(CompletionType::Walkover));
    assert_eq!(bye.winner_team, Some(Team::Team2));
    assert_eq!(bye.winner_id, Some("a".to_string()));
    assert_eq!(bye.winner_name, Some("A".to_string()));
    assert_eq!(
        bye.score,
        Some(Score {
            team1: vec![0, 0, 0],
            team2: vec![21, 0, 0],
        })
    );

    let final_match = context.query_match(4);
    assert_eq!(final_match.player1, player("A"));
    assert_eq!(final_match.player2, player("E"));
    assert_eq!(final_match.status, MatchStatus::Scheduled);
}

#[test]
fn test_last_round_number_cannot_advance() {
    let mut context = setup();
    context.create(vec![new_match(
        Category::Singles,
        "Round X",
        u32::MAX,
        1,
        player("A"),
        player("B"),
    )]);

    let err = context
        .execute(&ExecuteMsg::CompleteMatch {
            match_id: Uint128::one(),
            winner: WinnerSpec::Team { team: Team::Team1 },
            score: Score {
                team1: vec![21],
                team2: vec![9],
            },
        })
        .unwrap_err();
    assert_eq!(
        err.root_cause().to_string(),
        ContractError::Indexing(BracketError::RoundOverflow {
            round_number: u32::MAX,
        })
        .to_string()
    );
    assert_eq!(context.query_match(1).status, MatchStatus::Scheduled);
}

#[test]
fn test_doubles_winner_carries_partner() {
    let mut context = setup();
    let mut semi = new_match(
        Category::Doubles,
        "Semi Final",
        1,
        1,
        player("P1"),
        player("P2"),
    );
    semi.player3 = Some(player("P3"));
    semi.player4 = Some(player("P4"));
    let mut other_semi = new_match(
        Category::Doubles,
        "Semi Final",
        1,
        2,
        player("Q1"),
        player("Q2"),
    );
    other_semi.player3 = Some(player("Q3"));
    other_semi.player4 = Some(player("Q4"));
    context.create(vec![
        semi,
        other_semi,
        new_match(Category::Doubles, "Final", 2, 1, Slot::tbd(), Slot::tbd()),
    ]);

    // Partners cannot be used to designate the winner
    let err = context
        .execute(&ExecuteMsg::CompleteMatch {
            match_id: Uint128::one(),
            winner: WinnerSpec::Player {
                winner_id: "p3".to_string(),
            },
            score: Score {
                team1: vec![21, 21],
                team2: vec![3, 4],
            },
        })
        .unwrap_err();
    assert!(err
        .root_cause()
        .to_string()
        .contains("Winner p3 does not play in match 1"));

    let response = context.complete(1, "p1");
    assert_eq!(response.winner.name, "P1 / P3");

    let completed = context.query_match(1);
    assert_eq!(completed.winner_name, Some("P1 / P3".to_string()));
    assert_eq!(
        completed.winner_ids,
        vec!["p1".to_string(), "p3".to_string()]
    );

    let final_match = context.query_match(3);
    assert_eq!(final_match.player1, player("P1"));
    assert_eq!(final_match.player3, Some(player("P3")));
    assert_eq!(final_match.player2, Slot::tbd());
    assert_eq!(final_match.player4, Some(Slot::tbd()));
}

#[test]
fn test_guest_winner_advances_by_name() {
    let mut context = setup();
    context.create(vec![
        new_match(Category::Singles, "Semi Final", 1, 1, Slot::guest("Walk In"), player("B")),
        new_match(Category::Singles, "Semi Final", 1, 2, player("C"), player("D")),
        new_match(Category::Singles, "Final", 2, 1, Slot::tbd(), Slot::tbd()),
    ]);

    context
        .execute(&ExecuteMsg::CompleteMatch {
            match_id: Uint128::one(),
            winner: WinnerSpec::Team { team: Team::Team1 },
            score: Score {
                team1: vec![21, 21],
                team2: vec![11, 9],
            },
        })
        .unwrap();

    let completed = context.query_match(1);
    assert_eq!(completed.winner_id, None);
    assert!(completed.winner_ids.is_empty());
    assert_eq!(completed.winner_name, Some("Walk In".to_string()));

    let final_match = context.query_match(3);
    assert_eq!(final_match.player1, Slot::guest("Walk In"));
}

#[test]
fn test_declared_winners() {
    let mut context = setup();
    context.create(singles_bracket(&ENTRANTS));

    // Normal results go through CompleteMatch
    let err = context
        .execute(&ExecuteMsg::DeclareWinner {
            match_id: Uint128::one(),
            winner: WinnerSpec::Team { team: Team::Team1 },
            reason: CompletionType::Normal,
            note: None,
            score: None,
        })
        .unwrap_err();
    assert_eq!(
        err.root_cause().to_string(),
        ContractError::validation("A declared winner needs a reason other than normal")
            .to_string()
    );

    context
        .execute(&ExecuteMsg::DeclareWinner {
            match_id: Uint128::one(),
            winner: WinnerSpec::Team { team: Team::Team2 },
            reason: CompletionType::Walkover,
            note: Some(" no show ".to_string()),
            score: None,
        })
        .unwrap();

    let walkover = context.query_match(1);
    assert_eq!(walkover.status, MatchStatus::Walkover);
    assert_eq!(walkover.completion_type, Some(CompletionType::Walkover));
    assert_eq!(walkover.completion_reason, Some("no show".to_string()));
    assert_eq!(walkover.score, None);
    assert_eq!(context.query_match(5).player1, player("B"));

    context
        .execute(&ExecuteMsg::DeclareWinner {
            match_id: Uint128::new(2),
            winner: WinnerSpec::Player {
                winner_id: "c".to_string(),
            },
            reason: CompletionType::Retired,
            note: None,
            score: Some(Score {
                team1: vec![21, 5],
                team2: vec![12, 2],
            }),
        })
        .unwrap();

    let retired = context.query_match(2);
    assert_eq!(retired.status, MatchStatus::Completed);
    assert_eq!(retired.completion_type, Some(CompletionType::Retired));
    assert_eq!(context.query_match(5).player2, player("C"));
}

#[test]
fn test_editing_a_result_does_not_propagate() {
    let mut context = setup();
    context.create(singles_bracket(&ENTRANTS));

    let first = context.complete(1, "a");
    assert!(first.propagated);
    let completed_at = context.query_match(1).completed_at;

    let edit = context.complete(1, "b");
    assert!(!edit.propagated);
    assert!(edit.propagation.steps.is_empty());

    let edited = context.query_match(1);
    assert_eq!(edited.winner_id, Some("b".to_string()));
    assert_eq!(edited.completed_at, completed_at);
    assert_eq!(context.query_match(5).player1, player("A"));
}

#[test]
fn test_failed_propagation_reverts_completion() {
    let mut context = setup();
    context.create(singles_bracket(&ENTRANTS)[..4].to_vec());
    // Round two is missing its second match
    context.create(vec![new_match(
        Category::Singles,
        "Semi Final",
        2,
        1,
        Slot::tbd(),
        Slot::tbd(),
    )]);

    let err = context
        .execute(&ExecuteMsg::CompleteMatch {
            match_id: Uint128::new(3),
            winner: WinnerSpec::Team { team: Team::Team1 },
            score: Score {
                team1: vec![21, 21],
                team2: vec![0, 0],
            },
        })
        .unwrap_err();
    assert_eq!(
        err.root_cause().to_string(),
        ContractError::not_found("Next match", "round 2 position 2").to_string()
    );

    let untouched = context.query_match(3);
    assert_eq!(untouched.status, MatchStatus::Scheduled);
    assert_eq!(untouched.version, 0);
}

#[test]
fn test_non_owner_cannot_complete() {
    let mut context = setup();
    context.create(singles_bracket(&ENTRANTS));

    let err = context
        .app
        .execute_contract(
            Addr::unchecked("stranger"),
            context.knockout.clone(),
            &ExecuteMsg::CompleteMatch {
                match_id: Uint128::one(),
                winner: WinnerSpec::Team { team: Team::Team1 },
                score: Score {
                    team1: vec![21],
                    team2: vec![0],
                },
            },
            &[],
        )
        .unwrap_err();
    assert_eq!(
        err.root_cause().to_string(),
        ContractError::OwnershipError(OwnershipError::NotOwner).to_string()
    );
}

#[test]
fn test_propagation_is_idempotent() {
    let mut deps = mock_dependencies();
    let now = Timestamp::from_seconds(1_000);
    let config = Config::default();
    create_matches(deps.as_mut(), mock_env(), singles_bracket(&["A", "B", "C", "D"])).unwrap();

    let completed = load_match(&deps.storage, 1).unwrap();
    let winner = resolve_winner(&completed, &WinnerSpec::Team { team: Team::Team2 }).unwrap();

    let first = propagate(&mut deps.storage, &config, now, &completed, winner.clone()).unwrap();
    assert_eq!(
        first.result.steps[0].outcome,
        StepOutcome::Advanced {
            next_match_id: Uint128::new(3),
            team: Team::Team1,
            bye_walkover: false,
        }
    );
    let after_first = load_match(&deps.storage, 3).unwrap();
    assert_eq!(after_first.player1, player("B"));

    let second = propagate(&mut deps.storage, &config, now, &completed, winner).unwrap();
    assert_eq!(
        second.result.steps[0].outcome,
        StepOutcome::AlreadyAdvanced {
            next_match_id: Uint128::new(3),
        }
    );
    assert_eq!(load_match(&deps.storage, 3).unwrap(), after_first);
}

#[test]
fn test_bye_winner_detection() {
    let mut deps = mock_dependencies();
    create_matches(
        deps.as_mut(),
        mock_env(),
        vec![new_match(
            Category::Singles,
            "Semi Final",
            1,
            1,
            player("A"),
            Slot::bye(),
        )],
    )
    .unwrap();
    let mut match_ = load_match(&deps.storage, 1).unwrap();

    assert_eq!(bye_winner(&match_, ByeDetection::Explicit), Some(Team::Team1));
    assert_eq!(bye_winner(&match_, ByeDetection::Sentinel), Some(Team::Team1));

    match_.player2 = Slot::tbd();
    assert_eq!(bye_winner(&match_, ByeDetection::Explicit), None);
    assert_eq!(bye_winner(&match_, ByeDetection::Sentinel), Some(Team::Team1));

    match_.player1 = Slot::bye();
    match_.player2 = player("B");
    assert_eq!(bye_winner(&match_, ByeDetection::Explicit), Some(Team::Team2));

    // Two byes have no winner
    match_.player2 = Slot::bye();
    assert_eq!(bye_winner(&match_, ByeDetection::Explicit), None);

    // Finished matches are never re-decided
    match_.player2 = player("B");
    match_.status = MatchStatus::Walkover;
    assert_eq!(bye_winner(&match_, ByeDetection::Explicit), None);
}

#[test]
fn test_stale_writes_conflict() {
    let mut deps = mock_dependencies();
    let now = Timestamp::from_seconds(5);
    create_matches(deps.as_mut(), mock_env(), singles_bracket(&["A", "B"])).unwrap();

    let mut fresh = load_match(&deps.storage, 1).unwrap();
    let mut stale = fresh.clone();

    fresh.status = MatchStatus::InProgress;
    commit_match(&mut deps.storage, &mut fresh, now).unwrap();
    assert_eq!(fresh.version, 1);
    assert_eq!(fresh.updated_at, now);

    stale.status = MatchStatus::Cancelled;
    let err = commit_match(&mut deps.storage, &mut stale, now).unwrap_err();
    assert_eq!(
        err,
        ContractError::VersionConflict {
            match_id: 1,
            expected: 0,
            found: 1,
        }
    );
    assert_eq!(
        load_match(&deps.storage, 1).unwrap().status,
        MatchStatus::InProgress
    );
}

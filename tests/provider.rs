use chrono::{DateTime, TimeZone, Utc};

use wc26_pool::demo_feed::{DEMO_TOURNAMENT_ID, DemoSource};
use wc26_pool::feed::handle_command;
use wc26_pool::prediction::PredictionStatus;
use wc26_pool::state::{AppState, Delta, FetchKind, ProviderCommand, Screen, apply_delta};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 14, 12, 0, 0).unwrap()
}

fn demo() -> DemoSource {
    DemoSource::new(7, now()).with_clock(now())
}

/// Run a command and feed every resulting delta into `state`.
fn run(source: &mut DemoSource, state: &mut AppState, cmd: ProviderCommand) -> Vec<Delta> {
    let deltas = handle_command(source, cmd);
    for delta in deltas.clone() {
        apply_delta(state, delta);
    }
    deltas
}

fn login(source: &mut DemoSource, state: &mut AppState, email: &str) {
    run(
        source,
        state,
        ProviderCommand::Login {
            email: email.to_string(),
            password: "secret".to_string(),
        },
    );
    let seq = state.issue_seq(FetchKind::Tournaments);
    run(source, state, ProviderCommand::FetchTournaments { seq });
    let seq = state.issue_seq(FetchKind::Matches);
    run(
        source,
        state,
        ProviderCommand::FetchMatches {
            seq,
            tournament_id: DEMO_TOURNAMENT_ID.to_string(),
        },
    );
}

#[test]
fn login_requires_credentials() {
    let mut source = demo();
    let mut state = AppState::new();
    let deltas = run(
        &mut source,
        &mut state,
        ProviderCommand::Login {
            email: "".to_string(),
            password: "x".to_string(),
        },
    );
    assert!(matches!(deltas.as_slice(), [Delta::AuthFailed(_)]));
    assert_eq!(state.screen, Screen::Auth);
    assert!(state.auth_error.is_some());
}

#[test]
fn login_loads_the_demo_tournament() {
    let mut source = demo();
    let mut state = AppState::new();
    login(&mut source, &mut state, "casey@example.com");

    assert_eq!(state.screen, Screen::Dashboard);
    assert_eq!(state.user.as_ref().map(|u| u.name.as_str()), Some("casey"));
    assert!(!state.is_admin());
    assert_eq!(state.current_tournament.as_deref(), Some(DEMO_TOURNAMENT_ID));
    assert_eq!(state.matches.len(), 24);
    assert!(!state.actual_tables.is_empty(), "played matches carry results");
    assert!(!state.is_loading());
}

#[test]
fn save_then_refresh_predictions() {
    let mut source = demo();
    let mut state = AppState::new();
    login(&mut source, &mut state, "casey@example.com");

    // Round four kicks off a day after `now`.
    state
        .edit_prediction("a4", wc26_pool::prediction::ScoreSide::Home, "2", now())
        .unwrap();
    state
        .edit_prediction("a4", wc26_pool::prediction::ScoreSide::Away, "1", now())
        .unwrap();
    let save = state.begin_save("a4", now()).expect("complete prediction");
    let deltas = run(&mut source, &mut state, save);
    assert!(matches!(deltas.as_slice(), [Delta::PredictionSaved { .. }]));
    assert_eq!(state.predictions["a4"].status, PredictionStatus::Saved);

    state.predictions.clear();
    let seq = state.issue_seq(FetchKind::Predictions);
    run(
        &mut source,
        &mut state,
        ProviderCommand::FetchPredictions {
            seq,
            tournament_id: DEMO_TOURNAMENT_ID.to_string(),
        },
    );
    assert_eq!(state.predictions["a4"].scoreline(), Some((2, 1)));
    assert_eq!(state.group_tables["Group A"].len(), 2);
}

#[test]
fn locked_save_is_rejected_by_the_backend() {
    let mut source = demo();
    let mut state = AppState::new();
    login(&mut source, &mut state, "casey@example.com");

    let deltas = handle_command(
        &mut source,
        ProviderCommand::SavePrediction {
            seq: 99,
            match_id: "a1".to_string(),
            home: 1,
            away: 0,
        },
    );
    let [Delta::PredictionFailed { message, seq, .. }] = deltas.as_slice() else {
        panic!("expected a failed save, got {deltas:?}");
    };
    assert_eq!(*seq, 99);
    assert!(message.contains("locked"));
}

#[test]
fn leaderboard_includes_the_player() {
    let mut source = demo();
    let mut state = AppState::new();
    login(&mut source, &mut state, "casey@example.com");

    let seq = state.issue_seq(FetchKind::Leaderboard);
    run(
        &mut source,
        &mut state,
        ProviderCommand::FetchLeaderboard {
            seq,
            tournament_id: DEMO_TOURNAMENT_ID.to_string(),
        },
    );
    assert_eq!(state.leaderboard.len(), 8);
    assert!(state.leaderboard.iter().any(|r| r.name == "casey"));
    assert_eq!(state.leaderboard[0].rank, 1);
    for pair in state.leaderboard.windows(2) {
        assert!(pair[0].grand_total >= pair[1].grand_total);
    }
}

#[test]
fn unknown_tournament_reports_fetch_failure() {
    let mut source = demo();
    let mut state = AppState::new();
    login(&mut source, &mut state, "casey@example.com");

    let seq = state.issue_seq(FetchKind::Matches);
    run(
        &mut source,
        &mut state,
        ProviderCommand::FetchMatches {
            seq,
            tournament_id: "nope".to_string(),
        },
    );
    assert_eq!(state.matches.len(), 24, "previous data is kept");
    assert!(state.data_error.as_deref().is_some_and(|e| e.contains("nope")));
}

#[test]
fn only_admins_finalize_results() {
    let mut source = demo();
    let mut state = AppState::new();
    login(&mut source, &mut state, "casey@example.com");
    let cmd = ProviderCommand::FinalizeResult {
        match_id: "b4".to_string(),
        home: 1,
        away: 1,
    };
    let deltas = run(&mut source, &mut state, cmd.clone());
    assert!(matches!(deltas.as_slice(), [Delta::ResultFailed { .. }]));

    let mut source = demo();
    let mut state = AppState::new();
    login(&mut source, &mut state, "admin@example.com");
    assert!(state.is_admin());
    run(&mut source, &mut state, cmd);
    let b4 = state.matches.iter().find(|m| m.id == "b4").unwrap();
    assert_eq!(b4.result.and_then(|r| r.final_score()), Some((1, 1)));
    assert!(state.actual_tables["Group B"].iter().any(|t| t.team == "Switzerland"));
}

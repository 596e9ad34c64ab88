use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{info, warn};

use crate::source::DataSource;
use crate::state::{Delta, FetchKind, ProviderCommand};

/// Run `source` on a worker thread. The thread exits once either channel closes.
pub fn spawn_provider<S>(
    source: S,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()>
where
    S: DataSource + 'static,
{
    thread::spawn(move || run_provider(source, &tx, &cmd_rx))
}

pub fn run_provider<S: DataSource>(
    mut source: S,
    tx: &Sender<Delta>,
    cmd_rx: &Receiver<ProviderCommand>,
) {
    while let Ok(cmd) = cmd_rx.recv() {
        for delta in handle_command(&mut source, cmd) {
            if tx.send(delta).is_err() {
                return;
            }
        }
    }
    info!("provider stopped");
}

/// Execute one command against the source and describe the outcome as deltas.
pub fn handle_command<S: DataSource>(source: &mut S, cmd: ProviderCommand) -> Vec<Delta> {
    match cmd {
        ProviderCommand::SetToken(token) => {
            source.set_token(token);
            Vec::new()
        }
        ProviderCommand::Login { email, password } => match source.login(&email, &password) {
            Ok(session) => {
                info!("logged in");
                vec![Delta::LoggedIn {
                    token: session.token,
                    user: session.user,
                }]
            }
            Err(err) => {
                warn!("login failed: {err:#}");
                vec![Delta::AuthFailed(format!("{err:#}"))]
            }
        },
        ProviderCommand::Register {
            name,
            email,
            password,
        } => match source.register(&name, &email, &password) {
            Ok(session) => {
                info!("registered");
                vec![Delta::LoggedIn {
                    token: session.token,
                    user: session.user,
                }]
            }
            Err(err) => {
                warn!("register failed: {err:#}");
                vec![Delta::AuthFailed(format!("{err:#}"))]
            }
        },
        ProviderCommand::FetchProfile => match source.profile() {
            Ok(user) => vec![Delta::SetProfile(user)],
            Err(err) => {
                warn!("profile fetch failed: {err:#}");
                vec![Delta::Log(format!("[WARN] Profile fetch failed: {err:#}"))]
            }
        },
        ProviderCommand::FetchTournaments { seq } => match source.tournaments() {
            Ok(tournaments) => vec![Delta::SetTournaments { seq, tournaments }],
            Err(err) => fetch_failed(FetchKind::Tournaments, seq, err),
        },
        ProviderCommand::FetchMatches { seq, tournament_id } => {
            match source.matches(&tournament_id) {
                Ok(matches) => {
                    info!(count = matches.len(), "matches loaded");
                    vec![Delta::SetMatches { seq, matches }]
                }
                Err(err) => fetch_failed(FetchKind::Matches, seq, err),
            }
        }
        ProviderCommand::FetchPredictions { seq, tournament_id } => {
            match source.predictions(&tournament_id) {
                Ok(predictions) => vec![Delta::SetPredictions { seq, predictions }],
                Err(err) => fetch_failed(FetchKind::Predictions, seq, err),
            }
        }
        ProviderCommand::FetchLeaderboard { seq, tournament_id } => {
            match source.leaderboard(&tournament_id) {
                Ok(rows) => vec![Delta::SetLeaderboard { seq, rows }],
                Err(err) => fetch_failed(FetchKind::Leaderboard, seq, err),
            }
        }
        ProviderCommand::SavePrediction {
            seq,
            match_id,
            home,
            away,
        } => match source.save_prediction(&match_id, home, away) {
            Ok(points) => {
                info!(match_id = %match_id, home, away, "prediction saved");
                vec![Delta::PredictionSaved {
                    match_id,
                    seq,
                    points,
                }]
            }
            Err(err) => {
                warn!(match_id = %match_id, "prediction save failed: {err:#}");
                vec![Delta::PredictionFailed {
                    match_id,
                    seq,
                    message: format!("{err:#}"),
                }]
            }
        },
        ProviderCommand::FinalizeResult {
            match_id,
            home,
            away,
        } => match source.finalize_result(&match_id, home, away) {
            Ok(()) => {
                info!(match_id = %match_id, home, away, "result finalized");
                vec![Delta::ResultFinalized {
                    match_id,
                    home,
                    away,
                }]
            }
            Err(err) => {
                warn!(match_id = %match_id, "finalize failed: {err:#}");
                vec![Delta::ResultFailed {
                    match_id,
                    message: format!("{err:#}"),
                }]
            }
        },
    }
}

fn fetch_failed(kind: FetchKind, seq: u64, err: anyhow::Error) -> Vec<Delta> {
    warn!(kind = kind.label(), seq, "fetch failed: {err:#}");
    vec![Delta::FetchFailed {
        kind,
        seq,
        message: format!("{err:#}"),
    }]
}

// src/scheduler.rs

use crate::orchestrator::{CaseReport, Orchestrator, PollOutcome};
use crate::status_board::StatusBoard;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Every tracked case failed to authenticate in the same cycle.
    #[error("authentication failed for every tracked case ({cases} case(s)); fix credentials and restart")]
    AuthenticationLost { cases: usize },
    #[error("poll cycle worker failed: {0}")]
    Join(String),
}

/// Runs a poll cycle immediately, then once per interval, until shutdown.
pub struct Scheduler {
    orchestrator: Arc<Orchestrator>,
    case_ids: Arc<Vec<String>>,
    interval: Duration,
    board: StatusBoard,
}

impl Scheduler {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        case_ids: Vec<String>,
        interval: Duration,
        board: StatusBoard,
    ) -> Self {
        Self {
            orchestrator,
            case_ids: Arc::new(case_ids),
            interval,
            board,
        }
    }

    /// Returns when `shutdown` flips to `true` (checked between cycles only)
    /// or when every case fails authentication in one cycle.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<(), SchedulerError> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    // Sender dropped: treat as shutdown.
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let reports = self.cycle().await?;
                    self.board.record(&reports);
                    log_summary(&reports);

                    if all_auth_failed(&reports) {
                        error!("authentication failed for every case, stopping");
                        return Err(SchedulerError::AuthenticationLost { cases: reports.len() });
                    }
                }
            }
        }

        info!("scheduler stopped");
        Ok(())
    }

    async fn cycle(&self) -> Result<Vec<CaseReport>, SchedulerError> {
        info!(cases = self.case_ids.len(), "polling cases");
        let orchestrator = Arc::clone(&self.orchestrator);
        let case_ids = Arc::clone(&self.case_ids);

        tokio::task::spawn_blocking(move || orchestrator.poll_once(&case_ids))
            .await
            .map_err(|e| SchedulerError::Join(e.to_string()))
    }
}

fn all_auth_failed(reports: &[CaseReport]) -> bool {
    !reports.is_empty() && reports.iter().all(|r| r.outcome.is_auth_failure())
}

fn log_summary(reports: &[CaseReport]) {
    let count = |pred: fn(&PollOutcome) -> bool| reports.iter().filter(|r| pred(&r.outcome)).count();
    info!(
        first = count(|o| matches!(o, PollOutcome::FirstObservation(_))),
        changed = count(|o| matches!(o, PollOutcome::Changed(..))),
        unchanged = count(|o| matches!(o, PollOutcome::Unchanged(_))),
        auth_failed = count(|o| matches!(o, PollOutcome::AuthFailure(_))),
        failed = count(|o| matches!(o, PollOutcome::TransientFailure(_))),
        "poll cycle finished"
    );
}

/// Flips the shutdown flag on Ctrl+C or SIGTERM.
pub async fn listen_for_shutdown(tx: watch::Sender<bool>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                error!(error = %e, "could not listen for SIGTERM, using Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("received shutdown signal, finishing current cycle");
    let _ = tx.send(true);
}

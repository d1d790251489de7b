//! View synchronizer: one scheduler loop that owns the fetch lifecycle
//!
//! All `FetchState` writes happen inside the loop; observers read through
//! a watch channel. Fetches run as subtasks tagged with a generation, and
//! a completion for a superseded generation is dropped on arrival, so a
//! late response for the previous place can never overwrite the current
//! one.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info, warn};

use crate::Result;
use crate::fetch::SnapshotSource;
use crate::models::{AirQuality, FetchState, Place, WeatherSnapshot};
use crate::timer::RefreshTimer;

/// Commands into the scheduler loop
enum Command {
    SetPlace(Place),
    Refetch,
    Hidden,
    Visible,
    Shutdown,
}

/// Completed fetch, tagged with the generation that started it
struct FetchOutcome {
    generation: u64,
    result: Result<(WeatherSnapshot, Option<AirQuality>)>,
}

/// Handle to the scheduler loop.
///
/// Starting the synchronizer kicks off the initial fetch and the
/// background refresh timer. Dropping the handle closes the command
/// channel, which stops the loop; `shutdown` does the same but waits
/// for the loop to finish.
pub struct ViewSynchronizer {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<FetchState>,
    handle: JoinHandle<()>,
}

impl ViewSynchronizer {
    /// Spawn the scheduler loop for a place.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        source: Arc<dyn SnapshotSource>,
        place: Place,
        refresh_interval: Duration,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (state_tx, state_rx) = watch::channel(FetchState::idle(place.clone()));

        let handle = tokio::spawn(run_loop(
            source,
            place,
            refresh_interval,
            command_rx,
            state_tx,
        ));

        Self {
            commands: command_tx,
            state: state_rx,
            handle,
        }
    }

    /// New receiver for observing state changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.state.clone()
    }

    /// Snapshot of the current state
    #[must_use]
    pub fn current_state(&self) -> FetchState {
        self.state.borrow().clone()
    }

    /// Switch to a new place: reset to a loading state and fetch
    pub async fn set_place(&self, place: Place) {
        self.send(Command::SetPlace(place)).await;
    }

    /// Fetch now with a visible loading indication
    pub async fn refetch(&self) {
        self.send(Command::Refetch).await;
    }

    /// Suspend background refresh while the view is not visible
    pub async fn hidden(&self) {
        self.send(Command::Hidden).await;
    }

    /// Resume with an immediate fetch and a restarted refresh timer
    pub async fn visible(&self) {
        self.send(Command::Visible).await;
    }

    /// Stop the loop and wait for it to finish
    pub async fn shutdown(self) {
        let Self {
            commands, handle, ..
        } = self;
        let _ = commands.send(Command::Shutdown).await;
        let _ = handle.await;
    }

    async fn send(&self, command: Command) {
        if self.commands.send(command).await.is_err() {
            debug!("Scheduler loop already stopped, command ignored");
        }
    }
}

async fn run_loop(
    source: Arc<dyn SnapshotSource>,
    mut place: Place,
    refresh_interval: Duration,
    mut commands: mpsc::Receiver<Command>,
    state: watch::Sender<FetchState>,
) {
    let (outcome_tx, mut outcomes) = mpsc::channel::<FetchOutcome>(8);
    let mut timer = RefreshTimer::new(refresh_interval);
    let mut generation: u64 = 0;

    info!("Starting view synchronizer for {}", place.label());
    state.send_modify(|s| s.loading = true);
    spawn_fetch(&source, &place, generation, &outcome_tx);
    timer.start();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::SetPlace(new_place)) => {
                    info!("Switching to {}", new_place.label());
                    place = new_place;
                    generation += 1;
                    let mut fresh = FetchState::idle(place.clone());
                    fresh.loading = true;
                    state.send_replace(fresh);
                    spawn_fetch(&source, &place, generation, &outcome_tx);
                    timer.reset();
                }
                Some(Command::Refetch) => {
                    generation += 1;
                    state.send_modify(|s| s.loading = true);
                    spawn_fetch(&source, &place, generation, &outcome_tx);
                    timer.reset();
                }
                Some(Command::Hidden) => {
                    debug!("View hidden, suspending background refresh");
                    timer.stop();
                }
                Some(Command::Visible) => {
                    debug!("View visible, fetching and restarting refresh");
                    generation += 1;
                    state.send_modify(|s| s.loading = true);
                    spawn_fetch(&source, &place, generation, &outcome_tx);
                    timer.start();
                }
                Some(Command::Shutdown) | None => break,
            },
            Some(outcome) = outcomes.recv() => {
                if outcome.generation != generation {
                    debug!("Discarding superseded fetch result");
                    continue;
                }
                apply_outcome(&state, outcome.result);
            }
            _ = time::sleep_until(timer.deadline()), if timer.is_running() => {
                timer.reset();
                generation += 1;
                debug!("Background refresh for {}", place.label());
                spawn_fetch(&source, &place, generation, &outcome_tx);
            }
        }
    }

    debug!("View synchronizer stopped");
}

/// Run one fetch as a subtask, reporting back into the loop.
///
/// The subtask is never cancelled; superseded results are filtered by
/// generation when they arrive.
fn spawn_fetch(
    source: &Arc<dyn SnapshotSource>,
    place: &Place,
    generation: u64,
    outcomes: &mpsc::Sender<FetchOutcome>,
) {
    let source = Arc::clone(source);
    let place = place.clone();
    let outcomes = outcomes.clone();
    tokio::spawn(async move {
        let result = source.fetch(&place).await;
        if outcomes
            .send(FetchOutcome { generation, result })
            .await
            .is_err()
        {
            debug!("Scheduler loop gone, dropping fetch result");
        }
    });
}

fn apply_outcome(
    state: &watch::Sender<FetchState>,
    result: Result<(WeatherSnapshot, Option<AirQuality>)>,
) {
    match result {
        Ok((snapshot, air_quality)) => {
            state.send_modify(|s| {
                s.snapshot = Some(snapshot);
                // A refresh without a reading keeps the last one; a place
                // switch already cleared it with the rest of the state
                if let Some(aq) = air_quality {
                    s.air_quality = Some(aq);
                }
                s.loading = false;
                s.error = None;
                s.last_updated = Some(Utc::now());
            });
        }
        Err(e) => {
            warn!("Fetch failed: {}", e);
            // A prior snapshot stays untouched; only the flags change
            state.send_modify(|s| {
                s.loading = false;
                s.error = Some(e.user_message());
            });
        }
    }
}

//! Async driver: one tokio task per session.
//!
//! The task owns the [`SessionController`] outright. Everything else talks
//! to it through a [`SessionHandle`]: commands go in over an mpsc channel,
//! snapshots come out over a `watch` channel, and a `CancellationToken`
//! stops it. The `select!` is biased so cancellation wins over commands,
//! and commands win over a timer fire that became ready at the same time.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::controller::{SessionController, SessionStatus, Snapshot};
use crate::observability::StopReason;
use crate::problem::ProblemSpec;

/// Capacity of the command channel.
const COMMAND_BUFFER: usize = 16;

/// Request sent to a running session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Suspend or resume tick delivery
    SetPaused(bool),
    /// Show or hide the solution
    SetShowSolution(bool),
    /// Return to tick 0
    Reset,
    /// Replace the problem
    SetProblem(ProblemSpec),
    /// Stop for good
    Teardown,
}

/// When the driver stops on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverOptions {
    /// Stop once the walkthrough completes or the problem is rejected
    pub stop_when_final: bool,
    /// Stop after this many ticks in one run
    pub max_ticks: Option<u64>,
}

/// Handle to a session task.
#[derive(Debug)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    snapshots: watch::Receiver<Snapshot>,
    cancel: CancellationToken,
    task: JoinHandle<StopReason>,
}

impl SessionHandle {
    /// Sends a command. Returns `false` if the session has already stopped.
    pub async fn send(&self, command: SessionCommand) -> bool {
        self.commands.send(command).await.is_ok()
    }

    /// Suspends or resumes tick delivery.
    pub async fn set_paused(&self, paused: bool) -> bool {
        self.send(SessionCommand::SetPaused(paused)).await
    }

    /// Returns the session to tick 0.
    pub async fn reset(&self) -> bool {
        self.send(SessionCommand::Reset).await
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// New receiver for snapshot updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Token that stops the session when cancelled.
    #[must_use]
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stops the session without waiting for it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the task to stop and returns why it did.
    pub async fn join(self) -> StopReason {
        match self.task.await {
            Ok(reason) => reason,
            Err(e) => {
                warn!(error = %e, "session task failed");
                StopReason::Cancelled
            }
        }
    }
}

/// Spawns `controller` on the current runtime.
#[must_use]
pub fn spawn(controller: SessionController, options: DriverOptions) -> SessionHandle {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());
    let cancel = CancellationToken::new();

    let task = tokio::spawn(run(
        controller,
        options,
        command_rx,
        snapshot_tx,
        cancel.clone(),
    ));

    SessionHandle {
        commands: command_tx,
        snapshots: snapshot_rx,
        cancel,
        task,
    }
}

async fn run(
    mut controller: SessionController,
    options: DriverOptions,
    mut commands: mpsc::Receiver<SessionCommand>,
    snapshots: watch::Sender<Snapshot>,
    cancel: CancellationToken,
) -> StopReason {
    let mut interval = controller.interval();
    let mut armed = false;

    let reason = loop {
        if let Some(reason) = finished(&controller, options) {
            break reason;
        }

        // A clock that was just started waits a full period before its
        // first tick instead of firing a stale one.
        let running = controller.is_running();
        if running && !armed {
            interval.reset();
        }
        armed = running;

        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                debug!("session cancelled");
                break StopReason::Cancelled;
            }
            command = commands.recv() => match command {
                None => break StopReason::Detached,
                Some(SessionCommand::Teardown) => break StopReason::TornDown,
                Some(command) => {
                    // A restart schedules its first tick a full period out.
                    if restarts(&command) {
                        armed = false;
                    }
                    apply(&mut controller, command);
                }
            },
            _ = interval.tick(), if running => {
                controller.on_timer_fire();
            }
        }

        snapshots.send_replace(controller.snapshot());
    };

    controller.teardown();
    snapshots.send_replace(controller.snapshot());
    info!(%reason, tick = controller.tick_state().current_tick, "session stopped");
    reason
}

fn apply(controller: &mut SessionController, command: SessionCommand) {
    debug!(?command, "session command");
    match command {
        SessionCommand::SetPaused(paused) => controller.set_paused(paused),
        SessionCommand::SetShowSolution(show) => controller.set_show_solution(show),
        SessionCommand::Reset => {
            controller.reset();
            controller.start();
        }
        SessionCommand::SetProblem(spec) => {
            if let Err(error) = controller.set_problem(&spec) {
                warn!(%error, kind = %spec.kind, "problem not replaced");
            }
        }
        SessionCommand::Teardown => controller.teardown(),
    }
}

const fn restarts(command: &SessionCommand) -> bool {
    matches!(
        command,
        SessionCommand::Reset | SessionCommand::SetProblem(_) | SessionCommand::SetShowSolution(true)
    )
}

fn finished(controller: &SessionController, options: DriverOptions) -> Option<StopReason> {
    if options.stop_when_final {
        match controller.status() {
            SessionStatus::Complete => return Some(StopReason::Completed),
            SessionStatus::Invalid => return Some(StopReason::Invalid),
            _ => {}
        }
    }
    options
        .max_ticks
        .filter(|max| controller.tick_state().current_tick >= *max)
        .map(|_| StopReason::TickLimit)
}

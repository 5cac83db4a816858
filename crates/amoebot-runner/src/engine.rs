//! Engine thread.
//!
//! Runs the scheduler off the console thread and steers it with commands
//! over channels, so a long `run` never blocks input handling. Updates flow
//! back over a bounded channel; when the consumer falls behind, the engine
//! waits at the next publish instead of piling up snapshots.

use amoebot_core::Scheduler;
use amoebot_snapshot::SystemSnapshot;
use std::sync::mpsc::{self, Receiver, Sender, SyncSender, TryRecvError};
use std::thread::{self, JoinHandle};

/// Bounded capacity of the update channel.
const UPDATE_BUFFER: usize = 64;

/// Commands accepted by the engine thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    /// Begin running rounds continuously.
    Start,
    /// Stop at the next round boundary.
    Stop,
    /// Execute exactly one round, even while stopped.
    Round,
    /// Run a fixed number of rounds, then stop.
    Run(u64),
    /// Report scheduler state.
    Status,
    /// Publish a snapshot of the current state.
    Snapshot,
    /// Leave the loop and hand the scheduler back.
    Shutdown,
}

/// Updates published by the engine thread.
#[derive(Debug)]
pub enum EngineUpdate {
    Started,
    Stopped,
    /// A single requested round finished; carries the new round count.
    RoundComplete(u64),
    /// A periodic or requested snapshot.
    Snapshot(Box<SystemSnapshot>),
    /// An activation faulted; the scheduler has stopped.
    Fault(String),
    Status {
        round: u64,
        running: bool,
        particles: usize,
    },
}

/// Handle to a running engine thread.
pub struct EngineHandle {
    commands: Sender<EngineCommand>,
    thread: JoinHandle<Scheduler>,
}

impl EngineHandle {
    /// Sends a command to the engine thread.
    pub fn command(&self, command: EngineCommand) -> Result<(), String> {
        self.commands
            .send(command)
            .map_err(|_| "engine thread is gone".to_string())
    }

    /// Shuts the engine down and returns the scheduler in its final state.
    pub fn shutdown(self) -> Result<Scheduler, String> {
        let _ = self.commands.send(EngineCommand::Shutdown);
        self.thread
            .join()
            .map_err(|_| "engine thread panicked".to_string())
    }
}

/// Moves the scheduler onto its own thread. Periodic snapshots are published
/// every `snapshot_interval` rounds while running; 0 disables them.
pub fn spawn_engine(
    scheduler: Scheduler,
    snapshot_interval: u64,
) -> (EngineHandle, Receiver<EngineUpdate>) {
    let (command_tx, command_rx) = mpsc::channel();
    let (update_tx, update_rx) = mpsc::sync_channel(UPDATE_BUFFER);
    let thread =
        thread::spawn(move || engine_loop(scheduler, command_rx, update_tx, snapshot_interval));
    (
        EngineHandle {
            commands: command_tx,
            thread,
        },
        update_rx,
    )
}

fn engine_loop(
    mut scheduler: Scheduler,
    commands: Receiver<EngineCommand>,
    updates: SyncSender<EngineUpdate>,
    snapshot_interval: u64,
) -> Scheduler {
    let mut remaining: Option<u64> = None;

    loop {
        // Block for a command while stopped; poll between rounds while
        // running so stop and shutdown take effect at round boundaries.
        let command = if scheduler.is_running() {
            match commands.try_recv() {
                Ok(command) => Some(command),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => break,
            }
        } else {
            match commands.recv() {
                Ok(command) => Some(command),
                Err(_) => break,
            }
        };

        if let Some(command) = command {
            tracing::debug!(?command, "engine command");
            match command {
                EngineCommand::Start => {
                    remaining = None;
                    scheduler.start();
                    let _ = updates.send(EngineUpdate::Started);
                }
                EngineCommand::Stop => {
                    remaining = None;
                    scheduler.stop();
                    let _ = updates.send(EngineUpdate::Stopped);
                }
                EngineCommand::Round => match scheduler.round() {
                    Ok(round) => {
                        let _ = updates.send(EngineUpdate::RoundComplete(round));
                    }
                    Err(report) => {
                        remaining = None;
                        let _ = updates.send(EngineUpdate::Fault(report.to_string()));
                    }
                },
                EngineCommand::Run(rounds) => {
                    // Zero rounds is a no-op, not an infinite run.
                    if rounds == 0 {
                        let _ = updates.send(EngineUpdate::Stopped);
                    } else {
                        remaining = Some(rounds);
                        scheduler.start();
                        let _ = updates.send(EngineUpdate::Started);
                    }
                }
                EngineCommand::Status => {
                    let _ = updates.send(EngineUpdate::Status {
                        round: scheduler.system().rounds(),
                        running: scheduler.is_running(),
                        particles: scheduler.system().particle_count(),
                    });
                }
                EngineCommand::Snapshot => {
                    let snapshot = scheduler.system().snapshot("requested");
                    let _ = updates.send(EngineUpdate::Snapshot(Box::new(snapshot)));
                }
                EngineCommand::Shutdown => break,
            }
            continue;
        }

        // Running with no pending command: advance one round.
        match scheduler.round() {
            Ok(round) => {
                if snapshot_interval > 0 && round % snapshot_interval == 0 {
                    let snapshot = scheduler.system().snapshot("periodic");
                    let _ = updates.send(EngineUpdate::Snapshot(Box::new(snapshot)));
                }
                if let Some(left) = remaining.as_mut() {
                    *left -= 1;
                    if *left == 0 {
                        remaining = None;
                        scheduler.stop();
                        let _ = updates.send(EngineUpdate::Stopped);
                    }
                }
            }
            Err(report) => {
                remaining = None;
                let _ = updates.send(EngineUpdate::Fault(report.to_string()));
            }
        }
    }

    scheduler
}

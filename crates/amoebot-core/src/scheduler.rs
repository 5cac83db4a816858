//! Activation Scheduler
//!
//! Drives execution by repeatedly activating particles under the
//! randomized-fair policy: each round activates every particle exactly once,
//! in a fresh uniformly random order, approximating fully asynchronous
//! execution. Activations are strictly serialized; nothing interleaves with
//! a running `activate`.

use crate::error::Error;
use crate::geometry::Node;
use crate::system::System;
use thiserror::Error;

/// Lifecycle state of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    #[default]
    Idle,
    Running,
    Stopped,
}

/// An unrecoverable fault raised by a particle's activation.
///
/// Reported with full particle context and halts the scheduler; the engine
/// never swallows or retries a faulted activation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{algorithm} particle at {head} faulted in round {round}: {source}")]
pub struct FaultReport {
    pub round: u64,
    pub head: Node,
    pub algorithm: String,
    pub source: Error,
}

/// Selects and activates particles, one at a time, and counts rounds.
pub struct Scheduler {
    system: System,
    state: SchedulerState,
}

impl Scheduler {
    pub fn new(system: System) -> Self {
        Self {
            system,
            state: SchedulerState::Idle,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    pub fn system(&self) -> &System {
        &self.system
    }

    pub fn into_system(self) -> System {
        self.system
    }

    /// Idle/Stopped -> Running.
    pub fn start(&mut self) {
        if self.state != SchedulerState::Running {
            self.state = SchedulerState::Running;
            tracing::info!(round = self.system.rounds(), "scheduler started");
        }
    }

    /// Running -> Stopped. Takes effect at a round boundary; an in-flight
    /// round driven by `round()` always completes.
    pub fn stop(&mut self) {
        if self.state == SchedulerState::Running {
            self.state = SchedulerState::Stopped;
            tracing::info!(round = self.system.rounds(), "scheduler stopped");
        }
    }

    /// Executes exactly one round: every particle activated once, in a fresh
    /// uniformly random order. Returns the new round count.
    ///
    /// A failed activation stops the scheduler and surfaces a
    /// [`FaultReport`] with the particle's context.
    pub fn round(&mut self) -> Result<u64, FaultReport> {
        let mut order: Vec<usize> = (0..self.system.particle_count()).collect();
        self.system.rng_mut().shuffle(&mut order);

        for index in order {
            if let Err(source) = self.system.activate(index) {
                let report = FaultReport {
                    round: self.system.rounds(),
                    head: self.system.body_of(index).head(),
                    algorithm: self.system.algorithm_name(index).to_string(),
                    source,
                };
                self.state = SchedulerState::Stopped;
                tracing::error!(%report, "activation fault, scheduler stopped");
                return Err(report);
            }
        }

        self.system.advance_round();
        tracing::debug!(round = self.system.rounds(), "round complete");
        Ok(self.system.rounds())
    }

    /// Starts the scheduler and runs `rounds` rounds, or fewer if a fault
    /// stops it early. Returns the total rounds completed.
    pub fn run(&mut self, rounds: u64) -> Result<u64, FaultReport> {
        self.start();
        for _ in 0..rounds {
            if !self.is_running() {
                break;
            }
            self.round()?;
        }
        Ok(self.system.rounds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::Activation;
    use crate::algorithm::Algorithm;
    use crate::geometry::Direction;

    /// Counts its own activations; faults on command.
    struct Counter {
        activations: u32,
        fault_at: Option<u32>,
    }

    impl Counter {
        fn new() -> Self {
            Self {
                activations: 0,
                fault_at: None,
            }
        }

        fn faulting_at(n: u32) -> Self {
            Self {
                activations: 0,
                fault_at: Some(n),
            }
        }
    }

    impl Algorithm for Counter {
        fn activate(&mut self, view: &mut Activation<'_>) -> Result<(), Error> {
            self.activations += 1;
            if self.fault_at == Some(self.activations) {
                // Provoke a real engine error: contract while contracted.
                view.contract_tail()?;
            }
            Ok(())
        }

        fn name(&self) -> &'static str {
            "counter"
        }
    }

    fn system_with_counters(n: i32) -> System {
        let mut system = System::new(11);
        for i in 0..n {
            system
                .insert_particle(Node::new(i, 0), Direction::new(0), Box::new(Counter::new()))
                .unwrap();
        }
        system
    }

    #[test]
    fn test_state_transitions() {
        let mut scheduler = Scheduler::new(system_with_counters(1));
        assert_eq!(scheduler.state(), SchedulerState::Idle);

        scheduler.start();
        assert!(scheduler.is_running());

        scheduler.stop();
        assert_eq!(scheduler.state(), SchedulerState::Stopped);

        // Stopped -> Running is allowed.
        scheduler.start();
        assert!(scheduler.is_running());
    }

    #[test]
    fn test_round_activates_every_particle_exactly_once() {
        let mut scheduler = Scheduler::new(system_with_counters(9));

        for expected in 1..=5u32 {
            scheduler.round().unwrap();
            let system = scheduler.system();
            for id in system.particle_ids().collect::<Vec<_>>() {
                let counter = system.algorithm_as::<Counter>(id).unwrap();
                assert_eq!(counter.activations, expected);
            }
        }
        assert_eq!(scheduler.system().rounds(), 5);
    }

    #[test]
    fn test_same_seed_schedulers_agree() {
        // The activation order comes from the seeded system RNG, so two
        // schedulers over identically built systems stay in lockstep.
        let mut a = Scheduler::new(system_with_counters(16));
        let mut b = Scheduler::new(system_with_counters(16));
        for _ in 0..3 {
            a.round().unwrap();
            b.round().unwrap();
        }
        assert_eq!(a.system().snapshot("round"), b.system().snapshot("round"));
    }

    #[test]
    fn test_fault_stops_scheduler_with_context() {
        let mut system = System::new(5);
        system
            .insert_particle(
                Node::new(0, 0),
                Direction::new(0),
                Box::new(Counter::new()),
            )
            .unwrap();
        system
            .insert_particle(
                Node::new(3, 3),
                Direction::new(0),
                Box::new(Counter::faulting_at(2)),
            )
            .unwrap();

        let mut scheduler = Scheduler::new(system);
        scheduler.start();
        scheduler.round().unwrap();

        let report = scheduler.round().unwrap_err();
        assert_eq!(report.round, 1);
        assert_eq!(report.head, Node::new(3, 3));
        assert_eq!(report.algorithm, "counter");
        assert_eq!(
            report.source,
            Error::InvalidContraction { head: Node::new(3, 3) }
        );
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }

    #[test]
    fn test_run_executes_requested_rounds() {
        let mut scheduler = Scheduler::new(system_with_counters(4));
        let rounds = scheduler.run(12).unwrap();
        assert_eq!(rounds, 12);
        assert!(scheduler.is_running());
    }

    #[test]
    fn test_scheduler_can_move_across_threads() {
        fn assert_send<T: Send>() {}
        assert_send::<Scheduler>();

        let scheduler = Scheduler::new(system_with_counters(2));
        let handle = std::thread::spawn(move || {
            let mut scheduler = scheduler;
            scheduler.run(3).unwrap();
            scheduler
        });
        let scheduler = handle.join().unwrap();
        assert_eq!(scheduler.system().rounds(), 3);
    }

    #[test]
    fn test_empty_system_round_still_counts() {
        let mut scheduler = Scheduler::new(System::new(0));
        assert_eq!(scheduler.round().unwrap(), 1);
    }
}

//! Amoebot Simulation Runner
//!
//! Builds a particle system from configuration, runs the scheduler for a
//! fixed number of rounds (or interactively via stdin commands), and writes
//! JSON snapshots along the way.

use amoebot_algs::{build_disco_system, build_energy_system};
use amoebot_core::Scheduler;
use amoebot_runner::config::{default_config_toml, AlgorithmKind, RunnerConfig};
use amoebot_runner::engine::{spawn_engine, EngineCommand, EngineUpdate};
use amoebot_runner::{output, parse_command, Command};
use clap::Parser;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Command line arguments for the runner
#[derive(Parser, Debug)]
#[command(name = "amoebot_sim")]
#[command(about = "An amoebot model simulation runner")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Number of rounds to simulate
    #[arg(long)]
    rounds: Option<u64>,

    /// Interval between snapshots (in rounds)
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Algorithm to run
    #[arg(long, value_enum)]
    algorithm: Option<AlgorithmKind>,

    /// Number of particles in the system
    #[arg(long)]
    particles: Option<usize>,

    /// Output directory for snapshots
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Read commands from stdin instead of running a fixed round count
    #[arg(long)]
    interactive: bool,

    /// Print a default configuration file and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if args.print_default_config {
        print!("{}", default_config_toml());
        return ExitCode::SUCCESS;
    }

    let mut config = match &args.config {
        Some(path) => match RunnerConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => RunnerConfig::default(),
    };

    // Command line flags win over the config file.
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(rounds) = args.rounds {
        config.simulation.rounds = rounds;
    }
    if let Some(interval) = args.snapshot_interval {
        config.simulation.snapshot_interval = interval;
    }
    if let Some(algorithm) = args.algorithm {
        config.simulation.algorithm = algorithm;
    }
    if let Some(particles) = args.particles {
        config.simulation.num_particles = particles;
    }
    if let Some(ref dir) = args.output_dir {
        config.simulation.output_dir = dir.display().to_string();
    }
    let output_dir = PathBuf::from(&config.simulation.output_dir);

    println!("Amoebot Simulation Engine");
    println!("=========================");
    println!("Seed: {}", config.simulation.seed);
    println!("Algorithm: {:?}", config.simulation.algorithm);
    println!("Particles: {}", config.simulation.num_particles);
    println!("Snapshot interval: {}", config.simulation.snapshot_interval);
    println!();

    println!("Creating system...");
    let system = match config.simulation.algorithm {
        AlgorithmKind::Disco => build_disco_system(
            config.simulation.seed,
            config.simulation.num_particles,
            config.disco.counter_max,
        ),
        AlgorithmKind::Energy => build_energy_system(
            config.simulation.seed,
            config.simulation.num_particles,
            config.energy.to_params(),
        ),
    };
    let system = match system {
        Ok(system) => system,
        Err(e) => {
            eprintln!("Error building system: {}", e);
            return ExitCode::FAILURE;
        }
    };
    println!(
        "  {} particles, {} objects",
        system.particle_count(),
        system.object_count()
    );

    let initial_snapshot = system.snapshot("simulation_start");
    if let Err(e) = output::write_snapshot_to_dir(&initial_snapshot, &output_dir) {
        eprintln!("  Warning: Could not write initial snapshot: {}", e);
    }
    if let Err(e) = output::write_current_state(&initial_snapshot, &output_dir) {
        eprintln!("  Warning: Could not write current state: {}", e);
    } else {
        println!("  Wrote initial snapshot (round 0)");
    }

    let scheduler = Scheduler::new(system);
    if args.interactive {
        run_interactive(scheduler, &config, &output_dir)
    } else {
        run_headless(scheduler, &config, &output_dir)
    }
}

/// Drive the scheduler for a fixed number of rounds on this thread.
fn run_headless(mut scheduler: Scheduler, config: &RunnerConfig, output_dir: &Path) -> ExitCode {
    let rounds = config.simulation.rounds;
    let interval = config.simulation.snapshot_interval;

    println!();
    println!("Starting simulation...");
    println!();

    scheduler.start();
    let mut faulted = false;
    for _ in 0..rounds {
        match scheduler.round() {
            Ok(round) => {
                if interval > 0 && round % interval == 0 {
                    let snapshot = scheduler.system().snapshot("periodic");
                    if let Err(e) = output::write_snapshot_to_dir(&snapshot, output_dir) {
                        eprintln!("Warning: Could not write snapshot at round {}: {}", round, e);
                    }
                    if let Err(e) = output::write_current_state(&snapshot, output_dir) {
                        eprintln!(
                            "Warning: Could not write current state at round {}: {}",
                            round, e
                        );
                    }
                }
                if round % 100 == 0 {
                    println!("Round {} / {}", round, rounds);
                }
            }
            Err(report) => {
                eprintln!("Simulation fault: {}", report);
                faulted = true;
                break;
            }
        }
    }

    let final_snapshot = scheduler.system().snapshot("simulation_end");
    if let Err(e) = output::write_snapshot_to_dir(&final_snapshot, output_dir) {
        eprintln!("Warning: Could not write final snapshot: {}", e);
    }
    if let Err(e) = output::write_current_state(&final_snapshot, output_dir) {
        eprintln!("Warning: Could not write final current state: {}", e);
    }

    println!();
    println!(
        "Simulation complete. Ran {} rounds.",
        scheduler.system().rounds()
    );
    if faulted {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Steer an engine thread with commands read from stdin.
fn run_interactive(scheduler: Scheduler, config: &RunnerConfig, output_dir: &Path) -> ExitCode {
    let (engine, updates) = spawn_engine(scheduler, config.simulation.snapshot_interval);

    // Printer thread: surfaces engine updates and persists snapshots so the
    // console thread only ever blocks on stdin.
    let printer_dir = output_dir.to_path_buf();
    let printer = std::thread::spawn(move || {
        for update in updates {
            match update {
                EngineUpdate::Started => println!("running"),
                EngineUpdate::Stopped => println!("stopped"),
                EngineUpdate::RoundComplete(round) => println!("round {} complete", round),
                EngineUpdate::Fault(report) => eprintln!("fault: {}", report),
                EngineUpdate::Status {
                    round,
                    running,
                    particles,
                } => println!(
                    "round {} | {} | {} particles",
                    round,
                    if running { "running" } else { "stopped" },
                    particles
                ),
                EngineUpdate::Snapshot(snapshot) => {
                    match output::write_snapshot_to_dir(&snapshot, &printer_dir) {
                        Ok(path) => println!("wrote {}", path.display()),
                        Err(e) => eprintln!("Warning: Could not write snapshot: {}", e),
                    }
                    if let Err(e) = output::write_current_state(&snapshot, &printer_dir) {
                        eprintln!("Warning: Could not write current state: {}", e);
                    }
                }
            }
        }
    });

    println!();
    println!("Commands: start, stop, round, run <n>, status, snapshot, quit");

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
            Ok(Command::Quit) => break,
            Ok(Command::Start) => EngineCommand::Start,
            Ok(Command::Stop) => EngineCommand::Stop,
            Ok(Command::Round) => EngineCommand::Round,
            Ok(Command::Run(rounds)) => EngineCommand::Run(rounds),
            Ok(Command::Status) => EngineCommand::Status,
            Ok(Command::Snapshot) => EngineCommand::Snapshot,
        };
        if engine.command(command).is_err() {
            eprintln!("engine stopped unexpectedly");
            break;
        }
    }

    match engine.shutdown() {
        Ok(scheduler) => {
            let _ = printer.join();
            let final_snapshot = scheduler.system().snapshot("simulation_end");
            if let Err(e) = output::write_snapshot_to_dir(&final_snapshot, output_dir) {
                eprintln!("Warning: Could not write final snapshot: {}", e);
            }
            if let Err(e) = output::write_current_state(&final_snapshot, output_dir) {
                eprintln!("Warning: Could not write final current state: {}", e);
            }
            println!(
                "Simulation complete. Ran {} rounds.",
                scheduler.system().rounds()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

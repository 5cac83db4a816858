//! Headless and interactive front end for the amoebot engine.
//!
//! Builds a system from configuration, drives the scheduler, and persists
//! snapshots. The interactive mode moves the scheduler onto its own thread
//! and steers it with text commands over channels.

pub mod command;
pub mod config;
pub mod engine;
pub mod output;

pub use command::{parse_command, Command};
pub use config::{AlgorithmKind, ConfigError, RunnerConfig};
pub use engine::{spawn_engine, EngineCommand, EngineHandle, EngineUpdate};

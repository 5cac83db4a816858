//! Configuration loading for the runner.
//!
//! All runner settings are loaded from a TOML configuration file; command
//! line flags override individual values afterwards.

use amoebot_algs::EnergyParams;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete runner configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunnerConfig {
    /// Scheduler and system settings
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Disco algorithm settings
    #[serde(default)]
    pub disco: DiscoConfig,
    /// Energy algorithm settings
    #[serde(default)]
    pub energy: EnergyConfig,
}

impl RunnerConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::IoError)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::TomlError)
    }
}

/// Scheduler and system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Number of rounds to run in headless mode
    pub rounds: u64,
    /// Rounds between snapshots; 0 disables periodic snapshots
    pub snapshot_interval: u64,
    /// Which algorithm to run
    pub algorithm: AlgorithmKind,
    /// Number of particles in the system
    pub num_particles: usize,
    /// Directory for snapshot output
    pub output_dir: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            rounds: 1000,
            snapshot_interval: 50,
            algorithm: AlgorithmKind::Disco,
            num_particles: 30,
            output_dir: "output".to_string(),
        }
    }
}

/// Selects the algorithm every particle in the system runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmKind {
    /// Random walk with color cycling inside a hexagonal enclosure
    #[default]
    Disco,
    /// Stationary energy distribution over a spanning tree
    Energy,
}

/// Disco algorithm settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoConfig {
    /// Activations between recolorings
    pub counter_max: u32,
}

impl Default for DiscoConfig {
    fn default() -> Self {
        Self { counter_max: 5 }
    }
}

/// Energy algorithm settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    /// Energy moved per transfer step
    pub harvest_rate: f64,
    /// Battery and buffer capacity
    pub capacity: f64,
    /// Energy cost of one action
    pub threshold: f64,
    /// Total energy in the external source; unlimited when omitted
    pub source_energy: Option<f64>,
    /// Whether particles spend energy on actions
    pub is_dynamic: bool,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            harvest_rate: 1.0,
            capacity: 10.0,
            threshold: 5.0,
            source_energy: None,
            is_dynamic: false,
        }
    }
}

impl EnergyConfig {
    pub fn to_params(&self) -> EnergyParams {
        EnergyParams {
            harvest_rate: self.harvest_rate,
            capacity: self.capacity,
            threshold: self.threshold,
            source_energy: self.source_energy.unwrap_or(f64::INFINITY),
            is_dynamic: self.is_dynamic,
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file
    IoError(std::io::Error),
    /// Error parsing TOML config
    TomlError(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError(e) => Some(e),
            ConfigError::TomlError(e) => Some(e),
        }
    }
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Amoebot Runner Configuration

[simulation]
seed = 42
rounds = 1000
snapshot_interval = 50
algorithm = "disco"
num_particles = 30
output_dir = "output"

[disco]
counter_max = 5

[energy]
harvest_rate = 1.0
capacity = 10.0
threshold = 5.0
is_dynamic = false
# source_energy = 500.0   # omit for an unlimited source
"#
    .to_string()
}

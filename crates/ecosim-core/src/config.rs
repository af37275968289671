//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `ecosim-config.yaml` at the
//! project root. Every section and field has a serde default, so a
//! partial or empty file is valid. [`SimulationConfig::validate`] rejects
//! values the world cannot run with.

use std::path::Path;

use serde::Deserialize;

use ecosim_types::{Bounds, PopulationCounts, Role};
use ecosim_world::{Ruleset, WorldParams};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds unusable values.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World extent, seed, and timing.
    #[serde(default)]
    pub world: WorldConfig,

    /// Starting counts, floors, and the ceiling.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Per-role tunables.
    #[serde(default)]
    pub roles: Ruleset,

    /// Which decision source drives the entities.
    #[serde(default)]
    pub decision: DecisionConfig,

    /// Observer HTTP server.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// `ECOSIM_OBSERVER_HOST` and `ECOSIM_OBSERVER_PORT` override the
    /// observer bind address.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.observer.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the world cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.width == 0 || self.world.height == 0 {
            return Err(invalid(format!(
                "world must be at least 1x1, got {}x{}",
                self.world.width, self.world.height
            )));
        }
        let floors = self.population.floors.to_counts();
        if floors.total() > self.population.max_population {
            return Err(invalid(format!(
                "population floors sum to {} but max_population is {}",
                floors.total(),
                self.population.max_population
            )));
        }
        let starting = self.population.starting.to_counts();
        if starting.total() > self.population.max_population {
            return Err(invalid(format!(
                "starting population sums to {} but max_population is {}",
                starting.total(),
                self.population.max_population
            )));
        }
        if self.population.placement_attempts == 0 {
            return Err(invalid("placement_attempts must be at least 1".to_owned()));
        }
        let extent = self.world.width.max(self.world.height);
        for role in Role::ALL {
            let settings = self.roles.for_role(role);
            let bad = settings.invalid_fields();
            if !bad.is_empty() {
                return Err(invalid(format!(
                    "roles.{role} has invalid values for: {}",
                    bad.join(", ")
                )));
            }
            for (field, radius) in [
                ("reproduction_radius", settings.reproduction_radius),
                ("reproduction_spawn_radius", settings.reproduction_spawn_radius),
            ] {
                if radius > extent {
                    return Err(invalid(format!(
                        "roles.{role}.{field} {radius} exceeds world extent {extent}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// World construction parameters derived from this configuration.
    pub const fn world_params(&self) -> WorldParams {
        WorldParams {
            bounds: Bounds::new(self.world.width, self.world.height),
            ruleset: self.roles,
            population_ceiling: self.population.max_population,
            seed: self.world.seed,
        }
    }
}

fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid { reason }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Grid width in cells.
    #[serde(default = "default_extent")]
    pub width: u32,

    /// Grid height in cells.
    #[serde(default = "default_extent")]
    pub height: u32,

    /// Real-time milliseconds per tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Ticks before a full baseline reset. `0` disables the reset.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            width: default_extent(),
            height: default_extent(),
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: default_max_ticks(),
        }
    }
}

/// Per-role counts as they appear in YAML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct RoleCounts {
    /// Grazer count.
    pub grazer: u32,
    /// Predator count.
    pub predator: u32,
    /// Hunter count.
    pub hunter: u32,
}

impl RoleCounts {
    /// Convert to the shared counts type.
    pub const fn to_counts(self) -> PopulationCounts {
        PopulationCounts {
            grazers: self.grazer,
            predators: self.predator,
            hunters: self.hunter,
        }
    }
}

/// Population configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PopulationConfig {
    /// Entities spawned at start and after each reset.
    #[serde(default = "default_starting")]
    pub starting: RoleCounts,

    /// Minimum live count per role, restored every tick.
    #[serde(default = "default_floors")]
    pub floors: RoleCounts,

    /// Global ceiling on live entities.
    #[serde(default = "default_max_population")]
    pub max_population: u32,

    /// Random draws per placement search.
    #[serde(default = "default_placement_attempts")]
    pub placement_attempts: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            starting: default_starting(),
            floors: default_floors(),
            max_population: default_max_population(),
            placement_attempts: default_placement_attempts(),
        }
    }
}

/// Available decision sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    /// Every entity stays put.
    #[default]
    Stub,
    /// Seeded uniform random walk.
    Random,
}

/// Decision source configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct DecisionConfig {
    /// Which source to use.
    #[serde(default)]
    pub source: DecisionKind,
}

/// Observer HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Whether to start the observer.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Bind host.
    #[serde(default = "default_observer_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_observer_port")]
    pub port: u16,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_observer_host(),
            port: default_observer_port(),
        }
    }
}

impl ObserverConfig {
    /// Apply `ECOSIM_OBSERVER_HOST` / `ECOSIM_OBSERVER_PORT` overrides.
    /// An unparseable port is ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ECOSIM_OBSERVER_HOST") {
            self.host = val;
        }
        if let Some(port) = std::env::var("ECOSIM_OBSERVER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.port = port;
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Ecosystem".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_extent() -> u32 {
    64
}

const fn default_tick_interval_ms() -> u64 {
    5
}

const fn default_max_ticks() -> u64 {
    100_000
}

const fn default_starting() -> RoleCounts {
    RoleCounts {
        grazer: 10,
        predator: 10,
        hunter: 0,
    }
}

const fn default_floors() -> RoleCounts {
    RoleCounts {
        grazer: 10,
        predator: 10,
        hunter: 0,
    }
}

const fn default_max_population() -> u32 {
    200
}

const fn default_placement_attempts() -> u32 {
    100
}

const fn default_true() -> bool {
    true
}

fn default_observer_host() -> String {
    "127.0.0.1".to_owned()
}

const fn default_observer_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}

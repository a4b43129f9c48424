//! Configuration loading and typed config structures for the plantwatch feed.
//!
//! The canonical configuration lives in `plantwatch.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.
//! Every field has a default matching the reference deployment (two
//! machines, one-second cadence), so an absent or empty file yields a
//! fully working configuration.

use std::path::Path;

use serde::Deserialize;

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
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level feed configuration.
///
/// Mirrors the structure of `plantwatch.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Fleet roster and tick cadence.
    #[serde(default)]
    pub fleet: FleetConfig,

    /// Machine state-transition probabilities.
    #[serde(default)]
    pub transitions: TransitionConfig,

    /// Anomaly rule thresholds.
    #[serde(default)]
    pub thresholds: AnomalyThresholds,

    /// HTTP server bind settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yml::from_str(&contents)?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }
}

/// Fleet roster and tick cadence configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FleetConfig {
    /// Seconds between ticks of the feed driver.
    #[serde(default = "default_tick_interval_seconds")]
    pub tick_interval_seconds: u64,

    /// Seconds to wait before resuming after a failed tick.
    #[serde(default = "default_failure_backoff_seconds")]
    pub failure_backoff_seconds: u64,

    /// Random seed for reproducible telemetry sequences.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// The machines to simulate.
    #[serde(default = "default_machines")]
    pub machines: Vec<MachineConfig>,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            tick_interval_seconds: default_tick_interval_seconds(),
            failure_backoff_seconds: default_failure_backoff_seconds(),
            seed: default_seed(),
            machines: default_machines(),
        }
    }
}

/// Initial parameters for one simulated machine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MachineConfig {
    /// Stable machine identifier (e.g. `"M1"`).
    pub id: String,

    /// Machine category label (e.g. `"CNC Machine"`).
    pub kind: String,

    /// Nominal power draw in watts while operational.
    #[serde(default = "default_base_power")]
    pub base_power: f64,

    /// Nominal temperature in degrees Celsius.
    #[serde(default = "default_base_temperature")]
    pub base_temperature: f64,
}

/// Machine state-transition probabilities.
///
/// Values outside `[0, 1]` are clamped by the simulator at
/// construction time rather than rejected here.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransitionConfig {
    /// Per-tick probability of re-rolling the operating state
    /// uniformly across all three states.
    #[serde(default = "default_flip_chance")]
    pub flip_chance: f64,

    /// Per-tick probability that a machine in the error state recovers
    /// to operational (checked only when the re-roll did not fire).
    #[serde(default = "default_recovery_chance")]
    pub recovery_chance: f64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            flip_chance: default_flip_chance(),
            recovery_chance: default_recovery_chance(),
        }
    }
}

/// Numeric boundaries for the six anomaly rules.
///
/// Each rule fires strictly beyond its boundary (`>` for upper bounds,
/// `<` for the voltage drop).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnomalyThresholds {
    /// Power spike boundary in watts (rule fires above this).
    #[serde(default = "default_power_spike_watts")]
    pub power_spike_watts: f64,

    /// Voltage drop boundary in volts (rule fires below this).
    #[serde(default = "default_voltage_drop_volts")]
    pub voltage_drop_volts: f64,

    /// Overheat boundary in degrees Celsius (rule fires above this).
    #[serde(default = "default_high_temperature_celsius")]
    pub high_temperature_celsius: f64,

    /// Idle power waste boundary in watts (rule fires above this while
    /// the machine reports idle).
    #[serde(default = "default_idle_power_watts")]
    pub idle_power_watts: f64,

    /// Vibration boundary, unitless (rule fires above this).
    #[serde(default = "default_vibration_level")]
    pub vibration_level: f64,

    /// Cycle time deviation boundary in seconds (rule fires above this).
    #[serde(default = "default_cycle_time_seconds")]
    pub cycle_time_seconds: f64,
}

impl Default for AnomalyThresholds {
    fn default() -> Self {
        Self {
            power_spike_watts: default_power_spike_watts(),
            voltage_drop_volts: default_voltage_drop_volts(),
            high_temperature_celsius: default_high_temperature_celsius(),
            idle_power_watts: default_idle_power_watts(),
            vibration_level: default_vibration_level(),
            cycle_time_seconds: default_cycle_time_seconds(),
        }
    }
}

/// HTTP server bind settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    /// The host address to bind to (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,

    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
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
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_tick_interval_seconds() -> u64 {
    1
}

const fn default_failure_backoff_seconds() -> u64 {
    5
}

const fn default_seed() -> u64 {
    42
}

fn default_machines() -> Vec<MachineConfig> {
    vec![
        MachineConfig {
            id: "M1".to_owned(),
            kind: "CNC Machine".to_owned(),
            base_power: 300.0,
            base_temperature: default_base_temperature(),
        },
        MachineConfig {
            id: "M2".to_owned(),
            kind: "Assembly Robot".to_owned(),
            base_power: 200.0,
            base_temperature: default_base_temperature(),
        },
    ]
}

const fn default_base_power() -> f64 {
    300.0
}

const fn default_base_temperature() -> f64 {
    50.0
}

const fn default_flip_chance() -> f64 {
    0.01
}

const fn default_recovery_chance() -> f64 {
    0.10
}

const fn default_power_spike_watts() -> f64 {
    450.0
}

const fn default_voltage_drop_volts() -> f64 {
    210.0
}

const fn default_high_temperature_celsius() -> f64 {
    85.0
}

const fn default_idle_power_watts() -> f64 {
    25.0
}

const fn default_vibration_level() -> f64 {
    1.0
}

const fn default_cycle_time_seconds() -> f64 {
    70.0
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.fleet.tick_interval_seconds, 1);
        assert_eq!(config.fleet.failure_backoff_seconds, 5);
        assert_eq!(config.fleet.machines.len(), 2);
        assert_eq!(
            config.fleet.machines.first().map(|m| m.id.as_str()),
            Some("M1")
        );
        assert!((config.transitions.flip_chance - 0.01).abs() < 1e-12);
        assert!((config.thresholds.power_spike_watts - 450.0).abs() < 1e-12);
        assert_eq!(config.http.port, 8080);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
fleet:
  tick_interval_seconds: 2
  failure_backoff_seconds: 10
  seed: 123
  machines:
    - id: "PRESS-1"
      kind: "Hydraulic Press"
      base_power: 450.0
      base_temperature: 55.0

transitions:
  flip_chance: 0.05
  recovery_chance: 0.2

thresholds:
  power_spike_watts: 500.0
  voltage_drop_volts: 200.0
  high_temperature_celsius: 90.0
  idle_power_watts: 30.0
  vibration_level: 1.5
  cycle_time_seconds: 80.0

http:
  host: "127.0.0.1"
  port: 9090

logging:
  level: "debug"
"#;

        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.fleet.tick_interval_seconds, 2);
        assert_eq!(config.fleet.seed, 123);
        assert_eq!(config.fleet.machines.len(), 1);
        assert_eq!(
            config.fleet.machines.first().map(|m| m.kind.as_str()),
            Some("Hydraulic Press")
        );
        assert!((config.transitions.recovery_chance - 0.2).abs() < 1e-12);
        assert!((config.thresholds.voltage_drop_volts - 200.0).abs() < 1e-12);
        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.http.port, 9090);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "fleet:\n  seed: 7\n";
        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        // Seed is overridden
        assert_eq!(config.fleet.seed, 7);
        // Everything else uses defaults
        assert_eq!(config.fleet.machines.len(), 2);
        assert!((config.thresholds.cycle_time_seconds - 70.0).abs() < 1e-12);
    }

    #[test]
    fn parse_empty_yaml() {
        let yaml = "";
        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok());
    }

    #[test]
    fn machine_entry_defaults_apply() {
        let yaml = "fleet:\n  machines:\n    - id: \"M9\"\n      kind: \"Lathe\"\n";
        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();
        let machine = config.fleet.machines.first();
        assert!(machine.is_some());
        if let Some(machine) = machine {
            assert!((machine.base_power - 300.0).abs() < 1e-12);
            assert!((machine.base_temperature - 50.0).abs() < 1e-12);
        }
    }
}

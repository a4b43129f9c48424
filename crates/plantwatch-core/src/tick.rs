//! Tick cycle: advance the fleet, evaluate the rules, assemble a snapshot.
//!
//! One tick runs three phases:
//!
//! 1. **Simulate** -- every [`MachineSimulator`] advances once and emits
//!    its reading. Machines are independent; their order in the batch is
//!    simply the roster order.
//! 2. **Evaluate** -- the three rule-engine functions run once against
//!    the complete batch.
//! 3. **Assemble** -- the readings and derived values become a
//!    [`FleetSnapshot`] stamped with the next sequence number.
//!
//! The tick itself does no I/O and holds no locks; publication is the
//! driver's job (see [`runner`](crate::runner)).

use chrono::{DateTime, Utc};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use plantwatch_types::{FleetSnapshot, Reading};

use crate::config::{AnomalyThresholds, SimulationConfig};
use crate::rules;
use crate::simulator::MachineSimulator;

/// Errors that can occur while constructing the fleet.
#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    /// The configuration declares no machines.
    #[error("fleet roster is empty: at least one machine must be configured")]
    EmptyRoster,
}

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The snapshot sequence counter would overflow.
    #[error("snapshot sequence overflow: cannot advance beyond u64::MAX")]
    SequenceOverflow,
}

/// Anything that can produce the next snapshot for publication.
///
/// The production implementation is [`Fleet`]; tests inject failing
/// sources to exercise the driver's supervision path.
pub trait SnapshotSource: Send {
    /// Produce the next snapshot, stamped with the given wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns [`TickError`] if the tick cannot complete; the driver
    /// logs the error, keeps the previous snapshot, and retries after
    /// its backoff.
    fn next_snapshot(&mut self, now: DateTime<Utc>) -> Result<FleetSnapshot, TickError>;
}

/// The simulated machine fleet plus everything a tick needs: the rule
/// thresholds, the seeded random source, and the sequence counter.
///
/// This is the single explicitly-owned simulation state object. The
/// tick driver owns it exclusively; the delivery layer only ever sees
/// published snapshots.
#[derive(Debug)]
pub struct Fleet {
    /// The machine simulators, in roster order.
    machines: Vec<MachineSimulator>,
    /// Anomaly rule thresholds applied to each batch.
    thresholds: AnomalyThresholds,
    /// Seeded random source shared by all simulators.
    rng: SmallRng,
    /// Sequence number of the last assembled snapshot.
    sequence: u64,
}

impl Fleet {
    /// Build the fleet from configuration, seeding the random source
    /// from `fleet.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`FleetError::EmptyRoster`] if no machines are
    /// configured. This is the one unrecoverable initialization error:
    /// a feed with nothing to simulate cannot start.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, FleetError> {
        Self::with_rng(config, SmallRng::seed_from_u64(config.fleet.seed))
    }

    /// Build the fleet with an explicit random source (useful for
    /// testing with a known generator state).
    ///
    /// # Errors
    ///
    /// Returns [`FleetError::EmptyRoster`] if no machines are
    /// configured.
    pub fn with_rng(config: &SimulationConfig, rng: SmallRng) -> Result<Self, FleetError> {
        if config.fleet.machines.is_empty() {
            return Err(FleetError::EmptyRoster);
        }

        let machines = config
            .fleet
            .machines
            .iter()
            .map(|machine| MachineSimulator::new(machine, &config.transitions))
            .collect();

        Ok(Self {
            machines,
            thresholds: config.thresholds.clone(),
            rng,
            sequence: 0,
        })
    }

    /// Return the number of machines in the fleet.
    pub fn machine_count(&self) -> usize {
        self.machines.len()
    }

    /// Return the sequence number of the last assembled snapshot.
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Execute one complete tick: simulate, evaluate, assemble.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::SequenceOverflow`] if the sequence counter
    /// cannot advance.
    pub fn run_tick(&mut self, now: DateTime<Utc>) -> Result<FleetSnapshot, TickError> {
        let sequence = self
            .sequence
            .checked_add(1)
            .ok_or(TickError::SequenceOverflow)?;

        let mut machines: Vec<Reading> = Vec::with_capacity(self.machines.len());
        for simulator in &mut self.machines {
            machines.push(simulator.advance(&mut self.rng, now));
        }

        let anomalies = rules::detect_anomalies(&machines, &self.thresholds);
        let risks = rules::compute_risk(&machines);
        let recommendations = rules::recommend(&machines, now);

        self.sequence = sequence;

        Ok(FleetSnapshot {
            machines,
            anomalies,
            risks,
            recommendations,
            sequence,
        })
    }
}

impl SnapshotSource for Fleet {
    fn next_snapshot(&mut self, now: DateTime<Utc>) -> Result<FleetSnapshot, TickError> {
        self.run_tick(now)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use plantwatch_types::MachineStatus;

    #[test]
    fn empty_roster_is_rejected() {
        let mut config = SimulationConfig::default();
        config.fleet.machines.clear();
        let fleet = Fleet::from_config(&config);
        assert!(matches!(fleet, Err(FleetError::EmptyRoster)));
    }

    #[test]
    fn default_config_builds_two_machines() {
        let fleet = Fleet::from_config(&SimulationConfig::default()).unwrap();
        assert_eq!(fleet.machine_count(), 2);
        assert_eq!(fleet.sequence(), 0);
    }

    #[test]
    fn tick_produces_one_reading_per_machine() {
        let mut fleet = Fleet::from_config(&SimulationConfig::default()).unwrap();
        let snapshot = fleet.run_tick(Utc::now()).unwrap();

        assert_eq!(snapshot.machines.len(), 2);
        assert_eq!(snapshot.machines.first().unwrap().id, "M1");
        assert_eq!(snapshot.machines.get(1).unwrap().id, "M2");
        assert_eq!(snapshot.sequence, 1);
    }

    #[test]
    fn sequence_increases_across_ticks() {
        let mut fleet = Fleet::from_config(&SimulationConfig::default()).unwrap();
        for expected in 1..=20 {
            let snapshot = fleet.run_tick(Utc::now()).unwrap();
            assert_eq!(snapshot.sequence, expected);
        }
    }

    #[test]
    fn derived_values_are_consistent_with_the_batch() {
        let mut fleet = Fleet::from_config(&SimulationConfig::default()).unwrap();

        for _ in 0..200 {
            let snapshot = fleet.run_tick(Utc::now()).unwrap();

            // One risk score per reading, same machine order.
            assert_eq!(snapshot.risks.len(), snapshot.machines.len());
            for (reading, score) in snapshot.machines.iter().zip(&snapshot.risks) {
                assert_eq!(reading.id, score.id);
                assert!(score.risk >= 0.0 && score.risk <= 1.0);
                if reading.status == MachineStatus::Error {
                    assert!((score.risk - 0.9).abs() < 1e-12);
                }
            }

            // Every anomaly's machine and timestamp come from this batch.
            for anomaly in &snapshot.anomalies {
                let source = snapshot
                    .machines
                    .iter()
                    .find(|reading| reading.id == anomaly.id);
                assert!(source.is_some());
                assert_eq!(source.unwrap().timestamp, anomaly.timestamp);
            }

            // Recommendations are never empty thanks to the fallback.
            assert!(!snapshot.recommendations.is_empty());
        }
    }

    #[test]
    fn snapshot_timestamps_match_tick_time() {
        let mut fleet = Fleet::from_config(&SimulationConfig::default()).unwrap();
        let now = Utc::now();
        let snapshot = fleet.run_tick(now).unwrap();
        for reading in &snapshot.machines {
            assert_eq!(reading.timestamp, now);
        }
    }

    #[test]
    fn same_seed_yields_identical_snapshots() {
        let config = SimulationConfig::default();
        let mut fleet_a = Fleet::from_config(&config).unwrap();
        let mut fleet_b = Fleet::from_config(&config).unwrap();

        let now = Utc::now();
        for _ in 0..50 {
            let a = fleet_a.run_tick(now).unwrap();
            let b = fleet_b.run_tick(now).unwrap();
            assert_eq!(a, b);
        }
    }
}

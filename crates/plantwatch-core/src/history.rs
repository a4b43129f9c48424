//! Stateless historical replay for backfill and demo charts.
//!
//! Synthesizes a requested number of past ticks for the two reference
//! machines ("M1" CNC, "M2" Assembly Robot) using independent uniform
//! draws per field. This is intentionally **not** the live simulator's
//! stateful trend model: the replay has no state machine and no
//! sinusoidal load trend, so its statistical shape diverges from the
//! live feed. Consumers only use it to pre-populate charts, and the
//! divergence is part of the established behavior.
//!
//! Each replayed point is run through the anomaly rules so the caller
//! gets a flattened, timestamped anomaly list alongside the readings.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use plantwatch_types::{Anomaly, MachineStatus, Reading};

use crate::config::AnomalyThresholds;
use crate::rules;

/// A replayed history window: per-tick reading pairs plus every anomaly
/// the rule engine found across the window.
#[derive(Debug, Clone)]
pub struct HistoryBatch {
    /// One entry per replayed tick, each holding the fleet's readings.
    pub data: Vec<Vec<Reading>>,
    /// All anomalies across the window, in tick order.
    pub anomalies: Vec<Anomaly>,
}

/// Field ranges for one replayed machine.
struct ReplayProfile {
    /// Machine identifier.
    id: &'static str,
    /// Machine category label.
    kind: &'static str,
    /// Power draw range, watts.
    power: (f64, f64),
    /// Temperature range, degrees Celsius.
    temperature: (f64, f64),
    /// Vibration range, unitless.
    vibration: (f64, f64),
    /// Cycle time range, seconds.
    cycle_time: (f64, f64),
}

/// The two fixed replay machines. Ranges differ per machine so the two
/// chart series are visually distinguishable.
const REPLAY_PROFILES: [ReplayProfile; 2] = [
    ReplayProfile {
        id: "M1",
        kind: "CNC Machine",
        power: (100.0, 500.0),
        temperature: (30.0, 80.0),
        vibration: (0.1, 1.0),
        cycle_time: (30.0, 60.0),
    },
    ReplayProfile {
        id: "M2",
        kind: "Assembly Robot",
        power: (80.0, 400.0),
        temperature: (30.0, 85.0),
        vibration: (0.1, 1.2),
        cycle_time: (20.0, 50.0),
    },
];

/// Voltage range shared by both replay machines, volts.
const REPLAY_VOLTAGE: (f64, f64) = (210.0, 240.0);

/// Synthesize `points` ticks of history ending at `end`, one second apart.
///
/// Timestamps count up from `end - points` seconds, so the last point
/// lands one second before `end`. The replay is independent of the live
/// loop and mutates no shared state.
pub fn generate_history(
    points: usize,
    thresholds: &AnomalyThresholds,
    rng: &mut impl Rng,
    end: DateTime<Utc>,
) -> HistoryBatch {
    let mut data = Vec::with_capacity(points);
    let mut anomalies = Vec::new();

    let total = i64::try_from(points).unwrap_or(i64::MAX);
    let start = end
        .checked_sub_signed(Duration::try_seconds(total).unwrap_or_default())
        .unwrap_or(end);

    for i in 0..points {
        let offset = i64::try_from(i).unwrap_or(i64::MAX);
        let timestamp = start
            .checked_add_signed(Duration::try_seconds(offset).unwrap_or_default())
            .unwrap_or(start);

        let readings: Vec<Reading> = REPLAY_PROFILES
            .iter()
            .map(|profile| replay_reading(profile, rng, timestamp))
            .collect();

        anomalies.extend(rules::detect_anomalies(&readings, thresholds));
        data.push(readings);
    }

    HistoryBatch { data, anomalies }
}

/// Draw one replayed reading from a machine profile.
fn replay_reading(
    profile: &ReplayProfile,
    rng: &mut impl Rng,
    timestamp: DateTime<Utc>,
) -> Reading {
    let status = match rng.random_range(0..3_u8) {
        0 => MachineStatus::Operational,
        1 => MachineStatus::Idle,
        _ => MachineStatus::Error,
    };

    Reading {
        id: profile.id.to_owned(),
        kind: profile.kind.to_owned(),
        power: rng.random_range(profile.power.0..profile.power.1),
        voltage: rng.random_range(REPLAY_VOLTAGE.0..REPLAY_VOLTAGE.1),
        temperature: rng.random_range(profile.temperature.0..profile.temperature.1),
        vibration: rng.random_range(profile.vibration.0..profile.vibration.1),
        status,
        cycle_time: rng.random_range(profile.cycle_time.0..profile.cycle_time.1),
        timestamp,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn generates_requested_point_count() {
        let mut rng = SmallRng::seed_from_u64(5);
        let batch = generate_history(300, &AnomalyThresholds::default(), &mut rng, Utc::now());
        assert_eq!(batch.data.len(), 300);
    }

    #[test]
    fn each_point_holds_both_reference_machines() {
        let mut rng = SmallRng::seed_from_u64(5);
        let batch = generate_history(10, &AnomalyThresholds::default(), &mut rng, Utc::now());

        for point in &batch.data {
            assert_eq!(point.len(), 2);
            assert_eq!(point.first().unwrap().id, "M1");
            assert_eq!(point.first().unwrap().kind, "CNC Machine");
            assert_eq!(point.get(1).unwrap().id, "M2");
            assert_eq!(point.get(1).unwrap().kind, "Assembly Robot");
        }
    }

    #[test]
    fn timestamps_increase_one_second_per_point() {
        let end = Utc::now();
        let mut rng = SmallRng::seed_from_u64(5);
        let batch = generate_history(50, &AnomalyThresholds::default(), &mut rng, end);

        let mut previous: Option<DateTime<Utc>> = None;
        for point in &batch.data {
            let stamp = point.first().unwrap().timestamp;
            assert!(stamp < end);
            if let Some(prev) = previous {
                assert_eq!(stamp - prev, Duration::seconds(1));
            }
            previous = Some(stamp);
        }
    }

    #[test]
    fn replayed_fields_respect_profile_ranges() {
        let mut rng = SmallRng::seed_from_u64(5);
        let batch = generate_history(200, &AnomalyThresholds::default(), &mut rng, Utc::now());

        for point in &batch.data {
            let m1 = point.first().unwrap();
            assert!(m1.power >= 100.0 && m1.power < 500.0);
            assert!(m1.temperature >= 30.0 && m1.temperature < 80.0);
            assert!(m1.vibration >= 0.1 && m1.vibration < 1.0);
            assert!(m1.cycle_time >= 30.0 && m1.cycle_time < 60.0);
            assert!(m1.voltage >= 210.0 && m1.voltage < 240.0);

            let m2 = point.get(1).unwrap();
            assert!(m2.power >= 80.0 && m2.power < 400.0);
            assert!(m2.vibration >= 0.1 && m2.vibration < 1.2);
            assert!(m2.cycle_time >= 20.0 && m2.cycle_time < 50.0);
        }
    }

    #[test]
    fn anomalies_carry_replay_timestamps() {
        // M2's vibration range extends past the 1.0 threshold, so a
        // few hundred points reliably produce at least one anomaly.
        let mut rng = SmallRng::seed_from_u64(5);
        let batch = generate_history(500, &AnomalyThresholds::default(), &mut rng, Utc::now());
        assert!(!batch.anomalies.is_empty());

        let stamps: std::collections::BTreeSet<DateTime<Utc>> = batch
            .data
            .iter()
            .flat_map(|point| point.iter().map(|r| r.timestamp))
            .collect();
        for anomaly in &batch.anomalies {
            assert!(stamps.contains(&anomaly.timestamp));
        }
    }

    #[test]
    fn zero_points_is_an_empty_batch() {
        let mut rng = SmallRng::seed_from_u64(5);
        let batch = generate_history(0, &AnomalyThresholds::default(), &mut rng, Utc::now());
        assert!(batch.data.is_empty());
        assert!(batch.anomalies.is_empty());
    }

    #[test]
    fn same_seed_replays_identically() {
        let end = Utc::now();
        let mut rng_a = SmallRng::seed_from_u64(77);
        let mut rng_b = SmallRng::seed_from_u64(77);
        let a = generate_history(25, &AnomalyThresholds::default(), &mut rng_a, end);
        let b = generate_history(25, &AnomalyThresholds::default(), &mut rng_b, end);
        assert_eq!(a.data, b.data);
        assert_eq!(a.anomalies, b.anomalies);
    }
}

//! Core value types for the plantwatch telemetry feed.
//!
//! A [`Reading`] is one machine's telemetry sample for one tick. The
//! rule engine derives [`Anomaly`], [`RiskScore`], and
//! [`Recommendation`] values from a batch of readings, and the tick
//! driver bundles all four into a [`FleetSnapshot`] -- the immutable,
//! sequence-numbered unit of publication.
//!
//! All of these are plain immutable values: once constructed they are
//! never mutated, only shared (the snapshot as `Arc<FleetSnapshot>`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{AnomalyRule, MachineStatus, Severity};

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// One machine's telemetry sample for one tick.
///
/// Numeric fields are finite; power, temperature, vibration, and cycle
/// time are non-negative by construction in the simulator. Values are
/// pre-rounded for presentation (two decimals, three for vibration);
/// the rule engine treats that rounding as cosmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Stable machine identifier (e.g. `"M1"`).
    pub id: String,
    /// Machine category label (e.g. `"CNC Machine"`). Wire key: `type`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Instantaneous power draw in watts.
    pub power: f64,
    /// Supply voltage in volts.
    pub voltage: f64,
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    /// Unitless vibration level.
    pub vibration: f64,
    /// Operating state at sample time.
    pub status: MachineStatus,
    /// Production cycle time in seconds (0 when not producing).
    pub cycle_time: f64,
    /// Wall-clock time the sample was generated.
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Derived values
// ---------------------------------------------------------------------------

/// A threshold rule firing for one reading.
///
/// One reading may yield zero or more anomalies; each rule is evaluated
/// independently. The timestamp is copied from the triggering reading,
/// so replayed historical readings carry their replay timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    /// Machine identifier the anomaly belongs to.
    pub id: String,
    /// The rule that fired. Wire key: `type`.
    #[serde(rename = "type")]
    pub rule: AnomalyRule,
    /// The offending measured value.
    pub value: f64,
    /// Timestamp of the reading that triggered the rule.
    pub timestamp: DateTime<Utc>,
}

/// Failure-risk score for one machine, in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    /// Machine identifier the score belongs to.
    pub id: String,
    /// Risk in `[0, 1]`, rounded to two decimals.
    pub risk: f64,
}

/// An energy or maintenance recommendation derived from a batch.
///
/// Wire keys `msg` and `time` match the original dashboard protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Human-readable recommendation text.
    #[serde(rename = "msg")]
    pub message: String,
    /// How urgently the recommendation should be acted on.
    pub severity: Severity,
    /// When the recommendation was issued.
    #[serde(rename = "time")]
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// The immutable bundle published after each tick.
///
/// Anomalies, risks, and recommendations are always derived from
/// exactly this snapshot's own `machines` batch -- never a mixture of
/// two ticks. The sequence number increases strictly across successful
/// ticks; a failed tick leaves the previous snapshot (and sequence) in
/// place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    /// Telemetry readings, one per machine, in fleet order.
    pub machines: Vec<Reading>,
    /// Anomalies detected in this tick's readings.
    pub anomalies: Vec<Anomaly>,
    /// Per-machine risk scores for this tick.
    pub risks: Vec<RiskScore>,
    /// Recommendations for this tick (never empty: a batch with no
    /// findings produces the single "all systems optimized" entry).
    pub recommendations: Vec<Recommendation>,
    /// Strictly increasing snapshot version.
    pub sequence: u64,
}

impl FleetSnapshot {
    /// The empty pre-first-tick snapshot (sequence 0).
    ///
    /// Subscribers that join before the first tick completes receive
    /// this; the first published snapshot then carries sequence 1.
    pub const fn empty() -> Self {
        Self {
            machines: Vec::new(),
            anomalies: Vec::new(),
            risks: Vec::new(),
            recommendations: Vec::new(),
            sequence: 0,
        }
    }
}

impl Default for FleetSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::enums::{AnomalyRule, MachineStatus, Severity};

    fn sample_reading() -> Reading {
        Reading {
            id: String::from("M1"),
            kind: String::from("CNC Machine"),
            power: 312.55,
            voltage: 224.1,
            temperature: 64.2,
            vibration: 0.413,
            status: MachineStatus::Operational,
            cycle_time: 41.87,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn reading_serializes_with_wire_keys() {
        let reading = sample_reading();
        let value = serde_json::to_value(&reading).unwrap();
        let obj = value.as_object().unwrap();

        // The machine kind must appear under the legacy `type` key.
        assert_eq!(obj.get("type").and_then(|v| v.as_str()), Some("CNC Machine"));
        assert!(obj.contains_key("cycle_time"));
        assert!(obj.contains_key("timestamp"));
        assert_eq!(obj.get("status").and_then(|v| v.as_str()), Some("operational"));
        // No leaked internal field name.
        assert!(!obj.contains_key("kind"));
    }

    #[test]
    fn anomaly_serializes_rule_under_type_key() {
        let anomaly = Anomaly {
            id: String::from("M2"),
            rule: AnomalyRule::VoltageDrop,
            value: 207.4,
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&anomaly).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.get("type").and_then(|v| v.as_str()), Some("Voltage Drop"));
        assert!((obj.get("value").and_then(serde_json::Value::as_f64).unwrap() - 207.4).abs() < 1e-9);
    }

    #[test]
    fn recommendation_uses_msg_and_time_keys() {
        let rec = Recommendation {
            message: String::from("All systems optimized."),
            severity: Severity::Low,
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&rec).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("msg"));
        assert!(obj.contains_key("time"));
        assert_eq!(obj.get("severity").and_then(|v| v.as_str()), Some("low"));
        assert!(!obj.contains_key("message"));
    }

    #[test]
    fn empty_snapshot_is_sequence_zero() {
        let snap = FleetSnapshot::empty();
        assert_eq!(snap.sequence, 0);
        assert!(snap.machines.is_empty());
        assert!(snap.anomalies.is_empty());
    }

    #[test]
    fn snapshot_serializes_top_level_keys() {
        let snap = FleetSnapshot {
            machines: vec![sample_reading()],
            anomalies: Vec::new(),
            risks: vec![RiskScore {
                id: String::from("M1"),
                risk: 0.2,
            }],
            recommendations: Vec::new(),
            sequence: 7,
        };
        let value = serde_json::to_value(&snap).unwrap();
        let obj = value.as_object().unwrap();
        for key in ["machines", "anomalies", "risks", "recommendations", "sequence"] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
    }

    #[test]
    fn reading_roundtrips_through_json() {
        let reading = sample_reading();
        let json = serde_json::to_string(&reading).unwrap();
        let back: Reading = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reading);
    }
}

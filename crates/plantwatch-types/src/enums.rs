//! Enumeration types for the plantwatch telemetry feed.
//!
//! All enums serialize to the lowercase / human-label strings the
//! original dashboard protocol uses. Parsing is symmetric, so readings
//! captured from the wire can be replayed through the rule engine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Machine status
// ---------------------------------------------------------------------------

/// Operating state of a simulated machine.
///
/// Transitions happen only inside the simulator state machine: a rare
/// uniform re-roll from any state, plus a recovery path that applies
/// exclusively to [`MachineStatus::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineStatus {
    /// Machine is running its production cycle.
    Operational,
    /// Machine is powered but not producing.
    Idle,
    /// Machine has faulted and is drawing minimal power.
    Error,
}

impl core::fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Self::Operational => "operational",
            Self::Idle => "idle",
            Self::Error => "error",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Recommendation severity
// ---------------------------------------------------------------------------

/// Severity attached to an energy/maintenance recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational; no action required soon.
    Low,
    /// Should be addressed within the shift.
    Medium,
    /// Needs attention now.
    High,
}

// ---------------------------------------------------------------------------
// Anomaly rules
// ---------------------------------------------------------------------------

/// The threshold rule that produced an anomaly.
///
/// Serialized as the human-readable rule label (e.g. `"Power Spike"`)
/// because that is what the wire protocol carries in the anomaly
/// `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnomalyRule {
    /// Instantaneous power draw above the spike threshold.
    #[serde(rename = "Power Spike")]
    PowerSpike,
    /// Supply voltage sagging below the drop threshold.
    #[serde(rename = "Voltage Drop")]
    VoltageDrop,
    /// Temperature above the overheat threshold.
    #[serde(rename = "High Temperature")]
    HighTemperature,
    /// Machine reported idle while still drawing significant power.
    #[serde(rename = "Idle Power Waste")]
    IdlePowerWaste,
    /// Vibration level above the mechanical-wear threshold.
    #[serde(rename = "Vibration Anomaly")]
    VibrationAnomaly,
    /// Production cycle running longer than the deviation threshold.
    #[serde(rename = "Cycle Time Deviation")]
    CycleTimeDeviation,
}

impl AnomalyRule {
    /// Return the human-readable rule label used on the wire.
    pub const fn label(self) -> &'static str {
        match self {
            Self::PowerSpike => "Power Spike",
            Self::VoltageDrop => "Voltage Drop",
            Self::HighTemperature => "High Temperature",
            Self::IdlePowerWaste => "Idle Power Waste",
            Self::VibrationAnomaly => "Vibration Anomaly",
            Self::CycleTimeDeviation => "Cycle Time Deviation",
        }
    }
}

impl core::fmt::Display for AnomalyRule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&MachineStatus::Operational).unwrap();
        assert_eq!(json, "\"operational\"");
        let json = serde_json::to_string(&MachineStatus::Idle).unwrap();
        assert_eq!(json, "\"idle\"");
        let json = serde_json::to_string(&MachineStatus::Error).unwrap();
        assert_eq!(json, "\"error\"");
    }

    #[test]
    fn status_roundtrips() {
        for status in [
            MachineStatus::Operational,
            MachineStatus::Idle,
            MachineStatus::Error,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            let back: MachineStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }

    #[test]
    fn anomaly_rule_serializes_as_label() {
        let json = serde_json::to_string(&AnomalyRule::PowerSpike).unwrap();
        assert_eq!(json, "\"Power Spike\"");
        let json = serde_json::to_string(&AnomalyRule::CycleTimeDeviation).unwrap();
        assert_eq!(json, "\"Cycle Time Deviation\"");
    }

    #[test]
    fn anomaly_rule_label_matches_serde() {
        for rule in [
            AnomalyRule::PowerSpike,
            AnomalyRule::VoltageDrop,
            AnomalyRule::HighTemperature,
            AnomalyRule::IdlePowerWaste,
            AnomalyRule::VibrationAnomaly,
            AnomalyRule::CycleTimeDeviation,
        ] {
            let json = serde_json::to_string(&rule).unwrap();
            assert_eq!(json, format!("\"{}\"", rule.label()));
        }
    }
}

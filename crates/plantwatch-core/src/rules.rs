//! Rule engine: pure threshold classifiers over a telemetry batch.
//!
//! All three entry points are stateless, total functions over a slice
//! of [`Reading`]s. Input order is preserved in the outputs, readings
//! are evaluated independently, and nothing here can fail on
//! well-formed input -- the type system makes malformed readings
//! unrepresentable.
//!
//! # Rules
//!
//! | Rule | Condition | Output |
//! |------|-----------|--------|
//! | Power Spike | power > threshold (450 W) | anomaly |
//! | Voltage Drop | voltage < threshold (210 V) | anomaly |
//! | High Temperature | temperature > threshold (85 C) | anomaly |
//! | Idle Power Waste | idle and power > threshold (25 W) | anomaly |
//! | Vibration Anomaly | vibration > threshold (1.0) | anomaly |
//! | Cycle Time Deviation | cycle time > threshold (70 s) | anomaly |
//!
//! Risk scoring adds tiered contributions for temperature and
//! vibration, then overrides the total with a fixed 0.9 for machines in
//! the error state. Recommendations are independent per-reading checks
//! with a batch-level "all systems optimized" fallback.

use chrono::{DateTime, Utc};

use plantwatch_types::{
    Anomaly, AnomalyRule, MachineStatus, Reading, Recommendation, RiskScore, Severity,
};

use crate::config::AnomalyThresholds;
use crate::round::round2;

// ---------------------------------------------------------------------------
// Risk tiers
// ---------------------------------------------------------------------------

/// Temperature above this contributes the high risk tier.
const RISK_TEMPERATURE_HIGH: f64 = 80.0;

/// Temperature above this (but not the high tier) contributes the warm tier.
const RISK_TEMPERATURE_WARM: f64 = 60.0;

/// Vibration above this contributes the high risk tier.
const RISK_VIBRATION_HIGH: f64 = 0.8;

/// Vibration above this (but not the high tier) contributes the elevated tier.
const RISK_VIBRATION_ELEVATED: f64 = 0.5;

/// Risk added by a high-tier contribution.
const RISK_TIER_HIGH: f64 = 0.4;

/// Risk added by a lower-tier contribution.
const RISK_TIER_LOW: f64 = 0.2;

/// Fixed risk assigned to a machine in the error state. This replaces
/// the accumulated score rather than adding to it.
const RISK_ERROR_OVERRIDE: f64 = 0.9;

// ---------------------------------------------------------------------------
// Recommendation boundaries
// ---------------------------------------------------------------------------

/// Idle power draw above this earns a reduce-idle-power recommendation.
const RECOMMEND_IDLE_POWER_WATTS: f64 = 25.0;

/// Temperature above this earns a check-cooling recommendation.
const RECOMMEND_COOLING_CELSIUS: f64 = 75.0;

/// Operational cycle time above this earns an optimize-cycle recommendation.
const RECOMMEND_SLOW_CYCLE_SECONDS: f64 = 55.0;

// ---------------------------------------------------------------------------
// Anomaly detection
// ---------------------------------------------------------------------------

/// Evaluate the six anomaly rules against every reading in the batch.
///
/// Each rule is checked independently, so a single reading may
/// contribute up to six anomalies. Anomaly timestamps are copied from
/// the triggering reading.
pub fn detect_anomalies(readings: &[Reading], thresholds: &AnomalyThresholds) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    for reading in readings {
        let mut push = |rule: AnomalyRule, value: f64| {
            anomalies.push(Anomaly {
                id: reading.id.clone(),
                rule,
                value,
                timestamp: reading.timestamp,
            });
        };

        if reading.power > thresholds.power_spike_watts {
            push(AnomalyRule::PowerSpike, reading.power);
        }
        if reading.voltage < thresholds.voltage_drop_volts {
            push(AnomalyRule::VoltageDrop, reading.voltage);
        }
        if reading.temperature > thresholds.high_temperature_celsius {
            push(AnomalyRule::HighTemperature, reading.temperature);
        }
        if reading.status == MachineStatus::Idle && reading.power > thresholds.idle_power_watts {
            push(AnomalyRule::IdlePowerWaste, reading.power);
        }
        if reading.vibration > thresholds.vibration_level {
            push(AnomalyRule::VibrationAnomaly, reading.vibration);
        }
        if reading.cycle_time > thresholds.cycle_time_seconds {
            push(AnomalyRule::CycleTimeDeviation, reading.cycle_time);
        }
    }

    anomalies
}

// ---------------------------------------------------------------------------
// Risk scoring
// ---------------------------------------------------------------------------

/// Compute a failure-risk score in `[0, 1]` for every reading.
///
/// Temperature and vibration each contribute their highest matching
/// tier only. A machine in the error state is scored a flat
/// [`RISK_ERROR_OVERRIDE`] regardless of its other fields.
pub fn compute_risk(readings: &[Reading]) -> Vec<RiskScore> {
    readings
        .iter()
        .map(|reading| {
            let mut risk = 0.0;

            if reading.temperature > RISK_TEMPERATURE_HIGH {
                risk += RISK_TIER_HIGH;
            } else if reading.temperature > RISK_TEMPERATURE_WARM {
                risk += RISK_TIER_LOW;
            }

            if reading.vibration > RISK_VIBRATION_HIGH {
                risk += RISK_TIER_HIGH;
            } else if reading.vibration > RISK_VIBRATION_ELEVATED {
                risk += RISK_TIER_LOW;
            }

            if reading.status == MachineStatus::Error {
                risk = RISK_ERROR_OVERRIDE;
            }

            RiskScore {
                id: reading.id.clone(),
                risk: round2(risk.clamp(0.0, 1.0)),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

/// Derive energy and maintenance recommendations for the batch.
///
/// Checks are independent per reading and all matches are emitted with
/// no cross-machine deduplication. When the whole batch produces
/// nothing, exactly one low-severity "all systems optimized" entry is
/// returned so consumers always have something to display.
pub fn recommend(readings: &[Reading], now: DateTime<Utc>) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    for reading in readings {
        if reading.status == MachineStatus::Idle && reading.power > RECOMMEND_IDLE_POWER_WATTS {
            recommendations.push(Recommendation {
                message: format!("Reduce idle power on {} to save energy.", reading.id),
                severity: Severity::Medium,
                timestamp: now,
            });
        }
        if reading.temperature > RECOMMEND_COOLING_CELSIUS {
            recommendations.push(Recommendation {
                message: format!("Check cooling for {} (high temp).", reading.id),
                severity: Severity::High,
                timestamp: now,
            });
        }
        if reading.cycle_time > RECOMMEND_SLOW_CYCLE_SECONDS
            && reading.status == MachineStatus::Operational
        {
            recommendations.push(Recommendation {
                message: format!("Optimize cycle time for {} to improve efficiency.", reading.id),
                severity: Severity::Low,
                timestamp: now,
            });
        }
    }

    if recommendations.is_empty() {
        recommendations.push(Recommendation {
            message: "All systems optimized.".to_owned(),
            severity: Severity::Low,
            timestamp: now,
        });
    }

    recommendations
}

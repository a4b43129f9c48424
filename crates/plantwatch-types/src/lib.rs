//! Shared type definitions for the plantwatch fleet telemetry feed.
//!
//! This crate is the single source of truth for all types that cross
//! crate boundaries in the plantwatch workspace: telemetry readings,
//! derived rule-engine outputs, the published snapshot bundle, and the
//! subscriber identifier.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for subscriber identifiers
//! - [`enums`] -- Machine status, recommendation severity, anomaly rules
//! - [`structs`] -- Readings, anomalies, risk scores, recommendations,
//!   and the per-tick snapshot
//!
//! # Wire compatibility
//!
//! The serde representations here define the public JSON contract of
//! the feed. Field renames (`type`, `cycle_time`, `msg`, `time`) and
//! lowercase enum values are load-bearing: existing dashboard clients
//! parse exactly these keys. Do not change them without versioning the
//! wire format.

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{AnomalyRule, MachineStatus, Severity};
pub use ids::SubscriberId;
pub use structs::{Anomaly, FleetSnapshot, Reading, Recommendation, RiskScore};

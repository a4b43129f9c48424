//! Per-machine telemetry simulator.
//!
//! Each [`MachineSimulator`] owns one machine's operating state and
//! produces exactly one [`Reading`] per tick. The state machine is
//! deliberately simple:
//!
//! - With probability `flip_chance` (default 0.01) the status re-rolls
//!   uniformly across {operational, idle, error}; a self-transition
//!   counts as a transition.
//! - Otherwise, a machine in the error state recovers to operational
//!   with probability `recovery_chance` (default 0.10). Idle and
//!   operational machines have no autonomous transition besides the
//!   re-roll.
//!
//! Reading generation branches on the post-transition status. The
//! operational branch layers a sinusoidal load trend over the machine's
//! base power so charts show a recognizable duty cycle rather than
//! white noise.
//!
//! All randomness flows through the caller-supplied [`Rng`], so the
//! same seed always produces the same telemetry sequence.

use chrono::{DateTime, Utc};
use rand::Rng;

use plantwatch_types::{MachineStatus, Reading};

use crate::config::{MachineConfig, TransitionConfig};
use crate::round::{round2, round3};

/// Amplitude of the sinusoidal load trend, watts.
const TREND_AMPLITUDE_WATTS: f64 = 50.0;

/// Tick divisor controlling the load trend period.
const TREND_PERIOD_DIVISOR: f64 = 10.0;

/// Power draw above this adds the high-load vibration bonus.
const HIGH_LOAD_WATTS: f64 = 400.0;

/// Extra vibration while drawing high-load power.
const HIGH_LOAD_VIBRATION_BONUS: f64 = 0.5;

/// Lower temperature clamp while idle, degrees Celsius.
const IDLE_TEMPERATURE_FLOOR: f64 = 20.0;

/// One machine's stateful telemetry generator.
///
/// Owned exclusively by the tick driver for the process lifetime;
/// nothing outside [`advance`](Self::advance) mutates the status.
#[derive(Debug, Clone)]
pub struct MachineSimulator {
    /// Stable machine identifier.
    id: String,
    /// Machine category label.
    kind: String,
    /// Monotonically increasing tick counter driving the load trend.
    tick_count: u64,
    /// Current operating state.
    status: MachineStatus,
    /// Nominal operational power draw, watts.
    base_power: f64,
    /// Nominal temperature, degrees Celsius.
    base_temperature: f64,
    /// Per-tick probability of a uniform status re-roll, clamped to [0, 1].
    flip_chance: f64,
    /// Per-tick probability of error recovery, clamped to [0, 1].
    recovery_chance: f64,
}

impl MachineSimulator {
    /// Create a simulator from its machine and transition configuration.
    ///
    /// The machine starts operational at tick 0. Transition
    /// probabilities outside `[0, 1]` are clamped.
    pub fn new(machine: &MachineConfig, transitions: &TransitionConfig) -> Self {
        Self::from_parts(machine, transitions, MachineStatus::Operational, 0)
    }

    /// Create a simulator in an explicit state (useful for testing and
    /// state restoration).
    pub fn from_parts(
        machine: &MachineConfig,
        transitions: &TransitionConfig,
        status: MachineStatus,
        tick_count: u64,
    ) -> Self {
        Self {
            id: machine.id.clone(),
            kind: machine.kind.clone(),
            tick_count,
            status,
            base_power: machine.base_power,
            base_temperature: machine.base_temperature,
            flip_chance: transitions.flip_chance.clamp(0.0, 1.0),
            recovery_chance: transitions.recovery_chance.clamp(0.0, 1.0),
        }
    }

    /// Return the machine identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Return the current operating state.
    pub const fn status(&self) -> MachineStatus {
        self.status
    }

    /// Return the number of ticks this simulator has advanced.
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Advance one tick and emit this machine's telemetry reading.
    ///
    /// Applies the status transition rules, then generates the reading
    /// for the resulting state. Generation cannot fail: every value is
    /// drawn from a bounded range and the idle temperature is clamped
    /// to its floor.
    pub fn advance(&mut self, rng: &mut impl Rng, now: DateTime<Utc>) -> Reading {
        self.tick_count = self.tick_count.saturating_add(1);
        self.transition(rng);

        let (power, temperature, vibration, cycle_time) = match self.status {
            MachineStatus::Idle => {
                let power = rng.random_range(10.0..30.0);
                let temperature = (self.base_temperature - 10.0 + rng.random_range(-2.0..2.0))
                    .max(IDLE_TEMPERATURE_FLOOR);
                let vibration = rng.random_range(0.0..0.1);
                (power, temperature, vibration, 0.0)
            }
            MachineStatus::Error => {
                let power = rng.random_range(0.0..10.0);
                let temperature = self.base_temperature + rng.random_range(0.0..20.0);
                let vibration = rng.random_range(0.0..0.5);
                (power, temperature, vibration, 0.0)
            }
            MachineStatus::Operational => {
                #[allow(clippy::cast_precision_loss)]
                let phase = self.tick_count as f64 / TREND_PERIOD_DIVISOR;
                let trend = TREND_AMPLITUDE_WATTS * phase.sin();
                let power = self.base_power + trend + rng.random_range(-20.0..20.0);
                let temperature =
                    self.base_temperature + power / 20.0 + rng.random_range(-5.0..5.0);
                let high_load_bonus = if power > HIGH_LOAD_WATTS {
                    HIGH_LOAD_VIBRATION_BONUS
                } else {
                    0.0
                };
                let vibration = rng.random_range(0.1..0.8) + high_load_bonus;
                let cycle_time = rng.random_range(30.0..60.0);
                (power, temperature, vibration, cycle_time)
            }
        };

        Reading {
            id: self.id.clone(),
            kind: self.kind.clone(),
            power: round2(power),
            voltage: round2(rng.random_range(215.0..235.0)),
            temperature: round2(temperature),
            vibration: round3(vibration),
            status: self.status,
            cycle_time: round2(cycle_time),
            timestamp: now,
        }
    }

    /// Apply the per-tick status transition rules.
    ///
    /// The uniform re-roll is drawn first; the error recovery draw only
    /// happens when the re-roll did not fire.
    fn transition(&mut self, rng: &mut impl Rng) {
        if rng.random_bool(self.flip_chance) {
            self.status = match rng.random_range(0..3_u8) {
                0 => MachineStatus::Operational,
                1 => MachineStatus::Idle,
                _ => MachineStatus::Error,
            };
        } else if self.status == MachineStatus::Error && rng.random_bool(self.recovery_chance) {
            self.status = MachineStatus::Operational;
        }
    }
}

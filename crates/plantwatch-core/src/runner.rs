//! Supervised feed driver: the tick loop with a failure boundary.
//!
//! [`run_feed`] is the only writer of simulator state and the snapshot
//! store. Each iteration asks the [`SnapshotSource`] for the next
//! snapshot and publishes it; publication is fire-and-forget relative
//! to the tick cadence because every subscriber has its own bounded
//! queue.
//!
//! A failed tick is isolated rather than fatal: the error is logged,
//! the previous snapshot stays current, and the loop resumes after the
//! configured backoff. Nothing short of task cancellation stops the
//! driver once it is running.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info};

use crate::config::SimulationConfig;
use crate::store::SnapshotStore;
use crate::tick::SnapshotSource;

/// Timing and bounds for the feed driver.
#[derive(Debug, Clone)]
pub struct FeedOptions {
    /// Delay between successful ticks.
    pub tick_interval: Duration,
    /// Delay before retrying after a failed tick.
    pub failure_backoff: Duration,
    /// Stop after this many published snapshots (0 = run forever).
    pub max_ticks: u64,
}

impl FeedOptions {
    /// Derive driver options from the loaded configuration, with no
    /// tick bound.
    pub const fn from_config(config: &SimulationConfig) -> Self {
        Self {
            tick_interval: Duration::from_secs(config.fleet.tick_interval_seconds),
            failure_backoff: Duration::from_secs(config.fleet.failure_backoff_seconds),
            max_ticks: 0,
        }
    }
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            failure_backoff: Duration::from_secs(5),
            max_ticks: 0,
        }
    }
}

/// Counters describing a bounded feed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedStats {
    /// Number of snapshots successfully published.
    pub published: u64,
    /// Number of tick failures that were absorbed.
    pub failures: u64,
}

/// Run the tick loop, publishing each snapshot to the store.
///
/// With `max_ticks == 0` this runs until the surrounding task is
/// cancelled; otherwise it returns counters once the bound is reached.
/// Tick failures never terminate the loop -- they are logged, the
/// stale snapshot is retained, and the driver sleeps
/// `failure_backoff` before trying again.
pub async fn run_feed(
    source: &mut dyn SnapshotSource,
    store: &Arc<SnapshotStore>,
    options: &FeedOptions,
) -> FeedStats {
    info!(
        tick_interval = ?options.tick_interval,
        failure_backoff = ?options.failure_backoff,
        max_ticks = options.max_ticks,
        "feed driver starting"
    );

    let mut stats = FeedStats {
        published: 0,
        failures: 0,
    };

    loop {
        match source.next_snapshot(Utc::now()) {
            Ok(snapshot) => {
                let sequence = snapshot.sequence;
                let anomaly_count = snapshot.anomalies.len();
                let receivers = store.publish(snapshot).await;
                debug!(sequence, anomaly_count, receivers, "snapshot published");

                stats.published = stats.published.saturating_add(1);
                if options.max_ticks > 0 && stats.published >= options.max_ticks {
                    return stats;
                }

                tokio::time::sleep(options.tick_interval).await;
            }
            Err(e) => {
                // Keep the previous snapshot current; a bad tick must
                // never take the feed down.
                error!(error = %e, "tick failed, retaining previous snapshot");
                stats.failures = stats.failures.saturating_add(1);
                tokio::time::sleep(options.failure_backoff).await;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, Utc};
    use plantwatch_types::FleetSnapshot;

    use super::*;
    use crate::config::SimulationConfig;
    use crate::tick::{Fleet, TickError};

    /// Driver options tuned for fast tests.
    fn fast_options(max_ticks: u64) -> FeedOptions {
        FeedOptions {
            tick_interval: Duration::from_millis(1),
            failure_backoff: Duration::from_millis(1),
            max_ticks,
        }
    }

    /// A source that fails on specific calls and otherwise delegates to
    /// a real fleet.
    struct FaultInjectingSource {
        fleet: Fleet,
        calls: u64,
        fail_on_calls: Vec<u64>,
    }

    impl SnapshotSource for FaultInjectingSource {
        fn next_snapshot(&mut self, now: DateTime<Utc>) -> Result<FleetSnapshot, TickError> {
            self.calls = self.calls.saturating_add(1);
            if self.fail_on_calls.contains(&self.calls) {
                return Err(TickError::SequenceOverflow);
            }
            self.fleet.run_tick(now)
        }
    }

    #[tokio::test]
    async fn bounded_run_publishes_exactly_max_ticks() {
        let mut fleet = Fleet::from_config(&SimulationConfig::default()).unwrap();
        let store = Arc::new(SnapshotStore::new());

        let stats = run_feed(&mut fleet, &store, &fast_options(5)).await;

        assert_eq!(stats.published, 5);
        assert_eq!(stats.failures, 0);
        assert_eq!(store.current().await.sequence, 5);
    }

    #[tokio::test]
    async fn tick_failure_retains_previous_snapshot_and_resumes() {
        let fleet = Fleet::from_config(&SimulationConfig::default()).unwrap();
        let mut source = FaultInjectingSource {
            fleet,
            calls: 0,
            fail_on_calls: vec![2],
        };
        let store = Arc::new(SnapshotStore::new());

        // Two published snapshots with one failure between them.
        let stats = run_feed(&mut source, &store, &fast_options(2)).await;

        assert_eq!(stats.published, 2);
        assert_eq!(stats.failures, 1);
        // The failed call did not consume a sequence number: the feed
        // resumed with a strictly increasing sequence.
        assert_eq!(store.current().await.sequence, 2);
    }

    #[tokio::test]
    async fn failure_leaves_current_unchanged_until_next_success() {
        let fleet = Fleet::from_config(&SimulationConfig::default()).unwrap();
        let mut source = FaultInjectingSource {
            fleet,
            calls: 0,
            fail_on_calls: vec![2, 3, 4],
        };
        let store = Arc::new(SnapshotStore::new());

        // First publish succeeds, then three consecutive failures are
        // absorbed before the second publish.
        let stats = run_feed(&mut source, &store, &fast_options(2)).await;

        assert_eq!(stats.published, 2);
        assert_eq!(stats.failures, 3);
        assert_eq!(store.current().await.sequence, 2);
    }

    #[tokio::test]
    async fn subscribers_see_published_sequence_across_failures() {
        let fleet = Fleet::from_config(&SimulationConfig::default()).unwrap();
        let mut source = FaultInjectingSource {
            fleet,
            calls: 0,
            fail_on_calls: vec![1],
        };
        let store = Arc::new(SnapshotStore::new());
        let mut sub = store.subscribe().await;

        let _ = run_feed(&mut source, &store, &fast_options(3)).await;

        // The subscriber observes only successful publishes, strictly
        // ordered.
        for expected in 1..=3 {
            assert_eq!(sub.next().await.unwrap().sequence, expected);
        }
    }

    #[test]
    fn options_derive_from_config() {
        let config = SimulationConfig::default();
        let options = FeedOptions::from_config(&config);
        assert_eq!(options.tick_interval, Duration::from_secs(1));
        assert_eq!(options.failure_backoff, Duration::from_secs(5));
        assert_eq!(options.max_ticks, 0);
    }
}

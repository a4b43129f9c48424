//! Error types for the feed engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup. Once the tick loop is running
//! nothing propagates here: tick failures are absorbed by the driver's
//! supervision boundary.

/// Top-level error for the feed engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: plantwatch_core::ConfigError,
    },

    /// Fleet construction failed.
    #[error("fleet error: {source}")]
    Fleet {
        /// The underlying fleet error.
        #[from]
        source: plantwatch_core::FleetError,
    },

    /// Feed API server failed to start.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying startup error.
        #[from]
        source: plantwatch_observer::StartupError,
    },
}

//! Error types for the engine binary.

/// Top-level error that `main` propagates with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ecosim_core::config::ConfigError,
    },

    /// Simulation state construction failed.
    #[error("setup error: {source}")]
    Setup {
        /// The underlying tick error.
        #[from]
        source: ecosim_core::tick::TickError,
    },

    /// The scheduler ended with an error.
    #[error("scheduler error: {source}")]
    Scheduler {
        /// The underlying scheduler error.
        #[from]
        source: ecosim_core::scheduler::SchedulerError,
    },

    /// The observer server could not bind or failed while serving.
    #[error("observer error: {source}")]
    Observer {
        /// The underlying server error.
        #[from]
        source: ecosim_observer::ServerError,
    },

    /// The logging subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },
}

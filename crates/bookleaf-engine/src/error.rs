//! Error types for the simulation binary.

/// Top-level error for the simulation binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: bookleaf_core::ConfigError,
    },

    /// An engine operation failed.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: bookleaf_core::EngineError,
    },

    /// A command-line argument could not be parsed.
    #[error("invalid argument {name}: {message}")]
    Args {
        /// Which argument was wrong.
        name: &'static str,
        /// Why it was rejected.
        message: String,
    },
}

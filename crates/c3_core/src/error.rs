//! Error types for the network subsystem.
//!
//! Rule-level irregularities (a rejected attachment, a stale master, a full
//! network) are never errors: they surface as `false`, `None` or `0`. The
//! variants here cover the cases a caller cannot repair locally.

use thiserror::Error;

use crate::units::UnitId;

/// Result type alias using [`NetworkError`].
pub type Result<T> = std::result::Result<T, NetworkError>;

/// Top-level error type for the network subsystem.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// The boosted jamming test reported a unit as jammed while the standard
    /// test did not. Jamming state computed elsewhere is inconsistent.
    #[error("Jamming inconsistency on unit {unit}: boosted test jammed, standard test clear")]
    JammingInconsistency {
        /// Unit whose jamming state disagreed.
        unit: UnitId,
    },

    /// Unit identifier not present in the roster.
    #[error("Unknown unit ID: {0}")]
    UnknownUnit(UnitId),

    /// Rules file parsing error.
    #[error("Failed to parse rules '{path}': {message}")]
    DataParseError {
        /// Source name of the document that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Invalid or unreadable persisted state.
    #[error("Invalid network state: {0}")]
    InvalidState(String),
}

//! Error taxonomy shared by every subcommand.

use thiserror::Error;

/// Failures surfaced to the user. All of them map to exit code 1; usage
/// errors are clap parse errors and are handled at the entrypoint.
#[derive(Debug, Error)]
pub enum Error {
    /// The OS audio subsystem could not be reached at all. Fatal, never
    /// retried.
    #[error("audio backend unavailable: {0}")]
    BackendUnavailable(String),

    /// No session matched the requested process name.
    #[error("no audio session found for \"{0}\"")]
    NotFound(String),

    /// The volume argument was not a number in [0, 100] or [0.0, 1.0].
    #[error("invalid volume \"{0}\": expected 0-100 or 0.0-1.0")]
    InvalidVolume(String),

    /// The interactive selection was not a listed position.
    #[error("invalid selection \"{0}\"")]
    InvalidSelection(String),

    /// A live session operation failed after enumeration succeeded.
    #[error("audio session operation failed: {0}")]
    Backend(String),

    /// Writing to the output stream failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

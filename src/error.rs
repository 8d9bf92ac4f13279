use thiserror::Error;

/// An error raised by the simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// The environment could not be built from the given attributes.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// The action supplied to `step` was malformed.
    #[error("invalid action: {0}")]
    InvalidAction(String),
    /// `step` was called on a finished episode without an intervening `reset`.
    #[error("episode is over; call reset before stepping again")]
    EpisodeOver,
}

pub type Result<T> = std::result::Result<T, SimError>;

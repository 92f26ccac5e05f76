//! Domain invariant violations

use crate::domain::value_objects::PlotId;

/// Errors raised when a domain invariant does not hold
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Episode length must be one of 300, 600, 900, 1000, 1200 (got {0})")]
    InvalidEpisodeLength(u32),

    #[error("Unknown character role: {0}")]
    UnknownRole(String),

    #[error("Max characters reached ({max})")]
    CharacterLimitReached { max: usize },

    #[error("Plot {plot_id} has episode number {found} at position {expected}")]
    EpisodeOutOfSequence {
        plot_id: PlotId,
        expected: u32,
        found: u32,
    },

    #[error("Plot id must not be empty")]
    MissingPlotId,
}

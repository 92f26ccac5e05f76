//! Value objects - Immutable objects defined by their attributes

mod ids;
mod story;

pub use ids::*;
pub use story::{EpisodeLength, RoleArchetype, LEGACY_WRITING_STYLE, WRITING_STYLES};

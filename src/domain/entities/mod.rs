//! Domain entities - Core business objects with identity

mod character;
mod episode;
mod plot;

pub use character::{split_traits, Character, AI_DIRECTOR_ATTRIBUTION};
pub use episode::{Episode, EPISODE_SUMMARY_POINTS};
pub use plot::{NewEpisode, Plot, PlotDraft, MAX_CHARACTERS};

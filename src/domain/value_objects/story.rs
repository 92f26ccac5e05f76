//! Story value objects - writing styles, character archetypes, episode lengths

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Writing styles offered to the model when expanding a plot.
///
/// A plot's `writing_style` is a free string so users can keep a custom
/// style; this list only constrains generation.
pub const WRITING_STYLES: &[&str] = &[
    "Novel",
    "Plain English",
    "Casual",
    "Literary",
    "South Indian English",
    "North Indian English",
];

/// Style assigned to legacy records that only carried a `tone`
pub const LEGACY_WRITING_STYLE: &str = "Plain English";

/// Character archetype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleArchetype {
    Hero,
    Villain,
    Mentor,
    Sidekick,
    Rival,
    Antihero,
    Trickster,
    Narrator,
}

impl RoleArchetype {
    pub const ALL: [RoleArchetype; 8] = [
        Self::Hero,
        Self::Villain,
        Self::Mentor,
        Self::Sidekick,
        Self::Rival,
        Self::Antihero,
        Self::Trickster,
        Self::Narrator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hero => "Hero",
            Self::Villain => "Villain",
            Self::Mentor => "Mentor",
            Self::Sidekick => "Sidekick",
            Self::Rival => "Rival",
            Self::Antihero => "Antihero",
            Self::Trickster => "Trickster",
            Self::Narrator => "Narrator",
        }
    }

    /// Comma-separated list used in prompts
    pub fn prompt_list() -> String {
        Self::ALL
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for RoleArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleArchetype {
    type Err = DomainError;

    /// Case-insensitive; tolerates "Anti-hero" and surrounding whitespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        Self::ALL
            .into_iter()
            .find(|r| r.as_str().to_lowercase() == normalized)
            .ok_or_else(|| DomainError::UnknownRole(s.to_string()))
    }
}

/// Target word count for an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum EpisodeLength {
    Brief,
    #[default]
    Short,
    Standard,
    Long,
    Extended,
}

impl EpisodeLength {
    pub const ALL: [EpisodeLength; 5] = [
        Self::Brief,
        Self::Short,
        Self::Standard,
        Self::Long,
        Self::Extended,
    ];

    pub fn words(&self) -> u32 {
        match self {
            Self::Brief => 300,
            Self::Short => 600,
            Self::Standard => 900,
            Self::Long => 1000,
            Self::Extended => 1200,
        }
    }

    pub fn from_words(words: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|l| u64::from(l.words()) == words)
    }

    /// "300, 600, 900, 1000, 1200"
    pub fn prompt_list() -> String {
        Self::ALL
            .iter()
            .map(|l| l.words().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl TryFrom<u32> for EpisodeLength {
    type Error = DomainError;

    fn try_from(words: u32) -> Result<Self, Self::Error> {
        Self::from_words(u64::from(words)).ok_or(DomainError::InvalidEpisodeLength(words))
    }
}

impl From<EpisodeLength> for u32 {
    fn from(length: EpisodeLength) -> u32 {
        length.words()
    }
}

impl fmt::Display for EpisodeLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.words())
    }
}

//! Generation DTOs - shapes produced by the generation service and accepted
//! by the generation routes

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Character, NewEpisode};
use crate::domain::value_objects::{EpisodeLength, RoleArchetype};

/// Request body for plot-detail expansion.
#[derive(Debug, Deserialize)]
pub struct PlotDetailsRequestDto {
    #[serde(default)]
    pub input: Option<String>,
}

/// Request body for plot refinement.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinePlotRequestDto {
    #[serde(default)]
    pub raw_input: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefinePlotResponseDto {
    pub text: String,
}

/// Partial plot draft; fields the model did not produce stay unset.
///
/// Serializes to `{}` when nothing could be generated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writing_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_length: Option<EpisodeLength>,
}

impl PlotDetails {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A character proposed by the model or submitted by a user, before it has
/// an id or a join episode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterInput {
    pub name: String,
    /// Unset when the model proposed a role outside the archetype set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleArchetype>,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default)]
    pub speaking_style: String,
    #[serde(default)]
    pub motivation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<String>,
    #[serde(default)]
    pub characterization: String,
    #[serde(default)]
    pub submitted_by: String,
    #[serde(default)]
    pub is_default: bool,
}

impl CharacterInput {
    /// Build a cast member; `None` when no archetype was chosen
    pub fn into_character(self) -> Option<Character> {
        let role = self.role?;
        let mut character = Character::new(self.name, role)
            .with_traits(self.traits)
            .with_speaking_style(self.speaking_style)
            .with_motivation(self.motivation)
            .with_characterization(self.characterization)
            .submitted_by(self.submitted_by);
        character.secret = self.secret;
        character.relationships = self.relationships;
        character.is_default = self.is_default;
        Some(character)
    }
}

/// Result of generating the next episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedEpisode {
    pub title: String,
    pub text: String,
    pub summary: Vec<String>,
    /// Updated story memory
    pub memory: String,
    pub characters_used: Vec<String>,
}

impl From<GeneratedEpisode> for NewEpisode {
    fn from(generated: GeneratedEpisode) -> Self {
        NewEpisode {
            title: generated.title,
            content: generated.text,
            summary: generated.summary,
            characters_used: generated.characters_used,
            story_memory: generated.memory,
        }
    }
}

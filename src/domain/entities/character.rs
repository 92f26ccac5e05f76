//! Character entity - cast members with an archetype and a join episode

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::value_objects::{CharacterId, RoleArchetype};

/// Attribution stamped on characters the model proposes
pub const AI_DIRECTOR_ATTRIBUTION: &str = "Director (AI)";

/// A character in a plot's cast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub role: RoleArchetype,
    /// Accepts either a list or the comma separated string older clients sent
    #[serde(default, deserialize_with = "deserialize_traits")]
    pub traits: Vec<String>,
    #[serde(default)]
    pub speaking_style: String,
    #[serde(default)]
    pub motivation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<String>,
    /// Free-text personality prompt
    #[serde(default)]
    pub characterization: String,
    #[serde(default)]
    pub submitted_by: String,
    /// Seeded by the model rather than submitted by a user
    #[serde(default)]
    pub is_default: bool,
    /// First episode this character may appear in
    #[serde(default = "first_episode")]
    pub joined_at_episode: u32,
}

fn first_episode() -> u32 {
    1
}

impl Character {
    pub fn new(name: impl Into<String>, role: RoleArchetype) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            role,
            traits: Vec::new(),
            speaking_style: String::new(),
            motivation: String::new(),
            secret: None,
            relationships: None,
            characterization: String::new(),
            submitted_by: String::new(),
            is_default: false,
            joined_at_episode: 1,
        }
    }

    pub fn with_traits(mut self, traits: Vec<String>) -> Self {
        self.traits = traits;
        self
    }

    pub fn with_motivation(mut self, motivation: impl Into<String>) -> Self {
        self.motivation = motivation.into();
        self
    }

    pub fn with_speaking_style(mut self, style: impl Into<String>) -> Self {
        self.speaking_style = style.into();
        self
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn with_characterization(mut self, characterization: impl Into<String>) -> Self {
        self.characterization = characterization.into();
        self
    }

    pub fn submitted_by(mut self, author: impl Into<String>) -> Self {
        self.submitted_by = author.into();
        self
    }

    pub fn joining_at(mut self, episode_number: u32) -> Self {
        self.joined_at_episode = episode_number;
        self
    }

    /// Whether the character may appear in the given episode
    pub fn is_eligible_for(&self, episode_number: u32) -> bool {
        self.joined_at_episode <= episode_number
    }

    /// Whether the given episode is the one that introduces this character
    pub fn is_introduced_in(&self, episode_number: u32) -> bool {
        self.joined_at_episode == episode_number
    }
}

/// Split a comma separated trait string into trimmed, non-empty entries
pub fn split_traits(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn deserialize_traits<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TraitsInput {
        List(Vec<String>),
        Text(String),
    }

    Ok(match Option::<TraitsInput>::deserialize(deserializer)? {
        Some(TraitsInput::List(list)) => list,
        Some(TraitsInput::Text(text)) => split_traits(&text),
        None => Vec::new(),
    })
}

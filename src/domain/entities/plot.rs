//! Plot entity - the story root owning its cast and episodes

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Character, Episode};
use crate::domain::error::DomainError;
use crate::domain::value_objects::{DirectorId, EpisodeId, EpisodeLength, PlotId};

/// Maximum cast size for a single plot
pub const MAX_CHARACTERS: usize = 10;

/// Story foundation collected before a plot exists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotDraft {
    pub title: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub writing_style: String,
    #[serde(default)]
    pub setting: String,
    /// 2-4 sentence story summary
    #[serde(default)]
    pub plot: String,
    #[serde(default)]
    pub rules: String,
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub episode_length: EpisodeLength,
}

/// Content of an episode about to be appended
#[derive(Debug, Clone, PartialEq)]
pub struct NewEpisode {
    pub title: String,
    pub content: String,
    pub summary: Vec<String>,
    pub characters_used: Vec<String>,
    /// Replaces the plot's running memory
    pub story_memory: String,
}

/// A serialized story
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plot {
    pub id: PlotId,
    pub title: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub writing_style: String,
    #[serde(default)]
    pub setting: String,
    #[serde(default)]
    pub plot: String,
    #[serde(default)]
    pub rules: String,
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub episode_length: EpisodeLength,
    #[serde(default)]
    pub characters: Vec<Character>,
    pub episodes: Vec<Episode>,
    /// Running summary of everything that happened so far
    #[serde(default)]
    pub story_memory: String,
    /// Epoch milliseconds
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub director_id: DirectorId,
}

impl Plot {
    pub fn from_draft(director_id: DirectorId, draft: PlotDraft) -> Self {
        Self {
            id: PlotId::new(),
            title: draft.title,
            genre: draft.genre,
            writing_style: draft.writing_style,
            setting: draft.setting,
            plot: draft.plot,
            rules: draft.rules,
            objective: draft.objective,
            episode_length: draft.episode_length,
            characters: Vec::new(),
            episodes: Vec::new(),
            story_memory: String::new(),
            created_at: chrono::Utc::now().timestamp_millis(),
            director_id,
        }
    }

    /// Number the next generated episode will carry
    pub fn next_episode_number(&self) -> u32 {
        self.episodes.len() as u32 + 1
    }

    /// Up to `count` most recent episodes, oldest first
    pub fn recent_episodes(&self, count: usize) -> &[Episode] {
        let start = self.episodes.len().saturating_sub(count);
        &self.episodes[start..]
    }

    /// Characters allowed to appear in the given episode
    pub fn cast_for_episode(&self, episode_number: u32) -> impl Iterator<Item = &Character> {
        self.characters
            .iter()
            .filter(move |c| c.is_eligible_for(episode_number))
    }

    /// Characters the given episode has to introduce
    pub fn characters_introduced_in(
        &self,
        episode_number: u32,
    ) -> impl Iterator<Item = &Character> {
        self.characters
            .iter()
            .filter(move |c| c.is_introduced_in(episode_number))
    }

    /// Add a character that joins with the next episode
    pub fn add_character(&mut self, mut character: Character) -> Result<&Character, DomainError> {
        if self.characters.len() >= MAX_CHARACTERS {
            return Err(DomainError::CharacterLimitReached {
                max: MAX_CHARACTERS,
            });
        }
        character.joined_at_episode = self.next_episode_number();
        self.characters.push(character);
        Ok(&self.characters[self.characters.len() - 1])
    }

    /// Append the next episode and replace the story memory
    pub fn append_episode(&mut self, installment: NewEpisode) -> &Episode {
        let episode = Episode {
            id: EpisodeId::new(),
            plot_id: self.id.clone(),
            episode_number: self.next_episode_number(),
            title: installment.title,
            content: installment.content,
            summary: installment.summary,
            characters_used: installment.characters_used,
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        self.episodes.push(episode);
        self.story_memory = installment.story_memory;
        &self.episodes[self.episodes.len() - 1]
    }

    /// Check the id, cast size and episode numbering invariants
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.id.is_empty() {
            return Err(DomainError::MissingPlotId);
        }
        if self.characters.len() > MAX_CHARACTERS {
            return Err(DomainError::CharacterLimitReached {
                max: MAX_CHARACTERS,
            });
        }
        for (idx, episode) in self.episodes.iter().enumerate() {
            let expected = idx as u32 + 1;
            if episode.episode_number != expected {
                return Err(DomainError::EpisodeOutOfSequence {
                    plot_id: self.id.clone(),
                    expected,
                    found: episode.episode_number,
                });
            }
        }
        Ok(())
    }
}

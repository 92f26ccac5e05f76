//! Generation Service - story generation use cases
//!
//! Orchestrates the four generation operations over whichever AI adapter was
//! selected at startup:
//!
//! - Expanding a genre or concept into a full plot draft
//! - Refining a raw idea into a short plot summary
//! - Seeding a default cast for a draft
//! - Writing the next episode while keeping continuity with the story memory
//!
//! Plot details, characters and refinement soft-fail so the caller always has
//! something to show. Episode generation is the only hard failure.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, info, instrument, warn};

use crate::application::dto::{CharacterInput, GeneratedEpisode, PlotDetails};
use crate::application::ports::outbound::{AiError, AiPort, GenerateOptions, ModelTier};
use crate::application::services::llm::{prompt_builder, response_parser, EpisodeContext, ParseError};
use crate::domain::entities::{Plot, PlotDraft};

/// Thinking budget granted to the creative episode attempt
pub const CREATIVE_THINKING_BUDGET: u32 = 1024;

/// Message surfaced when both episode attempts fail
pub const EPISODE_FAILURE_MESSAGE: &str = "Failed to generate episode. Quota exceeded or AI error.";

/// Errors from generation operations
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("AI error: {0}")]
    Ai(#[from] AiError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Every attempt at the next episode failed
    #[error("Failed to generate episode. Quota exceeded or AI error.")]
    EpisodeFailed {
        #[source]
        last: Box<GenerationError>,
    },
}

/// Service for the AI-backed story operations
#[derive(Clone)]
pub struct GenerationService {
    ai: Arc<dyn AiPort>,
}

impl GenerationService {
    pub fn new(ai: Arc<dyn AiPort>) -> Self {
        Self { ai }
    }

    /// Expand free text into a partial plot draft.
    ///
    /// Returns an empty draft when the provider fails or the reply cannot be
    /// parsed.
    #[instrument(skip(self), fields(provider = %self.ai.name()))]
    pub async fn generate_plot_details(&self, input: &str) -> PlotDetails {
        let request = prompt_builder::plot_details_prompt(input);
        let options = GenerateOptions {
            json_schema: request.schema,
            ..GenerateOptions::default()
        };

        let result = match self.ai.generate_content(&request.prompt, options).await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "Plot details generation failed");
                return PlotDetails::default();
            }
        };

        match response_parser::normalize_plot_details(&result.text) {
            Ok(details) => {
                debug!(title = ?details.title, "Generated plot details");
                details
            }
            Err(e) => {
                error!(error = %e, "Could not parse plot details");
                PlotDetails::default()
            }
        }
    }

    /// Condense a raw idea into a 2-4 sentence plot summary.
    ///
    /// Blank input returns an empty string without calling the provider. Any
    /// failure, or an empty reply, returns the trimmed input.
    #[instrument(skip(self, raw_input), fields(provider = %self.ai.name()))]
    pub async fn refine_plot(&self, raw_input: &str) -> String {
        let trimmed = raw_input.trim();
        if trimmed.is_empty() {
            return String::new();
        }

        let request = prompt_builder::refine_plot_prompt(trimmed);
        match self
            .ai
            .generate_content(&request.prompt, GenerateOptions::new())
            .await
        {
            Ok(result) if !result.text.trim().is_empty() => result.text.trim().to_string(),
            Ok(_) => {
                warn!("Refinement came back empty, keeping the original input");
                trimmed.to_string()
            }
            Err(e) => {
                error!(error = %e, "Plot refinement failed, keeping the original input");
                trimmed.to_string()
            }
        }
    }

    /// Propose a starting cast for a draft; empty on any failure
    #[instrument(skip(self, draft), fields(provider = %self.ai.name(), title = %draft.title))]
    pub async fn generate_default_characters(&self, draft: &PlotDraft) -> Vec<CharacterInput> {
        let request = prompt_builder::characters_prompt(draft);
        let options = GenerateOptions {
            json_schema: request.schema,
            ..GenerateOptions::default()
        };

        let result = match self.ai.generate_content(&request.prompt, options).await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "Character generation failed");
                return Vec::new();
            }
        };

        match response_parser::normalize_characters(&result.text) {
            Ok(cast) => {
                info!(count = cast.len(), "Generated default characters");
                cast
            }
            Err(e) => {
                error!(error = %e, "Could not parse generated characters");
                Vec::new()
            }
        }
    }

    /// Write the next episode of a plot.
    ///
    /// Adapters with a creative model get one creative attempt with a thinking
    /// budget; if it fails the same prompt is sent once to the fast model.
    /// A missing credential fails both, so it skips the fallback.
    /// The plot itself is not modified.
    #[instrument(skip(self, plot), fields(provider = %self.ai.name(), plot_id = %plot.id))]
    pub async fn generate_next_episode(
        &self,
        plot: &Plot,
    ) -> Result<GeneratedEpisode, GenerationError> {
        let context = EpisodeContext::from_plot(plot);
        let episode_number = context.episode_number;
        let request = prompt_builder::episode_prompt(plot, &context);

        debug!(
            episode_number,
            cast = context.cast.len(),
            new_characters = ?context.new_character_names(),
            "Generating episode"
        );

        let base = GenerateOptions {
            json_schema: request.schema,
            ..GenerateOptions::default()
        };

        if self.ai.supports_creative_model() {
            let creative = base
                .clone()
                .with_tier(ModelTier::Creative)
                .with_extra(json!({
                    "thinkingConfig": { "thinkingBudget": CREATIVE_THINKING_BUDGET }
                }));
            match self
                .attempt_episode(&request.prompt, creative, episode_number)
                .await
            {
                Ok(episode) => return Ok(episode),
                Err(GenerationError::Ai(e)) if e.is_configuration() => {
                    error!(error = %e, episode_number, "Episode generation failed");
                    return Err(GenerationError::EpisodeFailed {
                        last: Box::new(GenerationError::Ai(e)),
                    });
                }
                Err(e) => {
                    warn!(error = %e, "Creative model failed, falling back to the fast model");
                }
            }
        }

        self.attempt_episode(&request.prompt, base.with_tier(ModelTier::Fast), episode_number)
            .await
            .map_err(|e| {
                error!(error = %e, episode_number, "Episode generation failed");
                GenerationError::EpisodeFailed { last: Box::new(e) }
            })
    }

    async fn attempt_episode(
        &self,
        prompt: &str,
        options: GenerateOptions,
        episode_number: u32,
    ) -> Result<GeneratedEpisode, GenerationError> {
        let result = self.ai.generate_content(prompt, options).await?;
        let episode = response_parser::normalize_episode(&result.text, episode_number)?;
        info!(episode_number, title = %episode.title, "Generated episode");
        Ok(episode)
    }
}

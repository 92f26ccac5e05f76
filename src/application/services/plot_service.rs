//! Plot Service - Application service for plot lifecycle management
//!
//! Creating, updating and deleting plots, growing the cast, and appending
//! generated episodes.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::application::dto::{CharacterInput, GeneratedEpisode};
use crate::application::ports::outbound::{PlotRepositoryPort, RepositoryError};
use crate::application::services::generation_service::{GenerationError, GenerationService};
use crate::domain::entities::{Character, Plot, PlotDraft, MAX_CHARACTERS};
use crate::domain::error::DomainError;
use crate::domain::value_objects::{DirectorId, PlotId};

/// Errors from plot operations
#[derive(Debug, thiserror::Error)]
pub enum PlotServiceError {
    #[error("Plot not found: {0}")]
    NotFound(PlotId),

    #[error("{0}")]
    Invalid(#[from] DomainError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

pub type Result<T> = std::result::Result<T, PlotServiceError>;

/// Plot service trait defining the application use cases
#[async_trait]
pub trait PlotService: Send + Sync {
    /// List plots newest first, optionally for one director
    async fn list_plots(&self, director_id: Option<DirectorId>) -> Result<Vec<Plot>>;

    async fn get_plot(&self, id: &PlotId) -> Result<Plot>;

    /// Create a plot from a draft with its starting cast
    async fn create_plot(
        &self,
        director_id: DirectorId,
        draft: PlotDraft,
        characters: Vec<CharacterInput>,
    ) -> Result<Plot>;

    /// Replace a stored plot after checking its invariants
    async fn update_plot(&self, id: &PlotId, plot: Plot) -> Result<Plot>;

    /// Delete a plot with its characters and episodes
    async fn delete_plot(&self, id: &PlotId) -> Result<()>;

    /// Add a character that joins with the next episode
    async fn add_character(&self, plot_id: &PlotId, character: CharacterInput) -> Result<Plot>;

    /// Append a generated episode and replace the story memory
    async fn append_episode(&self, plot_id: &PlotId, episode: GeneratedEpisode) -> Result<Plot>;

    /// Generate the next episode and append it
    async fn generate_episode(&self, plot_id: &PlotId) -> Result<Plot>;
}

/// Default implementation of PlotService using a repository port
#[derive(Clone)]
pub struct PlotServiceImpl {
    repository: Arc<dyn PlotRepositoryPort>,
    generation: GenerationService,
}

impl PlotServiceImpl {
    pub fn new(repository: Arc<dyn PlotRepositoryPort>, generation: GenerationService) -> Self {
        Self {
            repository,
            generation,
        }
    }

    async fn load(&self, id: &PlotId) -> Result<Plot> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| PlotServiceError::NotFound(id.clone()))
    }

    fn validate_draft(draft: &PlotDraft) -> Result<()> {
        if draft.title.trim().is_empty() {
            return Err(PlotServiceError::InvalidInput(
                "Plot title cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn to_character(input: CharacterInput) -> Result<Character> {
        if input.name.trim().is_empty() {
            return Err(PlotServiceError::InvalidInput(
                "Character name cannot be empty".to_string(),
            ));
        }
        let name = input.name.clone();
        input.into_character().ok_or_else(|| {
            PlotServiceError::InvalidInput(format!("Character {} needs a role", name))
        })
    }
}

#[async_trait]
impl PlotService for PlotServiceImpl {
    #[instrument(skip(self))]
    async fn list_plots(&self, director_id: Option<DirectorId>) -> Result<Vec<Plot>> {
        debug!("Listing plots");
        Ok(self.repository.list(director_id.as_ref()).await?)
    }

    #[instrument(skip(self, id), fields(plot_id = %id))]
    async fn get_plot(&self, id: &PlotId) -> Result<Plot> {
        self.load(id).await
    }

    #[instrument(skip(self, director_id, draft, characters), fields(director_id = %director_id, title = %draft.title))]
    async fn create_plot(
        &self,
        director_id: DirectorId,
        draft: PlotDraft,
        characters: Vec<CharacterInput>,
    ) -> Result<Plot> {
        Self::validate_draft(&draft)?;
        if characters.len() > MAX_CHARACTERS {
            return Err(DomainError::CharacterLimitReached {
                max: MAX_CHARACTERS,
            }
            .into());
        }

        let mut plot = Plot::from_draft(director_id, draft);
        for input in characters {
            plot.add_character(Self::to_character(input)?)?;
        }

        self.repository.save(&plot).await?;
        info!(
            plot_id = %plot.id,
            characters = plot.characters.len(),
            "Created plot: {}",
            plot.title
        );
        Ok(plot)
    }

    #[instrument(skip(self, id, plot), fields(plot_id = %id))]
    async fn update_plot(&self, id: &PlotId, mut plot: Plot) -> Result<Plot> {
        let existing = self.load(id).await?;
        plot.id = existing.id;
        plot.validate()?;

        self.repository.save(&plot).await?;
        info!(plot_id = %plot.id, "Updated plot: {}", plot.title);
        Ok(plot)
    }

    #[instrument(skip(self, id), fields(plot_id = %id))]
    async fn delete_plot(&self, id: &PlotId) -> Result<()> {
        if !self.repository.delete(id).await? {
            return Err(PlotServiceError::NotFound(id.clone()));
        }
        info!(plot_id = %id, "Deleted plot");
        Ok(())
    }

    #[instrument(skip(self, plot_id, character), fields(plot_id = %plot_id, name = %character.name))]
    async fn add_character(&self, plot_id: &PlotId, character: CharacterInput) -> Result<Plot> {
        let mut plot = self.load(plot_id).await?;
        let character = Self::to_character(character)?;

        let joined = plot.add_character(character)?.joined_at_episode;
        self.repository.save(&plot).await?;

        info!(joined_at_episode = joined, "Added character to plot");
        Ok(plot)
    }

    #[instrument(skip(self, plot_id, episode), fields(plot_id = %plot_id))]
    async fn append_episode(&self, plot_id: &PlotId, episode: GeneratedEpisode) -> Result<Plot> {
        let mut plot = self.load(plot_id).await?;

        let number = plot.append_episode(episode.into()).episode_number;
        self.repository.save(&plot).await?;

        info!(episode_number = number, "Appended episode");
        Ok(plot)
    }

    #[instrument(skip(self, plot_id), fields(plot_id = %plot_id))]
    async fn generate_episode(&self, plot_id: &PlotId) -> Result<Plot> {
        let plot = self.load(plot_id).await?;
        let episode = self.generation.generate_next_episode(&plot).await?;
        self.append_episode(plot_id, episode).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::application::ports::outbound::{AiError, GenerateResult};
    use crate::application::services::generation_service::tests::{
        episode_json, quota_error, reply, MockAi,
    };
    use crate::domain::value_objects::RoleArchetype;

    /// Repository keeping plots in a map
    #[derive(Default)]
    pub(crate) struct InMemoryPlotRepository {
        plots: Mutex<HashMap<PlotId, Plot>>,
    }

    #[async_trait]
    impl PlotRepositoryPort for InMemoryPlotRepository {
        async fn list(
            &self,
            director_id: Option<&DirectorId>,
        ) -> std::result::Result<Vec<Plot>, RepositoryError> {
            let mut plots: Vec<Plot> = self
                .plots
                .lock()
                .unwrap()
                .values()
                .filter(|p| director_id.map_or(true, |d| &p.director_id == d))
                .cloned()
                .collect();
            plots.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(plots)
        }

        async fn get(&self, id: &PlotId) -> std::result::Result<Option<Plot>, RepositoryError> {
            Ok(self.plots.lock().unwrap().get(id).cloned())
        }

        async fn save(&self, plot: &Plot) -> std::result::Result<(), RepositoryError> {
            self.plots
                .lock()
                .unwrap()
                .insert(plot.id.clone(), plot.clone());
            Ok(())
        }

        async fn delete(&self, id: &PlotId) -> std::result::Result<bool, RepositoryError> {
            Ok(self.plots.lock().unwrap().remove(id).is_some())
        }
    }

    fn service_with(replies: Vec<std::result::Result<GenerateResult, AiError>>) -> PlotServiceImpl {
        let ai = Arc::new(MockAi::new(false, replies));
        PlotServiceImpl::new(
            Arc::new(InMemoryPlotRepository::default()),
            GenerationService::new(ai),
        )
    }

    fn draft() -> PlotDraft {
        PlotDraft {
            title: "Glass Harbor".to_string(),
            ..PlotDraft::default()
        }
    }

    fn input(name: &str) -> CharacterInput {
        CharacterInput {
            name: name.to_string(),
            role: Some(RoleArchetype::Sidekick),
            ..CharacterInput::default()
        }
    }

    #[tokio::test]
    async fn test_create_plot_stamps_first_episode_on_cast() {
        let service = service_with(vec![]);
        let plot = service
            .create_plot(DirectorId::from("d1"), draft(), vec![input("Ada"), input("Bo")])
            .await
            .unwrap();

        assert_eq!(plot.characters.len(), 2);
        assert!(plot.characters.iter().all(|c| c.joined_at_episode == 1));
        assert_eq!(service.get_plot(&plot.id).await.unwrap(), plot);
    }

    #[tokio::test]
    async fn test_create_plot_rejects_oversized_cast_and_missing_roles() {
        let service = service_with(vec![]);
        let cast: Vec<CharacterInput> = (0..11).map(|i| input(&format!("C{}", i))).collect();
        let err = service
            .create_plot(DirectorId::from("d1"), draft(), cast)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Max characters reached (10)");

        let roleless = CharacterInput {
            name: "Nobody".to_string(),
            ..CharacterInput::default()
        };
        let err = service
            .create_plot(DirectorId::from("d1"), draft(), vec![roleless])
            .await
            .unwrap_err();
        assert!(matches!(err, PlotServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_add_character_joins_next_episode_and_enforces_cap() {
        let service = service_with(vec![]);
        let plot = service
            .create_plot(DirectorId::from("d1"), draft(), vec![])
            .await
            .unwrap();
        service
            .append_episode(
                &plot.id,
                GeneratedEpisode {
                    title: "One".to_string(),
                    text: "...".to_string(),
                    summary: vec!["a".to_string(); 5],
                    memory: "m1".to_string(),
                    characters_used: vec![],
                },
            )
            .await
            .unwrap();

        let plot = service.add_character(&plot.id, input("Late")).await.unwrap();
        assert_eq!(plot.characters[0].joined_at_episode, 2);

        for i in 0..9 {
            service
                .add_character(&plot.id, input(&format!("Extra {}", i)))
                .await
                .unwrap();
        }
        let err = service
            .add_character(&plot.id, input("Eleventh"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PlotServiceError::Invalid(DomainError::CharacterLimitReached { max: 10 })
        ));
    }

    #[tokio::test]
    async fn test_generate_episode_appends_and_replaces_memory() {
        let service = service_with(vec![reply(episode_json("First Light"))]);
        let plot = service
            .create_plot(DirectorId::from("d1"), draft(), vec![input("Mira")])
            .await
            .unwrap();

        let plot = service.generate_episode(&plot.id).await.unwrap();
        assert_eq!(plot.episodes.len(), 1);
        assert_eq!(plot.episodes[0].episode_number, 1);
        assert_eq!(plot.episodes[0].title, "First Light");
        assert_eq!(plot.story_memory, "The road is dark now.");
    }

    #[tokio::test]
    async fn test_generate_episode_failure_leaves_plot_untouched() {
        let service = service_with(vec![quota_error()]);
        let plot = service
            .create_plot(DirectorId::from("d1"), draft(), vec![])
            .await
            .unwrap();

        let err = service.generate_episode(&plot.id).await.unwrap_err();
        assert!(matches!(err, PlotServiceError::Generation(_)));
        assert!(service.get_plot(&plot.id).await.unwrap().episodes.is_empty());
    }

    #[tokio::test]
    async fn test_update_rejects_broken_numbering_and_unknown_ids() {
        let service = service_with(vec![]);
        let mut plot = service
            .create_plot(DirectorId::from("d1"), draft(), vec![])
            .await
            .unwrap();

        let err = service
            .update_plot(&PlotId::from("missing"), plot.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, PlotServiceError::NotFound(_)));

        plot.title = "Renamed".to_string();
        let updated = service.update_plot(&plot.id, plot.clone()).await.unwrap();
        assert_eq!(updated.title, "Renamed");

        let mut broken = updated.clone();
        broken.append_episode(GeneratedEpisode {
            title: "x".to_string(),
            text: "x".to_string(),
            summary: vec![],
            memory: "x".to_string(),
            characters_used: vec![],
        }
        .into());
        broken.episodes[0].episode_number = 2;
        assert!(matches!(
            service.update_plot(&plot.id, broken).await,
            Err(PlotServiceError::Invalid(DomainError::EpisodeOutOfSequence { .. }))
        ));
    }

    #[tokio::test]
    async fn test_delete_and_list_by_director() {
        let service = service_with(vec![]);
        let mine = service
            .create_plot(DirectorId::from("me"), draft(), vec![])
            .await
            .unwrap();
        service
            .create_plot(DirectorId::from("you"), draft(), vec![])
            .await
            .unwrap();

        let listed = service
            .list_plots(Some(DirectorId::from("me")))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(service.list_plots(None).await.unwrap().len(), 2);

        service.delete_plot(&mine.id).await.unwrap();
        assert!(matches!(
            service.delete_plot(&mine.id).await,
            Err(PlotServiceError::NotFound(_))
        ));
    }
}

//! Shared application state

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::application::ports::outbound::{AiPort, PlotRepositoryPort};
use crate::application::services::{GenerationService, PlotServiceImpl};
use crate::infrastructure::ai::select_adapter;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::persistence::{self, SqlitePlotRepository};

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    // Application services
    pub generation_service: GenerationService,
    pub plot_service: PlotServiceImpl,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        // Select the AI provider once for the process
        let ai = select_adapter(&config.ai);
        tracing::info!("  AI provider: {}", ai.name());

        // Initialize the plot store
        let pool = persistence::connect(&config.database_url).await?;
        let repository = SqlitePlotRepository::new(pool)
            .await
            .context("Failed to initialize plot storage")?;

        Ok(Self::with_components(config, ai, Arc::new(repository)))
    }

    /// Assemble state around an already built adapter and repository
    pub fn with_components(
        config: AppConfig,
        ai: Arc<dyn AiPort>,
        repository: Arc<dyn PlotRepositoryPort>,
    ) -> Self {
        let generation_service = GenerationService::new(ai);
        let plot_service = PlotServiceImpl::new(repository, generation_service.clone());

        Self {
            config,
            generation_service,
            plot_service,
        }
    }
}

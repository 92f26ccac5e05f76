//! Plot repository port - persistence contract for plots and their contents

use async_trait::async_trait;

use crate::domain::entities::Plot;
use crate::domain::error::DomainError;
use crate::domain::value_objects::{DirectorId, PlotId};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Stored plot is invalid: {0}")]
    Corrupt(#[from] DomainError),
}

/// Repository port for Plot aggregate operations.
///
/// A plot is stored as a whole: characters and episodes are saved and deleted
/// with it.
#[async_trait]
pub trait PlotRepositoryPort: Send + Sync {
    /// List plots, newest first, optionally limited to one director
    async fn list(&self, director_id: Option<&DirectorId>) -> Result<Vec<Plot>, RepositoryError>;

    async fn get(&self, id: &PlotId) -> Result<Option<Plot>, RepositoryError>;

    /// Insert or replace a plot
    async fn save(&self, plot: &Plot) -> Result<(), RepositoryError>;

    /// Delete a plot, returning whether it existed
    async fn delete(&self, id: &PlotId) -> Result<bool, RepositoryError>;
}

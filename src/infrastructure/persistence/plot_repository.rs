use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::SqlitePool;

use crate::application::ports::outbound::{PlotRepositoryPort, RepositoryError};
use crate::domain::entities::Plot;
use crate::domain::value_objects::{DirectorId, PlotId, LEGACY_WRITING_STYLE};

/// Plots stored as one JSON document per row
pub struct SqlitePlotRepository {
    pool: SqlitePool,
}

impl SqlitePlotRepository {
    pub async fn new(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS plots (
                id TEXT PRIMARY KEY,
                director_id TEXT NOT NULL,
                data TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )
        "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_plots_director ON plots (director_id)")
            .execute(&pool)
            .await?;

        Ok(Self { pool })
    }

    fn decode(data: &str) -> Result<Plot, RepositoryError> {
        let raw: Value =
            serde_json::from_str(data).map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let plot: Plot = serde_json::from_value(normalize_legacy_record(raw))
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        plot.validate()?;
        Ok(plot)
    }
}

/// Bring records written by older clients up to the current shape.
///
/// `theme` became `plot`; a record with a `tone` predates writing styles and
/// gets the plain style.
pub fn normalize_legacy_record(mut raw: Value) -> Value {
    let Some(object) = raw.as_object_mut() else {
        return raw;
    };

    if let Some(theme) = object.remove("theme") {
        if !has_text(object, "plot") {
            object.insert("plot".to_string(), theme);
        }
    }
    if object.remove("tone").is_some() && !has_text(object, "writingStyle") {
        object.insert(
            "writingStyle".to_string(),
            Value::String(LEGACY_WRITING_STYLE.to_string()),
        );
    }
    if !object.contains_key("episodes") {
        object.insert("episodes".to_string(), Value::Array(Vec::new()));
    }
    raw
}

fn has_text(object: &Map<String, Value>, key: &str) -> bool {
    object
        .get(key)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

#[async_trait]
impl PlotRepositoryPort for SqlitePlotRepository {
    async fn list(&self, director_id: Option<&DirectorId>) -> Result<Vec<Plot>, RepositoryError> {
        let rows: Vec<(String,)> = match director_id {
            Some(director_id) => {
                sqlx::query_as(
                    "SELECT data FROM plots WHERE director_id = ? ORDER BY created_at DESC",
                )
                .bind(director_id.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as("SELECT data FROM plots ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(|(data,)| Self::decode(data)).collect()
    }

    async fn get(&self, id: &PlotId) -> Result<Option<Plot>, RepositoryError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT data FROM plots WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        row.map(|(data,)| Self::decode(&data)).transpose()
    }

    async fn save(&self, plot: &Plot) -> Result<(), RepositoryError> {
        let data =
            serde_json::to_string(plot).map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        sqlx::query(
            "INSERT OR REPLACE INTO plots (id, director_id, data, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(plot.id.as_str())
        .bind(plot.director_id.as_str())
        .bind(data)
        .bind(plot.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        tracing::debug!(plot_id = %plot.id, "Saved plot");
        Ok(())
    }

    async fn delete(&self, id: &PlotId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM plots WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

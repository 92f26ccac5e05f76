//! Plot API routes

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::{CharacterInput, CreatePlotRequestDto, ListPlotsQueryDto};
use crate::application::services::PlotService;
use crate::domain::entities::Plot;
use crate::domain::value_objects::{DirectorId, PlotId};
use crate::infrastructure::http::{api_error, plot_error, ApiError};
use crate::infrastructure::state::AppState;

fn bad_body(what: &str, rejection: JsonRejection) -> ApiError {
    tracing::debug!(error = %rejection, "Rejected {}", what);
    api_error(
        StatusCode::BAD_REQUEST,
        format!("Invalid {}: {}", what, rejection.body_text()),
    )
}

/// List plots, newest first
pub async fn list_plots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListPlotsQueryDto>,
) -> Result<Json<Vec<Plot>>, ApiError> {
    let director_id = query
        .director_id
        .filter(|d| !d.trim().is_empty())
        .map(DirectorId::from);

    state
        .plot_service
        .list_plots(director_id)
        .await
        .map(Json)
        .map_err(plot_error)
}

/// Create a plot from a draft and its starting cast
pub async fn create_plot(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreatePlotRequestDto>, JsonRejection>,
) -> Result<(StatusCode, Json<Plot>), ApiError> {
    let Json(req) = payload.map_err(|e| bad_body("plot", e))?;

    let plot = state
        .plot_service
        .create_plot(DirectorId::from(req.director_id), req.draft, req.characters)
        .await
        .map_err(plot_error)?;

    Ok((StatusCode::CREATED, Json(plot)))
}

/// Get a plot by ID
pub async fn get_plot(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Plot>, ApiError> {
    state
        .plot_service
        .get_plot(&PlotId::from(id))
        .await
        .map(Json)
        .map_err(plot_error)
}

/// Replace a plot
pub async fn update_plot(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<Plot>, JsonRejection>,
) -> Result<Json<Plot>, ApiError> {
    let Json(plot) = payload.map_err(|e| bad_body("plot", e))?;

    state
        .plot_service
        .update_plot(&PlotId::from(id), plot)
        .await
        .map(Json)
        .map_err(plot_error)
}

/// Delete a plot with its characters and episodes
pub async fn delete_plot(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .plot_service
        .delete_plot(&PlotId::from(id))
        .await
        .map_err(plot_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Add a character joining with the next episode
pub async fn add_character(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<CharacterInput>, JsonRejection>,
) -> Result<Json<Plot>, ApiError> {
    let Json(character) = payload.map_err(|e| bad_body("character", e))?;

    state
        .plot_service
        .add_character(&PlotId::from(id), character)
        .await
        .map(Json)
        .map_err(plot_error)
}

/// Generate the next episode and append it to the stored plot
pub async fn generate_episode(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Plot>, ApiError> {
    state
        .plot_service
        .generate_episode(&PlotId::from(id))
        .await
        .map(Json)
        .map_err(plot_error)
}

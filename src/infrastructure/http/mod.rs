//! HTTP REST API routes

mod generation_routes;
mod plot_routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::application::dto::ErrorResponseDto;
use crate::application::services::PlotServiceError;
use crate::domain::error::DomainError;
use crate::infrastructure::state::AppState;

/// Largest accepted request body; plots with many episodes get big
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponseDto>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponseDto::new(message)))
}

/// Map a plot service failure to a status and message
pub fn plot_error(error: PlotServiceError) -> ApiError {
    let status = match &error {
        PlotServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        PlotServiceError::Invalid(DomainError::CharacterLimitReached { .. }) => {
            StatusCode::CONFLICT
        }
        PlotServiceError::Invalid(_) | PlotServiceError::InvalidInput(_) => {
            StatusCode::BAD_REQUEST
        }
        PlotServiceError::Repository(_) | PlotServiceError::Generation(_) => {
            tracing::error!(error = %error, "Plot request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    api_error(status, error.to_string())
}

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Generation routes
        .route(
            "/api/plot-details",
            post(generation_routes::generate_plot_details),
        )
        .route("/api/refine-plot", post(generation_routes::refine_plot))
        .route(
            "/api/characters",
            post(generation_routes::generate_characters),
        )
        .route(
            "/api/next-episode",
            post(generation_routes::generate_next_episode),
        )
        // Plot routes
        .route(
            "/api/plots",
            get(plot_routes::list_plots).post(plot_routes::create_plot),
        )
        .route(
            "/api/plots/{id}",
            get(plot_routes::get_plot)
                .put(plot_routes::update_plot)
                .delete(plot_routes::delete_plot),
        )
        .route(
            "/api/plots/{id}/characters",
            post(plot_routes::add_character),
        )
        .route(
            "/api/plots/{id}/episodes",
            post(plot_routes::generate_episode),
        )
}

/// Full application router with health check and middleware
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(create_routes())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

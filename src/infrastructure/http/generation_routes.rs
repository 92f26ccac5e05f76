//! Generation API routes
//!
//! Stateless endpoints over the generation service. Callers send everything
//! the model needs in the body; nothing is persisted here.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::{
    CharacterInput, GeneratedEpisode, PlotDetails, PlotDetailsRequestDto, RefinePlotRequestDto,
    RefinePlotResponseDto,
};
use crate::domain::entities::{Plot, PlotDraft};
use crate::infrastructure::http::{api_error, ApiError};
use crate::infrastructure::state::AppState;

/// Expand a genre or concept into a partial plot draft
pub async fn generate_plot_details(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PlotDetailsRequestDto>, JsonRejection>,
) -> Result<Json<PlotDetails>, ApiError> {
    let input = payload
        .ok()
        .and_then(|Json(req)| req.input)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Missing or invalid input"))?;

    Ok(Json(state.generation_service.generate_plot_details(&input).await))
}

/// Condense a raw idea into a short plot summary
pub async fn refine_plot(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RefinePlotRequestDto>, JsonRejection>,
) -> Result<Json<RefinePlotResponseDto>, ApiError> {
    let raw_input = payload
        .ok()
        .and_then(|Json(req)| req.raw_input)
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Missing or invalid rawInput"))?;

    let text = state.generation_service.refine_plot(&raw_input).await;
    Ok(Json(RefinePlotResponseDto { text }))
}

/// Propose a starting cast for a draft
pub async fn generate_characters(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PlotDraft>, JsonRejection>,
) -> Result<Json<Vec<CharacterInput>>, ApiError> {
    let Json(draft) = payload.map_err(|e| {
        tracing::debug!(error = %e, "Rejected draft");
        api_error(StatusCode::BAD_REQUEST, "Invalid draft")
    })?;

    Ok(Json(
        state
            .generation_service
            .generate_default_characters(&draft)
            .await,
    ))
}

/// Write the next episode for a caller-held plot
pub async fn generate_next_episode(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Plot>, JsonRejection>,
) -> Result<Json<GeneratedEpisode>, ApiError> {
    let Json(plot) = payload.map_err(|e| {
        tracing::debug!(error = %e, "Rejected plot");
        api_error(StatusCode::BAD_REQUEST, "Invalid plot")
    })?;
    plot.validate()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Invalid plot: {}", e)))?;

    state
        .generation_service
        .generate_next_episode(&plot)
        .await
        .map(Json)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::application::services::generation_service::tests::{episode_json, quota_error, reply};
    use crate::application::services::EPISODE_FAILURE_MESSAGE;
    use crate::infrastructure::http::test_support::{app, send};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_plot_details_requires_string_input() {
        let (app, ai) = app(vec![]);

        let (status, body) = send(&app, "POST", "/api/plot-details", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing or invalid input");

        let (status, _) = send(&app, "POST", "/api/plot-details", Some(json!({ "input": 5 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(ai.call_count(), 0);
    }

    #[tokio::test]
    async fn test_plot_details_returns_partial_draft() {
        let (app, _) = app(vec![reply(r#"{"Title": "X", "Episode Length": 900}"#)]);

        let (status, body) =
            send(&app, "POST", "/api/plot-details", Some(json!({ "input": "noir" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "title": "X", "episodeLength": 900 }));
    }

    #[tokio::test]
    async fn test_plot_details_defaults_missing_episode_length() {
        let (app, _) = app(vec![reply(r#"{"Title": "X", "Rules of the World": "Y"}"#)]);

        let (status, body) =
            send(&app, "POST", "/api/plot-details", Some(json!({ "input": "noir" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "title": "X", "rules": "Y", "episodeLength": 600 }));
    }

    #[tokio::test]
    async fn test_plot_details_soft_fails_to_empty_object() {
        let (app, _) = app(vec![quota_error()]);

        let (status, body) =
            send(&app, "POST", "/api/plot-details", Some(json!({ "input": "noir" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));
    }

    #[tokio::test]
    async fn test_refine_plot() {
        let (app, _) = app(vec![reply("A refined plot.")]);

        let (status, body) = send(&app, "POST", "/api/refine-plot", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing or invalid rawInput");

        let (_, body) = send(&app, "POST", "/api/refine-plot", Some(json!({ "rawInput": "  " }))).await;
        assert_eq!(body, json!({ "text": "" }));

        let (_, body) =
            send(&app, "POST", "/api/refine-plot", Some(json!({ "rawInput": "idea" }))).await;
        assert_eq!(body["text"], "A refined plot.");
    }

    #[tokio::test]
    async fn test_characters_reject_invalid_draft() {
        let (app, _) = app(vec![]);
        let (status, body) =
            send(&app, "POST", "/api/characters", Some(json!({ "genre": "Noir" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid draft");
    }

    #[tokio::test]
    async fn test_characters_are_stamped_as_ai_defaults() {
        let (app, _) = app(vec![reply(
            r#"{"characters": [{"name": "Mira", "role": "Mentor", "traits": ["wry"]}]}"#,
        )]);
        let (status, body) =
            send(&app, "POST", "/api/characters", Some(json!({ "title": "Dust" }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], "Mira");
        assert_eq!(body[0]["submittedBy"], "Director (AI)");
        assert_eq!(body[0]["isDefault"], true);
    }

    #[tokio::test]
    async fn test_next_episode() {
        let (app, _) = app(vec![reply(episode_json("Opening"))]);
        let plot = json!({ "id": "p1", "title": "Dust", "episodes": [] });

        let (status, body) = send(&app, "POST", "/api/next-episode", Some(plot)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Opening");
        assert_eq!(body["memory"], "The road is dark now.");
        assert_eq!(body["summary"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_next_episode_errors() {
        let (app, _) = app(vec![quota_error(), quota_error()]);

        let (status, body) =
            send(&app, "POST", "/api/next-episode", Some(json!({ "id": "p1", "title": "x" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid plot");

        let plot = json!({ "id": "p1", "title": "Dust", "episodes": [] });
        let (status, body) = send(&app, "POST", "/api/next-episode", Some(plot)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], EPISODE_FAILURE_MESSAGE);
    }
}

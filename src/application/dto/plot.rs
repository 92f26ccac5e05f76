use serde::{Deserialize, Serialize};

use crate::application::dto::CharacterInput;
use crate::domain::entities::PlotDraft;

/// Query parameters for listing plots.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPlotsQueryDto {
    #[serde(default)]
    pub director_id: Option<String>,
}

/// Request to create a plot from a finished draft and its starting cast.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlotRequestDto {
    pub director_id: String,
    pub draft: PlotDraft,
    #[serde(default)]
    pub characters: Vec<CharacterInput>,
}

/// Error body returned by every route.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDto {
    pub error: String,
}

impl ErrorResponseDto {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

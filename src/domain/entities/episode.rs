//! Episode entity - one generated installment of a plot

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{EpisodeId, PlotId};

/// Number of bullet points every episode summary carries
pub const EPISODE_SUMMARY_POINTS: usize = 5;

/// A generated episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: EpisodeId,
    pub plot_id: PlotId,
    /// 1-based position within the plot
    pub episode_number: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub summary: Vec<String>,
    /// Names the generator reported as appearing
    #[serde(default)]
    pub characters_used: Vec<String>,
    /// Epoch milliseconds
    #[serde(default)]
    pub created_at: i64,
}

impl Episode {
    /// Heading used when the episode is given to the model as recent context
    pub fn context_heading(&self) -> String {
        format!("Episode {} ({})", self.episode_number, self.title)
    }
}

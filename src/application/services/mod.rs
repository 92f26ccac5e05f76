//! Application services - Use case implementations
//!
//! The generation service drives the AI adapter; the plot service owns the
//! plot lifecycle over the repository port and delegates episode writing to
//! the generation service.

pub mod generation_service;
pub mod llm;
pub mod plot_service;

pub use generation_service::{GenerationError, GenerationService, EPISODE_FAILURE_MESSAGE};
pub use plot_service::{PlotService, PlotServiceError, PlotServiceImpl};

//! Outbound ports - Interfaces that the application requires from external systems

mod ai_port;
mod plot_repository_port;

pub use ai_port::{
    AiError, AiPort, GenerateOptions, GenerateResult, ModelTier, ResponseSchema, SchemaKind,
};
pub use plot_repository_port::{PlotRepositoryPort, RepositoryError};

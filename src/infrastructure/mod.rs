//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - AI: Gemini and OpenRouter adapters plus the provider selector
//! - Persistence: SQLite plot storage
//! - HTTP: REST API routes
//! - Config: Application configuration
//! - State: Shared application state

pub mod ai;
pub mod config;
pub mod http;
pub mod persistence;
pub mod state;

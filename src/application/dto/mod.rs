//! Data Transfer Objects - For API boundaries
//!
//! DTOs live in the application layer so infrastructure (HTTP) can
//! serialize/deserialize without the routes knowing how results are produced.

pub mod generation;
pub mod plot;

pub use generation::*;
pub use plot::*;

//! Domain layer - Core story model with no transport or provider dependencies
//!
//! This layer contains:
//! - Entities: Plot, Character, Episode
//! - Value Objects: identifiers, archetypes, episode lengths, writing styles
//! - Errors: invariant violations

pub mod entities;
pub mod error;
pub mod value_objects;

//! Strongly-typed identifiers for domain entities
//!
//! Identifiers are opaque strings: records created by older clients carry short
//! random ids, new records get a UUID v4.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id!(PlotId);
define_id!(CharacterId);
define_id!(EpisodeId);
define_id!(DirectorId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let id = PlotId::from("k3j4h5g6f");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"k3j4h5g6f\"");

        let back: PlotId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_new_ids_are_unique() {
        assert_ne!(EpisodeId::new(), EpisodeId::new());
        assert!(!CharacterId::new().is_empty());
    }
}

//! Structured-output shapes expected back from each prompt

use crate::application::ports::outbound::ResponseSchema;
use crate::domain::entities::EPISODE_SUMMARY_POINTS;
use crate::domain::value_objects::{RoleArchetype, WRITING_STYLES};

/// Shape of an expanded plot draft
pub fn plot_details_schema() -> ResponseSchema {
    ResponseSchema::object()
        .property("title", ResponseSchema::string())
        .property("genre", ResponseSchema::string())
        .property(
            "writingStyle",
            ResponseSchema::string().with_enum(WRITING_STYLES.iter().copied()),
        )
        .property("setting", ResponseSchema::string())
        .property(
            "plot",
            ResponseSchema::string().with_description("2-4 sentence story summary / refined plot"),
        )
        .property("rules", ResponseSchema::string())
        .property("objective", ResponseSchema::string())
        .property("episodeLength", ResponseSchema::integer())
        .required([
            "title",
            "genre",
            "writingStyle",
            "setting",
            "plot",
            "rules",
            "objective",
            "episodeLength",
        ])
}

/// Shape of a generated cast
pub fn characters_schema() -> ResponseSchema {
    let character = ResponseSchema::object()
        .property("name", ResponseSchema::string())
        .property(
            "role",
            ResponseSchema::string().with_enum(RoleArchetype::ALL.iter().map(|r| r.as_str())),
        )
        .property("traits", ResponseSchema::array_of(ResponseSchema::string()))
        .property("speakingStyle", ResponseSchema::string())
        .property("motivation", ResponseSchema::string())
        .property("secret", ResponseSchema::string())
        .property("relationships", ResponseSchema::string())
        .property("characterization", ResponseSchema::string())
        .required([
            "name",
            "role",
            "traits",
            "speakingStyle",
            "motivation",
            "characterization",
        ]);

    ResponseSchema::object()
        .property("characters", ResponseSchema::array_of(character))
        .required(["characters"])
}

/// Shape of a generated episode
pub fn episode_schema() -> ResponseSchema {
    ResponseSchema::object()
        .property("episodeTitle", ResponseSchema::string())
        .property("episodeText", ResponseSchema::string())
        .property(
            "episodeSummary",
            ResponseSchema::array_of(ResponseSchema::string()).with_description(format!(
                "{} distinct bullet points summarizing events",
                EPISODE_SUMMARY_POINTS
            )),
        )
        .property(
            "storyMemory",
            ResponseSchema::string()
                .with_description("Updated running summary of the entire plot so far."),
        )
        .property(
            "charactersUsed",
            ResponseSchema::array_of(ResponseSchema::string())
                .with_description("List of names of characters who appeared"),
        )
        .required([
            "episodeTitle",
            "episodeText",
            "episodeSummary",
            "storyMemory",
            "charactersUsed",
        ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_details_schema_constrains_writing_style() {
        let rendered = plot_details_schema().to_json_schema();
        let styles = rendered["properties"]["writingStyle"]["enum"]
            .as_array()
            .unwrap();
        assert_eq!(styles.len(), WRITING_STYLES.len());
        assert_eq!(rendered["required"].as_array().unwrap().len(), 8);
    }

    #[test]
    fn test_episode_schema_has_array_fields() {
        let rendered = episode_schema().to_json_schema();
        assert_eq!(rendered["properties"]["episodeSummary"]["type"], "array");
        assert_eq!(rendered["properties"]["charactersUsed"]["items"]["type"], "string");
    }
}

//! Response normalization
//!
//! Models do not always honor the requested shape: keys come back in
//! title case or snake case, lists arrive as newline separated strings, and
//! the JSON may be wrapped in a markdown fence. Everything here maps those
//! variations onto one canonical shape.

use serde_json::{Map, Value};

use crate::application::dto::{CharacterInput, GeneratedEpisode, PlotDetails};
use crate::domain::entities::{split_traits, AI_DIRECTOR_ATTRIBUTION, EPISODE_SUMMARY_POINTS};
use crate::domain::value_objects::{EpisodeLength, RoleArchetype};

/// Alternative keys for one canonical field, most preferred first
#[derive(Debug, Clone, Copy)]
pub struct FieldAliases {
    pub field: &'static str,
    pub keys: &'static [&'static str],
}

const fn aliases(field: &'static str, keys: &'static [&'static str]) -> FieldAliases {
    FieldAliases { field, keys }
}

pub const PLOT_TITLE: FieldAliases = aliases("title", &["title", "Title"]);
pub const PLOT_GENRE: FieldAliases = aliases("genre", &["genre", "Genre"]);
pub const PLOT_WRITING_STYLE: FieldAliases = aliases(
    "writingStyle",
    &["writingStyle", "WritingStyle", "Writing Style", "writing_style"],
);
pub const PLOT_SETTING: FieldAliases = aliases("setting", &["setting", "Setting"]);
pub const PLOT_PLOT: FieldAliases = aliases("plot", &["plot", "Plot", "theme"]);
pub const PLOT_RULES: FieldAliases = aliases("rules", &["rules", "Rules of the World", "Rules"]);
pub const PLOT_OBJECTIVE: FieldAliases = aliases(
    "objective",
    &["objective", "Story Objective", "Objective"],
);
pub const PLOT_EPISODE_LENGTH: FieldAliases = aliases(
    "episodeLength",
    &["episodeLength", "Episode Length", "episode_length"],
);

pub const EPISODE_TITLE: FieldAliases = aliases("title", &["episodeTitle", "title"]);
pub const EPISODE_TEXT: FieldAliases = aliases("text", &["episodeText", "narrative"]);
pub const EPISODE_SUMMARY: FieldAliases = aliases("summary", &["episodeSummary", "recent_events"]);
pub const EPISODE_MEMORY: FieldAliases = aliases("memory", &["storyMemory", "story_memory"]);
pub const EPISODE_CHARACTERS_USED: FieldAliases = aliases(
    "charactersUsed",
    &["charactersUsed", "characters_used"],
);

pub const CHARACTER_LIST: FieldAliases = aliases("characters", &["characters", "Characters"]);
pub const CHARACTER_NAME: FieldAliases = aliases("name", &["name", "Name"]);
pub const CHARACTER_ROLE: FieldAliases = aliases("role", &["role", "Role"]);
pub const CHARACTER_TRAITS: FieldAliases = aliases("traits", &["traits", "Traits"]);
pub const CHARACTER_SPEAKING_STYLE: FieldAliases = aliases(
    "speakingStyle",
    &["speakingStyle", "Speaking Style", "speaking_style"],
);
pub const CHARACTER_MOTIVATION: FieldAliases = aliases("motivation", &["motivation", "Motivation"]);
pub const CHARACTER_SECRET: FieldAliases = aliases("secret", &["secret", "Secret"]);
pub const CHARACTER_RELATIONSHIPS: FieldAliases = aliases(
    "relationships",
    &["relationships", "Relationships"],
);
pub const CHARACTER_CHARACTERIZATION: FieldAliases = aliases(
    "characterization",
    &["characterization", "Characterization", "context"],
);

/// Errors raised while normalizing a model response
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("missing or empty field `{0}`")]
    MissingField(&'static str),

    #[error("expected {expected} summary points, found {found}")]
    SummaryTooShort { expected: usize, found: usize },
}

/// First present, non-null value among the aliases
pub fn lookup<'a>(object: &'a Map<String, Value>, aliases: &FieldAliases) -> Option<&'a Value> {
    aliases
        .keys
        .iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

/// Parse model text as a JSON object.
///
/// Strips markdown fences and surrounding prose by taking the span between
/// the first `{` and the last `}`. Empty text parses as an empty object.
pub fn parse_json_object(text: &str) -> Result<Map<String, Value>, ParseError> {
    let trimmed = strip_code_fence(text.trim());
    if trimmed.is_empty() {
        return Ok(Map::new());
    }

    let candidate = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    };

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ParseError::NotAnObject(json_kind(&other))),
        Err(e) => Err(ParseError::InvalidJson(e.to_string())),
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Skip the language tag on the opening fence
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end()
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Coerce a scalar to trimmed text; `None` for empty strings and containers
pub fn coerce_string(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Coerce an array or a delimited string to a list of trimmed entries.
///
/// Strings split on newlines, or on commas when they have no newline;
/// leading bullet markers are removed.
pub fn coerce_list(value: &Value) -> Vec<String> {
    let entries: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(coerce_string).map(strip_bullet).collect(),
        Value::String(text) => {
            let pieces: Vec<&str> = if text.contains('\n') {
                text.lines().collect()
            } else {
                text.split(',').collect()
            };
            pieces.into_iter().map(|p| strip_bullet(p.to_string())).collect()
        }
        _ => Vec::new(),
    };
    entries.into_iter().filter(|s| !s.is_empty()).collect()
}

fn strip_bullet(entry: String) -> String {
    let trimmed = entry.trim();
    let without_marker = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
        .or_else(|| trimmed.strip_prefix("• "))
        .unwrap_or_else(|| strip_numbering(trimmed));
    without_marker.trim().to_string()
}

fn strip_numbering(entry: &str) -> &str {
    let digits = entry.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return entry;
    }
    entry[digits..]
        .strip_prefix(". ")
        .or_else(|| entry[digits..].strip_prefix(") "))
        .unwrap_or(entry)
}

/// Coerce a word count to an allowed episode length, defaulting when it is
/// missing or outside the allowed set
pub fn coerce_episode_length(value: Option<&Value>) -> EpisodeLength {
    let words = match value {
        None => {
            tracing::warn!("Episode length missing, using {}", EpisodeLength::default());
            return EpisodeLength::default();
        }
        Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().map(|f| f.round() as u64)),
        Some(Value::String(s)) => s
            .split_whitespace()
            .next()
            .and_then(|w| w.parse::<u64>().ok()),
        Some(_) => None,
    };

    match words.and_then(EpisodeLength::from_words) {
        Some(length) => length,
        None => {
            tracing::warn!(
                value = ?value,
                "Episode length outside the allowed set, using {}",
                EpisodeLength::default()
            );
            EpisodeLength::default()
        }
    }
}

/// Normalize a plot-details response.
///
/// Text fields the model left out stay unset; the episode length always
/// resolves, falling back to the default.
pub fn normalize_plot_details(text: &str) -> Result<PlotDetails, ParseError> {
    let object = parse_json_object(text)?;
    let string_field = |aliases: &FieldAliases| lookup(&object, aliases).and_then(coerce_string);

    let episode_length = Some(coerce_episode_length(lookup(&object, &PLOT_EPISODE_LENGTH)));

    Ok(PlotDetails {
        title: string_field(&PLOT_TITLE),
        genre: string_field(&PLOT_GENRE),
        writing_style: string_field(&PLOT_WRITING_STYLE),
        setting: string_field(&PLOT_SETTING),
        plot: string_field(&PLOT_PLOT),
        rules: string_field(&PLOT_RULES),
        objective: string_field(&PLOT_OBJECTIVE),
        episode_length,
    })
}

/// Normalize a generated cast.
///
/// Accepts a wrapping object or a bare array. Entries without a name are
/// skipped; unknown roles are left unset. Every entry is stamped as a
/// default character attributed to the AI director.
pub fn normalize_characters(text: &str) -> Result<Vec<CharacterInput>, ParseError> {
    let entries = match serde_json::from_str::<Value>(strip_code_fence(text.trim())) {
        Ok(Value::Array(items)) => items,
        _ => {
            let object = parse_json_object(text)?;
            match lookup(&object, &CHARACTER_LIST) {
                Some(Value::Array(items)) => items.clone(),
                _ => Vec::new(),
            }
        }
    };

    Ok(entries
        .iter()
        .filter_map(Value::as_object)
        .filter_map(normalize_character)
        .collect())
}

fn normalize_character(object: &Map<String, Value>) -> Option<CharacterInput> {
    let string_field = |aliases: &FieldAliases| lookup(object, aliases).and_then(coerce_string);

    let Some(name) = string_field(&CHARACTER_NAME) else {
        tracing::warn!("Generated character has no name, dropping it");
        return None;
    };
    let role = string_field(&CHARACTER_ROLE).and_then(|raw| match raw.parse::<RoleArchetype>() {
        Ok(role) => Some(role),
        Err(e) => {
            tracing::debug!(character = %name, "{}", e);
            None
        }
    });
    let traits = match lookup(object, &CHARACTER_TRAITS) {
        Some(Value::String(raw)) => split_traits(raw),
        Some(value) => coerce_list(value),
        None => {
            tracing::warn!(character = %name, "Generated character has no traits, using none");
            Vec::new()
        }
    };

    Some(CharacterInput {
        name,
        role,
        traits,
        speaking_style: string_field(&CHARACTER_SPEAKING_STYLE).unwrap_or_default(),
        motivation: string_field(&CHARACTER_MOTIVATION).unwrap_or_default(),
        secret: string_field(&CHARACTER_SECRET),
        relationships: string_field(&CHARACTER_RELATIONSHIPS),
        characterization: string_field(&CHARACTER_CHARACTERIZATION).unwrap_or_default(),
        submitted_by: AI_DIRECTOR_ATTRIBUTION.to_string(),
        is_default: true,
    })
}

/// Normalize a generated episode.
///
/// Text and memory are required. A missing title falls back to
/// "Episode N". The summary must hold at least the expected number of
/// points; extras are dropped.
pub fn normalize_episode(text: &str, episode_number: u32) -> Result<GeneratedEpisode, ParseError> {
    let object = parse_json_object(text)?;
    let string_field = |aliases: &FieldAliases| lookup(&object, aliases).and_then(coerce_string);

    let body = string_field(&EPISODE_TEXT).ok_or(ParseError::MissingField(EPISODE_TEXT.field))?;
    let memory =
        string_field(&EPISODE_MEMORY).ok_or(ParseError::MissingField(EPISODE_MEMORY.field))?;
    let title = string_field(&EPISODE_TITLE).unwrap_or_else(|| format!("Episode {}", episode_number));

    let mut summary = lookup(&object, &EPISODE_SUMMARY)
        .map(coerce_list)
        .unwrap_or_default();
    if summary.len() < EPISODE_SUMMARY_POINTS {
        return Err(ParseError::SummaryTooShort {
            expected: EPISODE_SUMMARY_POINTS,
            found: summary.len(),
        });
    }
    if summary.len() > EPISODE_SUMMARY_POINTS {
        tracing::warn!(
            episode_number,
            found = summary.len(),
            "Episode summary has extra points, keeping the first {}",
            EPISODE_SUMMARY_POINTS
        );
        summary.truncate(EPISODE_SUMMARY_POINTS);
    }

    let characters_used = lookup(&object, &EPISODE_CHARACTERS_USED)
        .map(coerce_list)
        .unwrap_or_default();

    Ok(GeneratedEpisode {
        title,
        text: body,
        summary,
        memory,
        characters_used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_object_strips_fences_and_prose() {
        let fenced = "```json\n{\"title\": \"Dust\"}\n```";
        assert_eq!(parse_json_object(fenced).unwrap()["title"], "Dust");

        let chatty = "Sure! Here it is: {\"title\": \"Dust\"} Enjoy.";
        assert_eq!(parse_json_object(chatty).unwrap()["title"], "Dust");

        assert!(parse_json_object("   ").unwrap().is_empty());
        assert!(matches!(
            parse_json_object("not json at all"),
            Err(ParseError::InvalidJson(_))
        ));
        assert_eq!(
            parse_json_object("[1, 2]"),
            Err(ParseError::NotAnObject("an array"))
        );
    }

    #[test]
    fn test_lookup_prefers_first_non_null_alias() {
        let object = json!({"title": null, "Title": "Second"});
        let object = object.as_object().unwrap();
        assert_eq!(lookup(object, &PLOT_TITLE), Some(&json!("Second")));

        let object = json!({"title": "First", "Title": "Second"});
        assert_eq!(
            lookup(object.as_object().unwrap(), &PLOT_TITLE),
            Some(&json!("First"))
        );
    }

    #[test]
    fn test_coerce_list_handles_strings_and_bullets() {
        assert_eq!(
            coerce_list(&json!("- one\n- two\n\n3. three")),
            vec!["one", "two", "three"]
        );
        assert_eq!(coerce_list(&json!("a, b ,c")), vec!["a", "b", "c"]);
        assert_eq!(coerce_list(&json!(["x", "", 7])), vec!["x", "7"]);
        assert!(coerce_list(&json!({"a": 1})).is_empty());
    }

    #[test]
    fn test_coerce_episode_length() {
        assert_eq!(coerce_episode_length(Some(&json!(900))), EpisodeLength::Standard);
        assert_eq!(coerce_episode_length(Some(&json!("1200 words"))), EpisodeLength::Extended);
        assert_eq!(coerce_episode_length(Some(&json!(750))), EpisodeLength::Short);
        assert_eq!(coerce_episode_length(Some(&json!("long"))), EpisodeLength::Short);
        assert_eq!(coerce_episode_length(None), EpisodeLength::Short);
    }

    #[test]
    fn test_normalize_plot_details_maps_aliases() {
        let text = r#"{
            "Title": "The Salt Road",
            "Genre": "Western",
            "Writing Style": "Casual",
            "Setting": "A drowned prairie",
            "plot": "Two rivals ride for the last well.",
            "Rules of the World": "Water is currency.",
            "Story Objective": "Reach the well.",
            "Episode Length": "900"
        }"#;
        let details = normalize_plot_details(text).unwrap();

        assert_eq!(details.title.as_deref(), Some("The Salt Road"));
        assert_eq!(details.writing_style.as_deref(), Some("Casual"));
        assert_eq!(details.rules.as_deref(), Some("Water is currency."));
        assert_eq!(details.objective.as_deref(), Some("Reach the well."));
        assert_eq!(details.episode_length, Some(EpisodeLength::Standard));
    }

    #[test]
    fn test_normalize_plot_details_defaults_missing_episode_length() {
        let details = normalize_plot_details(r#"{"genre": "Noir"}"#).unwrap();
        assert_eq!(details.genre.as_deref(), Some("Noir"));
        assert!(details.title.is_none());
        assert_eq!(details.episode_length, Some(EpisodeLength::Short));

        let empty = normalize_plot_details("").unwrap();
        assert_eq!(empty.episode_length, Some(EpisodeLength::Short));
        assert!(empty.title.is_none());
    }

    #[test]
    fn test_normalize_characters_skips_nameless_and_stamps_defaults() {
        let text = r#"{"characters": [
            {"name": "Mira", "role": "mentor", "traits": "patient, wry", "speakingStyle": "Slow"},
            {"role": "Hero"},
            {"Name": "Vex", "Role": "Space Pirate", "Traits": ["sly"]}
        ]}"#;
        let cast = normalize_characters(text).unwrap();

        assert_eq!(cast.len(), 2);
        assert_eq!(cast[0].role, Some(RoleArchetype::Mentor));
        assert_eq!(cast[0].traits, vec!["patient", "wry"]);
        assert_eq!(cast[0].submitted_by, AI_DIRECTOR_ATTRIBUTION);
        assert!(cast[0].is_default);
        assert_eq!(cast[1].name, "Vex");
        assert!(cast[1].role.is_none());
    }

    #[test]
    fn test_normalize_characters_accepts_bare_array() {
        let cast = normalize_characters(r#"[{"name": "Ilse", "role": "Trickster"}]"#).unwrap();
        assert_eq!(cast.len(), 1);
        assert_eq!(cast[0].role, Some(RoleArchetype::Trickster));
    }

    #[test]
    fn test_normalize_episode_maps_legacy_keys() {
        let text = json!({
            "narrative": "The tide came in.",
            "recent_events": "- a\n- b\n- c\n- d\n- e\n- f",
            "story_memory": "Everything so far.",
            "characters_used": ["Mira"]
        })
        .to_string();
        let episode = normalize_episode(&text, 4).unwrap();

        assert_eq!(episode.title, "Episode 4");
        assert_eq!(episode.text, "The tide came in.");
        assert_eq!(episode.summary, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(episode.memory, "Everything so far.");
        assert_eq!(episode.characters_used, vec!["Mira"]);
    }

    #[test]
    fn test_normalize_episode_rejects_incomplete_responses() {
        let short_summary = json!({
            "episodeText": "x",
            "storyMemory": "y",
            "episodeSummary": ["only", "three", "points"]
        })
        .to_string();
        assert_eq!(
            normalize_episode(&short_summary, 1),
            Err(ParseError::SummaryTooShort { expected: 5, found: 3 })
        );

        let no_memory = json!({
            "episodeText": "x",
            "episodeSummary": ["a", "b", "c", "d", "e"]
        })
        .to_string();
        assert_eq!(
            normalize_episode(&no_memory, 1),
            Err(ParseError::MissingField("memory"))
        );

        assert_eq!(normalize_episode("", 1), Err(ParseError::MissingField("text")));
    }
}

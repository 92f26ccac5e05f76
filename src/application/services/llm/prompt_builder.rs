//! Prompt building functions for story generation requests

use crate::application::ports::outbound::ResponseSchema;
use crate::application::services::llm::schemas;
use crate::domain::entities::{Character, Episode, Plot, PlotDraft, EPISODE_SUMMARY_POINTS};
use crate::domain::value_objects::{EpisodeLength, RoleArchetype, WRITING_STYLES};

/// Episodes quoted verbatim (by summary) in the episode prompt; older ones
/// only survive through the story memory.
pub const RECENT_EPISODE_WINDOW: usize = 2;

/// Number of characters requested when seeding a cast
pub const DEFAULT_CAST_SIZE: usize = 3;

/// A prompt paired with the shape expected back
#[derive(Debug, Clone)]
pub struct GenerationPrompt {
    pub prompt: String,
    pub schema: Option<ResponseSchema>,
}

/// Continuity context for the next episode of a plot
#[derive(Debug, Clone)]
pub struct EpisodeContext<'a> {
    pub episode_number: u32,
    /// At most `RECENT_EPISODE_WINDOW` episodes, oldest first
    pub recent_episodes: &'a [Episode],
    /// Characters allowed to appear
    pub cast: Vec<&'a Character>,
    /// Characters this episode introduces
    pub new_characters: Vec<&'a Character>,
}

impl<'a> EpisodeContext<'a> {
    pub fn from_plot(plot: &'a Plot) -> Self {
        let episode_number = plot.next_episode_number();
        Self {
            episode_number,
            recent_episodes: plot.recent_episodes(RECENT_EPISODE_WINDOW),
            cast: plot.cast_for_episode(episode_number).collect(),
            new_characters: plot.characters_introduced_in(episode_number).collect(),
        }
    }

    pub fn is_first_episode(&self) -> bool {
        self.episode_number == 1
    }

    pub fn new_character_names(&self) -> Vec<&'a str> {
        self.new_characters.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Expand a genre keyword or loose concept into a full plot draft
pub fn plot_details_prompt(input: &str) -> GenerationPrompt {
    let mut prompt = String::new();

    prompt.push_str("You are a master storyteller.\n");
    prompt.push_str(
        "Analyze the following user input, which might be a specific genre OR a raw story concept:\n",
    );
    prompt.push_str(&format!("\"{}\"\n\n", input.trim()));
    prompt.push_str("Based on this, create a unique, complete story foundation.\n\n");
    prompt.push_str(
        "1. If the input is a description (e.g. \"cowboys vs aliens\"), infer the best fitting genre.\n",
    );
    prompt.push_str("2. Fill in the following details:\n");
    prompt.push_str("- title: A catchy title.\n");
    prompt.push_str("- genre: The specific genre string.\n");
    prompt.push_str(&format!(
        "- writingStyle: One of [{}]. This sets the complexity and style of language \
         (Novel = rich prose, Plain English = clear and simple, Casual = conversational, \
         Literary = lyrical and layered, South/North Indian English = Indian English with that regional flavour).\n",
        WRITING_STYLES.join(", ")
    ));
    prompt.push_str("- setting: A vivid time and place.\n");
    prompt.push_str("- plot: A 2-4 sentence story summary (the main story in brief).\n");
    prompt.push_str("- rules: 1-2 unique laws or mechanics of the world.\n");
    prompt.push_str("- objective: The ultimate goal of the story.\n");
    prompt.push_str(&format!(
        "- episodeLength: EXACTLY one of: {}.\n\n",
        EpisodeLength::prompt_list()
    ));
    prompt.push_str("Be original and as creative as possible.\n");

    GenerationPrompt {
        prompt,
        schema: Some(schemas::plot_details_schema()),
    }
}

/// Condense a raw idea into a short plot summary; free text, no schema
pub fn refine_plot_prompt(raw_input: &str) -> GenerationPrompt {
    let mut prompt = String::new();

    prompt.push_str(
        "Turn this raw story idea or concept into a clear, 2-4 sentence plot summary.\n",
    );
    prompt.push_str(
        "Keep the same idea and tone; just make it a concise \"what this story is about\" description.\n",
    );
    prompt.push_str("Reply with ONLY the plot summary, no labels or extra text.\n\n");
    prompt.push_str(&format!("Input: \"{}\"\n", raw_input.trim()));

    GenerationPrompt {
        prompt,
        schema: None,
    }
}

/// Seed a cast for a draft
pub fn characters_prompt(draft: &PlotDraft) -> GenerationPrompt {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Create {} compelling characters for:\n",
        DEFAULT_CAST_SIZE
    ));
    prompt.push_str(&format!("Title: {}\n", draft.title));
    prompt.push_str(&format!("Genre: {}\n", draft.genre));
    prompt.push_str(&format!("Writing style: {}\n", draft.writing_style));
    prompt.push_str(&format!("Setting: {}\n", draft.setting));
    prompt.push_str(&format!("Plot: {}\n", draft.plot));
    if !draft.rules.is_empty() {
        prompt.push_str(&format!("Rules: {}\n", draft.rules));
    }
    prompt.push_str(&format!("Objective: {}\n\n", draft.objective));
    prompt.push_str(&format!("Roles: {}.\n", RoleArchetype::prompt_list()));
    prompt.push_str(&format!(
        "Give each of the {} characters a different role from this list.\n",
        DEFAULT_CAST_SIZE
    ));

    GenerationPrompt {
        prompt,
        schema: Some(schemas::characters_schema()),
    }
}

/// Write the next episode of a plot
pub fn episode_prompt(plot: &Plot, context: &EpisodeContext<'_>) -> GenerationPrompt {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "You are the Director AI for \"StoryVerse\". Write Episode {}.\n\n",
        context.episode_number
    ));

    prompt.push_str("METADATA:\n");
    prompt.push_str(&format!("Title: {}\n", plot.title));
    prompt.push_str(&format!("Genre: {}\n", plot.genre));
    prompt.push_str(&format!(
        "Writing style (language complexity/tone): {}\n",
        plot.writing_style
    ));
    prompt.push_str(&format!("Setting: {}\n", plot.setting));
    prompt.push_str(&format!("Plot: {}\n", plot.plot));
    prompt.push_str(&format!("Rules: {}\n", plot.rules));
    prompt.push_str(&format!("Objective: {}\n", plot.objective));
    prompt.push_str(&format!("Length: {} words.\n\n", plot.episode_length));

    prompt.push_str("CHARACTERS:\n");
    if context.cast.is_empty() {
        prompt.push_str("None yet\n");
    } else {
        let descriptions: Vec<String> = context
            .cast
            .iter()
            .map(|c| describe_character(c))
            .collect();
        prompt.push_str(&descriptions.join("---\n"));
    }
    prompt.push('\n');

    // Every character is new in episode 1, establishing the world covers them
    if !context.is_first_episode() && !context.new_characters.is_empty() {
        prompt.push_str(&format!(
            "NEW CHARACTERS: {} (Introduce them)\n\n",
            context.new_character_names().join(", ")
        ));
    }

    prompt.push_str("PREVIOUS MEMORY:\n");
    if plot.story_memory.trim().is_empty() {
        prompt.push_str("None\n\n");
    } else {
        prompt.push_str(&format!("{}\n\n", plot.story_memory.trim()));
    }

    prompt.push_str("RECENT EVENTS:\n");
    if context.recent_episodes.is_empty() {
        prompt.push_str("None\n\n");
    } else {
        let recent: Vec<String> = context
            .recent_episodes
            .iter()
            .map(describe_recent_episode)
            .collect();
        prompt.push_str(&recent.join("\n"));
        prompt.push('\n');
    }

    prompt.push_str("INSTRUCTIONS:\n");
    prompt.push_str("1. Write a compelling narrative.\n");
    prompt.push_str("2. Focus on interaction between the characters.\n");
    prompt.push_str("3. Advance the plot toward the objective.\n");
    if context.is_first_episode() {
        prompt.push_str("4. This is Episode 1: establish the world and the cast.\n");
    } else {
        prompt.push_str("4. Stay consistent with the memory and recent events.\n");
    }
    prompt.push_str("5. Only use the characters listed above.\n");
    prompt.push_str(&format!(
        "6. Summarize the episode in exactly {} bullet points.\n",
        EPISODE_SUMMARY_POINTS
    ));
    prompt.push_str(
        "7. Update the Story Memory so it covers everything that has happened so far.\n",
    );

    GenerationPrompt {
        prompt,
        schema: Some(schemas::episode_schema()),
    }
}

fn describe_character(character: &Character) -> String {
    let mut out = String::new();
    out.push_str(&format!("Name: {} ({})\n", character.name, character.role));
    out.push_str(&format!("Traits: {}\n", character.traits.join(", ")));
    out.push_str(&format!("Motivation: {}\n", character.motivation));
    out.push_str(&format!("Speaking Style: {}\n", character.speaking_style));
    out.push_str(&format!("Context: {}\n", character.characterization));
    if let Some(secret) = character.secret.as_deref().filter(|s| !s.is_empty()) {
        out.push_str(&format!("Secret: {}\n", secret));
    }
    out
}

fn describe_recent_episode(episode: &Episode) -> String {
    let mut out = format!("{}:\n", episode.context_heading());
    for point in &episode.summary {
        out.push_str(&format!("- {}\n", point));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::NewEpisode;
    use crate::domain::value_objects::DirectorId;

    fn plot_with_episodes(count: u32) -> Plot {
        let draft = PlotDraft {
            title: "The Lantern Road".to_string(),
            genre: "Fantasy".to_string(),
            writing_style: "Novel".to_string(),
            ..PlotDraft::default()
        };
        let mut plot = Plot::from_draft(DirectorId::from("d1"), draft);
        plot.characters.push(
            Character::new("Mira", RoleArchetype::Mentor)
                .with_traits(vec!["patient".to_string(), "wry".to_string()])
                .with_secret("She burned the map"),
        );
        plot.characters
            .push(Character::new("Vex", RoleArchetype::Rival).joining_at(3));
        for n in 1..=count {
            plot.append_episode(NewEpisode {
                title: format!("Chapter {}", n),
                content: String::new(),
                summary: (1..=5).map(|b| format!("ep{}-beat{}", n, b)).collect(),
                characters_used: vec![],
                story_memory: format!("memory through {}", n),
            });
        }
        plot
    }

    #[test]
    fn test_plot_details_prompt_lists_styles_and_lengths() {
        let request = plot_details_prompt("cowboys vs aliens");
        assert!(request.prompt.contains("\"cowboys vs aliens\""));
        assert!(request.prompt.contains("South Indian English"));
        assert!(request.prompt.contains("300, 600, 900, 1000, 1200"));
        assert!(request.schema.is_some());
    }

    #[test]
    fn test_refine_prompt_is_free_text() {
        let request = refine_plot_prompt("  a lighthouse keeper finds a door  ");
        assert!(request.prompt.contains("Input: \"a lighthouse keeper finds a door\""));
        assert!(request.schema.is_none());
    }

    #[test]
    fn test_characters_prompt_lists_roles() {
        let draft = PlotDraft {
            title: "Dust".to_string(),
            ..PlotDraft::default()
        };
        let request = characters_prompt(&draft);
        assert!(request.prompt.contains("Create 3 compelling characters"));
        assert!(request.prompt.contains("Hero, Villain, Mentor"));
    }

    #[test]
    fn test_episode_prompt_includes_only_last_two_summaries() {
        let plot = plot_with_episodes(3);
        let context = EpisodeContext::from_plot(&plot);
        let request = episode_prompt(&plot, &context);

        assert_eq!(context.episode_number, 4);
        assert!(!request.prompt.contains("ep1-beat1"));
        assert!(request.prompt.contains("ep2-beat5"));
        assert!(request.prompt.contains("ep3-beat1"));
        assert!(request.prompt.contains("memory through 3"));
    }

    #[test]
    fn test_episode_prompt_with_two_episodes_includes_both() {
        let plot = plot_with_episodes(2);
        let context = EpisodeContext::from_plot(&plot);
        let request = episode_prompt(&plot, &context);

        assert_eq!(context.recent_episodes.len(), 2);
        assert!(request.prompt.contains("Episode 1 (Chapter 1):"));
        assert!(request.prompt.contains("ep1-beat3"));
        assert!(request.prompt.contains("ep2-beat3"));
    }

    #[test]
    fn test_new_character_flagged_only_in_join_episode() {
        for (episodes, expect_new) in [(0, false), (1, false), (2, true), (3, false), (5, false)] {
            let plot = plot_with_episodes(episodes);
            let context = EpisodeContext::from_plot(&plot);
            let request = episode_prompt(&plot, &context);

            assert_eq!(
                context.new_character_names().contains(&"Vex"),
                expect_new,
                "episode {}",
                context.episode_number
            );
            assert_eq!(
                request.prompt.contains("NEW CHARACTERS: Vex"),
                expect_new,
                "episode {}",
                context.episode_number
            );
        }
    }

    #[test]
    fn test_future_characters_are_left_out_of_the_cast() {
        let plot = plot_with_episodes(0);
        let context = EpisodeContext::from_plot(&plot);
        let request = episode_prompt(&plot, &context);

        assert!(request.prompt.contains("Name: Mira (Mentor)"));
        assert!(request.prompt.contains("Secret: She burned the map"));
        assert!(!request.prompt.contains("Name: Vex"));
        assert!(request.prompt.contains("PREVIOUS MEMORY:\nNone"));
        assert!(request.prompt.contains("RECENT EVENTS:\nNone"));
    }
}

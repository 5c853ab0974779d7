// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message construction for the chat-completion stages.

use crate::templates::Template;

/// System prompt for the analysis stage, shaped by the channel theme if one is set.
pub fn analysis_system_prompt(theme: &str) -> String {
    let mut prompt = String::from(
        "You design avatar characters for live-stream viewers. Given a username, \
         describe in two or three sentences the character, creature, or object it \
         evokes: appearance, mood, and one distinctive detail. Keep it friendly \
         and safe for all audiences.",
    );
    let theme = theme.trim();
    if !theme.is_empty() {
        prompt.push_str(&format!(" Every character belongs to this theme: {theme}."));
    }
    prompt
}

/// Tells the model whether to read the username literally or through an override.
pub fn context_message(username: &str, meaning: Option<&str>) -> String {
    match meaning.map(str::trim).filter(|m| !m.is_empty()) {
        Some(meaning) => format!(
            "The username is \"{username}\". Do not interpret the name literally; it means: {meaning}"
        ),
        None => format!("The username is \"{username}\". Interpret the name itself."),
    }
}

/// The follow-up request for the scenario stage.
pub fn scenario_request(template: &Template) -> String {
    template.scenario_instruction.clone()
}

/// Final image prompt: the template prefix followed by the scene.
pub fn image_prompt(template: &Template, scenario: &str) -> String {
    format!("{} {}", template.prompt_prefix.trim(), scenario.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_is_only_mentioned_when_set() {
        assert!(!analysis_system_prompt("").contains("theme"));
        assert!(!analysis_system_prompt("   ").contains("theme"));
        assert!(analysis_system_prompt("deep sea").contains("theme: deep sea."));
    }

    #[test]
    fn context_distinguishes_literal_and_interpreted() {
        let literal = context_message("nightowl", None);
        assert!(literal.contains("Interpret the name itself"));

        let interpreted = context_message("nightowl", Some("a librarian who never sleeps"));
        assert!(interpreted.contains("Do not interpret the name literally"));
        assert!(interpreted.contains("a librarian who never sleeps"));

        assert_eq!(context_message("x", Some("  ")), context_message("x", None));
    }

    #[test]
    fn image_prompt_starts_with_prefix() {
        let template = Template::new("t", "describe", "Prefix:");
        assert_eq!(image_prompt(&template, " a fox \n"), "Prefix: a fox");
    }
}

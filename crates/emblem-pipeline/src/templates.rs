// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Named visual styles an avatar can be rendered in.

use rand::Rng;

/// One visual style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    /// Asks the chat model to turn the analysis into a scene for this style.
    pub scenario_instruction: String,
    /// Prepended to the scene to form the image prompt.
    pub prompt_prefix: String,
}

impl Template {
    pub fn new(
        name: impl Into<String>,
        scenario_instruction: impl Into<String>,
        prompt_prefix: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            scenario_instruction: scenario_instruction.into(),
            prompt_prefix: prompt_prefix.into(),
        }
    }
}

/// The set of templates a pipeline chooses from.
///
/// Holds the first template apart from the rest so the catalog cannot be
/// empty.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    first: Template,
    rest: Vec<Template>,
}

impl TemplateCatalog {
    /// Builds a catalog from `templates`, or `None` if there are none.
    pub fn new(templates: Vec<Template>) -> Option<Self> {
        let mut templates = templates.into_iter();
        let first = templates.next()?;
        Some(Self {
            first,
            rest: templates.collect(),
        })
    }

    pub fn builtin() -> Self {
        let [first, rest @ ..] = &BUILTIN;
        let template = |(name, instruction, prefix): &(&str, &str, &str)| {
            Template::new(*name, *instruction, *prefix)
        };
        Self {
            first: template(first),
            rest: rest.iter().map(template).collect(),
        }
    }

    fn iter(&self) -> impl Iterator<Item = &Template> {
        std::iter::once(&self.first).chain(&self.rest)
    }

    /// Looks a template up by name, ignoring case and surrounding whitespace.
    pub fn find(&self, name: &str) -> Option<&Template> {
        let name = name.trim();
        self.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Picks a template uniformly at random.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &Template {
        match rng.gen_range(0..=self.rest.len()) {
            0 => &self.first,
            i => &self.rest[i - 1],
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|t| t.name.as_str())
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

const BUILTIN: [(&str, &str, &str); 8] = [
    (
        "watercolor",
        "Describe a single calm scene for a watercolor portrait built around the character above. One short paragraph.",
        "Soft watercolor painting, loose brush strokes, paper texture:",
    ),
    (
        "pixel-art",
        "Describe a single scene for a 16-bit pixel art portrait of the character above. One short paragraph.",
        "16-bit pixel art sprite portrait, limited palette:",
    ),
    (
        "cyberpunk",
        "Describe a single neon-lit cyberpunk scene featuring the character above. One short paragraph.",
        "Cyberpunk digital illustration, neon rim lighting, rainy night:",
    ),
    (
        "storybook",
        "Describe a single whimsical storybook scene featuring the character above. One short paragraph.",
        "Children's storybook illustration, gouache, warm colors:",
    ),
    (
        "stained-glass",
        "Describe a single heraldic scene for a stained glass window of the character above. One short paragraph.",
        "Stained glass window, bold lead lines, luminous color:",
    ),
    (
        "synthwave",
        "Describe a single retro-futuristic synthwave scene featuring the character above. One short paragraph.",
        "Synthwave poster art, sunset grid, chrome highlights:",
    ),
    (
        "low-poly",
        "Describe a single scene for a low-poly 3D render of the character above. One short paragraph.",
        "Low-poly 3D render, flat shading, soft studio light:",
    ),
    (
        "ukiyo-e",
        "Describe a single scene for a ukiyo-e woodblock print of the character above. One short paragraph.",
        "Ukiyo-e woodblock print, flat color, fine outlines:",
    ),
];

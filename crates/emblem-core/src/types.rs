// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the pipeline, the stores, and the adapters.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifies the kind of adapter behind a trait object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum AdapterType {
    Chat,
    Image,
    Hosting,
    Storage,
    Sink,
}

/// Trims and lower-cases an identity so one user or broadcaster never forks
/// into two records.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Parses a generic `WIDTHxHEIGHT` size. Both sides must be positive.
pub fn parse_size(size: &str) -> Option<(u32, u32)> {
    let (w, h) = size.trim().split_once(|c: char| c == 'x' || c == 'X')?;
    let w = w.trim().parse::<u32>().ok()?;
    let h = h.trim().parse::<u32>().ok()?;
    (w > 0 && h > 0).then_some((w, h))
}

// --- Event metadata ---

/// Platform an event originated from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// The live-streaming chat platform.
    Twitch,
    /// The companion messaging platform.
    Discord,
}

/// What kind of platform event triggered a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Subscription,
    Resubscription,
    GiftSubscription,
    Redemption,
    Command,
}

/// Arbitrary context carried through a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    pub platform: Platform,
    /// Broadcaster (channel owner) the event belongs to.
    pub channel: String,
    /// User who caused the event (the gifter for gift subscriptions).
    pub triggered_by: String,
    pub trigger: TriggerKind,
}

/// One unit of generation work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub username: String,
    /// Per-broadcaster theme; empty when none is set.
    pub theme: String,
    /// Explicit template keyword overriding random selection.
    pub style: Option<String>,
    pub metadata: EventMetadata,
}

/// Terminal outcome of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationResult {
    Success {
        published_url: String,
        analysis: String,
        revised_prompt: String,
    },
    Failure {
        reason: String,
    },
}

impl GenerationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationResult::Success { .. })
    }
}

/// Sequential stages of a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Resolve,
    Analyze,
    SelectTemplate,
    ComposeScenario,
    GenerateImage,
    Publish,
}

// --- Chat completion ---

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a chat-completion conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// --- Image generation ---

/// Provider tag used by the image generator factory.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ImageProvider {
    /// Primary provider.
    #[strum(serialize = "openai")]
    #[serde(rename = "openai")]
    OpenAi,
    /// Secondary provider.
    Fal,
    /// Tertiary provider.
    Replicate,
}

/// Provider-neutral image request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOptions {
    pub prompt: String,
    /// Generic `WIDTHxHEIGHT` size; each provider maps it to its own vocabulary.
    pub size: String,
    pub style: Option<String>,
    pub number_of_images: Option<u32>,
    pub enable_safety_checker: Option<bool>,
}

impl ImageOptions {
    pub fn new(prompt: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            size: size.into(),
            style: None,
            number_of_images: None,
            enable_safety_checker: None,
        }
    }
}

/// Result of one image-generation call. Providers never raise for
/// provider-level failures; they report `Failure` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Success {
        url: String,
        revised_prompt: Option<String>,
        analysis: Option<String>,
    },
    Failure {
        message: String,
    },
}

// --- Hosting ---

/// Descriptive fields attached to an uploaded image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadMetadata {
    pub title: String,
    pub description: String,
}

// --- History ---

/// One delivered avatar, as persisted in the image-history document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHistoryRecord {
    pub image: String,
    pub analysis: String,
    #[serde(rename = "revisedPrompt")]
    pub revised_prompt: String,
    /// ISO-8601 UTC timestamp.
    pub date: String,
}

impl ImageHistoryRecord {
    /// Builds a record stamped with the current time.
    pub fn now(image: String, analysis: String, revised_prompt: String) -> Self {
        Self {
            image,
            analysis,
            revised_prompt,
            date: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

// --- Delivery ---

/// Where an outbound chat message goes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeliveryTarget {
    pub platform: Platform,
    pub channel: String,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn normalize_key_folds_case_and_whitespace() {
        assert_eq!(normalize_key("  FooUser "), "foouser");
        assert_eq!(normalize_key("fooUSER"), normalize_key("FooUser"));
    }

    #[test]
    fn parse_size_accepts_either_separator_case() {
        assert_eq!(parse_size("1024x1024"), Some((1024, 1024)));
        assert_eq!(parse_size(" 1792X1024 "), Some((1792, 1024)));
        assert_eq!(parse_size("0x1024"), None);
        assert_eq!(parse_size("1024"), None);
        assert_eq!(parse_size("widexhigh"), None);
    }

    #[test]
    fn image_provider_parses_case_insensitively() {
        assert_eq!(ImageProvider::from_str("OpenAI").unwrap(), ImageProvider::OpenAi);
        assert_eq!(ImageProvider::from_str("fal").unwrap(), ImageProvider::Fal);
        assert_eq!(ImageProvider::OpenAi.to_string(), "openai");
        assert!(ImageProvider::from_str("midjourney").is_err());
    }

    #[test]
    fn history_record_uses_camel_case_revised_prompt() {
        let record = ImageHistoryRecord::now("u".into(), "a".into(), "p".into());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["revisedPrompt"], "p");
        assert!(json.get("revised_prompt").is_none());
        assert!(chrono::DateTime::parse_from_rfc3339(&record.date).is_ok());
        assert!(record.date.ends_with('Z'));
    }

    #[test]
    fn stage_display_is_snake_case() {
        assert_eq!(Stage::GenerateImage.to_string(), "generate_image");
    }

    #[test]
    fn platform_round_trips_through_serde() {
        let json = serde_json::to_string(&Platform::Twitch).unwrap();
        assert_eq!(json, "\"twitch\"");
        let parsed: Platform = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Platform::Twitch);
    }
}

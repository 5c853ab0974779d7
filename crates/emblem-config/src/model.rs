// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Emblem.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use emblem_core::ImageProvider;
use serde::{Deserialize, Serialize};

/// Top-level Emblem configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmblemConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Where the JSON state documents live.
    #[serde(default)]
    pub storage: StorageConfig,

    /// OpenAI chat-completion and image settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Fal image settings.
    #[serde(default)]
    pub fal: FalConfig,

    /// Replicate image settings.
    #[serde(default)]
    pub replicate: ReplicateConfig,

    /// Imgur hosting settings.
    #[serde(default)]
    pub imgur: ImgurConfig,

    /// Image-generation defaults and provider selection.
    #[serde(default)]
    pub images: ImagesConfig,

    /// Rolling-window rate limits per external resource.
    #[serde(default)]
    pub throttle: ThrottleConfig,

    /// Pipeline-level retry policy.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Process identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in logs and upload titles.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "emblem".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding one JSON document per state domain.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("emblem"))
        .unwrap_or_else(|| std::path::PathBuf::from("./data"))
        .to_string_lossy()
        .to_string()
}

/// OpenAI API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key. `None` disables both chat completion and the OpenAI image provider.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    /// Model used for the analysis and scenario stages.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Model used when `images.provider = "openai"`.
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Maximum tokens per chat completion.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            chat_model: default_chat_model(),
            image_model: default_image_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o".to_string()
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_max_tokens() -> u32 {
    600
}

/// Fal configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FalConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_fal_base_url")]
    pub base_url: String,

    #[serde(default = "default_fal_model")]
    pub model: String,
}

impl Default for FalConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_fal_base_url(),
            model: default_fal_model(),
        }
    }
}

fn default_fal_base_url() -> String {
    "https://fal.run".to_string()
}

fn default_fal_model() -> String {
    "fal-ai/flux/dev".to_string()
}

/// Replicate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReplicateConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_replicate_base_url")]
    pub base_url: String,

    /// `owner/name` of the model to run.
    #[serde(default = "default_replicate_model")]
    pub model: String,
}

impl Default for ReplicateConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_replicate_base_url(),
            model: default_replicate_model(),
        }
    }
}

fn default_replicate_base_url() -> String {
    "https://api.replicate.com/v1".to_string()
}

fn default_replicate_model() -> String {
    "black-forest-labs/flux-schnell".to_string()
}

/// Imgur hosting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ImgurConfig {
    /// Imgur application client id.
    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default = "default_imgur_base_url")]
    pub base_url: String,

    /// Public URL for a hosted image; `{id}` is replaced by the image id.
    #[serde(default = "default_public_url_template")]
    pub public_url_template: String,
}

impl Default for ImgurConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            base_url: default_imgur_base_url(),
            public_url_template: default_public_url_template(),
        }
    }
}

fn default_imgur_base_url() -> String {
    "https://api.imgur.com/3".to_string()
}

fn default_public_url_template() -> String {
    "https://i.imgur.com/{id}.png".to_string()
}

/// Image generation defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ImagesConfig {
    /// Which image backend the factory builds.
    #[serde(default = "default_provider")]
    pub provider: ImageProvider,

    /// Generic `WIDTHxHEIGHT` size.
    #[serde(default = "default_size")]
    pub size: String,

    #[serde(default = "default_number_of_images")]
    pub number_of_images: u32,

    #[serde(default = "default_enable_safety_checker")]
    pub enable_safety_checker: bool,

    /// Provider style passed through on every request (e.g. `vivid`).
    #[serde(default)]
    pub default_style: Option<String>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            size: default_size(),
            number_of_images: default_number_of_images(),
            enable_safety_checker: default_enable_safety_checker(),
            default_style: None,
        }
    }
}

fn default_provider() -> ImageProvider {
    ImageProvider::OpenAi
}

fn default_size() -> String {
    "1024x1024".to_string()
}

fn default_number_of_images() -> u32 {
    1
}

fn default_enable_safety_checker() -> bool {
    true
}

/// Rolling-window limits, one pair per external resource.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ThrottleConfig {
    #[serde(default = "default_chat_limit")]
    pub chat_limit: usize,

    #[serde(default = "default_minute_ms")]
    pub chat_window_ms: u64,

    /// Image budget; depends on the provider account tier.
    #[serde(default = "default_image_limit")]
    pub image_limit: usize,

    #[serde(default = "default_minute_ms")]
    pub image_window_ms: u64,

    #[serde(default = "default_message_limit")]
    pub message_limit: usize,

    #[serde(default = "default_message_window_ms")]
    pub message_window_ms: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            chat_limit: default_chat_limit(),
            chat_window_ms: default_minute_ms(),
            image_limit: default_image_limit(),
            image_window_ms: default_minute_ms(),
            message_limit: default_message_limit(),
            message_window_ms: default_message_window_ms(),
        }
    }
}

fn default_chat_limit() -> usize {
    60
}

fn default_image_limit() -> usize {
    5
}

fn default_message_limit() -> usize {
    20
}

fn default_minute_ms() -> u64 {
    60_000
}

fn default_message_window_ms() -> u64 {
    30_000
}

/// Pipeline retry policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Retries after the initial attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between attempts. Zero retries immediately.
    #[serde(default)]
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_ms: 0,
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

impl EmblemConfig {
    /// Returns a copy with every credential replaced by a placeholder, for display.
    pub fn redacted(&self) -> Self {
        fn mask(value: &Option<String>) -> Option<String> {
            value.as_ref().map(|_| "[REDACTED]".to_string())
        }

        let mut config = self.clone();
        config.openai.api_key = mask(&self.openai.api_key);
        config.fal.api_key = mask(&self.fal.api_key);
        config.replicate.api_key = mask(&self.replicate.api_key);
        config.imgur.client_id = mask(&self.imgur.client_id);
        config
    }
}

// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! External service clients for Emblem.
//!
//! - [`OpenAiChat`]: chat completion for the analysis and scenario stages
//! - [`OpenAiImages`], [`FalImages`], [`ReplicateImages`]: the three
//!   [`ImageGenerator`] variants, chosen by [`build_image_generator`]
//! - [`ImgurHost`]: re-hosts generated images under a stable public URL
//!
//! Image generators never return errors. Provider-level failures come back
//! as [`GenerationOutcome::Failure`]; only missing configuration fails, and
//! only at construction.

pub mod chat;
pub mod fal;
mod http;
pub mod imgur;
pub mod openai_images;
pub mod replicate;
pub mod size;

use std::sync::Arc;

use emblem_config::EmblemConfig;
use emblem_core::{EmblemError, GenerationOutcome, ImageGenerator, ImageProvider};
use tracing::{info, warn};

pub use chat::OpenAiChat;
pub use fal::FalImages;
pub use imgur::ImgurHost;
pub use openai_images::OpenAiImages;
pub use replicate::ReplicateImages;
pub use size::parse_size;

/// Builds the image generator selected by `provider`.
///
/// Fails with [`EmblemError::Config`] when that provider's credential is
/// missing from both config and environment.
pub fn build_image_generator(
    provider: ImageProvider,
    config: &EmblemConfig,
) -> Result<Arc<dyn ImageGenerator>, EmblemError> {
    let generator: Arc<dyn ImageGenerator> = match provider {
        ImageProvider::OpenAi => Arc::new(OpenAiImages::from_config(config)?),
        ImageProvider::Fal => Arc::new(FalImages::from_config(config)?),
        ImageProvider::Replicate => Arc::new(ReplicateImages::from_config(config)?),
    };
    info!(provider = %provider, adapter = generator.name(), "image generator ready");
    Ok(generator)
}

/// Config value if set and non-empty, else the environment variable.
pub(crate) fn resolve_api_key(
    config_key: &Option<String>,
    env_var: &str,
    config_path: &str,
) -> Result<String, EmblemError> {
    if let Some(key) = config_key.as_deref().filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }

    match std::env::var(env_var) {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => Err(EmblemError::Config(format!(
            "credential not found. Set {config_path} in config or the {env_var} environment variable."
        ))),
    }
}

/// A provider's successful image before it is folded into an outcome.
pub(crate) struct GeneratedImage {
    pub url: String,
    pub revised_prompt: Option<String>,
}

pub(crate) fn into_outcome(
    provider: &str,
    result: Result<GeneratedImage, EmblemError>,
) -> GenerationOutcome {
    match result {
        Ok(image) => GenerationOutcome::Success {
            url: image.url,
            revised_prompt: image.revised_prompt,
            analysis: None,
        },
        Err(e) => {
            warn!(provider, error = %e, "image generation failed");
            GenerationOutcome::Failure {
                message: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNSET_VAR: &str = "EMBLEM_TEST_SURELY_UNSET_CREDENTIAL";

    #[test]
    fn config_key_wins() {
        let key = resolve_api_key(&Some("sk-config".into()), UNSET_VAR, "openai.api_key").unwrap();
        assert_eq!(key, "sk-config");
    }

    #[test]
    fn missing_key_is_a_config_error() {
        for configured in [None, Some(String::new())] {
            let err = resolve_api_key(&configured, UNSET_VAR, "fal.api_key").unwrap_err();
            match err {
                EmblemError::Config(message) => {
                    assert!(message.contains("fal.api_key"), "got: {message}");
                    assert!(message.contains(UNSET_VAR), "got: {message}");
                }
                other => panic!("expected config error, got {other:?}"),
            }
        }
    }

    #[test]
    fn factory_builds_the_selected_variant() {
        let mut config = EmblemConfig::default();
        config.openai.api_key = Some("sk-test".into());
        config.fal.api_key = Some("fal-test".into());
        config.replicate.api_key = Some("r8-test".into());

        for provider in [ImageProvider::OpenAi, ImageProvider::Fal, ImageProvider::Replicate] {
            let generator = build_image_generator(provider, &config).unwrap();
            assert_eq!(generator.provider(), provider);
        }
    }

    #[test]
    fn failure_outcome_keeps_error_text() {
        let outcome = into_outcome(
            "fal",
            Err(EmblemError::ProviderRefusal {
                provider: "fal".into(),
                reason: "quota".into(),
            }),
        );
        assert_eq!(
            outcome,
            GenerationOutcome::Failure {
                message: "fal refused: quota".into()
            }
        );
    }
}

// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Replicate image generation, the tertiary provider.
//!
//! Predictions are created with `Prefer: wait`, so the response normally
//! already carries the finished output.

use async_trait::async_trait;
use emblem_config::EmblemConfig;
use emblem_core::{
    AdapterType, EmblemError, GenerationOutcome, ImageGenerator, ImageOptions, ImageProvider,
    PluginAdapter,
};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::{build_client, header_value, post_json};
use crate::size::replicate_aspect_ratio;
use crate::{GeneratedImage, into_outcome, resolve_api_key};

const PROVIDER: &str = "replicate";

#[derive(Debug, Serialize)]
struct PredictionRequest<'a> {
    input: PredictionInput<'a>,
}

#[derive(Debug, Serialize)]
struct PredictionInput<'a> {
    prompt: &'a str,
    aspect_ratio: &'static str,
    num_outputs: u32,
    disable_safety_checker: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(default)]
    status: String,
    #[serde(default)]
    output: Value,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct ReplicateImages {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl ReplicateImages {
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Result<Self, EmblemError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            header_value("authorization", &format!("Bearer {api_key}"))?,
        );
        headers.insert("prefer", HeaderValue::from_static("wait"));
        Ok(Self {
            client: build_client(headers)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.trim_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &EmblemConfig) -> Result<Self, EmblemError> {
        let api_key = resolve_api_key(
            &config.replicate.api_key,
            "REPLICATE_API_TOKEN",
            "replicate.api_key",
        )?;
        Self::new(&api_key, &config.replicate.base_url, &config.replicate.model)
    }

    async fn request(&self, options: &ImageOptions) -> Result<GeneratedImage, EmblemError> {
        let request = PredictionRequest {
            input: PredictionInput {
                prompt: &options.prompt,
                aspect_ratio: replicate_aspect_ratio(&options.size),
                num_outputs: options.number_of_images.unwrap_or(1).max(1),
                disable_safety_checker: !options.enable_safety_checker.unwrap_or(true),
                style: options.style.as_deref(),
            },
        };

        let url = format!("{}/models/{}/predictions", self.base_url, self.model);
        let prediction: Prediction = post_json(&self.client, PROVIDER, &url, &request).await?;

        if prediction.status != "succeeded" {
            let reason = match prediction.error {
                Some(Value::String(text)) => text,
                Some(Value::Null) | None => format!("prediction ended with status `{}`", prediction.status),
                Some(other) => other.to_string(),
            };
            return Err(EmblemError::Provider {
                message: format!("replicate prediction failed: {reason}"),
                source: None,
            });
        }

        match first_output_url(&prediction.output) {
            Some(url) => Ok(GeneratedImage {
                url,
                revised_prompt: None,
            }),
            None => Err(EmblemError::ProviderRefusal {
                provider: PROVIDER.to_string(),
                reason: "prediction produced no output".to_string(),
            }),
        }
    }
}

/// `output` is a single URL for some models and a list of URLs for others.
fn first_output_url(output: &Value) -> Option<String> {
    match output {
        Value::String(url) => Some(url.clone()),
        Value::Array(items) => items.iter().find_map(|item| item.as_str().map(str::to_string)),
        _ => None,
    }
}

impl PluginAdapter for ReplicateImages {
    fn name(&self) -> &str {
        "replicate-images"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Image
    }
}

#[async_trait]
impl ImageGenerator for ReplicateImages {
    fn provider(&self) -> ImageProvider {
        ImageProvider::Replicate
    }

    async fn generate_image(&self, options: &ImageOptions) -> GenerationOutcome {
        into_outcome(PROVIDER, self.request(options).await)
    }
}

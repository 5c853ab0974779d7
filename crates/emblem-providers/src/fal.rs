// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fal image generation, the secondary provider.

use async_trait::async_trait;
use emblem_config::EmblemConfig;
use emblem_core::{
    AdapterType, EmblemError, GenerationOutcome, ImageGenerator, ImageOptions, ImageProvider,
    PluginAdapter,
};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::http::{build_client, header_value, post_json};
use crate::size::fal_image_size;
use crate::{GeneratedImage, into_outcome, resolve_api_key};

const PROVIDER: &str = "fal";

#[derive(Debug, Serialize)]
struct FalRequest<'a> {
    prompt: &'a str,
    image_size: &'static str,
    num_images: u32,
    enable_safety_checker: bool,
}

#[derive(Debug, Deserialize)]
struct FalResponse {
    #[serde(default)]
    images: Vec<FalImage>,
    #[serde(default)]
    has_nsfw_concepts: Vec<bool>,
    #[serde(default)]
    prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FalImage {
    url: String,
}

#[derive(Debug, Clone)]
pub struct FalImages {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl FalImages {
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Result<Self, EmblemError> {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", header_value("authorization", &format!("Key {api_key}"))?);
        Ok(Self {
            client: build_client(headers)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.trim_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &EmblemConfig) -> Result<Self, EmblemError> {
        let api_key = resolve_api_key(&config.fal.api_key, "FAL_KEY", "fal.api_key")?;
        Self::new(&api_key, &config.fal.base_url, &config.fal.model)
    }

    async fn request(&self, options: &ImageOptions) -> Result<GeneratedImage, EmblemError> {
        let request = FalRequest {
            prompt: &options.prompt,
            image_size: fal_image_size(&options.size),
            num_images: options.number_of_images.unwrap_or(1).max(1),
            enable_safety_checker: options.enable_safety_checker.unwrap_or(true),
        };

        let url = format!("{}/{}", self.base_url, self.model);
        let response: FalResponse = post_json(&self.client, PROVIDER, &url, &request).await?;

        if response.has_nsfw_concepts.first().copied().unwrap_or(false) {
            return Err(EmblemError::ProviderRefusal {
                provider: PROVIDER.to_string(),
                reason: "image flagged by safety checker".to_string(),
            });
        }

        match response.images.into_iter().next() {
            Some(image) => Ok(GeneratedImage {
                url: image.url,
                revised_prompt: response.prompt,
            }),
            None => Err(EmblemError::ProviderRefusal {
                provider: PROVIDER.to_string(),
                reason: "response contained no images".to_string(),
            }),
        }
    }
}

impl PluginAdapter for FalImages {
    fn name(&self) -> &str {
        "fal-images"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Image
    }
}

#[async_trait]
impl ImageGenerator for FalImages {
    fn provider(&self) -> ImageProvider {
        ImageProvider::Fal
    }

    async fn generate_image(&self, options: &ImageOptions) -> GenerationOutcome {
        into_outcome(PROVIDER, self.request(options).await)
    }
}

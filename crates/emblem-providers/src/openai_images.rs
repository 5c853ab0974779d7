// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI image generation, the primary provider.

use async_trait::async_trait;
use emblem_config::EmblemConfig;
use emblem_core::{
    AdapterType, EmblemError, GenerationOutcome, ImageGenerator, ImageOptions, ImageProvider,
    PluginAdapter,
};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::http::{build_client, header_value, post_json};
use crate::size::openai_size;
use crate::{GeneratedImage, into_outcome, resolve_api_key};

const PROVIDER: &str = "openai";

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    revised_prompt: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenAiImages {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenAiImages {
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Result<Self, EmblemError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            header_value("authorization", &format!("Bearer {api_key}"))?,
        );
        Ok(Self {
            client: build_client(headers)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn from_config(config: &EmblemConfig) -> Result<Self, EmblemError> {
        let api_key = resolve_api_key(&config.openai.api_key, "OPENAI_API_KEY", "openai.api_key")?;
        Self::new(&api_key, &config.openai.base_url, &config.openai.image_model)
    }

    async fn request(&self, options: &ImageOptions) -> Result<GeneratedImage, EmblemError> {
        // Only the two documented styles are accepted upstream.
        let style = options
            .style
            .as_deref()
            .filter(|s| matches!(*s, "vivid" | "natural"));
        let request = ImageRequest {
            model: &self.model,
            prompt: &options.prompt,
            n: options.number_of_images.unwrap_or(1).max(1),
            size: openai_size(&options.size),
            style,
        };

        let url = format!("{}/images/generations", self.base_url);
        let response: ImageResponse = post_json(&self.client, PROVIDER, &url, &request).await?;

        let first = response.data.into_iter().next();
        match first {
            Some(ImageData {
                url: Some(url),
                revised_prompt,
            }) => Ok(GeneratedImage { url, revised_prompt }),
            _ => Err(EmblemError::ProviderRefusal {
                provider: PROVIDER.to_string(),
                reason: "response contained no image URL".to_string(),
            }),
        }
    }
}

impl PluginAdapter for OpenAiImages {
    fn name(&self) -> &str {
        "openai-images"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Image
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImages {
    fn provider(&self) -> ImageProvider {
        ImageProvider::OpenAi
    }

    async fn generate_image(&self, options: &ImageOptions) -> GenerationOutcome {
        into_outcome(PROVIDER, self.request(options).await)
    }
}

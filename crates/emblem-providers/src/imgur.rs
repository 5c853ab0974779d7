// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Imgur upload client used by the publish stage.
//!
//! Provider URLs are short-lived, so every generated image is re-hosted
//! before it is shown to anyone.

use async_trait::async_trait;
use emblem_config::EmblemConfig;
use emblem_core::{AdapterType, EmblemError, ImageHost, PluginAdapter, UploadMetadata};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::http::{build_client, header_value, post_json};
use crate::resolve_api_key;

const PROVIDER: &str = "imgur";

#[derive(Debug, Serialize)]
struct UploadRequest<'a> {
    image: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    title: &'a str,
    description: &'a str,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Clone)]
pub struct ImgurHost {
    client: reqwest::Client,
    base_url: String,
    public_url_template: String,
}

impl ImgurHost {
    pub fn new(client_id: &str, base_url: &str, public_url_template: &str) -> Result<Self, EmblemError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            header_value("authorization", &format!("Client-ID {client_id}"))?,
        );
        Ok(Self {
            client: build_client(headers)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            public_url_template: public_url_template.to_string(),
        })
    }

    pub fn from_config(config: &EmblemConfig) -> Result<Self, EmblemError> {
        let client_id = resolve_api_key(&config.imgur.client_id, "IMGUR_CLIENT_ID", "imgur.client_id")?;
        Self::new(
            &client_id,
            &config.imgur.base_url,
            &config.imgur.public_url_template,
        )
    }
}

impl PluginAdapter for ImgurHost {
    fn name(&self) -> &str {
        "imgur"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Hosting
    }
}

#[async_trait]
impl ImageHost for ImgurHost {
    async fn upload_from_url(&self, source_url: &str, metadata: &UploadMetadata) -> Result<String, EmblemError> {
        let request = UploadRequest {
            image: source_url,
            kind: "url",
            title: &metadata.title,
            description: &metadata.description,
        };
        let url = format!("{}/image", self.base_url);
        let response: UploadResponse = post_json(&self.client, PROVIDER, &url, &request).await?;

        if !response.success {
            return Err(EmblemError::Provider {
                message: format!("imgur upload failed: {}", joined_errors(&response.data)),
                source: None,
            });
        }

        match response.data.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => {
                debug!(id, "image uploaded");
                Ok(id.to_string())
            }
            _ => Err(EmblemError::Provider {
                message: "imgur upload response had no image id".to_string(),
                source: None,
            }),
        }
    }

    fn public_url(&self, id: &str) -> String {
        self.public_url_template.replace("{id}", id)
    }
}

/// Imgur reports errors as a string, an object with `message`, or a list of either.
fn joined_errors(data: &Value) -> String {
    fn one(error: &Value) -> String {
        match error {
            Value::String(text) => text.clone(),
            other => other
                .get("message")
                .and_then(Value::as_str)
                .map_or_else(|| other.to_string(), str::to_string),
        }
    }

    match data.get("error") {
        Some(Value::Array(errors)) => errors.iter().map(one).collect::<Vec<_>>().join("; "),
        Some(error) => one(error),
        None => "unknown error".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn host(server: &MockServer) -> ImgurHost {
        ImgurHost::new("client-123", &server.uri(), "https://i.imgur.com/{id}.png").unwrap()
    }

    fn metadata() -> UploadMetadata {
        UploadMetadata {
            title: "nightowl".into(),
            description: "An owl reading by lamplight".into(),
        }
    }

    #[tokio::test]
    async fn upload_returns_image_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/image"))
            .and(header("authorization", "Client-ID client-123"))
            .and(body_json(serde_json::json!({
                "image": "https://img.example/owl.png",
                "type": "url",
                "title": "nightowl",
                "description": "An owl reading by lamplight"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"id": "aB3dE", "link": "https://i.imgur.com/aB3dE.png"},
                "success": true,
                "status": 200
            })))
            .expect(1)
            .mount(&server)
            .await;

        let host = host(&server);
        let id = host
            .upload_from_url("https://img.example/owl.png", &metadata())
            .await
            .unwrap();
        assert_eq!(id, "aB3dE");
        assert_eq!(host.public_url(&id), "https://i.imgur.com/aB3dE.png");
    }

    #[tokio::test]
    async fn unsuccessful_upload_joins_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"error": [{"message": "File type invalid"}, "Image too large"]},
                "success": false,
                "status": 200
            })))
            .mount(&server)
            .await;

        let err = host(&server)
            .upload_from_url("https://img.example/owl.png", &metadata())
            .await
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("File type invalid; Image too large"), "got: {text}");
    }

    #[tokio::test]
    async fn http_error_is_a_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "data": {"error": "Invalid URL", "request": "/3/image"},
                "success": false,
                "status": 400
            })))
            .mount(&server)
            .await;

        let err = host(&server)
            .upload_from_url("not a url", &metadata())
            .await
            .unwrap_err();
        assert!(matches!(err, EmblemError::Provider { .. }));
        assert!(err.to_string().contains("Invalid URL"));
    }
}

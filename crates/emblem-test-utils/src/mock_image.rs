// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock image generator and image host.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use emblem_core::{
    AdapterType, EmblemError, GenerationOutcome, ImageGenerator, ImageHost, ImageOptions,
    ImageProvider, PluginAdapter, UploadMetadata,
};
use tokio::sync::Mutex;

/// Returns scripted outcomes, then a fixed default, and records every request.
pub struct MockImageGenerator {
    script: Mutex<VecDeque<GenerationOutcome>>,
    fallback: Option<String>,
    requests: Mutex<Vec<ImageOptions>>,
}

impl MockImageGenerator {
    /// Unscripted calls succeed with a numbered provider URL.
    pub fn succeeding() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Unscripted calls fail with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fallback: Some(message.into()),
            ..Self::succeeding()
        }
    }

    pub async fn push_outcome(&self, outcome: GenerationOutcome) {
        self.script.lock().await.push_back(outcome);
    }

    pub async fn requests(&self) -> Vec<ImageOptions> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

impl PluginAdapter for MockImageGenerator {
    fn name(&self) -> &str {
        "mock-images"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Image
    }
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    fn provider(&self) -> ImageProvider {
        ImageProvider::OpenAi
    }

    async fn generate_image(&self, options: &ImageOptions) -> GenerationOutcome {
        let call = {
            let mut requests = self.requests.lock().await;
            requests.push(options.clone());
            requests.len()
        };

        if let Some(outcome) = self.script.lock().await.pop_front() {
            return outcome;
        }
        match &self.fallback {
            Some(message) => GenerationOutcome::Failure {
                message: message.clone(),
            },
            None => GenerationOutcome::Success {
                url: format!("https://provider.test/image-{call}.png"),
                revised_prompt: Some(format!("revised: {}", options.prompt)),
                analysis: None,
            },
        }
    }
}

/// Accepts every upload unless told to fail, and hands out sequential ids.
pub struct MockImageHost {
    uploads: Mutex<Vec<(String, UploadMetadata)>>,
    failures_left: AtomicUsize,
}

impl MockImageHost {
    pub fn new() -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
            failures_left: AtomicUsize::new(0),
        }
    }

    /// Makes the next `n` uploads fail.
    pub fn fail_next(&self, n: usize) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    /// Successful uploads as `(source_url, metadata)`.
    pub async fn uploads(&self) -> Vec<(String, UploadMetadata)> {
        self.uploads.lock().await.clone()
    }
}

impl Default for MockImageHost {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginAdapter for MockImageHost {
    fn name(&self) -> &str {
        "mock-host"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Hosting
    }
}

#[async_trait]
impl ImageHost for MockImageHost {
    async fn upload_from_url(&self, source_url: &str, metadata: &UploadMetadata) -> Result<String, EmblemError> {
        let should_fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(EmblemError::Provider {
                message: "mock upload rejected".to_string(),
                source: None,
            });
        }

        let mut uploads = self.uploads.lock().await;
        uploads.push((source_url.to_string(), metadata.clone()));
        Ok(format!("img{}", uploads.len()))
    }

    fn public_url(&self, id: &str) -> String {
        format!("https://images.test/{id}.png")
    }
}

// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end pipeline and dispatcher tests.
//!
//! `PipelineHarness` wires a real [`GenerationPipeline`] and
//! [`EventDispatcher`] to mock adapters and an in-memory document store.
//! Throttles default to limits high enough that they never delay a test.

use std::sync::Arc;

use emblem_config::model::ThrottleConfig;
use emblem_core::{
    ChatCompletion, DocumentStore, EmblemError, EventMetadata, GenerationRequest, ImageGenerator,
    ImageHost, MessageSink, Platform, TriggerKind,
};
use emblem_dispatch::{EventDispatcher, EventKind, PlatformEvent};
use emblem_pipeline::{GenerationPipeline, PipelineSettings};
use emblem_resilience::{RetryPolicy, Throttles};
use emblem_storage::StateStores;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::memory_store::MemoryDocumentStore;
use crate::mock_chat::MockChat;
use crate::mock_image::{MockImageGenerator, MockImageHost};
use crate::recording_sink::RecordingSink;

/// Builder for [`PipelineHarness`].
pub struct PipelineHarnessBuilder {
    chat: MockChat,
    images: MockImageGenerator,
    store: MemoryDocumentStore,
    retry: RetryPolicy,
    throttle: ThrottleConfig,
    seed: Option<u64>,
}

impl PipelineHarnessBuilder {
    fn new() -> Self {
        Self {
            chat: MockChat::new(),
            images: MockImageGenerator::succeeding(),
            store: MemoryDocumentStore::new(),
            retry: RetryPolicy::default(),
            throttle: ThrottleConfig {
                chat_limit: 10_000,
                chat_window_ms: 1,
                image_limit: 10_000,
                image_window_ms: 1,
                message_limit: 10_000,
                message_window_ms: 1,
            },
            seed: None,
        }
    }

    pub fn with_chat(mut self, chat: MockChat) -> Self {
        self.chat = chat;
        self
    }

    pub fn with_images(mut self, images: MockImageGenerator) -> Self {
        self.images = images;
        self
    }

    /// Use a pre-seeded document store.
    pub fn with_store(mut self, store: MemoryDocumentStore) -> Self {
        self.store = store;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self
    }

    pub fn with_throttle(mut self, throttle: ThrottleConfig) -> Self {
        self.throttle = throttle;
        self
    }

    /// Seeds template selection.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub async fn build(self) -> Result<PipelineHarness, EmblemError> {
        let chat = Arc::new(self.chat);
        let images = Arc::new(self.images);
        let host = Arc::new(MockImageHost::new());
        let sink = Arc::new(RecordingSink::new());
        let store = Arc::new(self.store);

        let stores = Arc::new(StateStores::open(Arc::clone(&store) as Arc<dyn DocumentStore>).await?);
        let throttles = Throttles::from_config(&self.throttle);

        let mut pipeline = GenerationPipeline::new(
            Arc::clone(&chat) as Arc<dyn ChatCompletion>,
            Arc::clone(&images) as Arc<dyn ImageGenerator>,
            Arc::clone(&host) as Arc<dyn ImageHost>,
            Arc::clone(&stores),
            throttles.clone(),
        )
        .with_retry(self.retry)
        .with_settings(PipelineSettings::default());
        if let Some(seed) = self.seed {
            pipeline = pipeline.with_rng(StdRng::seed_from_u64(seed));
        }
        let pipeline = Arc::new(pipeline);

        let dispatcher = Arc::new(EventDispatcher::new(
            Arc::clone(&pipeline),
            Arc::clone(&stores),
            Arc::clone(&sink) as Arc<dyn MessageSink>,
            Arc::clone(&throttles.message),
        ));

        Ok(PipelineHarness {
            chat,
            images,
            host,
            sink,
            store,
            stores,
            throttles,
            pipeline,
            dispatcher,
        })
    }
}

/// A fully wired pipeline and dispatcher over mock adapters.
pub struct PipelineHarness {
    pub chat: Arc<MockChat>,
    pub images: Arc<MockImageGenerator>,
    pub host: Arc<MockImageHost>,
    pub sink: Arc<RecordingSink>,
    pub store: Arc<MemoryDocumentStore>,
    pub stores: Arc<StateStores>,
    pub throttles: Throttles,
    pub pipeline: Arc<GenerationPipeline>,
    pub dispatcher: Arc<EventDispatcher>,
}

impl PipelineHarness {
    pub fn builder() -> PipelineHarnessBuilder {
        PipelineHarnessBuilder::new()
    }

    /// A harness with all defaults.
    pub async fn new() -> Result<Self, EmblemError> {
        Self::builder().build().await
    }

    /// A subscription-triggered request on Twitch.
    pub fn request(channel: &str, user: &str, style: Option<&str>) -> GenerationRequest {
        GenerationRequest {
            username: user.to_string(),
            theme: String::new(),
            style: style.map(str::to_string),
            metadata: EventMetadata {
                platform: Platform::Twitch,
                channel: channel.to_string(),
                triggered_by: user.to_string(),
                trigger: TriggerKind::Subscription,
            },
        }
    }

    /// A Twitch event of the given kind.
    pub fn event(channel: &str, user: &str, kind: EventKind) -> PlatformEvent {
        PlatformEvent {
            platform: Platform::Twitch,
            channel: channel.to_string(),
            user: user.to_string(),
            kind,
            style: None,
        }
    }
}

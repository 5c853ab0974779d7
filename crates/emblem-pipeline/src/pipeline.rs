// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The avatar generation state machine.
//!
//! One run walks six stages in order, each waiting for the previous one:
//!
//! 1. **Resolve**: look up the username's meaning override
//! 2. **Analyze**: chat completion describing the character
//! 3. **SelectTemplate**: explicit style if known, otherwise a random one
//! 4. **ComposeScenario**: chat completion turning the analysis into a scene
//! 5. **GenerateImage**: image provider call
//! 6. **Publish**: re-host the image and build its public URL
//!
//! Retry wraps the whole sequence, not individual stages. A failure in any
//! stage restarts from Resolve, which pays the chat and image throttle slots
//! again and may land on a different template. Per-stage checkpointing
//! would avoid that, at the cost of carrying partial state across attempts.

use std::sync::{Arc, Mutex};

use emblem_config::EmblemConfig;
use emblem_core::{
    ChatCompletion, ChatMessage, EmblemError, GenerationOutcome, GenerationRequest,
    GenerationResult, ImageGenerator, ImageHistoryRecord, ImageHost, ImageOptions, Stage,
    UploadMetadata,
};
use emblem_resilience::{RetryExecutor, RetryPolicy, Throttles};
use emblem_storage::StateStores;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error, info};

use crate::prompts::{analysis_system_prompt, context_message, image_prompt, scenario_request};
use crate::templates::{Template, TemplateCatalog};

/// Per-request knobs taken from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub max_tokens: u32,
    pub image_size: String,
    pub number_of_images: u32,
    pub enable_safety_checker: bool,
    /// Provider-level style, distinct from the template name.
    pub provider_style: Option<String>,
}

impl PipelineSettings {
    pub fn from_config(config: &EmblemConfig) -> Self {
        Self {
            max_tokens: config.openai.max_tokens,
            image_size: config.images.size.clone(),
            number_of_images: config.images.number_of_images,
            enable_safety_checker: config.images.enable_safety_checker,
            provider_style: config.images.default_style.clone(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&EmblemConfig::default())
    }
}

/// What a successful attempt produced, before it is recorded.
#[derive(Debug, Clone)]
struct Published {
    url: String,
    analysis: String,
    revised_prompt: String,
    template: String,
}

/// Runs avatar generations against shared throttles and state.
pub struct GenerationPipeline {
    chat: Arc<dyn ChatCompletion>,
    images: Arc<dyn ImageGenerator>,
    host: Arc<dyn ImageHost>,
    stores: Arc<StateStores>,
    throttles: Throttles,
    retry: RetryExecutor,
    templates: TemplateCatalog,
    settings: PipelineSettings,
    rng: Mutex<StdRng>,
}

impl GenerationPipeline {
    pub fn new(
        chat: Arc<dyn ChatCompletion>,
        images: Arc<dyn ImageGenerator>,
        host: Arc<dyn ImageHost>,
        stores: Arc<StateStores>,
        throttles: Throttles,
    ) -> Self {
        Self {
            chat,
            images,
            host,
            stores,
            throttles,
            retry: RetryExecutor::default(),
            templates: TemplateCatalog::builtin(),
            settings: PipelineSettings::default(),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = RetryExecutor::new(policy);
        self
    }

    pub fn with_settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_templates(mut self, templates: TemplateCatalog) -> Self {
        self.templates = templates;
        self
    }

    /// Replaces the random source used for template selection.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    pub fn templates(&self) -> &TemplateCatalog {
        &self.templates
    }

    pub fn stores(&self) -> &Arc<StateStores> {
        &self.stores
    }

    /// Generates, publishes, and records an avatar for `request.username`.
    ///
    /// Never fails: exhausted retries come back as
    /// [`GenerationResult::Failure`] with the last internal reason, and
    /// nothing is recorded. On success exactly one history record is
    /// appended under the request's channel and user.
    pub async fn run(&self, request: &GenerationRequest) -> GenerationResult {
        self.run_recorded(request).await.0
    }

    /// Like [`run`](Self::run), also returning the user's avatar count right
    /// after this run's record was appended. The count is `None` on failure.
    ///
    /// Concurrent runs for one user each get their own count, so re-reading
    /// history afterwards is not a substitute.
    pub async fn run_recorded(&self, request: &GenerationRequest) -> (GenerationResult, Option<usize>) {
        let channel = &request.metadata.channel;
        let user = &request.username;

        let outcome = self.retry.run("generation", move || self.run_once(request)).await;

        match outcome {
            Ok(published) => {
                let record = ImageHistoryRecord::now(
                    published.url.clone(),
                    published.analysis.clone(),
                    published.revised_prompt.clone(),
                );
                let count = self.stores.history.append(channel, user, record).await;
                info!(
                    channel = %channel,
                    user = %user,
                    template = %published.template,
                    url = %published.url,
                    count,
                    "avatar published"
                );
                let result = GenerationResult::Success {
                    published_url: published.url,
                    analysis: published.analysis,
                    revised_prompt: published.revised_prompt,
                };
                (result, Some(count))
            }
            Err(e) => {
                error!(channel = %channel, user = %user, error = %e, "avatar generation failed");
                let result = GenerationResult::Failure {
                    reason: e.to_string(),
                };
                (result, None)
            }
        }
    }

    async fn run_once(&self, request: &GenerationRequest) -> Result<Published, EmblemError> {
        let username = request.username.as_str();

        // Resolve
        let meaning = self.stores.meanings.lookup(username).await;
        let mut messages = vec![
            ChatMessage::system(analysis_system_prompt(&request.theme)),
            ChatMessage::user(context_message(username, meaning.as_deref())),
        ];
        debug!(user = %username, interpreted = meaning.is_some(), "resolved username");

        // Analyze
        let analysis = self.chat_stage(Stage::Analyze, &messages).await?;

        // SelectTemplate
        let template = self.select_template(request.style.as_deref());
        debug!(user = %username, template = %template.name, "template selected");

        // ComposeScenario
        messages.push(ChatMessage::assistant(analysis.clone()));
        messages.push(ChatMessage::user(scenario_request(template)));
        let scenario = self.chat_stage(Stage::ComposeScenario, &messages).await?;

        // GenerateImage
        let options = self.image_options(template, &scenario);
        let images = &self.images;
        let options_ref = &options;
        let generated = self
            .throttles
            .image
            .schedule(move || images.generate_image(options_ref))
            .await;
        let (source_url, revised_prompt) = match generated {
            GenerationOutcome::Success {
                url, revised_prompt, ..
            } => (url, revised_prompt.unwrap_or_else(|| options.prompt.clone())),
            GenerationOutcome::Failure { message } => {
                return Err(EmblemError::Stage {
                    stage: Stage::GenerateImage,
                    message,
                });
            }
        };

        // Publish
        let metadata = UploadMetadata {
            title: username.to_string(),
            description: analysis.clone(),
        };
        let id = self
            .host
            .upload_from_url(&source_url, &metadata)
            .await
            .map_err(|e| e.in_stage(Stage::Publish))?;
        let url = self.host.public_url(&id);

        Ok(Published {
            url,
            analysis,
            revised_prompt,
            template: template.name.clone(),
        })
    }

    /// One throttled chat completion. Blank content fails the stage.
    async fn chat_stage(&self, stage: Stage, messages: &[ChatMessage]) -> Result<String, EmblemError> {
        let chat = &self.chat;
        let max_tokens = self.settings.max_tokens;
        let text = self
            .throttles
            .chat
            .schedule(move || chat.complete(messages, max_tokens))
            .await
            .map_err(|e| e.in_stage(stage))?;

        let text = text.trim();
        if text.is_empty() {
            return Err(EmblemError::Stage {
                stage,
                message: "chat completion returned no content".to_string(),
            });
        }
        Ok(text.to_string())
    }

    fn select_template(&self, style: Option<&str>) -> &Template {
        if let Some(template) = style.and_then(|s| self.templates.find(s)) {
            return template;
        }
        match self.rng.lock() {
            Ok(mut rng) => self.templates.pick(&mut *rng),
            Err(poisoned) => self.templates.pick(&mut *poisoned.into_inner()),
        }
    }

    fn image_options(&self, template: &Template, scenario: &str) -> ImageOptions {
        ImageOptions {
            prompt: image_prompt(template, scenario),
            size: self.settings.image_size.clone(),
            style: self.settings.provider_style.clone(),
            number_of_images: Some(self.settings.number_of_images),
            enable_safety_checker: Some(self.settings.enable_safety_checker),
        }
    }
}

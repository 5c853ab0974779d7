// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wires configured adapters into a pipeline and dispatcher.

use std::sync::Arc;

use emblem_config::model::EmblemConfig;
use emblem_core::{ChatCompletion, EmblemError, ImageHost, MessageSink, PluginAdapter};
use emblem_dispatch::EventDispatcher;
use emblem_pipeline::{GenerationPipeline, PipelineSettings};
use emblem_providers::{ImgurHost, OpenAiChat, build_image_generator};
use emblem_resilience::{RetryPolicy, Throttles};
use emblem_storage::StateStores;
use tracing::info;

/// Builds every adapter from `config` and returns a dispatcher replying through `sink`.
///
/// Fails on missing credentials or an unreadable data directory; nothing is
/// sent before all adapters are ready.
pub async fn build_dispatcher(
    config: &EmblemConfig,
    sink: Arc<dyn MessageSink>,
) -> Result<Arc<EventDispatcher>, EmblemError> {
    let chat = Arc::new(OpenAiChat::from_config(config)?);
    let images = build_image_generator(config.images.provider, config)?;
    let host = Arc::new(ImgurHost::from_config(config)?);
    let stores = Arc::new(StateStores::open_dir(&config.storage.data_dir).await?);
    let throttles = Throttles::from_config(&config.throttle);

    info!(
        chat = chat.name(),
        images = images.name(),
        host = host.name(),
        sink = sink.name(),
        data_dir = %config.storage.data_dir,
        "adapters initialized"
    );

    let pipeline = GenerationPipeline::new(
        chat as Arc<dyn ChatCompletion>,
        images,
        host as Arc<dyn ImageHost>,
        Arc::clone(&stores),
        throttles.clone(),
    )
    .with_retry(RetryPolicy::from(&config.retry))
    .with_settings(PipelineSettings::from_config(config));

    Ok(Arc::new(EventDispatcher::new(
        Arc::new(pipeline),
        stores,
        sink,
        Arc::clone(&throttles.message),
    )))
}

#[cfg(test)]
mod tests {
    use emblem_test_utils::RecordingSink;
    use tempfile::tempdir;

    use super::*;

    fn config_with(dir: &std::path::Path, openai_key: Option<&str>) -> EmblemConfig {
        let mut config = emblem_config::load_and_validate_str("[imgur]\nclient_id = \"cid\"\n").unwrap();
        config.openai.api_key = openai_key.map(str::to_string);
        config.storage.data_dir = dir.display().to_string();
        config
    }

    #[tokio::test]
    async fn builds_with_credentials_in_config() {
        let dir = tempdir().unwrap();
        let config = config_with(dir.path(), Some("sk-test"));

        let dispatcher = build_dispatcher(&config, Arc::new(RecordingSink::new())).await;
        assert!(dispatcher.is_ok());
    }

    #[tokio::test]
    async fn missing_chat_key_is_a_config_error() {
        if std::env::var("OPENAI_API_KEY").is_ok() {
            return;
        }
        let dir = tempdir().unwrap();
        let config = config_with(dir.path(), None);

        let result = build_dispatcher(&config, Arc::new(RecordingSink::new())).await;
        assert!(matches!(result, Err(EmblemError::Config(_))));
    }
}

// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `emblem serve` command implementation.
//!
//! Reads platform events as JSON lines on stdin, dispatches each one on its
//! own task, and writes replies to stdout. Throttles and retries live inside
//! the dispatcher, so events are spawned as fast as they arrive. Stops
//! reading on end of input or a shutdown signal, then drains in-flight work.

use std::sync::Arc;
use std::time::Duration;

use emblem_config::model::EmblemConfig;
use emblem_core::{EmblemError, MessageSink};
use emblem_dispatch::{DispatchOutcome, EventDispatcher, PlatformEvent};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::app;
use crate::shutdown;
use crate::sink::JsonLineSink;

/// How long in-flight generations may run after input stops.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(300);

/// Counts reported when the serve loop exits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ServeSummary {
    pub dispatched: usize,
    pub malformed: usize,
    pub drained: bool,
}

pub async fn run_serve(config: EmblemConfig) -> Result<(), EmblemError> {
    info!(name = %config.agent.name, provider = %config.images.provider, "starting emblem serve");

    let sink = Arc::new(JsonLineSink::stdout());
    let dispatcher = app::build_dispatcher(&config, sink as Arc<dyn MessageSink>).await?;
    let cancel = shutdown::install_signal_handler();

    let summary = serve_lines(BufReader::new(tokio::io::stdin()), dispatcher, cancel).await?;
    info!(
        dispatched = summary.dispatched,
        malformed = summary.malformed,
        drained = summary.drained,
        "emblem serve stopped"
    );
    Ok(())
}

/// Dispatches every event line from `reader` until input ends or `cancel` fires.
pub async fn serve_lines<R>(
    reader: R,
    dispatcher: Arc<EventDispatcher>,
    cancel: CancellationToken,
) -> Result<ServeSummary, EmblemError>
where
    R: AsyncBufRead + Unpin,
{
    let tracker = TaskTracker::new();
    let mut summary = ServeSummary::default();
    let mut lines = reader.lines();

    loop {
        let line = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("shutdown requested, no longer reading events");
                break;
            }
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("event input closed");
                break;
            }
            Err(e) => {
                shutdown::drain_tasks(&tracker, DRAIN_TIMEOUT).await;
                return Err(EmblemError::Channel {
                    message: "failed to read event input".to_string(),
                    source: Some(Box::new(e)),
                });
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event: PlatformEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "malformed event line skipped");
                summary.malformed += 1;
                continue;
            }
        };

        summary.dispatched += 1;
        let dispatcher = Arc::clone(&dispatcher);
        let span = info_span!("event", id = %Uuid::new_v4(), channel = %event.channel, user = %event.user);
        tracker.spawn(
            async move {
                let outcome = dispatcher.dispatch(&event).await;
                log_outcome(&outcome);
            }
            .instrument(span),
        );
    }

    summary.drained = shutdown::drain_tasks(&tracker, DRAIN_TIMEOUT).await;
    Ok(summary)
}

fn log_outcome(outcome: &DispatchOutcome) {
    match outcome {
        DispatchOutcome::Skipped { reason } => debug!(%reason, "event skipped"),
        DispatchOutcome::Delivered(result) => debug!(success = result.is_success(), "reply delivered"),
        DispatchOutcome::DeliveryFailed(result) => {
            warn!(success = result.is_success(), "reply could not be delivered")
        }
        DispatchOutcome::CommandApplied { .. } => debug!("command applied"),
    }
}

#[cfg(test)]
mod tests {
    use emblem_test_utils::PipelineHarness;

    use super::*;

    const EVENTS: &str = r#"
{"platform": "twitch", "channel": "shroud", "user": "fox", "kind": "subscription"}
not json at all
{"platform": "twitch", "channel": "shroud", "user": "owl", "kind": "resubscription", "months": 3}

{"platform": "discord", "channel": "shroud", "user": "mod1", "kind": "command", "text": "!theme space pirates"}
"#;

    #[tokio::test]
    async fn dispatches_every_well_formed_line() {
        let harness = PipelineHarness::new().await.unwrap();

        let summary = serve_lines(
            EVENTS.as_bytes(),
            Arc::clone(&harness.dispatcher),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(summary.dispatched, 3);
        assert_eq!(summary.malformed, 1);
        assert!(summary.drained);
        assert_eq!(harness.sink.sent().await.len(), 3);
        assert_eq!(harness.stores.history.count("shroud", "fox").await, 1);
        assert_eq!(harness.stores.history.count("shroud", "owl").await, 1);
    }

    #[tokio::test]
    async fn cancelled_token_stops_reading() {
        let harness = PipelineHarness::new().await.unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let summary = serve_lines(EVENTS.as_bytes(), Arc::clone(&harness.dispatcher), cancel)
            .await
            .unwrap();

        assert_eq!(summary.dispatched, 0);
        assert!(harness.sink.sent().await.is_empty());
    }
}

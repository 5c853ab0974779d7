// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routes platform events to the generation pipeline and delivers the replies.
//!
//! The dispatcher owns every user-visible decision: it checks the ignore and
//! banned-gifter lists before generation, resolves the channel theme, and
//! sends exactly one message per event that reaches the pipeline. Failure
//! replies never include internal error text.

use std::sync::Arc;

use emblem_core::{
    DeliveryTarget, EmblemError, EventMetadata, GenerationRequest, GenerationResult, MessageSink,
    TriggerKind,
};
use emblem_pipeline::GenerationPipeline;
use emblem_resilience::ThrottledQueue;
use emblem_storage::StateStores;
use strum::Display;
use tracing::{debug, info, warn};

use crate::commands::AdminCommand;
use crate::events::{EventKind, PlatformEvent};

/// Why an event produced no generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    /// The user opted out.
    Ignored,
    /// A gift subscription from a gifter banned in this channel.
    BannedGifter,
    /// A command event whose text is not a known command.
    UnknownCommand,
}

/// What happened to one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Skipped { reason: SkipReason },
    /// The pipeline ran and its reply was sent.
    Delivered(GenerationResult),
    /// The pipeline ran but the reply could not be sent.
    DeliveryFailed(GenerationResult),
    /// An admin command changed state; `reply` is what was sent back.
    CommandApplied { reply: String },
}

/// Chat line announcing a new avatar.
pub fn success_message(user: &str, count: usize, url: &str) -> String {
    format!("@{user} here is your avatar #{count}: {url}")
}

/// Chat line for a generation that ran out of retries.
pub fn failure_message(user: &str) -> String {
    format!("Sorry @{user}, I couldn't create your avatar this time. Please try again later!")
}

pub struct EventDispatcher {
    pipeline: Arc<GenerationPipeline>,
    stores: Arc<StateStores>,
    sink: Arc<dyn MessageSink>,
    messages: Arc<ThrottledQueue>,
}

impl EventDispatcher {
    /// `messages` is the shared outbound-message throttle.
    pub fn new(
        pipeline: Arc<GenerationPipeline>,
        stores: Arc<StateStores>,
        sink: Arc<dyn MessageSink>,
        messages: Arc<ThrottledQueue>,
    ) -> Self {
        Self {
            pipeline,
            stores,
            sink,
            messages,
        }
    }

    /// Handles one event from start to delivered reply.
    pub async fn dispatch(&self, event: &PlatformEvent) -> DispatchOutcome {
        debug!(
            platform = %event.platform,
            channel = %event.channel,
            user = %event.user,
            trigger = %event.kind.trigger(),
            "event received"
        );

        match &event.kind {
            EventKind::Command { text } => match AdminCommand::parse(text) {
                Some(command) => self.handle_command(&event.target(), &event.user, command).await,
                None => DispatchOutcome::Skipped {
                    reason: SkipReason::UnknownCommand,
                },
            },
            EventKind::GiftSubscription { gifter } => {
                if self.stores.banned_gifters.is_banned(&event.channel, gifter).await {
                    info!(channel = %event.channel, gifter = %gifter, "gift from banned gifter skipped");
                    return DispatchOutcome::Skipped {
                        reason: SkipReason::BannedGifter,
                    };
                }
                self.generate(&event.target(), &event.user, event.style.clone(), event.metadata())
                    .await
            }
            _ => {
                self.generate(&event.target(), &event.user, event.style.clone(), event.metadata())
                    .await
            }
        }
    }

    /// Applies an admin command issued by `issuer` and replies in the channel.
    pub async fn handle_command(
        &self,
        target: &DeliveryTarget,
        issuer: &str,
        command: AdminCommand,
    ) -> DispatchOutcome {
        let channel = target.channel.as_str();
        let stores = &self.stores;

        let reply = match command {
            AdminCommand::Avatar { user, style } => {
                let metadata = EventMetadata {
                    platform: target.platform,
                    channel: channel.to_string(),
                    triggered_by: issuer.to_string(),
                    trigger: TriggerKind::Command,
                };
                return self.generate(target, &user, style, metadata).await;
            }
            AdminCommand::SetTheme(theme) => {
                stores.themes.set(channel, &theme).await;
                format!("Theme for {channel} set to: {}", theme.trim())
            }
            AdminCommand::ClearTheme => {
                if stores.themes.remove(channel).await {
                    format!("Theme for {channel} cleared.")
                } else {
                    format!("{channel} has no theme set.")
                }
            }
            AdminCommand::SetMeaning { user, meaning } => {
                stores.meanings.set(&user, &meaning).await;
                format!("Got it, {user} now means: {}", meaning.trim())
            }
            AdminCommand::ClearMeaning { user } => {
                if stores.meanings.remove(&user).await {
                    format!("{user} will be read literally again.")
                } else {
                    format!("{user} had no meaning set.")
                }
            }
            AdminCommand::Ignore(user) => {
                stores.ignores.add(&user).await;
                format!("{user} will not receive avatars.")
            }
            AdminCommand::Unignore(user) => {
                stores.ignores.remove(&user).await;
                format!("{user} will receive avatars again.")
            }
            AdminCommand::BanGifter(user) => {
                stores.banned_gifters.ban(channel, &user).await;
                format!("Gifts from {user} will no longer earn avatars in {channel}.")
            }
            AdminCommand::UnbanGifter(user) => {
                stores.banned_gifters.unban(channel, &user).await;
                format!("Gifts from {user} earn avatars in {channel} again.")
            }
        };

        info!(channel = %channel, issuer = %issuer, reply = %reply, "admin command applied");
        if let Err(e) = self.deliver(target, &reply).await {
            warn!(channel = %channel, error = %e, "failed to send command reply");
        }
        DispatchOutcome::CommandApplied { reply }
    }

    async fn generate(
        &self,
        target: &DeliveryTarget,
        user: &str,
        style: Option<String>,
        metadata: EventMetadata,
    ) -> DispatchOutcome {
        if self.stores.ignores.is_ignored(user).await {
            info!(channel = %target.channel, user = %user, "ignored user skipped");
            return DispatchOutcome::Skipped {
                reason: SkipReason::Ignored,
            };
        }

        let request = GenerationRequest {
            username: user.to_string(),
            theme: self.stores.themes.get(&target.channel).await,
            style,
            metadata,
        };
        let (result, count) = self.pipeline.run_recorded(&request).await;

        let text = match (&result, count) {
            (GenerationResult::Success { published_url, .. }, Some(count)) => {
                success_message(user, count, published_url)
            }
            _ => failure_message(user),
        };

        match self.deliver(target, &text).await {
            Ok(()) => DispatchOutcome::Delivered(result),
            Err(e) => {
                warn!(channel = %target.channel, user = %user, error = %e, "failed to deliver reply");
                DispatchOutcome::DeliveryFailed(result)
            }
        }
    }

    async fn deliver(&self, target: &DeliveryTarget, text: &str) -> Result<(), EmblemError> {
        let sink = &self.sink;
        self.messages
            .schedule(move || sink.send(target, text))
            .await
    }
}

// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform events as they arrive from a chat connection.
//!
//! Events deserialize from flat JSON objects, one per line on the `serve`
//! input:
//!
//! ```json
//! {"platform": "twitch", "channel": "shroud", "user": "NightOwl", "kind": "subscription"}
//! {"platform": "twitch", "channel": "shroud", "user": "fox", "kind": "gift_subscription", "gifter": "santa"}
//! {"platform": "discord", "channel": "shroud", "user": "mod1", "kind": "command", "text": "!theme space pirates"}
//! ```

use emblem_core::{DeliveryTarget, EventMetadata, Platform, TriggerKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformEvent {
    pub platform: Platform,
    /// The broadcaster whose channel the event happened in.
    pub channel: String,
    /// The user the event is about. For gifts this is the recipient.
    pub user: String,
    #[serde(flatten)]
    pub kind: EventKind,
    /// Optional template name, e.g. from a channel-point redemption input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    Subscription,
    Resubscription {
        #[serde(default)]
        months: u32,
    },
    GiftSubscription {
        gifter: String,
    },
    Redemption,
    /// A chat command; `user` is whoever typed it.
    Command {
        text: String,
    },
}

impl EventKind {
    pub fn trigger(&self) -> TriggerKind {
        match self {
            EventKind::Subscription => TriggerKind::Subscription,
            EventKind::Resubscription { .. } => TriggerKind::Resubscription,
            EventKind::GiftSubscription { .. } => TriggerKind::GiftSubscription,
            EventKind::Redemption => TriggerKind::Redemption,
            EventKind::Command { .. } => TriggerKind::Command,
        }
    }
}

impl PlatformEvent {
    /// Where replies to this event go.
    pub fn target(&self) -> DeliveryTarget {
        DeliveryTarget {
            platform: self.platform,
            channel: self.channel.clone(),
        }
    }

    /// Metadata for a generation triggered by this event.
    pub fn metadata(&self) -> EventMetadata {
        let triggered_by = match &self.kind {
            EventKind::GiftSubscription { gifter } => gifter.clone(),
            _ => self.user.clone(),
        };
        EventMetadata {
            platform: self.platform,
            channel: self.channel.clone(),
            triggered_by,
            trigger: self.kind.trigger(),
        }
    }
}

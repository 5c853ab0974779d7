// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event handling for Emblem: platform events in, chat replies out.

pub mod commands;
pub mod dispatcher;
pub mod events;

pub use commands::AdminCommand;
pub use dispatcher::{DispatchOutcome, EventDispatcher, SkipReason, failure_message, success_message};
pub use events::{EventKind, PlatformEvent};

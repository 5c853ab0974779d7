// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduling primitives for calls to external services.
//!
//! - [`ThrottledQueue`]: FIFO admission with at most N starts per rolling window
//! - [`RetryExecutor`]: bounded-attempt retry that surfaces the last error

pub mod retry;
pub mod throttle;

pub use retry::{RetryExecutor, RetryPolicy};
pub use throttle::{ThrottledQueue, Throttles};

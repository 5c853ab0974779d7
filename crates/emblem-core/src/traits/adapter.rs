// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that all adapters implement.

use crate::types::AdapterType;

/// The base trait for all Emblem adapters.
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the type of adapter.
    fn adapter_type(&self) -> AdapterType;
}

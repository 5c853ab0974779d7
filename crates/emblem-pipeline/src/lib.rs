// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Avatar generation for Emblem.
//!
//! [`GenerationPipeline`] turns a [`GenerationRequest`](emblem_core::GenerationRequest)
//! into a [`GenerationResult`](emblem_core::GenerationResult). It never sends
//! chat messages and never consults the ignore list; both are the caller's job.

pub mod pipeline;
pub mod prompts;
pub mod templates;

pub use pipeline::{GenerationPipeline, PipelineSettings};
pub use templates::{Template, TemplateCatalog};

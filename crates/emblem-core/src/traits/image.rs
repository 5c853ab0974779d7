// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Uniform capability over the image-generation backends.

use async_trait::async_trait;

use crate::traits::adapter::PluginAdapter;
use crate::types::{GenerationOutcome, ImageOptions, ImageProvider};

/// An image-generation backend.
///
/// `generate_image` is infallible at the type level: quota, moderation, and
/// network failures are reported as [`GenerationOutcome::Failure`]. Missing
/// configuration is rejected when the generator is constructed.
#[async_trait]
pub trait ImageGenerator: PluginAdapter {
    /// The provider tag this generator was built for.
    fn provider(&self) -> ImageProvider;

    /// Generates an image for the given options.
    async fn generate_image(&self, options: &ImageOptions) -> GenerationOutcome;
}

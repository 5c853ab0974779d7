// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable image hosting used by the publish stage.

use async_trait::async_trait;

use crate::error::EmblemError;
use crate::traits::adapter::PluginAdapter;
use crate::types::UploadMetadata;

/// Relocates provider-hosted images to durable hosting.
#[async_trait]
pub trait ImageHost: PluginAdapter {
    /// Uploads the image at `source_url` and returns the hosted image id.
    async fn upload_from_url(
        &self,
        source_url: &str,
        metadata: &UploadMetadata,
    ) -> Result<String, EmblemError>;

    /// Builds the public URL for a hosted image id.
    fn public_url(&self, id: &str) -> String;
}

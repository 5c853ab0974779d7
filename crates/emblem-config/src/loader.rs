// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./emblem.toml` > `~/.config/emblem/emblem.toml` > `/etc/emblem/emblem.toml`
//! with environment variable overrides via `EMBLEM_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::EmblemConfig;

/// Config sections that environment variables may address.
const ENV_SECTIONS: &[&str] = &[
    "agent",
    "storage",
    "openai",
    "fal",
    "replicate",
    "imgur",
    "images",
    "throttle",
    "retry",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/emblem/emblem.toml` (system-wide)
/// 3. `~/.config/emblem/emblem.toml` (user XDG config)
/// 4. `./emblem.toml` (local directory)
/// 5. `EMBLEM_*` environment variables
pub fn load_config() -> Result<EmblemConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<EmblemConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(EmblemConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<EmblemConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(EmblemConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(EmblemConfig::default()))
        .merge(Toml::file("/etc/emblem/emblem.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("emblem/emblem.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("emblem.toml"))
        .merge(env_provider())
}

/// Maps `EMBLEM_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `EMBLEM_OPENAI_API_KEY` maps to `openai.api_key`, not `openai.api.key`.
fn env_provider() -> Env {
    Env::prefixed("EMBLEM_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_first_underscore_only() {
        assert_eq!(map_env_key("openai_api_key"), "openai.api_key");
        assert_eq!(map_env_key("throttle_image_window_ms"), "throttle.image_window_ms");
        assert_eq!(map_env_key("imgur_client_id"), "imgur.client_id");
        assert_eq!(map_env_key("unknown_key"), "unknown_key");
    }

    #[test]
    fn env_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[images]\nprovider = \"fal\"\n")?;
            jail.set_env("EMBLEM_IMAGES_SIZE", "1792x1024");
            jail.set_env("EMBLEM_RETRY_MAX_RETRIES", "5");

            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.images.provider, emblem_core::ImageProvider::Fal);
            assert_eq!(config.images.size, "1792x1024");
            assert_eq!(config.retry.max_retries, 5);
            Ok(())
        });
    }
}

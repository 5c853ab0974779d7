// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-zero throttle limits and well-formed image sizes.

use emblem_core::parse_size;

use crate::diagnostic::ConfigError;
use crate::model::EmblemConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &EmblemConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.data_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.data_dir must not be empty".to_string(),
        });
    }

    let throttle = &config.throttle;
    let limits = [
        ("throttle.chat_limit", throttle.chat_limit),
        ("throttle.image_limit", throttle.image_limit),
        ("throttle.message_limit", throttle.message_limit),
    ];
    for (key, limit) in limits {
        if limit == 0 {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be at least 1"),
            });
        }
    }

    let windows = [
        ("throttle.chat_window_ms", throttle.chat_window_ms),
        ("throttle.image_window_ms", throttle.image_window_ms),
        ("throttle.message_window_ms", throttle.message_window_ms),
    ];
    for (key, window) in windows {
        if window == 0 {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be greater than zero"),
            });
        }
    }

    if parse_size(&config.images.size).is_none() {
        errors.push(ConfigError::Validation {
            message: format!(
                "images.size `{}` must look like WIDTHxHEIGHT, e.g. 1024x1024",
                config.images.size
            ),
        });
    }

    if config.images.number_of_images == 0 {
        errors.push(ConfigError::Validation {
            message: "images.number_of_images must be at least 1".to_string(),
        });
    }

    if !config.imgur.public_url_template.contains("{id}") {
        errors.push(ConfigError::Validation {
            message: "imgur.public_url_template must contain the `{id}` placeholder".to_string(),
        });
    }

    if config.openai.max_tokens == 0 {
        errors.push(ConfigError::Validation {
            message: "openai.max_tokens must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

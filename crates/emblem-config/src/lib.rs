// SPDX-FileCopyrightText: 2026 Emblem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for Emblem.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, `EMBLEM_*` environment variable overrides, and
//! miette diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use emblem_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("image provider: {}", config.images.provider);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::EmblemConfig;

/// Load configuration from the XDG hierarchy and validate it.
pub fn load_and_validate() -> Result<EmblemConfig, Vec<ConfigError>> {
    finish(loader::load_config(), collect_toml_sources)
}

/// Load configuration from a specific file and validate it.
pub fn load_and_validate_path(path: &std::path::Path) -> Result<EmblemConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        std::fs::read_to_string(path)
            .map(|content| vec![(path.display().to_string(), content)])
            .unwrap_or_default()
    })
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<EmblemConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

fn finish(
    loaded: Result<EmblemConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<EmblemConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut candidates = vec![std::path::PathBuf::from("/etc/emblem/emblem.toml")];
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("emblem/emblem.toml"));
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("emblem.toml"));
    }

    candidates
        .into_iter()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}

// SPDX-FileCopyrightText: 2026 Hookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `/etc/hookline/hookline.toml`, then
//! `~/.config/hookline/hookline.toml`, then `./hookline.toml`, with
//! `HOOKLINE_*` environment variables on top.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::HooklineConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/hookline/hookline.toml";
pub(crate) const LOCAL_CONFIG: &str = "hookline.toml";

/// Sections that environment variables may address.
const ENV_SECTIONS: &[&str] = &["app", "storage", "transport", "gateway"];

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("hookline").join("hookline.toml"))
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<HooklineConfig, figment::Error> {
    tracing::debug!(system = SYSTEM_CONFIG, local = LOCAL_CONFIG, "loading configuration");
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<HooklineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HooklineConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<HooklineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HooklineConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment used by [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(HooklineConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Maps `HOOKLINE_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Uses `Env::map()` rather than `Env::split("_")` so keys containing
/// underscores (`request_timeout_secs`) stay intact.
fn env_provider() -> Env {
    Env::prefixed("HOOKLINE_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

//! Configuration loading for the Nook services
//!
//! Resolution priority for every setting:
//! 1. Environment variable (highest priority)
//! 2. TOML config file (`~/.config/nook/config.toml`, then `/etc/nook/config.toml`)
//! 3. Compiled default

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Default listen port for the room generation service.
pub const DEFAULT_PORT: u16 = 8787;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_PROFILE_MODEL: &str = "gpt-4o";
const DEFAULT_QUESTION_MODEL: &str = "gpt-4o";
const DEFAULT_IMAGE_MODEL: &str = "gpt-image-1";

/// Settings for the text/image generation backend.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub api_base: String,
    /// Chat model used for personality inference.
    pub profile_model: String,
    /// Chat model used for daily question generation.
    pub question_model: String,
    /// Image model used for generation, edits and stylization.
    pub image_model: String,
}

/// Resolved service configuration.
#[derive(Debug, Clone)]
pub struct NookConfig {
    pub port: u16,
    pub openai: OpenAiConfig,
}

/// Optional settings read from the TOML config file.
#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    port: Option<u16>,
    openai_api_key: Option<String>,
    openai_api_base: Option<String>,
    profile_model: Option<String>,
    question_model: Option<String>,
    image_model: Option<String>,
}

/// Load configuration with ENV -> TOML -> default priority.
pub fn load_config() -> Result<NookConfig> {
    let file = load_toml_config()?;

    let port = match resolve("NOOK_PORT", file.port.map(|p| p.to_string())) {
        Some(raw) => raw
            .parse::<u16>()
            .map_err(|_| Error::Config(format!("invalid port value: {raw}")))?,
        None => DEFAULT_PORT,
    };

    let api_key = resolve("OPENAI_API_KEY", file.openai_api_key).unwrap_or_default();
    if api_key.is_empty() {
        warn!("OPENAI_API_KEY is not configured; backend calls will be rejected upstream");
    }

    let api_base = resolve("OPENAI_API_BASE", file.openai_api_base)
        .map(|base| base.trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

    let profile_model = resolve("OPENAI_PROFILE_MODEL", file.profile_model)
        .unwrap_or_else(|| DEFAULT_PROFILE_MODEL.to_string());
    let question_model = resolve("OPENAI_QUESTION_MODEL", file.question_model)
        .unwrap_or_else(|| DEFAULT_QUESTION_MODEL.to_string());
    // The image model may arrive with a legacy "openai:" prefix; strip it.
    let image_model = resolve("IMAGE_MODEL", file.image_model)
        .map(|m| normalize_image_model(&m))
        .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string());

    Ok(NookConfig {
        port,
        openai: OpenAiConfig {
            api_key,
            api_base,
            profile_model,
            question_model,
            image_model,
        },
    })
}

/// Strip the legacy `openai:` scheme prefix from a model identifier.
pub fn normalize_image_model(model: &str) -> String {
    model
        .trim()
        .strip_prefix("openai:")
        .unwrap_or(model.trim())
        .trim()
        .to_string()
}

fn resolve(env_var: &str, file_value: Option<String>) -> Option<String> {
    if let Ok(value) = std::env::var(env_var) {
        let value = value.trim().to_string();
        if !value.is_empty() {
            return Some(value);
        }
    }
    file_value.filter(|v| !v.trim().is_empty())
}

fn load_toml_config() -> Result<TomlConfig> {
    let Some(path) = config_file_path() else {
        return Ok(TomlConfig::default());
    };
    let content = std::fs::read_to_string(&path)?;
    let config = toml::from_str::<TomlConfig>(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// First existing config file, user config dir before the system path.
fn config_file_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("nook").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }
    let system_config = PathBuf::from("/etc/nook/config.toml");
    if system_config.exists() {
        return Some(system_config);
    }
    None
}

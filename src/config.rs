//! Process configuration, read from the environment after `.env` has been loaded.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_VISION_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` is allowed here; the gateway reports it on first use.
    pub api_key: Option<String>,
    pub bind: SocketAddr,
    pub users_file: PathBuf,
    pub static_dir: PathBuf,
    pub api_base: String,
    pub text_model: String,
    pub vision_model: String,
    pub max_upload_bytes: usize,
    pub log_json: bool,
    /// Addresses listed on the Contact Us screen.
    pub contact_emails: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            users_file: PathBuf::from("users.json"),
            static_dir: PathBuf::from("static"),
            api_base: DEFAULT_API_BASE.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_json: false,
            contact_emails: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut cfg = Config::default();

        cfg.api_key = get("GOOGLE_API_KEY").or_else(|| get("GEMINI_API_KEY"));

        if let Some(v) = get("NUTRIGEN_BIND") {
            cfg.bind = v.parse().map_err(|_| ConfigError::Invalid {
                key: "NUTRIGEN_BIND",
                value: v.clone(),
            })?;
        }
        if let Some(v) = get("NUTRIGEN_USERS_FILE") {
            cfg.users_file = PathBuf::from(v);
        }
        if let Some(v) = get("NUTRIGEN_STATIC_DIR") {
            cfg.static_dir = PathBuf::from(v);
        }
        if let Some(v) = get("NUTRIGEN_API_BASE") {
            cfg.api_base = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = get("NUTRIGEN_TEXT_MODEL") {
            cfg.text_model = v;
        }
        if let Some(v) = get("NUTRIGEN_VISION_MODEL") {
            cfg.vision_model = v;
        }
        if let Some(v) = get("NUTRIGEN_MAX_UPLOAD_BYTES") {
            cfg.max_upload_bytes = v.parse().map_err(|_| ConfigError::Invalid {
                key: "NUTRIGEN_MAX_UPLOAD_BYTES",
                value: v.clone(),
            })?;
        }
        if let Some(v) = get("NUTRIGEN_LOG_JSON") {
            cfg.log_json = parse_bool(&v).ok_or(ConfigError::Invalid {
                key: "NUTRIGEN_LOG_JSON",
                value: v,
            })?;
        }
        if let Some(v) = get("NUTRIGEN_CONTACT_EMAILS") {
            cfg.contact_emails = v
                .split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(cfg)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

//! Process configuration, read once from the environment.

use di::{inject, injectable};
use std::env;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Upstream model credential. `None` keeps the assistant endpoints in
    /// their "service unavailable" state.
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    pub database_url: Option<String>,
    pub bind_address: String,
    pub static_dir: String,
    pub cors_origins: Vec<String>,
}

#[injectable]
impl Settings {
    #[inject]
    pub fn create() -> Settings {
        dotenvy::dotenv().ok();
        Self::from_env()
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        Settings {
            api_key: get("GEMINI_API_KEY").or_else(|| get("API_KEY")),
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            api_base_url: get("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned())
                .trim_end_matches('/')
                .to_owned(),
            database_url: get("DATABASE_URL"),
            bind_address: get("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_owned()),
            static_dir: get("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_owned()),
            cors_origins: get("CORS_ORIGINS")
                .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_owned())
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

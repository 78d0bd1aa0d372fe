use std::env;
use std::path::PathBuf;

use crate::food::messages::Locale;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_DB_PATH: &str = "data/fitchef.db";
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_MAX_CONCURRENT_ANALYSES: usize = 8;

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
}

impl ProviderConfig {
    pub fn from_env() -> Self {
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let api_url = env::var("OPENAI_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Self {
            api_key,
            api_url,
            model,
        }
    }
}

#[derive(Debug, Clone)]
pub enum StoreConfig {
    Supabase { url: String, anon_key: String },
    Sqlite { path: PathBuf },
}

impl StoreConfig {
    pub fn from_env() -> Self {
        match (env::var("SUPABASE_URL"), env::var("SUPABASE_ANON_KEY")) {
            (Ok(url), Ok(anon_key)) if !url.trim().is_empty() && !anon_key.trim().is_empty() => {
                StoreConfig::Supabase {
                    url: url.trim_end_matches('/').to_string(),
                    anon_key,
                }
            }
            _ => StoreConfig::Sqlite {
                path: env::var("FITCHEF_DB_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(DEFAULT_DB_PATH)),
            },
        }
    }
}

/// Everything the server needs, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    pub store: StoreConfig,
    pub locale: Locale,
    pub max_image_bytes: usize,
    pub max_concurrent_analyses: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let locale = env::var("FITCHEF_LOCALE")
            .ok()
            .and_then(|tag| Locale::from_tag(&tag))
            .unwrap_or_default();

        Self {
            provider: ProviderConfig::from_env(),
            store: StoreConfig::from_env(),
            locale,
            max_image_bytes: parse_env("FITCHEF_MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES),
            max_concurrent_analyses: parse_env(
                "FITCHEF_MAX_CONCURRENT_ANALYSES",
                DEFAULT_MAX_CONCURRENT_ANALYSES,
            ),
        }
    }

    /// Largest request body accepted by the API: a handful of images,
    /// base64-inflated, plus JSON framing.
    pub fn body_limit(&self) -> usize {
        self.max_image_bytes.saturating_mul(8)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig {
                api_key: None,
                api_url: DEFAULT_API_URL.to_string(),
                model: DEFAULT_MODEL.to_string(),
            },
            store: StoreConfig::Sqlite {
                path: PathBuf::from(DEFAULT_DB_PATH),
            },
            locale: Locale::default(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            max_concurrent_analyses: DEFAULT_MAX_CONCURRENT_ANALYSES,
        }
    }
}

fn parse_env(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.provider.model, "gpt-4o");
        assert_eq!(config.max_image_bytes, 10 * 1024 * 1024);
        assert_eq!(config.locale, Locale::PtBr);
        assert!(config.body_limit() > config.max_image_bytes);
    }

    #[test]
    fn test_parse_env_falls_back_on_garbage() {
        env::set_var("FITCHEF_TEST_GARBAGE_LIMIT", "lots");
        assert_eq!(parse_env("FITCHEF_TEST_GARBAGE_LIMIT", 7), 7);
        env::set_var("FITCHEF_TEST_GARBAGE_LIMIT", "0");
        assert_eq!(parse_env("FITCHEF_TEST_GARBAGE_LIMIT", 7), 7);
        env::set_var("FITCHEF_TEST_GARBAGE_LIMIT", " 12 ");
        assert_eq!(parse_env("FITCHEF_TEST_GARBAGE_LIMIT", 7), 12);
        env::remove_var("FITCHEF_TEST_GARBAGE_LIMIT");
    }
}

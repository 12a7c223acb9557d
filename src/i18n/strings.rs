//! Built-in localized strings that do not come from the page translation table.
//!
//! The hero typing phrase lives here rather than in the translation file:
//! the typing widget is rebuilt from this fixed table on every language
//! switch, independently of the `data-i18n` bindings.

/// Localized strings compiled into the controller for one language.
#[derive(Debug, Clone)]
pub struct LanguageStrings {
    /// Phrase typed out by the hero text effect
    pub hero_phrase: &'static str,
}

impl LanguageStrings {
    /// Strings for a language code, or `None` for unsupported codes.
    pub fn for_code(code: &str) -> Option<&'static LanguageStrings> {
        match code {
            "en" => Some(&ENGLISH_STRINGS),
            "zh" => Some(&CHINESE_STRINGS),
            _ => None,
        }
    }
}

/// Notification shown after a language switch.
/// Placeholders: {language}
pub const LANGUAGE_SWITCHED_NOTICE: &str = "Language switched to {language}";

/// Submit button label while the contact form is being "sent"
pub const CONTACT_SENDING_LABEL: &str = "Sending...";

/// Notification shown once the contact form completes
pub const CONTACT_THANKS_NOTICE: &str = "Thank you for your inquiry. We will contact you soon.";

// ==================== English Strings ====================

pub const ENGLISH_STRINGS: LanguageStrings = LanguageStrings {
    hero_phrase: "New Engine for Maritime Finance, New Journey for Value Growth",
};

// ==================== Chinese Strings ====================

pub const CHINESE_STRINGS: LanguageStrings = LanguageStrings {
    hero_phrase: "海运金融新引擎，价值增长新航程",
};

//! Language switching.
//!
//! [`LanguageSwitchController::apply`] brings every language-dependent part
//! of the page into line with one language code: selector controls, the
//! stored preference, the document `lang`, every `data-i18n` binding, the
//! hero typing effect and a confirmation notice. Each step is best-effort;
//! missing data or missing libraries skip that step only.

use crate::dom::ElementId;
use crate::i18n::{
    KeyPath, Language, LanguageRegistry, LanguageStrings, TranslationMetrics, TranslationTable,
    BINDING_ATTRIBUTE, LANGUAGE_SWITCHED_NOTICE,
};
use crate::markup::Injection;
use crate::preference::PreferenceStore;
use crate::text_effect::TextEffectSlot;
use crate::ui::{NotificationKind, Ui};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

/// Class marking language selector controls
pub const LANGUAGE_CONTROL_CLASS: &str = "language-btn";

/// Attribute naming the language a selector control switches to
pub const LANGUAGE_CONTROL_ATTRIBUTE: &str = "data-lang";

/// Element id of the hero title that hosts the typing effect
pub const HERO_TITLE_ID: &str = "hero-title";

const ACTIVE_CLASS: &str = "active";
const ACTIVE_BACKGROUND: &str = "bg-amber-100";
const HOVER_BACKGROUND: &str = "hover:bg-amber-100";

/// Outcome of one `apply` call.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    pub code: String,
    /// Whether the code is a supported language
    pub supported: bool,
    /// Number of selector controls now marked active
    pub active_controls: usize,
    pub translated_plain: usize,
    pub translated_rich: usize,
    /// Bound keys left untouched because they did not resolve
    pub unresolved: Vec<String>,
    pub text_effect_rebuilt: bool,
    pub notification: Option<ElementId>,
    pub applied_at: DateTime<Utc>,
}

/// Owner of all language-dependent state: translations, the stored
/// preference and the live text effect.
pub struct LanguageSwitchController {
    translations: Option<TranslationTable>,
    preferences: PreferenceStore,
    text_effect: TextEffectSlot,
    metrics: TranslationMetrics,
}

impl LanguageSwitchController {
    /// `translations` is `None` when the translation source is not loaded.
    pub fn new(
        translations: Option<TranslationTable>,
        preferences: PreferenceStore,
        text_effect: TextEffectSlot,
    ) -> Self {
        Self {
            translations,
            preferences,
            text_effect,
            metrics: TranslationMetrics::new(),
        }
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    pub fn text_effect(&self) -> &TextEffectSlot {
        &self.text_effect
    }

    pub fn metrics(&self) -> &TranslationMetrics {
        &self.metrics
    }

    pub fn translations(&self) -> Option<&TranslationTable> {
        self.translations.as_ref()
    }

    /// Start the hero typing effect in the stored language, if the hero
    /// title exists and the typing library is available.
    pub fn start_text_effect(&mut self, ui: &mut Ui) -> bool {
        let Some(hero) = ui.page.by_id(HERO_TITLE_ID) else {
            debug!("No #{} on page, skipping text effect", HERO_TITLE_ID);
            return false;
        };
        if !self.text_effect.is_available() {
            return false;
        }

        let language = self.preferences.read();
        let Some(strings) = LanguageStrings::for_code(language.code()) else {
            return false;
        };

        let started = self
            .text_effect
            .replace(hero, strings.hero_phrase, ui.timers.now());
        self.render_text_effect(ui);
        started
    }

    /// Apply a language to the whole page.
    ///
    /// The code is not validated: an unsupported code marks no control
    /// active, resolves no translations and leaves bound elements as they were.
    pub fn apply(&mut self, ui: &mut Ui, code: &str) -> ApplyReport {
        info!("Applying language '{}'", code);
        self.metrics.record_switch();

        let supported = LanguageRegistry::get().is_enabled(code);
        let active_controls = update_controls(ui, code);

        self.preferences.write(code);
        ui.page.set_lang(code);

        let mut report = ApplyReport {
            code: code.to_string(),
            supported,
            active_controls,
            translated_plain: 0,
            translated_rich: 0,
            unresolved: Vec::new(),
            text_effect_rebuilt: false,
            notification: None,
            applied_at: Utc::now(),
        };

        self.apply_translations(ui, code, &mut report);
        report.text_effect_rebuilt = self.rebuild_text_effect(ui, code);

        let language_name = Language::from_code(code)
            .map(|lang| lang.native_name())
            .unwrap_or(code);
        let message = LANGUAGE_SWITCHED_NOTICE.replace("{language}", language_name);
        report.notification = Some(ui.notify(&message, NotificationKind::Info));

        report
    }

    fn apply_translations(&mut self, ui: &mut Ui, code: &str, report: &mut ApplyReport) {
        let Some(tree) = self.translations.as_ref().and_then(|t| t.for_code(code)) else {
            debug!("No translations loaded for '{}', leaving bindings as-is", code);
            return;
        };

        let bindings: Vec<(ElementId, String)> = ui
            .page
            .with_attr(BINDING_ATTRIBUTE)
            .into_iter()
            .filter_map(|id| {
                let key = ui.page.get(id)?.attr(BINDING_ATTRIBUTE)?;
                Some((id, key.to_string()))
            })
            .collect();

        for (id, key) in bindings {
            let Some(text) = tree.resolve(&KeyPath::parse(&key)) else {
                debug!("Key '{}' unresolved in '{}'", key, code);
                self.metrics.record_miss();
                report.unresolved.push(key);
                continue;
            };

            match Injection::classify(text) {
                Injection::Markup => {
                    ui.page.set_html(id, text);
                    self.metrics.record_hit(true);
                    report.translated_rich += 1;
                }
                Injection::PlainText => {
                    ui.page.set_text(id, text);
                    self.metrics.record_hit(false);
                    report.translated_plain += 1;
                }
            }
        }
    }

    /// Rebuild the typing effect for the new language. Only a live effect is
    /// rebuilt, and only when a phrase exists for `code`.
    fn rebuild_text_effect(&mut self, ui: &mut Ui, code: &str) -> bool {
        let Some(target) = self.text_effect.target() else {
            return false;
        };
        let Some(strings) = LanguageStrings::for_code(code) else {
            debug!("No hero phrase for '{}', keeping current text effect", code);
            return false;
        };

        let rebuilt = self
            .text_effect
            .replace(target, strings.hero_phrase, ui.timers.now());
        self.render_text_effect(ui);
        rebuilt
    }

    /// Draw the current typing frame into its element.
    pub fn render_text_effect(&self, ui: &mut Ui) {
        if let Some((target, frame)) = self.text_effect.render(ui.timers.now()) {
            ui.page.set_text(target, &frame);
        }
    }

    /// Destroy the live text effect.
    pub fn teardown(&mut self) {
        self.text_effect.teardown();
    }
}

/// Mark exactly the controls whose language matches `code` as active.
fn update_controls(ui: &mut Ui, code: &str) -> usize {
    let mut active = 0;
    for id in ui.page.by_class(LANGUAGE_CONTROL_CLASS) {
        let Some(control) = ui.page.get_mut(id) else {
            continue;
        };
        let is_active = control.attr(LANGUAGE_CONTROL_ATTRIBUTE) == Some(code);
        control.toggle_class(ACTIVE_CLASS, Some(is_active));
        if is_active {
            control.add_class(ACTIVE_BACKGROUND);
            control.remove_class(HOVER_BACKGROUND);
            active += 1;
        } else {
            control.remove_class(ACTIVE_BACKGROUND);
            control.add_class(HOVER_BACKGROUND);
        }
    }
    active
}

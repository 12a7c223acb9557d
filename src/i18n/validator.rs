//! Translation table validation.
//!
//! The page tolerates gaps (an unresolved key leaves its element alone), so
//! nothing here is fatal. The report surfaces gaps between languages and
//! strings that the markup heuristic is likely to misroute.

use crate::dom::Page;
use crate::i18n::{KeyPath, LanguageRegistry, TranslationTable};
use crate::markup;
use std::collections::BTreeSet;

/// Attribute naming the translation key of a bound element
pub const BINDING_ATTRIBUTE: &str = "data-i18n";

/// Validation report containing errors and warnings about a translation table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Critical problems (a supported language has no table at all)
    pub errors: Vec<String>,

    /// Non-critical findings
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for translation tables and page bindings.
pub struct TranslationValidator;

impl TranslationValidator {
    /// Check a table against the enabled languages.
    ///
    /// - error: an enabled language has no tree
    /// - warning: a key resolves in one language but not in another
    /// - warning: a string has an `&` or `<` that is not markup but will be
    ///   injected as markup
    pub fn validate(table: &TranslationTable) -> ValidationReport {
        let mut report = ValidationReport::new();
        let codes: Vec<&str> = LanguageRegistry::get()
            .list_enabled()
            .iter()
            .map(|lang| lang.code)
            .collect();

        let mut all_keys = BTreeSet::new();
        for code in &codes {
            match table.for_code(code) {
                Some(tree) => {
                    for (path, text) in tree.leaves() {
                        Self::check_markup(code, &path, text, &mut report);
                        all_keys.insert(path);
                    }
                }
                None => report
                    .errors
                    .push(format!("No translations for supported language '{}'", code)),
            }
        }

        for code in &codes {
            if table.for_code(code).is_none() {
                continue;
            }
            for key in &all_keys {
                if table.resolve(code, &KeyPath::parse(key)).is_none() {
                    report
                        .warnings
                        .push(format!("Key '{}' is missing or empty in '{}'", key, code));
                }
            }
        }

        for code in table.codes() {
            if !codes.contains(&code) {
                report
                    .warnings
                    .push(format!("Translations for unsupported language '{}'", code));
            }
        }

        report
    }

    /// Check that every bound key on the page resolves in every enabled language.
    pub fn validate_bindings(page: &Page, table: &TranslationTable) -> ValidationReport {
        let mut report = ValidationReport::new();
        let keys: BTreeSet<&str> = page
            .with_attr(BINDING_ATTRIBUTE)
            .into_iter()
            .filter_map(|id| page.get(id)?.attr(BINDING_ATTRIBUTE))
            .collect();

        for lang in LanguageRegistry::get().list_enabled() {
            for key in &keys {
                if table.resolve(lang.code, &KeyPath::parse(key)).is_none() {
                    report.warnings.push(format!(
                        "Bound key '{}' does not resolve in '{}'",
                        key, lang.code
                    ));
                }
            }
        }

        report
    }

    fn check_markup(code: &str, path: &str, text: &str, report: &mut ValidationReport) {
        if markup::has_bare_ampersand(text) {
            report.warnings.push(format!(
                "'{}' in '{}' has a literal '&' and will be injected as markup",
                path, code
            ));
        }
        if markup::has_bare_angle_bracket(text) {
            report.warnings.push(format!(
                "'{}' in '{}' has a literal '<' and will be injected as markup",
                path, code
            ));
        }
    }
}

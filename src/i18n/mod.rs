//! Internationalization (i18n) for the site.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for the supported languages and their metadata
//! - `language`: Validated `Language` type
//! - `table`: Translation trees loaded from JSON, resolved by dotted key paths
//! - `strings`: Built-in localized strings (hero phrase, notices)
//! - `validator`: Consistency checks between languages and page bindings
//! - `metrics`: Lookup and injection counters
//!
//! # Example
//!
//! ```rust,ignore
//! use gvmi_site::i18n::{KeyPath, Language, TranslationTable};
//!
//! let table = TranslationTable::from_json_file("data/translations.json")?;
//! let title = table.resolve(Language::CHINESE.code(), &KeyPath::parse("hero.title"));
//! ```

mod language;
mod metrics;
mod registry;
mod strings;
mod table;
mod validator;

pub use language::Language;
pub use metrics::{MetricsReport, TranslationMetrics};
pub use registry::{LanguageConfig, LanguageRegistry};
pub use strings::{
    LanguageStrings, CONTACT_SENDING_LABEL, CONTACT_THANKS_NOTICE, LANGUAGE_SWITCHED_NOTICE,
};
pub use table::{KeyPath, TranslationNode, TranslationTable, TranslationTree};
pub use validator::{TranslationValidator, ValidationReport, BINDING_ATTRIBUTE};

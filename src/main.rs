//! Headless page run.
//!
//! Usage:
//!   gvmi-site [STEP]...
//!
//! Steps are replayed in order after the page boots:
//!   click:<id>            click the element with that HTML id
//!   input:<id>=<text>     type into a field
//!   submit:<id>           submit a form
//!   intersect:<id>=<r>    report a section as <r> visible (0.0 to 1.0)
//!   wait:<ms>             advance the clock
//!
//! Optional environment variables:
//! - SITE_TRANSLATIONS_FILE (defaults to data/translations.json)
//! - SITE_PAGE_FILE (defaults to data/page.json)
//! - SITE_PREFERENCE_FILE (defaults to data/preferences.json)
//! - SITE_STORAGE_KEY (defaults to gvmi-lang)
//! - SITE_DEFAULT_LANGUAGE (defaults to en)

use anyhow::{bail, Context, Result};
use gvmi_site::config::Config;
use gvmi_site::dom::Page;
use gvmi_site::i18n::{TranslationTable, TranslationValidator};
use gvmi_site::preference::{FileStorage, PreferenceStore};
use gvmi_site::site::{Event, Libraries, Site};
use std::time::Duration;
use tracing::{info, warn};

/// How long the final drain may run before giving up
const IDLE_BUDGET: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
enum Step {
    Click(String),
    Input(String, String),
    Submit(String),
    Intersect(String, f64),
    Wait(Duration),
}

impl Step {
    fn parse(arg: &str) -> Result<Self> {
        let (verb, rest) = arg
            .split_once(':')
            .with_context(|| format!("Step '{}' is missing ':'", arg))?;

        let step = match verb {
            "click" => Step::Click(rest.to_string()),
            "submit" => Step::Submit(rest.to_string()),
            "input" => {
                let (id, text) = rest.split_once('=').unwrap_or((rest, ""));
                Step::Input(id.to_string(), text.to_string())
            }
            "intersect" => {
                let (id, ratio) = rest
                    .split_once('=')
                    .with_context(|| format!("Step '{}' needs a ratio", arg))?;
                let ratio = ratio
                    .parse()
                    .with_context(|| format!("Invalid ratio in '{}'", arg))?;
                Step::Intersect(id.to_string(), ratio)
            }
            "wait" => {
                let ms = rest
                    .parse()
                    .with_context(|| format!("Invalid wait in '{}'", arg))?;
                Step::Wait(Duration::from_millis(ms))
            }
            other => bail!("Unknown step '{}'", other),
        };
        Ok(step)
    }
}

fn load_translations(config: &Config) -> Option<TranslationTable> {
    match TranslationTable::from_json_file(&config.translations_file) {
        Ok(table) => Some(table),
        Err(e) => {
            warn!("Running without translations: {:#}", e);
            None
        }
    }
}

fn replay(site: &mut Site, step: Step) {
    let id = match &step {
        Step::Wait(duration) => {
            site.advance(*duration);
            return;
        }
        Step::Click(id) | Step::Submit(id) | Step::Input(id, _) | Step::Intersect(id, _) => {
            id.clone()
        }
    };
    let Some(target) = site.element(&id) else {
        warn!("No element #{} on page, skipping step", id);
        return;
    };

    let event = match step {
        Step::Click(_) => Event::Click(target),
        Step::Submit(_) => Event::Submit(target),
        Step::Input(_, value) => Event::Input { target, value },
        Step::Intersect(_, ratio) => Event::Intersect { target, ratio },
        Step::Wait(_) => return,
    };

    if let Some(report) = site.dispatch(event) {
        info!(
            "Switched to '{}': {} plain, {} rich, {} unresolved",
            report.code,
            report.translated_plain,
            report.translated_rich,
            report.unresolved.len()
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gvmi_site=info".parse()?),
        )
        .init();

    let steps = std::env::args()
        .skip(1)
        .map(|arg| Step::parse(&arg))
        .collect::<Result<Vec<_>>>()?;

    let config = Config::from_env()?;

    let page = Page::from_json_file(&config.page_file)?;
    let translations = load_translations(&config);

    if let Some(table) = &translations {
        let report = TranslationValidator::validate(table);
        for error in &report.errors {
            warn!("Translation error: {}", error);
        }
        for warning in &report.warnings {
            warn!("Translation warning: {}", warning);
        }
        let bindings = TranslationValidator::validate_bindings(&page, table);
        for warning in &bindings.warnings {
            warn!("Binding warning: {}", warning);
        }
    }

    let preferences = PreferenceStore::new(Box::new(FileStorage::new(&config.preference_file)))
        .with_key(&config.storage_key)
        .with_default(config.default_language);

    let mut site = Site::new(
        page,
        translations,
        preferences,
        Libraries::headless(),
        &config,
    );

    let report = site.boot();
    info!("Booted in '{}' at {}", report.code, report.applied_at);

    for step in steps {
        replay(&mut site, step);
    }

    if !site.run_until_idle(config.frame, IDLE_BUDGET).await {
        warn!("Page still had pending timers after {:?}", IDLE_BUDGET);
    }

    println!("{}", serde_json::to_string_pretty(&site.summary())?);
    println!("{}", serde_json::to_string_pretty(&site.metrics())?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps() {
        assert_eq!(Step::parse("click:btn-zh").unwrap(), Step::Click("btn-zh".into()));
        assert_eq!(
            Step::parse("input:insights-search=lng").unwrap(),
            Step::Input("insights-search".into(), "lng".into())
        );
        assert_eq!(
            Step::parse("intersect:about=0.5").unwrap(),
            Step::Intersect("about".into(), 0.5)
        );
        assert_eq!(
            Step::parse("wait:250").unwrap(),
            Step::Wait(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_parse_rejects_bad_steps() {
        assert!(Step::parse("click").is_err());
        assert!(Step::parse("hover:x").is_err());
        assert!(Step::parse("wait:soon").is_err());
        assert!(Step::parse("intersect:about").is_err());
    }
}

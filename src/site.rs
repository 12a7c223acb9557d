//! The page controller: startup sequence, event routing and the clock.
//!
//! `Site` owns the page, the language switch controller and every widget.
//! Events are handled one at a time to completion, and timers fire in due
//! order as the clock advances, mirroring a browser's single-threaded
//! event loop.

use crate::config::Config;
use crate::dom::{ElementId, Page};
use crate::i18n::{MetricsReport, TranslationTable, BINDING_ATTRIBUTE};
use crate::preference::PreferenceStore;
use crate::switcher::{
    ApplyReport, LanguageSwitchController, HERO_TITLE_ID, LANGUAGE_CONTROL_ATTRIBUTE,
    LANGUAGE_CONTROL_CLASS,
};
use crate::text_effect::{TextEffectFactory, TextEffectSlot, TypewriterFactory};
use crate::timers::Task;
use crate::ui::Ui;
use crate::widgets::carousel::PARTNER_CAROUSEL_ID;
use crate::widgets::contact::CONTACT_FORM_ID;
use crate::widgets::filters::{
    self, CATEGORY_FILTER_CLASS, FLEET_FILTER_CLASS, INSIGHTS_SEARCH_ID,
};
use crate::widgets::{
    charts, CarouselLibrary, CarouselOptions, ChartLibrary, ContactForms, CounterSettings,
    Counters, TracingCarousel, TracingCharts,
};
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};

const MOBILE_MENU_BUTTON_ID: &str = "mobile-menu-btn";
const MOBILE_MENU_ID: &str = "mobile-menu";
const REVEAL_CLASS: &str = "animate-fade-in-up";

/// A user or browser event delivered to the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Click(ElementId),
    Input { target: ElementId, value: String },
    Submit(ElementId),
    /// Visibility change reported by the intersection observer
    Intersect { target: ElementId, ratio: f64 },
}

/// Scroll-reveal observer settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealOptions {
    /// Minimum visible fraction that counts as intersecting
    pub threshold: f64,
    pub root_margin: &'static str,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: "0px 0px -50px 0px",
        }
    }
}

/// Optional third-party libraries present on the page. A missing library
/// silently disables its feature.
#[derive(Default)]
pub struct Libraries {
    pub text_effect: Option<Box<dyn TextEffectFactory>>,
    pub carousel: Option<Box<dyn CarouselLibrary>>,
    pub charts: Option<Box<dyn ChartLibrary>>,
    pub intersection_observer: bool,
}

impl Libraries {
    /// No libraries loaded.
    pub fn none() -> Self {
        Self::default()
    }

    /// Built-in typing effect plus log-only carousel and chart adapters.
    pub fn headless() -> Self {
        Self {
            text_effect: Some(Box::new(TypewriterFactory)),
            carousel: Some(Box::new(TracingCarousel::default())),
            charts: Some(Box::new(TracingCharts::default())),
            intersection_observer: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingSummary {
    pub key: String,
    pub text: String,
}

/// Snapshot of the language-relevant parts of the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSummary {
    pub lang: String,
    pub active_languages: Vec<String>,
    pub bindings: Vec<BindingSummary>,
    pub hero_text: Option<String>,
    pub notifications: Vec<String>,
    pub pending_timers: usize,
    pub clock_ms: u64,
}

pub struct Site {
    ui: Ui,
    language: LanguageSwitchController,
    counters: Counters,
    contact: ContactForms,
    carousel: Option<Box<dyn CarouselLibrary>>,
    charts: Option<Box<dyn ChartLibrary>>,
    reveal: Option<RevealOptions>,
    observed: HashSet<ElementId>,
    chart_init_delay: Duration,
    booted: bool,
}

impl Site {
    pub fn new(
        page: Page,
        translations: Option<TranslationTable>,
        preferences: PreferenceStore,
        libraries: Libraries,
        config: &Config,
    ) -> Self {
        let ui = Ui::new(page).with_notification_duration(config.notification_duration);
        let language = LanguageSwitchController::new(
            translations,
            preferences,
            TextEffectSlot::new(libraries.text_effect),
        );

        Self {
            ui,
            language,
            counters: Counters::new(CounterSettings {
                duration: config.counter_duration,
                frame: config.frame,
            }),
            contact: ContactForms::new(config.contact_submit_delay),
            carousel: libraries.carousel,
            charts: libraries.charts,
            reveal: libraries
                .intersection_observer
                .then(RevealOptions::default),
            observed: HashSet::new(),
            chart_init_delay: config.chart_init_delay,
            booted: false,
        }
    }

    /// Run the page-load sequence and apply the stored language.
    pub fn boot(&mut self) -> ApplyReport {
        let counters = self.counters.start_all(&mut self.ui);
        debug!("Started {} counters", counters);

        self.language.start_text_effect(&mut self.ui);
        self.mount_carousel();
        self.observe_sections();
        self.ui.after(self.chart_init_delay, Task::InitCharts);
        self.booted = true;

        let language = self.language.preferences().read();
        info!("Booting page in '{}'", language);
        self.language.apply(&mut self.ui, language.code())
    }

    fn mount_carousel(&mut self) {
        let Some(target) = self.ui.page.by_id(PARTNER_CAROUSEL_ID) else {
            return;
        };
        match self.carousel.as_mut() {
            Some(carousel) => carousel.mount(target, &CarouselOptions::partners()),
            None => debug!("Carousel library unavailable"),
        }
    }

    fn observe_sections(&mut self) {
        if self.reveal.is_none() {
            debug!("Intersection observer unavailable, sections will not reveal");
            return;
        }
        self.observed = self.ui.page.by_tag("section").into_iter().collect();
    }

    /// Switch language directly, as a language control would.
    pub fn apply_language(&mut self, code: &str) -> ApplyReport {
        self.language.apply(&mut self.ui, code)
    }

    /// Handle one event. Returns the switch report if it changed language.
    ///
    /// Events before `boot` are ignored: no handlers are attached yet.
    pub fn dispatch(&mut self, event: Event) -> Option<ApplyReport> {
        if !self.booted {
            debug!("Ignoring {:?} before boot", event);
            return None;
        }

        match event {
            Event::Click(target) => self.click(target),
            Event::Input { target, value } => {
                self.input(target, value);
                None
            }
            Event::Submit(target) => {
                if self.is_element(target, CONTACT_FORM_ID) {
                    self.contact.submit(&mut self.ui, target);
                }
                None
            }
            Event::Intersect { target, ratio } => {
                self.intersect(target, ratio);
                None
            }
        }
    }

    /// Click handlers fire on the target and then on each ancestor.
    fn click(&mut self, target: ElementId) -> Option<ApplyReport> {
        let mut report = None;
        let mut current = Some(target);

        while let Some(id) = current {
            let Some(element) = self.ui.page.get(id) else {
                break;
            };
            let parent = element.parent();

            if element.has_class(LANGUAGE_CONTROL_CLASS) {
                if let Some(code) = element.attr(LANGUAGE_CONTROL_ATTRIBUTE).map(str::to_string) {
                    report = Some(self.language.apply(&mut self.ui, &code));
                }
            } else if element.id.as_deref() == Some(MOBILE_MENU_BUTTON_ID) {
                self.toggle_mobile_menu();
            } else if element.tag == "a" {
                let href = element.attr("href").map(str::to_string);
                self.follow_anchor(href.as_deref());
            } else if element.has_class(FLEET_FILTER_CLASS) {
                filters::apply_fleet_filter(&mut self.ui.page, id);
            } else if element.has_class(CATEGORY_FILTER_CLASS) {
                filters::select_insight_category(&mut self.ui.page, id);
            }

            current = parent;
        }
        report
    }

    fn toggle_mobile_menu(&mut self) {
        let Some(menu) = self.ui.page.by_id(MOBILE_MENU_ID) else {
            return;
        };
        if let Some(menu) = self.ui.page.get_mut(menu) {
            menu.toggle_class("hidden", None);
        }
    }

    fn follow_anchor(&mut self, href: Option<&str>) {
        let Some(fragment) = href.and_then(|h| h.strip_prefix('#')) else {
            return;
        };
        if fragment.is_empty() {
            return;
        }
        if let Some(target) = self.ui.page.by_id(fragment) {
            self.ui.page.scroll_into_view(target);
        }
    }

    fn input(&mut self, target: ElementId, value: String) {
        let Some(element) = self.ui.page.get_mut(target) else {
            return;
        };
        element.value = value;
        if element.id.as_deref() == Some(INSIGHTS_SEARCH_ID) {
            filters::filter_insights(&mut self.ui.page);
        }
    }

    fn intersect(&mut self, target: ElementId, ratio: f64) {
        let Some(options) = self.reveal else {
            return;
        };
        // NaN never reaches the threshold
        let visible = ratio >= options.threshold;
        if !visible || !self.observed.contains(&target) {
            return;
        }
        if let Some(section) = self.ui.page.get_mut(target) {
            section.add_class(REVEAL_CLASS);
        }
    }

    fn is_element(&self, id: ElementId, html_id: &str) -> bool {
        self.ui
            .page
            .get(id)
            .is_some_and(|e| e.id.as_deref() == Some(html_id))
    }

    /// Move the clock forward, firing due timers in order, then redraw the
    /// typing effect.
    pub fn advance(&mut self, by: Duration) {
        let deadline = self
            .ui
            .timers
            .now()
            .saturating_add(u64::try_from(by.as_millis()).unwrap_or(u64::MAX));

        while let Some((_, task)) = self.ui.timers.pop_due(deadline) {
            self.run_task(task);
        }
        self.ui.timers.settle(deadline);
        self.language.render_text_effect(&mut self.ui);
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::DismissNotification(id) => self.ui.dismiss(id),
            Task::CounterTick(id) => self.counters.tick(&mut self.ui, id),
            Task::CompleteContactSubmit(form) => self.contact.complete(&mut self.ui, form),
            Task::InitCharts => match self.charts.as_mut() {
                Some(library) => {
                    let drawn = charts::init_charts(&self.ui.page, library.as_mut());
                    debug!("Initialized {} charts", drawn);
                }
                None => debug!("Chart library unavailable"),
            },
        }
    }

    /// Drive the clock in real time until no timers are pending or the
    /// budget runs out. Returns true if the page went idle.
    pub async fn run_until_idle(&mut self, frame: Duration, budget: Duration) -> bool {
        let frame = frame.max(Duration::from_millis(1));
        let mut interval = tokio::time::interval(frame);
        let mut elapsed = Duration::ZERO;

        loop {
            interval.tick().await;
            if self.ui.timers.is_idle() {
                return true;
            }
            if elapsed >= budget {
                return false;
            }
            self.advance(frame);
            elapsed += frame;
        }
    }

    pub fn page(&self) -> &Page {
        &self.ui.page
    }

    pub fn ui(&self) -> &Ui {
        &self.ui
    }

    pub fn language(&self) -> &LanguageSwitchController {
        &self.language
    }

    pub fn metrics(&self) -> MetricsReport {
        self.language.metrics().report()
    }

    pub fn now(&self) -> u64 {
        self.ui.timers.now()
    }

    /// Look up an element by its HTML id.
    pub fn element(&self, html_id: &str) -> Option<ElementId> {
        self.ui.page.by_id(html_id)
    }

    pub fn summary(&self) -> PageSummary {
        let page = &self.ui.page;

        let active_languages = page
            .by_class(LANGUAGE_CONTROL_CLASS)
            .into_iter()
            .filter_map(|id| page.get(id))
            .filter(|e| e.has_class("active"))
            .filter_map(|e| e.attr(LANGUAGE_CONTROL_ATTRIBUTE).map(str::to_string))
            .collect();

        let bindings = page
            .with_attr(BINDING_ATTRIBUTE)
            .into_iter()
            .filter_map(|id| page.get(id))
            .filter_map(|e| {
                Some(BindingSummary {
                    key: e.attr(BINDING_ATTRIBUTE)?.to_string(),
                    text: e.text(),
                })
            })
            .collect();

        PageSummary {
            lang: page.lang().to_string(),
            active_languages,
            bindings,
            hero_text: page.by_id(HERO_TITLE_ID).and_then(|id| page.text_of(id)),
            notifications: self
                .ui
                .notifications()
                .into_iter()
                .filter_map(|id| page.text_of(id))
                .collect(),
            pending_timers: self.ui.timers.pending(),
            clock_ms: self.ui.timers.now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Page {
        Page::from_json_str(
            r##"{"lang": "en", "body": [
                {"tag": "nav", "children": [
                    {"tag": "button", "id": "mobile-menu-btn"},
                    {"tag": "div", "id": "mobile-menu", "class": "hidden", "children": [
                        {"tag": "a", "id": "link-about", "attrs": {"href": "#about"}, "text": "About"},
                        {"tag": "a", "id": "link-top", "attrs": {"href": "#"}, "text": "Top"}
                    ]},
                    {"tag": "button", "id": "btn-en", "class": "language-btn", "attrs": {"data-lang": "en"}},
                    {"tag": "button", "id": "btn-zh", "class": "language-btn", "attrs": {"data-lang": "zh"}, "children": [
                        {"tag": "span", "id": "btn-zh-label", "text": "中文"}
                    ]}
                ]},
                {"tag": "section", "id": "about", "children": [
                    {"tag": "h2", "id": "about-title", "attrs": {"data-i18n": "about.title"}, "text": "About"}
                ]}
            ]}"##,
        )
        .unwrap()
    }

    fn site() -> Site {
        let table = TranslationTable::from_json_str(
            r#"{"en": {"about": {"title": "About Us"}}, "zh": {"about": {"title": "关于我们"}}}"#,
        )
        .unwrap();
        Site::new(
            page(),
            Some(table),
            PreferenceStore::in_memory(),
            Libraries::headless(),
            &Config::default(),
        )
    }

    fn click(site: &mut Site, id: &str) -> Option<ApplyReport> {
        let target = site.element(id).unwrap();
        site.dispatch(Event::Click(target))
    }

    #[test]
    fn test_boot_applies_default_language() {
        let mut site = site();
        let report = site.boot();

        assert_eq!(report.code, "en");
        assert_eq!(site.summary().active_languages, ["en"]);
        assert_eq!(site.summary().bindings[0].text, "About Us");
    }

    #[test]
    fn test_events_before_boot_are_ignored() {
        let mut site = site();
        assert!(click(&mut site, "btn-zh").is_none());
        assert_eq!(site.page().lang(), "en");
    }

    #[test]
    fn test_click_bubbles_to_language_control() {
        let mut site = site();
        site.boot();

        let report = click(&mut site, "btn-zh-label").expect("should switch");
        assert_eq!(report.code, "zh");
        assert_eq!(site.summary().bindings[0].text, "关于我们");
    }

    #[test]
    fn test_mobile_menu_toggles() {
        let mut site = site();
        site.boot();
        let menu = site.element("mobile-menu").unwrap();

        click(&mut site, "mobile-menu-btn");
        assert!(!site.page().get(menu).unwrap().has_class("hidden"));
        click(&mut site, "mobile-menu-btn");
        assert!(site.page().get(menu).unwrap().has_class("hidden"));
    }

    #[test]
    fn test_anchor_scrolls_to_target() {
        let mut site = site();
        site.boot();

        click(&mut site, "link-top");
        assert_eq!(site.page().scrolled_to(), None);

        click(&mut site, "link-about");
        assert_eq!(site.page().scrolled_to(), site.element("about"));
    }

    #[test]
    fn test_sections_reveal_past_threshold() {
        let mut site = site();
        site.boot();
        let about = site.element("about").unwrap();

        site.dispatch(Event::Intersect { target: about, ratio: 0.05 });
        assert!(!site.page().get(about).unwrap().has_class(REVEAL_CLASS));

        site.dispatch(Event::Intersect { target: about, ratio: 0.1 });
        assert!(site.page().get(about).unwrap().has_class(REVEAL_CLASS));
    }

    #[test]
    fn test_nan_ratio_does_not_reveal() {
        let mut site = site();
        site.boot();
        let about = site.element("about").unwrap();

        site.dispatch(Event::Intersect { target: about, ratio: f64::NAN });
        assert!(!site.page().get(about).unwrap().has_class(REVEAL_CLASS));
    }

    #[test]
    fn test_huge_notification_duration_does_not_overflow() {
        let config = Config {
            notification_duration: Duration::from_millis(u64::MAX),
            ..Config::default()
        };
        let mut site = Site::new(
            page(),
            None,
            PreferenceStore::in_memory(),
            Libraries::headless(),
            &config,
        );
        site.boot();
        site.advance(Duration::from_millis(10));

        site.apply_language("zh");
        site.advance(Duration::from_millis(1000));
        assert_eq!(site.summary().notifications.len(), 2);
    }

    #[test]
    fn test_reveal_disabled_without_observer() {
        let mut site = Site::new(
            page(),
            None,
            PreferenceStore::in_memory(),
            Libraries::none(),
            &Config::default(),
        );
        site.boot();
        let about = site.element("about").unwrap();

        site.dispatch(Event::Intersect { target: about, ratio: 1.0 });
        assert!(!site.page().get(about).unwrap().has_class(REVEAL_CLASS));
    }

    #[test]
    fn test_notifications_expire() {
        let mut site = site();
        site.boot();
        assert_eq!(site.summary().notifications.len(), 1);

        site.advance(Duration::from_millis(999));
        assert_eq!(site.summary().notifications.len(), 1);
        site.advance(Duration::from_millis(1));
        assert!(site.summary().notifications.is_empty());
        assert!(site.ui().timers.is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_idle_drains_timers() {
        let mut site = site();
        site.boot();

        let idle = site
            .run_until_idle(Duration::from_millis(16), Duration::from_secs(10))
            .await;

        assert!(idle);
        assert!(site.summary().notifications.is_empty());
        assert!(site.now() >= 1000);
    }
}

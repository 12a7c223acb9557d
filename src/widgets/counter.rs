//! Animated statistics counters.
//!
//! Every `.counter` element with a numeric `data-target` counts up from zero
//! to its target over a fixed duration, one frame per timer tick. The
//! repeating timer clears itself once the target is reached; counters with
//! an unparseable target never start one.

use crate::dom::ElementId;
use crate::timers::{Task, TimerId};
use crate::ui::Ui;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

pub const COUNTER_CLASS: &str = "counter";
pub const COUNTER_TARGET_ATTRIBUTE: &str = "data-target";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSettings {
    /// Time to reach the target
    pub duration: Duration,
    /// Tick period
    pub frame: Duration,
}

impl Default for CounterSettings {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(2000),
            frame: Duration::from_millis(16),
        }
    }
}

#[derive(Debug, Clone)]
struct RunningCounter {
    target: u64,
    current: f64,
    increment: f64,
    timer: TimerId,
}

/// All running counters on the page.
#[derive(Debug, Default)]
pub struct Counters {
    settings: CounterSettings,
    running: HashMap<ElementId, RunningCounter>,
}

impl Counters {
    pub fn new(settings: CounterSettings) -> Self {
        Self {
            settings,
            running: HashMap::new(),
        }
    }

    /// Start a tween for every counter element. Returns how many started.
    pub fn start_all(&mut self, ui: &mut Ui) -> usize {
        let frame_ms = self.settings.frame.as_millis().max(1) as f64;
        let frames = (self.settings.duration.as_millis() as f64 / frame_ms).max(1.0);

        let mut started = 0;
        for id in ui.page.by_class(COUNTER_CLASS) {
            if self.running.contains_key(&id) {
                continue;
            }
            let target = ui
                .page
                .get(id)
                .and_then(|e| e.attr(COUNTER_TARGET_ATTRIBUTE))
                .and_then(parse_target);
            let Some(target) = target else {
                debug!("Counter {:?} has no numeric target, not animating", id);
                continue;
            };

            let timer = ui
                .timers
                .set_interval(self.settings.frame, Task::CounterTick(id));
            self.running.insert(
                id,
                RunningCounter {
                    target,
                    current: 0.0,
                    increment: target as f64 / frames,
                    timer,
                },
            );
            started += 1;
        }
        started
    }

    /// Advance one counter by a frame; stops its timer at the target.
    pub fn tick(&mut self, ui: &mut Ui, id: ElementId) {
        let Some(counter) = self.running.get_mut(&id) else {
            return;
        };

        counter.current += counter.increment;
        let done = counter.current >= counter.target as f64 || ui.page.get(id).is_none();
        if done {
            counter.current = counter.target as f64;
        }
        let text = format_count(counter.current, counter.target);
        let timer = counter.timer;

        ui.page.set_text(id, &text);
        if done {
            ui.timers.clear(timer);
            self.running.remove(&id);
        }
    }

    pub fn running(&self) -> usize {
        self.running.len()
    }
}

/// Leading-digit integer parse: `"1500+"` → 1500, `"abc"` → `None`.
fn parse_target(raw: &str) -> Option<u64> {
    let digits: String = raw
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Format a counter value using its target's magnitude for the unit.
pub fn format_count(value: f64, target: u64) -> String {
    if target >= 1_000_000_000 {
        format!("{:.1}B+", round_to(value / 1e9, 1))
    } else if target >= 1_000_000 {
        format!("{:.1}M+", round_to(value / 1e6, 1))
    } else if target >= 1_000 {
        format!("{}+", (value / 1e3).round() as u64)
    } else {
        format!("{}+", value.floor() as u64)
    }
}

/// Round half away from zero at `places` decimals.
fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Element, Page};

    fn run_to_idle(ui: &mut Ui, counters: &mut Counters) -> usize {
        let mut ticks = 0;
        while let Some((_, task)) = ui.timers.pop_due(u64::MAX) {
            if let Task::CounterTick(id) = task {
                counters.tick(ui, id);
                ticks += 1;
            }
        }
        ticks
    }

    fn counter_page(targets: &[&str]) -> (Ui, Vec<ElementId>) {
        let mut page = Page::new();
        let ids = targets
            .iter()
            .map(|t| {
                page.append(
                    None,
                    Element::new("span")
                        .with_class(COUNTER_CLASS)
                        .with_attr(COUNTER_TARGET_ATTRIBUTE, t),
                )
            })
            .collect();
        (Ui::new(page), ids)
    }

    // ==================== Formatting Tests ====================

    #[test]
    fn test_format_billions() {
        assert_eq!(format_count(2.5e9, 2_500_000_000), "2.5B+");
        assert_eq!(format_count(0.0, 2_500_000_000), "0.0B+");
    }

    #[test]
    fn test_format_millions() {
        assert_eq!(format_count(12e6, 12_000_000), "12.0M+");
    }

    #[test]
    fn test_format_thousands_rounds() {
        assert_eq!(format_count(1500.0, 1500), "2+");
        assert_eq!(format_count(1499.0, 1500), "1+");
    }

    #[test]
    fn test_format_small_floors() {
        assert_eq!(format_count(349.9, 350), "349+");
        assert_eq!(format_count(350.0, 350), "350+");
    }

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("350"), Some(350));
        assert_eq!(parse_target(" 1500+"), Some(1500));
        assert_eq!(parse_target("abc"), None);
        assert_eq!(parse_target(""), None);
    }

    // ==================== Animation Tests ====================

    #[test]
    fn test_counter_reaches_target_and_stops() {
        let (mut ui, ids) = counter_page(&["350"]);
        let mut counters = Counters::new(CounterSettings::default());

        assert_eq!(counters.start_all(&mut ui), 1);
        let ticks = run_to_idle(&mut ui, &mut counters);

        // 2000ms / 16ms frames, give or take float accumulation
        assert!((125..=126).contains(&ticks), "ticks = {}", ticks);
        assert_eq!(ui.page.text_of(ids[0]).unwrap(), "350+");
        assert_eq!(counters.running(), 0);
        assert!(ui.timers.is_idle());
    }

    #[test]
    fn test_zero_target_stops_on_first_tick() {
        let (mut ui, ids) = counter_page(&["0"]);
        let mut counters = Counters::new(CounterSettings::default());

        counters.start_all(&mut ui);
        assert_eq!(run_to_idle(&mut ui, &mut counters), 1);
        assert_eq!(ui.page.text_of(ids[0]).unwrap(), "0+");
    }

    #[test]
    fn test_invalid_target_never_starts_timer() {
        let (mut ui, ids) = counter_page(&["n/a"]);
        let mut counters = Counters::new(CounterSettings::default());

        assert_eq!(counters.start_all(&mut ui), 0);
        assert!(ui.timers.is_idle());
        assert_eq!(ui.page.text_of(ids[0]).unwrap(), "");
    }

    #[test]
    fn test_removed_counter_stops() {
        let (mut ui, ids) = counter_page(&["1000000"]);
        let mut counters = Counters::new(CounterSettings::default());

        counters.start_all(&mut ui);
        ui.page.remove(ids[0]);
        assert_eq!(run_to_idle(&mut ui, &mut counters), 1);
        assert!(ui.timers.is_idle());
    }

    #[test]
    fn test_start_all_is_not_doubled() {
        let (mut ui, _) = counter_page(&["10"]);
        let mut counters = Counters::new(CounterSettings::default());

        counters.start_all(&mut ui);
        assert_eq!(counters.start_all(&mut ui), 0);
        assert_eq!(ui.timers.pending(), 1);
    }
}

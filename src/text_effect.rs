//! Typing text effect for the hero title.
//!
//! The effect is provided by a pluggable library ([`TextEffectFactory`]).
//! A constructed effect is bound to one phrase for its whole life: changing
//! the phrase means destroying the instance and building a new one, which
//! [`TextEffectSlot`] enforces.

use crate::dom::ElementId;
use serde::Serialize;
use tracing::debug;

/// Options accepted by the typing library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedOptions {
    pub strings: Vec<String>,
    /// Milliseconds per typed character
    pub type_speed: u64,
    /// Milliseconds per deleted character
    pub back_speed: u64,
    /// Pause before deleting, in milliseconds
    pub back_delay: u64,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub show_cursor: bool,
    pub cursor_char: char,
}

impl TypedOptions {
    /// Hero title animation settings.
    pub fn hero(phrase: &str) -> Self {
        Self {
            strings: vec![phrase.to_string()],
            type_speed: 50,
            back_speed: 30,
            back_delay: 2000,
            looping: true,
            show_cursor: true,
            cursor_char: '|',
        }
    }
}

/// A live typing animation.
pub trait TextEffect {
    /// Text shown `elapsed_ms` after construction.
    fn frame_at(&self, elapsed_ms: u64) -> String;

    /// Stop the animation and release its timer.
    fn destroy(&mut self);
}

/// The typing library: builds effects bound to a target element.
pub trait TextEffectFactory {
    fn create(&self, target: ElementId, options: TypedOptions) -> Box<dyn TextEffect>;
}

/// Built-in typing effect: types each string, pauses, deletes it, and
/// (when looping) starts over.
#[derive(Debug, Clone)]
pub struct Typewriter {
    options: TypedOptions,
    destroyed: bool,
}

impl Typewriter {
    pub fn new(options: TypedOptions) -> Self {
        Self {
            options,
            destroyed: false,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn cycle_length(&self, text: &str) -> u64 {
        let chars = text.chars().count() as u64;
        chars * self.options.type_speed + self.options.back_delay + chars * self.options.back_speed
    }

    fn visible_text(&self, elapsed_ms: u64) -> String {
        let strings = &self.options.strings;
        let Some(last) = strings.last() else {
            return String::new();
        };

        let total: u64 = strings.iter().map(|s| self.cycle_length(s)).sum();
        let mut t = if self.options.looping && total > 0 {
            elapsed_ms % total
        } else {
            elapsed_ms
        };

        for (index, text) in strings.iter().enumerate() {
            let chars = text.chars().count() as u64;

            let typing = chars * self.options.type_speed;
            if t < typing {
                return prefix(text, t / self.options.type_speed);
            }
            t -= typing;

            if !self.options.looping && index + 1 == strings.len() {
                return text.clone();
            }

            if t < self.options.back_delay {
                return text.clone();
            }
            t -= self.options.back_delay;

            let deleting = chars * self.options.back_speed;
            if t < deleting {
                return prefix(text, chars - t / self.options.back_speed);
            }
            t -= deleting;
        }

        last.clone()
    }
}

fn prefix(text: &str, chars: u64) -> String {
    text.chars()
        .take(usize::try_from(chars).unwrap_or(usize::MAX))
        .collect()
}

impl TextEffect for Typewriter {
    fn frame_at(&self, elapsed_ms: u64) -> String {
        if self.destroyed {
            return String::new();
        }
        let mut frame = self.visible_text(elapsed_ms);
        if self.options.show_cursor {
            frame.push(self.options.cursor_char);
        }
        frame
    }

    fn destroy(&mut self) {
        self.destroyed = true;
    }
}

/// Factory for the built-in [`Typewriter`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TypewriterFactory;

impl TextEffectFactory for TypewriterFactory {
    fn create(&self, _target: ElementId, options: TypedOptions) -> Box<dyn TextEffect> {
        Box::new(Typewriter::new(options))
    }
}

struct ActiveEffect {
    effect: Box<dyn TextEffect>,
    target: ElementId,
    phrase: String,
    started_at: u64,
}

/// Exclusive owner of the single live text effect.
///
/// Construction always destroys the previous instance first, and dropping
/// the slot destroys whatever is still live.
pub struct TextEffectSlot {
    factory: Option<Box<dyn TextEffectFactory>>,
    active: Option<ActiveEffect>,
}

impl TextEffectSlot {
    /// `None` means the typing library is not available on this page.
    pub fn new(factory: Option<Box<dyn TextEffectFactory>>) -> Self {
        Self {
            factory,
            active: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.factory.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn phrase(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.phrase.as_str())
    }

    pub fn target(&self) -> Option<ElementId> {
        self.active.as_ref().map(|a| a.target)
    }

    /// Tear down the live effect, then build a new one for `phrase`.
    ///
    /// Returns false (and leaves the slot untouched) when no library is available.
    pub fn replace(&mut self, target: ElementId, phrase: &str, now_ms: u64) -> bool {
        let Some(factory) = self.factory.as_ref() else {
            debug!("Typing library unavailable, skipping text effect");
            return false;
        };

        if let Some(mut previous) = self.active.take() {
            previous.effect.destroy();
        }

        let effect = factory.create(target, TypedOptions::hero(phrase));
        self.active = Some(ActiveEffect {
            effect,
            target,
            phrase: phrase.to_string(),
            started_at: now_ms,
        });
        true
    }

    /// Destroy the live effect, if any.
    pub fn teardown(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.effect.destroy();
        }
    }

    /// Current frame of the live effect and the element it draws into.
    pub fn render(&self, now_ms: u64) -> Option<(ElementId, String)> {
        self.active.as_ref().map(|a| {
            (
                a.target,
                a.effect.frame_at(now_ms.saturating_sub(a.started_at)),
            )
        })
    }
}

impl Drop for TextEffectSlot {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn writer(text: &str, looping: bool) -> Typewriter {
        let mut options = TypedOptions::hero(text);
        options.looping = looping;
        options.show_cursor = false;
        Typewriter::new(options)
    }

    // ==================== Typewriter Tests ====================

    #[test]
    fn test_hero_options() {
        let options = TypedOptions::hero("Hi");
        assert_eq!(options.type_speed, 50);
        assert_eq!(options.back_speed, 30);
        assert_eq!(options.back_delay, 2000);
        assert!(options.looping);
        assert!(options.show_cursor);
        assert_eq!(options.cursor_char, '|');
    }

    #[test]
    fn test_options_serialize_like_library_config() {
        let json = serde_json::to_value(TypedOptions::hero("Hi")).unwrap();
        assert_eq!(json["typeSpeed"], 50);
        assert_eq!(json["loop"], true);
        assert_eq!(json["cursorChar"], "|");
        assert_eq!(json["strings"][0], "Hi");
    }

    #[test]
    fn test_typing_progress() {
        let w = writer("abcd", true);
        assert_eq!(w.frame_at(0), "");
        assert_eq!(w.frame_at(50), "a");
        assert_eq!(w.frame_at(149), "ab");
        assert_eq!(w.frame_at(200), "abcd");
    }

    #[test]
    fn test_pause_then_backspace() {
        let w = writer("abcd", true);
        // typed by 200ms, paused until 2200ms, deleting at 30ms per char
        assert_eq!(w.frame_at(2199), "abcd");
        assert_eq!(w.frame_at(2200), "abcd");
        assert_eq!(w.frame_at(2230), "abc");
        assert_eq!(w.frame_at(2290), "a");
    }

    #[test]
    fn test_loop_restarts() {
        let w = writer("abcd", true);
        let cycle = 200 + 2000 + 120;
        assert_eq!(w.frame_at(cycle), "");
        assert_eq!(w.frame_at(cycle + 100), "ab");
    }

    #[test]
    fn test_no_loop_holds_full_text() {
        let w = writer("abcd", false);
        assert_eq!(w.frame_at(10_000), "abcd");
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let w = writer("你好", true);
        assert_eq!(w.frame_at(50), "你");
    }

    #[test]
    fn test_cursor_appended() {
        let w = Typewriter::new(TypedOptions::hero("ab"));
        assert_eq!(w.frame_at(100), "ab|");
    }

    #[test]
    fn test_destroyed_writer_renders_nothing() {
        let mut w = Typewriter::new(TypedOptions::hero("ab"));
        w.destroy();
        assert!(w.is_destroyed());
        assert_eq!(w.frame_at(100), "");
    }

    // ==================== Slot Tests ====================

    struct CountingFactory {
        live: Rc<Cell<i32>>,
    }

    struct CountingEffect {
        live: Rc<Cell<i32>>,
        destroyed: bool,
    }

    impl TextEffect for CountingEffect {
        fn frame_at(&self, _elapsed_ms: u64) -> String {
            String::new()
        }

        fn destroy(&mut self) {
            assert!(!self.destroyed, "effect destroyed twice");
            self.destroyed = true;
            self.live.set(self.live.get() - 1);
        }
    }

    impl TextEffectFactory for CountingFactory {
        fn create(&self, _target: ElementId, _options: TypedOptions) -> Box<dyn TextEffect> {
            self.live.set(self.live.get() + 1);
            Box::new(CountingEffect {
                live: Rc::clone(&self.live),
                destroyed: false,
            })
        }
    }

    #[test]
    fn test_replace_keeps_one_live_effect() {
        let live = Rc::new(Cell::new(0));
        let mut slot = TextEffectSlot::new(Some(Box::new(CountingFactory {
            live: Rc::clone(&live),
        })));

        for phrase in ["one", "two", "three"] {
            assert!(slot.replace(ElementId(0), phrase, 0));
            assert_eq!(live.get(), 1);
        }
        assert_eq!(slot.phrase(), Some("three"));

        slot.teardown();
        assert_eq!(live.get(), 0);
        assert!(!slot.is_active());
    }

    #[test]
    fn test_drop_destroys_live_effect() {
        let live = Rc::new(Cell::new(0));
        {
            let mut slot = TextEffectSlot::new(Some(Box::new(CountingFactory {
                live: Rc::clone(&live),
            })));
            slot.replace(ElementId(0), "one", 0);
        }
        assert_eq!(live.get(), 0);
    }

    #[test]
    fn test_unavailable_library_is_skipped() {
        let mut slot = TextEffectSlot::new(None);
        assert!(!slot.replace(ElementId(0), "one", 0));
        assert!(!slot.is_active());
        assert!(slot.render(100).is_none());
    }

    #[test]
    fn test_render_uses_time_since_construction() {
        let mut slot = TextEffectSlot::new(Some(Box::new(TypewriterFactory)));
        slot.replace(ElementId(3), "ab", 1_000);
        assert_eq!(slot.render(1_050), Some((ElementId(3), "a|".to_string())));
    }
}

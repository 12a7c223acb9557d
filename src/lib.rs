//! Headless controller for the GVMI marketing site.
//!
//! The page is modeled as an element tree with a virtual clock. The core is
//! the language switch: persisted preference, translation of bound elements,
//! the hero typing effect and the switch notification.

pub mod config;
pub mod dom;
pub mod i18n;
pub mod markup;
pub mod preference;
pub mod site;
pub mod switcher;
pub mod text_effect;
pub mod timers;
pub mod ui;
pub mod widgets;

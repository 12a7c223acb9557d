//! Partner logo carousel.

use crate::dom::ElementId;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

pub const PARTNER_CAROUSEL_ID: &str = "partner-carousel";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    pub per_page: u32,
}

/// Options understood by the carousel library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselOptions {
    #[serde(rename = "type")]
    pub kind: String,
    pub per_page: u32,
    pub per_move: u32,
    pub autoplay: bool,
    /// Autoplay interval in milliseconds
    pub interval: u64,
    pub arrows: bool,
    pub pagination: bool,
    /// Viewport max-width → overrides
    pub breakpoints: BTreeMap<u32, Breakpoint>,
}

impl CarouselOptions {
    pub fn partners() -> Self {
        Self {
            kind: "loop".to_string(),
            per_page: 6,
            per_move: 1,
            autoplay: true,
            interval: 3000,
            arrows: false,
            pagination: false,
            breakpoints: BTreeMap::from([
                (768, Breakpoint { per_page: 3 }),
                (480, Breakpoint { per_page: 2 }),
            ]),
        }
    }

    /// Slides shown at a viewport width: the narrowest matching breakpoint wins.
    pub fn per_page_at(&self, viewport_width: u32) -> u32 {
        self.breakpoints
            .iter()
            .find(|(max_width, _)| viewport_width <= **max_width)
            .map(|(_, bp)| bp.per_page)
            .unwrap_or(self.per_page)
    }
}

/// The carousel library.
pub trait CarouselLibrary {
    fn mount(&mut self, target: ElementId, options: &CarouselOptions);
}

/// Carousel adapter for headless runs: records mounts in the log.
#[derive(Debug, Default)]
pub struct TracingCarousel {
    pub mounted: Vec<ElementId>,
}

impl CarouselLibrary for TracingCarousel {
    fn mount(&mut self, target: ElementId, options: &CarouselOptions) {
        let json = serde_json::to_string(options).unwrap_or_default();
        info!("Mounting carousel on {:?}: {}", target, json);
        self.mounted.push(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partner_options_serialize() {
        let json = serde_json::to_value(CarouselOptions::partners()).unwrap();
        assert_eq!(json["type"], "loop");
        assert_eq!(json["perPage"], 6);
        assert_eq!(json["arrows"], false);
        assert_eq!(json["breakpoints"]["768"]["perPage"], 3);
        assert_eq!(json["breakpoints"]["480"]["perPage"], 2);
    }

    #[test]
    fn test_per_page_at_breakpoints() {
        let options = CarouselOptions::partners();
        assert_eq!(options.per_page_at(1280), 6);
        assert_eq!(options.per_page_at(768), 3);
        assert_eq!(options.per_page_at(600), 3);
        assert_eq!(options.per_page_at(375), 2);
    }

    #[test]
    fn test_tracing_carousel_records_mount() {
        let mut carousel = TracingCarousel::default();
        carousel.mount(ElementId(4), &CarouselOptions::partners());
        assert_eq!(carousel.mounted, vec![ElementId(4)]);
    }
}

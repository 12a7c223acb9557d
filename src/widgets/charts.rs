//! Fleet and market charts, rendered through a pluggable chart library.

use crate::dom::{ElementId, Page};
use serde_json::{json, Value};
use tracing::{debug, info};

pub const FLEET_CHART_ID: &str = "fleet-composition-chart";
pub const TRENDS_CHART_ID: &str = "market-trends-chart";

const BRAND_BLUE: &str = "#1e3a8a";

/// The chart library.
pub trait ChartLibrary {
    fn render(&mut self, target: ElementId, option: &Value);
}

pub fn fleet_composition_option() -> Value {
    json!({
        "title": {"text": "Fleet Composition", "textStyle": {"color": BRAND_BLUE}},
        "tooltip": {"trigger": "item"},
        "series": [{
            "type": "pie",
            "radius": "70%",
            "data": [
                {"value": 120, "name": "Container Ships"},
                {"value": 80, "name": "Bulk Carriers"},
                {"value": 60, "name": "Tankers"},
                {"value": 40, "name": "LNG Carriers"}
            ],
            "emphasis": {
                "itemStyle": {
                    "shadowBlur": 10,
                    "shadowOffsetX": 0,
                    "shadowColor": "rgba(0, 0, 0, 0.5)"
                }
            }
        }]
    })
}

pub fn market_trends_option() -> Value {
    json!({
        "title": {"text": "Market Trends", "textStyle": {"color": BRAND_BLUE}},
        "tooltip": {"trigger": "axis"},
        "xAxis": {"type": "category", "data": ["2020", "2021", "2022", "2023", "2024"]},
        "yAxis": {"type": "value"},
        "series": [{
            "name": "Freight Rates",
            "type": "line",
            "data": [1200, 1800, 2400, 1600, 2000],
            "smooth": true,
            "lineStyle": {"color": BRAND_BLUE}
        }]
    })
}

/// Render every chart whose container is on the page. Returns how many were drawn.
pub fn init_charts(page: &Page, library: &mut dyn ChartLibrary) -> usize {
    let charts = [
        (FLEET_CHART_ID, fleet_composition_option as fn() -> Value),
        (TRENDS_CHART_ID, market_trends_option),
    ];

    let mut rendered = 0;
    for (id, option) in charts {
        match page.by_id(id) {
            Some(target) => {
                library.render(target, &option());
                rendered += 1;
            }
            None => debug!("No #{} on page, skipping chart", id),
        }
    }
    rendered
}

/// Chart adapter for headless runs: records renders in the log.
#[derive(Debug, Default)]
pub struct TracingCharts {
    pub rendered: Vec<(ElementId, String)>,
}

impl ChartLibrary for TracingCharts {
    fn render(&mut self, target: ElementId, option: &Value) {
        let title = option["title"]["text"].as_str().unwrap_or_default().to_string();
        info!("Rendering chart '{}' on {:?}", title, target);
        self.rendered.push((target, title));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Element;

    #[test]
    fn test_fleet_option_totals() {
        let option = fleet_composition_option();
        let total: u64 = option["series"][0]["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["value"].as_u64().unwrap())
            .sum();
        assert_eq!(total, 300);
        assert_eq!(option["series"][0]["type"], "pie");
    }

    #[test]
    fn test_trend_option_aligns_axes() {
        let option = market_trends_option();
        assert_eq!(
            option["xAxis"]["data"].as_array().unwrap().len(),
            option["series"][0]["data"].as_array().unwrap().len()
        );
    }

    #[test]
    fn test_init_charts_skips_missing_containers() {
        let mut page = Page::new();
        let trends = page.append(None, Element::new("div").with_id(TRENDS_CHART_ID));
        let mut charts = TracingCharts::default();

        assert_eq!(init_charts(&page, &mut charts), 1);
        assert_eq!(charts.rendered, vec![(trends, "Market Trends".to_string())]);
    }
}

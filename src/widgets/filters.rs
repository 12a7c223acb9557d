//! Static list filtering: the fleet gallery and the insights article list.

use crate::dom::{Display, ElementId, Page};

pub const FLEET_FILTER_CLASS: &str = "fleet-filter";
pub const FLEET_ITEM_CLASS: &str = "fleet-item";
pub const CATEGORY_FILTER_CLASS: &str = "category-filter";
pub const INSIGHT_ITEM_CLASS: &str = "insight-item";
pub const INSIGHT_TITLE_CLASS: &str = "insight-title";
pub const INSIGHTS_SEARCH_ID: &str = "insights-search";

const ACTIVE_CLASS: &str = "active";
const SHOW_ALL: &str = "all";

/// Make `selected` the only active button among those with `class`.
fn activate_exclusively(page: &mut Page, class: &str, selected: ElementId) {
    for id in page.by_class(class) {
        if let Some(button) = page.get_mut(id) {
            button.toggle_class(ACTIVE_CLASS, Some(id == selected));
        }
    }
}

/// Apply a fleet filter button. Returns the number of visible items.
pub fn apply_fleet_filter(page: &mut Page, button: ElementId) -> usize {
    let filter = page
        .get(button)
        .and_then(|b| b.attr("data-filter"))
        .map(str::to_string);
    activate_exclusively(page, FLEET_FILTER_CLASS, button);

    let mut visible = 0;
    for id in page.by_class(FLEET_ITEM_CLASS) {
        let Some(item) = page.get_mut(id) else {
            continue;
        };
        let show = filter.as_deref() == Some(SHOW_ALL)
            || item.attr("data-category") == filter.as_deref();

        if show {
            item.display = Display::Block;
            item.add_class("animate-fade-in");
            visible += 1;
        } else {
            item.display = Display::None;
        }
    }
    visible
}

/// Activate an insights category filter and re-filter the list.
pub fn select_insight_category(page: &mut Page, filter: ElementId) -> usize {
    activate_exclusively(page, CATEGORY_FILTER_CLASS, filter);
    filter_insights(page)
}

/// Show insights whose title contains the search term and whose category
/// matches the active category filter. Returns the number of visible items.
pub fn filter_insights(page: &mut Page) -> usize {
    let term = page
        .by_id(INSIGHTS_SEARCH_ID)
        .and_then(|id| page.get(id))
        .map(|input| input.value.to_lowercase())
        .unwrap_or_default();

    let category = page
        .select(|e| e.has_class(CATEGORY_FILTER_CLASS) && e.has_class(ACTIVE_CLASS))
        .first()
        .and_then(|id| page.get(*id))
        .and_then(|e| e.attr("data-category"))
        .unwrap_or(SHOW_ALL)
        .to_string();

    let mut visible = 0;
    for id in page.by_class(INSIGHT_ITEM_CLASS) {
        let title = page
            .find_within(id, |e| e.has_class(INSIGHT_TITLE_CLASS))
            .and_then(|t| page.text_of(t))
            .unwrap_or_default()
            .to_lowercase();

        let Some(item) = page.get_mut(id) else {
            continue;
        };
        let matches_search = title.contains(&term);
        let matches_category =
            category == SHOW_ALL || item.attr("data-category") == Some(category.as_str());

        if matches_search && matches_category {
            item.display = Display::Block;
            visible += 1;
        } else {
            item.display = Display::None;
        }
    }
    visible
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fleet_page() -> Page {
        Page::from_json_str(
            r#"{"body": [
                {"tag": "button", "class": "fleet-filter active", "attrs": {"data-filter": "all"}},
                {"tag": "button", "class": "fleet-filter", "attrs": {"data-filter": "container"}},
                {"tag": "div", "class": "fleet-item", "attrs": {"data-category": "container"}},
                {"tag": "div", "class": "fleet-item", "attrs": {"data-category": "tanker"}},
                {"tag": "div", "class": "fleet-item", "attrs": {"data-category": "container"}}
            ]}"#,
        )
        .unwrap()
    }

    fn insights_page() -> Page {
        Page::from_json_str(
            r#"{"body": [
                {"tag": "input", "id": "insights-search"},
                {"tag": "button", "class": "category-filter active", "attrs": {"data-category": "all"}},
                {"tag": "button", "class": "category-filter", "attrs": {"data-category": "market"}},
                {"tag": "article", "class": "insight-item", "attrs": {"data-category": "market"}, "children": [
                    {"tag": "h3", "class": "insight-title", "text": "Container Freight Outlook"}
                ]},
                {"tag": "article", "class": "insight-item", "attrs": {"data-category": "finance"}, "children": [
                    {"tag": "h3", "class": "insight-title", "text": "Green Ship Finance"}
                ]}
            ]}"#,
        )
        .unwrap()
    }

    fn displays(page: &Page, class: &str) -> Vec<Display> {
        page.by_class(class)
            .into_iter()
            .map(|id| page.get(id).unwrap().display)
            .collect()
    }

    // ==================== Fleet Tests ====================

    #[test]
    fn test_fleet_filter_by_category() {
        let mut page = fleet_page();
        let container = page.by_class(FLEET_FILTER_CLASS)[1];

        assert_eq!(apply_fleet_filter(&mut page, container), 2);
        assert_eq!(
            displays(&page, FLEET_ITEM_CLASS),
            [Display::Block, Display::None, Display::Block]
        );

        let active = page.select(|e| e.has_class(FLEET_FILTER_CLASS) && e.has_class("active"));
        assert_eq!(active, vec![container]);
    }

    #[test]
    fn test_fleet_filter_all() {
        let mut page = fleet_page();
        let all = page.by_class(FLEET_FILTER_CLASS)[0];

        assert_eq!(apply_fleet_filter(&mut page, all), 3);
        let item = page.by_class(FLEET_ITEM_CLASS)[1];
        assert!(page.get(item).unwrap().has_class("animate-fade-in"));
    }

    // ==================== Insights Tests ====================

    #[test]
    fn test_insights_search_is_case_insensitive() {
        let mut page = insights_page();
        let input = page.by_id(INSIGHTS_SEARCH_ID).unwrap();
        page.get_mut(input).unwrap().value = "FINANCE".to_string();

        assert_eq!(filter_insights(&mut page), 1);
        assert_eq!(
            displays(&page, INSIGHT_ITEM_CLASS),
            [Display::None, Display::Block]
        );
    }

    #[test]
    fn test_insights_category_and_search_combine() {
        let mut page = insights_page();
        let market = page.by_class(CATEGORY_FILTER_CLASS)[1];
        assert_eq!(select_insight_category(&mut page, market), 1);

        let input = page.by_id(INSIGHTS_SEARCH_ID).unwrap();
        page.get_mut(input).unwrap().value = "green".to_string();
        assert_eq!(filter_insights(&mut page), 0);
    }

    #[test]
    fn test_insights_without_search_box() {
        let mut page = insights_page();
        let input = page.by_id(INSIGHTS_SEARCH_ID).unwrap();
        page.remove(input);
        assert_eq!(filter_insights(&mut page), 2);
    }
}

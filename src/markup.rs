//! Markup handling for translated strings.
//!
//! Translated strings are injected either as rich markup or as plain text.
//! The choice is a heuristic: a string containing `<` or `&` is treated as
//! markup so that entities such as `&copy;` render. The heuristic cannot
//! tell a literal ampersand from an entity; `TranslationValidator` reports
//! strings where it is likely to misfire.

use regex::Regex;
use std::sync::OnceLock;

static ENTITY_REGEX: OnceLock<Regex> = OnceLock::new();
static TAG_REGEX: OnceLock<Regex> = OnceLock::new();

fn entity_regex() -> &'static Regex {
    ENTITY_REGEX.get_or_init(|| {
        Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").unwrap()
    })
}

fn tag_regex() -> &'static Regex {
    TAG_REGEX.get_or_init(|| Regex::new(r"<(?:/?[A-Za-z][^<>]*|!--[^>]*--)>").unwrap())
}

/// How a resolved translation is written into its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Injection {
    /// Interpreted as markup (tags and entities)
    Markup,
    /// Written verbatim as text
    PlainText,
}

impl Injection {
    pub fn classify(text: &str) -> Self {
        if text.contains('<') || text.contains('&') {
            Injection::Markup
        } else {
            Injection::PlainText
        }
    }
}

/// Text a reader sees for a markup fragment: tags removed, entities decoded.
pub fn render(markup: &str) -> String {
    decode_entities(&tag_regex().replace_all(markup, ""))
}

/// Decode character entities. Unknown named entities are left as written.
pub fn decode_entities(text: &str) -> String {
    entity_regex()
        .replace_all(text, |caps: &regex::Captures| {
            let body = &caps[1];
            decode_entity(body).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_entity(body: &str) -> Option<String> {
    if let Some(hex) = body
        .strip_prefix("#x")
        .or_else(|| body.strip_prefix("#X"))
    {
        return u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from);
    }
    if let Some(dec) = body.strip_prefix('#') {
        return dec.parse::<u32>().ok().and_then(char::from_u32).map(String::from);
    }

    let decoded = match body {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "copy" => "©",
        "reg" => "®",
        "trade" => "™",
        "mdash" => "—",
        "ndash" => "–",
        "hellip" => "…",
        "middot" => "·",
        _ => return None,
    };
    Some(decoded.to_string())
}

/// True when the text has an `&` that does not start a character entity.
pub fn has_bare_ampersand(text: &str) -> bool {
    text.matches('&').count() > entity_regex().find_iter(text).count()
}

/// True when the text has a `<` that does not start a tag or comment.
pub fn has_bare_angle_bracket(text: &str) -> bool {
    text.matches('<').count() > tag_regex().find_iter(text).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ==================== Classification Tests ====================

    #[test]
    fn test_classify_entity_is_markup() {
        assert_eq!(Injection::classify("&copy; 2024"), Injection::Markup);
    }

    #[test]
    fn test_classify_tag_is_markup() {
        assert_eq!(Injection::classify("<strong>Fleet</strong>"), Injection::Markup);
    }

    #[test]
    fn test_classify_plain_text() {
        assert_eq!(Injection::classify("Ship finance > 5%"), Injection::PlainText);
        assert_eq!(Injection::classify("你好"), Injection::PlainText);
    }

    #[test]
    fn test_classify_literal_ampersand_is_misrouted() {
        // Known limitation of the heuristic.
        assert_eq!(Injection::classify("R&D"), Injection::Markup);
    }

    // ==================== Rendering Tests ====================

    #[test]
    fn test_render_copyright_entity() {
        assert_eq!(render("&copy; 2024 GVMI"), "© 2024 GVMI");
    }

    #[test]
    fn test_render_strips_tags() {
        assert_eq!(render("Global <em>Vessel</em> Finance"), "Global Vessel Finance");
        assert_eq!(render("line<br/>break"), "linebreak");
    }

    #[test]
    fn test_render_numeric_entities() {
        assert_eq!(decode_entities("&#169; &#xA9;"), "© ©");
    }

    #[test]
    fn test_render_keeps_unknown_entities() {
        assert_eq!(decode_entities("&bogus; &amp;"), "&bogus; &");
    }

    #[test]
    fn test_render_keeps_lone_ampersand() {
        assert_eq!(render("R&D"), "R&D");
    }

    // ==================== Ambiguity Detection Tests ====================

    #[test]
    fn test_bare_ampersand_detection() {
        assert!(has_bare_ampersand("R&D"));
        assert!(has_bare_ampersand("&copy; R & D"));
        assert!(!has_bare_ampersand("&copy; 2024"));
        assert!(!has_bare_ampersand("no entities"));
    }

    #[test]
    fn test_bare_angle_detection() {
        assert!(has_bare_angle_bracket("x < 5"));
        assert!(!has_bare_angle_bracket("<b>bold</b>"));
        assert!(!has_bare_angle_bracket("plain"));
    }

    proptest! {
        #[test]
        fn prop_plain_strings_render_unchanged(text in "[a-zA-Z0-9 ,.!?>-]{0,40}") {
            prop_assert_eq!(Injection::classify(&text), Injection::PlainText);
            prop_assert_eq!(render(&text), text);
        }
    }
}

//! Field extraction from collection-page markup.
//!
//! Pure functions over the raw page text. Absence of a pattern is a
//! normal result — every function returns an empty string for "not
//! found" and never errors. The annotation extractor is a small tolerant
//! scanner over the escaped server-component payload embedded in the
//! page, not an HTML parser: the payload is serialized script text, so
//! bounded-window string scanning is the honest tool.

use regex::Regex;
use url::Url;

/// Image host prefix of the primary asset-URL pattern.
const IMAGE_HOST_PREFIX: &str = "https://images.metmuseum.org/CRDImages";

/// Size variant every matched asset URL is rewritten to, regardless of
/// which variant the page actually referenced.
const PREFERRED_VARIANT: &str = "web-large";

/// How far past a label occurrence the annotation scanner looks for a
/// payload before moving on to the next occurrence.
const ANNOTATION_WINDOW: usize = 2000;

/// Remove markup tags and trim surrounding whitespace.
pub fn strip_tags(text: &str) -> String {
    let tag_re = Regex::new(r"<[^>]+>").expect("tag regex is valid");
    tag_re.replace_all(text, "").trim().to_string()
}

/// Extract the curatorial description from the read-more wrapper.
///
/// Results opening with one of the configured boilerplate prefixes are
/// suppressed to empty — those are site-wide mission statements, not
/// object descriptions.
pub fn description(html: &str, boilerplate_prefixes: &[String]) -> String {
    let wrapper_re = Regex::new(
        r#"(?s)read-more-wrapper[^"]*__wrapper[^"]*"[^>]*>\s*<div>\s*<div>(.*?)</div>\s*</div>"#,
    )
    .expect("description regex is valid");

    let Some(caps) = wrapper_re.captures(html) else {
        return String::new();
    };
    let text = strip_tags(&caps[1]);
    if boilerplate_prefixes
        .iter()
        .any(|prefix| text.starts_with(prefix.as_str()))
    {
        return String::new();
    }
    text
}

/// Extract the annotation payload associated with a human-readable label
/// from the escaped server-component fragment.
///
/// Pages repeat a label without a payload, so every occurrence is tried:
/// label occurrence → bounded window → `__html` marker → `:\"` content
/// start → `\"}}` terminator → entity decode → tag strip. The first
/// decoded result longer than 2 characters wins.
pub fn annotation(html: &str, label: &str) -> String {
    // The label appears inside the payload with escaped quotes: \"Label\".
    let needle = format!("\\\"{label}\\\"");
    let mut from = 0;
    while let Some(found) = html[from..].find(&needle) {
        let start = from + found;
        let end = floor_char_boundary(html, (start + ANNOTATION_WINDOW).min(html.len()));
        if let Some(text) = payload_in_window(&html[start..end]) {
            return text;
        }
        from = start + 1;
    }
    String::new()
}

fn payload_in_window(window: &str) -> Option<String> {
    let marker = window.find("__html")?;
    let after = &window[marker..];
    let start = after.find(":\\\"")? + 3;
    let end = after[start..].find("\\\"}}")? + start;
    let text = strip_tags(&decode_escapes(&after[start..end]));
    if text.chars().count() > 2 {
        Some(text)
    } else {
        None
    }
}

/// Decode the escape sequences the payload is known to carry.
fn decode_escapes(raw: &str) -> String {
    raw.replace("\\u003c", "<")
        .replace("\\u003e", ">")
        .replace("\\u0026", "&")
        .replace("\\u0027", "'")
}

/// Find the object's asset URL in the page.
///
/// Primary pattern: image host / department code / size variant /
/// filename. Whatever variant matched, the returned URL is rebuilt with
/// the preferred high-resolution variant. Falls back to the `og:image`
/// meta tag when the primary pattern is absent.
pub fn image_url(html: &str) -> String {
    let primary_re = Regex::new(
        r#"https://images\.metmuseum\.org/CRDImages/([^/]+)/(?:original|web-additional|web-large)/([^"\\]+\.jpg)"#,
    )
    .expect("image url regex is valid");
    if let Some(caps) = primary_re.captures(html) {
        let department_code = &caps[1];
        let filename = &caps[2];
        return format!("{IMAGE_HOST_PREFIX}/{department_code}/{PREFERRED_VARIANT}/{filename}");
    }

    let meta_re = Regex::new(r#"og:image"\s+content="(https://collectionapi[^"]+)""#)
        .expect("og:image regex is valid");
    if let Some(caps) = meta_re.captures(html) {
        let candidate = &caps[1];
        if Url::parse(candidate).is_ok() {
            return candidate.to_string();
        }
    }
    String::new()
}

/// Largest char boundary at or below `index`.
fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boilerplate() -> Vec<String> {
        vec![
            "The Met presents over 5,000 years".to_string(),
            "The Metropolitan Museum of Art".to_string(),
        ]
    }

    #[test]
    fn test_description_strips_tags_and_trims() {
        let html = r#"<section class="read-more-wrapper read-more__wrapper" data-x="1">
            <div> <div> A <em>faience</em> scarab from Thebes. </div> </div>"#;
        assert_eq!(
            description(html, &boilerplate()),
            "A faience scarab from Thebes."
        );
    }

    #[test]
    fn test_description_absent_pattern_is_empty() {
        assert_eq!(description("<html><body>nothing here</body></html>", &boilerplate()), "");
    }

    #[test]
    fn test_description_boilerplate_suppressed() {
        let html = r#"<div class="read-more-wrapper x__wrapper y"><div><div>The Met presents over 5,000 years of art.</div></div>"#;
        assert_eq!(description(html, &boilerplate()), "");
        // The same text passes when the allow-list does not cover it.
        assert_eq!(
            description(html, &[]),
            "The Met presents over 5,000 years of art."
        );
    }

    #[test]
    fn test_annotation_decodes_payload() {
        let html = r#"pre {"title":\"Provenance\",stuff "__html\":\"\u003cp\u003eEx coll. Lord Carnarvon\u0027s estate\u003c/p\u003e\"}} post"#;
        assert_eq!(
            annotation(html, "Provenance"),
            "Ex coll. Lord Carnarvon's estate"
        );
    }

    #[test]
    fn test_annotation_skips_label_without_payload() {
        // First occurrence is a bare tab header with no payload; the
        // second carries the content.
        let html = concat!(
            r#"nav \"Provenance\" nav-end "#,
            r#"body {"tab":\"Provenance\",{"__html\":\"Purchased in Luxor, 1907\"}}"#,
        );
        assert_eq!(annotation(html, "Provenance"), "Purchased in Luxor, 1907");
    }

    #[test]
    fn test_annotation_rejects_short_payloads() {
        let html = r#"{"tab":\"Provenance\",{"__html\":\"ok\"}}"#;
        assert_eq!(annotation(html, "Provenance"), "");
    }

    #[test]
    fn test_annotation_missing_label_is_empty() {
        assert_eq!(annotation("no payload at all", "Provenance"), "");
    }

    #[test]
    fn test_image_url_rewrites_variant_to_web_large() {
        for variant in ["original", "web-additional", "web-large"] {
            let html = format!(
                r#"<img src="https://images.metmuseum.org/CRDImages/eg/{variant}/DP164638.jpg">"#
            );
            assert_eq!(
                image_url(&html),
                "https://images.metmuseum.org/CRDImages/eg/web-large/DP164638.jpg",
            );
        }
    }

    #[test]
    fn test_image_url_falls_back_to_og_meta() {
        let html = r#"<meta property="og:image" content="https://collectionapi.metmuseum.org/api/collection/v1/iiif/544320/main-image">"#;
        assert_eq!(
            image_url(html),
            "https://collectionapi.metmuseum.org/api/collection/v1/iiif/544320/main-image",
        );
    }

    #[test]
    fn test_image_url_no_match_is_empty() {
        assert_eq!(image_url("<html>no images</html>"), "");
    }

    #[test]
    fn test_annotation_window_respects_char_boundaries() {
        // Multibyte text straddling the window edge must not panic.
        let mut html = format!("{}{}", r#"\"Provenance\""#, "é".repeat(ANNOTATION_WINDOW));
        html.push_str(r#"{"__html\":\"too far away to count\"}}"#);
        assert_eq!(annotation(&html, "Provenance"), "");
    }
}

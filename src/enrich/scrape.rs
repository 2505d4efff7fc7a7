//! Pull a short description out of an organization's home page

use once_cell::sync::Lazy;
use regex::Regex;

const MAX_CHARS: usize = 500;
const MIN_ABOUT_CHARS: usize = 50;
const MIN_PARAGRAPH_CHARS: usize = 100;
const PARAGRAPHS_SCANNED: usize = 5;
const ABOUT_KEYWORDS: &[&str] = &["about", "mission", "who we are", "what we do", "overview"];
const NOISE_WORDS: &[&str] = &["cookie", "privacy", "copyright"];

static NOISE_BLOCKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)<script\b.*?</script>|<style\b.*?</style>|<nav\b.*?</nav>|<footer\b.*?</footer>|<header\b.*?</header>",
    )
    .expect("Invalid regex pattern")
});

static META_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("Invalid regex pattern"));

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)([a-z:_-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("Invalid regex pattern")
});

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<h[1-3]\b[^>]*>(.*?)</h[1-3]>").expect("Invalid regex pattern"));

static PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<p\b[^>]*>(.*?)</p>").expect("Invalid regex pattern"));

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid regex pattern"));

/// Render an HTML fragment as a single line of text
fn fragment_text(fragment: &str) -> String {
    let text = html2text::from_read(fragment.as_bytes(), 10_000).unwrap_or_default();
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

fn meta_content(html: &str, key: &str, value: &str) -> Option<String> {
    META_TAG.find_iter(html).find_map(|tag| {
        let mut matches_key = false;
        let mut content = None;
        for cap in ATTRIBUTE.captures_iter(tag.as_str()) {
            let name = cap[1].to_ascii_lowercase();
            let val = cap.get(2).or_else(|| cap.get(3)).map_or("", |m| m.as_str());
            if name == key && val.eq_ignore_ascii_case(value) {
                matches_key = true;
            } else if name == "content" {
                content = Some(val.to_string());
            }
        }
        if matches_key {
            content.map(|c| fragment_text(&c)).filter(|c| !c.is_empty())
        } else {
            None
        }
    })
}

/// First paragraph following an about-style heading
fn about_paragraph(html: &str) -> Option<String> {
    for keyword in ABOUT_KEYWORDS {
        let heading = HEADING
            .captures_iter(html)
            .find(|cap| fragment_text(&cap[1]).to_lowercase().contains(keyword));
        let Some(heading) = heading else {
            continue;
        };
        let end = heading.get(0).map_or(0, |m| m.end());
        if let Some(p) = PARAGRAPH.captures(&html[end..]) {
            let text = fragment_text(&p[1]);
            if text.chars().count() > MIN_ABOUT_CHARS {
                return Some(text);
            }
        }
    }
    None
}

/// Long paragraphs near the top of the page that are not legal boilerplate
fn content_paragraphs(html: &str) -> Vec<String> {
    PARAGRAPH
        .captures_iter(html)
        .take(PARAGRAPHS_SCANNED)
        .map(|cap| fragment_text(&cap[1]))
        .filter(|text| {
            let lower = text.to_lowercase();
            text.chars().count() > MIN_PARAGRAPH_CHARS
                && !NOISE_WORDS.iter().any(|w| lower.contains(w))
        })
        .collect()
}

fn push_unique(parts: &mut Vec<String>, text: String) {
    if !text.is_empty() && !parts.contains(&text) {
        parts.push(text);
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max - 3).collect();
    format!("{}...", kept)
}

/// Description from meta tags, an about section, or leading paragraphs
///
/// At most two distinct pieces are joined and the result is capped at
/// 500 characters.
pub fn extract_site_description(html: &str) -> Option<String> {
    let html = NOISE_BLOCKS.replace_all(html, " ");
    let mut parts: Vec<String> = Vec::new();

    if let Some(desc) = meta_content(&html, "name", "description") {
        push_unique(&mut parts, desc);
    }
    if let Some(desc) = meta_content(&html, "property", "og:description") {
        push_unique(&mut parts, desc);
    }
    if let Some(about) = about_paragraph(&html) {
        push_unique(&mut parts, about);
    }
    if parts.is_empty() {
        for text in content_paragraphs(&html) {
            push_unique(&mut parts, text);
            if parts.len() >= 2 {
                break;
            }
        }
    }

    if parts.is_empty() {
        return None;
    }
    parts.truncate(2);
    Some(truncate_chars(&parts.join(" "), MAX_CHARS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_descriptions_in_any_attribute_order() {
        let html = r#"<html><head>
            <meta content="Seed fund for fintech." name="description">
            <meta property='og:description' content='Backing payments founders &amp; operators.'>
            </head><body><p>short</p></body></html>"#;

        assert_eq!(
            extract_site_description(html).as_deref(),
            Some("Seed fund for fintech. Backing payments founders & operators.")
        );
    }

    #[test]
    fn test_duplicate_meta_is_not_repeated() {
        let html = r#"<meta name="description" content="Same text">
            <meta property="og:description" content="Same text">"#;
        assert_eq!(extract_site_description(html).as_deref(), Some("Same text"));
    }

    #[test]
    fn test_about_heading_paragraph() {
        let html = r#"<body>
            <header><p>Navigation text that should never be used for anything at all here.</p></header>
            <h2>About Us</h2>
            <p>We partner with founders building the next generation of commerce infrastructure.</p>
            </body>"#;
        let text = extract_site_description(html).unwrap();
        assert!(text.starts_with("We partner with founders"));
    }

    #[test]
    fn test_long_paragraph_fallback_skips_noise() {
        let noise = format!("We use cookies to improve your experience. {}", "x".repeat(120));
        let real = format!("Gamma Ventures backs technical founders. {}", "y".repeat(120));
        let html = format!("<p>{}</p><p>{}</p>", noise, real);

        let text = extract_site_description(&html).unwrap();
        assert!(text.starts_with("Gamma Ventures backs technical founders."));
    }

    #[test]
    fn test_caps_length() {
        let long = "z".repeat(800);
        let html = format!(r#"<meta name="description" content="{}">"#, long);
        let text = extract_site_description(&html).unwrap();
        assert_eq!(text.chars().count(), 500);
        assert!(text.ends_with("..."));
    }

    #[test]
    fn test_nothing_useful() {
        assert_eq!(extract_site_description("<p>tiny</p>"), None);
        assert_eq!(extract_site_description(""), None);
    }
}

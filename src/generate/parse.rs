//! Recover a subject and body from model output
//!
//! JSON is preferred. Anything else goes through a `Subject:` line parser,
//! and text with no subject line at all is kept whole as the body.

use super::GeneratedEmail;
use crate::compose::strip_tags;
use crate::error::{common, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// Subject used when the output does not carry one
pub const DEFAULT_SUBJECT: &str = "Exploring Partnership Opportunities";

const SUBJECT_PREFIX: &str = "subject:";

static FOUNDER_NOTE_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bfounder note(?: and next steps)?:\s*").expect("Invalid regex pattern")
});

static EXCESS_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("Invalid regex pattern"));

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```[a-zA-Z]*\s*(.*?)\s*```$").expect("Invalid regex pattern")
});

fn value_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn parse_json(raw: &str) -> Option<(String, String)> {
    let trimmed = raw.trim();
    let unfenced = CODE_FENCE
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map_or(trimmed, |m| m.as_str());

    match serde_json::from_str::<Value>(unfenced) {
        Ok(Value::Object(obj)) => Some((
            value_text(obj.get("subject")),
            value_text(obj.get("body")),
        )),
        _ => None,
    }
}

fn parse_subject_line(raw: &str) -> (String, String) {
    let mut subject = None;
    let mut body_lines = Vec::new();

    for line in raw.lines() {
        let trimmed = line.trim_start();
        if subject.is_none() && trimmed.to_lowercase().starts_with(SUBJECT_PREFIX) {
            subject = Some(trimmed.get(SUBJECT_PREFIX.len()..).unwrap_or_default().trim().to_string());
        } else if subject.is_some() && !line.trim().is_empty() {
            body_lines.push(line);
        }
    }

    match subject {
        Some(subject) => (subject, strip_tags(&body_lines.join("\n")).trim().to_string()),
        None => (String::new(), strip_tags(raw).trim().to_string()),
    }
}

/// Cut trailing instruction fragments and drop blank lines
fn trim_body(body: &str) -> String {
    let mut kept = Vec::new();
    for line in body.lines() {
        let low = line.trim().to_lowercase();
        if low.contains("founder note") || low.starts_with("resources") || low.starts_with("remember:")
        {
            break;
        }
        if !low.is_empty() {
            kept.push(line.trim());
        }
    }
    kept.join("\n")
}

/// Rewrite third-person references to the sender into first person
///
/// Also strips "Founder note:" headings and collapses runs of blank lines.
pub fn fix_self_references(text: &str, sender_name: &str) -> String {
    let mut s = FOUNDER_NOTE_HEADING.replace_all(text, "").into_owned();

    let full = sender_name.trim();
    let first = full.split_whitespace().next().unwrap_or_default();
    let mut names = vec![full];
    if first != full {
        names.push(first);
    }

    for name in names.into_iter().filter(|n| !n.is_empty()) {
        let escaped = regex::escape(name);
        for (verb, replacement) in [("is", "I am"), ("would", "I would"), ("can", "I can")] {
            let pattern = format!(r"(?i)\b{}\s+{}\b", escaped, verb);
            if let Ok(re) = Regex::new(&pattern) {
                s = re.replace_all(&s, replacement).into_owned();
            }
        }
    }

    EXCESS_NEWLINES.replace_all(&s, "\n\n").trim().to_string()
}

/// Turn raw model output into a subject and body
///
/// Fails only when no body text survives parsing and cleanup.
pub fn parse_generated(raw: &str, sender_name: &str) -> Result<GeneratedEmail> {
    let (subject, body) = match parse_json(raw) {
        Some(parsed) => parsed,
        None => {
            debug!("Output is not a JSON object, falling back to text parsing");
            parse_subject_line(raw)
        }
    };

    let body = fix_self_references(&trim_body(&body), sender_name);
    if body.is_empty() {
        return Err(common::unparseable_generation(raw));
    }

    let subject = if subject.trim().is_empty() {
        DEFAULT_SUBJECT.to_string()
    } else {
        subject.trim().to_string()
    };

    Ok(GeneratedEmail { subject, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    const SENDER: &str = "Krishna Patel";

    #[test]
    fn test_parses_json_object() {
        let raw = r#"{"subject": " Payments at AME ", "body": "Hi Jerry,\n\nI built PortalPay.\n\nBest"}"#;
        let email = parse_generated(raw, SENDER).unwrap();
        assert_eq!(email.subject, "Payments at AME");
        assert_eq!(email.body, "Hi Jerry,\nI built PortalPay.\nBest");
    }

    #[test]
    fn test_parses_fenced_json() {
        let raw = "```json\n{\"subject\": \"S\", \"body\": \"B\"}\n```";
        let email = parse_generated(raw, SENDER).unwrap();
        assert_eq!(email.subject, "S");
        assert_eq!(email.body, "B");
    }

    #[test]
    fn test_json_without_subject_uses_default() {
        let email = parse_generated(r#"{"body": "Hello there"}"#, SENDER).unwrap();
        assert_eq!(email.subject, DEFAULT_SUBJECT);
    }

    #[test]
    fn test_subject_line_fallback() {
        let raw = "Sure! Here it is.\nSUBJECT: Quick intro\n\n<p>Hi Ann,</p>\n\nI think we fit.\n";
        let email = parse_generated(raw, SENDER).unwrap();
        assert_eq!(email.subject, "Quick intro");
        assert_eq!(email.body, "Hi Ann,\nI think we fit.");
    }

    #[test]
    fn test_plain_text_without_subject() {
        let raw = "Hello <b>team</b>,\nWe should talk.";
        let email = parse_generated(raw, SENDER).unwrap();
        assert_eq!(email.subject, DEFAULT_SUBJECT);
        assert_eq!(email.body, "Hello team,\nWe should talk.");
    }

    #[test]
    fn test_body_is_cut_at_instruction_fragments() {
        let raw = r#"{"subject": "S", "body": "Para one.\nPara two.\nResources:\n- link\nmore"}"#;
        assert_eq!(parse_generated(raw, SENDER).unwrap().body, "Para one.\nPara two.");

        let raw = r#"{"subject": "S", "body": "Para one.\nRemember: be brief"}"#;
        assert_eq!(parse_generated(raw, SENDER).unwrap().body, "Para one.");
    }

    #[test]
    fn test_empty_output_is_unparseable() {
        let err = parse_generated("   ", SENDER).unwrap_err();
        assert_eq!(err.code(), ErrorCode::GENERATION_UNPARSEABLE);

        let err = parse_generated(r#"{"subject": "Only subject"}"#, SENDER).unwrap_err();
        assert_eq!(err.code(), ErrorCode::GENERATION_UNPARSEABLE);
    }

    #[test]
    fn test_fix_self_references() {
        let text = "Krishna Patel is building this. Krishna would love to talk, and krishna can demo.";
        assert_eq!(
            fix_self_references(text, SENDER),
            "I am building this. I would love to talk, and I can demo."
        );

        let text = "Founder note and next steps: let's meet.\n\n\n\nThanks";
        assert_eq!(fix_self_references(text, SENDER), "let's meet.\n\nThanks");
    }
}

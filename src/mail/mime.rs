//! RFC 822 `multipart/alternative` assembly

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;

const LINE_LEN: usize = 76;

/// Encode a header value as an RFC 2047 word when it is not plain ASCII
pub fn encode_header(value: &str) -> String {
    if value.is_ascii() && !value.contains(['\r', '\n']) {
        value.to_string()
    } else {
        let clean: String = value.chars().filter(|c| *c != '\r' && *c != '\n').collect();
        format!("=?UTF-8?B?{}?=", STANDARD.encode(clean.as_bytes()))
    }
}

fn base64_lines(content: &str) -> String {
    let encoded = STANDARD.encode(content.as_bytes());
    let mut out = String::with_capacity(encoded.len() + encoded.len() / LINE_LEN * 2);
    for chunk in encoded.as_bytes().chunks(LINE_LEN) {
        // Base64 output is ASCII.
        out.push_str(&String::from_utf8_lossy(chunk));
        out.push_str("\r\n");
    }
    out
}

fn part(content_type: &str, content: &str) -> String {
    format!(
        "Content-Type: {}; charset=\"utf-8\"\r\nContent-Transfer-Encoding: base64\r\n\r\n{}",
        content_type,
        base64_lines(content)
    )
}

/// Build a two-part message, plain text first and HTML preferred
pub fn build_mime(to: &str, subject: &str, text: &str, html: &str, boundary: &str) -> String {
    format!(
        "MIME-Version: 1.0\r\n\
         To: {to}\r\n\
         Subject: {subject}\r\n\
         Content-Type: multipart/alternative; boundary=\"{boundary}\"\r\n\
         \r\n\
         --{boundary}\r\n\
         {plain}\
         --{boundary}\r\n\
         {html}\
         --{boundary}--\r\n",
        to = encode_header(to),
        subject = encode_header(subject),
        boundary = boundary,
        plain = part("text/plain", text),
        html = part("text/html", html),
    )
}

/// Gmail's `raw` field: URL-safe base64 without padding
pub fn encode_raw(mime: &str) -> String {
    URL_SAFE_NO_PAD.encode(mime.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_header() {
        assert_eq!(encode_header("Quick intro"), "Quick intro");
        assert_eq!(encode_header("Café ☕"), format!("=?UTF-8?B?{}?=", STANDARD.encode("Café ☕")));
        assert_eq!(
            encode_header("Hi\r\nBcc: x@y.com"),
            format!("=?UTF-8?B?{}?=", STANDARD.encode("HiBcc: x@y.com"))
        );
    }

    #[test]
    fn test_build_mime_structure() {
        let mime = build_mime("a@x.com", "Hello", "plain body", "<p>html body</p>", "=_b1");

        assert!(mime.starts_with("MIME-Version: 1.0\r\nTo: a@x.com\r\nSubject: Hello\r\n"));
        assert!(mime.contains("Content-Type: multipart/alternative; boundary=\"=_b1\""));
        let plain = mime.find("text/plain").unwrap();
        let html = mime.find("text/html").unwrap();
        assert!(plain < html);
        assert!(mime.contains(&STANDARD.encode("plain body")));
        assert!(mime.ends_with("--=_b1--\r\n"));
        assert_eq!(mime.matches("--=_b1\r\n").count(), 2);
    }

    #[test]
    fn test_long_bodies_wrap() {
        let mime = build_mime("a@x.com", "S", &"x".repeat(500), "", "=_b");
        assert!(mime.lines().all(|l| l.len() <= 78));
    }

    #[test]
    fn test_encode_raw_is_url_safe() {
        let raw = encode_raw("subject: ??>>\r\n");
        assert!(!raw.contains('+') && !raw.contains('/') && !raw.contains('='));
        assert_eq!(URL_SAFE_NO_PAD.decode(&raw).unwrap(), b"subject: ??>>\r\n");
    }
}

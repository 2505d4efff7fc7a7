//! Final message assembly
//!
//! The generated body is wrapped in a fixed HTML layout, followed by the
//! signature block and the legal footer. Every message also carries a
//! tracking marker that depends only on the recipient's address; the
//! footer prints it as a `Ref:` line so it survives without any links.

use crate::config::{CompanyConfig, LinksConfig, OutreachConfig, SenderConfig};
use crate::contacts::{normalize_email, Contact};
use crate::error::Result;
use crate::generate::GeneratedEmail;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tera::{Context, Tera};
use tracing::warn;

mod templates;

/// Hex characters kept from the address hash
pub const MARKER_LEN: usize = 12;

/// Campaign name stamped on every tagged link
pub const CAMPAIGN: &str = "outreach";

pub const UNSUBSCRIBE_TEXT: &str =
    "To unsubscribe from future emails, please reply with \"UNSUBSCRIBE\" in the subject line.";

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^<]+?>").expect("Invalid regex pattern"));

/// Remove anything that looks like a markup tag
pub fn strip_tags(text: &str) -> String {
    TAG.replace_all(text, "").into_owned()
}

/// Stable per-recipient marker: the first 12 hex chars of SHA-256(normalized email)
pub fn tracking_marker(email: &str) -> String {
    let digest = Sha256::digest(normalize_email(email).as_bytes());
    let mut hex = format!("{:x}", digest);
    hex.truncate(MARKER_LEN);
    hex
}

/// Append campaign parameters to a link; empty links stay empty
pub fn tag_link(link: &str, marker: &str) -> String {
    let link = link.trim();
    if link.is_empty() {
        return String::new();
    }
    let sep = if link.contains('?') { '&' } else { '?' };
    format!(
        "{}{}utm_source=vcoutreach&utm_medium=email&utm_campaign={}&utm_id={}",
        link, sep, CAMPAIGN, marker
    )
}

/// Escape a URL for use inside a double-quoted attribute
fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Insert `fragment` before the last `</body>`, else the last `</html>`, else append
pub fn insert_before_close(html: &str, fragment: &str) -> String {
    let lower = html.to_ascii_lowercase();
    let idx = lower.rfind("</body>").or_else(|| lower.rfind("</html>"));
    match idx {
        Some(i) => format!("{}{}{}", &html[..i], fragment, &html[i..]),
        None => format!("{}{}", html, fragment),
    }
}

/// Plain-text alternative for an HTML message
pub fn to_plain_text(html: &str) -> String {
    match html2text::from_read(html.as_bytes(), 78) {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!("Could not render plain text part: {}", e);
            strip_tags(html).trim().to_string()
        }
    }
}

/// A fully assembled message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessage {
    pub subject: String,
    pub html: String,
    pub text: String,
    pub marker: String,
}

#[derive(Serialize)]
struct Resource {
    label: String,
    url: String,
    color: &'static str,
}

/// Assembles messages from generated text and fixed layout pieces
pub struct MessageComposer {
    tera: Tera,
    links: LinksConfig,
    company: CompanyConfig,
    sender: SenderConfig,
}

impl MessageComposer {
    pub fn new(config: &OutreachConfig) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (templates::MESSAGE, templates::MESSAGE_HTML),
            (templates::SIGNATURE, templates::SIGNATURE_HTML),
            (templates::FOOTER, templates::FOOTER_HTML),
            (templates::PIXEL, templates::PIXEL_HTML),
        ])?;

        Ok(Self {
            tera,
            links: config.links.clone(),
            company: config.company.clone(),
            sender: config.sender.clone(),
        })
    }

    fn resources(&self, marker: &str) -> Vec<Resource> {
        let entries = [
            (
                format!("Explore {}", self.sender.product_name),
                &self.links.product,
                "#f54029",
            ),
            ("Book a Call".to_string(), &self.links.calendar, "#1e3a8a"),
            (
                "View Investor Portal".to_string(),
                &self.links.investor_portal,
                "#0f766e",
            ),
            ("Access Data Room".to_string(), &self.links.data_room, "#065f46"),
        ];

        entries
            .into_iter()
            .filter(|(_, link, _)| !link.trim().is_empty())
            .map(|(label, link, color)| Resource {
                label,
                url: escape_attr(&tag_link(link, marker)),
                color,
            })
            .collect()
    }

    fn pixel_src(&self, contact: &Contact, subject: &str, marker: &str) -> Option<String> {
        let base = self.links.tracking_pixel.trim();
        if base.is_empty() {
            return None;
        }
        let mut url = match url::Url::parse(base) {
            Ok(url) => url,
            Err(e) => {
                warn!("Ignoring invalid tracking pixel URL {:?}: {}", base, e);
                return None;
            }
        };
        url.query_pairs_mut()
            .append_pair("utm_id", marker)
            .append_pair("email", &contact.email)
            .append_pair("name", &contact.name)
            .append_pair("firm", &contact.firm)
            .append_pair("subject", subject)
            .append_pair("campaign", CAMPAIGN);
        Some(escape_attr(url.as_str()))
    }

    /// Build the HTML and plain-text parts for one contact
    pub fn compose(&self, contact: &Contact, email: &GeneratedEmail) -> Result<ComposedMessage> {
        let marker = tracking_marker(&contact.email);
        let paragraphs: Vec<&str> = email
            .body
            .lines()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        let mut context = Context::new();
        context.insert("paragraphs", &paragraphs);
        context.insert("resources", &self.resources(&marker));
        context.insert("sender", &self.sender);
        context.insert("company", &self.company);
        context.insert("unsubscribe", UNSUBSCRIBE_TEXT);
        context.insert("marker", &marker);

        let mut html = self.tera.render(templates::MESSAGE, &context)?;
        html = insert_before_close(&html, &self.tera.render(templates::SIGNATURE, &context)?);
        html = insert_before_close(&html, &self.tera.render(templates::FOOTER, &context)?);

        if let Some(src) = self.pixel_src(contact, &email.subject, &marker) {
            context.insert("src", &src);
            html = insert_before_close(&html, &self.tera.render(templates::PIXEL, &context)?);
        }

        Ok(ComposedMessage {
            subject: email.subject.clone(),
            text: to_plain_text(&html),
            html,
            marker,
        })
    }
}

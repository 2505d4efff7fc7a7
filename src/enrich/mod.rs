//! Best-effort organization lookup
//!
//! Enrichment never fails a contact. Whatever goes wrong, the runner ends up
//! with either a short description or `"organization at {domain}"`.

use crate::contacts::Contact;
use crate::error::{ErrorCode, OutreachError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub mod scrape;

pub use scrape::extract_site_description;

const INSTANT_ANSWER_URL: &str = "https://api.duckduckgo.com/";
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko)";
const MAX_PARTS: usize = 2;

/// Source of a free-text description of a contact's organization
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Look up a description; `Ok(None)` when nothing was found
    async fn describe(&self, contact: &Contact) -> Result<Option<String>>;
}

/// Deterministic stand-in used whenever a lookup comes back empty or fails
pub fn fallback_description(domain: &str) -> String {
    format!("organization at {}", domain)
}

/// Run the enricher and substitute the fallback on any failure
pub async fn enrich_or_fallback(enricher: &dyn Enricher, contact: &Contact) -> String {
    match enricher.describe(contact).await {
        Ok(Some(text)) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            debug!("No description found for {}", contact.domain());
            fallback_description(contact.domain())
        }
        Err(e) => {
            warn!("Lookup failed for {}: {}", contact.domain(), e);
            fallback_description(contact.domain())
        }
    }
}

/// Heuristic: a short phrase where every word is capitalized is probably a person
///
/// Contact sheets often repeat the contact's own name in the firm column.
pub fn looks_like_person_name(text: &str) -> bool {
    let words: Vec<&str> = text.split_whitespace().collect();
    !words.is_empty()
        && words.len() <= 3
        && words
            .iter()
            .all(|w| w.chars().next().is_some_and(char::is_uppercase))
}

/// First label of a domain, e.g. `amecloudventures` for `amecloudventures.com`
pub fn domain_label(domain: &str) -> &str {
    domain.split('.').next().unwrap_or_default()
}

/// Query used for the instant-answer lookup, or `None` when there is nothing to search for
pub fn build_search_query(contact: &Contact) -> Option<String> {
    let firm = contact.firm.trim();
    let label = domain_label(contact.domain());
    let firm_usable = !firm.is_empty() && !firm.eq_ignore_ascii_case("nan");

    let query = if firm_usable && !looks_like_person_name(firm) {
        format!("{} venture capital", firm)
    } else if !label.is_empty() {
        format!("{} venture capital", label)
    } else {
        contact.domain().to_string()
    };

    (!query.is_empty()).then_some(query)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    abstract_text: String,
    #[serde(default, rename = "Abstract")]
    abstract_: String,
    #[serde(default)]
    related_topics: Vec<serde_json::Value>,
}

impl InstantAnswer {
    /// Description fragments in preference order
    fn parts(&self) -> Vec<String> {
        let mut parts = Vec::new();
        if !self.abstract_text.trim().is_empty() {
            parts.push(self.abstract_text.trim().to_string());
        }
        if !self.abstract_.trim().is_empty() && self.abstract_ != self.abstract_text {
            parts.push(self.abstract_.trim().to_string());
        }
        // Topic groups have no Text field and are skipped.
        parts.extend(
            self.related_topics
                .iter()
                .take(2)
                .filter_map(|t| t.get("Text").and_then(|v| v.as_str()))
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from),
        );
        parts
    }
}

/// Parse an instant-answer JSON payload into description fragments
pub fn parse_instant_answer(body: &str) -> Result<Vec<String>> {
    let answer: InstantAnswer = serde_json::from_str(body).map_err(|e| {
        OutreachError::enrichment_with_code(ErrorCode::ENRICH_REQUEST_FAILED, "Unreadable answer")
            .with_source(e)
    })?;
    Ok(answer.parts())
}

/// Enricher backed by a public instant-answer API with a website scrape fallback
pub struct WebEnricher {
    client: Client,
    instant_answer_url: String,
    scrape_sites: bool,
}

impl WebEnricher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                OutreachError::enrichment("Failed to create HTTP client").with_source(e)
            })?;

        Ok(Self {
            client,
            instant_answer_url: INSTANT_ANSWER_URL.to_string(),
            scrape_sites: true,
        })
    }

    /// Point the instant-answer lookup at another endpoint
    pub fn with_instant_answer_url(mut self, url: impl Into<String>) -> Self {
        self.instant_answer_url = url.into();
        self
    }

    /// Disable the website scrape fallback
    pub fn without_scrape(mut self) -> Self {
        self.scrape_sites = false;
        self
    }

    async fn instant_answer(&self, query: &str) -> Result<Vec<String>> {
        let url = url::Url::parse_with_params(
            &self.instant_answer_url,
            &[("q", query), ("format", "json")],
        )
        .map_err(|e| OutreachError::enrichment("Bad instant-answer URL").with_source(e))?;

        let response = self.client.get(url).send().await.map_err(|e| {
            OutreachError::enrichment_with_code(ErrorCode::ENRICH_REQUEST_FAILED, "Lookup failed")
                .with_source(e)
        })?;

        if response.status() != StatusCode::OK {
            return Err(OutreachError::enrichment_with_code(
                ErrorCode::ENRICH_REQUEST_FAILED,
                format!("Lookup returned {}", response.status()),
            ));
        }

        let body = response.text().await.map_err(|e| {
            OutreachError::enrichment_with_code(ErrorCode::ENRICH_REQUEST_FAILED, "Lookup failed")
                .with_source(e)
        })?;
        parse_instant_answer(&body)
    }

    async fn scrape(&self, url: &str) -> Option<String> {
        debug!("Scraping {}", url);
        let response = match self.client.get(url).send().await {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                debug!("{} returned {}", url, r.status());
                return None;
            }
            Err(e) => {
                debug!("{} unreachable: {}", url, e);
                return None;
            }
        };

        let html = response.text().await.ok()?;
        extract_site_description(&html)
    }

    async fn scrape_domain(&self, domain: &str) -> Option<String> {
        let candidates = [
            format!("https://{}", domain),
            format!("http://{}", domain),
            format!("https://www.{}", domain),
            format!("http://www.{}", domain),
        ];

        for url in &candidates {
            if let Some(text) = self.scrape(url).await {
                return Some(text);
            }
        }
        None
    }
}

#[async_trait]
impl Enricher for WebEnricher {
    async fn describe(&self, contact: &Contact) -> Result<Option<String>> {
        let Some(query) = build_search_query(contact) else {
            return Ok(None);
        };
        let domain = contact.domain();
        let label = domain_label(domain);
        debug!("Search query: {:?} (domain {:?})", query, domain);

        let mut parts = match self.instant_answer(&query).await {
            Ok(parts) => parts,
            Err(e) => {
                debug!("Instant answer for {:?} failed: {}", query, e);
                Vec::new()
            }
        };

        if parts.is_empty() && !label.is_empty() {
            debug!("Retrying lookup with {:?}", label);
            if let Ok(alt) = self.instant_answer(label).await {
                parts.extend(alt.into_iter().take(1));
            }
        }

        if parts.is_empty() && self.scrape_sites && !domain.is_empty() {
            if let Some(text) = self.scrape_domain(domain).await {
                parts.push(text);
            }
        }

        if parts.is_empty() {
            return Ok(None);
        }
        parts.truncate(MAX_PARTS);
        Ok(Some(parts.join(" ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(email: &str, firm: &str) -> Contact {
        let mut c = Contact::with_email(email);
        c.firm = firm.to_string();
        c
    }

    struct Failing;

    #[async_trait]
    impl Enricher for Failing {
        async fn describe(&self, _contact: &Contact) -> Result<Option<String>> {
            Err(OutreachError::enrichment("network down"))
        }
    }

    struct Empty;

    #[async_trait]
    impl Enricher for Empty {
        async fn describe(&self, _contact: &Contact) -> Result<Option<String>> {
            Ok(Some("   ".to_string()))
        }
    }

    #[test]
    fn test_looks_like_person_name() {
        assert!(looks_like_person_name("Jerry Yang"));
        assert!(looks_like_person_name("Mary Ann Smith"));
        assert!(!looks_like_person_name("AME Cloud Ventures Fund II"));
        assert!(!looks_like_person_name("ame cloud"));
        assert!(!looks_like_person_name(""));
    }

    #[test]
    fn test_build_search_query() {
        assert_eq!(
            build_search_query(&contact("a@amecloudventures.com", "Jerry Yang")).as_deref(),
            Some("amecloudventures venture capital")
        );
        assert_eq!(
            build_search_query(&contact("a@amecloudventures.com", "nan")).as_deref(),
            Some("amecloudventures venture capital")
        );
        assert_eq!(
            build_search_query(&contact("a@x.com", "a16z growth fund")).as_deref(),
            Some("a16z growth fund venture capital")
        );
        assert_eq!(build_search_query(&contact("nobody", "")), None);
    }

    #[test]
    fn test_parse_instant_answer() {
        let body = r#"{
            "AbstractText": "Alpha invests early.",
            "Abstract": "Alpha invests early.",
            "RelatedTopics": [
                {"Text": "Alpha Fund I"},
                {"Name": "Group", "Topics": []},
                {"Text": "ignored third"}
            ]
        }"#;
        let parts = parse_instant_answer(body).unwrap();
        assert_eq!(parts, vec!["Alpha invests early.", "Alpha Fund I"]);

        assert!(parse_instant_answer("{}").unwrap().is_empty());
        assert!(parse_instant_answer("<html>").is_err());
    }

    #[tokio::test]
    async fn test_enrich_or_fallback() {
        let c = contact("jerry@amecloudventures.com", "");
        assert_eq!(
            enrich_or_fallback(&Failing, &c).await,
            "organization at amecloudventures.com"
        );
        assert_eq!(
            enrich_or_fallback(&Empty, &c).await,
            "organization at amecloudventures.com"
        );
    }
}

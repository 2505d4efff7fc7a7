//! Contact loading and normalization
//!
//! Contacts are read once per run from one or more CSV files, filtered, and
//! deduplicated on the normalized email. The resulting list is never mutated.

use crate::error::{common, ErrorCode, OutreachError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A single outreach recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Normalized address; the contact's identity
    pub email: String,
    pub name: String,
    pub firm: String,
    pub title: String,
    /// Investor-type tag such as "Seed/Series A"
    pub kind: String,
    pub location: String,
}

impl Contact {
    /// Build a contact with only an address; other fields empty
    pub fn with_email(email: &str) -> Self {
        Self {
            email: normalize_email(email),
            name: String::new(),
            firm: String::new(),
            title: String::new(),
            kind: String::new(),
            location: String::new(),
        }
    }

    /// Domain part of the address, or empty when there is none
    pub fn domain(&self) -> &str {
        email_domain(&self.email)
    }

    /// Local part of the address, used as a nickname hint in prompts
    pub fn username(&self) -> &str {
        self.email.split('@').next().unwrap_or_default()
    }

    /// Name to greet the contact with, falling back to the firm
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.firm
        } else {
            &self.name
        }
    }
}

/// Lower-case and trim an address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Domain of an address, or `""`
pub fn email_domain(email: &str) -> &str {
    email.split_once('@').map(|(_, d)| d).unwrap_or_default()
}

/// Whether a normalized address looks deliverable enough to try
///
/// One `@`, non-empty local part, a dotted domain that neither starts nor
/// ends with a dot, and no whitespace anywhere.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

/// Header aliases for each contact field, first match wins
const EMAIL_COLUMNS: &[&str] = &["email", "Email", "EMAIL", "Email Address"];
const NAME_COLUMNS: &[&str] = &["name", "Name", "Primary Contact", "Contact", "Investors"];
const FIRM_COLUMNS: &[&str] = &["firm", "Firm", "Investors", "Company", "Organization"];
const TITLE_COLUMNS: &[&str] = &["title", "Primary Contact Title", "Title"];
const KIND_COLUMNS: &[&str] = &["type", "Type", "Investor Type"];
const LOCATION_COLUMNS: &[&str] = &["location", "Location"];
const DISPOSABLE_COLUMNS: &[&str] = &["disposable", "Disposable"];
const RESULT_COLUMNS: &[&str] = &["result", "Result"];

/// Row counts dropped by each filter, for the load summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub rows: usize,
    pub missing_email: usize,
    pub invalid_email: usize,
    pub disposable: usize,
    pub undeliverable: usize,
    pub duplicates: usize,
}

/// A raw row before filtering
#[derive(Debug, Clone, Default)]
struct RawRow {
    email: String,
    name: String,
    firm: String,
    title: String,
    kind: String,
    location: String,
    disposable: String,
    result: String,
}

struct ColumnMap {
    email: usize,
    name: Option<usize>,
    firm: Option<usize>,
    title: Option<usize>,
    kind: Option<usize>,
    location: Option<usize>,
    disposable: Option<usize>,
    result: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Option<Self> {
        let find = |aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| headers.iter().position(|h| h.trim() == *alias))
        };

        Some(Self {
            email: find(EMAIL_COLUMNS)?,
            name: find(NAME_COLUMNS),
            firm: find(FIRM_COLUMNS),
            title: find(TITLE_COLUMNS),
            kind: find(KIND_COLUMNS),
            location: find(LOCATION_COLUMNS),
            disposable: find(DISPOSABLE_COLUMNS),
            result: find(RESULT_COLUMNS),
        })
    }

    fn row(&self, record: &csv::StringRecord) -> RawRow {
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(clean_cell)
                .unwrap_or_default()
        };

        RawRow {
            email: cell(Some(self.email)),
            name: cell(self.name),
            firm: cell(self.firm),
            title: cell(self.title),
            kind: cell(self.kind),
            location: cell(self.location),
            disposable: cell(self.disposable),
            result: cell(self.result),
        }
    }
}

/// Trim a cell and treat spreadsheet null markers as empty
fn clean_cell(value: &str) -> String {
    let value = value.trim();
    match value.to_ascii_lowercase().as_str() {
        "nan" | "none" | "null" => String::new(),
        _ => value.to_string(),
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "y"
    )
}

fn read_rows(path: &Path) -> Result<Vec<RawRow>> {
    if !path.exists() {
        return Err(common::contacts_not_found(path));
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|e| {
            OutreachError::contacts_with_code(
                ErrorCode::CONTACTS_UNREADABLE,
                "Could not open contact file",
                Some(path.to_path_buf()),
            )
            .with_source(e)
        })?;

    let headers = reader.headers().map_err(|e| {
        OutreachError::contacts_with_code(
            ErrorCode::CONTACTS_UNREADABLE,
            "Could not read header row",
            Some(path.to_path_buf()),
        )
        .with_source(e)
    })?;

    let columns = ColumnMap::from_headers(headers).ok_or_else(|| {
        OutreachError::contacts_with_code(
            ErrorCode::CONTACTS_MISSING_EMAIL_COLUMN,
            format!("No email column (looked for {})", EMAIL_COLUMNS.join(", ")),
            Some(path.to_path_buf()),
        )
    })?;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        match record {
            Ok(record) => rows.push(columns.row(&record)),
            Err(e) => warn!("Skipping unreadable row {} in {}: {}", line + 2, path.display(), e),
        }
    }
    Ok(rows)
}

fn filter_rows(rows: Vec<RawRow>, stats: &mut LoadStats) -> Vec<Contact> {
    let mut seen = HashSet::new();
    let mut contacts = Vec::with_capacity(rows.len());

    for row in rows {
        stats.rows += 1;
        let email = normalize_email(&row.email);

        if email.is_empty() {
            stats.missing_email += 1;
            continue;
        }
        if is_truthy(&row.disposable) {
            stats.disposable += 1;
            continue;
        }
        if row.result.eq_ignore_ascii_case("undeliverable") {
            stats.undeliverable += 1;
            continue;
        }
        if !is_valid_email(&email) {
            debug!("Dropping invalid address {:?}", email);
            stats.invalid_email += 1;
            continue;
        }
        if !seen.insert(email.clone()) {
            stats.duplicates += 1;
            continue;
        }

        contacts.push(Contact {
            email,
            name: row.name,
            firm: row.firm,
            title: row.title,
            kind: row.kind,
            location: row.location,
        });
    }

    contacts
}

/// Load, concatenate, filter and dedupe contacts from every file in order
///
/// A file that cannot be read is a warning; it is an error only when no file
/// could be read at all.
pub fn load_contacts(paths: &[PathBuf]) -> Result<(Vec<Contact>, LoadStats)> {
    let mut rows = Vec::new();
    let mut loaded_any = false;
    let mut last_error = None;

    for path in paths {
        match read_rows(path) {
            Ok(file_rows) => {
                info!("Loaded {} contacts from {}", file_rows.len(), path.display());
                rows.extend(file_rows);
                loaded_any = true;
            }
            Err(e) => {
                warn!("Could not load {}: {}", path.display(), e);
                last_error = Some(e);
            }
        }
    }

    if !loaded_any {
        let err = OutreachError::contacts_with_code(
            ErrorCode::CONTACTS_NONE_LOADED,
            "No contact files could be loaded",
            paths.first().cloned(),
        );
        return Err(match last_error {
            Some(source) => err.with_source(source),
            None => err,
        });
    }

    let mut stats = LoadStats::default();
    let contacts = filter_rows(rows, &mut stats);
    debug!("Contact load stats: {:?}", stats);
    Ok((contacts, stats))
}

/// Parse contacts from in-memory CSV text
pub fn parse_contacts(csv_text: &str) -> Result<Vec<Contact>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(csv_text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| OutreachError::contacts("Could not read header row").with_source(e))?;
    let columns = ColumnMap::from_headers(headers).ok_or_else(|| {
        OutreachError::contacts_with_code(
            ErrorCode::CONTACTS_MISSING_EMAIL_COLUMN,
            "No email column",
            None,
        )
    })?;

    let rows = reader
        .records()
        .filter_map(|r| r.ok())
        .map(|r| columns.row(&r))
        .collect();

    Ok(filter_rows(rows, &mut LoadStats::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  A@X.com "), "a@x.com");
        assert_eq!(normalize_email(""), "");
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("jerry@amecloudventures.com"));
        assert!(is_valid_email("a.b+tag@sub.example.io"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("user@.example.com"));
        assert!(!is_valid_email("user@example..com"));
        assert!(!is_valid_email("us er@example.com"));
        assert!(!is_valid_email("a@b@example.com"));
    }

    #[test]
    fn test_contact_accessors() {
        let mut contact = Contact::with_email(" Jerry@AmeCloudVentures.com");
        assert_eq!(contact.email, "jerry@amecloudventures.com");
        assert_eq!(contact.domain(), "amecloudventures.com");
        assert_eq!(contact.username(), "jerry");

        contact.firm = "AME Cloud Ventures".to_string();
        assert_eq!(contact.display_name(), "AME Cloud Ventures");
    }

    #[test]
    fn test_parse_contacts_filters_and_dedupes() {
        let csv_text = "\
Email,Primary Contact,Investors,Primary Contact Title,Type,Location,disposable,result
A@X.com ,Alice,Alpha Capital,Partner,Seed,NYC,FALSE,deliverable
,Nobody,Nothing,,,,,
b@x.com,Bob,Beta Fund,Principal,Series A,SF,TRUE,
c@x.com,Carol,Gamma,GP,Seed,LA,,undeliverable
bad-address,Dan,Delta,,,,,
a@x.com,Alice Again,Alpha Capital,,,,,
e@x.com,nan,Epsilon Ventures,,,,,
";
        let contacts = parse_contacts(csv_text).unwrap();
        let emails: Vec<&str> = contacts.iter().map(|c| c.email.as_str()).collect();
        assert_eq!(emails, vec!["a@x.com", "e@x.com"]);

        assert_eq!(contacts[0].name, "Alice");
        assert_eq!(contacts[0].firm, "Alpha Capital");
        assert_eq!(contacts[0].title, "Partner");
        assert_eq!(contacts[0].kind, "Seed");
        assert_eq!(contacts[0].location, "NYC");
        assert_eq!(contacts[1].name, "");
        assert_eq!(contacts[1].display_name(), "Epsilon Ventures");
    }

    #[test]
    fn test_parse_contacts_requires_email_column() {
        let err = parse_contacts("name,firm\nAlice,Alpha\n").unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONTACTS_MISSING_EMAIL_COLUMN);
    }

    #[test]
    fn test_load_contacts_concatenates_files_in_order() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first.csv");
        let second = temp.path().join("second.csv");
        let missing = temp.path().join("missing.csv");
        std::fs::write(&first, "email,name\nb@x.com,Bob\na@x.com,Alice\n").unwrap();
        std::fs::write(&second, "Email,Contact\nA@x.com,Dup\nc@x.com,Carol\n").unwrap();

        let (contacts, stats) = load_contacts(&[first, missing, second]).unwrap();
        let emails: Vec<&str> = contacts.iter().map(|c| c.email.as_str()).collect();
        assert_eq!(emails, vec!["b@x.com", "a@x.com", "c@x.com"]);
        assert_eq!(stats.rows, 4);
        assert_eq!(stats.duplicates, 1);
    }

    #[test]
    fn test_load_contacts_fails_when_nothing_loads() {
        let err = load_contacts(&[PathBuf::from("/nope/contacts.csv")]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONTACTS_NONE_LOADED);
    }
}

//! Summary of a sent log for the `report` command

use super::SentLogRecord;
use crate::contacts::{email_domain, normalize_email};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

const DAYS_SHOWN: usize = 10;
const DOMAINS_SHOWN: usize = 5;
const RECENT_SHOWN: usize = 10;

/// Aggregate counts over every record in a log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogReport {
    pub total_rows: usize,
    pub unique_recipients: usize,
    pub unique_message_ids: usize,
    /// `(YYYY-MM-DD, count)`, newest day first
    pub per_day: Vec<(String, usize)>,
    /// `(domain, count)`, most frequent first, ties by name
    pub top_domains: Vec<(String, usize)>,
    /// Newest records first
    pub recent: Vec<SentLogRecord>,
}

impl LogReport {
    pub fn from_records(records: &[SentLogRecord]) -> Self {
        let recipients: HashSet<String> = records
            .iter()
            .map(|r| normalize_email(&r.email))
            .filter(|e| !e.is_empty())
            .collect();

        let message_ids: HashSet<&str> = records
            .iter()
            .map(|r| r.message_id.trim())
            .filter(|id| !id.is_empty())
            .collect();

        let mut days: BTreeMap<String, usize> = BTreeMap::new();
        for record in records {
            if let Some(day) = day_of(&record.timestamp) {
                *days.entry(day).or_default() += 1;
            }
        }
        let per_day = days.into_iter().rev().take(DAYS_SHOWN).collect();

        let mut domains: HashMap<String, usize> = HashMap::new();
        for record in records {
            let email = normalize_email(&record.email);
            let domain = email_domain(&email);
            if !domain.is_empty() {
                *domains.entry(domain.to_string()).or_default() += 1;
            }
        }
        let mut top_domains: Vec<(String, usize)> = domains.into_iter().collect();
        top_domains.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_domains.truncate(DOMAINS_SHOWN);

        // Stable sort keeps append order among equal timestamps.
        let mut recent = records.to_vec();
        recent.reverse();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent.truncate(RECENT_SHOWN);

        Self {
            total_rows: records.len(),
            unique_recipients: recipients.len(),
            unique_message_ids: message_ids.len(),
            per_day,
            top_domains,
            recent,
        }
    }
}

/// Calendar day of an ISO-8601 timestamp, if it has one
fn day_of(timestamp: &str) -> Option<String> {
    let day = timestamp.trim().get(..10)?;
    chrono::NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .ok()
        .map(|d| d.to_string())
}

impl fmt::Display for LogReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "==== SENT EMAILS REPORT ====")?;
        writeln!(f, "Total rows: {}", self.total_rows)?;
        writeln!(f, "Unique recipients: {}", self.unique_recipients)?;
        writeln!(f, "Unique message IDs: {}", self.unique_message_ids)?;

        if !self.per_day.is_empty() {
            writeln!(f, "\nSent per day (latest {}):", DAYS_SHOWN)?;
            for (day, count) in &self.per_day {
                writeln!(f, "  {}: {}", day, count)?;
            }
        }

        if !self.top_domains.is_empty() {
            writeln!(f, "\nTop recipient domains:")?;
            for (domain, count) in &self.top_domains {
                writeln!(f, "  {}: {}", domain, count)?;
            }
        }

        if !self.recent.is_empty() {
            writeln!(f, "\nMost recent {}:", RECENT_SHOWN)?;
            for r in &self.recent {
                writeln!(
                    f,
                    "  {} | {} | {} | {} | {}",
                    r.timestamp, r.email, r.name, r.firm, r.message_id
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(email: &str, timestamp: &str, id: &str) -> SentLogRecord {
        SentLogRecord {
            email: email.to_string(),
            name: String::new(),
            firm: String::new(),
            timestamp: timestamp.to_string(),
            status: "sent".to_string(),
            message_id: id.to_string(),
        }
    }

    #[test]
    fn test_empty_report() {
        let report = LogReport::from_records(&[]);
        assert_eq!(report, LogReport::default());
        assert!(report.to_string().contains("Total rows: 0"));
    }

    #[test]
    fn test_counts_and_ordering() {
        let records = vec![
            rec("a@alpha.com", "2025-03-01T09:00:00", "m1"),
            rec("b@alpha.com", "2025-03-01T10:00:00", "m2"),
            rec("A@alpha.com", "2025-03-02T08:00:00", ""),
            rec("c@beta.vc", "2025-03-03T08:00:00", "m3"),
            rec("d@gamma.io", "not a date", "m3"),
        ];
        let report = LogReport::from_records(&records);

        assert_eq!(report.total_rows, 5);
        assert_eq!(report.unique_recipients, 4);
        assert_eq!(report.unique_message_ids, 3);
        assert_eq!(
            report.per_day,
            vec![
                ("2025-03-03".to_string(), 1),
                ("2025-03-02".to_string(), 1),
                ("2025-03-01".to_string(), 2),
            ]
        );
        assert_eq!(report.top_domains[0], ("alpha.com".to_string(), 3));
        assert_eq!(report.top_domains[1], ("beta.vc".to_string(), 1));
        assert_eq!(report.recent[0].email, "d@gamma.io");
        assert_eq!(report.recent[1].email, "c@beta.vc");
    }

    #[test]
    fn test_per_day_keeps_latest_ten() {
        let records: Vec<SentLogRecord> = (1..=12)
            .map(|d| rec("a@x.com", &format!("2025-01-{:02}T00:00:00", d), ""))
            .collect();
        let report = LogReport::from_records(&records);

        assert_eq!(report.per_day.len(), 10);
        assert_eq!(report.per_day[0].0, "2025-01-12");
        assert_eq!(report.per_day[9].0, "2025-01-03");
        assert_eq!(report.recent.len(), 10);
    }
}

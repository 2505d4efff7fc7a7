//! Fixture builders for runner and CLI tests

use crate::config::OutreachConfig;
use crate::contacts::Contact;
use std::io;
use std::path::{Path, PathBuf};

/// Contact with a name and firm filled in
pub fn test_contact(email: &str, name: &str, firm: &str) -> Contact {
    Contact {
        name: name.to_string(),
        firm: firm.to_string(),
        ..Contact::with_email(email)
    }
}

/// Configuration with no pause between contacts and fake credentials
pub fn test_config(daily_limit: usize) -> OutreachConfig {
    let mut config = OutreachConfig::default();
    config.sending.daily_limit = daily_limit;
    config.sending.seconds_between_emails = 0;
    config.sending.test_email = "tester@example.com".to_string();
    config.generation.endpoint = "https://example.openai.azure.com".to_string();
    config.generation.api_key = "test-key".to_string();
    config.generation.deployment = "test-deployment".to_string();
    config
}

/// Write a contact CSV with the usual columns and return its path
pub fn write_contacts_csv(dir: &Path, name: &str, contacts: &[Contact]) -> io::Result<PathBuf> {
    let mut text = String::from("email,name,firm,title\n");
    for c in contacts {
        text.push_str(&format!("{},{},{},{}\n", c.email, c.name, c.firm, c.title));
    }
    let path = dir.join(name);
    std::fs::write(&path, text)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::load_contacts;
    use tempfile::TempDir;

    #[test]
    fn test_written_contacts_load_back() {
        let temp = TempDir::new().unwrap();
        let contacts = vec![
            test_contact("a@fund.com", "Ann Lee", "Fund"),
            test_contact("b@vc.com", "Bo Chan", "VC"),
        ];
        let path = write_contacts_csv(temp.path(), "contacts.csv", &contacts).unwrap();

        let (loaded, _) = load_contacts(&[path]).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name, "Ann Lee");
        assert_eq!(loaded[1].firm, "VC");
    }
}

//! Disposable / whitelist / blacklist domain sets.
//!
//! Lists are built once by the caller and only read afterwards; a
//! [`DomainLists`] can be shared by reference across threads.

mod error;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use regex::Regex;

use crate::mx::MailServer;

pub use error::ListError;

pub const DISPOSABLE_FILE: &str = "disposable_email_domains.txt";
pub const WHITELIST_FILE: &str = "whitelisted_email_domains.txt";
pub const BLACKLIST_FILE: &str = "blacklisted_email_domains.txt";

/// Set of lowercase domains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainList {
    domains: HashSet<String>,
}

impl DomainList {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = domains
            .into_iter()
            .map(|d| d.as_ref().trim().to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self { domains }
    }

    /// Une entrée par ligne; lignes vides et commentaires `#` ignorés.
    pub fn from_text(text: &str, origin: impl AsRef<Path>) -> Result<Self, ListError> {
        let mut domains = HashSet::new();
        for (idx, line) in text.lines().enumerate() {
            let entry = line.split('#').next().unwrap_or_default().trim();
            if entry.is_empty() {
                continue;
            }
            if entry.contains('@') || entry.chars().any(char::is_whitespace) {
                return Err(ListError::invalid_entry(origin.as_ref(), idx + 1, entry));
            }
            domains.insert(entry.to_lowercase());
        }
        Ok(Self { domains })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ListError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| ListError::read(path, err))?;
        let list = Self::from_text(&text, path)?;
        #[cfg(feature = "with-tracing")]
        tracing::debug!(path = %path.display(), entries = list.len(), "domain list loaded");
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.domains.contains(domain)
    }

    /// Exact match on the lowercased domain, else on the domain minus its
    /// first label (`sub.mailinator.com` matches `mailinator.com`).
    pub fn contains_domain(&self, domain: &str) -> bool {
        let domain = domain.to_lowercase();
        if self.domains.contains(&domain) {
            return true;
        }
        match domain.split_once('.') {
            Some((_, parent)) => self.domains.contains(parent),
            None => false,
        }
    }

    /// True when one MX exchange lies on a listed domain, aligned on a label
    /// boundary. An address-only answer (A fallback) ends the check.
    pub fn matches_exchange(&self, servers: &[MailServer]) -> bool {
        // motifs compilés une fois par entrée candidate
        let mut patterns: HashMap<&str, Option<Regex>> = HashMap::new();
        for server in servers {
            let Some(exchange) = server.exchange() else {
                return false;
            };
            for domain in &self.domains {
                if !exchange.ends_with(domain.as_str()) {
                    continue;
                }
                let pattern = patterns
                    .entry(domain.as_str())
                    .or_insert_with(|| exchange_pattern(domain));
                if pattern.as_ref().is_some_and(|re| re.is_match(exchange)) {
                    return true;
                }
            }
        }
        false
    }
}

/// `domain` itself or any host below it, on a label boundary.
fn exchange_pattern(domain: &str) -> Option<Regex> {
    match Regex::new(&format!(r"\A(?:.+\.)*?{}\z", regex::escape(domain))) {
        Ok(re) => Some(re),
        Err(_err) => {
            #[cfg(feature = "with-tracing")]
            tracing::warn!(domain, error = %_err, "list entry not usable as MX pattern");
            None
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for DomainList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DomainLists {
    pub disposable: DomainList,
    pub whitelist: DomainList,
    pub blacklist: DomainList,
}

impl DomainLists {
    pub fn new(disposable: DomainList, whitelist: DomainList, blacklist: DomainList) -> Self {
        Self {
            disposable,
            whitelist,
            blacklist,
        }
    }

    /// Loads the three list files from `dir`. The disposable list is
    /// mandatory; a missing whitelist or blacklist is an empty list.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ListError> {
        let dir = dir.as_ref();
        let disposable = DomainList::from_path(dir.join(DISPOSABLE_FILE))?;
        let whitelist = optional_list(&dir.join(WHITELIST_FILE))?;
        let blacklist = optional_list(&dir.join(BLACKLIST_FILE))?;
        Ok(Self::new(disposable, whitelist, blacklist))
    }
}

fn optional_list(path: &Path) -> Result<DomainList, ListError> {
    if path.exists() {
        DomainList::from_path(path)
    } else {
        Ok(DomainList::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mx::MxRecord;
    use std::net::{IpAddr, Ipv4Addr};

    fn mx(exchange: &str) -> MailServer {
        MailServer::Exchange(MxRecord::new(10, exchange))
    }

    #[test]
    fn entries_are_lowercased() {
        let list = DomainList::new(["Mailinator.COM", "  ", "yopmail.com "]);
        assert_eq!(list.len(), 2);
        assert!(list.contains("mailinator.com"));
        assert!(list.contains("yopmail.com"));
    }

    #[test]
    fn domain_exact_and_parent_match() {
        let list = DomainList::new(["mailinator.com"]);
        assert!(list.contains_domain("mailinator.com"));
        assert!(list.contains_domain("MAILINATOR.com"));
        assert!(list.contains_domain("sub.mailinator.com"));
        assert!(!list.contains_domain("notmailinator.com"));
        assert!(!list.contains_domain("localhost"));
        // seul le premier label est retiré
        assert!(!list.contains_domain("a.b.mailinator.com"));
    }

    #[test]
    fn exchange_must_align_on_label() {
        let list = DomainList::new(["disposable.com"]);
        assert!(list.matches_exchange(&[mx("mx1.disposable.com")]));
        assert!(list.matches_exchange(&[mx("disposable.com")]));
        assert!(!list.matches_exchange(&[mx("evil-notdisposable.com")]));
        assert!(!list.matches_exchange(&[]));
    }

    #[test]
    fn any_exchange_can_match() {
        let list = DomainList::new(["disposable.com"]);
        let servers = [mx("mx.example.com"), mx("mx2.disposable.com")];
        assert!(list.matches_exchange(&servers));
    }

    #[test]
    fn address_answer_stops_exchange_check() {
        let list = DomainList::new(["disposable.com"]);
        let servers = [
            MailServer::Address(IpAddr::V4(Ipv4Addr::LOCALHOST)),
            mx("mx.disposable.com"),
        ];
        assert!(!list.matches_exchange(&servers));
    }

    #[test]
    fn exchange_pattern_treats_entry_literally() {
        let re = exchange_pattern("mail.ru").expect("escaped entry compiles");
        assert!(re.is_match("mail.ru"));
        assert!(re.is_match("mx1.mail.ru"));
        assert!(!re.is_match("mailxru"));
        assert!(!re.is_match("evilmail.ru"));
    }

    #[test]
    fn several_servers_on_one_entry() {
        let list = DomainList::new(["throwaway.net", "other.org"]);
        let servers = [mx("a.example.com"), mx("b.example.com"), mx("mx2.throwaway.net")];
        assert!(list.matches_exchange(&servers));
        assert!(!list.matches_exchange(&servers[..2]));
    }

    #[test]
    fn text_skips_comments_and_blank_lines() {
        let text = "# jetables\nmailinator.com\n\n  YOPMAIL.com  # inline\n";
        let list = DomainList::from_text(text, "inline").unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains("yopmail.com"));
    }

    #[test]
    fn text_rejects_addresses() {
        let err = DomainList::from_text("ok.com\nuser@bad.com\n", "inline").unwrap_err();
        match err {
            ListError::InvalidEntry { line, entry, .. } => {
                assert_eq!(line, 2);
                assert_eq!(entry, "user@bad.com");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn from_dir_requires_disposable_only() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            DomainLists::from_dir(dir.path()),
            Err(ListError::Read { .. })
        ));

        std::fs::write(dir.path().join(DISPOSABLE_FILE), "mailinator.com\n").unwrap();
        std::fs::write(dir.path().join(BLACKLIST_FILE), "spam.example\n").unwrap();
        let lists = DomainLists::from_dir(dir.path()).unwrap();
        assert!(lists.disposable.contains("mailinator.com"));
        assert!(lists.whitelist.is_empty());
        assert!(lists.blacklist.contains("spam.example"));
    }
}

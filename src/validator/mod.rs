mod domain;
mod local;
mod qualify;
mod types;

pub use local::SUBADDRESS_DELIMITER;
pub use qualify::{QualifyOptions, QualifyOutcome, Rejection, qualify, qualify_with};
pub use types::{AddressSummary, ValidationReport};

use std::sync::OnceLock;

use crate::address::{AddressParser, MailboxParser, ParseError, ParsedAddress, find_multi_byte};
use crate::lists::DomainLists;
use crate::mx::{DnsLookup, DnsOptions, MailServer, SystemDns, resolve_mail_servers};

use domain::check_domain;
use local::{check_address, is_subaddressed};

/// Qualifies one raw address.
///
/// The address is parsed once at construction. Validity and the mail-server
/// lookup are computed on first use and cached for the lifetime of the
/// instance; no predicate ever fails, a parse or DNS problem just yields
/// `false`.
pub struct AddressValidator<'a, R = SystemDns> {
    raw: String,
    address: Option<ParsedAddress>,
    parse_error: Option<ParseError>,
    lists: &'a DomainLists,
    resolver: R,
    report: OnceLock<ValidationReport>,
    mail_servers: OnceLock<Vec<MailServer>>,
}

impl<'a> AddressValidator<'a, SystemDns> {
    pub fn new(raw: impl Into<String>, lists: &'a DomainLists) -> Self {
        Self::with_parts(raw, lists, &MailboxParser, SystemDns::default())
    }

    pub fn with_dns_options(
        raw: impl Into<String>,
        lists: &'a DomainLists,
        options: DnsOptions,
    ) -> Self {
        Self::with_parts(raw, lists, &MailboxParser, SystemDns::new(options))
    }
}

impl<'a, R: DnsLookup> AddressValidator<'a, R> {
    pub fn with_parts<P>(
        raw: impl Into<String>,
        lists: &'a DomainLists,
        parser: &P,
        resolver: R,
    ) -> Self
    where
        P: AddressParser + ?Sized,
    {
        let raw = raw.into();
        let (address, mut parse_error) = match parser.parse(&raw) {
            Ok(address) => (Some(address), None),
            Err(err) => (None, Some(err)),
        };
        // tout caractère multi-octets invalide l'adresse (emoji, IDN...)
        if let Some((position, ch)) = find_multi_byte(&raw) {
            parse_error = Some(ParseError::MultiByte { ch, position });
        }

        #[cfg(feature = "with-tracing")]
        if let Some(err) = &parse_error {
            tracing::debug!(address = %raw, error = %err, "address parse failed");
        }

        Self {
            raw,
            address,
            parse_error,
            lists,
            resolver,
            report: OnceLock::new(),
            mail_servers: OnceLock::new(),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn parse_error(&self) -> Option<&ParseError> {
        self.parse_error.as_ref()
    }

    /// Parsed address, only when parsing fully succeeded.
    pub fn parsed(&self) -> Option<&ParsedAddress> {
        if self.parse_error.is_some() {
            return None;
        }
        self.address.as_ref()
    }

    fn domain(&self) -> Option<&str> {
        self.parsed().and_then(ParsedAddress::domain)
    }

    pub fn report(&self) -> &ValidationReport {
        self.report.get_or_init(|| self.compute_report())
    }

    fn compute_report(&self) -> ValidationReport {
        let mut reasons = Vec::new();

        if let Some(err) = &self.parse_error {
            reasons.push(err.to_string());
            return ValidationReport::from_reasons(reasons);
        }
        let Some(address) = self.address.as_ref() else {
            reasons.push("address not parsed".to_string());
            return ValidationReport::from_reasons(reasons);
        };
        let Some(domain) = address.domain() else {
            reasons.push("missing domain".to_string());
            return ValidationReport::from_reasons(reasons);
        };

        let serialized = address.to_address();
        if serialized != self.raw {
            reasons.push(format!("address parsed as {serialized:?}, not as written"));
        }
        check_domain(domain, &mut reasons);
        check_address(&serialized, &mut reasons);

        ValidationReport::from_reasons(reasons)
    }

    pub fn is_valid(&self) -> bool {
        self.report().ok
    }

    pub fn is_subaddressed(&self) -> bool {
        self.is_valid() && self.parsed().is_some_and(|a| is_subaddressed(&a.local))
    }

    pub fn is_disposable(&self) -> bool {
        self.is_disposable_domain() || self.is_disposable_mx_server()
    }

    pub fn is_disposable_domain(&self) -> bool {
        self.is_valid()
            && self
                .domain()
                .is_some_and(|d| self.lists.disposable.contains_domain(d))
    }

    pub fn is_disposable_mx_server(&self) -> bool {
        self.is_valid() && self.lists.disposable.matches_exchange(self.mail_servers())
    }

    /// Checked even for invalid addresses: when parsing failed the domain is
    /// read from whatever follows the last `@`.
    pub fn is_whitelisted(&self) -> bool {
        self.whitelist_domain()
            .is_some_and(|d| self.lists.whitelist.contains_domain(d))
    }

    fn whitelist_domain(&self) -> Option<&str> {
        self.address
            .as_ref()
            .and_then(ParsedAddress::domain)
            .or_else(|| {
                self.raw
                    .rsplit_once('@')
                    .map(|(_, domain)| domain.trim())
                    .filter(|domain| !domain.is_empty())
            })
    }

    pub fn is_blacklisted(&self) -> bool {
        self.is_valid()
            && self
                .domain()
                .is_some_and(|d| self.lists.blacklist.contains_domain(d))
    }

    pub fn has_valid_mx(&self) -> bool {
        self.is_valid() && !self.mail_servers().is_empty()
    }

    /// MX answers (or A answers when no MX exists). Empty for invalid
    /// addresses, which are never looked up.
    pub fn mail_servers(&self) -> &[MailServer] {
        if !self.is_valid() {
            return &[];
        }
        self.mail_servers.get_or_init(|| match self.domain() {
            Some(domain) => resolve_mail_servers(&self.resolver, domain),
            None => Vec::new(),
        })
    }

    /// All predicates at once. With `with_dns == false` nothing is resolved
    /// and the MX-dependent fields stay `None`, except `disposable` which is
    /// already known when the domain itself is listed.
    pub fn summary(&self, with_dns: bool) -> AddressSummary {
        let report = self.report();
        let disposable_domain = self.is_disposable_domain();

        let (disposable_mx_server, disposable, valid_mx, mail_servers) = if with_dns {
            (
                Some(self.is_disposable_mx_server()),
                Some(self.is_disposable()),
                Some(self.has_valid_mx()),
                Some(self.mail_servers().to_vec()),
            )
        } else {
            (None, disposable_domain.then_some(true), None, None)
        };

        AddressSummary {
            address: self.raw.clone(),
            valid: report.ok,
            reasons: report.reasons.clone(),
            subaddressed: self.is_subaddressed(),
            whitelisted: self.is_whitelisted(),
            blacklisted: self.is_blacklisted(),
            disposable_domain,
            disposable_mx_server,
            disposable,
            valid_mx,
            mail_servers,
        }
    }
}

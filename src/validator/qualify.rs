use thiserror::Error;

use crate::address::{AddressParser, MailboxParser};
use crate::lists::DomainLists;
use crate::mx::{DnsLookup, SystemDns};

use super::AddressValidator;

/// Which checks an address must pass on top of syntactic validity.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QualifyOptions {
    /// domain must publish MX (or A) records
    pub mx: bool,
    /// reject disposable domains and disposable MX servers
    pub disposable: bool,
    /// reject disposable domains, without DNS
    pub disposable_domain: bool,
    /// like `disposable`, unless the domain is whitelisted
    pub disposable_with_whitelist: bool,
    pub blacklist: bool,
    pub disallow_subaddressing: bool,
    /// input is a comma separated list of addresses
    pub multiple: bool,
}

impl QualifyOptions {
    /// First failed check for this address, in a fixed order: validity,
    /// sub-addressing, disposable variants, blacklist, MX.
    pub fn evaluate<R: DnsLookup>(&self, validator: &AddressValidator<'_, R>) -> Option<Rejection> {
        let address = || validator.raw().to_string();

        if !validator.is_valid() {
            return Some(Rejection::Invalid {
                address: address(),
                reasons: validator.report().reasons.clone(),
            });
        }
        if self.disallow_subaddressing && validator.is_subaddressed() {
            return Some(Rejection::Subaddressed { address: address() });
        }
        if self.disposable && validator.is_disposable() {
            return Some(Rejection::Disposable { address: address() });
        }
        if self.disposable_domain && validator.is_disposable_domain() {
            return Some(Rejection::Disposable { address: address() });
        }
        if self.disposable_with_whitelist
            && validator.is_disposable()
            && !validator.is_whitelisted()
        {
            return Some(Rejection::Disposable { address: address() });
        }
        if self.blacklist && validator.is_blacklisted() {
            return Some(Rejection::Blacklisted { address: address() });
        }
        if self.mx && !validator.has_valid_mx() {
            return Some(Rejection::NoMx { address: address() });
        }
        None
    }

    /// Addresses contained in `raw`: comma separated pieces with `multiple`,
    /// else `raw` itself. Blank input yields nothing.
    pub fn split_input<'i>(&self, raw: &'i str) -> Vec<&'i str> {
        if self.multiple {
            raw.split(',')
                .map(str::trim)
                .filter(|piece| !piece.is_empty())
                .collect()
        } else if raw.trim().is_empty() {
            Vec::new()
        } else {
            vec![raw]
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("no address given")]
    Empty,
    #[error("{address}: invalid address ({})", .reasons.join("; "))]
    Invalid {
        address: String,
        reasons: Vec<String>,
    },
    #[error("{address}: sub-addressing not allowed")]
    Subaddressed { address: String },
    #[error("{address}: disposable address")]
    Disposable { address: String },
    #[error("{address}: blacklisted domain")]
    Blacklisted { address: String },
    #[error("{address}: no MX or A record")]
    NoMx { address: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifyOutcome {
    pub ok: bool,
    pub addresses: Vec<String>,
    pub rejections: Vec<Rejection>,
}

/// Qualifies `raw` with the default parser and system DNS.
pub fn qualify(raw: &str, lists: &DomainLists, options: &QualifyOptions) -> QualifyOutcome {
    qualify_with(raw, lists, options, &MailboxParser, &SystemDns::default())
}

pub fn qualify_with<P, R>(
    raw: &str,
    lists: &DomainLists,
    options: &QualifyOptions,
    parser: &P,
    resolver: &R,
) -> QualifyOutcome
where
    P: AddressParser + ?Sized,
    R: DnsLookup + ?Sized,
{
    let pieces = options.split_input(raw);
    if pieces.is_empty() {
        return QualifyOutcome {
            ok: false,
            addresses: Vec::new(),
            rejections: vec![Rejection::Empty],
        };
    }

    let mut rejections = Vec::new();
    for piece in &pieces {
        let validator = AddressValidator::with_parts(*piece, lists, parser, resolver);
        if let Some(rejection) = options.evaluate(&validator) {
            #[cfg(feature = "with-tracing")]
            tracing::debug!(address = %piece, %rejection, "address rejected");
            rejections.push(rejection);
        }
    }

    QualifyOutcome {
        ok: rejections.is_empty(),
        addresses: pieces.into_iter().map(str::to_string).collect(),
        rejections,
    }
}

#[cfg(test)]
mod tests {
    use std::net::IpAddr;

    use super::*;
    use crate::lists::DomainList;
    use crate::mx::{DnsError, MxRecord};

    /// MX fixes par domaine; tout le reste sans enregistrement.
    struct StaticDns(Vec<(&'static str, &'static str)>);

    impl DnsLookup for StaticDns {
        fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
            Ok(self
                .0
                .iter()
                .filter(|(d, _)| *d == domain)
                .map(|(_, exchange)| MxRecord::new(10, *exchange))
                .collect())
        }

        fn lookup_a(&self, _domain: &str) -> Result<Vec<IpAddr>, DnsError> {
            Ok(Vec::new())
        }
    }

    fn lists() -> DomainLists {
        DomainLists::new(
            DomainList::new(["mailinator.com", "throwaway.net"]),
            DomainList::new(["mailinator.com"]),
            DomainList::new(["spam.example"]),
        )
    }

    fn dns() -> StaticDns {
        StaticDns(vec![
            ("example.com", "mx.example.com"),
            ("hidden.example", "mx1.throwaway.net"),
            ("mailinator.com", "mx.mailinator.com"),
            ("spam.example", "mx.spam.example"),
        ])
    }

    fn run(raw: &str, options: QualifyOptions) -> QualifyOutcome {
        qualify_with(raw, &lists(), &options, &MailboxParser, &dns())
    }

    #[test]
    fn default_options_only_check_validity() {
        assert!(run("user+tag@nowhere.example", QualifyOptions::default()).ok);

        let outcome = run("user@exam-.com", QualifyOptions::default());
        assert!(!outcome.ok);
        assert!(matches!(outcome.rejections[0], Rejection::Invalid { .. }));
    }

    #[test]
    fn empty_input_is_rejected() {
        let outcome = run("   ", QualifyOptions::default());
        assert_eq!(outcome.rejections, vec![Rejection::Empty]);
    }

    #[test]
    fn subaddressing_policy() {
        let options = QualifyOptions {
            disallow_subaddressing: true,
            ..Default::default()
        };
        let outcome = run("user+tag@example.com", options);
        assert_eq!(
            outcome.rejections,
            vec![Rejection::Subaddressed {
                address: "user+tag@example.com".to_string()
            }]
        );
        assert!(run("user@example.com", options).ok);
    }

    #[test]
    fn disposable_policies() {
        let disposable = QualifyOptions {
            disposable: true,
            ..Default::default()
        };
        assert!(!run("x@mailinator.com", disposable).ok);
        // MX jetable, domaine inconnu
        assert!(!run("x@hidden.example", disposable).ok);
        assert!(run("x@example.com", disposable).ok);

        let domain_only = QualifyOptions {
            disposable_domain: true,
            ..Default::default()
        };
        assert!(!run("x@mailinator.com", domain_only).ok);
        assert!(run("x@hidden.example", domain_only).ok);

        let with_whitelist = QualifyOptions {
            disposable_with_whitelist: true,
            ..Default::default()
        };
        assert!(run("x@mailinator.com", with_whitelist).ok);
        assert!(!run("x@hidden.example", with_whitelist).ok);
    }

    #[test]
    fn blacklist_and_mx_policies() {
        let blacklist = QualifyOptions {
            blacklist: true,
            ..Default::default()
        };
        assert!(matches!(
            run("x@spam.example", blacklist).rejections.as_slice(),
            [Rejection::Blacklisted { .. }]
        ));

        let mx = QualifyOptions {
            mx: true,
            ..Default::default()
        };
        assert!(run("x@example.com", mx).ok);
        let outcome = run("x@nowhere.example", mx);
        assert_eq!(
            outcome.rejections[0].to_string(),
            "x@nowhere.example: no MX or A record"
        );
    }

    #[test]
    fn multiple_addresses() {
        let options = QualifyOptions {
            multiple: true,
            mx: true,
            ..Default::default()
        };
        let outcome = run("a@example.com, b@example.com", options);
        assert!(outcome.ok);
        assert_eq!(outcome.addresses, ["a@example.com", "b@example.com"]);

        let outcome = run("a@example.com,b@nowhere.example,c@", options);
        assert!(!outcome.ok);
        assert_eq!(outcome.rejections.len(), 2);

        // sans `multiple`, la virgule rend l'adresse invalide
        let single = QualifyOptions::default();
        assert!(!run("a@example.com,b@example.com", single).ok);
    }
}

use std::net::IpAddr;

use trust_dns_resolver::{
    Resolver,
    config::{NameServerConfigGroup, ResolverConfig, ResolverOpts},
    error::{ResolveError, ResolveErrorKind},
    proto::rr::RecordType,
};

use super::{DnsError, DnsOptions, MailServer, MxRecord};

/// DNS queries needed to qualify an address.
///
/// `NoRecordsFound` answers are reported as `Ok(vec![])`; anything else that
/// goes wrong is an error, which [`resolve_mail_servers`] then swallows.
pub trait DnsLookup {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError>;
    fn lookup_a(&self, domain: &str) -> Result<Vec<IpAddr>, DnsError>;
}

impl<T: DnsLookup + ?Sized> DnsLookup for &T {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        (**self).lookup_mx(domain)
    }

    fn lookup_a(&self, domain: &str) -> Result<Vec<IpAddr>, DnsError> {
        (**self).lookup_a(domain)
    }
}

impl DnsLookup for Resolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        let lookup = match Resolver::mx_lookup(self, domain) {
            Ok(lookup) => lookup,
            Err(err) if should_treat_as_empty(&err) => return Ok(Vec::new()),
            Err(err) => return Err(DnsError::lookup("MX", domain, err)),
        };
        let mut records = Vec::new();
        for mx in lookup.iter() {
            let exchange = normalize_exchange(mx.exchange().to_utf8());
            records.push(MxRecord::new(mx.preference(), exchange));
        }
        Ok(records)
    }

    fn lookup_a(&self, domain: &str) -> Result<Vec<IpAddr>, DnsError> {
        let lookup = match Resolver::lookup(self, domain, RecordType::A) {
            Ok(lookup) => lookup,
            Err(err) if should_treat_as_empty(&err) => return Ok(Vec::new()),
            Err(err) => return Err(DnsError::lookup("A", domain, err)),
        };
        Ok(lookup.iter().filter_map(|rdata| rdata.ip_addr()).collect())
    }
}

/// System resolver with bounded timeouts.
///
/// Holds only settings: every query opens its own [`Resolver`] and drops it
/// before returning, on success, timeout and error alike.
#[derive(Debug, Clone, Default)]
pub struct SystemDns {
    options: DnsOptions,
}

impl SystemDns {
    pub fn new(options: DnsOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DnsOptions {
        &self.options
    }

    /// Configuration handed to each [`Resolver`]: system or default
    /// nameservers (or `name_servers` when set), with our timeout and attempts.
    pub fn resolver_opts(&self) -> (ResolverConfig, ResolverOpts) {
        let (mut config, mut opts) = if self.options.use_system_conf {
            match trust_dns_resolver::system_conf::read_system_conf() {
                Ok(conf) => conf,
                Err(_err) => {
                    #[cfg(feature = "with-tracing")]
                    tracing::warn!(error = %_err, "system resolver config unreadable, using defaults");
                    (ResolverConfig::default(), ResolverOpts::default())
                }
            }
        } else {
            (ResolverConfig::default(), ResolverOpts::default())
        };
        if !self.options.name_servers.is_empty() {
            let group = NameServerConfigGroup::from_ips_clear(&self.options.name_servers, 53, true);
            config = ResolverConfig::from_parts(None, Vec::new(), group);
        }
        opts.timeout = self.options.timeout;
        opts.attempts = self.options.attempts.max(1);
        (config, opts)
    }

    pub fn open(&self) -> Result<Resolver, DnsError> {
        let (config, opts) = self.resolver_opts();
        Resolver::new(config, opts).map_err(DnsError::resolver_init)
    }
}

impl DnsLookup for SystemDns {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        let resolver = self.open()?;
        resolver.lookup_mx(domain)
    }

    fn lookup_a(&self, domain: &str) -> Result<Vec<IpAddr>, DnsError> {
        let resolver = self.open()?;
        resolver.lookup_a(domain)
    }
}

/// MX records of `domain` (ascending preference), or its A records when no
/// MX is published. Never fails: a lookup error counts as "no records".
pub fn resolve_mail_servers<R>(resolver: &R, domain: &str) -> Vec<MailServer>
where
    R: DnsLookup + ?Sized,
{
    let ascii = match normalize_domain(domain) {
        Ok(ascii) => ascii,
        Err(_err) => {
            #[cfg(feature = "with-tracing")]
            tracing::debug!(domain, error = %_err, "domain not resolvable");
            return Vec::new();
        }
    };

    let mut records = resolver.lookup_mx(&ascii).unwrap_or_else(|_err| {
        #[cfg(feature = "with-tracing")]
        tracing::warn!(domain = %ascii, error = %_err, "MX lookup failed");
        Vec::new()
    });
    records.sort();
    records.dedup();

    if !records.is_empty() {
        #[cfg(feature = "with-tracing")]
        tracing::debug!(domain = %ascii, count = records.len(), "MX records found");
        return records.into_iter().map(MailServer::Exchange).collect();
    }

    // pas de MX: MX implicite via l'enregistrement A
    let addresses = resolver.lookup_a(&ascii).unwrap_or_else(|_err| {
        #[cfg(feature = "with-tracing")]
        tracing::warn!(domain = %ascii, error = %_err, "A lookup failed");
        Vec::new()
    });
    #[cfg(feature = "with-tracing")]
    tracing::debug!(domain = %ascii, count = addresses.len(), "falling back to A records");
    addresses.into_iter().map(MailServer::Address).collect()
}

pub fn normalize_domain(domain: &str) -> Result<String, DnsError> {
    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return Err(DnsError::EmptyDomain);
    }
    idna::domain_to_ascii(trimmed).map_err(|source| DnsError::idna(trimmed, source))
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}

fn should_treat_as_empty(err: &ResolveError) -> bool {
    matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. })
}

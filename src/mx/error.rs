use thiserror::Error;

/// Échec d'une requête DNS. Jamais remonté par [`super::resolve_mail_servers`],
/// qui le traite comme « aucun enregistrement ».
#[derive(Debug, Error)]
pub enum DnsError {
    #[error("no domain to resolve")]
    EmptyDomain,
    #[error("cannot resolve {domain}: not convertible to ASCII (IDNA)")]
    IdnaConversion {
        domain: String,
        #[source]
        source: idna::Errors,
    },
    #[error("cannot open DNS resolver: {source}")]
    ResolverInit {
        #[source]
        source: std::io::Error,
    },
    #[error("{kind} lookup failed for {name}: {source}")]
    Lookup {
        kind: &'static str,
        name: String,
        #[source]
        source: trust_dns_resolver::error::ResolveError,
    },
}

impl DnsError {
    pub(crate) fn idna(domain: impl Into<String>, source: idna::Errors) -> Self {
        Self::IdnaConversion {
            domain: domain.into(),
            source,
        }
    }

    pub(crate) fn resolver_init(source: std::io::Error) -> Self {
        Self::ResolverInit { source }
    }

    pub(crate) fn lookup(
        kind: &'static str,
        name: impl Into<String>,
        source: trust_dns_resolver::error::ResolveError,
    ) -> Self {
        Self::Lookup {
            kind,
            name: name.into(),
            source,
        }
    }
}

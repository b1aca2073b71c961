use std::net::IpAddr;
use std::time::Duration;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

impl MxRecord {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }
}

/// One answer of the mail-server lookup: an MX record, or an address record
/// used as implicit MX when the domain publishes no MX.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailServer {
    Exchange(MxRecord),
    Address(IpAddr),
}

impl MailServer {
    pub fn exchange(&self) -> Option<&str> {
        match self {
            Self::Exchange(record) => Some(record.exchange.as_str()),
            Self::Address(_) => None,
        }
    }
}

/// Resolver settings. Defaults: system configuration, 5s per query, no retry.
///
/// Non-empty `name_servers` replace the configured nameservers (queried on
/// port 53).
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsOptions {
    pub timeout: Duration,
    pub attempts: usize,
    pub use_system_conf: bool,
    pub name_servers: Vec<IpAddr>,
}

impl Default for DnsOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            attempts: 1,
            use_system_conf: true,
            name_servers: Vec::new(),
        }
    }
}

impl DnsOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        // un timeout nul bloquerait indéfiniment côté resolver
        if !timeout.is_zero() {
            self.timeout = timeout;
        }
        self
    }

    pub fn with_name_servers(mut self, servers: impl IntoIterator<Item = IpAddr>) -> Self {
        self.name_servers = servers.into_iter().collect();
        self
    }
}

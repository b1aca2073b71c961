//! DNS mail-server resolution.
//!
//! [`resolve_mail_servers`] queries MX records and falls back to A records,
//! folding every lookup failure into an empty answer. [`SystemDns`] is the
//! production [`DnsLookup`]; tests plug in their own.

mod error;
mod resolver;
mod types;

pub use error::DnsError;
pub use resolver::{DnsLookup, SystemDns, normalize_domain, resolve_mail_servers};
pub use types::{DnsOptions, MailServer, MxRecord};

#[cfg(test)]
mod tests;

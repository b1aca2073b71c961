#![forbid(unsafe_code)]
//! mailqualify_lib : qualification d'adresses e-mail
//!
//! Syntax and domain-shape checks, MX/A reachability, sub-addressing and
//! disposable / whitelist / blacklist classification, one
//! [`AddressValidator`] per address.

pub mod address;
pub mod lists;
pub mod mx;
pub mod validator;

pub use address::{AddressParser, MailboxParser, ParseError, ParsedAddress};
pub use lists::{DomainList, DomainLists, ListError};
pub use mx::{DnsError, DnsLookup, DnsOptions, MailServer, MxRecord, SystemDns};
pub use validator::{
    AddressSummary, AddressValidator, QualifyOptions, QualifyOutcome, Rejection,
    ValidationReport, qualify, qualify_with,
};

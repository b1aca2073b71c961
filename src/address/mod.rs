//! Best-effort mailbox parsing.
//!
//! [`AddressParser`] is the seam used by the validator; [`MailboxParser`] is
//! the default implementation. It accepts `local@domain`, `Name <local@domain>`
//! and comments, and reports the bare address spec through
//! [`ParsedAddress::to_address`] so callers can detect input that was
//! silently rewritten.

mod error;
mod parser;
mod types;

pub use error::ParseError;
pub use parser::MailboxParser;
pub use types::ParsedAddress;

pub trait AddressParser {
    fn parse(&self, raw: &str) -> Result<ParsedAddress, ParseError>;
}

impl<T: AddressParser + ?Sized> AddressParser for &T {
    fn parse(&self, raw: &str) -> Result<ParsedAddress, ParseError> {
        (**self).parse(raw)
    }
}

/// Première occurrence d'un caractère codé sur plus d'un octet.
pub fn find_multi_byte(raw: &str) -> Option<(usize, char)> {
    raw.char_indices().find(|(_, ch)| ch.len_utf8() > 1)
}

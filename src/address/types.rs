#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    pub local: String,
    pub domain: Option<String>,
}

impl ParsedAddress {
    pub fn new(local: impl Into<String>, domain: Option<String>) -> Self {
        Self {
            local: local.into(),
            domain,
        }
    }

    /// Domain non vide, s'il y en a un.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref().filter(|d| !d.is_empty())
    }

    /// Re-serializes the address spec (`local@domain`), without display name
    /// or comments. Used for round-trip comparison against the raw input.
    pub fn to_address(&self) -> String {
        match &self.domain {
            Some(domain) => format!("{}@{}", self.local, domain),
            None => self.local.clone(),
        }
    }
}

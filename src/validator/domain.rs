const PROHIBITED_DOMAIN_CHARACTERS: [char; 4] = ['+', '!', '_', '/'];

/// Règles de forme du domaine. Push des raisons invalidantes dans `reasons`.
pub(crate) fn check_domain(domain: &str, reasons: &mut Vec<String>) {
    if let Some(c) = domain
        .chars()
        .find(|c| PROHIBITED_DOMAIN_CHARACTERS.contains(c) || c.is_whitespace())
    {
        reasons.push(format!("domain contains prohibited character {c:?}"));
    }

    // au moins un point
    if !domain.contains('.') {
        reasons.push("domain must contain at least one dot".to_string());
    }
    if domain.contains("..") {
        reasons.push("domain contains consecutive dots".to_string());
    }
    if domain.starts_with('.') {
        reasons.push("domain cannot start with '.'".to_string());
    }
    if domain.starts_with('-') {
        reasons.push("domain cannot start with '-'".to_string());
    }
    if domain.contains("-.") {
        reasons.push("domain label cannot end with '-'".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reasons(domain: &str) -> Vec<String> {
        let mut reasons = vec![];
        check_domain(domain, &mut reasons);
        reasons
    }

    #[test]
    fn basic_domain_ok() {
        assert!(reasons("example.com").is_empty());
        assert!(reasons("mx-1.sub.example.co.uk").is_empty());
    }

    #[test]
    fn prohibited_characters() {
        for domain in ["exa+mple.com", "exa!mple.com", "exa_mple.com", "exa/mple.com"] {
            assert_eq!(reasons(domain).len(), 1, "{domain}");
        }
        assert!(!reasons("exa mple.com").is_empty());
        assert!(!reasons("example.com\t").is_empty());
    }

    #[test]
    fn dot_and_dash_rules() {
        assert_eq!(reasons("localhost"), ["domain must contain at least one dot"]);
        assert_eq!(reasons("example..com"), ["domain contains consecutive dots"]);
        assert_eq!(reasons(".example.com"), ["domain cannot start with '.'"]);
        assert_eq!(reasons("-example.com"), ["domain cannot start with '-'"]);
        assert_eq!(reasons("exam-.com"), ["domain label cannot end with '-'"]);
    }
}

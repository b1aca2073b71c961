/// Délimiteur de sous-adressage (`user+tag@domain`).
pub const SUBADDRESS_DELIMITER: char = '+';

pub(crate) fn is_subaddressed(local: &str) -> bool {
    local.contains(SUBADDRESS_DELIMITER)
}

/// Rejects a dot directly before the `@`.
pub(crate) fn check_address(address: &str, reasons: &mut Vec<String>) {
    if address.contains(".@") {
        reasons.push("address cannot contain '.' directly before '@'".to_string());
    }
}

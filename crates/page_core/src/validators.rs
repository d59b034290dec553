//! Syntax checks for contact details. Total functions; no side effects.

/// `local@domain.tld` shape: no whitespace, exactly one `@`, and a `.` inside the domain
/// with at least one character on each side.
pub fn validate_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(idx, c)| c == '.' && idx > 0 && idx + 1 < domain.len())
}

/// Ten-digit mobile number starting with 6-9, ignoring any formatting characters.
pub fn validate_phone(value: &str) -> bool {
    let digits: Vec<u8> = value
        .bytes()
        .filter(u8::is_ascii_digit)
        .collect();
    digits.len() == 10 && (b'6'..=b'9').contains(&digits[0])
}

//! Contact field canonicalization.

/// Canonicalize an email address: trimmed, lower-cased, minimally
/// shape-checked. Anything that does not look like an address is `None`.
pub fn normalize_email(raw: &str) -> Option<String> {
    let cleaned = raw.trim().to_lowercase();
    if cleaned.is_empty() || cleaned.len() > 100 {
        return None;
    }

    let (local, domain) = cleaned.split_once('@')?;
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return None;
    }
    if cleaned.contains(char::is_whitespace) {
        return None;
    }

    Some(cleaned)
}

/// Canonicalize a phone number to bare digits.
///
/// Extensions are stripped, formatting removed, and a leading US country
/// code dropped from 11-digit numbers. Fewer than 7 digits is not a
/// phone number.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }

    // Cut at an extension marker
    let main = lowered
        .split_once("ext")
        .map(|(before, _)| before)
        .unwrap_or(&lowered);

    let mut digits: String = main.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() == 11 && digits.starts_with('1') {
        digits.remove(0);
    }

    if digits.len() >= 7 {
        Some(digits)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_lowercased_and_trimmed() {
        assert_eq!(
            normalize_email("  JANE@X.COM "),
            Some("jane@x.com".to_string())
        );
    }

    #[test]
    fn test_email_shape_checks() {
        assert_eq!(normalize_email("not-an-email"), None);
        assert_eq!(normalize_email("@x.com"), None);
        assert_eq!(normalize_email("jane@"), None);
        assert_eq!(normalize_email("jane@localhost"), None);
        assert_eq!(normalize_email(""), None);
    }

    #[test]
    fn test_phone_formatting_stripped() {
        assert_eq!(
            normalize_phone("(918) 555-0142 ext. 3"),
            Some("9185550142".to_string())
        );
        assert_eq!(
            normalize_phone("918.555.0142"),
            Some("9185550142".to_string())
        );
    }

    #[test]
    fn test_phone_country_code_dropped() {
        assert_eq!(
            normalize_phone("+1 918 555 0142"),
            Some("9185550142".to_string())
        );
    }

    #[test]
    fn test_phone_too_short_is_none() {
        assert_eq!(normalize_phone("555"), None);
        assert_eq!(normalize_phone("n/a"), None);
        assert_eq!(normalize_phone(""), None);
    }
}

//! Monetary amount parsing.
//!
//! Award amounts arrive as free text: `"$1,234.56"`, `"$2.5k"`,
//! `"$1M - $5M"`. Amounts normalize to whole currency units, rounded;
//! ranges resolve to their lower bound. Anything unparseable is `None`.

/// Parse a raw money string into whole currency units.
pub fn parse_amount(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('-') {
        return None;
    }

    // Ranges resolve to the first segment that parses (the lower bound)
    trimmed
        .split(['-', '–'])
        .flat_map(|seg| seg.split(" to "))
        .find_map(parse_single)
}

/// Parse one amount: optional `$`, thousands separators, and a k/M/B
/// magnitude suffix.
fn parse_single(segment: &str) -> Option<i64> {
    let cleaned: String = segment
        .trim()
        .trim_start_matches('$')
        .replace(',', "")
        .trim()
        .to_string();
    if cleaned.is_empty() {
        return None;
    }

    let (number_part, multiplier) = match cleaned.chars().last() {
        Some('k') | Some('K') => (&cleaned[..cleaned.len() - 1], 1_000.0),
        Some('m') | Some('M') => (&cleaned[..cleaned.len() - 1], 1_000_000.0),
        Some('b') | Some('B') => (&cleaned[..cleaned.len() - 1], 1_000_000_000.0),
        _ => (cleaned.as_str(), 1.0),
    };

    let value: f64 = number_part.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }

    Some((value * multiplier).round() as i64)
}

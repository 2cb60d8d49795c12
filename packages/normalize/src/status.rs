//! Status canonicalization.
//!
//! Sources spell lifecycle states a dozen ways; the synonym table folds
//! them into the four canonical states. Unmapped values pass through in
//! their lower-cased form rather than being guessed at.

/// Canonicalize a raw status string.
pub fn normalize_status(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    match lowered.as_str() {
        "open" | "active" | "posted" | "available" => "open".to_string(),
        "closed" | "expired" | "ended" => "closed".to_string(),
        "awarded" | "completed" => "awarded".to_string(),
        "cancelled" | "canceled" => "cancelled".to_string(),
        _ => lowered,
    }
}

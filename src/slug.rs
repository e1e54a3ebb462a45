//! Slug canonicalization.
//!
//! Every store is identified by a canonical slug. Raw identifiers coming from
//! seed tables, persisted records and remote directories are trimmed,
//! lower-cased and hyphenated, then looked up in a hand-maintained alias table
//! that folds historical spellings onto one slug.

/// Historical spellings and rebrand names mapped to their canonical slug.
///
/// Hand-maintained. Entries such as `detail`/`details` are guesses for
/// near-duplicate names and have not been confirmed as the same store.
pub const SLUG_ALIASES: &[(&str, &str)] = &[
    ("sherine", "sheirine"),
    ("sheirin", "sheirine"),
    ("delta", "delta-store"),
    ("details", "delta-store"),
    ("detail", "delta-store"),
    ("megna", "magna-beauty"),
    ("magna", "magna-beauty"),
    ("magna_beauty", "magna-beauty"),
];

/// Map a raw identifier to its canonical slug.
///
/// Returns an empty string for empty or whitespace-only input; callers must
/// treat that as "unidentified" and never register a record under it.
///
/// ```
/// use store_registry::canonicalize;
///
/// assert_eq!(canonicalize("  Sherine "), "sheirine");
/// assert_eq!(canonicalize("Pretty  Beauty"), "pretty-beauty");
/// assert_eq!(canonicalize("   "), "");
/// ```
pub fn canonicalize(raw: &str) -> String {
    let normalized = normalize(raw);
    match alias_for(&normalized) {
        Some(canonical) => canonical.to_string(),
        None => normalized,
    }
}

/// Canonicalize an optional identifier; `None` maps to the empty slug.
pub fn canonicalize_opt(raw: Option<&str>) -> String {
    raw.map(canonicalize).unwrap_or_default()
}

fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn alias_for(normalized: &str) -> Option<&'static str> {
    SLUG_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, canonical)| *canonical)
}

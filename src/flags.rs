//! Flag canonicalization, grounded on
//! `examples/deuxfleurs-org-aerogramme/aero-proto/src/imap/flags.rs`'s
//! `from_str`: system flags are matched on their well-known backslash
//! form, anything else is taken to be a user keyword and passed through
//! unchanged (minus surrounding whitespace).

/// Canonicalizes a single flag atom/string as STORE and FETCH-item
/// parsing require: recognized system flags get their canonical
/// `\Xxx` spelling regardless of the case the client sent; anything
/// else passes through as-is (IMAP keywords are case-sensitive).
pub fn canonical_flag(raw: &str) -> String {
    if let Some(rest) = raw.strip_prefix('\\') {
        match rest.to_ascii_lowercase().as_str() {
            "seen" => "\\Seen".to_string(),
            "answered" => "\\Answered".to_string(),
            "flagged" => "\\Flagged".to_string(),
            "deleted" => "\\Deleted".to_string(),
            "draft" => "\\Draft".to_string(),
            "recent" => "\\Recent".to_string(),
            _ => format!("\\{rest}"),
        }
    } else {
        raw.to_string()
    }
}

pub const DEFAULT_FLAGS: [&str; 5] = [
    "\\Answered",
    "\\Flagged",
    "\\Deleted",
    "\\Seen",
    "\\Draft",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_case() {
        assert_eq!(canonical_flag("\\seen"), "\\Seen");
        assert_eq!(canonical_flag("\\DELETED"), "\\Deleted");
    }

    #[test]
    fn keywords_pass_through() {
        assert_eq!(canonical_flag("$Junk"), "$Junk");
    }
}

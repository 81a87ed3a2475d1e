use once_cell::sync::Lazy;
use regex::Regex;

// Greedy prefix so the last `:collateral:` marker wins.
static NAMESPACED_SIGNAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.*:collateral:(?P<bare>.+)$").unwrap());

/// Reduces a signal name to the form used for every comparison.
///
/// The runtime sometimes reports signals with their owning namespace attached
/// (`<namespace>:collateral:<name>`); only `<name>` identifies the signal.
pub fn canonical_signal_name(raw: &str) -> String {
    let trimmed = raw.trim();
    match NAMESPACED_SIGNAL_RE.captures(trimmed) {
        Some(caps) => caps["bare"].trim().to_string(),
        None => trimmed.to_string(),
    }
}

/// Canonical name, or `None` when nothing meaningful remains.
pub fn canonical_optional(raw: Option<&str>) -> Option<String> {
    raw.map(canonical_signal_name).filter(|name| !name.is_empty())
}

/// Owners the runtime could not attribute.
pub fn is_valid_owner(owner: &str) -> bool {
    let owner = owner.trim();
    !owner.is_empty() && owner != "unknown"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_namespace_prefix() {
        assert_eq!(canonical_signal_name("app:collateral:tick"), "tick");
        assert_eq!(canonical_signal_name("a:b:collateral:tick"), "tick");
        assert_eq!(canonical_signal_name("  tick "), "tick");
    }

    #[test]
    fn last_marker_wins() {
        assert_eq!(canonical_signal_name("x:collateral:y:collateral:z"), "z");
    }

    #[test]
    fn leaves_plain_names_alone() {
        assert_eq!(canonical_signal_name("collateral"), "collateral");
        assert_eq!(canonical_signal_name("ns:tick"), "ns:tick");
        assert_eq!(canonical_signal_name(":collateral:"), ":collateral:");
    }

    #[test]
    fn empty_optional_names_are_dropped() {
        assert_eq!(canonical_optional(None), None);
        assert_eq!(canonical_optional(Some("   ")), None);
        assert_eq!(canonical_optional(Some("p:collateral:x")), Some("x".to_string()));
    }

    #[test]
    fn unknown_and_blank_owners_are_invalid() {
        assert!(!is_valid_owner("unknown"));
        assert!(!is_valid_owner(""));
        assert!(!is_valid_owner("  "));
        assert!(is_valid_owner("neuron-1"));
    }
}

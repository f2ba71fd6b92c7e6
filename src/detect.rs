use tracing::debug;

use crate::registry::{
    AMEX_DELTA, CHASE, CO_CHECKING, CO_QUICKSILVER, CO_SAVINGS, DISCOVER, SOFI_CHECKING,
    SOFI_SAVINGS, WF_CHECKING, WF_SAVINGS,
};

/// Filename substring → format key. Evaluated top to bottom, first hit
/// wins, so a pattern must come before any pattern it is a substring of.
pub const DETECTION_RULES: &[(&str, &str)] = &[
    ("360Checking", CO_CHECKING),
    ("360PerformanceSavings", CO_SAVINGS),
    ("transaction_download", CO_QUICKSILVER),
    ("SOFI-Checking", SOFI_CHECKING),
    ("SOFI-Savings", SOFI_SAVINGS),
    ("WF-Checking", WF_CHECKING),
    ("WF-Savings", WF_SAVINGS),
    ("activity", AMEX_DELTA),
    ("Chase", CHASE),
    ("Discover", DISCOVER),
];

/// Suggest a format key from an uploaded filename. Case-sensitive.
/// Only a hint: the key bound to the target account decides the parse.
pub fn detect(filename: &str) -> Option<&'static str> {
    detect_with(DETECTION_RULES, filename)
}

pub fn detect_with(rules: &[(&str, &'static str)], filename: &str) -> Option<&'static str> {
    let hit = rules
        .iter()
        .find(|(substring, _)| filename.contains(substring))
        .map(|&(_, key)| key);
    debug!(filename, format = ?hit, "filename detection");
    hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FormatRegistry;

    #[test]
    fn test_detects_each_rule() {
        assert_eq!(detect("360Checking.csv"), Some(CO_CHECKING));
        assert_eq!(detect("360PerformanceSavings.csv"), Some(CO_SAVINGS));
        assert_eq!(detect("transaction_download.csv"), Some(CO_QUICKSILVER));
        assert_eq!(detect("SOFI-Checking-123.csv"), Some(SOFI_CHECKING));
        assert_eq!(detect("SOFI-Savings-456.csv"), Some(SOFI_SAVINGS));
        assert_eq!(detect("WF-Checking.csv"), Some(WF_CHECKING));
        assert_eq!(detect("WF-Savings.csv"), Some(WF_SAVINGS));
        assert_eq!(detect("activity.csv"), Some(AMEX_DELTA));
        assert_eq!(detect("Chase1234.csv"), Some(CHASE));
        assert_eq!(detect("Discover-Export.csv"), Some(DISCOVER));
    }

    #[test]
    fn test_matches_substring_anywhere() {
        assert_eq!(detect("SOFI-Savings-0000-2020-01-01T00_00_00.csv"), Some(SOFI_SAVINGS));
    }

    #[test]
    fn test_unknown_and_empty() {
        assert_eq!(detect("unknown_bank.csv"), None);
        assert_eq!(detect(""), None);
    }

    #[test]
    fn test_case_sensitive() {
        assert_eq!(detect("sofi-checking.csv"), None);
    }

    #[test]
    fn test_rules_are_most_specific_first() {
        for (i, (earlier, _)) in DETECTION_RULES.iter().enumerate() {
            for (later, _) in &DETECTION_RULES[i + 1..] {
                assert!(
                    !later.contains(earlier),
                    "{earlier:?} shadows the more specific {later:?}"
                );
            }
        }
    }

    #[test]
    fn test_order_decides_overlapping_rules() {
        let generic_first: &[(&str, &str)] = &[("Checking", "generic"), ("360Checking", CO_CHECKING)];
        let specific_first: &[(&str, &str)] = &[("360Checking", CO_CHECKING), ("Checking", "generic")];
        assert_eq!(detect_with(generic_first, "360Checking.csv"), Some("generic"));
        assert_eq!(detect_with(specific_first, "360Checking.csv"), Some(CO_CHECKING));
        assert_eq!(detect_with(specific_first, "Checking.csv"), Some("generic"));
    }

    #[test]
    fn test_every_rule_resolves_in_registry() {
        let registry = FormatRegistry::builtin();
        for (_, key) in DETECTION_RULES {
            assert!(registry.contains(key), "rule points at unknown format {key}");
        }
    }
}

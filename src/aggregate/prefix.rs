//! Prefix derivation

/// Marker appended to every derived prefix
pub const WILDCARD: &str = "*";

/// Maps a key to its prefix group
///
/// Explicit prefixes are tried first, in order; the first one the key
/// starts with wins. Otherwise the key is cut at its last separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixRule {
    explicit: Vec<String>,
    separator: String,
}

impl PrefixRule {
    /// Create a rule
    ///
    /// `separator` must not be empty; configuration validation rejects it.
    pub fn new(explicit: Vec<String>, separator: impl Into<String>) -> Self {
        Self {
            explicit,
            separator: separator.into(),
        }
    }

    /// Rule with only separator-based grouping
    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self::new(Vec::new(), separator)
    }

    /// Derive the prefix group of `key`
    ///
    /// - `user:42` with separator `:` gives `user:*`
    /// - `a:b:c` gives `a:b:*`
    /// - a key without the separator gives `*`
    pub fn derive(&self, key: &str) -> String {
        if let Some(prefix) = self.explicit.iter().find(|p| key.starts_with(p.as_str())) {
            return format!("{}{}", prefix, WILDCARD);
        }

        match key.rsplit_once(self.separator.as_str()) {
            Some((head, _)) => format!("{}{}{}", head, self.separator, WILDCARD),
            None => WILDCARD.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_separator_derivation() {
        let rule = PrefixRule::with_separator(":");
        assert_eq!(rule.derive("user:1"), "user:*");
        assert_eq!(rule.derive("a:b:c"), "a:b:*");
        assert_eq!(rule.derive("user:"), "user:*");
        assert_eq!(rule.derive(":x"), ":*");
        assert_eq!(rule.derive("plain"), "*");
        assert_eq!(rule.derive(""), "*");
    }

    #[test]
    fn test_multi_char_separator() {
        let rule = PrefixRule::with_separator("::");
        assert_eq!(rule.derive("app::cache::item"), "app::cache::*");
        assert_eq!(rule.derive("app:cache"), "*");
    }

    #[test]
    fn test_explicit_prefix_wins() {
        let rule = PrefixRule::new(vec!["user:".into()], ":");
        assert_eq!(rule.derive("user:42"), "user:*");
        assert_eq!(rule.derive("user:42:profile"), "user:*");
        assert_eq!(rule.derive("order:1:item"), "order:1:*");
    }

    #[test]
    fn test_first_explicit_match_wins() {
        let rule = PrefixRule::new(vec!["se".into(), "session".into()], ":");
        assert_eq!(rule.derive("session:abc"), "se*");

        let rule = PrefixRule::new(vec!["session".into(), "se".into()], ":");
        assert_eq!(rule.derive("session:abc"), "session*");
        assert_eq!(rule.derive("seq"), "se*");
    }

    proptest! {
        #[test]
        fn prop_derive_is_deterministic_and_marked(key in "[a-z:]{0,24}") {
            let rule = PrefixRule::with_separator(":");
            let first = rule.derive(&key);
            prop_assert_eq!(&first, &rule.derive(&key));
            prop_assert!(first.ends_with(WILDCARD));
            // The group without its marker is always a prefix of the key
            prop_assert!(key.starts_with(first.trim_end_matches(WILDCARD)));
        }

        #[test]
        fn prop_explicit_prefix_takes_priority(suffix in "[a-z:]{0,16}") {
            let rule = PrefixRule::new(vec!["tenant:".into()], ":");
            let key = format!("tenant:{}", suffix);
            prop_assert_eq!(rule.derive(&key), "tenant:*");
        }
    }
}

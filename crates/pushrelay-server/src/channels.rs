//! The notification-type allow-list.

/// Immutable, sorted set of valid notification types.
///
/// Owned by the router state rather than living in global state, so
/// tests (and future deployments) can substitute their own set. The
/// `Display` form is what rejected requests see.
#[derive(Debug, Clone)]
pub struct ChannelSet {
    names: Vec<String>,
}

impl ChannelSet {
    /// Build a set from the given names. Sorted and deduplicated.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        Self { names }
    }

    /// Whether `name` is a valid notification type.
    pub fn contains(&self, name: &str) -> bool {
        self.names.binary_search_by(|n| n.as_str().cmp(name)).is_ok()
    }
}

impl Default for ChannelSet {
    /// The default deployment set.
    fn default() -> Self {
        Self::new(["checkouts", "fines", "general", "holds", "pmc"])
    }
}

impl std::fmt::Display for ChannelSet {
    /// Renders `{a, b, c}` — lexicographic order, comma-and-space
    /// separated. Rejection messages quote this verbatim.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_set_members() {
        let set = ChannelSet::default();
        for name in ["checkouts", "fines", "general", "holds", "pmc"] {
            assert!(set.contains(name), "{name} should be valid");
        }
        assert!(!set.contains("bogus"));
        assert!(!set.contains(""));
    }

    #[test]
    fn display_is_sorted_and_braced() {
        let set = ChannelSet::new(["holds", "fines", "checkouts", "pmc", "general"]);
        assert_eq!(set.to_string(), "{checkouts, fines, general, holds, pmc}");
    }

    #[test]
    fn duplicates_collapse() {
        let set = ChannelSet::new(["b", "a", "b"]);
        assert_eq!(set.to_string(), "{a, b}");
    }
}

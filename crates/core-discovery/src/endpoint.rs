//! Order-independent endpoint sets
//!
//! The membership service makes no promise about the order in which it lists
//! member servers, so two answers with the same members must compare equal.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A set of unique endpoint strings
///
/// Backed by an ordered set so that equality, hashing and display never
/// depend on insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointSet {
    endpoints: BTreeSet<String>,
}

impl EndpointSet {
    /// Create an empty endpoint set
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct endpoints
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// True when the membership service reported no servers
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn contains(&self, endpoint: &str) -> bool {
        self.endpoints.contains(endpoint)
    }

    /// Iterate endpoints in a stable (sorted) order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.endpoints.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for EndpointSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            endpoints: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a EndpointSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.endpoints.iter()
    }
}

impl fmt::Display for EndpointSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, endpoint) in self.endpoints.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", endpoint)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_order() {
        let a: EndpointSet = ["host1:1000", "host2:2000", "host3:3000"]
            .into_iter()
            .collect();
        let b: EndpointSet = ["host3:3000", "host1:1000", "host2:2000"]
            .into_iter()
            .collect();

        assert_eq!(a, b);
    }

    #[test]
    fn test_duplicates_collapse() {
        let set: EndpointSet = ["host1:1000", "host1:1000"].into_iter().collect();
        assert_eq!(set.len(), 1);
        assert!(set.contains("host1:1000"));
    }

    #[test]
    fn test_different_members_not_equal() {
        let a: EndpointSet = ["host1:1000"].into_iter().collect();
        let b: EndpointSet = ["host1:1000", "host2:2000"].into_iter().collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_set() {
        let set = EndpointSet::new();
        assert!(set.is_empty());
        assert_eq!(set.to_string(), "{}");
    }

    #[test]
    fn test_display_is_sorted() {
        let set: EndpointSet = ["b:2", "a:1"].into_iter().collect();
        assert_eq!(set.to_string(), "{a:1, b:2}");
    }

    #[test]
    fn test_serializes_as_list() {
        let set: EndpointSet = ["b:2", "a:1"].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["a:1","b:2"]"#);
    }
}

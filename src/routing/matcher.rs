//! Route matching logic.
//!
//! # Responsibilities
//! - Match request path prefix (case-sensitive)
//!
//! # Design Decisions
//! - Plain prefix comparison, no regex
//! - An empty prefix matches every path

use crate::http::Request;

/// Matches the request path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Returns true if the request path starts with the prefix.
    pub fn matches(&self, req: &Request) -> bool {
        req.path().starts_with(&self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;

    #[test]
    fn test_path_matcher() {
        let matcher = PathPrefixMatcher::new("v1/");

        assert!(matcher.matches(&Request::new("v1/users", Method::Get)));
        assert!(!matcher.matches(&Request::new("v2/users", Method::Get)));
        // Case sensitive
        assert!(!matcher.matches(&Request::new("V1/users", Method::Get)));
    }

    #[test]
    fn test_empty_prefix_matches_everything() {
        let matcher = PathPrefixMatcher::new("");
        assert!(matcher.matches(&Request::new("anything", Method::Post)));
    }
}

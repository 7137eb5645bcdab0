//! Simulated request values.
//!
//! # Responsibilities
//! - Carry the fields routing needs (path, method, session key, sticky flag)
//! - Stay immutable once built

use std::fmt;

use serde::{Deserialize, Serialize};

/// HTTP method of a simulated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// A single simulated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    path: String,
    method: Method,
    session_key: String,
    sticky: bool,
}

impl Request {
    /// Create a non-sticky request without a session.
    pub fn new(path: impl Into<String>, method: Method) -> Self {
        Self {
            path: path.into(),
            method,
            session_key: String::new(),
            sticky: false,
        }
    }

    /// Attach a session key and make the request sticky.
    pub fn sticky(mut self, session_key: impl Into<String>) -> Self {
        self.session_key = session_key.into();
        self.sticky = true;
        self
    }

    /// Attach a session key without enabling stickiness.
    pub fn with_session(mut self, session_key: impl Into<String>) -> Self {
        self.session_key = session_key.into();
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    pub fn is_sticky(&self) -> bool {
        self.sticky
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builders() {
        let plain = Request::new("v1/users", Method::Get);
        assert!(!plain.is_sticky());
        assert_eq!(plain.session_key(), "");

        let sticky = Request::new("v1/users", Method::Post).sticky("user-7");
        assert!(sticky.is_sticky());
        assert_eq!(sticky.session_key(), "user-7");
        assert_eq!(sticky.method(), Method::Post);
    }

    #[test]
    fn test_method_serde_uppercase() {
        let method: Method = serde_json::from_str("\"POST\"").unwrap();
        assert_eq!(method, Method::Post);
        assert_eq!(method.to_string(), "POST");
    }
}

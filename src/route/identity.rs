//! Content-addressed route identities.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::RouteError;
use crate::http::Method;

/// Length of a hex-encoded identity (SHA-256, two characters per byte).
pub const ROUTE_ID_LEN: usize = 64;

/// Stable identity of a route node.
///
/// Derived from the node's resolved URL and its method set, so the same route
/// definition produces the same id on every start-up. Two handler nodes with
/// the same URL and the same methods are the same logical route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(String);

impl RouteId {
    /// Derive the identity for `url` served by `methods`.
    ///
    /// Method tokens are sorted lexicographically and appended to the URL
    /// without separator before hashing, so `[POST, GET]` and `[GET, POST]`
    /// produce the same id.
    ///
    /// # Examples
    ///
    /// ```
    /// use dynaroute::http::Method;
    /// use dynaroute::route::RouteId;
    ///
    /// let a = RouteId::derive("/api/user/:id", &[Method::Post, Method::Get]);
    /// let b = RouteId::derive("/api/user/:id", &[Method::Get, Method::Post]);
    /// assert_eq!(a, b);
    /// assert_eq!(a.as_str().len(), 64);
    /// ```
    pub fn derive(url: &str, methods: &[Method]) -> Self {
        let mut tokens: Vec<&str> = methods.iter().map(Method::as_str).collect();
        tokens.sort_unstable();

        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        for token in tokens {
            hasher.update(token.as_bytes());
        }
        Self(hex::encode(hasher.finalize()))
    }

    /// Parse an id received from outside the process, e.g. an admin request.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidId`] unless `raw` is 64 hex characters.
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        let raw = raw.trim();
        if raw.len() != ROUTE_ID_LEN || hex::decode(raw).is_err() {
            return Err(RouteError::InvalidId(raw.to_owned()));
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    /// Returns the hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the first eight hex characters, for log lines.
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for RouteId {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for RouteId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

//! Destination value object
//!
//! The absolute URL that proxied requests are forwarded to.
//!
//! # Examples
//!
//! ```
//! use domain::Destination;
//!
//! let dest = Destination::parse("http://localhost:3000/api").unwrap();
//! assert_eq!(dest.host(), "localhost");
//! assert_eq!(dest.port(), Some(3000));
//!
//! // Relative references are rejected
//! assert!(Destination::parse("/just/a/path").is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::DomainError;

/// A validated absolute `http`/`https` URL with a host
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Destination(Url);

impl Destination {
    /// Parse and validate a destination URL
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDestination` if the string is not an
    /// absolute URL, uses a scheme other than `http`/`https`, or has no host.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let url = Url::parse(input.trim())
            .map_err(|e| DomainError::invalid_destination(format!("{input:?}: {e}")))?;
        Self::try_from(url)
    }

    /// Scheme of the destination (`http` or `https`)
    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    /// Host of the destination
    pub fn host(&self) -> &str {
        // Validated on construction
        self.0.host_str().unwrap_or_default()
    }

    /// Explicit port, if one was given
    pub fn port(&self) -> Option<u16> {
        self.0.port()
    }

    /// `host[:port]` authority
    pub fn authority(&self) -> String {
        match self.0.port() {
            Some(port) => format!("{}:{port}", self.host()),
            None => self.host().to_string(),
        }
    }

    /// Path component, always starting with `/`
    pub fn path(&self) -> &str {
        self.0.path()
    }

    /// Query component, if any
    pub fn query(&self) -> Option<&str> {
        self.0.query()
    }

    /// Borrow the underlying URL
    pub const fn as_url(&self) -> &Url {
        &self.0
    }

    /// The URL as a string slice
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<Url> for Destination {
    type Error = DomainError;

    fn try_from(url: Url) -> Result<Self, Self::Error> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DomainError::invalid_destination(format!(
                "unsupported scheme {:?} in {url}",
                url.scheme()
            )));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(DomainError::invalid_destination(format!(
                "missing host in {url}"
            )));
        }
        Ok(Self(url))
    }
}

impl FromStr for Destination {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Destination {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_http_url() {
        let dest = Destination::parse("http://example.com").unwrap();
        assert_eq!(dest.scheme(), "http");
        assert_eq!(dest.host(), "example.com");
        assert_eq!(dest.port(), None);
        assert_eq!(dest.path(), "/");
    }

    #[test]
    fn parses_https_url_with_port_path_and_query() {
        let dest = Destination::parse("https://api.example.com:8443/v1?key=abc").unwrap();
        assert_eq!(dest.scheme(), "https");
        assert_eq!(dest.authority(), "api.example.com:8443");
        assert_eq!(dest.path(), "/v1");
        assert_eq!(dest.query(), Some("key=abc"));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let dest = Destination::parse("  http://localhost:3000 ").unwrap();
        assert_eq!(dest.authority(), "localhost:3000");
    }

    #[test]
    fn rejects_relative_reference() {
        let err = Destination::parse("/relative/path").unwrap_err();
        assert!(matches!(err, DomainError::InvalidDestination(_)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(Destination::parse("http://[::1").is_err());
        assert!(Destination::parse("").is_err());
        assert!(Destination::parse("not a url").is_err());
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = Destination::parse("ftp://files.example.com").unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn rejects_url_without_host() {
        assert!(Destination::parse("mailto:someone@example.com").is_err());
    }

    #[test]
    fn from_str_matches_parse() {
        let dest: Destination = "http://localhost:9000".parse().unwrap();
        assert_eq!(dest.port(), Some(9000));
    }

    #[test]
    fn display_is_full_url() {
        let dest = Destination::parse("http://localhost:3000/base").unwrap();
        assert_eq!(dest.to_string(), "http://localhost:3000/base");
    }

    #[test]
    fn deserialization_validates() {
        let ok: Result<Destination, _> = serde_json::from_str("\"http://localhost:1\"");
        assert!(ok.is_ok());

        let bad: Result<Destination, _> = serde_json::from_str("\"localhost\"");
        assert!(bad.is_err());
    }
}

//! HTTP protocol types shared by route definitions.
//!
//! Only the request [`Method`] lives here. Status codes, headers and message
//! parsing belong to the serving layer, which consumes the route tree but is
//! not part of it.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An HTTP request method.
///
/// Standard methods are represented as unit variants for zero-cost comparison.
/// Non-standard methods are captured in the `Custom` variant.
///
/// Methods compare, hash and order by their token, so a sorted method set reads
/// the same as a sorted list of strings (`DELETE < GET < POST`) and
/// `Custom("GET")` is the same method as `Get`.
///
/// # Examples
///
/// ```
/// use dynaroute::http::Method;
///
/// let method: Method = "GET".parse().unwrap();
/// assert_eq!(method, Method::Get);
/// assert_eq!(method.as_str(), "GET");
/// assert!(Method::Delete < Method::Get);
/// ```
#[derive(Debug, Clone)]
pub enum Method {
    /// GET — retrieve a representation of the target resource.
    Get,
    /// POST — perform resource-specific processing on the request payload.
    Post,
    /// PUT — replace the target resource's current representation.
    Put,
    /// DELETE — remove the association between the target resource and its functionality.
    Delete,
    /// HEAD — identical to GET but without a response body.
    Head,
    /// OPTIONS — describe the communication options for the target resource.
    Options,
    /// PATCH — apply partial modifications to a resource.
    Patch,
    /// CONNECT — establish a tunnel to the server identified by the target resource.
    Connect,
    /// TRACE — perform a message loop-back test along the path to the target resource.
    Trace,
    /// A non-standard extension method.
    Custom(String),
}

impl Method {
    /// Every standard method, in token order. Used by the "any verb" builder.
    pub const STANDARD: [Method; 9] = [
        Method::Connect,
        Method::Delete,
        Method::Get,
        Method::Head,
        Method::Options,
        Method::Patch,
        Method::Post,
        Method::Put,
        Method::Trace,
    ];

    /// Returns the method as a string slice.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
            Self::Connect => "CONNECT",
            Self::Trace => "TRACE",
            Self::Custom(s) => s.as_str(),
        }
    }

    /// Map a `Custom` method that spells a standard token onto its variant.
    pub fn canonical(self) -> Self {
        match self {
            Self::Custom(token) => token.parse().unwrap_or_else(|never| match never {}),
            standard => standard,
        }
    }
}

impl PartialEq for Method {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Method {}

impl Hash for Method {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl Ord for Method {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for Method {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            "PATCH" => Self::Patch,
            "CONNECT" => Self::Connect,
            "TRACE" => Self::Trace,
            other => Self::Custom(other.to_owned()),
        })
    }
}

impl AsRef<str> for Method {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Serialize for Method {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Method {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        // Unknown tokens become `Custom`.
        Ok(token.parse().unwrap_or_else(|never| match never {}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_standard_and_custom() {
        assert_eq!("PATCH".parse::<Method>().unwrap(), Method::Patch);
        assert_eq!(
            "PURGE".parse::<Method>().unwrap(),
            Method::Custom("PURGE".to_owned())
        );
    }

    #[test]
    fn ordering_follows_token() {
        let mut methods = vec![Method::Put, Method::Get, Method::Delete, Method::Post];
        methods.sort();
        let tokens: Vec<&str> = methods.iter().map(Method::as_str).collect();
        assert_eq!(tokens, ["DELETE", "GET", "POST", "PUT"]);
    }

    #[test]
    fn standard_is_sorted() {
        let mut sorted = Method::STANDARD.to_vec();
        sorted.sort();
        assert_eq!(sorted, Method::STANDARD.to_vec());
    }

    #[test]
    fn custom_orders_among_standard() {
        assert!(Method::Custom("LINK".to_owned()) < Method::Options);
        assert!(Method::Custom("LINK".to_owned()) > Method::Get);
    }

    #[test]
    fn custom_spelling_of_standard_token_is_the_same_method() {
        use std::collections::HashSet;

        let spelled = Method::Custom("GET".to_owned());
        assert_eq!(spelled, Method::Get);
        assert_eq!(spelled.cmp(&Method::Get), Ordering::Equal);
        assert_eq!(spelled.clone().canonical(), Method::Get);
        assert!(matches!(spelled.clone().canonical(), Method::Get));

        let set: HashSet<Method> = [spelled, Method::Get].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn canonical_keeps_extension_methods() {
        let purge = Method::Custom("PURGE".to_owned()).canonical();
        assert!(matches!(purge, Method::Custom(ref token) if token == "PURGE"));
    }

    #[test]
    fn serde_uses_token() {
        let json = serde_json::to_string(&vec![Method::Get, Method::Custom("PURGE".into())]).unwrap();
        assert_eq!(json, r#"["GET","PURGE"]"#);
        let back: Vec<Method> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![Method::Get, Method::Custom("PURGE".into())]);
    }
}

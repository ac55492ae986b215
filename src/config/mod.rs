//! Router configuration.
//!
//! All fields have defaults, so an empty JSON object is a valid config:
//!
//! ```json
//! {
//!   "before": ["request_id", "trace"],
//!   "after": ["metrics"]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::middleware::MiddlewareChain;
use crate::route::RouteResult;

/// Start-up settings for a [`DynaRouter`](crate::router::DynaRouter).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Middleware names applied before every route's own chain.
    pub before: Vec<String>,

    /// Middleware names applied after every route's own chain.
    pub after: Vec<String>,
}

impl RouterConfig {
    /// Parse a config from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Config`](crate::route::RouteError::Config) when the
    /// document is not valid JSON or has fields of the wrong type.
    pub fn from_json(json: &str) -> RouteResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub(crate) fn middleware_chain(&self) -> MiddlewareChain {
        MiddlewareChain::new(self.before.clone(), self.after.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::RouteError;

    #[test]
    fn empty_object_uses_defaults() {
        assert_eq!(RouterConfig::from_json("{}").unwrap(), RouterConfig::default());
    }

    #[test]
    fn parses_lists() {
        let config = RouterConfig::from_json(r#"{"before":["a","b"],"after":["z"]}"#).unwrap();
        assert_eq!(config.before, ["a", "b"]);
        assert_eq!(config.after, ["z"]);

        let chain = config.middleware_chain();
        assert_eq!(chain.before(), ["a", "b"]);
    }

    #[test]
    fn wrong_type_is_config_error() {
        let err = RouterConfig::from_json(r#"{"before":"a"}"#).unwrap_err();
        assert!(matches!(err, RouteError::Config(_)));
    }
}

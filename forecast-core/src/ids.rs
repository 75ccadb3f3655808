//! Prefixed, time-sortable identifiers
//!
//! Identifiers follow the TypeID format (`<prefix>_<base32 uuidv7>`), so they
//! sort by creation time and say what they identify:
//!
//! ```rust
//! use forecast_core::ids::{EventId, RequestId};
//!
//! assert!(RequestId::new().as_str().starts_with("req_"));
//! assert!(EventId::new().as_str().starts_with("evt_"));
//! ```

use http::Request;
use mti::prelude::*;
use std::fmt;
use std::str::FromStr;
use tower_http::request_id::{MakeRequestId, RequestId as TowerRequestId};

/// Error type for identifier parsing.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// The ID could not be parsed as a valid TypeID.
    #[error("failed to parse ID: {0}")]
    Parse(#[from] MagicTypeIdError),

    /// The prefix was not the expected value.
    #[error("invalid prefix: expected '{expected}', got '{actual}'")]
    InvalidPrefix { expected: String, actual: String },
}

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(MagicTypeId);

        impl $name {
            /// Prefix carried by every ID of this type
            pub const PREFIX: &'static str = $prefix;

            #[must_use]
            pub fn new() -> Self {
                Self(Self::PREFIX.create_type_id::<V7>())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }

            #[must_use]
            pub fn prefix(&self) -> &str {
                self.0.prefix().as_str()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let mti = MagicTypeId::from_str(s)?;
                if mti.prefix().as_str() != Self::PREFIX {
                    return Err(IdError::InvalidPrefix {
                        expected: Self::PREFIX.to_string(),
                        actual: mti.prefix().as_str().to_string(),
                    });
                }
                Ok(Self(mti))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0.to_string()
            }
        }
    };
}

typed_id!(
    /// Identifier for a single HTTP request
    RequestId,
    "req"
);

typed_id!(
    /// Identifier for the log scope of one request
    ///
    /// Every line logged while handling the request carries it.
    EventId,
    "evt"
);

/// Generates a [`RequestId`] for tower-http's `SetRequestIdLayer`
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeTypedRequestId;

impl MakeRequestId for MakeTypedRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<TowerRequestId> {
        let id = RequestId::new();
        let header_value = http::HeaderValue::from_str(id.as_str()).ok()?;
        Some(TowerRequestId::new(header_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert_eq!(RequestId::new().prefix(), "req");
        assert_eq!(EventId::new().prefix(), "evt");
        // prefix (3) + underscore (1) + suffix (26)
        assert_eq!(EventId::new().as_str().len(), 30);
    }

    #[test]
    fn test_parse_rejects_other_prefix() {
        let result = EventId::from_str("req_01h455vb4pex5vsknk084sn02q");
        match result {
            Err(IdError::InvalidPrefix { expected, actual }) => {
                assert_eq!(expected, "evt");
                assert_eq!(actual, "req");
            }
            other => panic!("expected InvalidPrefix, got {other:?}"),
        }
        assert!(RequestId::from_str("req_invalid").is_err());
    }

    #[test]
    fn test_ids_are_time_ordered() {
        let first = EventId::new();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = EventId::new();
        assert!(first < second);
    }

    #[test]
    fn test_make_typed_request_id() {
        let mut maker = MakeTypedRequestId;
        let request = http::Request::builder().body(()).unwrap();

        let header_value = maker.make_request_id(&request).unwrap().into_header_value();
        assert!(header_value.to_str().unwrap().starts_with("req_"));
    }
}

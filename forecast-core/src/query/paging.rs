//! Offset/limit paging parameters

use serde::{Deserialize, Serialize};

use super::error::{Bounds, QueryError};

/// Items returned when no limit is given
pub const DEFAULT_LIMIT: i32 = 50;

/// `?offset=&limit=` paging window
///
/// Both values must lie in `0..=i32::MAX`. `pageSize` is accepted as an
/// alias for `limit`.
///
/// ```rust
/// use forecast_core::query::OffsetLimit;
///
/// let paging = OffsetLimit::default();
/// assert_eq!((paging.offset, paging.limit), (0, 50));
/// assert!(OffsetLimit::new(-1, 10).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetLimit {
    #[serde(default)]
    pub offset: i32,
    #[serde(default = "default_limit", alias = "pageSize")]
    pub limit: i32,
}

fn default_limit() -> i32 {
    DEFAULT_LIMIT
}

impl Default for OffsetLimit {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl OffsetLimit {
    /// Range-checked constructor
    pub fn new(offset: i32, limit: i32) -> Result<Self, QueryError> {
        let paging = Self { offset, limit };
        paging.validate()?;
        Ok(paging)
    }

    /// Reject negative values
    pub fn validate(&self) -> Result<(), QueryError> {
        for (field, value) in [("offset", self.offset), ("limit", self.limit)] {
            if value < 0 {
                return Err(QueryError::OutOfRange {
                    field: field.to_string(),
                    bounds: Bounds::Integer {
                        lower: 0,
                        upper: i64::from(i32::MAX),
                    },
                });
            }
        }
        Ok(())
    }

    /// Apply the window to an in-memory sequence
    pub fn window<I: IntoIterator>(&self, items: I) -> impl Iterator<Item = I::Item> {
        let offset = usize::try_from(self.offset).unwrap_or(0);
        let limit = usize::try_from(self.limit).unwrap_or(0);
        items.into_iter().skip(offset).take(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let paging: OffsetLimit = serde_json::from_str("{}").unwrap();
        assert_eq!(paging, OffsetLimit::default());
    }

    #[test]
    fn test_page_size_alias() {
        let paging: OffsetLimit = serde_json::from_str(r#"{"offset": 5, "pageSize": 10}"#).unwrap();
        assert_eq!(paging, OffsetLimit { offset: 5, limit: 10 });
    }

    #[test]
    fn test_negative_values_rejected() {
        let err = OffsetLimit::new(0, -5).unwrap_err();
        assert!(matches!(err, QueryError::OutOfRange { ref field, .. } if field == "limit"));
        assert_eq!(
            err.to_string(),
            "Integer must be between the following range: 0 - 2147483647"
        );
        assert!(OffsetLimit::new(0, 0).is_ok());
    }

    #[test]
    fn test_window() {
        let paging = OffsetLimit::new(2, 3).unwrap();
        let items: Vec<_> = paging.window(0..10).collect();
        assert_eq!(items, vec![2, 3, 4]);
    }
}

//! Filter and sort query-string grammar
//!
//! Filters are `field=value` pairs and sorts are `field:direction` pairs, both
//! comma separated, e.g. `?filter=CustomerName=TestName,City=Greenville` and
//! `?sort=CustomerName:asc,City:desc`. Field names are `[A-Za-z0-9_]+`, filter
//! values are `[A-Za-z0-9_ ]*` and directions are `asc` or `desc` in any case.
//! Trailing commas are tolerated.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::{QueryError, QueryKind};

static FILTER_QUERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+=[A-Za-z0-9_ ]*(?:,[A-Za-z0-9_]+=[A-Za-z0-9_ ]*)*,*$")
        .expect("filter grammar is a valid regex")
});

static FILTER_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z0-9_]+)=([A-Za-z0-9_ ]*)").expect("filter token is a valid regex")
});

static SORT_QUERY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+:(?i:asc|desc)(?:,[A-Za-z0-9_]+:(?i:asc|desc))*,*$")
        .expect("sort grammar is a valid regex")
});

static SORT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z0-9_]+):((?i:asc|desc))").expect("sort token is a valid regex")
});

/// Sort direction
///
/// ```rust
/// use forecast_core::query::SortOrder;
///
/// assert_eq!(SortOrder::parse("DESC"), Some(SortOrder::Desc));
/// assert_eq!(SortOrder::parse("ascending"), Some(SortOrder::Asc));
/// assert_eq!(SortOrder::Desc.as_sql(), "DESC");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl SortOrder {
    /// Read `asc`, `ascending`, `desc` or `descending`, ignoring case
    pub fn parse(direction: &str) -> Option<Self> {
        match direction.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Asc),
            "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }

    /// ORDER BY keyword
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One `field=value` pair from a filter query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterTerm {
    pub field: String,
    pub value: String,
}

/// One `field:direction` pair from a sort query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortTerm {
    pub field: String,
    pub order: SortOrder,
}

/// Split a filter query into terms
///
/// Blank input yields no terms. Input that does not follow the grammar as a
/// whole is rejected with [`QueryError::MalformedQuery`].
pub fn parse_filter(query: &str) -> Result<Vec<FilterTerm>, QueryError> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }
    if !FILTER_QUERY.is_match(query) {
        return Err(QueryError::MalformedQuery(QueryKind::Filter));
    }

    Ok(FILTER_TOKEN
        .captures_iter(query)
        .map(|captures| FilterTerm {
            field: captures[1].to_string(),
            value: captures[2].to_string(),
        })
        .collect())
}

/// Split a sort query into terms
pub fn parse_sort(query: &str) -> Result<Vec<SortTerm>, QueryError> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }
    if !SORT_QUERY.is_match(query) {
        return Err(QueryError::MalformedQuery(QueryKind::Sort));
    }

    SORT_TOKEN
        .captures_iter(query)
        .map(|captures| {
            let order = SortOrder::parse(&captures[2]).ok_or_else(|| {
                QueryError::InvalidDirection {
                    field: captures[1].to_string(),
                }
            })?;
            Ok(SortTerm {
                field: captures[1].to_string(),
                order,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_queries_are_empty() {
        assert!(parse_filter("").unwrap().is_empty());
        assert!(parse_filter("   ").unwrap().is_empty());
        assert!(parse_sort("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_filter_terms() {
        let terms = parse_filter("CustomerName=Test Name,City=Greenville").unwrap();
        assert_eq!(
            terms,
            vec![
                FilterTerm {
                    field: "CustomerName".into(),
                    value: "Test Name".into()
                },
                FilterTerm {
                    field: "City".into(),
                    value: "Greenville".into()
                },
            ]
        );
    }

    #[test]
    fn test_trailing_commas_tolerated() {
        assert_eq!(parse_filter("Temperature=63,").unwrap().len(), 1);
        assert_eq!(parse_filter("Temperature=63,,").unwrap().len(), 1);
        assert_eq!(parse_sort("Temperature:desc,").unwrap().len(), 1);
    }

    #[test]
    fn test_empty_value_is_a_term() {
        let terms = parse_filter("City=").unwrap();
        assert_eq!(terms[0].value, "");
    }

    #[test]
    fn test_malformed_filters() {
        for query in [
            "City",
            "=Greenville",
            "City=Green-ville",
            "City=Greenville;Name=x",
            "City==x",
            ",City=x",
            "City=x,,Name=y",
        ] {
            assert_eq!(
                parse_filter(query),
                Err(QueryError::MalformedQuery(QueryKind::Filter)),
                "{query}"
            );
        }
    }

    #[test]
    fn test_parse_sort_terms_any_case() {
        let terms = parse_sort("Temperature:DESC,cloudCoverage:Asc").unwrap();
        assert_eq!(terms[0].order, SortOrder::Desc);
        assert_eq!(terms[1].field, "cloudCoverage");
        assert_eq!(terms[1].order, SortOrder::Asc);
    }

    #[test]
    fn test_malformed_sorts() {
        for query in ["Temperature", "Temperature:up", "Temperature:ascx", "a:asc b:desc"] {
            assert_eq!(
                parse_sort(query),
                Err(QueryError::MalformedQuery(QueryKind::Sort)),
                "{query}"
            );
        }
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse("Descending"), Some(SortOrder::Desc));
        assert_eq!(SortOrder::parse("sideways"), None);
        assert_eq!(SortOrder::Asc.to_string(), "asc");
    }
}

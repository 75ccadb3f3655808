//! Query rejection and descriptor registration errors

use std::fmt;

use thiserror::Error;

use super::constraint::allowed_date_formats;
use super::descriptor::FieldKind;

/// Which query parameter a rejection refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// `?filter=`
    Filter,
    /// `?sort=`
    Sort,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter => write!(f, "Filter"),
            Self::Sort => write!(f, "Sort"),
        }
    }
}

impl QueryKind {
    fn malformed_message(self) -> &'static str {
        match self {
            Self::Filter => {
                "Filter query is not structured properly. Please ensure query parameters are structured as follows: \
                 '?filter=[EntityProperty][=][Value][[,][EntityProperty][=][Value]] (Ex: CustomerName=TestName,City=Greenville)"
            }
            Self::Sort => {
                "Sort query is not structured properly. Please ensure query parameters are structured as follows: \
                 '?sort=[EntityProperty][:][Direction][[,][EntityProperty][:][Direction]] (Ex: CustomerName:asc,City:desc)"
            }
        }
    }
}

/// Bounds a value fell outside of
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bounds {
    /// String length bounds
    Length { lower: i64, upper: i64 },
    /// Integer bounds
    Integer { lower: i64, upper: i64 },
    /// Date bounds, rendered as declared
    Date { min: String, max: String },
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length { lower, upper } => {
                write!(f, "String must be between the following length: {lower} - {upper}")
            }
            Self::Integer { lower, upper } => {
                write!(f, "Integer must be between the following range: {lower} - {upper}")
            }
            Self::Date { min, max } => {
                write!(f, "DateTime must be between the following dates: {min} - {max}")
            }
        }
    }
}

/// Rejection of a filter, sort or paging request
///
/// These are recoverable and map to a 400 at the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Input does not follow the query grammar
    #[error("{}", .0.malformed_message())]
    MalformedQuery(QueryKind),

    /// Query names a property the entity does not declare
    #[error(
        "{kind} query contains properties that do not exist on the entity. \
         Please ensure the following property is valid on the entity being queried: {field}"
    )]
    UnknownField { kind: QueryKind, field: String },

    /// Property exists but may not be filtered on
    #[error(
        "Filter query contains a filter property that cannot be filtered on the entity. Invalid property: {0}"
    )]
    NotFilterable(String),

    /// Property exists but may not be sorted on
    #[error("Sort query contains a sort property that cannot be sorted on the entity. Invalid property: {0}")]
    NotSortable(String),

    /// Same property named twice in one query
    #[error("{kind} query references the same property more than once: {field}")]
    DuplicateField { kind: QueryKind, field: String },

    /// Value cannot be read as the field's kind
    #[error("Invalid value for {field}: '{value}' is not a valid {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: FieldKind,
    },

    /// Value fails the field's regular expression
    #[error("Input value for {field} failed regex validation.")]
    PatternMismatch { field: String },

    /// Value lies outside the declared bounds
    #[error("{bounds}")]
    OutOfRange { field: String, bounds: Bounds },

    /// Date matches none of the accepted formats
    #[error(
        "Unable to parse the following date: {input}. The allowed DateTime formats are as follows: {}",
        allowed_date_formats()
    )]
    UnparseableDate { input: String },

    /// Sort direction is neither `asc` nor `desc`
    #[error("Invalid Direction. Value must be either 'asc' or 'desc'.")]
    InvalidDirection { field: String },
}

impl QueryError {
    /// Error code surfaced in API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedQuery(_) => "MALFORMED_QUERY",
            Self::UnknownField { .. } => "UNKNOWN_FIELD",
            Self::NotFilterable(_) => "NOT_FILTERABLE",
            Self::NotSortable(_) => "NOT_SORTABLE",
            Self::DuplicateField { .. } => "DUPLICATE_FIELD",
            Self::InvalidValue { .. } => "INVALID_VALUE",
            Self::PatternMismatch { .. } => "PATTERN_MISMATCH",
            Self::OutOfRange { .. } => "OUT_OF_RANGE",
            Self::UnparseableDate { .. } => "UNPARSEABLE_DATE",
            Self::InvalidDirection { .. } => "INVALID_DIRECTION",
        }
    }
}

/// Invalid entity descriptor, raised while registering it
///
/// These indicate an authoring bug and should abort startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("{entity}: wire name and column name are required for every field")]
    MissingName { entity: String },

    #[error("{entity}: wire name '{field}' is declared more than once")]
    DuplicateWireName { entity: String, field: String },

    #[error("{entity}: column '{column}' is declared more than once")]
    DuplicateColumn { entity: String, column: String },

    /// Constraint kind does not fit the field kind
    #[error("{entity}.{field}: a {constraint} constraint is not supported on {kind} fields")]
    UnsupportedFilterType {
        entity: String,
        field: String,
        kind: FieldKind,
        constraint: &'static str,
    },

    #[error(
        "{entity}.{field}: Unable to parse the following date: {bound}. The allowed DateTime formats are as follows: {}",
        allowed_date_formats()
    )]
    UnparseableDate {
        entity: String,
        field: String,
        bound: String,
    },

    #[error("{entity}.{field}: lower bound is greater than upper bound")]
    InvertedBounds { entity: String, field: String },

    #[error("{entity}.{field}: invalid pattern: {message}")]
    InvalidPattern {
        entity: String,
        field: String,
        message: String,
    },
}

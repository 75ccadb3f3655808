//! Static per-entity field tables
//!
//! Each entity exposed to query-string filtering and sorting registers an
//! [`EntityDescriptor`] once at startup. The descriptor maps wire names to
//! storage columns, records which fields are filterable or sortable, and holds
//! the value constraints the validator enforces. Registration rejects
//! descriptors whose constraints cannot be honoured, so nothing about a field's
//! type is discovered per request.
//!
//! # Example
//!
//! ```rust
//! use forecast_core::query::{EntityDescriptor, Field, FieldKind};
//!
//! let descriptor = EntityDescriptor::builder("customer")
//!     .field(Field::new("customerName", "CustomerName", FieldKind::Str).filterable().length(1, 64, true))
//!     .field(Field::new("age", "Age", FieldKind::Int).filterable().sortable().range(0, 130, true))
//!     .field(Field::new("internalNotes", "Notes", FieldKind::Str))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(descriptor.find("AGE").map(|f| f.column()), Some("Age"));
//! ```

use std::fmt;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::command::FilterValue;
use super::constraint::{between, parse_date};
use super::error::{Bounds, DescriptorError, QueryError};

/// Value kind of a field; the only kinds that can be bound as parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Text
    Str,
    /// Whole number
    Int,
    /// Date and time
    Date,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str => write!(f, "string"),
            Self::Int => write!(f, "integer"),
            Self::Date => write!(f, "date"),
        }
    }
}

/// Declared value constraint, before registration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Constraint {
    /// Any value is accepted
    #[default]
    None,
    /// String length bounds
    Length { lower: i64, upper: i64, inclusive: bool },
    /// Integer value bounds
    Range { lower: i64, upper: i64, inclusive: bool },
    /// Date bounds as written in the declaration; unset means unbounded
    Dates {
        min: Option<String>,
        max: Option<String>,
        inclusive: bool,
    },
}

impl Constraint {
    fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Length { .. } => "length",
            Self::Range { .. } => "range",
            Self::Dates { .. } => "date range",
        }
    }

    fn fits(&self, kind: FieldKind) -> bool {
        matches!(
            (self, kind),
            (Self::None, _)
                | (Self::Length { .. }, FieldKind::Str)
                | (Self::Range { .. }, FieldKind::Int)
                | (Self::Dates { .. }, FieldKind::Date)
        )
    }
}

/// Field declaration, consumed by [`EntityDescriptorBuilder::field`]
#[derive(Debug, Clone)]
#[must_use]
pub struct Field {
    wire_name: String,
    column: String,
    kind: FieldKind,
    filterable: bool,
    sortable: Option<bool>,
    constraint: Constraint,
    pattern: Option<String>,
}

impl Field {
    /// Declare a field that is neither filterable nor sortable
    pub fn new(wire_name: impl Into<String>, column: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            wire_name: wire_name.into(),
            column: column.into(),
            kind,
            filterable: false,
            sortable: None,
            constraint: Constraint::None,
            pattern: None,
        }
    }

    /// Allow filtering on this field
    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    /// Allow sorting on this field; a blank direction is skipped
    pub fn sortable(mut self) -> Self {
        self.sortable = Some(true);
        self
    }

    /// Allow sorting on this field; a blank direction is rejected
    pub fn sortable_required(mut self) -> Self {
        self.sortable = Some(false);
        self
    }

    /// Replace the value constraint
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = constraint;
        self
    }

    /// Bound the string length
    pub fn length(self, lower: i64, upper: i64, inclusive: bool) -> Self {
        self.constraint(Constraint::Length {
            lower,
            upper,
            inclusive,
        })
    }

    /// Bound the integer value
    pub fn range(self, lower: i64, upper: i64, inclusive: bool) -> Self {
        self.constraint(Constraint::Range {
            lower,
            upper,
            inclusive,
        })
    }

    /// Bound the date; either end may be left open
    pub fn dates(self, min: Option<&str>, max: Option<&str>, inclusive: bool) -> Self {
        self.constraint(Constraint::Dates {
            min: min.map(str::to_string),
            max: max.map(str::to_string),
            inclusive,
        })
    }

    /// Require values to match a regular expression
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
}

/// Registered constraint with parsed bounds
#[derive(Debug, Clone)]
enum Rule {
    None,
    Length {
        lower: i64,
        upper: i64,
        inclusive: bool,
    },
    Range {
        lower: i64,
        upper: i64,
        inclusive: bool,
    },
    Dates {
        min: NaiveDateTime,
        max: NaiveDateTime,
        label: (String, String),
        inclusive: bool,
    },
}

/// A registered field
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    wire_name: String,
    column: String,
    kind: FieldKind,
    filterable: bool,
    sortable: Option<bool>,
    rule: Rule,
    pattern: Option<Regex>,
}

impl FieldDescriptor {
    /// Name exposed to API callers
    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    /// Backing storage column
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_filterable(&self) -> bool {
        self.filterable
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable.is_some()
    }

    /// Whether a sort on this field may omit its direction
    pub fn allows_empty_direction(&self) -> bool {
        self.sortable.unwrap_or(false)
    }

    /// Convert raw query text into this field's value kind
    pub fn parse_value(&self, raw: &str) -> Result<FilterValue, QueryError> {
        match self.kind {
            FieldKind::Str => Ok(FilterValue::Str(raw.to_string())),
            FieldKind::Int => raw
                .trim()
                .parse::<i64>()
                .map(FilterValue::Int)
                .map_err(|_| QueryError::InvalidValue {
                    field: self.wire_name.clone(),
                    value: raw.to_string(),
                    expected: self.kind,
                }),
            FieldKind::Date => parse_date(raw).map(FilterValue::Date),
        }
    }

    /// Enforce the declared pattern and bounds on a typed value
    pub fn check_value(&self, value: &FilterValue) -> Result<(), QueryError> {
        if value.kind() != self.kind {
            return Err(QueryError::InvalidValue {
                field: self.wire_name.clone(),
                value: value.to_string(),
                expected: self.kind,
            });
        }

        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(&value.to_string()) {
                return Err(QueryError::PatternMismatch {
                    field: self.wire_name.clone(),
                });
            }
        }

        let in_bounds = match (&self.rule, value) {
            (Rule::None, _) => true,
            (
                Rule::Length {
                    lower,
                    upper,
                    inclusive,
                },
                FilterValue::Str(text),
            ) => {
                let length = text.chars().count() as i64;
                between(length, *lower, *upper, *inclusive)
            }
            (
                Rule::Range {
                    lower,
                    upper,
                    inclusive,
                },
                FilterValue::Int(n),
            ) => between(*n, *lower, *upper, *inclusive),
            (
                Rule::Dates {
                    min,
                    max,
                    inclusive,
                    ..
                },
                FilterValue::Date(at),
            ) => between(*at, *min, *max, *inclusive),
            // registration guarantees the rule fits the kind
            _ => true,
        };

        if in_bounds {
            Ok(())
        } else {
            Err(QueryError::OutOfRange {
                field: self.wire_name.clone(),
                bounds: self.bounds(),
            })
        }
    }

    fn bounds(&self) -> Bounds {
        match &self.rule {
            Rule::Length { lower, upper, .. } => Bounds::Length {
                lower: *lower,
                upper: *upper,
            },
            Rule::Range { lower, upper, .. } => Bounds::Integer {
                lower: *lower,
                upper: *upper,
            },
            Rule::Dates { label, .. } => Bounds::Date {
                min: label.0.clone(),
                max: label.1.clone(),
            },
            Rule::None => Bounds::Integer {
                lower: i64::MIN,
                upper: i64::MAX,
            },
        }
    }
}

/// Validated field table for one entity
#[derive(Debug, Clone)]
pub struct EntityDescriptor {
    entity: String,
    fields: Vec<FieldDescriptor>,
}

impl EntityDescriptor {
    /// Start declaring an entity
    pub fn builder(entity: impl Into<String>) -> EntityDescriptorBuilder {
        EntityDescriptorBuilder {
            entity: entity.into(),
            fields: Vec::new(),
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by wire name, ignoring ASCII case
    pub fn find(&self, wire_name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|field| field.wire_name.eq_ignore_ascii_case(wire_name))
    }
}

/// Collects field declarations and validates them on [`build`](Self::build)
#[derive(Debug, Clone)]
#[must_use]
pub struct EntityDescriptorBuilder {
    entity: String,
    fields: Vec<Field>,
}

impl EntityDescriptorBuilder {
    /// Add a field
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Validate every declaration and freeze the table
    pub fn build(self) -> Result<EntityDescriptor, DescriptorError> {
        let mut registered: Vec<FieldDescriptor> = Vec::with_capacity(self.fields.len());

        for field in self.fields {
            if field.wire_name.trim().is_empty() || field.column.trim().is_empty() {
                return Err(DescriptorError::MissingName {
                    entity: self.entity.clone(),
                });
            }
            if registered
                .iter()
                .any(|r| r.wire_name.eq_ignore_ascii_case(&field.wire_name))
            {
                return Err(DescriptorError::DuplicateWireName {
                    entity: self.entity.clone(),
                    field: field.wire_name,
                });
            }
            if registered
                .iter()
                .any(|r| r.column.eq_ignore_ascii_case(&field.column))
            {
                return Err(DescriptorError::DuplicateColumn {
                    entity: self.entity.clone(),
                    column: field.column,
                });
            }

            let rule = register_rule(&self.entity, &field)?;
            let pattern = field
                .pattern
                .as_deref()
                .map(Regex::new)
                .transpose()
                .map_err(|err| DescriptorError::InvalidPattern {
                    entity: self.entity.clone(),
                    field: field.wire_name.clone(),
                    message: err.to_string(),
                })?;

            registered.push(FieldDescriptor {
                wire_name: field.wire_name,
                column: field.column,
                kind: field.kind,
                filterable: field.filterable,
                sortable: field.sortable,
                rule,
                pattern,
            });
        }

        Ok(EntityDescriptor {
            entity: self.entity,
            fields: registered,
        })
    }
}

fn register_rule(entity: &str, field: &Field) -> Result<Rule, DescriptorError> {
    if !field.constraint.fits(field.kind) {
        return Err(DescriptorError::UnsupportedFilterType {
            entity: entity.to_string(),
            field: field.wire_name.clone(),
            kind: field.kind,
            constraint: field.constraint.name(),
        });
    }

    let inverted = || DescriptorError::InvertedBounds {
        entity: entity.to_string(),
        field: field.wire_name.clone(),
    };

    match &field.constraint {
        Constraint::None => Ok(Rule::None),
        Constraint::Length {
            lower,
            upper,
            inclusive,
        } => {
            if lower > upper {
                return Err(inverted());
            }
            Ok(Rule::Length {
                lower: *lower,
                upper: *upper,
                inclusive: *inclusive,
            })
        }
        Constraint::Range {
            lower,
            upper,
            inclusive,
        } => {
            if lower > upper {
                return Err(inverted());
            }
            Ok(Rule::Range {
                lower: *lower,
                upper: *upper,
                inclusive: *inclusive,
            })
        }
        Constraint::Dates {
            min,
            max,
            inclusive,
        } => {
            let min_at = parse_bound(entity, field, "MinDate", min.as_deref())?
                .unwrap_or(NaiveDateTime::MIN);
            let max_at = parse_bound(entity, field, "MaxDate", max.as_deref())?
                .unwrap_or(NaiveDateTime::MAX);
            if min_at > max_at {
                return Err(inverted());
            }
            let label = (
                min.clone().unwrap_or_else(|| min_at.to_string()),
                max.clone().unwrap_or_else(|| max_at.to_string()),
            );
            Ok(Rule::Dates {
                min: min_at,
                max: max_at,
                label,
                inclusive: *inclusive,
            })
        }
    }
}

fn parse_bound(
    entity: &str,
    field: &Field,
    which: &str,
    raw: Option<&str>,
) -> Result<Option<NaiveDateTime>, DescriptorError> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => Ok(None),
        Some(raw) => parse_date(raw)
            .map(Some)
            .map_err(|_| DescriptorError::UnparseableDate {
                entity: entity.to_string(),
                field: field.wire_name.clone(),
                bound: format!("{which}: {raw}"),
            }),
    }
}

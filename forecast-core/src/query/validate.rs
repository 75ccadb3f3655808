//! Checking filter and sort requests against an entity's field table
//!
//! Validation returns a rejection value and never panics. A successful
//! validation hands back the resolved fields the SQL builder consumes, so the
//! builder never sees a name the entity does not declare.

use serde::Serialize;

use super::command::FilterValue;
use super::descriptor::{EntityDescriptor, FieldDescriptor};
use super::error::{QueryError, QueryKind};
use super::grammar::{parse_filter, parse_sort, SortOrder};

/// A resolved filter clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterItem {
    /// Name the caller used
    pub wire_name: String,
    /// Storage column the clause binds against
    pub column: String,
    pub value: FilterValue,
}

/// Filter clauses that passed validation, in request order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidatedFilter {
    items: Vec<FilterItem>,
}

impl ValidatedFilter {
    pub fn items(&self) -> &[FilterItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Value bound for a column, if the filter constrains it
    pub fn value_for(&self, column: &str) -> Option<&FilterValue> {
        self.items
            .iter()
            .find(|item| item.column == column)
            .map(|item| &item.value)
    }
}

/// A resolved sort key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortItem {
    pub wire_name: String,
    pub column: String,
    pub order: SortOrder,
}

/// Sort keys that passed validation, in request order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidatedSort {
    items: Vec<SortItem>,
}

impl ValidatedSort {
    pub fn items(&self) -> &[SortItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl EntityDescriptor {
    /// Validate a `?filter=` query
    ///
    /// Every named field must be declared (case-insensitive) and filterable.
    /// Values are then converted to the field kind and checked against the
    /// field's constraint. Blank values are treated as unset and dropped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use forecast_core::query::{EntityDescriptor, Field, FieldKind, FilterValue};
    ///
    /// let weather = EntityDescriptor::builder("weather")
    ///     .field(Field::new("temperature", "Temperature", FieldKind::Int).filterable())
    ///     .build()
    ///     .unwrap();
    ///
    /// let filter = weather.validate_filter("Temperature=63").unwrap();
    /// assert_eq!(filter.items()[0].column, "Temperature");
    /// assert_eq!(filter.items()[0].value, FilterValue::Int(63));
    /// ```
    pub fn validate_filter(&self, query: &str) -> Result<ValidatedFilter, QueryError> {
        let terms = parse_filter(query)?;

        let mut fields = Vec::with_capacity(terms.len());
        for term in &terms {
            let field = self.resolve(QueryKind::Filter, &term.field)?;
            if !field.is_filterable() {
                return Err(QueryError::NotFilterable(term.field.clone()));
            }
            reject_duplicate(QueryKind::Filter, &fields, field, &term.field)?;
            fields.push(field);
        }

        let mut items = Vec::with_capacity(terms.len());
        for (term, field) in terms.iter().zip(fields) {
            if term.value.trim().is_empty() {
                continue;
            }
            let value = field.parse_value(&term.value)?;
            field.check_value(&value)?;
            items.push(FilterItem {
                wire_name: field.wire_name().to_string(),
                column: field.column().to_string(),
                value,
            });
        }

        Ok(ValidatedFilter { items })
    }

    /// Build a filter from already-typed values
    ///
    /// `None` values are unset and skipped, mirroring a filter object whose
    /// optional properties were not supplied.
    pub fn typed_filter<'a, I>(&self, values: I) -> Result<ValidatedFilter, QueryError>
    where
        I: IntoIterator<Item = (&'a str, Option<FilterValue>)>,
    {
        let mut fields: Vec<&FieldDescriptor> = Vec::new();
        let mut items = Vec::new();

        for (name, value) in values {
            let Some(value) = value else { continue };
            if matches!(&value, FilterValue::Str(text) if text.trim().is_empty()) {
                continue;
            }

            let field = self.resolve(QueryKind::Filter, name)?;
            if !field.is_filterable() {
                return Err(QueryError::NotFilterable(name.to_string()));
            }
            reject_duplicate(QueryKind::Filter, &fields, field, name)?;
            field.check_value(&value)?;

            fields.push(field);
            items.push(FilterItem {
                wire_name: field.wire_name().to_string(),
                column: field.column().to_string(),
                value,
            });
        }

        Ok(ValidatedFilter { items })
    }

    /// Validate a `?sort=` query
    pub fn validate_sort(&self, query: &str) -> Result<ValidatedSort, QueryError> {
        let terms = parse_sort(query)?;

        let mut fields: Vec<&FieldDescriptor> = Vec::with_capacity(terms.len());
        let mut items = Vec::with_capacity(terms.len());
        for term in terms {
            let field = self.sortable_field(&term.field, &fields)?;
            fields.push(field);
            items.push(SortItem {
                wire_name: field.wire_name().to_string(),
                column: field.column().to_string(),
                order: term.order,
            });
        }

        Ok(ValidatedSort { items })
    }

    /// Validate a single `sortBy` / `sortOperator` pair
    ///
    /// A blank direction is skipped when the field allows it and rejected
    /// otherwise. Directions may be `asc`, `ascending`, `desc` or `descending`.
    pub fn sort_by(
        &self,
        field: Option<&str>,
        direction: Option<&str>,
    ) -> Result<ValidatedSort, QueryError> {
        let Some(name) = field.map(str::trim).filter(|name| !name.is_empty()) else {
            return Ok(ValidatedSort::default());
        };

        let descriptor = self.sortable_field(name, &[])?;
        let direction = direction.map(str::trim).unwrap_or_default();

        if direction.is_empty() {
            if descriptor.allows_empty_direction() {
                return Ok(ValidatedSort::default());
            }
            return Err(QueryError::InvalidDirection {
                field: name.to_string(),
            });
        }

        let order = SortOrder::parse(direction).ok_or_else(|| QueryError::InvalidDirection {
            field: name.to_string(),
        })?;

        Ok(ValidatedSort {
            items: vec![SortItem {
                wire_name: descriptor.wire_name().to_string(),
                column: descriptor.column().to_string(),
                order,
            }],
        })
    }

    fn resolve(&self, kind: QueryKind, name: &str) -> Result<&FieldDescriptor, QueryError> {
        self.find(name).ok_or_else(|| QueryError::UnknownField {
            kind,
            field: name.to_string(),
        })
    }

    fn sortable_field(
        &self,
        name: &str,
        seen: &[&FieldDescriptor],
    ) -> Result<&FieldDescriptor, QueryError> {
        let field = self.resolve(QueryKind::Sort, name)?;
        if !field.is_sortable() {
            return Err(QueryError::NotSortable(name.to_string()));
        }
        reject_duplicate(QueryKind::Sort, seen, field, name)?;
        Ok(field)
    }
}

fn reject_duplicate(
    kind: QueryKind,
    seen: &[&FieldDescriptor],
    field: &FieldDescriptor,
    name: &str,
) -> Result<(), QueryError> {
    if seen.iter().any(|s| s.column() == field.column()) {
        return Err(QueryError::DuplicateField {
            kind,
            field: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::descriptor::{Field, FieldKind};
    use crate::query::parse_date;

    fn weather() -> EntityDescriptor {
        EntityDescriptor::builder("weather_forecast")
            .field(
                Field::new("cloudCoverage", "CloudCoverage", FieldKind::Str)
                    .filterable()
                    .sortable()
                    .length(3, 10, false),
            )
            .field(
                Field::new("temperature", "Temperature", FieldKind::Int)
                    .filterable()
                    .sortable()
                    .range(-100, 150, true),
            )
            .field(
                Field::new("percentToRain", "PercentToRain", FieldKind::Int)
                    .sortable_required(),
            )
            .field(
                Field::new("issuedOn", "IssuedOn", FieldKind::Date)
                    .filterable()
                    .dates(Some("2000-01-01"), Some("2100-01-01"), true),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_declared_filterable_names_pass() {
        let filter = weather()
            .validate_filter("temperature=63,CLOUDCOVERAGE=Sunny")
            .unwrap();
        assert_eq!(filter.items().len(), 2);
        assert_eq!(filter.items()[1].column, "CloudCoverage");
        assert_eq!(filter.value_for("Temperature"), Some(&FilterValue::Int(63)));
    }

    #[test]
    fn test_undeclared_name_is_unknown() {
        let err = weather()
            .validate_filter("temperature=63,humidity=12")
            .unwrap_err();
        assert_eq!(
            err,
            QueryError::UnknownField {
                kind: QueryKind::Filter,
                field: "humidity".into()
            }
        );
    }

    #[test]
    fn test_declared_but_not_filterable() {
        let err = weather().validate_filter("percentToRain=40").unwrap_err();
        assert_eq!(err, QueryError::NotFilterable("percentToRain".into()));
        assert_eq!(
            err.to_string(),
            "Filter query contains a filter property that cannot be filtered on the entity. Invalid property: percentToRain"
        );
    }

    #[test]
    fn test_names_checked_before_values() {
        // the unknown field wins even though the first value is out of range
        let err = weather()
            .validate_filter("temperature=999,humidity=1")
            .unwrap_err();
        assert!(matches!(err, QueryError::UnknownField { .. }));
    }

    #[test]
    fn test_string_length_bounds_exclusive() {
        let weather = weather();
        assert!(weather.validate_filter("cloudCoverage=abc").is_ok());
        assert!(weather.validate_filter("cloudCoverage=abcdefghi").is_ok());
        assert!(matches!(
            weather.validate_filter("cloudCoverage=ab"),
            Err(QueryError::OutOfRange { .. })
        ));
        assert!(matches!(
            weather.validate_filter("cloudCoverage=abcdefghij"),
            Err(QueryError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_integer_values_are_typed() {
        let weather = weather();
        assert!(matches!(
            weather.validate_filter("temperature=warm"),
            Err(QueryError::InvalidValue { .. })
        ));
        let err = weather.validate_filter("temperature=151").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Integer must be between the following range: -100 - 150"
        );
    }

    #[test]
    fn test_blank_values_are_dropped() {
        let filter = weather().validate_filter("cloudCoverage=,temperature=63").unwrap();
        assert_eq!(filter.items().len(), 1);
        assert_eq!(filter.items()[0].wire_name, "temperature");
    }

    #[test]
    fn test_duplicate_filter_field() {
        let err = weather()
            .validate_filter("temperature=1,Temperature=2")
            .unwrap_err();
        assert!(matches!(err, QueryError::DuplicateField { .. }));
    }

    #[test]
    fn test_typed_filter_skips_unset_and_checks_dates() {
        let weather = weather();
        let issued = parse_date("2024-01-15").unwrap();
        let filter = weather
            .typed_filter([
                ("issuedOn", Some(FilterValue::Date(issued))),
                ("cloudCoverage", None),
                ("temperature", Some(FilterValue::Int(63))),
            ])
            .unwrap();
        assert_eq!(filter.items().len(), 2);
        assert_eq!(filter.items()[0].column, "IssuedOn");

        let too_old = parse_date("1990-01-01").unwrap();
        let err = weather
            .typed_filter([("issuedOn", Some(FilterValue::Date(too_old)))])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "DateTime must be between the following dates: 2000-01-01 - 2100-01-01"
        );
    }

    #[test]
    fn test_validate_sort() {
        let weather = weather();
        let sort = weather
            .validate_sort("temperature:desc,percentToRain:ASC")
            .unwrap();
        assert_eq!(sort.items()[0].column, "Temperature");
        assert_eq!(sort.items()[0].order, SortOrder::Desc);
        assert_eq!(sort.items()[1].order, SortOrder::Asc);

        assert!(matches!(
            weather.validate_sort("issuedOn:asc"),
            Err(QueryError::NotSortable(_))
        ));
        assert!(matches!(
            weather.validate_sort("wind:asc"),
            Err(QueryError::UnknownField { kind: QueryKind::Sort, .. })
        ));
    }

    #[test]
    fn test_sort_by_pair() {
        let weather = weather();

        let sort = weather.sort_by(Some("temperature"), Some("descending")).unwrap();
        assert_eq!(sort.items()[0].order, SortOrder::Desc);

        assert!(weather.sort_by(None, Some("asc")).unwrap().is_empty());
        assert!(weather.sort_by(Some("temperature"), None).unwrap().is_empty());
        assert!(matches!(
            weather.sort_by(Some("percentToRain"), Some(" ")),
            Err(QueryError::InvalidDirection { .. })
        ));
        assert!(matches!(
            weather.sort_by(Some("temperature"), Some("sideways")),
            Err(QueryError::InvalidDirection { .. })
        ));
    }
}

//! Parameterised SQL commands

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::Serialize;

use super::descriptor::FieldKind;

/// Typed value bound to a filter parameter
///
/// # Example
///
/// ```rust
/// use forecast_core::query::FilterValue;
///
/// let name: FilterValue = "Greenville".into();
/// let temperature: FilterValue = 63_i32.into();
/// assert_eq!(temperature.to_string(), "63");
/// assert_eq!(name.to_string(), "Greenville");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Text value
    Str(String),
    /// Integer value
    Int(i64),
    /// Date and time value
    Date(NaiveDateTime),
}

impl FilterValue {
    /// Field kind this value satisfies
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Str(_) => FieldKind::Str,
            Self::Int(_) => FieldKind::Int,
            Self::Date(_) => FieldKind::Date,
        }
    }

    /// Database type the value binds as
    pub fn db_type(&self) -> DbType {
        match self {
            Self::Str(_) => DbType::String,
            Self::Int(n) if i32::try_from(*n).is_ok() => DbType::Int32,
            Self::Int(_) => DbType::Int64,
            Self::Date(_) => DbType::DateTime,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(text) => write!(f, "{text}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Date(at) => write!(f, "{}", at.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<NaiveDateTime> for FilterValue {
    fn from(at: NaiveDateTime) -> Self {
        Self::Date(at)
    }
}

/// Database type of a bound parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DbType {
    String,
    Int32,
    Int64,
    DateTime,
}

/// A named parameter bound into a [`Command`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    /// Placeholder name, without the leading `:`
    pub name: String,
    pub value: FilterValue,
}

impl Parameter {
    pub fn db_type(&self) -> DbType {
        self.value.db_type()
    }
}

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^:]):([A-Za-z_][A-Za-z0-9_]*)").expect("placeholder is a valid regex")
});

/// Query text together with its bound parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Command {
    text: String,
    parameters: Vec<Parameter>,
}

impl Command {
    /// Command with no parameters
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parameters: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Look up a bound parameter by name
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Bind a value to the `:name` placeholder
    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<FilterValue>) {
        self.parameters.push(Parameter {
            name: name.into(),
            value: value.into(),
        });
    }

    /// `:name` placeholders in the text that have no bound parameter, in text order
    pub fn unbound_placeholders(&self) -> Vec<&str> {
        let mut unbound: Vec<&str> = Vec::new();
        for capture in PLACEHOLDER.captures_iter(&self.text) {
            let Some(name) = capture.get(1).map(|m| m.as_str()) else {
                continue;
            };
            if self.parameter(name).is_none() && !unbound.contains(&name) {
                unbound.push(name);
            }
        }
        unbound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_types() {
        assert_eq!(FilterValue::from("x").db_type(), DbType::String);
        assert_eq!(FilterValue::from(63).db_type(), DbType::Int32);
        assert_eq!(FilterValue::Int(i64::MAX).db_type(), DbType::Int64);
    }

    #[test]
    fn test_bind_and_lookup() {
        let mut command = Command::new("SELECT 1");
        command.bind("Temperature", FilterValue::Int(63));
        assert_eq!(command.parameters().len(), 1);
        assert_eq!(
            command.parameter("Temperature").map(Parameter::db_type),
            Some(DbType::Int32)
        );
        assert!(command.parameter("Missing").is_none());
    }

    #[test]
    fn test_unbound_placeholders() {
        let mut command = Command::new(
            "SELECT CAST(x AS TEXT)::varchar FROM t\nWHERE a = :Latitude AND b = :Longitude AND c = :Latitude",
        );
        assert_eq!(command.unbound_placeholders(), vec!["Latitude", "Longitude"]);

        command.bind("Latitude", "34.85");
        command.bind("Longitude", "-82.39");
        assert!(command.unbound_placeholders().is_empty());
    }
}

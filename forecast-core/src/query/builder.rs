//! Staged SQL command builder
//!
//! Clauses must be appended as WHERE, then ORDER BY, then OFFSET/FETCH. Each
//! step returns a distinct stage type, so paging can only follow sorting and
//! nothing can be appended after paging:
//!
//! ```rust
//! use forecast_core::query::{Base, EntityDescriptor, Field, FieldKind, OffsetLimit, ValidatedSort};
//!
//! let weather = EntityDescriptor::builder("weather")
//!     .field(Field::new("temperature", "Temperature", FieldKind::Int).filterable())
//!     .build()
//!     .unwrap();
//! let filter = weather.validate_filter("Temperature=63").unwrap();
//!
//! let command = Base::new("SELECT * FROM WEATHER")
//!     .filter(&filter)
//!     .sort(&ValidatedSort::default())
//!     .page(OffsetLimit::default())
//!     .build();
//!
//! assert!(command.text().ends_with(
//!     "WHERE Temperature = :Temperature\n\n\nORDER BY (SELECT NULL)\n\nOFFSET 0 ROWS FETCH NEXT 50 ROWS ONLY"
//! ));
//! assert_eq!(command.parameters().len(), 1);
//! ```
//!
//! Paging before sorting does not compile:
//!
//! ```compile_fail
//! use forecast_core::query::{Base, OffsetLimit};
//!
//! let command = Base::new("SELECT 1").page(OffsetLimit::default()).build();
//! ```

use super::command::{Command, FilterValue};
use super::paging::OffsetLimit;
use super::validate::{ValidatedFilter, ValidatedSort};

const CLAUSE_BREAK: &str = "\n\n";

/// Base query with nothing appended yet
#[derive(Debug, Clone)]
#[must_use]
pub struct Base {
    command: Command,
}

/// Query with its WHERE clause appended
#[derive(Debug, Clone)]
#[must_use]
pub struct Filtered {
    command: Command,
}

/// Query with its ORDER BY clause appended
#[derive(Debug, Clone)]
#[must_use]
pub struct Sorted {
    command: Command,
}

/// Query with its OFFSET/FETCH clause appended
#[derive(Debug, Clone)]
#[must_use]
pub struct Paged {
    command: Command,
}

impl Base {
    /// Start from raw query text
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            command: Command::new(text),
        }
    }

    /// Start from an existing command, keeping its parameters
    pub fn from_command(command: Command) -> Self {
        Self { command }
    }

    /// Bind a placeholder already present in the base text
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.command.bind(name, value);
        self
    }

    /// Append `WHERE col = :col [AND ...]`, binding one parameter per clause
    ///
    /// An empty filter leaves the command untouched.
    pub fn filter(mut self, filter: &ValidatedFilter) -> Filtered {
        append_filter(&mut self.command, filter);
        Filtered {
            command: self.command,
        }
    }

    /// Append ORDER BY without filtering
    pub fn sort(self, sort: &ValidatedSort) -> Sorted {
        self.filter(&ValidatedFilter::default()).sort(sort)
    }

    pub fn build(self) -> Command {
        self.command
    }
}

impl Filtered {
    /// Append `ORDER BY col DIR, ...`, or `ORDER BY (SELECT NULL)` when empty
    pub fn sort(mut self, sort: &ValidatedSort) -> Sorted {
        append_sort(&mut self.command, sort);
        Sorted {
            command: self.command,
        }
    }

    pub fn build(self) -> Command {
        self.command
    }
}

impl Sorted {
    /// Append `OFFSET n ROWS FETCH NEXT m ROWS ONLY`
    ///
    /// The window is expected to be range-checked already.
    pub fn page(mut self, paging: OffsetLimit) -> Paged {
        self.command.push_text(CLAUSE_BREAK);
        self.command.push_text(&format!(
            "OFFSET {} ROWS FETCH NEXT {} ROWS ONLY",
            paging.offset, paging.limit
        ));
        Paged {
            command: self.command,
        }
    }

    pub fn build(self) -> Command {
        self.command
    }
}

impl Paged {
    pub fn build(self) -> Command {
        self.command
    }
}

fn append_filter(command: &mut Command, filter: &ValidatedFilter) {
    if filter.is_empty() {
        return;
    }

    command.push_text(CLAUSE_BREAK);
    command.push_text("WHERE ");

    for (index, item) in filter.items().iter().enumerate() {
        let clause = if index == 0 {
            format!("{0} = :{0}\n", item.column)
        } else {
            format!("AND {0} = :{0}\n", item.column)
        };
        command.push_text(&clause);
        command.bind(item.column.clone(), item.value.clone());
    }
}

fn append_sort(command: &mut Command, sort: &ValidatedSort) {
    command.push_text(CLAUSE_BREAK);

    if sort.is_empty() {
        command.push_text("ORDER BY (SELECT NULL)");
        return;
    }

    command.push_text("ORDER BY ");
    let last = sort.items().len() - 1;
    for (index, item) in sort.items().iter().enumerate() {
        let separator = if index == last { "" } else { "," };
        command.push_text(&format!("{} {}{}\n", item.column, item.order.as_sql(), separator));
    }
}

//! Query-string filtering, sorting and paging translated to parameterised SQL
//!
//! The flow for a list endpoint is:
//!
//! 1. Register an [`EntityDescriptor`] for the entity at startup. Registration
//!    rejects constraints the translator cannot honour.
//! 2. Validate `?filter=` and `?sort=` against it with
//!    [`EntityDescriptor::validate_filter`] and [`EntityDescriptor::validate_sort`].
//!    Rejections are [`QueryError`] values suitable for a 400 response.
//! 3. Append the validated clauses to a base query with the staged builder
//!    ([`Base`] → [`Filtered`] → [`Sorted`] → [`Paged`]) and execute the
//!    resulting [`Command`].
//!
//! Filter values are limited to `[A-Za-z0-9_ ]*`, so values containing commas,
//! equals signs or other punctuation cannot be expressed in a filter query.

mod builder;
mod command;
mod constraint;
mod descriptor;
mod error;
mod grammar;
mod paging;
mod validate;

pub use builder::{Base, Filtered, Paged, Sorted};
pub use command::{Command, DbType, FilterValue, Parameter};
pub use constraint::{allowed_date_formats, between, parse_date, DateFormat, DATE_FORMATS};
pub use descriptor::{
    Constraint, EntityDescriptor, EntityDescriptorBuilder, Field, FieldDescriptor, FieldKind,
};
pub use error::{Bounds, DescriptorError, QueryError, QueryKind};
pub use grammar::{parse_filter, parse_sort, FilterTerm, SortOrder, SortTerm};
pub use paging::{OffsetLimit, DEFAULT_LIMIT};
pub use validate::{FilterItem, SortItem, ValidatedFilter, ValidatedSort};

//! Partial-update `SET` clause builder.
//!
//! A PATCH request carries only the fields that change. [`sql_for_partial_update`]
//! turns those fields into the `SET` part of an `UPDATE` statement plus the
//! ordered parameter list, so every resource shares one update routine.
//!
//! # Example
//!
//! ```ignore
//! use jobly::{FieldNameMap, FieldUpdate, sql_for_partial_update};
//!
//! let fields = FieldUpdate::new().with("title", "New").with("salary", 5);
//! let update = sql_for_partial_update(&fields, &FieldNameMap::new())?;
//! assert_eq!(update.set_cols, "title = $1, salary = $2");
//! ```

use crate::error::{JoblyError, JoblyResult};
use crate::ident::validate_column;
use crate::value::{FieldValue, ValueKind};
use std::collections::BTreeMap;

/// Ordered field name -> new value pairs.
///
/// Iteration follows insertion order. Setting a name twice keeps its first
/// position and replaces the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdate {
    entries: Vec<(String, FieldValue)>,
}

impl FieldUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> &mut Self {
        let field = field.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((field, value)),
        }
        self
    }

    /// Chainable form of [`FieldUpdate::set`].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    /// Build from a JSON object body. Keys follow the object's iteration order.
    pub fn from_json(body: &serde_json::Value) -> JoblyResult<Self> {
        let Some(object) = body.as_object() else {
            return Err(JoblyError::bad_request("Update body must be a JSON object"));
        };

        let mut update = Self::new();
        for (field, value) in object {
            update.set(field.as_str(), FieldValue::from_json(value)?);
        }
        Ok(update)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for FieldUpdate
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut update = Self::new();
        for (field, value) in iter {
            update.set(field, value);
        }
        update
    }
}

/// External field name -> storage column name.
///
/// Only fields whose names differ need an entry; everything else maps to itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldNameMap {
    columns: BTreeMap<String, String>,
}

impl FieldNameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a translation.
    pub fn map(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.columns.insert(field.into(), column.into());
        self
    }

    /// Column for `field`, or `field` itself when no translation exists.
    pub fn column_for<'a>(&'a self, field: &'a str) -> &'a str {
        self.columns.get(field).map_or(field, String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FieldNameMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(field, column)| (field.into(), column.into()))
                .collect(),
        }
    }
}

/// A fixed set of updatable fields for one table.
///
/// Implemented by field enums so the field -> column table is known at
/// compile time. Fields outside the set (keys, unknown names) are rejected
/// before any SQL is built.
pub trait ColumnSet: Copy + Sized + 'static {
    /// Resource name used in error messages.
    const RESOURCE: &'static str;
    /// Every updatable field.
    const ALL: &'static [Self];

    /// Name used by API clients (JSON key).
    fn field_name(self) -> &'static str;

    /// Storage column.
    fn column(self) -> &'static str;

    /// Kind of value the column stores.
    fn kind(self) -> ValueKind;

    /// Whether the column accepts NULL.
    fn nullable(self) -> bool {
        true
    }

    /// Resolve a client field name; the storage column name is accepted too.
    fn parse(field: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.field_name() == field || f.column() == field)
    }

    /// Translations for every field whose client name differs from its column.
    fn name_map() -> FieldNameMap {
        Self::ALL
            .iter()
            .filter(|f| f.field_name() != f.column())
            .map(|f| (f.field_name(), f.column()))
            .collect()
    }

    /// Validate a PATCH body against the set and return it with values
    /// converted to their column kinds.
    ///
    /// Fields outside the set, fields that hit the same column twice, values
    /// of the wrong kind and NULL for a required column are all `BadRequest`.
    fn check_update(fields: &FieldUpdate) -> JoblyResult<FieldUpdate> {
        let mut seen: Vec<&'static str> = Vec::with_capacity(fields.len());
        let mut checked = FieldUpdate::new();
        for (field, value) in fields.iter() {
            let Some(known) = Self::parse(field) else {
                return Err(JoblyError::bad_request(format!(
                    "Cannot update '{field}' on {}",
                    Self::RESOURCE
                )));
            };
            if seen.contains(&known.column()) {
                return Err(JoblyError::bad_request(format!(
                    "Field '{}' given more than once",
                    known.field_name()
                )));
            }
            seen.push(known.column());

            if value.is_null() && !known.nullable() {
                return Err(JoblyError::bad_request(format!("{field} cannot be null")));
            }
            checked.set(field, value.coerce_to(known.kind(), field)?);
        }
        Ok(checked)
    }
}

/// `SET` clause text and its positional values.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialUpdate {
    /// `col1 = $1, col2 = $2, ...`
    pub set_cols: String,
    /// Values in placeholder order.
    pub values: Vec<FieldValue>,
}

impl PartialUpdate {
    /// Placeholder index the caller should use for its first own parameter
    /// (typically the `WHERE` key).
    pub fn next_param_index(&self) -> usize {
        self.values.len() + 1
    }
}

/// Build the `SET` clause for a partial update.
///
/// Fails with [`JoblyError::BadRequest`] when `fields` is empty or when a
/// resulting column is not a plain identifier.
pub fn sql_for_partial_update(
    fields: &FieldUpdate,
    name_map: &FieldNameMap,
) -> JoblyResult<PartialUpdate> {
    if fields.is_empty() {
        return Err(JoblyError::bad_request("No data"));
    }

    let mut set_parts = Vec::with_capacity(fields.len());
    let mut values = Vec::with_capacity(fields.len());
    for (idx, (field, value)) in fields.iter().enumerate() {
        let column = validate_column(name_map.column_for(field))?;
        set_parts.push(format!("{} = ${}", column, idx + 1));
        values.push(value.clone());
    }

    Ok(PartialUpdate {
        set_cols: set_parts.join(", "),
        values,
    })
}

#[cfg(test)]
mod tests;

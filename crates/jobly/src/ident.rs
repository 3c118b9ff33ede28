//! SQL identifier checks for column names that arrive at runtime.
//!
//! Column names are interpolated into statement text (Postgres cannot bind
//! identifiers), so anything not taken from a fixed table goes through
//! [`validate_column`] first.

use crate::error::{JoblyError, JoblyResult};

/// Accept a plain, unquoted column name: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_column(name: &str) -> JoblyResult<&str> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(JoblyError::bad_request("Column name cannot be empty"));
    };

    if !(first == '_' || first.is_ascii_alphabetic()) {
        return Err(JoblyError::bad_request(format!(
            "Invalid column name '{name}'"
        )));
    }

    if !chars.all(|c| c == '_' || c.is_ascii_alphanumeric()) {
        return Err(JoblyError::bad_request(format!(
            "Invalid column name '{name}'"
        )));
    }

    Ok(name)
}

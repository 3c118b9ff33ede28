//! Companies and jobs.
//!
//! Each resource is a plain data struct with its queries as associated
//! functions taking any [`GenericClient`](crate::GenericClient), so the
//! same call works on a pooled connection or inside a transaction.

pub mod company;
pub mod job;

pub use company::{Company, CompanyField, CompanyWithJobs, NewCompany};
pub use job::{Job, JobField, JobSummary, NewJob};

use crate::error::{JoblyError, JoblyResult};
use serde::de::DeserializeOwned;

/// Decode a request body, reporting shape problems as `BadRequest`.
pub(crate) fn from_json_body<T: DeserializeOwned>(body: serde_json::Value) -> JoblyResult<T> {
    serde_json::from_value(body).map_err(|e| JoblyError::bad_request(e.to_string()))
}

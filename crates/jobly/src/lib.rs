//! # jobly
//!
//! Data-access layer for a job board: companies and the jobs they post,
//! stored in PostgreSQL.
//!
//! ## Features
//!
//! - **SQL explicit**: every statement is written out; [`sql()`] only numbers placeholders
//! - **Partial updates**: [`sql_for_partial_update`] turns a PATCH body into a `SET` clause
//! - **Filtered lookups**: [`JobFilter`] and [`CompanyFilter`] build parameterized `WHERE` clauses
//! - **Transaction-friendly**: pass a transaction anywhere a [`GenericClient`] is expected
//! - **Route-ready errors**: [`JoblyError::status_code`] and [`ErrorBody`] for the HTTP layer
//!
//! ## Example
//!
//! ```ignore
//! use jobly::{Job, JobFilter, JoblyConfig};
//!
//! let pool = jobly::connect(&JoblyConfig::from_env()?).await?;
//! let client = pool.get().await?;
//!
//! let filter = JobFilter::new().title("software").min_salary(95000).has_equity(true);
//! let jobs = Job::search(&client, &filter).await?;
//! ```
//!
//! SQL text is logged at `debug` on the `jobly.sql` target; record changes
//! are logged at `info` on the `jobly` target.

pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod ident;
pub mod migrate;
pub mod models;
pub mod row;
pub mod sql;
pub mod update;
pub mod value;

pub use client::GenericClient;
pub use config::JoblyConfig;
pub use error::{ErrorBody, JoblyError, JoblyResult};
pub use filter::{CompanyFilter, JobFilter, WhereBuilder, WhereClause};
pub use models::{
    Company, CompanyField, CompanyWithJobs, Job, JobField, JobSummary, NewCompany, NewJob,
};
pub use row::{FromRow, RowExt};
pub use sql::{Sql, sql};
pub use update::{ColumnSet, FieldNameMap, FieldUpdate, PartialUpdate, sql_for_partial_update};
pub use value::{FieldValue, ValueKind};

// Re-export tokio-postgres types
pub use tokio_postgres;
pub use tokio_postgres::Row;
pub use tokio_postgres::types::ToSql;

pub use rust_decimal::Decimal;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{connect, create_pool, create_pool_with_config};

#[cfg(feature = "pool")]
pub use deadpool_postgres;

//! SQL-first dynamic statement.
//!
//! `Sql` stores SQL pieces and parameters separately and generates `$1, $2, ...`
//! placeholders for values appended with [`Sql::push_bind`]. Clause builders
//! that number their own placeholders (see [`crate::update`] and
//! [`crate::filter`]) hand their values over with [`Sql::bind`] /
//! [`Sql::bind_all`] instead.
//!
//! # Example
//!
//! ```ignore
//! use jobly::sql;
//!
//! let mut q = sql("SELECT id, title FROM jobs WHERE company_handle = ");
//! q.push_bind("c1").push(" ORDER BY id");
//! let rows = q.fetch_all(&client).await?;
//! ```

use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::row::FromRow;
use std::sync::Arc;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Longest SQL text (in bytes) written to the `jobly.sql` log target.
pub const SQL_LOG_MAX_LENGTH: usize = 200;

#[derive(Debug)]
enum SqlPart {
    Raw(String),
    Param,
}

/// A SQL-first, parameter-safe statement builder.
pub struct Sql {
    parts: Vec<SqlPart>,
    params: Vec<Arc<dyn ToSql + Sync + Send>>,
}

/// Start building a SQL statement.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}

impl Sql {
    /// Create a new builder with an initial SQL fragment.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        Self {
            parts: vec![SqlPart::Raw(initial_sql.into())],
            params: Vec::new(),
        }
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(SqlPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a parameter placeholder and bind its value.
    pub fn push_bind<T>(&mut self, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.parts.push(SqlPart::Param);
        self.params.push(Arc::new(value));
        self
    }

    /// Bind a value for a `$n` placeholder already present in the SQL text.
    ///
    /// No placeholder is added; values are matched to `$1, $2, ...` in bind order.
    pub fn bind<T>(mut self, value: T) -> Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.params.push(Arc::new(value));
        self
    }

    /// [`Sql::bind`] every value in order.
    pub fn bind_all<T, I>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToSql + Sync + Send + 'static,
    {
        for value in values {
            self.params.push(Arc::new(value));
        }
        self
    }

    /// Render SQL with `$1, $2, ...` placeholders.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        let mut idx: usize = 0;

        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => {
                    idx += 1;
                    use std::fmt::Write;
                    let _ = write!(&mut out, "${}", idx);
                }
            }
        }
        out
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect()
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    fn validate(&self) -> JoblyResult<()> {
        let placeholder_count = self
            .parts
            .iter()
            .filter(|p| matches!(p, SqlPart::Param))
            .count();

        // bind() values have no Param part, so only the upper bound is checked.
        if placeholder_count > self.params.len() {
            return Err(JoblyError::bad_request(format!(
                "Sql: more placeholders({}) than params({})",
                placeholder_count,
                self.params.len()
            )));
        }
        Ok(())
    }

    fn prepare(&self) -> JoblyResult<String> {
        self.validate()?;
        let sql = self.to_sql();
        tracing::debug!(
            target: "jobly.sql",
            param_count = self.params.len(),
            sql = %truncate_sql(&sql, SQL_LOG_MAX_LENGTH),
        );
        Ok(sql)
    }

    /// Execute the built SQL and return all rows.
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> JoblyResult<Vec<Row>> {
        let sql = self.prepare()?;
        let params = self.params_ref();
        conn.query(&sql, &params).await
    }

    /// Execute the built SQL and return all rows mapped to `T`.
    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<Vec<T>> {
        let rows = self.fetch_all(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute the built SQL and return the first row (`NotFound` when empty).
    pub async fn fetch_one(&self, conn: &impl GenericClient) -> JoblyResult<Row> {
        let sql = self.prepare()?;
        let params = self.params_ref();
        conn.query_one(&sql, &params).await
    }

    /// Execute the built SQL and return the first row mapped to `T`.
    pub async fn fetch_one_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<T> {
        let row = self.fetch_one(conn).await?;
        T::from_row(&row)
    }

    /// Execute the built SQL and return at most one row.
    pub async fn fetch_opt(&self, conn: &impl GenericClient) -> JoblyResult<Option<Row>> {
        let sql = self.prepare()?;
        let params = self.params_ref();
        conn.query_opt(&sql, &params).await
    }

    /// Execute the built SQL and return at most one row mapped to `T`.
    pub async fn fetch_opt_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> JoblyResult<Option<T>> {
        let row = self.fetch_opt(conn).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Execute the built SQL and return affected row count.
    pub async fn execute(&self, conn: &impl GenericClient) -> JoblyResult<u64> {
        let sql = self.prepare()?;
        let params = self.params_ref();
        conn.execute(&sql, &params).await
    }
}

/// Cut `sql` to at most `max` bytes on a char boundary, marking the cut.
fn truncate_sql(sql: &str, max: usize) -> String {
    if sql.len() <= max {
        return sql.to_string();
    }
    let mut end = max;
    while !sql.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &sql[..end])
}

//! Job postings and their queries.
//!
//! Titles are unique case-insensitively, which is what lets
//! [`Job::update`] and [`Job::remove`] address a posting by title.

use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::filter::JobFilter;
use crate::row::{FromRow, RowExt};
use crate::sql::sql;
use crate::update::{ColumnSet, FieldUpdate, sql_for_partial_update};
use crate::value::ValueKind;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

const COLUMNS: &str = "id, title, salary, equity, company_handle";

/// A job posting as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    /// Fraction of the company, 0 to 1.
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

/// Job as listed under its company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
}

impl FromRow for JobSummary {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
        })
    }
}

impl From<Job> for JobSummary {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            title: job.title,
            salary: job.salary,
            equity: job.equity,
        }
    }
}

/// Input for [`Job::create`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    #[serde(alias = "companyHandle")]
    pub company_handle: String,
}

impl NewJob {
    pub fn new(title: impl Into<String>, company_handle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            salary: None,
            equity: None,
            company_handle: company_handle.into(),
        }
    }

    pub fn salary(mut self, salary: i32) -> Self {
        self.salary = Some(salary);
        self
    }

    pub fn equity(mut self, equity: Decimal) -> Self {
        self.equity = Some(equity);
        self
    }

    /// Decode a JSON request body.
    pub fn from_json(body: serde_json::Value) -> JoblyResult<Self> {
        super::from_json_body(body)
    }
}

/// Job fields a PATCH may change. The id is the key and is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobField {
    Title,
    Salary,
    Equity,
    CompanyHandle,
}

impl ColumnSet for JobField {
    const RESOURCE: &'static str = "job";
    const ALL: &'static [Self] = &[Self::Title, Self::Salary, Self::Equity, Self::CompanyHandle];

    fn field_name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Salary => "salary",
            Self::Equity => "equity",
            Self::CompanyHandle => "companyHandle",
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Salary => "salary",
            Self::Equity => "equity",
            Self::CompanyHandle => "company_handle",
        }
    }

    fn kind(self) -> ValueKind {
        match self {
            Self::Title | Self::CompanyHandle => ValueKind::Text,
            Self::Salary => ValueKind::Integer,
            Self::Equity => ValueKind::Decimal,
        }
    }

    fn nullable(self) -> bool {
        matches!(self, Self::Salary | Self::Equity)
    }
}

impl Job {
    /// Insert a posting.
    ///
    /// An unknown company or an already used title is a `BadRequest`.
    pub async fn create(conn: &impl GenericClient, data: &NewJob) -> JoblyResult<Job> {
        let created = sql(format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) \
             VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        ))
        .bind(data.title.clone())
        .bind(data.salary)
        .bind(data.equity)
        .bind(data.company_handle.clone())
        .fetch_one_as::<Job>(conn)
        .await;

        match created {
            Ok(job) => {
                tracing::info!(target: "jobly", id = job.id, title = %job.title, "job created");
                Ok(job)
            }
            Err(JoblyError::ForeignKeyViolation(_)) => Err(JoblyError::bad_request(format!(
                "No company: {}",
                data.company_handle
            ))),
            Err(JoblyError::UniqueViolation(_)) => Err(JoblyError::bad_request(format!(
                "Duplicate job: {}",
                data.title
            ))),
            Err(e) => Err(e),
        }
    }

    /// Every posting, ordered by id.
    pub async fn find_all(conn: &impl GenericClient) -> JoblyResult<Vec<Job>> {
        sql(format!("SELECT {COLUMNS} FROM jobs ORDER BY id"))
            .fetch_all_as(conn)
            .await
    }

    pub async fn get(conn: &impl GenericClient, id: i32) -> JoblyResult<Job> {
        let mut q = sql(format!("SELECT {COLUMNS} FROM jobs WHERE id = "));
        q.push_bind(id);
        q.fetch_opt_as(conn)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No job: {id}")))
    }

    /// Postings matching `filter`, ordered by id. No match is `NotFound`.
    ///
    /// Rows without a salary or equity never match: the salary and equity
    /// predicates are always present.
    pub async fn search(conn: &impl GenericClient, filter: &JobFilter) -> JoblyResult<Vec<Job>> {
        let clause = filter.to_where_clause();
        let jobs: Vec<Job> = sql(format!(
            "SELECT {COLUMNS} FROM jobs WHERE {} ORDER BY id",
            clause.predicate
        ))
        .bind_all(clause.params)
        .fetch_all_as(conn)
        .await?;

        if jobs.is_empty() {
            tracing::debug!(target: "jobly", ?filter, "job search matched nothing");
            return Err(JoblyError::not_found("No such job found"));
        }
        Ok(jobs)
    }

    /// Apply a partial update to the posting whose title matches `title`
    /// case-insensitively.
    pub async fn update(
        conn: &impl GenericClient,
        title: &str,
        fields: &FieldUpdate,
    ) -> JoblyResult<Job> {
        let fields = JobField::check_update(fields)?;
        let update = sql_for_partial_update(&fields, &JobField::name_map())?;
        let key_idx = update.next_param_index();

        let updated: Option<Job> = sql(format!(
            "UPDATE jobs SET {} WHERE LOWER(title) = LOWER(${key_idx}) RETURNING {COLUMNS}",
            update.set_cols
        ))
        .bind_all(update.values)
        .bind(title.to_string())
        .fetch_opt_as(conn)
        .await?;

        match updated {
            Some(job) => {
                tracing::info!(target: "jobly", id = job.id, fields = fields.len(), "job updated");
                Ok(job)
            }
            None => Err(JoblyError::not_found(format!("No job found: {title}"))),
        }
    }

    /// Delete the posting whose title matches `title` case-insensitively.
    pub async fn remove(conn: &impl GenericClient, title: &str) -> JoblyResult<()> {
        let deleted = sql("DELETE FROM jobs WHERE LOWER(title) = LOWER($1)")
            .bind(title.to_string())
            .execute(conn)
            .await?;

        if deleted == 0 {
            return Err(JoblyError::not_found(format!("No job found: {title}")));
        }
        tracing::info!(target: "jobly", title, "job removed");
        Ok(())
    }
}

//! Company records and their queries.

use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::filter::{CompanyFilter, escape_like};
use crate::models::job::JobSummary;
use crate::row::{FromRow, RowExt};
use crate::sql::sql;
use crate::update::{ColumnSet, FieldUpdate, sql_for_partial_update};
use crate::value::ValueKind;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

const COLUMNS: &str = "handle, name, description, num_employees, logo_url";
const NAME_KEY: &str = "companies_name_key";

/// A company as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("num_employees")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

/// Input for [`Company::create`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl NewCompany {
    pub fn new(
        handle: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            handle: handle.into(),
            name: name.into(),
            description: description.into(),
            num_employees: None,
            logo_url: None,
        }
    }

    pub fn num_employees(mut self, num_employees: i32) -> Self {
        self.num_employees = Some(num_employees);
        self
    }

    pub fn logo_url(mut self, logo_url: impl Into<String>) -> Self {
        self.logo_url = Some(logo_url.into());
        self
    }

    /// Decode a JSON request body.
    pub fn from_json(body: serde_json::Value) -> JoblyResult<Self> {
        super::from_json_body(body)
    }
}

/// A company together with its postings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyWithJobs {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<JobSummary>,
}

/// Company fields a PATCH may change. The handle is the key and is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyField {
    Name,
    Description,
    NumEmployees,
    LogoUrl,
}

impl ColumnSet for CompanyField {
    const RESOURCE: &'static str = "company";
    const ALL: &'static [Self] = &[
        Self::Name,
        Self::Description,
        Self::NumEmployees,
        Self::LogoUrl,
    ];

    fn field_name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::NumEmployees => "numEmployees",
            Self::LogoUrl => "logoUrl",
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::NumEmployees => "num_employees",
            Self::LogoUrl => "logo_url",
        }
    }

    fn kind(self) -> ValueKind {
        match self {
            Self::NumEmployees => ValueKind::Integer,
            Self::Name | Self::Description | Self::LogoUrl => ValueKind::Text,
        }
    }

    fn nullable(self) -> bool {
        matches!(self, Self::NumEmployees | Self::LogoUrl)
    }
}

impl Company {
    /// Insert a company. A taken handle or name is a `BadRequest` naming
    /// whichever of the two clashed.
    pub async fn create(conn: &impl GenericClient, data: &NewCompany) -> JoblyResult<Company> {
        let created = sql(format!(
            "INSERT INTO companies ({COLUMNS}) VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
        ))
        .bind(data.handle.clone())
        .bind(data.name.clone())
        .bind(data.description.clone())
        .bind(data.num_employees)
        .bind(data.logo_url.clone())
        .fetch_one_as::<Company>(conn)
        .await;

        match created {
            Ok(company) => {
                tracing::info!(target: "jobly", handle = %company.handle, "company created");
                Ok(company)
            }
            Err(e) if e.is_unique_violation() => {
                let message = if e.violated_constraint() == Some(NAME_KEY) {
                    format!("Duplicate company name: {}", data.name)
                } else {
                    format!("Duplicate company: {}", data.handle)
                };
                Err(JoblyError::bad_request(message))
            }
            Err(e) => Err(e),
        }
    }

    /// Every company, ordered by name.
    pub async fn find_all(conn: &impl GenericClient) -> JoblyResult<Vec<Company>> {
        sql(format!("SELECT {COLUMNS} FROM companies ORDER BY name"))
            .fetch_all_as(conn)
            .await
    }

    /// Companies matching `filter`, ordered by name.
    ///
    /// No match is `NotFound`; inverted headcount bounds are `BadRequest`.
    pub async fn search(
        conn: &impl GenericClient,
        filter: &CompanyFilter,
    ) -> JoblyResult<Vec<Company>> {
        let clause = filter.to_where_clause()?;
        let companies: Vec<Company> = sql(format!(
            "SELECT {COLUMNS} FROM companies WHERE {} ORDER BY name",
            clause.predicate
        ))
        .bind_all(clause.params)
        .fetch_all_as(conn)
        .await?;

        if companies.is_empty() {
            return Err(JoblyError::not_found("No such company found"));
        }
        Ok(companies)
    }

    /// Look a company up by a case-insensitive fragment of its handle and
    /// attach its jobs. The first handle in sort order wins.
    pub async fn get(conn: &impl GenericClient, handle: &str) -> JoblyResult<CompanyWithJobs> {
        let pattern = format!("%{}%", escape_like(handle));
        let company: Option<Company> = sql(format!(
            "SELECT {COLUMNS} FROM companies WHERE LOWER(handle) LIKE LOWER($1) \
             ORDER BY handle LIMIT 1"
        ))
        .bind(pattern)
        .fetch_opt_as(conn)
        .await?;

        let Some(company) = company else {
            tracing::debug!(target: "jobly", handle, "company lookup missed");
            return Err(JoblyError::not_found(format!("No company: {handle}")));
        };

        let mut q = sql("SELECT id, title, salary, equity FROM jobs WHERE company_handle = ");
        q.push_bind(company.handle.clone()).push(" ORDER BY id");
        let jobs = q.fetch_all_as(conn).await?;

        Ok(CompanyWithJobs { company, jobs })
    }

    /// Apply a partial update to the company with exactly this handle.
    pub async fn update(
        conn: &impl GenericClient,
        handle: &str,
        fields: &FieldUpdate,
    ) -> JoblyResult<Company> {
        let fields = CompanyField::check_update(fields)?;
        let update = sql_for_partial_update(&fields, &CompanyField::name_map())?;
        let key_idx = update.next_param_index();

        let updated: Option<Company> = sql(format!(
            "UPDATE companies SET {} WHERE handle = ${key_idx} RETURNING {COLUMNS}",
            update.set_cols
        ))
        .bind_all(update.values)
        .bind(handle.to_string())
        .fetch_opt_as(conn)
        .await?;

        match updated {
            Some(company) => {
                tracing::info!(target: "jobly", handle, fields = fields.len(), "company updated");
                Ok(company)
            }
            None => Err(JoblyError::not_found(format!("No company: {handle}"))),
        }
    }

    /// Delete a company and, by cascade, its jobs.
    pub async fn remove(conn: &impl GenericClient, handle: &str) -> JoblyResult<()> {
        let mut q = sql("DELETE FROM companies WHERE handle = ");
        q.push_bind(handle.to_string());
        let deleted = q.execute(conn).await?;

        if deleted == 0 {
            return Err(JoblyError::not_found(format!("No company: {handle}")));
        }
        tracing::info!(target: "jobly", handle, "company removed");
        Ok(())
    }
}

//! Filtered-lookup `WHERE` clause builders.
//!
//! [`WhereBuilder`] collects `AND`-joined predicates with auto-numbered
//! `$n` placeholders. [`JobFilter`] and [`CompanyFilter`] turn search
//! criteria into a [`WhereClause`] through it.

use crate::error::{JoblyError, JoblyResult};
use crate::value::FieldValue;

/// Lower bound used for "has equity": anything strictly above zero.
pub const EQUITY_FLOOR: &str = "0.0001";

/// `WHERE` predicate text (without the keyword) and its positional values.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub predicate: String,
    pub params: Vec<FieldValue>,
}

/// Reusable WHERE clause builder.
pub struct WhereBuilder {
    /// WHERE conditions (without leading AND)
    conditions: Vec<String>,
    params: Vec<FieldValue>,
    /// Current parameter counter (starts from offset)
    param_count: usize,
}

impl WhereBuilder {
    /// Create a new WhereBuilder with param numbering starting at 1.
    pub fn new() -> Self {
        Self::with_offset(0)
    }

    /// Create a new WhereBuilder with param numbering starting after `offset`.
    ///
    /// For example, `with_offset(2)` means the first param will be `$3`.
    pub fn with_offset(offset: usize) -> Self {
        Self {
            conditions: Vec::new(),
            params: Vec::new(),
            param_count: offset,
        }
    }

    pub fn param_count(&self) -> usize {
        self.param_count
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    fn add_condition(&mut self, sql_template: &str, value: impl Into<FieldValue>) {
        self.param_count += 1;
        let placeholder = format!("${}", self.param_count);
        let condition = sql_template.replacen('$', &placeholder, 1);
        self.conditions.push(condition);
        self.params.push(value.into());
    }

    /// Case-insensitive substring match: `LOWER(col) LIKE LOWER($n)`.
    ///
    /// `None` and `""` both produce the match-everything pattern `%%`.
    pub fn and_contains_ci(&mut self, col: &str, needle: Option<&str>) -> &mut Self {
        let pattern = format!("%{}%", escape_like(needle.unwrap_or_default()));
        self.add_condition(&format!("LOWER({}) LIKE LOWER($)", col), pattern);
        self
    }

    /// Add AND > condition.
    pub fn and_gt(&mut self, col: &str, val: impl Into<FieldValue>) -> &mut Self {
        self.add_condition(&format!("{} > $", col), val);
        self
    }

    /// Add AND >= condition.
    pub fn and_gte(&mut self, col: &str, val: impl Into<FieldValue>) -> &mut Self {
        self.add_condition(&format!("{} >= $", col), val);
        self
    }

    /// Add AND <= condition.
    pub fn and_lte(&mut self, col: &str, val: impl Into<FieldValue>) -> &mut Self {
        self.add_condition(&format!("{} <= $", col), val);
        self
    }

    pub fn and_gte_opt(&mut self, col: &str, val: Option<impl Into<FieldValue>>) -> &mut Self {
        if let Some(v) = val {
            self.and_gte(col, v);
        }
        self
    }

    pub fn and_lte_opt(&mut self, col: &str, val: Option<impl Into<FieldValue>>) -> &mut Self {
        if let Some(v) = val {
            self.and_lte(col, v);
        }
        self
    }

    /// Add a raw WHERE condition without params.
    ///
    /// # Safety
    ///
    /// This directly concatenates SQL. The caller must ensure safety.
    pub fn and_raw(&mut self, sql: &str) -> &mut Self {
        self.conditions.push(sql.to_string());
        self
    }

    /// Finish. An empty builder yields the always-true predicate `TRUE`.
    pub fn build(self) -> WhereClause {
        let predicate = if self.conditions.is_empty() {
            "TRUE".to_string()
        } else {
            self.conditions.join(" AND ")
        };
        WhereClause {
            predicate,
            params: self.params,
        }
    }
}

impl Default for WhereBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape LIKE metacharacters so user text matches literally.
pub(crate) fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn parse_int(key: &str, raw: &str) -> JoblyResult<i32> {
    raw.trim()
        .parse()
        .map_err(|_| JoblyError::bad_request(format!("{key} must be an integer, got '{raw}'")))
}

/// Job search criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    /// Exclusive lower bound on salary; 0 when absent.
    pub min_salary: Option<i32>,
    /// `Some(true)` restricts to jobs with non-zero equity.
    pub has_equity: Option<bool>,
}

impl JobFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn min_salary(mut self, min_salary: i32) -> Self {
        self.min_salary = Some(min_salary);
        self
    }

    pub fn has_equity(mut self, has_equity: bool) -> Self {
        self.has_equity = Some(has_equity);
        self
    }

    /// Parse `title`, `minSalary` and `hasEquity` query parameters.
    ///
    /// `hasEquity` is only true for the literal `true`; any other value means
    /// false. Unknown keys are ignored.
    pub fn from_query_pairs<'a, I>(pairs: I) -> JoblyResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filter = Self::default();
        for (key, value) in pairs {
            match key {
                "title" => filter.title = Some(value.to_string()),
                "minSalary" => filter.min_salary = Some(parse_int(key, value)?),
                "hasEquity" => filter.has_equity = Some(value == "true"),
                _ => {}
            }
        }
        Ok(filter)
    }

    pub fn equity_required(&self) -> bool {
        self.has_equity == Some(true)
    }

    /// `LOWER(title) LIKE LOWER($1) AND salary > $2 AND <equity predicate>`.
    pub fn to_where_clause(&self) -> WhereClause {
        let mut wb = WhereBuilder::new();
        wb.and_contains_ci("title", self.title.as_deref())
            .and_gt("salary", self.min_salary.unwrap_or(0));
        if self.equity_required() {
            wb.and_raw(&format!("equity BETWEEN {EQUITY_FLOOR} AND 1"));
        } else {
            wb.and_raw("equity >= 0");
        }
        wb.build()
    }
}

/// Company search criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyFilter {
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    /// Inclusive lower bound on headcount.
    pub min_employees: Option<i32>,
    /// Inclusive upper bound on headcount.
    pub max_employees: Option<i32>,
}

impl CompanyFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn min_employees(mut self, min: i32) -> Self {
        self.min_employees = Some(min);
        self
    }

    pub fn max_employees(mut self, max: i32) -> Self {
        self.max_employees = Some(max);
        self
    }

    /// Parse `name`, `minEmployees` and `maxEmployees` query parameters.
    pub fn from_query_pairs<'a, I>(pairs: I) -> JoblyResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filter = Self::default();
        for (key, value) in pairs {
            match key {
                "name" => filter.name = Some(value.to_string()),
                "minEmployees" => filter.min_employees = Some(parse_int(key, value)?),
                "maxEmployees" => filter.max_employees = Some(parse_int(key, value)?),
                _ => {}
            }
        }
        Ok(filter)
    }

    /// `LOWER(name) LIKE LOWER($1)` plus the headcount bounds that are set.
    ///
    /// Fails with `BadRequest` when the bounds are inverted.
    pub fn to_where_clause(&self) -> JoblyResult<WhereClause> {
        if let (Some(min), Some(max)) = (self.min_employees, self.max_employees) {
            if min > max {
                return Err(JoblyError::bad_request(
                    "minEmployees cannot be greater than maxEmployees",
                ));
            }
        }

        let mut wb = WhereBuilder::new();
        wb.and_contains_ci("name", self.name.as_deref())
            .and_gte_opt("num_employees", self.min_employees)
            .and_lte_opt("num_employees", self.max_employees);
        Ok(wb.build())
    }
}

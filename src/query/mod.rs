//! Shared filtered-list query construction.
//!
//! Every list endpoint (items, users, reports, messages) takes an open set
//! of optional filters plus pagination and needs two queries over the same
//! predicates: one page of rows and one total count. [`ListQuery`] builds
//! both with bound parameters throughout; appending a value hands back its
//! `$n` placeholder, so there is no ceiling on parameter count.

use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{FromRow, PgPool, Row};

/// Resolved pagination: `page` is 1-based, `limit` already clamped.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Clamp raw client-supplied values. An absent page defaults to 1 and
    /// the limit is bounded by `max_limit` so a client cannot request an
    /// unbounded result set.
    pub fn resolve(page: Option<i64>, limit: Option<i64>, default_limit: i64, max_limit: i64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, max_limit),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

#[derive(Debug, serde::Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
}

#[derive(Debug, serde::Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

pub(crate) fn page_count(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}

pub struct ListQuery {
    from: String,
    columns: String,
    order_by: String,
    conditions: Vec<String>,
    params: Vec<Value>,
}

impl ListQuery {
    pub fn new(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            columns: "*".to_string(),
            order_by: "created_at DESC, id DESC".to_string(),
            conditions: vec![],
            params: vec![],
        }
    }

    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    /// Ordering for the page query only; the count query has none.
    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = order_by.into();
        self
    }

    /// Append a bound value and get back its placeholder token.
    fn param(&mut self, value: Value) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }

    /// Equality filter. The `"all"` sentinel, an empty string, and an
    /// absent value all mean "no filter" and are silently skipped.
    pub fn filter_eq(&mut self, column: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value {
            if !v.is_empty() && v != "all" {
                let p = self.param(Value::String(v.to_string()));
                self.conditions.push(format!("{} = {}", column, p));
            }
        }
        self
    }

    pub fn filter_eq_int(&mut self, column: &str, value: Option<i32>) -> &mut Self {
        if let Some(v) = value {
            let p = self.param(Value::from(v));
            self.conditions.push(format!("{} = {}", column, p));
        }
        self
    }

    /// Case-insensitive substring match over one or more columns, OR-ed.
    /// An empty term is skipped.
    pub fn search(&mut self, columns: &[&str], term: &str) -> &mut Self {
        if term.is_empty() {
            return self;
        }
        let p = self.param(Value::String(format!("%{}%", term)));
        let clauses: Vec<String> = columns.iter().map(|c| format!("{} ILIKE {}", c, p)).collect();
        self.conditions.push(format!("({})", clauses.join(" OR ")));
        self
    }

    /// "My items": the user appears as reporter or finder. Both foreign
    /// keys are nullable, so each side is guarded against NULL.
    pub fn owned_by(&mut self, user_id: i32) -> &mut Self {
        let p = self.param(Value::from(user_id));
        self.conditions.push(format!(
            "((reporter_id IS NOT NULL AND reporter_id = {p}) OR (finder_id IS NOT NULL AND finder_id = {p}))"
        ));
        self
    }

    /// Message-thread scoping: rows where the pair (sender, receiver) is
    /// exactly these two users, in either direction.
    pub fn between_participants(
        &mut self,
        sender_col: &str,
        receiver_col: &str,
        user_a: i32,
        user_b: i32,
    ) -> &mut Self {
        let pa = self.param(Value::from(user_a));
        let pb = self.param(Value::from(user_b));
        self.conditions.push(format!(
            "(({sc} = {pa} AND {rc} = {pb}) OR ({sc} = {pb} AND {rc} = {pa}))",
            sc = sender_col,
            rc = receiver_col,
        ));
        self
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            "TRUE".to_string()
        } else {
            self.conditions.join(" AND ")
        }
    }

    pub fn count_sql(&self) -> String {
        format!("SELECT COUNT(*) FROM {} WHERE {}", self.from, self.where_clause())
    }

    pub fn select_sql(&self) -> String {
        format!(
            "SELECT {} FROM {} WHERE {} ORDER BY {} LIMIT ${} OFFSET ${}",
            self.columns,
            self.from,
            self.where_clause(),
            self.order_by,
            self.params.len() + 1,
            self.params.len() + 2,
        )
    }

    /// Run the count and page queries over the same predicates and wrap
    /// the result. The row count never exceeds `pagination.limit`.
    pub async fn fetch_page<T>(
        &self,
        pool: &PgPool,
        pagination: Pagination,
    ) -> Result<Page<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let count_sql = self.count_sql();
        let mut count_query = sqlx::query(&count_sql);
        for p in self.params.iter() {
            count_query = bind_param_query(count_query, p);
        }
        let total: i64 = count_query.fetch_one(pool).await?.try_get(0)?;

        let select_sql = self.select_sql();
        let mut select_query = sqlx::query_as::<_, T>(&select_sql);
        for p in self.params.iter() {
            select_query = bind_param_query_as(select_query, p);
        }
        let items = select_query
            .bind(pagination.limit)
            .bind(pagination.offset())
            .fetch_all(pool)
            .await?;

        Ok(Page {
            items,
            meta: PageMeta {
                total,
                page: pagination.page,
                limit: pagination.limit,
                pages: page_count(total, pagination.limit),
            },
        })
    }

    #[cfg(test)]
    fn params(&self) -> &[Value] {
        &self.params
    }
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        other => q.bind(other.to_string()),
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        other => q.bind(other.to_string()),
    }
}

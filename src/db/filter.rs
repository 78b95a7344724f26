//! Conjunctive `WHERE` clauses over optional equality filters.
//!
//! Values are always bound as positional parameters, never spliced into the
//! SQL text. Placeholders are numbered in the order fields are added.

use sqlx::{
    postgres::PgRow, Encode, FromRow, PgConnection, Postgres, QueryBuilder, Type,
};

use crate::error::{AppError, AppResult};

pub struct Select<'args> {
    qb: QueryBuilder<'args, Postgres>,
}

impl<'args> Select<'args> {
    /// `SELECT <columns> FROM <table> WHERE 1 = 1`
    pub fn new(columns: &str, table: &str) -> Self {
        Self {
            qb: QueryBuilder::new(format!("SELECT {columns} FROM {table} WHERE 1 = 1")),
        }
    }

    /// Adds `AND <column> = $n` when `value` is present.
    pub fn eq<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Send + Type<Postgres>,
    {
        if let Some(value) = value {
            self.qb.push(" AND ").push(column).push(" = ").push_bind(value);
        }
        self
    }

    pub fn newest_first(&mut self) -> &mut Self {
        self.qb.push(" ORDER BY created_at DESC, id DESC");
        self
    }

    /// Zero or absent means unbounded.
    pub fn paginate(&mut self, limit: Option<i64>, offset: Option<i64>) -> AppResult<&mut Self> {
        let limit = limit.unwrap_or(0);
        let offset = offset.unwrap_or(0);
        if limit < 0 {
            return Err(AppError::bad_request("limit must not be negative"));
        }
        if offset < 0 {
            return Err(AppError::bad_request("offset must not be negative"));
        }
        if limit > 0 {
            self.qb.push(" LIMIT ").push_bind(limit);
        }
        if offset > 0 {
            self.qb.push(" OFFSET ").push_bind(offset);
        }
        Ok(self)
    }

    pub fn sql(&self) -> &str {
        self.qb.sql()
    }

    pub async fn fetch_all<T>(mut self, conn: &mut PgConnection) -> Result<Vec<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        tracing::debug!(sql = %self.qb.sql(), "select");
        self.qb.build_query_as::<T>().fetch_all(conn).await
    }
}

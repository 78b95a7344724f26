use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgConnection, PgPool, Postgres, Transaction};
use time::OffsetDateTime;

use crate::ids::IdGenerator;

pub mod filter;
pub mod migrate;

/// Pool handle plus the id source and clock every write goes through.
#[derive(Clone)]
pub struct Db {
    pool: PgPool,
    ids: Arc<dyn IdGenerator>,
    clock: fn() -> OffsetDateTime,
}

impl Db {
    pub async fn connect(
        dsn: &str,
        max_connections: u32,
        ids: Arc<dyn IdGenerator>,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(!dsn.is_empty(), "dsn required");
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(dsn)
            .await
            .context("connect to database")?;
        Ok(Self::new(pool, ids))
    }

    pub fn new(pool: PgPool, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            pool,
            ids,
            clock: OffsetDateTime::now_utc,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> OffsetDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn next_id(&self) -> i64 {
        self.ids.next_id()
    }

    /// Opens a transaction stamped with a single "now" for all of its writes.
    pub async fn begin(&self) -> Result<Tx<'static>, sqlx::Error> {
        let inner = self.pool.begin().await?;
        Ok(Tx {
            inner,
            now: truncate_to_second((self.clock)()),
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// A transaction and the timestamp snapshotted when it began.
///
/// Dropping a `Tx` without calling [`Tx::commit`] rolls it back.
pub struct Tx<'c> {
    inner: Transaction<'c, Postgres>,
    pub now: OffsetDateTime,
}

impl Tx<'_> {
    pub fn conn(&mut self) -> &mut PgConnection {
        &mut self.inner
    }

    pub async fn commit(self) -> Result<(), sqlx::Error> {
        self.inner.commit().await
    }
}

/// UTC, whole seconds.
pub fn truncate_to_second(t: OffsetDateTime) -> OffsetDateTime {
    let t = t.to_offset(time::UtcOffset::UTC);
    t - time::Duration::nanoseconds(i64::from(t.nanosecond()))
}

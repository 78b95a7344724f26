//! Startup schema migrations.
//!
//! Every `.sql` file in the migrations directory is tracked in the
//! `migrations` table by file name and byte size. A file is executed when it
//! has no record, skipped when the recorded size matches, and executed again
//! when the size changed. Each file runs in its own transaction together with
//! its bookkeeping row.

use std::path::Path;

use anyhow::{bail, Context};
use sqlx::{Executor, PgPool};
use tracing::info;

const CREATE_MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS migrations (
        name VARCHAR(100) PRIMARY KEY,
        size INTEGER NOT NULL
    )
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Apply,
    Skip,
    Reapply,
}

impl Action {
    pub fn decide(recorded_size: Option<i32>, current_size: i32) -> Self {
        match recorded_size {
            None => Action::Apply,
            Some(size) if size == current_size => Action::Skip,
            Some(_) => Action::Reapply,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub name: String,
    pub action: Action,
}

/// Names of the files in `dir` with extension `ext`, sorted.
pub fn read_migration_dir(dir: &Path, ext: &str) -> anyhow::Result<Vec<String>> {
    let meta = std::fs::metadata(dir)
        .with_context(|| format!("{} path does not exist", dir.display()))?;
    if !meta.is_dir() {
        bail!("{} is not a directory", dir.display());
    }

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if Path::new(&name).extension().is_some_and(|e| e == ext) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

pub async fn run(pool: &PgPool, dir: &Path) -> anyhow::Result<Vec<Applied>> {
    pool.execute(CREATE_MIGRATIONS_TABLE)
        .await
        .context("cannot create migrations table")?;

    let names = read_migration_dir(dir, "sql")?;
    if names.is_empty() {
        bail!("no sql files found in {}", dir.display());
    }

    let mut applied = Vec::with_capacity(names.len());
    for name in names {
        let action = migrate_file(pool, dir, &name)
            .await
            .with_context(|| format!("migration error: name: {name:?}"))?;
        applied.push(Applied { name, action });
    }
    Ok(applied)
}

async fn migrate_file(pool: &PgPool, dir: &Path, name: &str) -> anyhow::Result<Action> {
    let mut tx = pool.begin().await.context("begin tx")?;

    let recorded: Option<i32> = sqlx::query_scalar("SELECT size FROM migrations WHERE name = $1")
        .bind(name)
        .fetch_optional(&mut *tx)
        .await
        .context("read migration record")?;

    let script = tokio::fs::read_to_string(dir.join(name))
        .await
        .with_context(|| format!("read {name}"))?;
    let size = i32::try_from(script.len()).context("migration file too large")?;

    let action = Action::decide(recorded, size);
    match action {
        Action::Skip => {
            info!(migration = name, "migration already applied");
            return Ok(action);
        }
        Action::Apply => {
            (&mut *tx).execute(script.as_str()).await.context("execute script")?;
            sqlx::query("INSERT INTO migrations (name, size) VALUES ($1, $2)")
                .bind(name)
                .bind(size)
                .execute(&mut *tx)
                .await
                .context("record migration")?;
            info!(migration = name, size, "migration applied");
        }
        Action::Reapply => {
            (&mut *tx).execute(script.as_str()).await.context("execute script")?;
            sqlx::query("UPDATE migrations SET size = $1 WHERE name = $2")
                .bind(size)
                .bind(name)
                .execute(&mut *tx)
                .await
                .context("update migration record")?;
            info!(migration = name, size, previous = ?recorded, "migration re-applied");
        }
    }

    tx.commit().await.context("commit tx")?;
    Ok(action)
}

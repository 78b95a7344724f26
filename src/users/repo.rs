use super::{dto::UserFilter, repo_types::User};
use crate::{
    db::{filter::Select, Tx},
    error::{AppError, AppResult},
};

const COLUMNS: &str = "id, username, email, password_hash, created_at, updated_at";

pub async fn insert_user(tx: &mut Tx<'_>, user: &User) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, password_hash, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(user.id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(tx.conn())
    .await?;
    Ok(())
}

pub async fn find_users(tx: &mut Tx<'_>, filter: &UserFilter) -> AppResult<Vec<User>> {
    let mut select = Select::new(COLUMNS, "users");
    select
        .eq("id", filter.id)
        .eq("username", filter.username.as_deref())
        .eq("email", filter.email.as_deref())
        .newest_first()
        .paginate(filter.limit, filter.offset)?;
    Ok(select.fetch_all(tx.conn()).await?)
}

pub async fn find_user_by_id(tx: &mut Tx<'_>, id: i64) -> AppResult<User> {
    let filter = UserFilter {
        id: Some(id),
        ..UserFilter::default()
    };
    find_users(tx, &filter)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::does_not_exist("user"))
}

pub async fn find_user_by_email(tx: &mut Tx<'_>, email: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, created_at, updated_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(tx.conn())
    .await?;
    Ok(user)
}

pub async fn update_user(tx: &mut Tx<'_>, user: &User) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE users
        SET username = $1, email = $2, password_hash = $3, updated_at = $4
        WHERE id = $5
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.updated_at)
    .bind(user.id)
    .execute(tx.conn())
    .await?;
    Ok(())
}

pub async fn delete_user(tx: &mut Tx<'_>, id: i64) -> AppResult<()> {
    find_user_by_id(tx, id).await?;
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(tx.conn())
        .await?;
    Ok(())
}

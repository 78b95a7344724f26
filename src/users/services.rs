use async_trait::async_trait;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use super::{
    dto::{normalize_email, NewUser, UserFilter, UserUpdate},
    repo,
    repo_types::User,
};
use crate::{
    auth::password::{hash_password, verify_password},
    db::Db,
    error::{AppError, AppResult},
};

/// User capabilities the HTTP layer depends on.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn create_user(&self, new: NewUser) -> AppResult<User>;
    /// `not_found` when no user has this id.
    async fn find_user_by_id(&self, id: i64) -> AppResult<User>;
    /// Matching users, newest first, and how many were returned.
    async fn find_users(&self, filter: UserFilter) -> AppResult<(Vec<User>, usize)>;
    async fn update_user(&self, id: i64, upd: UserUpdate) -> AppResult<User>;
    async fn delete_user(&self, id: i64) -> AppResult<()>;
    /// `unauthorized` for an unknown email or a wrong password alike.
    async fn authenticate(&self, email: &str, password: &str) -> AppResult<User>;
}

/// Validated create request with the password already hashed.
pub(crate) struct UserDraft {
    username: String,
    email: String,
    password_hash: String,
}

impl UserDraft {
    pub(crate) fn prepare(mut new: NewUser) -> AppResult<Self> {
        new.validate()?;
        Ok(Self {
            password_hash: hash_password(&new.password)?,
            username: new.username,
            email: new.email,
        })
    }

    pub(crate) fn into_user(self, id: i64, now: OffsetDateTime) -> User {
        User {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validated partial update; a new password is already hashed.
pub(crate) struct UserChanges {
    username: Option<String>,
    email: Option<String>,
    password_hash: Option<String>,
}

impl UserChanges {
    pub(crate) fn prepare(mut upd: UserUpdate) -> AppResult<Self> {
        upd.validate()?;
        Ok(Self {
            username: upd.username,
            email: upd.email,
            password_hash: upd.password.as_deref().map(hash_password).transpose()?,
        })
    }

    pub(crate) fn apply(self, user: &mut User, now: OffsetDateTime) {
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(password_hash) = self.password_hash {
            user.password_hash = password_hash;
        }
        user.updated_at = now;
    }
}

pub(crate) fn check_credentials(user: Option<User>, password: &str) -> AppResult<User> {
    let invalid = || AppError::unauthorized("invalid credentials");
    let user = user.ok_or_else(invalid)?;
    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(invalid());
    }
    Ok(user)
}

pub struct PgUserService {
    db: Db,
}

impl PgUserService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserService for PgUserService {
    #[instrument(skip(self, new))]
    async fn create_user(&self, new: NewUser) -> AppResult<User> {
        let draft = UserDraft::prepare(new)?;
        let mut tx = self.db.begin().await?;
        let user = draft.into_user(self.db.next_id(), tx.now);
        repo::insert_user(&mut tx, &user).await?;
        tx.commit().await?;
        info!(user_id = user.id, "user created");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_user_by_id(&self, id: i64) -> AppResult<User> {
        let mut tx = self.db.begin().await?;
        let user = repo::find_user_by_id(&mut tx, id).await?;
        tx.commit().await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_users(&self, filter: UserFilter) -> AppResult<(Vec<User>, usize)> {
        let filter = filter.normalized();
        let mut tx = self.db.begin().await?;
        let users = repo::find_users(&mut tx, &filter).await?;
        tx.commit().await?;
        let n = users.len();
        Ok((users, n))
    }

    #[instrument(skip(self, upd))]
    async fn update_user(&self, id: i64, upd: UserUpdate) -> AppResult<User> {
        let changes = UserChanges::prepare(upd)?;
        let mut tx = self.db.begin().await?;
        let mut user = repo::find_user_by_id(&mut tx, id).await?;
        changes.apply(&mut user, tx.now);
        repo::update_user(&mut tx, &user).await?;
        tx.commit().await?;
        info!(user_id = id, "user updated");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, id: i64) -> AppResult<()> {
        let mut tx = self.db.begin().await?;
        repo::delete_user(&mut tx, id).await?;
        tx.commit().await?;
        info!(user_id = id, "user deleted");
        Ok(())
    }

    #[instrument(skip(self, password))]
    async fn authenticate(&self, email: &str, password: &str) -> AppResult<User> {
        let mut tx = self.db.begin().await?;
        let user = repo::find_user_by_email(&mut tx, &normalize_email(email)).await?;
        tx.commit().await?;
        check_credentials(user, password)
    }
}

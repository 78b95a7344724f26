//! In-memory `UserService` for handler tests.

use std::{collections::BTreeMap, sync::Mutex};

use async_trait::async_trait;

use super::{
    dto::{normalize_email, NewUser, UserFilter, UserUpdate},
    repo_types::User,
    services::{check_credentials, UserChanges, UserDraft, UserService},
};
use crate::{
    error::{AppError, AppResult},
    testing::{paginate, FakeClock},
};

#[derive(Default)]
pub struct MemoryUsers {
    rows: Mutex<BTreeMap<i64, User>>,
    clock: FakeClock,
}

#[async_trait]
impl UserService for MemoryUsers {
    async fn create_user(&self, new: NewUser) -> AppResult<User> {
        let draft = UserDraft::prepare(new)?;
        let (id, now) = self.clock.tick();
        let user = draft.into_user(id, now);
        let mut rows = self.rows.lock().unwrap();
        if rows.values().any(|u| u.email == user.email) {
            return Err(AppError::Other(anyhow::anyhow!("duplicate key value violates unique constraint")));
        }
        rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> AppResult<User> {
        self.rows
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::does_not_exist("user"))
    }

    async fn find_users(&self, filter: UserFilter) -> AppResult<(Vec<User>, usize)> {
        let filter = filter.normalized();
        let mut users: Vec<User> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|u| filter.id.map_or(true, |id| u.id == id))
            .filter(|u| filter.username.as_ref().map_or(true, |n| &u.username == n))
            .filter(|u| filter.email.as_ref().map_or(true, |e| &u.email == e))
            .cloned()
            .collect();
        users.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        let users = paginate(users, filter.limit, filter.offset)?;
        let n = users.len();
        Ok((users, n))
    }

    async fn update_user(&self, id: i64, upd: UserUpdate) -> AppResult<User> {
        let changes = UserChanges::prepare(upd)?;
        let (_, now) = self.clock.tick();
        let mut rows = self.rows.lock().unwrap();
        let mut user = rows.get(&id).cloned().ok_or_else(|| AppError::does_not_exist("user"))?;
        changes.apply(&mut user, now);
        rows.insert(id, user.clone());
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> AppResult<()> {
        self.rows
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::does_not_exist("user"))
    }

    async fn authenticate(&self, email: &str, password: &str) -> AppResult<User> {
        let email = normalize_email(email);
        let user = self.rows.lock().unwrap().values().find(|u| u.email == email).cloned();
        check_credentials(user, password)
    }
}

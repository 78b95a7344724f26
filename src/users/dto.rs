use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::repo_types::User;
use crate::{
    auth::password,
    error::{AppError, AppResult},
};

/// Request body for `POST /users`. Missing fields decode as empty and fail validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for `PUT /users/{id}`. `None` leaves the stored value unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct UserFilter {
    pub id: Option<i64>,
    #[serde(alias = "name")]
    pub username: Option<String>,
    pub email: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl UserFilter {
    /// Applies the same email normalization used when storing users.
    pub fn normalized(mut self) -> Self {
        self.email = self.email.as_deref().map(normalize_email);
        self
    }
}

#[derive(Debug, Serialize)]
pub struct UserList {
    pub users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct UserOne {
    pub user: User,
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn check_username(username: &str) -> AppResult<()> {
    if username.trim().is_empty() {
        return Err(AppError::bad_request("username is required"));
    }
    Ok(())
}

pub(crate) fn check_email(email: &str) -> AppResult<()> {
    if email.is_empty() {
        return Err(AppError::bad_request("email is required"));
    }
    if !is_valid_email(email) {
        return Err(AppError::bad_request("invalid email"));
    }
    Ok(())
}

impl NewUser {
    /// Trims and normalizes in place, then checks every field.
    pub fn validate(&mut self) -> AppResult<()> {
        self.username = self.username.trim().to_string();
        self.email = normalize_email(&self.email);

        check_username(&self.username)?;
        check_email(&self.email)?;
        if self.password.is_empty() {
            return Err(AppError::bad_request("password is required"));
        }
        password::check_strength(&self.password)
    }
}

impl UserUpdate {
    /// Validates the fields that are present. Present-but-empty is rejected,
    /// not treated as absent.
    pub fn validate(&mut self) -> AppResult<()> {
        if let Some(username) = self.username.as_mut() {
            *username = username.trim().to_string();
            check_username(username)?;
        }
        if let Some(email) = self.email.as_mut() {
            *email = normalize_email(email);
            check_email(email)?;
        }
        if let Some(password) = self.password.as_deref() {
            password::check_strength(password)?;
        }
        Ok(())
    }
}

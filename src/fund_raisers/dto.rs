use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::repo_types::FundRaiser;
use crate::error::{AppError, AppResult};

/// `NUMERIC(14, 2)` holds amounts below 10^12.
const MAX_WHOLE_AMOUNT: i64 = 1_000_000_000_000;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewFundRaiser {
    pub title: String,
    pub story: String,
    pub cover_img: String,
    pub target_amount: Option<Decimal>,
}

/// `None` leaves the stored value unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct FundRaiserUpdate {
    pub title: Option<String>,
    pub story: Option<String>,
    pub cover_img: Option<String>,
    pub target_amount: Option<Decimal>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct FundRaiserFilter {
    pub id: Option<i64>,
    pub title: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct FundRaiserList {
    pub fundraisers: Vec<FundRaiser>,
}

#[derive(Debug, Serialize)]
pub struct FundRaiserOne {
    #[serde(rename = "fund-raiser")]
    pub fund_raiser: FundRaiser,
}

fn required(value: &str, what: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::bad_request(format!("fund raiser {what} is required")));
    }
    Ok(())
}

pub(crate) fn check_amount(amount: Decimal) -> AppResult<()> {
    if amount.is_zero() {
        return Err(AppError::bad_request("fund raiser target amount is required"));
    }
    if amount.is_sign_negative() {
        return Err(AppError::bad_request("fund raiser target amount must be positive"));
    }
    if amount.normalize().scale() > 2 {
        return Err(AppError::bad_request(
            "fund raiser target amount must have at most 2 decimal places",
        ));
    }
    if amount >= Decimal::from(MAX_WHOLE_AMOUNT) {
        return Err(AppError::bad_request("fund raiser target amount is too large"));
    }
    Ok(())
}

impl NewFundRaiser {
    pub fn validate(&self) -> AppResult<Decimal> {
        required(&self.title, "title")?;
        required(&self.story, "story")?;
        required(&self.cover_img, "cover image")?;
        let amount = self
            .target_amount
            .ok_or_else(|| AppError::bad_request("fund raiser target amount is required"))?;
        check_amount(amount)?;
        Ok(amount)
    }
}

impl FundRaiserUpdate {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(title) = &self.title {
            required(title, "title")?;
        }
        if let Some(story) = &self.story {
            required(story, "story")?;
        }
        if let Some(cover_img) = &self.cover_img {
            required(cover_img, "cover image")?;
        }
        if let Some(amount) = self.target_amount {
            check_amount(amount)?;
        }
        Ok(())
    }
}

//! Shared pieces for the in-memory service fakes.

use std::sync::Mutex;

use time::{macros::datetime, Duration, OffsetDateTime};

use crate::error::{AppError, AppResult};

/// Hands out sequential ids and a clock that moves one second per call.
pub struct FakeClock {
    state: Mutex<(i64, OffsetDateTime)>,
}

impl Default for FakeClock {
    fn default() -> Self {
        Self {
            state: Mutex::new((1_000, datetime!(2024-01-01 0:00 UTC))),
        }
    }
}

impl FakeClock {
    pub fn tick(&self) -> (i64, OffsetDateTime) {
        let mut state = self.state.lock().unwrap();
        state.0 += 1;
        state.1 += Duration::seconds(1);
        *state
    }
}

/// Same limit/offset rules as the SQL builder.
pub fn paginate<T>(rows: Vec<T>, limit: Option<i64>, offset: Option<i64>) -> AppResult<Vec<T>> {
    let limit = limit.unwrap_or(0);
    let offset = offset.unwrap_or(0);
    if limit < 0 {
        return Err(AppError::bad_request("limit must not be negative"));
    }
    if offset < 0 {
        return Err(AppError::bad_request("offset must not be negative"));
    }
    let rows = rows.into_iter().skip(offset as usize);
    Ok(if limit > 0 {
        rows.take(limit as usize).collect()
    } else {
        rows.collect()
    })
}

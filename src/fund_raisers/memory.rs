//! In-memory `FundRaiserService` for handler tests.

use std::{collections::BTreeMap, sync::Mutex};

use async_trait::async_trait;

use super::{
    dto::{FundRaiserFilter, FundRaiserUpdate, NewFundRaiser},
    repo_types::FundRaiser,
    services::{apply_update, build_fund_raiser, FundRaiserService},
};
use crate::{
    error::{AppError, AppResult},
    testing::{paginate, FakeClock},
};

#[derive(Default)]
pub struct MemoryFundRaisers {
    rows: Mutex<BTreeMap<i64, FundRaiser>>,
    clock: FakeClock,
}

#[async_trait]
impl FundRaiserService for MemoryFundRaisers {
    async fn create_fund_raiser(&self, new: NewFundRaiser) -> AppResult<FundRaiser> {
        let (id, now) = self.clock.tick();
        let fr = build_fund_raiser(new, id, now)?;
        self.rows.lock().unwrap().insert(fr.id, fr.clone());
        Ok(fr)
    }

    async fn find_fund_raiser_by_id(&self, id: i64) -> AppResult<FundRaiser> {
        self.rows
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::does_not_exist("fundraiser"))
    }

    async fn find_fund_raisers(
        &self,
        filter: FundRaiserFilter,
    ) -> AppResult<(Vec<FundRaiser>, usize)> {
        let mut rows: Vec<FundRaiser> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|f| filter.id.map_or(true, |id| f.id == id))
            .filter(|f| filter.title.as_ref().map_or(true, |t| &f.title == t))
            .filter(|f| filter.created_at.map_or(true, |at| f.created_at == at))
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        let rows = paginate(rows, filter.limit, filter.offset)?;
        let n = rows.len();
        Ok((rows, n))
    }

    async fn update_fund_raiser(&self, id: i64, upd: FundRaiserUpdate) -> AppResult<FundRaiser> {
        let (_, now) = self.clock.tick();
        let mut rows = self.rows.lock().unwrap();
        let mut fr = rows
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::does_not_exist("fundraiser"))?;
        apply_update(&mut fr, upd, now)?;
        rows.insert(id, fr.clone());
        Ok(fr)
    }

    async fn delete_fund_raiser(&self, id: i64) -> AppResult<()> {
        self.rows
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::does_not_exist("fundraiser"))
    }
}

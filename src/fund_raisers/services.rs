use async_trait::async_trait;
use time::OffsetDateTime;
use tracing::{info, instrument};

use super::{
    dto::{FundRaiserFilter, FundRaiserUpdate, NewFundRaiser},
    repo,
    repo_types::FundRaiser,
};
use crate::{db::Db, error::AppResult};

#[async_trait]
pub trait FundRaiserService: Send + Sync {
    async fn create_fund_raiser(&self, new: NewFundRaiser) -> AppResult<FundRaiser>;
    async fn find_fund_raiser_by_id(&self, id: i64) -> AppResult<FundRaiser>;
    async fn find_fund_raisers(
        &self,
        filter: FundRaiserFilter,
    ) -> AppResult<(Vec<FundRaiser>, usize)>;
    async fn update_fund_raiser(&self, id: i64, upd: FundRaiserUpdate) -> AppResult<FundRaiser>;
    async fn delete_fund_raiser(&self, id: i64) -> AppResult<()>;
}

pub(crate) fn build_fund_raiser(
    new: NewFundRaiser,
    id: i64,
    now: OffsetDateTime,
) -> AppResult<FundRaiser> {
    let target_amount = new.validate()?;
    Ok(FundRaiser {
        id,
        title: new.title,
        story: new.story,
        cover_img: new.cover_img,
        target_amount,
        created_at: now,
        updated_at: now,
    })
}

pub(crate) fn apply_update(
    fr: &mut FundRaiser,
    upd: FundRaiserUpdate,
    now: OffsetDateTime,
) -> AppResult<()> {
    upd.validate()?;
    if let Some(title) = upd.title {
        fr.title = title;
    }
    if let Some(story) = upd.story {
        fr.story = story;
    }
    if let Some(cover_img) = upd.cover_img {
        fr.cover_img = cover_img;
    }
    if let Some(amount) = upd.target_amount {
        fr.target_amount = amount;
    }
    fr.updated_at = now;
    Ok(())
}

pub struct PgFundRaiserService {
    db: Db,
}

impl PgFundRaiserService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FundRaiserService for PgFundRaiserService {
    #[instrument(skip(self, new))]
    async fn create_fund_raiser(&self, new: NewFundRaiser) -> AppResult<FundRaiser> {
        let mut tx = self.db.begin().await?;
        let fr = build_fund_raiser(new, self.db.next_id(), tx.now)?;
        repo::insert_fund_raiser(&mut tx, &fr).await?;
        tx.commit().await?;
        info!(fund_raiser_id = fr.id, "fund raiser created");
        Ok(fr)
    }

    #[instrument(skip(self))]
    async fn find_fund_raiser_by_id(&self, id: i64) -> AppResult<FundRaiser> {
        let mut tx = self.db.begin().await?;
        let fr = repo::find_fund_raiser_by_id(&mut tx, id).await?;
        tx.commit().await?;
        Ok(fr)
    }

    #[instrument(skip(self))]
    async fn find_fund_raisers(
        &self,
        filter: FundRaiserFilter,
    ) -> AppResult<(Vec<FundRaiser>, usize)> {
        let mut tx = self.db.begin().await?;
        let rows = repo::find_fund_raisers(&mut tx, &filter).await?;
        tx.commit().await?;
        let n = rows.len();
        Ok((rows, n))
    }

    #[instrument(skip(self, upd))]
    async fn update_fund_raiser(&self, id: i64, upd: FundRaiserUpdate) -> AppResult<FundRaiser> {
        let mut tx = self.db.begin().await?;
        let mut fr = repo::find_fund_raiser_by_id(&mut tx, id).await?;
        apply_update(&mut fr, upd, tx.now)?;
        repo::update_fund_raiser(&mut tx, &fr).await?;
        tx.commit().await?;
        info!(fund_raiser_id = id, "fund raiser updated");
        Ok(fr)
    }

    #[instrument(skip(self))]
    async fn delete_fund_raiser(&self, id: i64) -> AppResult<()> {
        let mut tx = self.db.begin().await?;
        repo::delete_fund_raiser(&mut tx, id).await?;
        tx.commit().await?;
        info!(fund_raiser_id = id, "fund raiser deleted");
        Ok(())
    }
}

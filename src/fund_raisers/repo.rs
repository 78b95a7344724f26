use super::{dto::FundRaiserFilter, repo_types::FundRaiser};
use crate::{
    db::{filter::Select, Tx},
    error::{AppError, AppResult},
};

const COLUMNS: &str = "id, title, story, cover_img, target_amount, created_at, updated_at";

pub async fn insert_fund_raiser(tx: &mut Tx<'_>, fr: &FundRaiser) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO fundraisers (id, title, story, cover_img, target_amount, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(fr.id)
    .bind(&fr.title)
    .bind(&fr.story)
    .bind(&fr.cover_img)
    .bind(fr.target_amount)
    .bind(fr.created_at)
    .bind(fr.updated_at)
    .execute(tx.conn())
    .await?;
    Ok(())
}

pub async fn find_fund_raisers(
    tx: &mut Tx<'_>,
    filter: &FundRaiserFilter,
) -> AppResult<Vec<FundRaiser>> {
    let mut select = Select::new(COLUMNS, "fundraisers");
    select
        .eq("id", filter.id)
        .eq("title", filter.title.as_deref())
        .eq("created_at", filter.created_at)
        .newest_first()
        .paginate(filter.limit, filter.offset)?;
    Ok(select.fetch_all(tx.conn()).await?)
}

pub async fn find_fund_raiser_by_id(tx: &mut Tx<'_>, id: i64) -> AppResult<FundRaiser> {
    let filter = FundRaiserFilter {
        id: Some(id),
        ..FundRaiserFilter::default()
    };
    find_fund_raisers(tx, &filter)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::does_not_exist("fundraiser"))
}

pub async fn update_fund_raiser(tx: &mut Tx<'_>, fr: &FundRaiser) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE fundraisers
        SET title = $1, story = $2, cover_img = $3, target_amount = $4, updated_at = $5
        WHERE id = $6
        "#,
    )
    .bind(&fr.title)
    .bind(&fr.story)
    .bind(&fr.cover_img)
    .bind(fr.target_amount)
    .bind(fr.updated_at)
    .bind(fr.id)
    .execute(tx.conn())
    .await?;
    Ok(())
}

pub async fn delete_fund_raiser(tx: &mut Tx<'_>, id: i64) -> AppResult<()> {
    find_fund_raiser_by_id(tx, id).await?;
    sqlx::query("DELETE FROM fundraisers WHERE id = $1")
        .bind(id)
        .execute(tx.conn())
        .await?;
    Ok(())
}

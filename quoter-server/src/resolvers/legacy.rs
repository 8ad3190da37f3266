//! Read-only resolver over the v1 `quoter` table
//!
//! v1 quotes are presented in the v2 shape with `is_old` set. The v1 API
//! never deletes rows, so the default `1..=total` random draw is exact here.

use async_trait::async_trait;
use quoter_common::db::QuoteV2;
use quoter_common::{Error, Result};
use sqlx::SqlitePool;

use super::Resolver;
use crate::db::quotes;

pub struct LegacyResolver {
    pool: SqlitePool,
}

impl LegacyResolver {
    pub const NAME: &'static str = "legacy";

    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Resolver for LegacyResolver {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn total(&self) -> Result<i64> {
        quotes::total(&self.pool).await
    }

    async fn by_list(&self, ids: &[i64]) -> Result<Vec<QuoteV2>> {
        let quotes = quotes::by_ids(&self.pool, ids).await?;
        Ok(quotes.into_iter().map(QuoteV2::from_legacy).collect())
    }

    async fn by_id(&self, id: i64) -> Result<QuoteV2> {
        quotes::get_by_id(&self.pool, id)
            .await?
            .map(QuoteV2::from_legacy)
            .ok_or_else(|| Error::NotFound(format!("Quote {} in {}", id, Self::NAME)))
    }

    async fn range(&self, from: i64, to: i64) -> Result<Vec<QuoteV2>> {
        let quotes = quotes::range(&self.pool, from, to).await?;
        Ok(quotes.into_iter().map(QuoteV2::from_legacy).collect())
    }

    async fn all(&self) -> Result<Vec<QuoteV2>> {
        let quotes = quotes::all(&self.pool).await?;
        Ok(quotes.into_iter().map(QuoteV2::from_legacy).collect())
    }
}

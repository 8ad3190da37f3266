//! Quote resolvers
//!
//! A resolver answers quote lookups from one source. Requests to the v2
//! API name the resolver they want (`resolver=uadaf`, `resolver=uadaf:old`,
//! `resolver=legacy`) and the [`ResolverRegistry`] turns that name into an
//! instance.
//!
//! Read operations all have defaults built on [`Resolver::by_list`], so a
//! new source only needs `total` and `by_list`. Writes and search are
//! optional capabilities probed with [`Resolver::as_writable`] and
//! [`Resolver::as_searchable`].

use async_trait::async_trait;
use quoter_common::db::QuoteV2;
use quoter_common::{Error, Result};
use rand::seq::SliceRandom;

use crate::db::quotes_v2::NewQuote;

pub mod catalog;
pub mod database;
pub mod legacy;
pub mod registry;

pub use catalog::RepoCatalog;
pub use database::DatabaseResolver;
pub use legacy::LegacyResolver;
pub use registry::{ResolverFactory, ResolverRegistry};

/// Most ids the default [`Resolver::range`] looks up in one call
pub const MAX_RANGE_SPAN: i64 = 10_000;

/// Outcome of linking an attachment to a quote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentResult {
    Attached,
    AlreadyAttached,
    /// The quote vanished between the existence check and the update
    Error,
}

#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolver name this instance was created from
    fn name(&self) -> &str;

    async fn total(&self) -> Result<i64>;

    /// Quotes for the given ids; ids that don't resolve are skipped
    async fn by_list(&self, ids: &[i64]) -> Result<Vec<QuoteV2>>;

    async fn by_id(&self, id: i64) -> Result<QuoteV2> {
        self.by_list(&[id])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("Quote {} in {}", id, self.name())))
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        Ok(!self.by_list(&[id]).await?.is_empty())
    }

    /// Quotes with `from <= id <= to`
    ///
    /// The default probes at most [`MAX_RANGE_SPAN`] ids starting at `from`.
    async fn range(&self, from: i64, to: i64) -> Result<Vec<QuoteV2>> {
        let from = from.max(1);
        let to = to.min(from.saturating_add(MAX_RANGE_SPAN - 1));
        if from > to {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = (from..=to).collect();
        self.by_list(&ids).await
    }

    async fn all(&self) -> Result<Vec<QuoteV2>> {
        let ids: Vec<i64> = (1..=self.total().await?).collect();
        self.by_list(&ids).await
    }

    /// Up to `count` distinct quotes, drawn without replacement
    ///
    /// Ids are drawn from a shuffled `1..=total` in batches until enough
    /// quotes resolve or the ids run out.
    async fn random(&self, count: usize) -> Result<Vec<QuoteV2>> {
        let total = usize::try_from(self.total().await?).unwrap_or(0);
        let wanted = count.min(total);
        let ids = shuffled_ids(total);

        let mut quotes = Vec::with_capacity(wanted);
        let mut remaining = ids.as_slice();
        while quotes.len() < wanted && !remaining.is_empty() {
            let take = (wanted - quotes.len()).min(remaining.len());
            let (batch, rest) = remaining.split_at(take);
            quotes.extend(self.by_list(batch).await?);
            remaining = rest;
        }

        Ok(quotes)
    }

    fn as_writable(&self) -> Option<&dyn WritableResolver> {
        None
    }

    fn as_searchable(&self) -> Option<&dyn SearchableResolver> {
        None
    }
}

#[async_trait]
pub trait WritableResolver: Resolver {
    /// Insert a quote, returning its id
    async fn add(&self, quote: NewQuote) -> Result<i64>;

    async fn attach(&self, id: i64, attachment: &str) -> Result<AttachmentResult>;

    /// `false` if the quote doesn't exist
    async fn edit(&self, id: i64, edited_by: &str, edited_at: i64, new_content: &str)
        -> Result<bool>;

    /// Renumber ids to `1..=total`
    async fn fix_ids(&self) -> Result<()>;
}

#[async_trait]
pub trait SearchableResolver: Resolver {
    /// Substring search; supplied filters combine with AND, no filters means all
    async fn search(
        &self,
        adder: Option<&str>,
        authors: &[String],
        content: Option<&str>,
    ) -> Result<Vec<QuoteV2>>;
}

/// `1..=total` in random order
fn shuffled_ids(total: usize) -> Vec<i64> {
    let mut ids: Vec<i64> = (1..=total as i64).collect();
    ids.shuffle(&mut rand::thread_rng());
    ids
}

/// Draw `min(count, ids.len())` distinct ids uniformly at random
pub fn sample_without_replacement(ids: &[i64], count: usize) -> Vec<i64> {
    let mut rng = rand::thread_rng();
    ids.choose_multiple(&mut rng, count).copied().collect()
}

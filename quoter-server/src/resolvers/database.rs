//! Resolver over a v2 repository table

use async_trait::async_trait;
use quoter_common::db::QuoteV2;
use quoter_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::info;

use super::{
    sample_without_replacement, AttachmentResult, Resolver, SearchableResolver, WritableResolver,
};
use crate::db::quotes_v2::{self, NewQuote};

/// Writable, searchable resolver backed by `quoter_<repo>`
pub struct DatabaseResolver {
    name: String,
    pool: SqlitePool,
    table: String,
}

impl DatabaseResolver {
    /// `table` must come from `RepoCatalog` (validated and existing)
    pub fn new(name: impl Into<String>, pool: SqlitePool, table: String) -> Self {
        Self {
            name: name.into(),
            pool,
            table,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

#[async_trait]
impl Resolver for DatabaseResolver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn total(&self) -> Result<i64> {
        quotes_v2::total(&self.pool, &self.table).await
    }

    async fn by_list(&self, ids: &[i64]) -> Result<Vec<QuoteV2>> {
        quotes_v2::by_ids(&self.pool, &self.table, ids).await
    }

    async fn by_id(&self, id: i64) -> Result<QuoteV2> {
        quotes_v2::get_by_id(&self.pool, &self.table, id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Quote {} in {}", id, self.name)))
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        quotes_v2::exists(&self.pool, &self.table, id).await
    }

    async fn range(&self, from: i64, to: i64) -> Result<Vec<QuoteV2>> {
        quotes_v2::range(&self.pool, &self.table, from, to).await
    }

    async fn all(&self) -> Result<Vec<QuoteV2>> {
        quotes_v2::all(&self.pool, &self.table).await
    }

    /// Samples from the ids that exist, so gaps never shrink the result
    async fn random(&self, count: usize) -> Result<Vec<QuoteV2>> {
        let ids = quotes_v2::all_ids(&self.pool, &self.table).await?;
        let sample = sample_without_replacement(&ids, count);
        quotes_v2::by_ids(&self.pool, &self.table, &sample).await
    }

    fn as_writable(&self) -> Option<&dyn WritableResolver> {
        Some(self)
    }

    fn as_searchable(&self) -> Option<&dyn SearchableResolver> {
        Some(self)
    }
}

#[async_trait]
impl WritableResolver for DatabaseResolver {
    async fn add(&self, quote: NewQuote) -> Result<i64> {
        let id = quotes_v2::add(&self.pool, &self.table, &quote).await?;
        info!("Added quote {} to {} (adder: {})", id, self.table, quote.adder);
        Ok(id)
    }

    async fn attach(&self, id: i64, attachment: &str) -> Result<AttachmentResult> {
        if quotes_v2::append_attachment(&self.pool, &self.table, id, attachment).await? {
            return Ok(AttachmentResult::Attached);
        }

        if quotes_v2::exists(&self.pool, &self.table, id).await? {
            Ok(AttachmentResult::AlreadyAttached)
        } else {
            Ok(AttachmentResult::Error)
        }
    }

    async fn edit(
        &self,
        id: i64,
        edited_by: &str,
        edited_at: i64,
        new_content: &str,
    ) -> Result<bool> {
        quotes_v2::edit(&self.pool, &self.table, id, edited_by, edited_at, new_content).await
    }

    async fn fix_ids(&self) -> Result<()> {
        let moved = quotes_v2::fix_ids(&self.pool, &self.table).await?;
        info!("fix_ids on {}: {} rows renumbered", self.table, moved);
        Ok(())
    }
}

#[async_trait]
impl SearchableResolver for DatabaseResolver {
    async fn search(
        &self,
        adder: Option<&str>,
        authors: &[String],
        content: Option<&str>,
    ) -> Result<Vec<QuoteV2>> {
        if adder.is_none() && authors.is_empty() && content.is_none() {
            return self.all().await;
        }
        quotes_v2::search(&self.pool, &self.table, adder, authors, content).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quoter_common::db::{init_database, DisplayType};
    use std::collections::HashSet;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, DatabaseResolver) {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("quoter.db")).await.unwrap();
        let resolver = DatabaseResolver::new("uadaf", pool, "quoter_v2".to_string());
        (dir, resolver)
    }

    fn new_quote(adder: &str, authors: &str, content: &str) -> NewQuote {
        NewQuote {
            adder: adder.to_string(),
            authors: authors.to_string(),
            dtype: DisplayType::Text,
            content: content.to_string(),
            attachments: Vec::new(),
            date: 1_700_000_000_000,
        }
    }

    #[tokio::test]
    async fn test_add_and_read_back() {
        let (_dir, resolver) = setup().await;
        let id = resolver
            .add(NewQuote {
                attachments: vec!["abc".to_string()],
                ..new_quote("alice", "bob;carol", "hello")
            })
            .await
            .unwrap();

        let quote = resolver.by_id(id).await.unwrap();
        assert_eq!(quote.adder, "alice");
        assert_eq!(quote.authors, vec!["bob", "carol"]);
        assert_eq!(quote.attachments, vec!["abc"]);
        assert_eq!(quote.date, 1_700_000_000_000);
        assert_eq!(resolver.total().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_attach_flow() {
        let (_dir, resolver) = setup().await;
        let id = resolver.add(new_quote("a", "b", "c")).await.unwrap();

        assert_eq!(resolver.attach(id, "x").await.unwrap(), AttachmentResult::Attached);
        assert_eq!(
            resolver.attach(id, "x").await.unwrap(),
            AttachmentResult::AlreadyAttached
        );
        assert_eq!(resolver.attach(id, "y").await.unwrap(), AttachmentResult::Attached);
        assert_eq!(resolver.attach(999, "y").await.unwrap(), AttachmentResult::Error);

        assert_eq!(resolver.by_id(id).await.unwrap().attachments, vec!["x", "y"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_attaches_all_persist() {
        let (_dir, resolver) = setup().await;
        let resolver = Arc::new(resolver);
        let id = resolver.add(new_quote("a", "b", "c")).await.unwrap();

        let handles: Vec<_> = (0..40)
            .map(|i| {
                let resolver = Arc::clone(&resolver);
                tokio::spawn(async move { resolver.attach(id, &format!("att{}", i)).await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), AttachmentResult::Attached);
        }

        let stored: HashSet<String> =
            resolver.by_id(id).await.unwrap().attachments.into_iter().collect();
        let expected: HashSet<String> = (0..40).map(|i| format!("att{}", i)).collect();
        assert_eq!(stored, expected);
    }

    #[tokio::test]
    async fn test_attach_matches_whole_ids_only() {
        let (_dir, resolver) = setup().await;
        let id = resolver.add(new_quote("a", "b", "c")).await.unwrap();

        assert_eq!(resolver.attach(id, "abc").await.unwrap(), AttachmentResult::Attached);
        assert_eq!(resolver.attach(id, "ab").await.unwrap(), AttachmentResult::Attached);
        assert_eq!(resolver.attach(id, "bc").await.unwrap(), AttachmentResult::Attached);
        assert_eq!(
            resolver.attach(id, "ab").await.unwrap(),
            AttachmentResult::AlreadyAttached
        );
        assert_eq!(resolver.by_id(id).await.unwrap().attachments, vec!["abc", "ab", "bc"]);
    }

    #[tokio::test]
    async fn test_edit_keeps_previous_content() {
        let (_dir, resolver) = setup().await;
        let id = resolver.add(new_quote("a", "b", "first")).await.unwrap();

        assert!(resolver.edit(id, "editor", 42, "second").await.unwrap());
        let quote = resolver.by_id(id).await.unwrap();
        assert_eq!(quote.content, "second");
        assert_eq!(quote.previous_content.as_deref(), Some("first"));
        assert_eq!(quote.edited_by.as_deref(), Some("editor"));
        assert_eq!(quote.edited_at, Some(42));

        assert!(!resolver.edit(999, "editor", 42, "x").await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_edits_succeed() {
        let (_dir, resolver) = setup().await;
        let resolver = Arc::new(resolver);
        let id = resolver.add(new_quote("a", "b", "v0")).await.unwrap();

        let handles: Vec<_> = (1..=40)
            .map(|i| {
                let resolver = Arc::clone(&resolver);
                tokio::spawn(async move { resolver.edit(id, "editor", i, &format!("v{}", i)).await })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().unwrap());
        }

        // Each edit saw the content left by the one before it
        let quote = resolver.by_id(id).await.unwrap();
        let current: i64 = quote.content[1..].parse().unwrap();
        assert_eq!(quote.edited_at, Some(current));
        assert!(quote.previous_content.is_some());
        assert_ne!(quote.previous_content.as_deref(), Some(quote.content.as_str()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_fix_ids_alongside_edits() {
        let (_dir, resolver) = setup().await;
        let resolver = Arc::new(resolver);
        for i in 0..10 {
            resolver.add(new_quote("a", "b", &format!("q{}", i))).await.unwrap();
        }
        sqlx::query("DELETE FROM quoter_v2 WHERE id IN (2, 5, 7)")
            .execute(&resolver.pool)
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let resolver = Arc::clone(&resolver);
            handles.push(tokio::spawn(async move { resolver.fix_ids().await.map(|_| ()) }));
        }
        for i in 0..20 {
            let resolver = Arc::clone(&resolver);
            handles.push(tokio::spawn(async move {
                resolver.edit(1, "editor", i, "edited").await.map(|_| ())
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let ids: Vec<i64> = resolver.all().await.unwrap().iter().map(|q| q.id).collect();
        assert_eq!(ids, (1..=7).collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn test_random_with_gaps() {
        let (_dir, resolver) = setup().await;
        for i in 0..6 {
            resolver.add(new_quote("a", "b", &format!("q{}", i))).await.unwrap();
        }
        sqlx::query("DELETE FROM quoter_v2 WHERE id IN (1, 3, 5)")
            .execute(&resolver.pool)
            .await
            .unwrap();

        let quotes = resolver.random(10).await.unwrap();
        let ids: HashSet<i64> = quotes.iter().map(|q| q.id).collect();
        assert_eq!(ids, HashSet::from([2, 4, 6]));

        assert_eq!(resolver.random(2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fix_ids_compacts() {
        let (_dir, resolver) = setup().await;
        for i in 0..5 {
            resolver.add(new_quote("a", "b", &format!("q{}", i))).await.unwrap();
        }
        sqlx::query("DELETE FROM quoter_v2 WHERE id IN (2, 4)")
            .execute(&resolver.pool)
            .await
            .unwrap();

        resolver.fix_ids().await.unwrap();

        let quotes = resolver.all().await.unwrap();
        let ids: Vec<i64> = quotes.iter().map(|q| q.id).collect();
        let contents: Vec<&str> = quotes.iter().map(|q| q.content.as_str()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(contents, vec!["q0", "q2", "q4"]);

        // Sequence reset: next insert continues after the compacted range
        let id = resolver.add(new_quote("a", "b", "q5")).await.unwrap();
        assert_eq!(id, 4);
    }

    #[tokio::test]
    async fn test_search_filters_combine() {
        let (_dir, resolver) = setup().await;
        resolver.add(new_quote("alice", "bob;carol", "the cake")).await.unwrap();
        resolver.add(new_quote("alice", "bob", "a lie")).await.unwrap();
        resolver.add(new_quote("dave", "carol", "the cake is a lie")).await.unwrap();

        let hits = resolver.search(Some("alice"), &[], None).await.unwrap();
        assert_eq!(hits.len(), 2);

        let hits = resolver
            .search(None, &["bob".to_string(), "carol".to_string()], None)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "the cake");

        let hits = resolver.search(None, &[], Some("lie")).await.unwrap();
        assert_eq!(hits.len(), 2);

        let hits = resolver.search(Some("dave"), &[], Some("cake")).await.unwrap();
        assert_eq!(hits.len(), 1);

        assert_eq!(resolver.search(None, &[], None).await.unwrap().len(), 3);
    }
}

//! Catalog of v2 repository tables
//!
//! Caches which `quoter_<name>` tables are known to exist so resolver
//! creation doesn't hit `sqlite_master` on every request.

use quoter_common::db::{create_quote_repo_table, quote_repo_exists, quote_repo_table};
use quoter_common::Result;
use sqlx::SqlitePool;
use std::collections::HashSet;
use tokio::sync::RwLock;
use tracing::info;

pub struct RepoCatalog {
    pool: SqlitePool,
    known: RwLock<HashSet<String>>,
}

impl RepoCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            known: RwLock::new(HashSet::new()),
        }
    }

    /// Table name for `name`, creating the table when `create` is set
    ///
    /// Returns `None` if the repository doesn't exist and `create` is false.
    /// Invalid names are an `InvalidInput` error.
    pub async fn get_or_create(&self, name: &str, create: bool) -> Result<Option<String>> {
        let table = quote_repo_table(name)?;

        if self.known.read().await.contains(name) {
            return Ok(Some(table));
        }

        if quote_repo_exists(&self.pool, name).await? {
            self.known.write().await.insert(name.to_string());
            return Ok(Some(table));
        }

        if !create {
            return Ok(None);
        }

        create_quote_repo_table(&self.pool, name).await?;
        info!("Created quote repository {}", table);
        self.known.write().await.insert(name.to_string());
        Ok(Some(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quoter_common::db::init_database;
    use quoter_common::Error;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_catalog_lookup_and_create() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("quoter.db")).await.unwrap();
        let catalog = RepoCatalog::new(pool);

        assert_eq!(
            catalog.get_or_create("v2", false).await.unwrap(),
            Some("quoter_v2".to_string())
        );
        assert_eq!(catalog.get_or_create("old", false).await.unwrap(), None);
        assert_eq!(
            catalog.get_or_create("old", true).await.unwrap(),
            Some("quoter_old".to_string())
        );
        assert_eq!(
            catalog.get_or_create("old", false).await.unwrap(),
            Some("quoter_old".to_string())
        );
    }

    #[tokio::test]
    async fn test_catalog_rejects_bad_names() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("quoter.db")).await.unwrap();
        let catalog = RepoCatalog::new(pool);

        let err = catalog.get_or_create("Old_Quotes", true).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}

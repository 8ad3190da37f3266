//! Resolver lookup by name
//!
//! Factories are tried in registration order and the first one whose
//! `matches` accepts the name builds the resolver instance.

use async_trait::async_trait;
use quoter_common::db::DEFAULT_REPO;
use quoter_common::{Error, Result};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::debug;

use super::{DatabaseResolver, LegacyResolver, RepoCatalog, Resolver};

#[async_trait]
pub trait ResolverFactory: Send + Sync {
    fn matches(&self, name: &str) -> bool;

    async fn create(&self, name: &str) -> Result<Arc<dyn Resolver>>;
}

#[derive(Default)]
pub struct ResolverRegistry {
    factories: Vec<Arc<dyn ResolverFactory>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `uadaf`, `uadaf:<repo>` and `legacy`
    pub fn with_defaults(pool: SqlitePool, catalog: Arc<RepoCatalog>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(UadafFactory {
            pool: pool.clone(),
            catalog,
        }));
        registry.register(Arc::new(LegacyFactory { pool }));
        registry
    }

    pub fn register(&mut self, factory: Arc<dyn ResolverFactory>) {
        self.factories.push(factory);
    }

    pub async fn resolve(&self, name: &str) -> Result<Arc<dyn Resolver>> {
        let factory = self
            .factories
            .iter()
            .find(|f| f.matches(name))
            .ok_or_else(|| Error::InvalidInput(format!("Unknown resolver: {}", name)))?;

        debug!("Resolving {}", name);
        factory.create(name).await
    }
}

/// Local v2 repositories: `uadaf` is the default repo, `uadaf:<name>` any other
struct UadafFactory {
    pool: SqlitePool,
    catalog: Arc<RepoCatalog>,
}

impl UadafFactory {
    const PREFIX: &'static str = "uadaf";
}

#[async_trait]
impl ResolverFactory for UadafFactory {
    fn matches(&self, name: &str) -> bool {
        name == Self::PREFIX
            || name
                .strip_prefix(Self::PREFIX)
                .is_some_and(|rest| rest.starts_with(':'))
    }

    async fn create(&self, name: &str) -> Result<Arc<dyn Resolver>> {
        let repo = match name.split_once(':') {
            Some((_, repo)) => repo,
            None => DEFAULT_REPO,
        };

        let table = self
            .catalog
            .get_or_create(repo, false)
            .await?
            .ok_or_else(|| Error::InvalidInput(format!("Unknown quote repository: {}", repo)))?;

        Ok(Arc::new(DatabaseResolver::new(name, self.pool.clone(), table)))
    }
}

struct LegacyFactory {
    pool: SqlitePool,
}

#[async_trait]
impl ResolverFactory for LegacyFactory {
    fn matches(&self, name: &str) -> bool {
        name == LegacyResolver::NAME
    }

    async fn create(&self, _spec: &str) -> Result<Arc<dyn Resolver>> {
        Ok(Arc::new(LegacyResolver::new(self.pool.clone())))
    }
}

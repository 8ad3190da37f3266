//! quoter-server library
//!
//! HTTP backend for the quote book: the legacy v1 quote API, the
//! resolver-based v2 API with attachments, per-user story pointers, a
//! read-only music library browser and an HTML quote view.

use axum::Router;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod music;
pub mod resolvers;

use music::MusicContext;
use resolvers::{RepoCatalog, ResolverRegistry};

/// Prefix of every JSON API route
pub const API_PREFIX: &str = "/bakend/apiend/api";
/// Prefix of the server-rendered pages
pub const WEB_PREFIX: &str = "/bakend/webend/web";

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// SHA-256 (hex) of the write access key; `None` closes every write route
    pub access_key_sha256: Option<String>,
    pub resolvers: Arc<ResolverRegistry>,
    pub repos: Arc<RepoCatalog>,
    /// `None` when no library is configured or the scan failed
    pub music: Option<Arc<MusicContext>>,
}

impl AppState {
    /// State with the default resolvers (`uadaf`, `uadaf:<repo>`, `legacy`)
    pub fn new(
        db: SqlitePool,
        access_key_sha256: Option<String>,
        music: Option<MusicContext>,
    ) -> Self {
        let repos = Arc::new(RepoCatalog::new(db.clone()));
        let resolvers = Arc::new(ResolverRegistry::with_defaults(db.clone(), repos.clone()));
        Self {
            db,
            access_key_sha256,
            resolvers,
            repos,
            music: music.map(Arc::new),
        }
    }
}

/// Build application router
///
/// `static_dir` is served under `/static` when set.
pub fn build_router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let api = Router::new()
        .nest("/quote", api::quote_routes())
        .nest("/ith", api::story_routes())
        .nest("/music", api::music_routes())
        .nest("/v2/attachments", api::attachment_routes(state.clone()))
        .nest("/v2/quote", api::quote_v2_routes(state.clone()))
        .route("/v2/attachments/", api::attachments::upload_route(state.clone()))
        .route("/v2/quote/", api::quotes_v2::add_route(state.clone()));

    let mut router = Router::new()
        .nest(API_PREFIX, api)
        .nest(WEB_PREFIX, api::web_routes())
        .merge(api::health_routes());

    if let Some(dir) = static_dir {
        router = router.nest_service("/static", ServeDir::new(dir));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

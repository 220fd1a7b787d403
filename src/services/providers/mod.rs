//! Media catalog abstraction
//!
//! The recommendation pipeline only talks to this trait, so the TMDB client can
//! be swapped for a fake in tests. Implementations own transport, auth and
//! caching; callers decide how failures degrade.
use std::sync::Arc;

use crate::{
    credentials::Auth,
    error::AppResult,
    models::{Candidate, ContentKind, TitleDetails, WatchProviders},
};

pub mod tmdb;

pub use tmdb::TmdbClient;

/// Trait for media metadata catalogs
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// One page of popular titles of `kind` in a single genre, adult content excluded
    async fn discover(&self, kind: ContentKind, genre_id: u32, page: u32)
        -> AppResult<Vec<Candidate>>;

    /// Streaming offers for one title, keyed by region
    async fn watch_providers(&self, kind: ContentKind, id: u64) -> AppResult<WatchProviders>;

    /// Cast and trailer for one title
    async fn details(&self, kind: ContentKind, id: u64) -> AppResult<TitleDetails>;

    /// Region codes the catalog has provider data for, sorted and unique
    async fn provider_regions(&self) -> AppResult<Vec<String>>;

    /// A copy of this provider that authenticates with `auth`
    fn with_auth(&self, auth: Auth) -> Arc<dyn CatalogProvider>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

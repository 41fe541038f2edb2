/// Application Context
///
/// Owns the profile query cache and the profile source for one mounted app.
/// The root component creates it, provides it through the Dioxus context API
/// and disposes it on teardown; nothing in the app reaches for a global.

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use std::rc::Rc;

use crate::stores::errors::FetchError;
use crate::stores::profile_source::{ProfileSource, StubProfileSource};
use crate::stores::profiles::Profile;
use crate::stores::query_cache::{CacheConfig, QueryCache};

#[derive(Clone)]
pub struct AppContext {
    profiles: QueryCache<Profile>,
    source: Rc<dyn ProfileSource>,
}

impl AppContext {
    pub fn create(source: Rc<dyn ProfileSource>, config: CacheConfig) -> Self {
        Self {
            profiles: QueryCache::create(config),
            source,
        }
    }

    /// Context backed by the delayed demo stub
    pub fn with_stub() -> Self {
        Self::create(Rc::new(StubProfileSource::new()), CacheConfig::default())
    }

    /// The profile query cache
    pub fn profiles(&self) -> QueryCache<Profile> {
        self.profiles.clone()
    }

    /// A reusable producer that asks the configured source for the profile
    pub fn profile_fetcher(
        &self,
    ) -> impl Fn() -> LocalBoxFuture<'static, Result<Profile, FetchError>> + Clone + 'static {
        let source = Rc::clone(&self.source);
        move || {
            let source = Rc::clone(&source);
            async move { source.fetch_profile().await }.boxed_local()
        }
    }

    /// Tear down the cache; in-flight fetches finish without writing back
    pub fn dispose(&self) {
        self.profiles.dispose();
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::with_stub()
    }
}

//! use_query hook - bridges a [`QueryCache`] entry into component state
//!
//! The hook attaches one observer for the lifetime of the component:
//! - the entry's state is mirrored into a signal on every change
//! - if this observer is the one that started the fetch, the fetch task is
//!   spawned in the component's scope
//! - unmounting cancels both; a fetch cancelled that way releases its key
//!   so the next mount can try again

use dioxus::prelude::*;
use std::future::Future;

use crate::context::app_context::AppContext;
use crate::stores::errors::FetchError;
use crate::stores::profiles::{Profile, PROFILE_QUERY_KEY};
use crate::stores::query_cache::{QueryCache, QueryKey, QueryState};

/// Return type for the use_query hook
pub struct UseQuery<T: 'static> {
    /// Latest state of the query
    pub state: Signal<QueryState<T>>,
    /// Start a fresh fetch (ignored while one is running)
    pub refetch: EventHandler<()>,
}

impl<T: 'static> Clone for UseQuery<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> Copy for UseQuery<T> {}

/// Hook for observing a cached query
///
/// # Example
/// ```rust
/// let ctx = use_context::<AppContext>();
/// let query = use_query(ctx.profiles(), PROFILE_QUERY_KEY, ctx.profile_fetcher());
///
/// match &*query.state.read() {
///     DataState::Loaded(profile) => rsx! { ProfileCard { profile: profile.clone() } },
///     _ => rsx! { ProfileCardSkeleton {} },
/// }
/// ```
pub fn use_query<T, F, Fut>(cache: QueryCache<T>, key: QueryKey, producer: F) -> UseQuery<T>
where
    T: Clone + 'static,
    F: Fn() -> Fut + Clone + 'static,
    Fut: Future<Output = Result<T, FetchError>> + 'static,
{
    let mut state = use_signal(|| QueryState::<T>::Pending);

    let cache_observe = cache.clone();
    let producer_observe = producer.clone();
    use_future(move || {
        let cache = cache_observe.clone();
        let producer = producer_observe.clone();
        async move {
            let observer = cache.query(key, producer);
            if let Some(task) = observer.task {
                spawn(task);
            }

            let mut receiver = observer.state;
            loop {
                let current = receiver.borrow_and_update().clone();
                state.set(current);
                if receiver.changed().await.is_err() {
                    log::debug!("Query '{}' closed", key);
                    break;
                }
            }
        }
    });

    let refetch = use_callback(move |_: ()| {
        if let Some(task) = cache.refetch(key, producer.clone()) {
            spawn(task);
        }
    });

    UseQuery { state, refetch }
}

/// The demo profile query, served by the [`AppContext`] in scope
pub fn use_profile() -> UseQuery<Profile> {
    let ctx = use_context::<AppContext>();
    use_query(ctx.profiles(), PROFILE_QUERY_KEY, ctx.profile_fetcher())
}

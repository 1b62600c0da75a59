use crate::core::hint::startup_hint;
use crate::core::map_state::{HomeView, MapState};
use crate::core::resolver::Resolver;
use crate::domain::model::{Resolution, SearchState};
use crate::domain::ports::{ConfigProvider, RegistryLookup};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

pub const SEARCHING_STATUS: &str = "Searching ...";

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Applied(Resolution),
    /// A newer search was issued while this one was in flight.
    Stale { generation: u64 },
}

impl SearchOutcome {
    pub fn is_stale(&self) -> bool {
        matches!(self, SearchOutcome::Stale { .. })
    }
}

#[derive(Debug)]
struct SessionState {
    state: SearchState,
    status: String,
    map: MapState,
    last: Option<Resolution>,
}

/// Application context: the resolver plus the map it drives.
///
/// Only the most recently issued search may touch the map. The state lock is never
/// held across an await.
pub struct SearchSession<R: RegistryLookup> {
    resolver: Resolver<R>,
    generation: AtomicU64,
    inner: Mutex<SessionState>,
}

impl<R: RegistryLookup> SearchSession<R> {
    pub fn new(resolver: Resolver<R>, map: MapState) -> Self {
        Self {
            resolver,
            generation: AtomicU64::new(0),
            inner: Mutex::new(SessionState {
                state: SearchState::Idle,
                status: String::new(),
                map,
                last: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn resolver(&self) -> &Resolver<R> {
        &self.resolver
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> SearchState {
        self.lock().state
    }

    pub fn status(&self) -> String {
        self.lock().status.clone()
    }

    pub fn map(&self) -> MapState {
        self.lock().map.clone()
    }

    pub fn last_resolution(&self) -> Option<Resolution> {
        self.lock().last.clone()
    }

    /// Runs `f` against the map, e.g. for layer and overlay toggles.
    pub fn with_map<T>(&self, f: impl FnOnce(&mut MapState) -> T) -> T {
        f(&mut self.lock().map)
    }

    /// Back to `Idle` once the caller has consumed the result.
    pub fn finish(&self) {
        let mut inner = self.lock();
        if inner.state != SearchState::Searching {
            inner.state = SearchState::Idle;
        }
    }

    pub async fn search(&self, query: &str) -> SearchOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut inner = self.lock();
            inner.state = SearchState::Searching;
            inner.status = SEARCHING_STATUS.to_string();
        }
        tracing::debug!("Search #{} started for '{}'", generation, query);

        let found = self.resolver.find(query).await;

        if self.generation() != generation {
            tracing::debug!("Discarding stale search #{} for '{}'", generation, query);
            return SearchOutcome::Stale { generation };
        }

        let resolution = match found {
            Ok(selected) => self.resolver.resolve(selected),
            Err(e) => self.resolver.lookup_failed(&e),
        };

        let mut inner = self.lock();
        // resolve() is synchronous, but check again in case another search started meanwhile
        if self.generation() != generation {
            return SearchOutcome::Stale { generation };
        }
        inner.map.apply_viewport(&resolution.viewport);
        inner.state = if resolution.viewport.is_fallback() {
            SearchState::NotFound
        } else {
            SearchState::Resolved
        };
        inner.status = resolution.status.clone();
        inner.last = Some(resolution.clone());
        tracing::info!("{}", resolution.status);

        SearchOutcome::Applied(resolution)
    }

    /// Initial search on page load.
    ///
    /// Uses the `projQuery` code from `page_url` when present. Otherwise searches
    /// `default_hint` and then moves the view to `home`.
    pub async fn bootstrap(
        &self,
        page_url: Option<&str>,
        default_hint: &str,
        home: Option<HomeView>,
    ) -> SearchOutcome {
        let startup = startup_hint(page_url, default_hint);
        tracing::info!(
            "🚀 Initial search for '{}' ({})",
            startup.hint,
            if startup.from_page { "page parameter" } else { "default" }
        );

        let outcome = self.search(&startup.hint).await;
        if let (SearchOutcome::Applied(_), false, Some(home)) = (&outcome, startup.from_page, home)
        {
            self.lock().map.apply_home(home);
            tracing::debug!("Applied home view {:?}", home);
        }
        outcome
    }

    /// `bootstrap` with the default hint and home view taken from `config`.
    pub async fn bootstrap_from_config<C: ConfigProvider + ?Sized>(
        &self,
        page_url: Option<&str>,
        config: &C,
    ) -> SearchOutcome {
        self.bootstrap(
            page_url,
            config.default_hint(),
            Some(HomeView::from_config(config)),
        )
        .await
    }
}

use crate::aggregate::{
    self, tag_and_merge, CityEntry, CountryEntry, CountryStats, Stats, UnifiedCollection,
};
use crate::api::PlaceSource;
use crate::error::Error;
use crate::favorites::{self, FavoriteSet, FavoriteSummary};
use crate::models::Place;
use crate::store::KeyValueStore;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Store key for the persisted favorites id-set.
pub const FAVORITES_KEY: &str = "tourism-scout-favorites-v1";
/// Store key for the persisted data snapshot.
pub const SNAPSHOT_KEY: &str = "tourism-scout-cache-v1";

/// Timestamped copy of the last successfully aggregated collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub payload: UnifiedCollection,
}

/// Session owning the current collection, the favorites set, and the
/// refresh lifecycle.
///
/// The collection is an immutable snapshot replaced wholesale on each
/// successful refresh; derived views are recomputed from it on demand.
/// `refresh` takes `&mut self`, so two refreshes on one session cannot
/// overlap and resolve out of order.
pub struct PlacesSession {
    source: Arc<dyn PlaceSource>,
    store: Arc<dyn KeyValueStore>,
    data: UnifiedCollection,
    favorites: FavoriteSet,
    last_updated: Option<DateTime<Utc>>,
    loading: bool,
    error: Option<Error>,
}

impl PlacesSession {
    pub fn new(source: Arc<dyn PlaceSource>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            source,
            store,
            data: UnifiedCollection::default(),
            favorites: FavoriteSet::new(),
            last_updated: None,
            loading: true,
            error: None,
        }
    }

    /// Restore the prior snapshot and favorites, then fetch fresh data.
    pub async fn initialize(&mut self) {
        self.hydrate().await;
        self.refresh().await;
    }

    /// Load whatever the local store has, without touching the network.
    /// Returns whether a usable snapshot was found.
    pub async fn hydrate(&mut self) -> bool {
        match self.store.get(FAVORITES_KEY).await {
            Ok(raw) => self.favorites = FavoriteSet::from_stored(raw.as_deref()),
            Err(err) => warn!("Failed to load favorites: {}", err),
        }

        let raw = match self.store.get(SNAPSHOT_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(err) => {
                warn!("Failed to load snapshot: {}", err);
                return false;
            }
        };

        match serde_json::from_str::<Snapshot>(&raw) {
            Ok(snapshot) => {
                info!(
                    "Hydrated {} places from snapshot taken {}",
                    snapshot.payload.len(),
                    snapshot.timestamp
                );
                self.data = snapshot.payload;
                self.last_updated = Some(snapshot.timestamp);
                true
            }
            Err(err) => {
                warn!("Failed to parse cached snapshot: {}", err);
                false
            }
        }
    }

    /// Fetch all three collections, aggregate, and replace the session data.
    ///
    /// On failure prior data stays on display and the error rides alongside
    /// it; the snapshot is persisted only after the in-memory state is
    /// updated, and only on success.
    pub async fn refresh(&mut self) {
        self.loading = true;
        info!("Refreshing places from {}", self.source.source_name());

        match self.source.fetch_all().await {
            Ok(raw) => {
                self.data = tag_and_merge(raw.hotels, raw.restaurants, raw.events);
                self.last_updated = Some(Utc::now());
                self.error = None;
                info!("Refreshed {} places", self.data.len());
                self.persist_snapshot().await;
            }
            Err(err) => {
                warn!("Refresh failed: {}", err);
                self.error = Some(err);
            }
        }

        self.loading = false;
    }

    /// Toggle a favorite and persist the new set best-effort.
    pub async fn toggle_favorite(&mut self, place: &Place) {
        self.favorites = self.favorites.toggle(place);
        self.persist_favorites().await;
    }

    pub async fn clear_favorites(&mut self) {
        self.favorites = self.favorites.clear();
        self.persist_favorites().await;
    }

    pub fn data(&self) -> &UnifiedCollection {
        &self.data
    }

    pub fn favorites(&self) -> &FavoriteSet {
        &self.favorites
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Nothing to show yet and the first fetch is still in flight.
    pub fn is_initial_loading(&self) -> bool {
        self.loading && self.data.is_empty()
    }

    /// Stale-but-present data always wins over an error screen; the error is
    /// fatal only when there is nothing to display.
    pub fn fatal_error(&self) -> Option<&Error> {
        if self.data.is_empty() {
            self.error.as_ref()
        } else {
            None
        }
    }

    pub fn global_stats(&self) -> Stats {
        aggregate::compute_global_stats(&self.data)
    }

    pub fn country_stats(&self) -> IndexMap<String, CountryStats> {
        aggregate::compute_country_stats(&self.data)
    }

    pub fn city_view(&self) -> Vec<CityEntry<'_>> {
        aggregate::build_city_view(&self.data)
    }

    pub fn country_view(&self) -> Vec<CountryEntry<'_>> {
        aggregate::build_country_view(&self.data)
    }

    pub fn favorite_places(&self) -> Vec<&Place> {
        self.favorites.resolve(&self.data)
    }

    pub fn favorite_summary(&self) -> FavoriteSummary {
        favorites::summarize(&self.favorite_places())
    }

    /// Best-effort write; a failure costs cache continuity, nothing else.
    async fn persist_snapshot(&self) {
        let snapshot = Snapshot {
            timestamp: self.last_updated.unwrap_or_else(Utc::now),
            payload: self.data.clone(),
        };
        let json = match serde_json::to_string(&snapshot) {
            Ok(json) => json,
            Err(err) => {
                warn!("Failed to encode snapshot: {}", err);
                return;
            }
        };
        if let Err(err) = self.store.set(SNAPSHOT_KEY, &json).await {
            warn!("Failed to persist snapshot: {}", err);
        }
    }

    async fn persist_favorites(&self) {
        if let Err(err) = self.store.set(FAVORITES_KEY, &self.favorites.to_json()).await {
            warn!("Failed to persist favorites: {}", err);
        }
    }
}

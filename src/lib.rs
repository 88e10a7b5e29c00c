//! Client-side aggregation core for a tourism discovery app.
//!
//! Fetches hotels, restaurants, and events from a places API, derives
//! unified queryable views (rollup stats, city and country groupings with
//! centroids and highlights, favorites), and caches the last good snapshot
//! locally. Screens and maps consume these views; they are not part of this
//! crate.

pub mod aggregate;
pub mod api;
pub mod error;
pub mod favorites;
pub mod models;
pub mod session;
pub mod store;

pub use aggregate::{
    build_city_view, build_country_view, compute_country_stats, compute_global_stats,
    filter_places, geotagged, tag_and_merge, CityEntry, CityStats, CountryEntry, CountryStats,
    GeoPoint, Stats, UnifiedCollection,
};
pub use api::{ClientConfig, PlaceSource, PlacesClient, RawCollections};
pub use error::{Error, Result};
pub use favorites::{FavoriteSet, FavoriteSummary};
pub use models::{Kind, Place, PlaceDetails};
pub use session::{PlacesSession, Snapshot};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};

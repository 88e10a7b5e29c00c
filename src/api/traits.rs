use crate::error::Result;
use crate::models::{EventRecord, HotelRecord, RestaurantRecord};
use async_trait::async_trait;

/// The three raw collections, fetched together.
#[derive(Debug, Clone, Default)]
pub struct RawCollections {
    pub hotels: Vec<HotelRecord>,
    pub restaurants: Vec<RestaurantRecord>,
    pub events: Vec<EventRecord>,
}

/// Common trait for remote place sources
/// This allows swapping the live API for fixtures or other providers in tests
#[async_trait]
pub trait PlaceSource: Send + Sync {
    /// Fetch all three collections concurrently; fails as a whole if any one fails
    async fn fetch_all(&self) -> Result<RawCollections>;

    /// Get the name of the source
    fn source_name(&self) -> &'static str;
}

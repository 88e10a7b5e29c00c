use crate::aggregate::UnifiedCollection;
use crate::models::{Kind, Place};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// User-selected places, tracked as composite `kind:id` keys.
///
/// Toggles return a new set instead of mutating in place; the owning session
/// swaps the whole value and persists it best-effort after every mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteSet(BTreeSet<String>);

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the stored JSON array; absent or corrupt data yields an empty
    /// set rather than an error.
    pub fn from_stored(raw: Option<&str>) -> Self {
        raw.and_then(|json| serde_json::from_str(json).ok())
            .unwrap_or_default()
    }

    /// Stored representation: a JSON array of composite keys.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "[]".to_string())
    }

    /// Add the place if absent, remove it if present.
    pub fn toggle(&self, place: &Place) -> Self {
        let key = place.favorite_key();
        let mut next = self.0.clone();
        if !next.remove(&key) {
            next.insert(key);
        }
        Self(next)
    }

    pub fn is_favorite(&self, place: &Place) -> bool {
        self.0.contains(&place.favorite_key())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn clear(&self) -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Members of the set, in `combined` order rather than toggle order.
    pub fn resolve<'a>(&self, collection: &'a UnifiedCollection) -> Vec<&'a Place> {
        collection
            .combined()
            .filter(|place| self.is_favorite(place))
            .collect()
    }
}

/// Rollup of the favorites list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FavoriteSummary {
    pub total: usize,
    pub hotel: usize,
    /// Counted by kind, so bars land here together with restaurants.
    pub restaurant: usize,
    pub event: usize,
    /// City with the most favorites; ties keep the first one encountered
    /// during the scan.
    pub top_city: Option<String>,
}

pub fn summarize(favorites: &[&Place]) -> FavoriteSummary {
    let mut summary = FavoriteSummary {
        total: favorites.len(),
        ..Default::default()
    };
    let mut city_counts: Vec<(&str, usize)> = Vec::new();

    for place in favorites {
        match place.kind() {
            Kind::Hotel => summary.hotel += 1,
            Kind::Restaurant => summary.restaurant += 1,
            Kind::Event => summary.event += 1,
        }
        if let Some(city) = place.city.as_deref().filter(|city| !city.is_empty()) {
            match city_counts.iter_mut().find(|(name, _)| *name == city) {
                Some((_, count)) => *count += 1,
                None => city_counts.push((city, 1)),
            }
        }
    }

    let mut top: Option<(&str, usize)> = None;
    for (city, count) in &city_counts {
        if top.map_or(true, |(_, best)| *count > best) {
            top = Some((city, *count));
        }
    }
    summary.top_city = top.map(|(city, _)| city.to_string());

    summary
}

/// Top-rated favorite, falling back to the first favorite.
pub fn highlight<'a>(favorites: &[&'a Place]) -> Option<&'a Place> {
    let mut best: Option<(&'a Place, f64)> = None;
    for place in favorites.iter().copied() {
        if let Some(rating) = place.rating_value() {
            if best.map_or(true, |(_, top)| rating > top) {
                best = Some((place, rating));
            }
        }
    }

    best.map(|(place, _)| place)
        .or_else(|| favorites.first().copied())
}

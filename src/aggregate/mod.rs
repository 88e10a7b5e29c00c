//! Pure aggregation over the three fetched collections.
//!
//! Everything here is synchronous and deterministic: the session replaces its
//! collection wholesale on refresh and recomputes these views from scratch,
//! so there is no incremental state to go stale.

use crate::models::{EventRecord, HotelRecord, Kind, Place, RestaurantRecord};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

/// The three kind-tagged collections.
///
/// `combined` is a derived view over the stored lists rather than a fourth
/// copy; its order is always hotels, then restaurants, then events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnifiedCollection {
    pub hotels: Vec<Place>,
    pub restaurants: Vec<Place>,
    pub events: Vec<Place>,
}

impl UnifiedCollection {
    /// All places, in hotels ++ restaurants ++ events order.
    pub fn combined(&self) -> impl Iterator<Item = &Place> {
        self.hotels
            .iter()
            .chain(&self.restaurants)
            .chain(&self.events)
    }

    pub fn len(&self) -> usize {
        self.hotels.len() + self.restaurants.len() + self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Stamp the three raw collections with their kind and merge them.
///
/// Input order is preserved per kind. Ids are scoped per kind, so no
/// cross-kind deduplication happens; a duplicate id within a kind stays as
/// two independent entries.
pub fn tag_and_merge(
    hotels: Vec<HotelRecord>,
    restaurants: Vec<RestaurantRecord>,
    events: Vec<EventRecord>,
) -> UnifiedCollection {
    UnifiedCollection {
        hotels: hotels.into_iter().map(Place::from).collect(),
        restaurants: restaurants.into_iter().map(Place::from).collect(),
        events: events.into_iter().map(Place::from).collect(),
    }
}

/// Rollup counters across the whole collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub hotel_count: usize,
    /// Restaurants that are not bars.
    pub restaurant_count: usize,
    pub bar_count: usize,
    pub event_count: usize,
    /// Distinct non-empty `city` (or event `location`) values across all kinds.
    pub city_count: usize,
    /// Distinct non-empty `country` values.
    pub country_count: usize,
}

pub fn compute_global_stats(collection: &UnifiedCollection) -> Stats {
    let bar_count = collection
        .restaurants
        .iter()
        .filter(|place| place.is_bar())
        .count();
    let cities: HashSet<&str> = collection.combined().filter_map(Place::city_hint).collect();
    let countries: HashSet<&str> = collection
        .combined()
        .filter_map(Place::country_hint)
        .collect();

    Stats {
        hotel_count: collection.hotels.len(),
        restaurant_count: collection.restaurants.len() - bar_count,
        bar_count,
        event_count: collection.events.len(),
        city_count: cities.len(),
        country_count: countries.len(),
    }
}

/// Per-country rollup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CountryStats {
    pub hotel_count: usize,
    pub restaurant_count: usize,
    pub bar_count: usize,
    pub event_count: usize,
    pub city_count: usize,
}

/// Group every place into its country bucket and accumulate kind counters.
///
/// Buckets iterate in first-encounter order; callers wanting alphabetical
/// output sort the keys themselves. A place without a `city` still counts
/// toward its kind total but not toward `city_count` (the event `location`
/// fallback does not apply here).
pub fn compute_country_stats(collection: &UnifiedCollection) -> IndexMap<String, CountryStats> {
    let mut buckets: IndexMap<String, (CountryStats, HashSet<&str>)> = IndexMap::new();

    for place in collection.combined() {
        let (stats, cities) = buckets
            .entry(place.country_bucket().to_string())
            .or_insert_with(Default::default);

        match place.kind() {
            Kind::Hotel => stats.hotel_count += 1,
            Kind::Restaurant if place.is_bar() => stats.bar_count += 1,
            Kind::Restaurant => stats.restaurant_count += 1,
            Kind::Event => stats.event_count += 1,
        }

        if let Some(city) = place.city.as_deref().filter(|city| !city.is_empty()) {
            cities.insert(city);
        }
    }

    buckets
        .into_iter()
        .map(|(country, (mut stats, cities))| {
            stats.city_count = cities.len();
            (country, stats)
        })
        .collect()
}

/// Geographic centroid of a bucket's geocoded places.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Venue counters for one city bucket; `total` counts venues, not events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CityStats {
    pub hotels: usize,
    pub dining: usize,
    pub bars: usize,
    pub events: usize,
    pub total: usize,
}

/// One city bucket with partitioned, sorted venues.
#[derive(Debug, Clone)]
pub struct CityEntry<'a> {
    pub city: &'a str,
    pub hotels: Vec<&'a Place>,
    pub restaurants: Vec<&'a Place>,
    pub bars: Vec<&'a Place>,
    pub events: Vec<&'a Place>,
    /// Arithmetic mean over places with both coordinates; `None` when no
    /// place in the bucket is geocoded.
    pub center: Option<GeoPoint>,
    pub highlight: Option<&'a Place>,
    pub stats: CityStats,
}

/// Partition every place into its city bucket and derive the per-city view.
///
/// The returned list is sorted ascending by city name (ordinal comparison);
/// bucket membership is `city`, then the event `location`, then the
/// sentinel bucket.
pub fn build_city_view(collection: &UnifiedCollection) -> Vec<CityEntry<'_>> {
    struct Bucket<'a> {
        hotels: Vec<&'a Place>,
        restaurants: Vec<&'a Place>,
        bars: Vec<&'a Place>,
        events: Vec<&'a Place>,
        lat_sum: f64,
        lon_sum: f64,
        geocoded: usize,
    }

    let mut buckets: IndexMap<&str, Bucket<'_>> = IndexMap::new();

    for place in collection.combined() {
        let bucket = buckets.entry(place.city_bucket()).or_insert_with(|| Bucket {
            hotels: Vec::new(),
            restaurants: Vec::new(),
            bars: Vec::new(),
            events: Vec::new(),
            lat_sum: 0.0,
            lon_sum: 0.0,
            geocoded: 0,
        });

        if let Some((latitude, longitude)) = place.coordinates() {
            bucket.lat_sum += latitude;
            bucket.lon_sum += longitude;
            bucket.geocoded += 1;
        }

        match place.kind() {
            Kind::Hotel => bucket.hotels.push(place),
            Kind::Restaurant if place.is_bar() => bucket.bars.push(place),
            Kind::Restaurant => bucket.restaurants.push(place),
            Kind::Event => bucket.events.push(place),
        }
    }

    let mut entries: Vec<CityEntry<'_>> = buckets
        .into_iter()
        .map(|(city, mut bucket)| {
            sort_by_rating_desc(&mut bucket.hotels);
            sort_by_rating_desc(&mut bucket.restaurants);
            sort_by_rating_desc(&mut bucket.bars);
            sort_by_event_date(&mut bucket.events);

            let highlight = pick_highlight(
                &bucket.hotels,
                &bucket.restaurants,
                &bucket.bars,
                &bucket.events,
            );
            let center = (bucket.geocoded > 0).then(|| GeoPoint {
                latitude: bucket.lat_sum / bucket.geocoded as f64,
                longitude: bucket.lon_sum / bucket.geocoded as f64,
            });
            let stats = CityStats {
                hotels: bucket.hotels.len(),
                dining: bucket.restaurants.len(),
                bars: bucket.bars.len(),
                events: bucket.events.len(),
                total: bucket.hotels.len() + bucket.restaurants.len() + bucket.bars.len(),
            };

            CityEntry {
                city,
                hotels: bucket.hotels,
                restaurants: bucket.restaurants,
                bars: bucket.bars,
                events: bucket.events,
                center,
                highlight,
                stats,
            }
        })
        .collect();

    entries.sort_by(|a, b| a.city.cmp(b.city));
    entries
}

/// One country bucket; venue lists keep input order.
#[derive(Debug, Clone)]
pub struct CountryEntry<'a> {
    pub country: &'a str,
    pub hotels: Vec<&'a Place>,
    pub restaurants: Vec<&'a Place>,
    pub bars: Vec<&'a Place>,
    pub events: Vec<&'a Place>,
    pub city_count: usize,
}

/// Same partitioning as the city view, grouped by country instead.
///
/// Output keeps first-encounter order; callers sort if they need to.
pub fn build_country_view(collection: &UnifiedCollection) -> Vec<CountryEntry<'_>> {
    struct Bucket<'a> {
        hotels: Vec<&'a Place>,
        restaurants: Vec<&'a Place>,
        bars: Vec<&'a Place>,
        events: Vec<&'a Place>,
        cities: HashSet<&'a str>,
    }

    let mut buckets: IndexMap<&str, Bucket<'_>> = IndexMap::new();

    for place in collection.combined() {
        let bucket = buckets
            .entry(place.country_bucket())
            .or_insert_with(|| Bucket {
                hotels: Vec::new(),
                restaurants: Vec::new(),
                bars: Vec::new(),
                events: Vec::new(),
                cities: HashSet::new(),
            });

        if let Some(city) = place.city.as_deref().filter(|city| !city.is_empty()) {
            bucket.cities.insert(city);
        }

        match place.kind() {
            Kind::Hotel => bucket.hotels.push(place),
            Kind::Restaurant if place.is_bar() => bucket.bars.push(place),
            Kind::Restaurant => bucket.restaurants.push(place),
            Kind::Event => bucket.events.push(place),
        }
    }

    buckets
        .into_iter()
        .map(|(country, bucket)| CountryEntry {
            country,
            city_count: bucket.cities.len(),
            hotels: bucket.hotels,
            restaurants: bucket.restaurants,
            bars: bucket.bars,
            events: bucket.events,
        })
        .collect()
}

/// Restrict the combined view to a kind and/or a case-insensitive substring
/// query over name, description, location, and city.
pub fn filter_places<'a>(
    collection: &'a UnifiedCollection,
    kind: Option<Kind>,
    query: &str,
) -> Vec<&'a Place> {
    let needle = query.to_lowercase();

    collection
        .combined()
        .filter(|place| kind.map_or(true, |wanted| place.kind() == wanted))
        .filter(|place| needle.is_empty() || place.search_haystack().contains(&needle))
        .collect()
}

/// Places that can be pinned on a map.
pub fn geotagged(collection: &UnifiedCollection) -> Vec<&Place> {
    collection
        .combined()
        .filter(|place| place.coordinates().is_some())
        .collect()
}

/// Descending rating, unrated venues weighing zero. Stable, so ties keep
/// their input order.
fn sort_by_rating_desc(venues: &mut [&Place]) {
    venues.sort_by(|a, b| {
        b.rating_or_zero()
            .partial_cmp(&a.rating_or_zero())
            .unwrap_or(Ordering::Equal)
    });
}

/// Ascending by date, where a pair with a missing or unparseable date on
/// either side compares equal and stays in input order.
///
/// That comparator is not a total order, so this is a plain stable insertion
/// sort applying it pairwise instead of `sort_by`, which requires one.
fn sort_by_event_date(events: &mut [&Place]) {
    for sorted_end in 1..events.len() {
        let mut index = sorted_end;
        while index > 0 && compare_event_dates(events[index - 1], events[index]) == Ordering::Greater
        {
            events.swap(index - 1, index);
            index -= 1;
        }
    }
}

fn compare_event_dates(a: &Place, b: &Place) -> Ordering {
    match (a.event_date(), b.event_date()) {
        (Some(first), Some(second)) => first.cmp(&second),
        _ => Ordering::Equal,
    }
}

/// Highest-rated venue; first venue when none are rated, first event when
/// the bucket has no venues at all.
fn pick_highlight<'a>(
    hotels: &[&'a Place],
    restaurants: &[&'a Place],
    bars: &[&'a Place],
    events: &[&'a Place],
) -> Option<&'a Place> {
    let mut best: Option<(&'a Place, f64)> = None;
    let mut first_venue: Option<&'a Place> = None;

    for venue in hotels.iter().chain(restaurants).chain(bars).copied() {
        first_venue.get_or_insert(venue);
        if let Some(rating) = venue.rating_value() {
            if best.map_or(true, |(_, top)| rating > top) {
                best = Some((venue, rating));
            }
        }
    }

    best.map(|(venue, _)| venue)
        .or(first_venue)
        .or_else(|| events.first().copied())
}

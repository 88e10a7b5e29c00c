use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Bucket label for places without usable geography fields.
pub const OTHER_BUCKET: &str = "Other";

/// Kind of a place in the unified collection.
///
/// Assigned when the three raw collections are merged; the upstream payloads
/// carry no discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Hotel,
    Restaurant,
    Event,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Hotel => "hotel",
            Kind::Restaurant => "restaurant",
            Kind::Event => "event",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific attributes.
///
/// Everything the grouping logic branches on lives here, so the branches stay
/// exhaustive matches instead of field sniffing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PlaceDetails {
    Hotel {
        price_per_night: Option<String>,
    },
    Restaurant {
        category: Option<String>,
        opening_hours: Option<String>,
        menu: Option<String>,
    },
    Event {
        date: Option<String>,
        location: Option<String>,
    },
}

/// A tagged place from any of the three collections.
///
/// Numeric-looking fields (`latitude`, `longitude`, `rating`) keep the raw
/// string the backend serves; absent or non-numeric values drop out of geo and
/// rating aggregation instead of failing anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub rating: Option<String>,
    #[serde(flatten)]
    pub details: PlaceDetails,
}

impl Place {
    pub fn kind(&self) -> Kind {
        match self.details {
            PlaceDetails::Hotel { .. } => Kind::Hotel,
            PlaceDetails::Restaurant { .. } => Kind::Restaurant,
            PlaceDetails::Event { .. } => Kind::Event,
        }
    }

    /// Composite key identifying this place across all three collections.
    pub fn favorite_key(&self) -> String {
        format!("{}:{}", self.kind(), self.id)
    }

    pub fn rating_value(&self) -> Option<f64> {
        parse_decimal(self.rating.as_deref())
    }

    /// Sort weight for rating ordering; unrated places sink to the bottom.
    pub(crate) fn rating_or_zero(&self) -> f64 {
        self.rating_value().unwrap_or(0.0)
    }

    /// Both coordinates, when present and numeric.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let latitude = parse_decimal(self.latitude.as_deref())?;
        let longitude = parse_decimal(self.longitude.as_deref())?;
        Some((latitude, longitude))
    }

    /// A restaurant whose category is case-insensitively "bar" is grouped as a
    /// bar everywhere, never as a restaurant.
    pub fn is_bar(&self) -> bool {
        match &self.details {
            PlaceDetails::Restaurant { category, .. } => category
                .as_deref()
                .is_some_and(|category| category.eq_ignore_ascii_case("bar")),
            _ => false,
        }
    }

    pub fn event_date(&self) -> Option<NaiveDate> {
        match &self.details {
            PlaceDetails::Event { date, .. } => non_empty(date.as_deref())
                .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()),
            _ => None,
        }
    }

    /// `city`, falling back to the event `location`; `None` when both are
    /// absent or empty.
    pub fn city_hint(&self) -> Option<&str> {
        non_empty(self.city.as_deref()).or_else(|| match &self.details {
            PlaceDetails::Event { location, .. } => non_empty(location.as_deref()),
            _ => None,
        })
    }

    pub fn city_bucket(&self) -> &str {
        self.city_hint().unwrap_or(OTHER_BUCKET)
    }

    pub fn country_hint(&self) -> Option<&str> {
        non_empty(self.country.as_deref())
    }

    pub fn country_bucket(&self) -> &str {
        self.country_hint().unwrap_or(OTHER_BUCKET)
    }

    /// Text blob the discover search matches against.
    pub(crate) fn search_haystack(&self) -> String {
        let mut fields: Vec<&str> = vec![&self.name, &self.description];
        if let PlaceDetails::Event {
            location: Some(location),
            ..
        } = &self.details
        {
            fields.push(location);
        }
        if let Some(city) = &self.city {
            fields.push(city);
        }
        fields.join(" ").to_lowercase()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}

fn parse_decimal(value: Option<&str>) -> Option<f64> {
    value?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
}

/// The backend serializes decimals as JSON strings; accept bare numbers too.
fn stringly_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Number(value) => value.to_string(),
    }))
}

/// Raw hotel record as served by the places API.
///
/// Every field except `id` defaults, so a sparse record degrades instead of
/// failing the whole collection decode.
#[derive(Debug, Clone, Deserialize)]
pub struct HotelRecord {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "stringly_number")]
    pub latitude: Option<String>,
    #[serde(default, deserialize_with = "stringly_number")]
    pub longitude: Option<String>,
    #[serde(default, deserialize_with = "stringly_number")]
    pub rating: Option<String>,
    #[serde(default, deserialize_with = "stringly_number")]
    pub price_per_night: Option<String>,
}

/// Raw restaurant record as served by the places API.
#[derive(Debug, Clone, Deserialize)]
pub struct RestaurantRecord {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<String>,
    #[serde(default)]
    pub menu: Option<String>,
    #[serde(default, deserialize_with = "stringly_number")]
    pub latitude: Option<String>,
    #[serde(default, deserialize_with = "stringly_number")]
    pub longitude: Option<String>,
    #[serde(default, deserialize_with = "stringly_number")]
    pub rating: Option<String>,
}

/// Raw event record as served by the places API.
#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "stringly_number")]
    pub latitude: Option<String>,
    #[serde(default, deserialize_with = "stringly_number")]
    pub longitude: Option<String>,
    #[serde(default, deserialize_with = "stringly_number")]
    pub rating: Option<String>,
}

impl From<HotelRecord> for Place {
    fn from(record: HotelRecord) -> Self {
        Place {
            id: record.id,
            name: record.name,
            description: record.description,
            city: record.city,
            country: record.country,
            latitude: record.latitude,
            longitude: record.longitude,
            rating: record.rating,
            details: PlaceDetails::Hotel {
                price_per_night: record.price_per_night,
            },
        }
    }
}

impl From<RestaurantRecord> for Place {
    fn from(record: RestaurantRecord) -> Self {
        Place {
            id: record.id,
            name: record.name,
            description: record.description,
            city: record.city,
            country: record.country,
            latitude: record.latitude,
            longitude: record.longitude,
            rating: record.rating,
            details: PlaceDetails::Restaurant {
                category: record.category,
                opening_hours: record.opening_hours,
                menu: record.menu,
            },
        }
    }
}

impl From<EventRecord> for Place {
    fn from(record: EventRecord) -> Self {
        Place {
            id: record.id,
            name: record.name,
            description: record.description,
            city: record.city,
            country: record.country,
            latitude: record.latitude,
            longitude: record.longitude,
            rating: record.rating,
            details: PlaceDetails::Event {
                date: record.date,
                location: record.location,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotel(id: i64) -> Place {
        Place::from(HotelRecord {
            id,
            name: format!("Hotel {id}"),
            description: String::new(),
            city: None,
            country: None,
            latitude: None,
            longitude: None,
            rating: None,
            price_per_night: None,
        })
    }

    #[test]
    fn favorite_key_is_kind_and_id() {
        let place = hotel(12);
        assert_eq!(place.favorite_key(), "hotel:12");
    }

    #[test]
    fn rating_rejects_non_numeric_strings() {
        let mut place = hotel(1);
        place.rating = Some("great".to_string());
        assert_eq!(place.rating_value(), None);

        place.rating = Some("nan".to_string());
        assert_eq!(place.rating_value(), None);

        place.rating = Some("4.50".to_string());
        assert_eq!(place.rating_value(), Some(4.5));
    }

    #[test]
    fn coordinates_require_both_fields() {
        let mut place = hotel(1);
        place.latitude = Some("42.66".to_string());
        assert_eq!(place.coordinates(), None);

        place.longitude = Some("21.17".to_string());
        assert_eq!(place.coordinates(), Some((42.66, 21.17)));
    }

    #[test]
    fn city_bucket_falls_back_to_event_location_then_sentinel() {
        let event = Place::from(EventRecord {
            id: 1,
            name: "Fair".to_string(),
            description: String::new(),
            date: None,
            location: Some("Gjakova".to_string()),
            city: None,
            country: None,
            latitude: None,
            longitude: None,
            rating: None,
        });
        assert_eq!(event.city_bucket(), "Gjakova");

        let lodging = hotel(2);
        assert_eq!(lodging.city_bucket(), OTHER_BUCKET);
        assert_eq!(lodging.country_bucket(), OTHER_BUCKET);
    }

    #[test]
    fn empty_city_does_not_name_a_bucket() {
        let mut place = hotel(3);
        place.city = Some(String::new());
        assert_eq!(place.city_hint(), None);
        assert_eq!(place.city_bucket(), OTHER_BUCKET);
    }

    #[test]
    fn bar_category_is_case_insensitive() {
        let bar = Place::from(RestaurantRecord {
            id: 1,
            name: "Soma".to_string(),
            description: String::new(),
            city: None,
            country: None,
            category: Some("BAR".to_string()),
            opening_hours: None,
            menu: None,
            latitude: None,
            longitude: None,
            rating: None,
        });
        assert!(bar.is_bar());
        assert!(!hotel(1).is_bar());
    }

    #[test]
    fn records_accept_numeric_or_string_decimals() {
        let record: HotelRecord = serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "Grand",
            "rating": 4.5,
            "latitude": "42.6629",
        }))
        .expect("sparse record decodes");
        assert_eq!(record.rating.as_deref(), Some("4.5"));
        assert_eq!(record.latitude.as_deref(), Some("42.6629"));
        assert_eq!(record.city, None);
    }

    #[test]
    fn place_round_trips_through_json() {
        let mut place = hotel(9);
        place.city = Some("Prishtina".to_string());
        let json = serde_json::to_string(&place).expect("serializes");
        let restored: Place = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(restored, place);
        assert_eq!(restored.kind(), Kind::Hotel);
    }
}

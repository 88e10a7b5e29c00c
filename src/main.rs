use std::sync::Arc;

use tourism_scout::{ClientConfig, JsonFileStore, PlacesClient, PlacesSession};
use tracing::{info, Level};
use tracing_subscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("🌍 Tourism Scout - Places Explorer");
    info!("===================================");
    info!("");

    let mut config = ClientConfig::default();
    if let Ok(base_url) = std::env::var("TOURISM_SCOUT_API") {
        config.base_url = base_url;
    }

    let client = PlacesClient::with_config(config)?;
    let store = JsonFileStore::new(".tourism-scout");
    let mut session = PlacesSession::new(Arc::new(client), Arc::new(store));

    info!("Loading cached snapshot and fetching fresh data...");
    session.initialize().await;

    if let Some(err) = session.fatal_error() {
        anyhow::bail!("no data available: {err}");
    }
    if let Some(err) = session.error() {
        info!("Refresh failed, showing cached data: {}", err);
    }

    let stats = session.global_stats();
    info!("\n✅ Loaded {} places\n", session.data().len());

    println!(
        "{} hotels · {} restaurants · {} bars · {} events",
        stats.hotel_count, stats.restaurant_count, stats.bar_count, stats.event_count
    );
    println!(
        "{} cities across {} countries",
        stats.city_count, stats.country_count
    );
    println!();

    for (i, entry) in session.city_view().iter().enumerate() {
        println!(
            "{}. {} ({} venues, {} events)",
            i + 1,
            entry.city,
            entry.stats.total,
            entry.stats.events
        );
        if let Some(highlight) = entry.highlight {
            println!("   Highlight: {} ({})", highlight.name, highlight.kind());
        }
        if let Some(center) = entry.center {
            println!("   Center: {:.4}, {:.4}", center.latitude, center.longitude);
        }
        println!();
    }

    let by_country = session.country_stats();
    let mut countries: Vec<&String> = by_country.keys().collect();
    countries.sort();

    for country in countries {
        let stats = &by_country[country];
        println!(
            "{}: {} cities · {} hotels · {} dining · {} bars · {} events",
            country,
            stats.city_count,
            stats.hotel_count,
            stats.restaurant_count,
            stats.bar_count,
            stats.event_count
        );
    }

    if let Some(updated) = session.last_updated() {
        println!();
        println!("Last updated: {}", updated);
    }

    Ok(())
}

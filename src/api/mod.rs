pub mod client;
pub mod traits;

pub use client::{ClientConfig, PlacesClient};
pub use traits::{PlaceSource, RawCollections};

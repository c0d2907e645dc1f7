use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

use crate::error_handling::types::GeocodeError;
use crate::rendering::types::Coordinates;

/// Resolves a free-form place query to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Coordinates, GeocodeError>;
}

/// Joins the non-empty, trimmed parts of a place query with `", "`.
pub fn location_query(place: &str, country: &str) -> String {
    [place.trim(), country.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Looks up `place` (optionally narrowed by `country`).
///
/// An empty `place` is rejected before the geocoder is contacted.
pub async fn lookup(
    geocoder: &dyn Geocoder,
    place: &str,
    country: &str,
) -> Result<Coordinates, GeocodeError> {
    if place.trim().is_empty() {
        return Err(GeocodeError::EmptyQuery);
    }
    geocoder.geocode(&location_query(place, country)).await
}

/// Waits a fixed delay before every call to the wrapped geocoder.
///
/// The pause is unconditional; a zero delay disables it.
pub struct Throttled<G> {
    inner: G,
    delay: Duration,
}

impl<G> Throttled<G> {
    pub fn new(inner: G, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl<G: Geocoder> Geocoder for Throttled<G> {
    async fn geocode(&self, query: &str) -> Result<Coordinates, GeocodeError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.geocode(query).await
    }
}

/// Geocoder backed by a Nominatim-compatible `/search` endpoint.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    search_url: String,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            search_url: format!("{}/search", base_url.trim_end_matches('/')),
        })
    }

    fn parse_place(places: Vec<NominatimPlace>) -> Result<Coordinates, GeocodeError> {
        let place = places.into_iter().next().ok_or(GeocodeError::NotFound)?;
        let latitude = place
            .lat
            .parse::<f64>()
            .map_err(|e| GeocodeError::Request(format!("bad latitude '{}': {}", place.lat, e)))?;
        let longitude = place
            .lon
            .parse::<f64>()
            .map_err(|e| GeocodeError::Request(format!("bad longitude '{}': {}", place.lon, e)))?;
        Ok(Coordinates {
            latitude,
            longitude,
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Result<Coordinates, GeocodeError> {
        debug!("Geocoding '{}'", query);
        let places: Vec<NominatimPlace> = self
            .client
            .get(&self.search_url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Self::parse_place(places)
    }
}

use deskmate_core::Coordinates;
use futures::future::BoxFuture;
use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{AdapterError, Geocoder, GEOCODE_TIMEOUT};

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Forward geocoding through a Nominatim-compatible `/search` endpoint.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
    user_agent: String,
}

impl NominatimGeocoder {
    pub fn new(client: Client, base_url: &str, user_agent: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    async fn search(&self, place: &str) -> Result<Option<Coordinates>, AdapterError> {
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", place), ("format", "json"), ("limit", "1")])
            .header(USER_AGENT, self.user_agent.as_str())
            .timeout(GEOCODE_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AdapterError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_places(&body)
    }
}

impl Geocoder for NominatimGeocoder {
    fn geocode<'a>(
        &'a self,
        place: &'a str,
    ) -> BoxFuture<'a, Result<Option<Coordinates>, AdapterError>> {
        Box::pin(self.search(place))
    }
}

fn parse_places(body: &str) -> Result<Option<Coordinates>, AdapterError> {
    let places = serde_json::from_str::<Vec<NominatimPlace>>(body)
        .map_err(|err| AdapterError::Decode(err.to_string()))?;

    let Some(place) = places.into_iter().next() else {
        return Ok(None);
    };

    let latitude = place
        .lat
        .trim()
        .parse::<f64>()
        .map_err(|err| AdapterError::Decode(format!("latitude `{}`: {err}", place.lat)))?;
    let longitude = place
        .lon
        .trim()
        .parse::<f64>()
        .map_err(|err| AdapterError::Decode(format!("longitude `{}`: {err}", place.lon)))?;

    Ok(Some(Coordinates {
        latitude,
        longitude,
    }))
}

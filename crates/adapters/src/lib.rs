mod geocode;
mod rates;
mod timezone;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use deskmate_core::Coordinates;
use futures::future::BoxFuture;
use reqwest::Client;

pub use geocode::NominatimGeocoder;
pub use rates::ExchangeRateApi;
pub use timezone::{format_local_time, TzfTimezoneLookup};

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_GEOCODER_USER_AGENT: &str = "chatbot";
pub const DEFAULT_RATES_URL: &str = "https://v6.exchangerate-api.com/v6";
pub const GEOCODE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned status {0}")]
    Status(u16),
    #[error("could not decode upstream payload: {0}")]
    Decode(String),
    #[error("unknown timezone identifier `{0}`")]
    UnknownTimezone(String),
    #[error("no API key configured for {0}")]
    MissingApiKey(&'static str),
}

pub trait Geocoder: Send + Sync {
    fn geocode<'a>(
        &'a self,
        place: &'a str,
    ) -> BoxFuture<'a, Result<Option<Coordinates>, AdapterError>>;
}

pub trait TimezoneLookup: Send + Sync {
    fn timezone_at(&self, coordinates: Coordinates) -> Result<Option<String>, AdapterError>;
}

pub trait RateSource: Send + Sync {
    fn rate<'a>(
        &'a self,
        from: &'a str,
        to: &'a str,
    ) -> BoxFuture<'a, Result<Option<f64>, AdapterError>>;
}

/// The external services the assistant talks to, behind substitutable handles.
#[derive(Clone)]
pub struct Adapters {
    pub geocoder: Arc<dyn Geocoder>,
    pub timezones: Arc<dyn TimezoneLookup>,
    pub rates: Arc<dyn RateSource>,
}

#[derive(Debug, Clone)]
pub struct AdapterConfig {
    pub geocoder_url: String,
    pub geocoder_user_agent: String,
    pub rates_url: String,
    pub rates_api_key: Option<String>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            geocoder_user_agent: DEFAULT_GEOCODER_USER_AGENT.to_string(),
            rates_url: DEFAULT_RATES_URL.to_string(),
            rates_api_key: None,
        }
    }
}

impl AdapterConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            geocoder_url: env_or("DESKMATE_GEOCODER_URL", defaults.geocoder_url),
            geocoder_user_agent: env_or(
                "DESKMATE_GEOCODER_USER_AGENT",
                defaults.geocoder_user_agent,
            ),
            rates_url: env_or("DESKMATE_RATES_URL", defaults.rates_url),
            rates_api_key: env::var("DESKMATE_RATES_API_KEY")
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
        }
    }
}

impl Adapters {
    pub fn live(config: &AdapterConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(GEOCODE_TIMEOUT)
            .timeout(Duration::from_secs(20))
            .build()
            .context("failed to build HTTP client")?;

        if config.rates_api_key.is_none() {
            tracing::warn!("DESKMATE_RATES_API_KEY is not set; currency conversion will be unavailable");
        }

        Ok(Self {
            geocoder: Arc::new(NominatimGeocoder::new(
                client.clone(),
                &config.geocoder_url,
                &config.geocoder_user_agent,
            )),
            timezones: Arc::new(TzfTimezoneLookup::new()),
            rates: Arc::new(ExchangeRateApi::new(
                client,
                &config.rates_url,
                config.rates_api_key.clone(),
            )),
        })
    }
}

fn env_or(key: &str, default: String) -> String {
    env::var(key)
        .ok()
        .map(|value| value.trim().trim_end_matches('/').to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or(default)
}

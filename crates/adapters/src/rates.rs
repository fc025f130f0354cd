use futures::future::BoxFuture;
use reqwest::Client;
use serde_json::Value;

use crate::{AdapterError, RateSource};

/// Live exchange rates from an exchangerate-api style `/{key}/latest/{base}` endpoint.
#[derive(Debug, Clone)]
pub struct ExchangeRateApi {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ExchangeRateApi {
    pub fn new(client: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn fetch(&self, from: &str, to: &str) -> Result<Option<f64>, AdapterError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AdapterError::MissingApiKey("exchange rates"))?;

        let response = self
            .client
            .get(format!("{}/{}/latest/{}", self.base_url, api_key, from))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), from, "exchange rate lookup rejected");
            return Ok(None);
        }

        let payload = response.json::<Value>().await?;
        Ok(conversion_rate(&payload, to))
    }
}

impl RateSource for ExchangeRateApi {
    fn rate<'a>(
        &'a self,
        from: &'a str,
        to: &'a str,
    ) -> BoxFuture<'a, Result<Option<f64>, AdapterError>> {
        Box::pin(self.fetch(from, to))
    }
}

fn conversion_rate(payload: &Value, to: &str) -> Option<f64> {
    payload
        .get("conversion_rates")?
        .as_object()?
        .get(to)?
        .as_f64()
}

use std::{fmt, time::Duration};

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

/// Keys tried, in order, on the payload object.
pub const PRICE_KEYS: [&str; 6] = ["price", "spot", "value", "last", "c", "p"];
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub enum FetchError {
    Transport(reqwest::Error),
    Status(StatusCode),
    Decode(reqwest::Error),
    MissingPrice,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "price request failed: {err}"),
            Self::Status(status) => write!(f, "price endpoint returned {status}"),
            Self::Decode(err) => write!(f, "price payload is not JSON: {err}"),
            Self::MissingPrice => write!(f, "price payload has none of {PRICE_KEYS:?}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(err) | Self::Decode(err) => Some(err),
            Self::Status(_) | Self::MissingPrice => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceOrigin {
    Endpoint,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPrice {
    pub value: f64,
    pub origin: PriceOrigin,
}

impl ResolvedPrice {
    pub fn fallback(value: f64) -> Self {
        Self {
            value,
            origin: PriceOrigin::Fallback,
        }
    }
}

/// Reads a price from an object payload, or from the first element of an
/// array payload. The first key present decides; numeric strings count.
pub fn extract_price(payload: &Value) -> Option<f64> {
    let record = match payload {
        Value::Array(items) => items.first()?,
        other => other,
    };
    let fields = record.as_object()?;
    let raw = PRICE_KEYS.iter().find_map(|key| fields.get(*key))?;

    let price = match raw {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    price.is_finite().then_some(price)
}

/// HTTP client for the live price endpoints. Every request is bounded by the
/// client timeout.
#[derive(Debug, Clone)]
pub struct PriceFetcher {
    client: Client,
}

impl PriceFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> Result<f64, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let payload: Value = response.json().await.map_err(FetchError::Decode)?;
        extract_price(&payload).ok_or(FetchError::MissingPrice)
    }

    /// Fetches `url`, or returns `fallback` when the URL is unset or the
    /// request fails for any reason. Never errors.
    pub async fn fetch_or(&self, url: Option<&str>, fallback: f64) -> ResolvedPrice {
        let Some(url) = url else {
            return ResolvedPrice::fallback(fallback);
        };

        match self.fetch(url).await {
            Ok(value) => ResolvedPrice {
                value,
                origin: PriceOrigin::Endpoint,
            },
            Err(err) => {
                debug!(%url, error = %err, fallback, "live price unavailable, using fallback");
                ResolvedPrice::fallback(fallback)
            }
        }
    }
}

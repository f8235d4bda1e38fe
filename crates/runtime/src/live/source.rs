use std::sync::Arc;

use grid_core::{Dataset, RowError};

use crate::events::LiveTag;
use crate::live::fetch::{PriceFetcher, ResolvedPrice};
use crate::source::{InputSource, TickInput};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceEndpoints {
    pub power_url: Option<String>,
    pub contract_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LivePrices {
    pub power: ResolvedPrice,
    pub contract: ResolvedPrice,
}

/// Power falls back to the recorded spot; the contract falls back to the
/// resolved power price, not the recorded one.
pub async fn resolve_prices(
    fetcher: &PriceFetcher,
    endpoints: &PriceEndpoints,
    recorded_spot: f64,
) -> LivePrices {
    let power = fetcher
        .fetch_or(endpoints.power_url.as_deref(), recorded_spot)
        .await;
    let contract = fetcher
        .fetch_or(endpoints.contract_url.as_deref(), power.value)
        .await;

    LivePrices { power, contract }
}

/// Endless source that cycles the recorded rows and swaps in fetched prices.
///
/// Owns its HTTP client; dropping the source releases it.
#[derive(Debug)]
pub struct LiveSource {
    dataset: Arc<Dataset>,
    fetcher: PriceFetcher,
    endpoints: PriceEndpoints,
    tick: u64,
}

impl LiveSource {
    pub fn new(dataset: Arc<Dataset>, fetcher: PriceFetcher, endpoints: PriceEndpoints) -> Self {
        Self {
            dataset,
            fetcher,
            endpoints,
            tick: 0,
        }
    }

    pub fn ticks_emitted(&self) -> u64 {
        self.tick
    }

    fn next_row_index(&mut self) -> usize {
        let total = self.dataset.min_length().max(1) as u64;
        let row = self.tick % total;
        self.tick = self.tick.wrapping_add(1);
        row as usize
    }
}

impl InputSource for LiveSource {
    async fn next_input(&mut self) -> Option<Result<TickInput, RowError>> {
        if self.dataset.min_length() == 0 {
            return None;
        }

        let row_index = self.next_row_index();
        let mut row = match self.dataset.input_row(row_index) {
            Ok(row) => row,
            Err(err) => return Some(Err(err)),
        };

        let recorded_spot = row.spot_price;
        let prices = resolve_prices(&self.fetcher, &self.endpoints, recorded_spot).await;
        row.spot_price = prices.power.value;

        Some(Ok(TickInput {
            row,
            forward_price: Some(prices.contract.value),
            live: Some(LiveTag::live(recorded_spot)),
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{routing::get, Json, Router};
    use grid_core::{Dataset, RecordSeries};
    use serde_json::json;

    use super::{resolve_prices, LiveSource, PriceEndpoints};
    use crate::events::FeedMode;
    use crate::live::fetch::{PriceFetcher, PriceOrigin, DEFAULT_FETCH_TIMEOUT};
    use crate::source::InputSource;

    fn dataset() -> Arc<Dataset> {
        let series = |csv: &str| RecordSeries::from_reader(csv.as_bytes()).unwrap();
        Arc::new(Dataset::from_series(
            series("timestamp,temp_c\nt0,18\nt1,18\n"),
            series("timestamp,spot_price,grid_load_mw\nt0,50,700\nt1,52,700\n"),
            series("timestamp,congestion_index\nt0,50\nt1,50\n"),
        ))
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn fetcher() -> PriceFetcher {
        PriceFetcher::new(DEFAULT_FETCH_TIMEOUT).unwrap()
    }

    #[tokio::test]
    async fn unconfigured_endpoints_fall_back_to_recorded_spot() {
        let prices = resolve_prices(&fetcher(), &PriceEndpoints::default(), 50.0).await;

        assert_eq!(prices.power.value, 50.0);
        assert_eq!(prices.power.origin, PriceOrigin::Fallback);
        assert_eq!(prices.contract.value, prices.power.value);
    }

    #[tokio::test]
    async fn contract_falls_back_to_fetched_power_price() {
        let base = serve(Router::new().route("/power", get(|| async { Json(json!({"price": 61.5})) }))).await;
        let endpoints = PriceEndpoints {
            power_url: Some(format!("{base}/power")),
            contract_url: None,
        };

        let prices = resolve_prices(&fetcher(), &endpoints, 50.0).await;

        assert_eq!(prices.power.value, 61.5);
        assert_eq!(prices.contract.value, 61.5);
        assert_eq!(prices.contract.origin, PriceOrigin::Fallback);
    }

    #[tokio::test]
    async fn both_endpoints_are_read_independently() {
        let base = serve(
            Router::new()
                .route("/power", get(|| async { Json(json!([{"last": "61.5"}])) }))
                .route("/forward", get(|| async { Json(json!({"value": 63.25})) })),
        )
        .await;
        let endpoints = PriceEndpoints {
            power_url: Some(format!("{base}/power")),
            contract_url: Some(format!("{base}/forward")),
        };

        let prices = resolve_prices(&fetcher(), &endpoints, 50.0).await;

        assert_eq!(prices.power.value, 61.5);
        assert_eq!(prices.contract.value, 63.25);
        assert_eq!(prices.contract.origin, PriceOrigin::Endpoint);
    }

    #[tokio::test]
    async fn live_source_cycles_rows_past_the_end() {
        let mut source = LiveSource::new(dataset(), fetcher(), PriceEndpoints::default());

        let mut timestamps = Vec::new();
        for _ in 0..5 {
            let input = source.next_input().await.unwrap().unwrap();
            timestamps.push(input.row.timestamp);
        }

        assert_eq!(timestamps, ["t0", "t1", "t0", "t1", "t0"]);
        assert_eq!(source.ticks_emitted(), 5);
    }

    #[tokio::test]
    async fn live_input_is_tagged_with_recorded_spot() {
        let mut source = LiveSource::new(dataset(), fetcher(), PriceEndpoints::default());

        let input = source.next_input().await.unwrap().unwrap();
        let tag = input.live.unwrap();

        assert_eq!(tag.mode, FeedMode::Live);
        assert_eq!(tag.baseline_spot, 50.0);
        assert_eq!(input.row.spot_price, 50.0);
        assert_eq!(input.forward_price, Some(50.0));
    }

    #[tokio::test]
    async fn live_source_over_empty_dataset_ends() {
        let mut source = LiveSource::new(
            Arc::new(Dataset::default()),
            fetcher(),
            PriceEndpoints::default(),
        );

        assert!(source.next_input().await.is_none());
    }
}

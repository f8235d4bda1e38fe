use std::{collections::BTreeMap, sync::Arc, time::Duration};

use grid_core::{Dataset, RecordSeries, Series};
use runtime::live::{LiveSource, PriceEndpoints, PriceFetcher, DEFAULT_FETCH_TIMEOUT};
use runtime::ReplaySource;

const PREVIEW_ROWS: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamSettings {
    pub tick_interval: Duration,
    pub fetch_timeout: Duration,
    pub endpoints: PriceEndpoints,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(600),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            endpoints: PriceEndpoints::default(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct MetadataResponse {
    pub rows: usize,
    pub weather_fields: Vec<String>,
    pub grid_fields: Vec<String>,
    pub traffic_fields: Vec<String>,
}

pub type PreviewRecord = BTreeMap<String, String>;

#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct PreviewResponse {
    pub weather: Vec<PreviewRecord>,
    pub grid: Vec<PreviewRecord>,
    pub traffic: Vec<PreviewRecord>,
}

/// Shared by every request. The dataset is immutable once loaded, so sessions
/// only ever share it read-only.
#[derive(Clone, Debug)]
pub struct AppState {
    dataset: Arc<Dataset>,
    settings: Arc<StreamSettings>,
}

impl AppState {
    pub fn new(dataset: Dataset, settings: StreamSettings) -> Self {
        Self {
            dataset: Arc::new(dataset),
            settings: Arc::new(settings),
        }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn tick_interval(&self) -> Duration {
        self.settings.tick_interval
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse { status: "ok" }
    }

    pub fn metadata(&self) -> MetadataResponse {
        MetadataResponse {
            rows: self.dataset.min_length(),
            weather_fields: self.dataset.weather().headers().to_vec(),
            grid_fields: self.dataset.grid().headers().to_vec(),
            traffic_fields: self.dataset.traffic().headers().to_vec(),
        }
    }

    pub fn preview(&self) -> PreviewResponse {
        let rows = self.dataset.min_length().min(PREVIEW_ROWS);
        let records = |series: Series| preview_records(self.dataset.series(series), rows);

        PreviewResponse {
            weather: records(Series::Weather),
            grid: records(Series::Grid),
            traffic: records(Series::Traffic),
        }
    }

    pub fn replay_source(&self) -> ReplaySource {
        ReplaySource::new(Arc::clone(&self.dataset))
    }

    /// Each live session owns its own HTTP client; it is dropped with the
    /// session's stream.
    pub fn live_source(&self) -> Result<LiveSource, reqwest::Error> {
        let fetcher = PriceFetcher::new(self.settings.fetch_timeout)?;
        Ok(LiveSource::new(
            Arc::clone(&self.dataset),
            fetcher,
            self.settings.endpoints.clone(),
        ))
    }

    #[cfg(test)]
    pub(crate) fn for_test(dataset: Dataset) -> Self {
        Self::new(
            dataset,
            StreamSettings {
                tick_interval: Duration::ZERO,
                ..StreamSettings::default()
            },
        )
    }
}

fn preview_records(series: &RecordSeries, rows: usize) -> Vec<PreviewRecord> {
    (0..rows)
        .filter_map(|row| series.record(row))
        .map(|record| {
            record
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect()
        })
        .collect()
}

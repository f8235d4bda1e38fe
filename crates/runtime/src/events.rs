use serde::{Deserialize, Serialize};
use strategy::Signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedMode {
    Sim,
    Live,
}

impl FeedMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sim" => Some(Self::Sim),
            "live" => Some(Self::Live),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sim => "sim",
            Self::Live => "live",
        }
    }
}

/// One engine tick as published to consumers. Values are rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickEvent {
    pub timestamp: String,
    pub spot_price: f64,
    pub forecast_price: f64,
    pub signal: Signal,
    pub inventory_mwh: f64,
    pub cash: f64,
    pub pnl: f64,
    pub grid_load_mw: f64,
    pub traffic_index: f64,
    pub temp_c: f64,
    pub target_inventory_mwh: f64,
    pub target_physical_mwh: f64,
    pub target_contract_mwh: f64,
    pub physical_share: f64,
    pub forward_price: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiveTag {
    pub mode: FeedMode,
    pub baseline_spot: f64,
}

impl LiveTag {
    pub fn live(baseline_spot: f64) -> Self {
        Self {
            mode: FeedMode::Live,
            baseline_spot: round_to(baseline_spot, 2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    #[serde(flatten)]
    pub tick: TickEvent,
    #[serde(flatten)]
    pub live: Option<LiveTag>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestEvent {
    #[serde(flatten)]
    pub tick: TickEvent,
    pub baseline_cash_only_pnl: f64,
    pub baseline_buyhold_pnl: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub strategy_pnl: f64,
    pub baseline_cash_only_pnl: f64,
    pub baseline_buyhold_pnl: f64,
    pub delta_vs_cash: f64,
    pub delta_vs_buyhold: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub events: Vec<BacktestEvent>,
    pub summary: BacktestSummary,
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

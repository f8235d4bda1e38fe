use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Hold => "hold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionParams {
    /// Inventory gap below which no trade is issued.
    pub guardband_mwh: f64,
    pub max_trade_mwh: f64,
    pub buy_threshold: f64,
    pub sell_threshold: f64,
}

impl Default for DecisionParams {
    fn default() -> Self {
        Self {
            guardband_mwh: 0.25,
            max_trade_mwh: 1.0,
            buy_threshold: 1.002,
            sell_threshold: 0.998,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub signal: Signal,
    pub size_mwh: f64,
}

impl Decision {
    pub fn hold() -> Self {
        Self {
            signal: Signal::Hold,
            size_mwh: 0.0,
        }
    }
}

/// Picks the trade for one tick.
///
/// Buys are capped only by the trade size; sells are also capped by the
/// inventory on hand so the position can never go short.
pub fn decide(
    forecast: f64,
    moving_avg: f64,
    target_physical: f64,
    inventory_mwh: f64,
    params: &DecisionParams,
) -> Decision {
    let gap = target_physical - inventory_mwh;

    if gap.abs() < params.guardband_mwh {
        return Decision::hold();
    }

    if gap > 0.0 && forecast > moving_avg * params.buy_threshold {
        return Decision {
            signal: Signal::Buy,
            size_mwh: params.max_trade_mwh.min(gap),
        };
    }

    if gap < 0.0 && forecast < moving_avg * params.sell_threshold && inventory_mwh > 0.0 {
        return Decision {
            signal: Signal::Sell,
            size_mwh: params.max_trade_mwh.min(-gap).min(inventory_mwh),
        };
    }

    Decision::hold()
}

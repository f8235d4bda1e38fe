use grid_core::{InputRow, SessionConfig, SessionState};
use strategy::{
    decide, forecast_price, hedge_split, integrate, DecisionParams, ForecastParams, HedgeParams,
    IntegratorParams, MarketDrivers, Signal,
};

use crate::events::{round_to, StreamEvent, TickEvent};
use crate::source::TickInput;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineParams {
    pub session: SessionConfig,
    pub forecast: ForecastParams,
    pub integrator: IntegratorParams,
    pub hedge: HedgeParams,
    pub decision: DecisionParams,
}

/// Advances one session by one tick.
///
/// Stage order is fixed: integrator (reading the price window before this
/// tick's spot is appended), hedge split, forecast, then the trade decision.
pub fn step(
    state: &SessionState,
    params: &EngineParams,
    row: &InputRow,
    forward_price: Option<f64>,
) -> (SessionState, TickEvent) {
    let drivers = MarketDrivers {
        spot_price: row.spot_price,
        grid_load_mw: row.grid_load_mw,
        traffic_index: row.congestion_index,
        temp_c: row.temp_c,
    };
    let mut next = state.clone();

    let target = integrate(
        state.state_q,
        &drivers,
        state.price_window.last(),
        &params.integrator,
    );
    next.state_q = target.state_q;

    let split = hedge_split(target.target_inventory, &drivers, &params.hedge);
    let forecast = forecast_price(
        &drivers,
        forward_price,
        target.target_inventory,
        state.inventory_mwh,
        &params.forecast,
    );

    next.price_window.push(row.spot_price);
    let moving_avg = next.price_window.mean().unwrap_or(row.spot_price);
    let decision = decide(
        forecast,
        moving_avg,
        split.target_physical,
        state.inventory_mwh,
        &params.decision,
    );
    match decision.signal {
        Signal::Buy => {
            next.inventory_mwh += decision.size_mwh;
            next.cash -= row.spot_price * decision.size_mwh;
        }
        Signal::Sell => {
            next.inventory_mwh = (next.inventory_mwh - decision.size_mwh).max(0.0);
            next.cash += row.spot_price * decision.size_mwh;
        }
        Signal::Hold => {}
    }

    let event = TickEvent {
        timestamp: row.timestamp.clone(),
        spot_price: round_to(row.spot_price, 2),
        forecast_price: round_to(forecast, 2),
        signal: decision.signal,
        inventory_mwh: round_to(next.inventory_mwh, 3),
        cash: round_to(next.cash, 2),
        pnl: round_to(next.pnl(row.spot_price), 2),
        grid_load_mw: round_to(row.grid_load_mw, 2),
        traffic_index: round_to(row.congestion_index, 2),
        temp_c: round_to(row.temp_c, 2),
        target_inventory_mwh: round_to(target.target_inventory, 3),
        target_physical_mwh: round_to(split.target_physical, 3),
        target_contract_mwh: round_to(split.target_contracts, 3),
        physical_share: round_to(split.physical_share, 3),
        forward_price: forward_price.map(|price| round_to(price, 3)),
    };

    (next, event)
}

/// Owns the state of a single trading session. Not meant to be shared.
#[derive(Debug, Clone)]
pub struct SessionEngine {
    state: SessionState,
    params: EngineParams,
}

impl SessionEngine {
    pub fn new() -> Self {
        Self::with_params(EngineParams::default())
    }

    pub fn with_params(params: EngineParams) -> Self {
        Self {
            state: SessionState::new(params.session),
            params,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn step(&mut self, row: &InputRow, forward_price: Option<f64>) -> TickEvent {
        let (next, event) = step(&self.state, &self.params, row, forward_price);
        self.state = next;
        event
    }

    pub fn apply(&mut self, input: TickInput) -> StreamEvent {
        let tick = self.step(&input.row, input.forward_price);
        StreamEvent {
            tick,
            live: input.live,
        }
    }
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new()
    }
}

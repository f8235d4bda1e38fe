use crate::drivers::MarketDrivers;

/// Minutes of simulated time one unit of `dq/dt` is expressed in.
const BASE_STEP_MINUTES: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegratorParams {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub delta: f64,
    pub weather_gain: f64,
    pub dt_minutes: f64,
    pub capacity_mwh: f64,
}

impl Default for IntegratorParams {
    fn default() -> Self {
        Self {
            alpha: 0.35,
            beta: 0.50,
            gamma: 0.12,
            delta: 0.15,
            weather_gain: 0.3,
            dt_minutes: 5.0,
            capacity_mwh: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegratorStep {
    pub state_q: f64,
    pub target_inventory: f64,
}

/// Time derivative of the desired-inventory fraction.
///
/// `last_window_price` is the newest price seen before this tick; `None`
/// means no history yet, which yields a flat slope.
pub fn dq_dt(
    state_q: f64,
    drivers: &MarketDrivers,
    last_window_price: Option<f64>,
    params: &IntegratorParams,
) -> f64 {
    let last_price = last_window_price.unwrap_or(drivers.spot_price);
    let price_slope = (drivers.spot_price - last_price) / drivers.floored_spot();
    let demand_forcing = drivers.demand_pressure();
    let weather_forcing = params.weather_gain * drivers.cold_deviation();
    // Kept apart from the damping term: both pull toward zero at different rates.
    let risk_term = -state_q;

    params.alpha * (demand_forcing + weather_forcing)
        + params.beta * price_slope
        + params.delta * risk_term
        - params.gamma * state_q
}

/// One explicit Euler step, hard-clipped to `[0, 1]`.
pub fn integrate(
    state_q: f64,
    drivers: &MarketDrivers,
    last_window_price: Option<f64>,
    params: &IntegratorParams,
) -> IntegratorStep {
    let derivative = dq_dt(state_q, drivers, last_window_price, params);
    let stepped = state_q + (params.dt_minutes / BASE_STEP_MINUTES) * derivative;
    // NaN inputs collapse to the empty position rather than escaping the bounds.
    let state_q = if stepped.is_nan() {
        0.0
    } else {
        stepped.clamp(0.0, 1.0)
    };

    IntegratorStep {
        state_q,
        target_inventory: params.capacity_mwh * state_q,
    }
}

use crate::drivers::MarketDrivers;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastParams {
    pub traffic_weight: f64,
    pub load_weight: f64,
    pub weather_weight: f64,
    pub term_weight: f64,
    pub control_gain: f64,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            traffic_weight: 0.003,
            load_weight: 0.002,
            weather_weight: 0.002,
            term_weight: 0.002,
            control_gain: 0.0008,
        }
    }
}

/// Expected price for the tick. `target_inventory` must come from the
/// integrator step of the same tick.
pub fn forecast_price(
    drivers: &MarketDrivers,
    forward_price: Option<f64>,
    target_inventory: f64,
    inventory_mwh: f64,
    params: &ForecastParams,
) -> f64 {
    let demand_lift = params.traffic_weight * drivers.traffic_deviation()
        + params.load_weight * drivers.load_deviation();
    let weather_lift = params.weather_weight * drivers.cold_deviation();
    let term_lift = forward_price.map_or(0.0, |forward| {
        params.term_weight * (forward - drivers.spot_price) / drivers.floored_spot()
    });
    let control_lift = params.control_gain * (target_inventory - inventory_mwh);

    drivers.spot_price * (1.0 + demand_lift + weather_lift + term_lift) + control_lift
}

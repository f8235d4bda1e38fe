pub const REFERENCE_GRID_LOAD_MW: f64 = 700.0;
pub const GRID_LOAD_SCALE_MW: f64 = 300.0;
pub const REFERENCE_TRAFFIC_INDEX: f64 = 50.0;
pub const TRAFFIC_INDEX_SCALE: f64 = 50.0;
pub const COMFORT_TEMP_C: f64 = 18.0;
pub const TEMP_SCALE_C: f64 = 10.0;
pub const PRICE_FLOOR: f64 = 1e-3;

/// Exogenous inputs of one tick, shared by every model stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketDrivers {
    pub spot_price: f64,
    pub grid_load_mw: f64,
    pub traffic_index: f64,
    pub temp_c: f64,
}

impl MarketDrivers {
    pub fn load_deviation(&self) -> f64 {
        (self.grid_load_mw - REFERENCE_GRID_LOAD_MW) / GRID_LOAD_SCALE_MW
    }

    pub fn traffic_deviation(&self) -> f64 {
        (self.traffic_index - REFERENCE_TRAFFIC_INDEX) / TRAFFIC_INDEX_SCALE
    }

    /// Heating pressure; zero at or above the comfort temperature.
    pub fn cold_deviation(&self) -> f64 {
        (COMFORT_TEMP_C - self.temp_c).max(0.0) / TEMP_SCALE_C
    }

    pub fn demand_pressure(&self) -> f64 {
        0.5 * self.load_deviation() + 0.5 * self.traffic_deviation()
    }

    pub fn floored_spot(&self) -> f64 {
        self.spot_price.max(PRICE_FLOOR)
    }
}

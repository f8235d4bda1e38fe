use crate::drivers::MarketDrivers;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HedgeParams {
    pub base_contract_hedge: f64,
    pub physical_bias: f64,
}

impl Default for HedgeParams {
    fn default() -> Self {
        Self {
            base_contract_hedge: 0.5,
            physical_bias: 0.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HedgeSplit {
    pub physical_share: f64,
    pub target_physical: f64,
    pub target_contracts: f64,
}

/// Splits the target position into physical MWh and contracts. Demand and
/// cold weather tilt toward physical; slack never tilts toward contracts.
pub fn hedge_split(target_inventory: f64, drivers: &MarketDrivers, params: &HedgeParams) -> HedgeSplit {
    let base_physical = 1.0 - params.base_contract_hedge;
    let weather_pressure = drivers.cold_deviation();
    let tilt = params.physical_bias
        * (0.5 * drivers.demand_pressure() + 0.5 * weather_pressure).max(0.0);
    let physical_share = (base_physical + tilt).clamp(0.0, 1.0);
    let target_physical = physical_share * target_inventory;

    HedgeSplit {
        physical_share,
        target_physical,
        target_contracts: (target_inventory - target_physical).max(0.0),
    }
}

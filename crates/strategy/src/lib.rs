pub mod decision;
pub mod drivers;
pub mod forecast;
pub mod hedge;
pub mod integrator;

pub use decision::{decide, Decision, DecisionParams, Signal};
pub use drivers::MarketDrivers;
pub use forecast::{forecast_price, ForecastParams};
pub use hedge::{hedge_split, HedgeParams, HedgeSplit};
pub use integrator::{dq_dt, integrate, IntegratorParams, IntegratorStep};

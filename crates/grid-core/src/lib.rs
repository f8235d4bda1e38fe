mod config;
mod dataset;
mod state;

pub use config::SessionConfig;
pub use dataset::{
    Dataset, DatasetError, InputRow, RecordSeries, RowError, Series, GRID_FILE, TRAFFIC_FILE,
    WEATHER_FILE,
};
pub use state::{PriceWindow, SessionState};

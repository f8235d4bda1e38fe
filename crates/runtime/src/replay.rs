use std::io::Write;

use serde::Serialize;

use crate::events::{BacktestEvent, BacktestResult};

pub const BACKTEST_CSV_COLUMNS: [&str; 13] = [
    "timestamp",
    "spot_price",
    "forecast_price",
    "signal",
    "inventory_mwh",
    "cash",
    "pnl",
    "target_inventory_mwh",
    "target_physical_mwh",
    "target_contract_mwh",
    "physical_share",
    "baseline_cash_only_pnl",
    "baseline_buyhold_pnl",
];

#[derive(Debug, Serialize)]
struct BacktestCsvRow<'a> {
    timestamp: &'a str,
    spot_price: f64,
    forecast_price: f64,
    signal: &'static str,
    inventory_mwh: f64,
    cash: f64,
    pnl: f64,
    target_inventory_mwh: f64,
    target_physical_mwh: f64,
    target_contract_mwh: f64,
    physical_share: f64,
    baseline_cash_only_pnl: f64,
    baseline_buyhold_pnl: f64,
}

impl<'a> From<&'a BacktestEvent> for BacktestCsvRow<'a> {
    fn from(event: &'a BacktestEvent) -> Self {
        let tick = &event.tick;
        Self {
            timestamp: &tick.timestamp,
            spot_price: tick.spot_price,
            forecast_price: tick.forecast_price,
            signal: tick.signal.as_str(),
            inventory_mwh: tick.inventory_mwh,
            cash: tick.cash,
            pnl: tick.pnl,
            target_inventory_mwh: tick.target_inventory_mwh,
            target_physical_mwh: tick.target_physical_mwh,
            target_contract_mwh: tick.target_contract_mwh,
            physical_share: tick.physical_share,
            baseline_cash_only_pnl: event.baseline_cash_only_pnl,
            baseline_buyhold_pnl: event.baseline_buyhold_pnl,
        }
    }
}

/// Writes backtest events as a CSV artifact, one row per tick.
pub struct BacktestCsvWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BacktestCsvWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(writer),
        }
    }

    pub fn write_header(&mut self) -> csv::Result<()> {
        self.writer.write_record(BACKTEST_CSV_COLUMNS)
    }

    pub fn append_events(&mut self, events: &[BacktestEvent]) -> csv::Result<()> {
        for event in events {
            self.writer.serialize(BacktestCsvRow::from(event))?;
        }
        Ok(())
    }

    /// Header plus every event, flushed before returning.
    pub fn write_result(&mut self, result: &BacktestResult) -> csv::Result<()> {
        self.write_header()?;
        self.append_events(&result.events)?;
        self.writer.flush()?;
        Ok(())
    }
}

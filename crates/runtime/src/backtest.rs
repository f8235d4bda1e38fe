use grid_core::{Dataset, RowError};
use strategy::drivers::PRICE_FLOOR;
use tracing::info;

use crate::engine::{EngineParams, SessionEngine};
use crate::events::{round_to, BacktestEvent, BacktestResult, BacktestSummary};

/// Replays the whole dataset through a fresh engine and scores it against
/// holding cash and against buying everything at the first tick.
pub fn run_backtest(dataset: &Dataset) -> Result<BacktestResult, RowError> {
    run_backtest_with(dataset, EngineParams::default())
}

pub fn run_backtest_with(dataset: &Dataset, params: EngineParams) -> Result<BacktestResult, RowError> {
    let mut engine = SessionEngine::with_params(params);
    let initial_cash = params.session.initial_cash;
    let mut events = Vec::with_capacity(dataset.min_length());
    let mut buyhold_units = None;

    for row in 0..dataset.min_length() {
        let input = dataset.input_row(row)?;
        let units = *buyhold_units
            .get_or_insert_with(|| initial_cash / input.spot_price.max(PRICE_FLOOR));
        let tick = engine.step(&input, None);
        let buyhold_pnl = units * input.spot_price - initial_cash;

        events.push(BacktestEvent {
            tick,
            baseline_cash_only_pnl: 0.0,
            baseline_buyhold_pnl: round_to(buyhold_pnl, 2),
        });
    }

    let summary = summarize(&events);
    info!(
        ticks = events.len(),
        strategy_pnl = summary.strategy_pnl,
        delta_vs_buyhold = summary.delta_vs_buyhold,
        "backtest complete"
    );

    Ok(BacktestResult { events, summary })
}

/// Scores a finished run from its last event; an empty run scores zero.
pub fn summarize(events: &[BacktestEvent]) -> BacktestSummary {
    let Some(last) = events.last() else {
        return BacktestSummary::default();
    };

    let strategy_pnl = last.tick.pnl;
    let baseline_cash_only_pnl = last.baseline_cash_only_pnl;
    let baseline_buyhold_pnl = last.baseline_buyhold_pnl;

    BacktestSummary {
        strategy_pnl,
        baseline_cash_only_pnl,
        baseline_buyhold_pnl,
        delta_vs_cash: round_to(strategy_pnl - baseline_cash_only_pnl, 2),
        delta_vs_buyhold: round_to(strategy_pnl - baseline_buyhold_pnl, 2),
    }
}

#[cfg(test)]
mod tests {
    use grid_core::{Dataset, RecordSeries, RowError};
    use strategy::Signal;

    use super::{run_backtest, summarize};
    use crate::events::BacktestSummary;

    fn series(csv: &str) -> RecordSeries {
        RecordSeries::from_reader(csv.as_bytes()).unwrap()
    }

    fn neutral_dataset() -> Dataset {
        Dataset::from_series(
            series("timestamp,temp_c\nt0,18\nt1,18\nt2,18\n"),
            series("timestamp,spot_price,grid_load_mw\nt0,50,700\nt1,52,700\nt2,48,700\n"),
            series("timestamp,congestion_index\nt0,50\nt1,50\nt2,50\n"),
        )
    }

    #[test]
    fn neutral_backtest_scores_against_both_baselines() {
        let result = run_backtest(&neutral_dataset()).unwrap();

        let signals: Vec<Signal> = result.events.iter().map(|event| event.tick.signal).collect();
        assert_eq!(signals, [Signal::Hold, Signal::Buy, Signal::Hold]);

        let buyhold: Vec<f64> = result
            .events
            .iter()
            .map(|event| event.baseline_buyhold_pnl)
            .collect();
        assert_eq!(buyhold, [0.0, 4_000.0, -4_000.0]);
        assert!(result.events.iter().all(|event| event.baseline_cash_only_pnl == 0.0));

        assert_eq!(
            result.summary,
            BacktestSummary {
                strategy_pnl: -4.0,
                baseline_cash_only_pnl: 0.0,
                baseline_buyhold_pnl: -4_000.0,
                delta_vs_cash: -4.0,
                delta_vs_buyhold: 3_996.0,
            }
        );
    }

    #[test]
    fn summary_identities_hold() {
        let dataset = Dataset::from_series(
            series(&weather_csv(30)),
            series(&grid_csv(30)),
            series(&traffic_csv(30)),
        );
        let result = run_backtest(&dataset).unwrap();
        let last = result.events.last().unwrap();

        assert_eq!(result.summary.strategy_pnl, last.tick.pnl);
        assert_eq!(result.summary.baseline_cash_only_pnl, 0.0);
        assert!(
            (result.summary.delta_vs_buyhold
                - (result.summary.strategy_pnl - result.summary.baseline_buyhold_pnl))
                .abs()
                < 1e-9
        );
    }

    #[test]
    fn empty_dataset_returns_zero_summary() {
        let result = run_backtest(&Dataset::default()).unwrap();

        assert!(result.events.is_empty());
        assert_eq!(result.summary, BacktestSummary::default());
        assert_eq!(summarize(&[]), BacktestSummary::default());
    }

    #[test]
    fn backtest_propagates_row_errors() {
        let dataset = Dataset::from_series(
            series("timestamp,temp_c\nt0,18\nt1,18\n"),
            series("timestamp,spot_price\nt0,50\nt1,52\n"),
            series("timestamp,congestion_index\nt0,50\nt1,50\n"),
        );

        let err = run_backtest(&dataset).unwrap_err();

        assert!(matches!(err, RowError::MissingField { field: "grid_load_mw", .. }));
    }

    #[test]
    fn repeated_backtests_are_identical() {
        let dataset = Dataset::from_series(
            series(&weather_csv(40)),
            series(&grid_csv(40)),
            series(&traffic_csv(40)),
        );

        assert_eq!(run_backtest(&dataset).unwrap(), run_backtest(&dataset).unwrap());
    }

    fn weather_csv(rows: usize) -> String {
        let mut csv = String::from("timestamp,temp_c\n");
        for row in 0..rows {
            csv.push_str(&format!("t{row},{}\n", 6.0 + (row % 9) as f64));
        }
        csv
    }

    fn grid_csv(rows: usize) -> String {
        let mut csv = String::from("timestamp,spot_price,grid_load_mw\n");
        for row in 0..rows {
            let spot = 55.0 + ((row * 7) % 11) as f64 - 5.0;
            let load = 620.0 + ((row * 13) % 17) as f64 * 12.0;
            csv.push_str(&format!("t{row},{spot},{load}\n"));
        }
        csv
    }

    fn traffic_csv(rows: usize) -> String {
        let mut csv = String::from("timestamp,congestion_index\n");
        for row in 0..rows {
            csv.push_str(&format!("t{row},{}\n", 30 + (row * 5) % 45));
        }
        csv
    }
}

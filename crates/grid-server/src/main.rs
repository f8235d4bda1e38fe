mod config;
mod wiring;

use std::error::Error;
use std::fs::{self, File};
use std::path::Path;

use config::{Config, RunMode};
use grid_core::Dataset;
use runtime::replay::BacktestCsvWriter;
use runtime::{run_backtest, BacktestSummary};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let dataset = Dataset::load(&config.data_dir)?;
    info!(
        mode = config.mode.as_str(),
        data_dir = %config.data_dir.display(),
        rows = dataset.min_length(),
        "dataset loaded"
    );

    match config.mode {
        RunMode::Serve => serve(&config, dataset).await,
        RunMode::Backtest => {
            let summary = write_backtest(&dataset, &config.backtest_output_path)?;
            info!(path = %config.backtest_output_path, "backtest artifact written");
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
    }
}

async fn serve(config: &Config, dataset: Dataset) -> Result<(), Box<dyn Error>> {
    let app = wiring::build_app(dataset, config.stream_settings());
    let listener = TcpListener::bind(config.listen_addr).await?;
    info!(addr = %config.listen_addr, "grid server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

fn write_backtest(dataset: &Dataset, path: &str) -> Result<BacktestSummary, Box<dyn Error>> {
    let result = run_backtest(dataset)?;
    let output_path = Path::new(path);

    if let Some(parent) = output_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        fs::create_dir_all(parent)?;
    }

    let output_file = File::create(output_path)?;
    BacktestCsvWriter::new(output_file).write_result(&result)?;
    Ok(result.summary)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    use grid_core::{Dataset, RecordSeries};
    use runtime::replay::BACKTEST_CSV_COLUMNS;

    use super::write_backtest;

    fn series(csv: &str) -> RecordSeries {
        RecordSeries::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn write_backtest_creates_parent_dir_and_writes_every_row() {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let root = std::env::temp_dir().join(format!("grid-server-backtest-{unique}"));
        let output_path = root.join("nested").join("backtest.csv");
        let dataset = Dataset::from_series(
            series("timestamp,temp_c\nt0,18\nt1,18\nt2,18\n"),
            series("timestamp,spot_price,grid_load_mw\nt0,50,700\nt1,52,700\nt2,48,700\n"),
            series("timestamp,congestion_index\nt0,50\nt1,50\nt2,50\n"),
        );

        let summary = write_backtest(&dataset, output_path.to_str().unwrap())
            .expect("backtest should write its artifact");

        let actual = fs::read_to_string(&output_path).expect("backtest artifact should exist");
        let lines: Vec<&str> = actual.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], BACKTEST_CSV_COLUMNS.join(","));
        assert!(lines[2].starts_with("t1,52.0,"));
        assert_eq!(summary.delta_vs_buyhold, 3_996.0);

        fs::remove_dir_all(&root).expect("temp backtest directory should be removable");
    }

    #[test]
    fn write_backtest_rejects_unreadable_rows_without_creating_output() {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let output_path = std::env::temp_dir()
            .join(format!("grid-server-backtest-bad-{unique}"))
            .join("backtest.csv");
        let dataset = Dataset::from_series(
            series("timestamp,temp_c\nt0,18\n"),
            series("timestamp,spot_price,grid_load_mw\nt0,n/a,700\n"),
            series("timestamp,congestion_index\nt0,50\n"),
        );

        assert!(write_backtest(&dataset, output_path.to_str().unwrap()).is_err());
        assert!(!output_path.exists());
    }
}

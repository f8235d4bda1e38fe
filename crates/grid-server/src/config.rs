use std::{
    env, fmt,
    net::{AddrParseError, Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use api::StreamSettings;
use runtime::live::PriceEndpoints;

const DEFAULT_LISTEN_PORT: u16 = 8000;
const DEFAULT_MODE: RunMode = RunMode::Serve;
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_TICK_MS: u64 = 600;
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_BACKTEST_OUTPUT_PATH: &str = "artifacts/backtest.csv";

const ENV_ADDR: &str = "GRID_SERVER_ADDR";
const ENV_MODE: &str = "GRID_SERVER_MODE";
const ENV_DATA_DIR: &str = "GRID_DATA_DIR";
const ENV_TICK_MS: &str = "GRID_TICK_MS";
const ENV_POWER_URL: &str = "GRID_POWER_PRICE_URL";
const ENV_CONTRACT_URL: &str = "GRID_CONTRACT_PRICE_URL";
const ENV_FETCH_TIMEOUT_MS: &str = "GRID_FETCH_TIMEOUT_MS";
const ENV_BACKTEST_OUTPUT: &str = "GRID_BACKTEST_OUTPUT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Serve,
    Backtest,
}

impl RunMode {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "serve" => Some(Self::Serve),
            "backtest" => Some(Self::Backtest),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Serve => "serve",
            Self::Backtest => "backtest",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub mode: RunMode,
    pub data_dir: PathBuf,
    pub tick_interval: Duration,
    pub power_price_url: Option<String>,
    pub contract_price_url: Option<String>,
    pub fetch_timeout: Duration,
    pub backtest_output_path: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidListenAddr(AddrParseError),
    InvalidMode,
    InvalidDataDir,
    InvalidTickMs,
    InvalidFetchTimeoutMs,
    InvalidBacktestOutputPath,
    NonUnicode { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidListenAddr(err) => {
                write!(f, "{ENV_ADDR} is not a valid socket address: {err}")
            }
            Self::InvalidMode => write!(f, "{ENV_MODE} must be one of: serve, backtest"),
            Self::InvalidDataDir => {
                write!(f, "{ENV_DATA_DIR} must not be empty or whitespace")
            }
            Self::InvalidTickMs => {
                write!(f, "{ENV_TICK_MS} must be a whole number of milliseconds")
            }
            Self::InvalidFetchTimeoutMs => {
                write!(f, "{ENV_FETCH_TIMEOUT_MS} must be a positive whole number of milliseconds")
            }
            Self::InvalidBacktestOutputPath => {
                write!(f, "{ENV_BACKTEST_OUTPUT} must not be empty or whitespace")
            }
            Self::NonUnicode { key } => write!(f, "{key} contains non-unicode data"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidListenAddr(err) => Some(err),
            _ => None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let listen_addr = match env_value(ENV_ADDR)? {
            Some(value) => value.parse().map_err(ConfigError::InvalidListenAddr)?,
            None => SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_LISTEN_PORT)),
        };

        let mode = match env_value(ENV_MODE)? {
            Some(value) => RunMode::parse(value.as_str()).ok_or(ConfigError::InvalidMode)?,
            None => DEFAULT_MODE,
        };

        let data_dir = match env_value(ENV_DATA_DIR)? {
            Some(value) if value.trim().is_empty() => return Err(ConfigError::InvalidDataDir),
            Some(value) => PathBuf::from(value),
            None => PathBuf::from(DEFAULT_DATA_DIR),
        };

        let tick_interval = match env_value(ENV_TICK_MS)? {
            Some(value) => parse_millis(&value).ok_or(ConfigError::InvalidTickMs)?,
            None => Duration::from_millis(DEFAULT_TICK_MS),
        };

        let fetch_timeout = match env_value(ENV_FETCH_TIMEOUT_MS)? {
            Some(value) => parse_millis(&value)
                .filter(|timeout| !timeout.is_zero())
                .ok_or(ConfigError::InvalidFetchTimeoutMs)?,
            None => Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
        };

        let backtest_output_path = match env_value(ENV_BACKTEST_OUTPUT)? {
            Some(value) if value.trim().is_empty() => {
                return Err(ConfigError::InvalidBacktestOutputPath);
            }
            Some(value) => value,
            None => DEFAULT_BACKTEST_OUTPUT_PATH.to_owned(),
        };

        Ok(Self {
            listen_addr,
            mode,
            data_dir,
            tick_interval,
            power_price_url: optional_url(ENV_POWER_URL)?,
            contract_price_url: optional_url(ENV_CONTRACT_URL)?,
            fetch_timeout,
            backtest_output_path,
        })
    }

    pub fn stream_settings(&self) -> StreamSettings {
        StreamSettings {
            tick_interval: self.tick_interval,
            fetch_timeout: self.fetch_timeout,
            endpoints: PriceEndpoints {
                power_url: self.power_price_url.clone(),
                contract_url: self.contract_price_url.clone(),
            },
        }
    }
}

fn env_value(key: &'static str) -> Result<Option<String>, ConfigError> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::NonUnicode { key }),
    }
}

// Blank means "not configured", so live mode falls back to recorded prices.
fn optional_url(key: &'static str) -> Result<Option<String>, ConfigError> {
    Ok(env_value(key)?
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty()))
}

fn parse_millis(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_millis)
}

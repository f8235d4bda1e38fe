use std::{
    fmt, io,
    path::{Path, PathBuf},
};

pub const WEATHER_FILE: &str = "weather.csv";
pub const GRID_FILE: &str = "grid.csv";
pub const TRAFFIC_FILE: &str = "traffic.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    Weather,
    Grid,
    Traffic,
}

impl Series {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Grid => "grid",
            Self::Traffic => "traffic",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Weather => WEATHER_FILE,
            Self::Grid => GRID_FILE,
            Self::Traffic => TRAFFIC_FILE,
        }
    }
}

/// One aligned timestep, converted from the three record series.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRow {
    pub timestamp: String,
    pub spot_price: f64,
    pub grid_load_mw: f64,
    pub congestion_index: f64,
    pub temp_c: f64,
}

#[derive(Debug)]
pub enum DatasetError {
    Read {
        series: Series,
        path: PathBuf,
        source: csv::Error,
    },
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { series, path, source } => write!(
                f,
                "failed to read {} series from {}: {source}",
                series.as_str(),
                path.display()
            ),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    MissingRow {
        series: Series,
        row: usize,
    },
    MissingField {
        series: Series,
        row: usize,
        field: &'static str,
    },
    InvalidNumber {
        series: Series,
        row: usize,
        field: &'static str,
        value: String,
    },
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRow { series, row } => {
                write!(f, "{} series has no row {row}", series.as_str())
            }
            Self::MissingField { series, row, field } => {
                write!(f, "{} row {row} is missing field `{field}`", series.as_str())
            }
            Self::InvalidNumber {
                series,
                row,
                field,
                value,
            } => write!(
                f,
                "{} row {row} field `{field}` is not a number: {value:?}",
                series.as_str()
            ),
        }
    }
}

impl std::error::Error for RowError {}

/// Raw CSV records of one series. Values stay strings until a row is used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSeries {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RecordSeries {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);
        Self::collect(&mut reader)
    }

    pub fn from_path(path: &Path) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_path(path)?;
        Self::collect(&mut reader)
    }

    fn collect<R: io::Read>(reader: &mut csv::Reader<R>) -> Result<Self, csv::Error> {
        let headers = reader.headers()?.iter().map(str::to_owned).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_owned).collect());
        }
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn field(&self, row: usize, name: &str) -> Option<&str> {
        let column = self.headers.iter().position(|header| header == name)?;
        self.rows.get(row)?.get(column).map(String::as_str)
    }

    /// Header/value pairs of one record. Short rows yield only the values present.
    pub fn record(&self, row: usize) -> Option<impl Iterator<Item = (&str, &str)> + '_> {
        let values = self.rows.get(row)?;
        Some(
            self.headers
                .iter()
                .zip(values.iter())
                .map(|(header, value)| (header.as_str(), value.as_str())),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    weather: RecordSeries,
    grid: RecordSeries,
    traffic: RecordSeries,
}

impl Dataset {
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let dir = dir.as_ref();
        Ok(Self {
            weather: load_series(dir, Series::Weather)?,
            grid: load_series(dir, Series::Grid)?,
            traffic: load_series(dir, Series::Traffic)?,
        })
    }

    pub fn from_series(weather: RecordSeries, grid: RecordSeries, traffic: RecordSeries) -> Self {
        Self {
            weather,
            grid,
            traffic,
        }
    }

    pub fn weather(&self) -> &RecordSeries {
        &self.weather
    }

    pub fn grid(&self) -> &RecordSeries {
        &self.grid
    }

    pub fn traffic(&self) -> &RecordSeries {
        &self.traffic
    }

    pub fn series(&self, series: Series) -> &RecordSeries {
        match series {
            Series::Weather => &self.weather,
            Series::Grid => &self.grid,
            Series::Traffic => &self.traffic,
        }
    }

    /// Number of usable aligned ticks; rows past this bound are ignored.
    pub fn min_length(&self) -> usize {
        self.weather
            .len()
            .min(self.grid.len())
            .min(self.traffic.len())
    }

    pub fn input_row(&self, row: usize) -> Result<InputRow, RowError> {
        let timestamp = self.text_field(Series::Grid, row, "timestamp")?.to_owned();
        let spot_price = self.number_field(Series::Grid, row, "spot_price")?;
        let grid_load_mw = self.number_field(Series::Grid, row, "grid_load_mw")?;
        let congestion_index = self.number_field(Series::Traffic, row, "congestion_index")?;
        let temp_c = self.number_field(Series::Weather, row, "temp_c")?;

        Ok(InputRow {
            timestamp,
            spot_price,
            grid_load_mw,
            congestion_index,
            temp_c,
        })
    }

    fn text_field(&self, series: Series, row: usize, field: &'static str) -> Result<&str, RowError> {
        let records = self.series(series);
        if row >= records.len() {
            return Err(RowError::MissingRow { series, row });
        }
        records
            .field(row, field)
            .ok_or(RowError::MissingField { series, row, field })
    }

    fn number_field(&self, series: Series, row: usize, field: &'static str) -> Result<f64, RowError> {
        let raw = self.text_field(series, row, field)?;
        raw.trim()
            .parse::<f64>()
            .map_err(|_| RowError::InvalidNumber {
                series,
                row,
                field,
                value: raw.to_owned(),
            })
    }
}

fn load_series(dir: &Path, series: Series) -> Result<RecordSeries, DatasetError> {
    let path = dir.join(series.file_name());
    RecordSeries::from_path(&path).map_err(|source| DatasetError::Read {
        series,
        path,
        source,
    })
}

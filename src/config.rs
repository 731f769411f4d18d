use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const CONFIG_PATH_ENV: &str = "MONTHLY_DIFF_CONFIG";
pub const INPUT_PATH_ENV: &str = "MONTHLY_DIFF_INPUT";
pub const OUTPUT_PATH_ENV: &str = "MONTHLY_DIFF_OUTPUT";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub chart: ChartConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub input_path: PathBuf,
    pub date_column: String,
    pub open_column: String,
    /// Accepted close-price headers, first match wins.
    pub close_columns: Vec<String>,
    /// chrono format strings, tried in order.
    pub date_formats: Vec<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("HistoricalData_1760090934890.csv"),
            date_column: "Date".to_string(),
            open_column: "Open".to_string(),
            close_columns: vec!["Close".to_string(), "Close/Last".to_string()],
            date_formats: vec!["%m/%d/%Y".to_string(), "%Y-%m-%d".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub output_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("plots/average_open_close_difference.svg"),
            width: 1000,
            height: 600,
            title: "Average Difference Between Close and Open Prices (Monthly)".to_string(),
            x_label: "Month".to_string(),
            y_label: "Average Close - Open ($)".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load `.env`, then the TOML file (defaults if absent), then env overrides.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = Self::load_from_path(&config_path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&config_str)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        Ok(config)
    }

    /// Input/output path overrides. Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(input) = non_blank(INPUT_PATH_ENV) {
            self.data.input_path = PathBuf::from(input.trim());
        }
        if let Some(output) = non_blank(OUTPUT_PATH_ENV) {
            self.chart.output_path = PathBuf::from(output.trim());
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.data.close_columns.iter().all(|c| c.trim().is_empty()) {
            bail!("data.close_columns must name at least one column");
        }
        if self.data.date_formats.is_empty() {
            bail!("data.date_formats must contain at least one format");
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            bail!(
                "chart size must be > 0, got {}x{}",
                self.chart.width,
                self.chart.height
            );
        }
        if self.chart.output_path.as_os_str().is_empty() {
            bail!("chart.output_path must not be empty");
        }
        Ok(())
    }
}

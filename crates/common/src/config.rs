//! Configuration loading for html2xlsx.
//!
//! Every section and field is optional in the TOML file; absent values fall
//! back to the defaults below.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the TOML config file
pub const CONFIG_PATH_ENV: &str = "HTML2XLSX_CONFIG";

/// Environment variable overriding `server.bind_addr`
pub const BIND_ADDR_ENV: &str = "HTML2XLSX_ADDR";

/// Default upload ceiling (10MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub conversion: ConversionConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Size of the blocking worker pool
    pub max_workers: usize,
    /// Admission ceiling; requests beyond it get `SERVER_BUSY`
    pub max_concurrent_requests: usize,
    /// Largest accepted upload in bytes (inclusive)
    pub max_file_size: u64,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            max_workers: 15,
            max_concurrent_requests: 12,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            request_timeout_secs: 300,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Upload ceiling in megabytes, as reported by `/status`
    #[must_use]
    pub fn max_file_size_mb(&self) -> f64 {
        self.max_file_size as f64 / (1024.0 * 1024.0)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ConversionConfig {
    /// Literal substring that decides whether a region is kept
    pub marker_phrase: String,
    /// Tag name of the elements that open and close regions
    pub heading_tag: String,
    /// Class of the container each kept region is wrapped in
    pub container_class: String,
    pub sheet_name: String,
    pub selector_timeout_secs: u64,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Append Table/Text/Meta sheets after the image sheet
    pub include_summaries: bool,
    pub layout: LayoutConfig,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            marker_phrase: "Uncovered Link".to_string(),
            heading_tag: "h4".to_string(),
            container_class: "image-box".to_string(),
            sheet_name: "HTML Box Images".to_string(),
            selector_timeout_secs: 30,
            viewport_width: 1280,
            viewport_height: 800,
            include_summaries: false,
            layout: LayoutConfig::default(),
        }
    }
}

impl ConversionConfig {
    /// CSS selector matching the rebuilt containers
    #[must_use]
    pub fn container_selector(&self) -> String {
        format!(".{}", self.container_class)
    }

    #[must_use]
    pub const fn selector_timeout(&self) -> Duration {
        Duration::from_secs(self.selector_timeout_secs)
    }
}

/// Constants used to turn image pixel heights into sheet rows
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Approximate pixel height of one sheet row
    pub row_height_px: u32,
    /// Extra pixels added to each image height before converting to rows
    pub slack_px: u32,
    /// Blank rows left between consecutive images
    pub spacing_rows: u32,
    /// Empty rows written after the last image
    pub padding_rows: u32,
    /// Zero-based column every image is anchored to
    pub anchor_column: u16,
    pub column_width: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_height_px: 20,
            slack_px: 10,
            spacing_rows: 1,
            padding_rows: 5,
            anchor_column: 0,
            column_width: 20.0,
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config =
        toml::from_str(&contents).context("Failed to parse config file as TOML")?;
    Ok(config)
}

/// Load the config named by `HTML2XLSX_CONFIG` and apply `HTML2XLSX_ADDR`.
pub fn load_from_env() -> Result<Config> {
    let mut config = match std::env::var_os(CONFIG_PATH_ENV) {
        Some(path) => load_config(&PathBuf::from(path))?,
        None => Config::default(),
    };
    if let Ok(addr) = std::env::var(BIND_ADDR_ENV) {
        config.server.bind_addr = addr;
    }
    Ok(config)
}

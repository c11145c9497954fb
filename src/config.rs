//! Runtime configuration.
//!
//! Settings layer in rising precedence: compiled defaults, an optional
//! `sastrend.toml` in the working directory (or an explicit file), then
//! `SASTREND_*` environment variables.

use std::path::Path;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

/// Environment variable prefix, as in `SASTREND_COVERAGE_TARGET=85`.
pub const ENV_PREFIX: &str = "SASTREND";

/// Config file stem searched in the working directory (`sastrend.toml`).
pub const CONFIG_FILE_STEM: &str = "sastrend";

/// Default coverage threshold line, in percent.
pub const DEFAULT_COVERAGE_TARGET: f64 = 80.0;

/// Default glob matched against file names in the reports directory.
pub const DEFAULT_REPORT_GLOB: &str = "*.md";

/// Default SVG canvas size in pixels.
pub const DEFAULT_CHART_WIDTH: u32 = 860;
pub const DEFAULT_CHART_HEIGHT: u32 = 420;

/// Settings shared by every pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Coverage threshold line drawn on the coverage chart, in percent.
    pub coverage_target: f64,
    /// Glob matched against file names inside the reports directory.
    pub report_glob: String,
    /// Chart canvas width in pixels.
    pub chart_width: u32,
    /// Chart canvas height in pixels.
    pub chart_height: u32,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            coverage_target: DEFAULT_COVERAGE_TARGET,
            report_glob: DEFAULT_REPORT_GLOB.to_string(),
            chart_width: DEFAULT_CHART_WIDTH,
            chart_height: DEFAULT_CHART_HEIGHT,
        }
    }
}

impl TrendConfig {
    /// Loads settings from defaults, a config file, and the environment.
    ///
    /// With an explicit `path` the file must exist and parse; without one,
    /// a missing `sastrend.toml` silently falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<TrendConfig, ConfigError> {
        let mut builder = Config::builder()
            .set_default("coverage_target", DEFAULT_COVERAGE_TARGET)?
            .set_default("report_glob", DEFAULT_REPORT_GLOB)?
            .set_default("chart_width", DEFAULT_CHART_WIDTH as i64)?
            .set_default("chart_height", DEFAULT_CHART_HEIGHT as i64)?;

        builder = match path {
            Some(path) => builder.add_source(File::from(path).format(FileFormat::Toml)),
            None => builder.add_source(File::with_name(CONFIG_FILE_STEM).required(false)),
        };

        let settings: TrendConfig = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Set the coverage threshold, in percent.
    pub fn with_coverage_target(mut self, target: f64) -> Self {
        self.coverage_target = target;
        self
    }

    /// Set the report file glob.
    pub fn with_report_glob(mut self, pattern: impl Into<String>) -> Self {
        self.report_glob = pattern.into();
        self
    }

    /// Set the chart canvas size in pixels.
    pub fn with_chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_width = width;
        self.chart_height = height;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=100.0).contains(&self.coverage_target) {
            return Err(ConfigError::Message(format!(
                "coverage_target must be between 0 and 100, got {}",
                self.coverage_target
            )));
        }
        if self.report_glob.trim().is_empty() {
            return Err(ConfigError::Message(
                "report_glob must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

use crate::error::AdviserResult;
use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;
use std::path::PathBuf;

/// Root application configuration. Loaded from an optional `ads-adviser.toml`
/// in the working directory and environment variables with the prefix
/// `ADS_ADVISER__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where and how the two result files are written.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_metrics_file")]
    pub metrics_file: String,
    #[serde(default = "default_recommendations_file")]
    pub recommendations_file: String,
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

// Default functions
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_metrics_file() -> String {
    "metrics.json".to_string()
}
fn default_recommendations_file() -> String {
    "recommendations.json".to_string()
}
fn default_pretty() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            metrics_file: default_metrics_file(),
            recommendations_file: default_recommendations_file(),
            pretty: default_pretty(),
        }
    }
}

impl OutputConfig {
    pub fn metrics_path(&self) -> PathBuf {
        self.dir.join(&self.metrics_file)
    }

    pub fn recommendations_path(&self) -> PathBuf {
        self.dir.join(&self.recommendations_file)
    }
}

impl AppConfig {
    /// Load configuration from environment variables and optional config file.
    pub fn load() -> AdviserResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("ads-adviser").required(false))
            .add_source(
                config::Environment::with_prefix("ADS_ADVISER")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> AdviserResult<Self> {
        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}

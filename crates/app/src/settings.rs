//! Application settings.
//!
//! Loaded from `spicci.toml` in the working directory (optional) and
//! `SPICCI__`-prefixed environment variables, with sane defaults for local
//! runs.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
}

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level filter (`error`, `warn`, `info`, `debug`, `trace`).
    pub level: String,
    /// Fee policy: `standard` or `risk_adjusted`.
    pub fee_policy: String,
    /// Balance under which a debit raises the low-balance event, in cents.
    pub low_balance_threshold_minor: Option<i64>,
}

impl App {
    pub fn fee_policy(&self) -> Result<engine::FeePolicy, ConfigError> {
        match self.fee_policy.as_str() {
            "standard" => Ok(engine::FeePolicy::Standard),
            "risk_adjusted" => Ok(engine::FeePolicy::RiskAdjusted),
            other => Err(ConfigError::Message(format!(
                "invalid fee policy: {other}"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("app.level", "info")?
            .set_default("app.fee_policy", "standard")?
            .set_default("server.port", 3000)?
            .set_default("server.database", "memory")?
            .add_source(File::with_name("spicci").required(false))
            .add_source(Environment::with_prefix("SPICCI").separator("__"))
            .build()?
            .try_deserialize()
    }
}

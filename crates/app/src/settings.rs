//! Handles settings for the application. Configuration is written in
//! `settings.toml`.

use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    /// In-memory SQLite, wiped on restart. Useful for local experiments.
    Memory,
    /// SQLite file at the given path, created on first run.
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level filter, e.g. `info` or `debug`.
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings"))
            .build()?;

        settings.try_deserialize()
    }
}

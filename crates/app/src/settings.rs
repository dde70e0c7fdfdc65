//! Handles settings for the application. Configuration is written in
//! `settings.toml` and can be overridden with `PHARMALINK__SECTION__KEY`
//! environment variables.
use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Uploads {
    pub dir: String,
    pub public_url: String,
    pub max_bytes: usize,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub uploads: Uploads,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("PHARMALINK")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.level", "info")?
            .set_default("server.port", 3000)?
            .set_default("server.database", "memory")?
            .set_default("uploads.dir", "uploads")?
            .set_default("uploads.public_url", "/uploads")?
            .set_default(
                "uploads.max_bytes",
                engine::DEFAULT_MAX_DOCUMENT_BYTES as u64,
            )
    }
}

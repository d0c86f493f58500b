//! Handles settings for the application.
//!
//! Values come from an optional `settings.toml` in the working directory,
//! overridden by `PETTYCASH__SECTION__KEY` environment variables.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
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
pub struct EngineSettings {
    /// Code required by force unlock. Unset disables it.
    pub admin_code: Option<String>,
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            admin_code: None,
            operation_timeout_ms: default_operation_timeout_ms(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
        }
    }
}

fn default_operation_timeout_ms() -> u64 {
    5_000
}

fn default_acquire_timeout_ms() -> u64 {
    3_000
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub engine: EngineSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_config(
            Config::builder()
                .add_source(File::with_name("settings").required(false))
                .add_source(
                    Environment::with_prefix("PETTYCASH")
                        .separator("__")
                        .try_parsing(true),
                )
                .build()?,
        )
    }

    fn from_config(config: Config) -> Result<Self, ConfigError> {
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Settings {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap();
        Settings::from_config(config).unwrap()
    }

    #[test]
    fn empty_settings_use_defaults() {
        let settings = parse("");
        assert_eq!(settings.app.level, "info");
        assert!(settings.server.is_none());
        assert!(settings.engine.admin_code.is_none());
        assert_eq!(settings.engine.operation_timeout_ms, 5_000);
        assert_eq!(settings.engine.acquire_timeout_ms, 3_000);
    }

    #[test]
    fn server_with_sqlite_file() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            port = 8080
            database = { sqlite = "./pettycash.db" }

            [engine]
            admin_code = "1234"
            operation_timeout_ms = 2000
            "#,
        );
        let server = settings.server.unwrap();
        assert_eq!(server.port, 8080);
        assert!(matches!(server.database, Database::Sqlite(ref path) if path == "./pettycash.db"));
        assert_eq!(settings.engine.admin_code.as_deref(), Some("1234"));
        assert_eq!(settings.engine.operation_timeout_ms, 2_000);
    }

    #[test]
    fn in_memory_database() {
        let settings = parse(
            r#"
            [server]
            port = 3000
            database = "memory"
            "#,
        );
        assert!(matches!(settings.server.unwrap().database, Database::Memory));
    }
}

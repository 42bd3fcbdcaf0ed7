use serde::Deserialize;

use crate::error::AppError;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Process configuration, read from the environment.
///
/// Recognised variables:
/// - `PORT` — listen port (default 8000)
/// - `HOST` — bind address (default all interfaces)
/// - `DATABASE_URL` — MongoDB connection string (optional)
/// - `DATABASE_NAME` — database to use (optional)
///
/// Without both database settings the service runs with storage reported
/// as unconfigured.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub port: u16,
    pub host: String,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub database_name: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            host: DEFAULT_HOST.to_string(),
            database_url: None,
            database_name: None,
        }
    }
}

impl AppConfig {
    /// Load from the process environment.
    pub fn load() -> Result<Self, AppError> {
        Self::from_source(config::Environment::default().try_parsing(true))
    }

    /// Load from an arbitrary config source on top of the defaults.
    pub fn from_source<S>(source: S) -> Result<Self, AppError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings = config::Config::builder()
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("host", DEFAULT_HOST)?
            .add_source(source)
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// `DATABASE_URL`, treating an empty value as unset.
    pub fn database_url(&self) -> Option<&str> {
        non_empty(self.database_url.as_deref())
    }

    /// `DATABASE_NAME`, treating an empty value as unset.
    pub fn database_name(&self) -> Option<&str> {
        non_empty(self.database_name.as_deref())
    }

    /// Both connection settings, if present.
    pub fn storage_target(&self) -> Option<(&str, &str)> {
        Some((self.database_url()?, self.database_name()?))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

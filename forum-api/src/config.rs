use std::str::FromStr;

use serde::Deserialize;
use serde_with::serde_as;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use strum::{Display, EnumString};

use crate::domain::{gambits::GambitDefinition, services::DEFAULT_PAGE_SIZE};

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub discovery: DiscoverySettings,
}

#[serde_as]
#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub port: u16,
    pub host: String,
    pub app_url: String,
}

#[serde_as]
#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub port: u16,
    pub host: String,
    pub database_name: String,
    pub require_ssl: bool,
}

#[serde_as]
#[derive(Deserialize, Clone, Debug)]
pub struct DiscoverySettings {
    /// Conversations per list page.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    #[serde(default = "default_update_interval_secs")]
    pub update_interval_secs: u64,
    /// Registered after the built-in gambits.
    #[serde(default)]
    pub extra_gambits: Vec<GambitDefinition>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            update_interval_secs: default_update_interval_secs(),
            extra_gambits: Vec::new(),
        }
    }
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_update_interval_secs() -> u64 {
    60
}

impl DatabaseSettings {
    pub fn without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };

        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .ssl_mode(ssl_mode)
    }

    pub fn with_db(&self) -> PgConnectOptions {
        self.without_db().database(&self.database_name)
    }
}

pub fn read_config() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|err| config::ConfigError::Message(format!("no working directory: {err}")))?;
    let config_directory = base_path.join("config");

    let environment_name = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "local".into());
    let environment = Environment::from_str(&environment_name).map_err(|_| {
        config::ConfigError::Message(format!("unknown APP_ENVIRONMENT '{environment_name}'"))
    })?;
    let environment_filename = format!("{}.yaml", environment);

    let settings = config::Config::builder()
        .add_source(config::File::from(config_directory.join("base.yaml")))
        .add_source(config::File::from(
            config_directory.join(environment_filename),
        ))
        .add_source(
            config::Environment::with_prefix("FORUM")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

#[derive(Display, Debug, EnumString, PartialEq, Eq)]
pub enum Environment {
    #[strum(ascii_case_insensitive, serialize = "local")]
    Local,
    #[strum(ascii_case_insensitive, serialize = "production")]
    Production,
}

//! Configuration for Inventory API

use core_config::{AppInfo, FromEnv, app_info, env_parse, server::ServerConfig};
use database::postgres::PostgresConfig;
use strum::{Display, EnumString};

pub use core_config::Environment;

/// Where products are persisted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Application configuration
///
/// - `STORAGE_BACKEND`: `postgres` (default) or `memory`
/// - `RUN_MIGRATIONS`: apply pending migrations on startup (default: true)
/// - `DATABASE_URL` and the `DB_*` pool settings, required for `postgres`
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub storage: StorageBackend,
    /// Present only when `storage` is [`StorageBackend::Postgres`]
    pub postgres: Option<PostgresConfig>,
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let storage: StorageBackend = env_parse("STORAGE_BACKEND", "postgres")?;

        let postgres = match storage {
            StorageBackend::Postgres => Some(PostgresConfig::from_env()?),
            StorageBackend::Memory => None,
        };

        Ok(Self {
            app: app_info!(),
            environment,
            server,
            storage,
            postgres,
            run_migrations: env_parse("RUN_MIGRATIONS", "true")?,
        })
    }
}

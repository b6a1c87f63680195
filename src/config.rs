use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Process-wide configuration, loaded once on first access.
/// Every field can be overridden through `LIFEFLOW_*` environment variables
/// (e.g. `LIFEFLOW_DATABASE_URL`, `LIFEFLOW_API_KEY`).
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::load().unwrap_or_else(|e| panic!("invalid configuration: {e}"))
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: String,
    pub api_key: String,
    pub loglevel: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:lifeflow.db".to_string(),
            listen_addr: "0.0.0.0:8000".to_string(),
            api_key: String::new(),
            loglevel: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("LIFEFLOW_"))
            .extract()
    }
}

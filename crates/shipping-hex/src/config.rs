use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: String,
    pub database_url: Option<String>,
    /// Deployment stage of this process (`production`, `staging`, `development`...).
    pub app_env: String,
    pub fixtures_path: Option<String>,
    pub carrier_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let server_port = env::var("SERVER_PORT").unwrap_or_else(|_| "3000".into());
        let database_url = env::var("DATABASE_URL").ok();
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let fixtures_path = env::var("FIXTURES_PATH").ok();
        let carrier_timeout = match env::var("CARRIER_TIMEOUT_SECS") {
            Ok(v) => Some(Duration::from_secs(v.trim().parse().map_err(|e| {
                anyhow::anyhow!("CARRIER_TIMEOUT_SECS must be a number of seconds: {e}")
            })?)),
            Err(_) => None,
        };
        Ok(Self {
            server_port,
            database_url,
            app_env,
            fixtures_path,
            carrier_timeout,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }
}

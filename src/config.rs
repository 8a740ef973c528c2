use std::{env, time::Duration};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8081);
        Ok(Self {
            port,
            database_url,
            host,
        })
    }
}

/// Settings for the booking flow running against a remote backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub checkout_key: String,
    pub currency: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub const DEFAULT_API_URL: &'static str = "http://localhost:8081/api";

    pub fn from_env() -> Self {
        let api_base_url =
            env::var("PLANNGO_API_URL").unwrap_or_else(|_| Self::DEFAULT_API_URL.to_string());
        let checkout_key = env::var("CHECKOUT_KEY").unwrap_or_default();
        let currency = env::var("CHECKOUT_CURRENCY").unwrap_or_else(|_| "INR".to_string());
        let timeout = env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));
        Self {
            api_base_url,
            checkout_key,
            currency,
            timeout,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: Self::DEFAULT_API_URL.to_string(),
            checkout_key: String::new(),
            currency: "INR".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

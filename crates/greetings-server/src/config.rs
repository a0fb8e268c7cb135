use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

use greetings_db::DEFAULT_READER_POOL_SIZE;

const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: PathBuf,
    pub db_readers: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests need not touch the process env.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = get("GREETINGS_HOST").unwrap_or_else(|| "0.0.0.0".into());

        let port = match get("GREETINGS_PORT").or_else(|| get("PORT")) {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("invalid port '{}'", raw))?,
            None => DEFAULT_PORT,
        };

        let database_url = get("DATABASE_URL")
            .unwrap_or_else(|| "greetings.db".into())
            .into();

        let db_readers = match get("GREETINGS_DB_READERS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("invalid GREETINGS_DB_READERS '{}'", raw))?,
            None => DEFAULT_READER_POOL_SIZE,
        };

        Ok(Self {
            host,
            port,
            database_url,
            db_readers,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .with_context(|| format!("invalid bind address '{}'", addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_url, PathBuf::from("greetings.db"));
        assert_eq!(config.db_readers, DEFAULT_READER_POOL_SIZE);
        assert_eq!(config.addr().unwrap().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn specific_port_wins_over_generic() {
        let config =
            Config::from_lookup(lookup(&[("PORT", "8080"), ("GREETINGS_PORT", "9090")])).unwrap();
        assert_eq!(config.port, 9090);

        let config = Config::from_lookup(lookup(&[("PORT", "8080")])).unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn bad_numbers_are_rejected() {
        assert!(Config::from_lookup(lookup(&[("PORT", "http")])).is_err());
        assert!(Config::from_lookup(lookup(&[("GREETINGS_DB_READERS", "-1")])).is_err());
    }
}

//! Server configuration, read from `.env` and the process environment.

use std::{fmt::Display, net::SocketAddr, str::FromStr};

use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    /// Env: `DATABASE_URL`
    pub database_url: String,
    /// Env: `BIND_ADDR`
    pub bind_addr: SocketAddr,
    /// Minutes of inactivity before a browser session (and its identity) expires.
    /// Env: `SESSION_IDLE_MINUTES`
    pub session_idle_minutes: i64,
    /// Env: `DB_MAX_CONNECTIONS`
    pub max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://chatrooms.db?mode=rwc".to_string(),
            bind_addr: ([0, 0, 0, 0], 8080).into(),
            session_idle_minutes: 60,
            max_connections: 16,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("DATABASE_URL") {
            config.database_url = url;
        }
        parse_into(&lookup, "BIND_ADDR", &mut config.bind_addr);
        parse_into(&lookup, "SESSION_IDLE_MINUTES", &mut config.session_idle_minutes);
        parse_into(&lookup, "DB_MAX_CONNECTIONS", &mut config.max_connections);

        config
    }
}

fn parse_into<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, slot: &mut T)
where
    T: FromStr,
    T::Err: Display,
{
    let Some(value) = lookup(key) else {
        return;
    };

    match value.parse() {
        Ok(parsed) => *slot = parsed,
        Err(e) => warn!(key, %value, error = %e, "invalid setting, using default"),
    }
}

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

use botwatch_db::StoreOptions;

pub const DEFAULT_DB_PATH: &str = "data/bot.db";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PUBLIC_DIR: &str = "public";

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite file, or `:memory:` for a store that lives only as long as the process.
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub public_dir: PathBuf,
    pub enforce_foreign_keys: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("BOTWATCH_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("BOTWATCH_PORT is not a valid port: {raw:?}"))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            db_path: var("BOTWATCH_DB_PATH")
                .unwrap_or_else(|| DEFAULT_DB_PATH.into())
                .into(),
            host: var("BOTWATCH_HOST").unwrap_or_else(|| DEFAULT_HOST.into()),
            port,
            public_dir: var("BOTWATCH_PUBLIC_DIR")
                .unwrap_or_else(|| DEFAULT_PUBLIC_DIR.into())
                .into(),
            enforce_foreign_keys: var("BOTWATCH_ENFORCE_FOREIGN_KEYS")
                .map(|v| is_truthy(&v))
                .unwrap_or(false),
        })
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            enforce_foreign_keys: self.enforce_foreign_keys,
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

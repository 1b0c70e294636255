use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub users_path: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("CHATLINE_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match lookup("CHATLINE_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("CHATLINE_PORT is not a valid port: {raw}"))?,
            None => 3001,
        };
        let users_path = lookup("CHATLINE_USERS_PATH")
            .unwrap_or_else(|| "data/users.json".into())
            .into();

        Ok(Self {
            host,
            port,
            users_path,
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

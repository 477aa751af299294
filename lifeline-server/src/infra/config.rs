use std::net::SocketAddr;

use anyhow::{Context, Result};

/// Runtime configuration, resolved from CLI flags and environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .context("invalid SERVER_HOST/SERVER_PORT combination")
    }
}

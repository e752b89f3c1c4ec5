// src/config.rs
use std::path::PathBuf;

use serde::Deserialize;

//=============================================================================
// Configuration
//=============================================================================

/// Process configuration, read from `FARMSHIFT_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server
    #[serde(default = "default_server_host")]
    pub server_host: String,
    #[serde(default = "default_server_port")]
    pub server_port: u16,

    // TLS, both or neither
    pub cert_path: Option<PathBuf>,
    pub key_path: Option<PathBuf>,

    // Storage: JSON snapshot of the item table; in-memory only when unset
    pub data_file: Option<PathBuf>,

    // Scheduling
    #[serde(default)]
    pub exclusive_day_lock: bool,
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    3000
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        envy::prefixed("FARMSHIFT_").from_env::<Config>()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn tls_paths(&self) -> Option<(PathBuf, PathBuf)> {
        match (&self.cert_path, &self.key_path) {
            (Some(cert), Some(key)) => Some((cert.clone(), key.clone())),
            _ => None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: default_server_host(),
            server_port: default_server_port(),
            cert_path: None,
            key_path: None,
            data_file: None,
            exclusive_day_lock: false,
        }
    }
}

use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

/// Names a YAML config file to read before applying env overrides.
pub const CONFIG_ENV: &str = "MIMIC_CONFIG";
/// Overrides `listen_addr`.
pub const LISTEN_ENV: &str = "LISTEN";
/// Overrides `routes_file`.
pub const ROUTES_ENV: &str = "ROUTES_FILE";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    /// Route document, read once on first use.
    pub routes_file: PathBuf,
    /// `GET` on this path lists the route table. `None` disables it.
    pub debug_routes_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:9919".to_string(),
            routes_file: PathBuf::from("routes.mock"),
            debug_routes_path: Some("/mimic/debug/routes".to_string()),
        }
    }
}

impl Config {
    /// Reads the file named by `MIMIC_CONFIG` if set, then applies `LISTEN`
    /// and `ROUTES_FILE`.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {}", PathBuf::from(&path).display()))?;
                Self::from_yaml_str(&text)?
            }
            None => Self::default(),
        };

        if let Ok(listen_addr) = std::env::var(LISTEN_ENV) {
            cfg.listen_addr = listen_addr;
        }
        if let Some(routes_file) = std::env::var_os(ROUTES_ENV) {
            cfg.routes_file = PathBuf::from(routes_file);
        }

        Ok(cfg)
    }

    pub fn from_yaml_str(text: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(text).context("parsing config YAML")
    }
}

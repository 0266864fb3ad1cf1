//! Server configuration from environment variables
//!
//! Defaults suit local development from the repository root. Deployments
//! override them via the service environment.

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Directory holding `{code}.json` dataset files
    pub data_dir: PathBuf,
    /// Directory served for non-API paths
    pub static_dir: PathBuf,
    pub categories_path: PathBuf,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("api"),
            static_dir: PathBuf::from("public"),
            categories_path: PathBuf::from("config/categories.json"),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparseable values keep defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            data_dir: lookup("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            static_dir: lookup("STATIC_DIR").map(PathBuf::from).unwrap_or(defaults.static_dir),
            categories_path: lookup("CATEGORIES_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.categories_path),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_overrides_and_bad_port() {
        let env: HashMap<&str, &str> = [("DATA_DIR", "/srv/law"), ("PORT", "not-a-port")]
            .into_iter()
            .collect();
        let config = ServerConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.data_dir, PathBuf::from("/srv/law"));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.static_dir, PathBuf::from("public"));
    }
}

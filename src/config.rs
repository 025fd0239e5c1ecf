use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::error::ModelError;
use crate::registry::ProviderRegistry;

pub const PROVIDERS_FILE_VAR: &str = "LENDING_PROVIDERS_FILE";
pub const REQUIRE_KNOWN_PROVIDER_VAR: &str = "LENDING_REQUIRE_KNOWN_PROVIDER";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("{name} must be true or false, got '{value}'")]
    InvalidVar { name: &'static str, value: String },
}

/// Runtime settings, read from the environment (and `.env` if present).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// JSON array of known providers.
    pub providers_file: Option<PathBuf>,
    /// Reject rates responses from providers missing in the catalog.
    pub require_known_provider: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let providers_file = lookup(PROVIDERS_FILE_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let require_known_provider = match lookup(REQUIRE_KNOWN_PROVIDER_VAR) {
            Some(value) => parse_bool(REQUIRE_KNOWN_PROVIDER_VAR, &value)?,
            None => providers_file.is_some(),
        };

        Ok(Config {
            providers_file,
            require_known_provider,
        })
    }

    /// Loads the provider catalog, or an empty registry when none is configured.
    pub fn load_registry(&self) -> Result<ProviderRegistry, ConfigError> {
        match &self.providers_file {
            Some(path) => ProviderRegistry::load(path),
            None => {
                tracing::debug!("{} not set, using an empty provider registry", PROVIDERS_FILE_VAR);
                Ok(ProviderRegistry::default())
            }
        }
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidVar {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_catalog() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.load_registry().unwrap().is_empty());
    }

    #[test]
    fn test_catalog_implies_known_provider_check() {
        let config = Config::from_lookup(lookup(&[(PROVIDERS_FILE_VAR, "providers.json")])).unwrap();
        assert_eq!(config.providers_file, Some(PathBuf::from("providers.json")));
        assert!(config.require_known_provider);
    }

    #[test]
    fn test_explicit_flag_overrides_default() {
        let config = Config::from_lookup(lookup(&[
            (PROVIDERS_FILE_VAR, "providers.json"),
            (REQUIRE_KNOWN_PROVIDER_VAR, "false"),
        ]))
        .unwrap();
        assert!(!config.require_known_provider);
    }

    #[test]
    fn test_invalid_flag() {
        let err = Config::from_lookup(lookup(&[(REQUIRE_KNOWN_PROVIDER_VAR, "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { .. }));
    }

    #[test]
    fn test_missing_catalog_file() {
        let config = Config {
            providers_file: Some(PathBuf::from("/nonexistent/providers.json")),
            require_known_provider: true,
        };
        assert!(matches!(config.load_registry(), Err(ConfigError::Io { .. })));
    }
}

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::config::ConfigError;
use crate::error::{ModelError, ModelResult};
use crate::models::{LendingProvider, RatesRequest, RatesResponse};
use crate::wire;

/// Known lending providers, keyed by id.
///
/// Built once and read-only afterwards, so it can be shared freely behind an
/// `Arc` or a plain reference.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, LendingProvider>,
}

impl ProviderRegistry {
    pub fn new(providers: Vec<LendingProvider>) -> ModelResult<Self> {
        let mut map = HashMap::with_capacity(providers.len());
        for provider in providers {
            let id = provider.id().to_string();
            if map.insert(id.clone(), provider).is_some() {
                return Err(ModelError::invalid(
                    "id",
                    format!("provider '{}' listed more than once", id),
                ));
            }
        }
        Ok(ProviderRegistry { providers: map })
    }

    /// Loads a catalog file holding a JSON array of providers.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let providers: Vec<LendingProvider> = wire::decode(&contents)?;
        let registry = Self::new(providers)?;

        tracing::debug!(
            "Loaded {} lending providers from {}",
            registry.len(),
            path.display()
        );

        Ok(registry)
    }

    pub fn get(&self, id: &str) -> Option<&LendingProvider> {
        self.providers.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.providers.contains_key(id)
    }

    /// Provider ids in ascending order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Checks that a response names a known provider and only quotes assets
    /// that provider lends.
    pub fn check_response(&self, response: &RatesResponse) -> ModelResult<()> {
        let provider = self.get(response.provider()).ok_or_else(|| {
            ModelError::invalid(
                "provider",
                format!("unknown provider '{}'", response.provider()),
            )
        })?;

        if let Some(rates) = response
            .rates()
            .iter()
            .find(|r| !provider.supports_symbol(r.asset()))
        {
            return Err(ModelError::invalid(
                "asset",
                format!(
                    "provider '{}' does not lend {}",
                    provider.id(),
                    rates.asset()
                ),
            ));
        }

        Ok(())
    }

    /// Requested symbols the provider does not lend. Empty when everything
    /// requested is supported, or when the request asks for all assets.
    pub fn check_request<'a>(
        &self,
        provider_id: &str,
        request: &'a RatesRequest,
    ) -> ModelResult<Vec<&'a str>> {
        let provider = self.get(provider_id).ok_or_else(|| {
            ModelError::invalid("provider", format!("unknown provider '{}'", provider_id))
        })?;

        Ok(request
            .assets
            .iter()
            .map(String::as_str)
            .filter(|symbol| !provider.supports_symbol(symbol))
            .collect())
    }
}

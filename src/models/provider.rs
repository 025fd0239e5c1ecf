use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::models::common::Term;

/// Human-facing metadata about a lending provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LendingProviderInfo {
    pub id: String,
    pub description: String,
    pub image: String,
    pub website: String,
}

/// An asset that can be lent on a given chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AssetClassWire")]
pub struct AssetClass {
    symbol: String,
    chain: String,
    description: String,
    /// Period of yield computation in seconds, e.g. 86400 for daily.
    yield_freq: i64,
    /// Predefined lending terms, strictly ascending.
    terms: Vec<Term>,
}

#[derive(Deserialize)]
struct AssetClassWire {
    symbol: String,
    chain: String,
    description: String,
    yield_freq: i64,
    terms: Vec<Term>,
}

impl TryFrom<AssetClassWire> for AssetClass {
    type Error = ModelError;

    fn try_from(wire: AssetClassWire) -> Result<Self, Self::Error> {
        AssetClass::new(
            wire.symbol,
            wire.chain,
            wire.description,
            wire.yield_freq,
            wire.terms,
        )
    }
}

impl AssetClass {
    pub fn new(
        symbol: impl Into<String>,
        chain: impl Into<String>,
        description: impl Into<String>,
        yield_freq: i64,
        terms: Vec<Term>,
    ) -> ModelResult<Self> {
        let symbol = symbol.into();
        let chain = chain.into();

        if symbol.trim().is_empty() {
            return Err(ModelError::invalid("symbol", "cannot be empty"));
        }
        if chain.trim().is_empty() {
            return Err(ModelError::invalid("chain", "cannot be empty"));
        }
        if yield_freq <= 0 {
            return Err(ModelError::invalid(
                "yield_freq",
                format!("must be a positive number of seconds, got {}", yield_freq),
            ));
        }
        if let Some(pair) = terms.windows(2).find(|pair| pair[0] >= pair[1]) {
            let reason = if pair[0] == pair[1] {
                format!("duplicate term {}", pair[0])
            } else {
                format!("terms must be ascending, {} comes before {}", pair[0], pair[1])
            };
            return Err(ModelError::invalid("terms", reason));
        }

        Ok(AssetClass {
            symbol,
            chain,
            description: description.into(),
            yield_freq,
            terms,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn yield_freq(&self) -> i64 {
        self.yield_freq
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn offers_term(&self, term: Term) -> bool {
        self.terms.binary_search(&term).is_ok()
    }
}

/// Static information about a lending provider: who it is and which assets it lends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LendingProviderWire")]
pub struct LendingProvider {
    id: String,
    info: LendingProviderInfo,
    assets: Vec<AssetClass>,
}

#[derive(Deserialize)]
struct LendingProviderWire {
    id: String,
    info: LendingProviderInfo,
    assets: Vec<AssetClass>,
}

impl TryFrom<LendingProviderWire> for LendingProvider {
    type Error = ModelError;

    fn try_from(wire: LendingProviderWire) -> Result<Self, Self::Error> {
        LendingProvider::new(wire.id, wire.info, wire.assets)
    }
}

impl LendingProvider {
    pub fn new(
        id: impl Into<String>,
        info: LendingProviderInfo,
        assets: Vec<AssetClass>,
    ) -> ModelResult<Self> {
        let id = id.into();

        if id.trim().is_empty() {
            return Err(ModelError::invalid("id", "cannot be empty"));
        }
        if info.id != id {
            return Err(ModelError::invalid(
                "info.id",
                format!("'{}' does not match provider id '{}'", info.id, id),
            ));
        }

        let mut seen = HashSet::new();
        for asset in &assets {
            if !seen.insert((asset.symbol(), asset.chain())) {
                return Err(ModelError::invalid(
                    "assets",
                    format!("duplicate asset {} on chain {}", asset.symbol(), asset.chain()),
                ));
            }
        }

        Ok(LendingProvider { id, info, assets })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn info(&self) -> &LendingProviderInfo {
        &self.info
    }

    pub fn assets(&self) -> &[AssetClass] {
        &self.assets
    }

    pub fn asset(&self, symbol: &str, chain: &str) -> Option<&AssetClass> {
        self.assets
            .iter()
            .find(|a| a.symbol() == symbol && a.chain() == chain)
    }

    /// True if the provider lends `symbol` on at least one chain.
    pub fn supports_symbol(&self, symbol: &str) -> bool {
        self.assets.iter().any(|a| a.symbol() == symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn terms(days: &[f64]) -> Vec<Term> {
        days.iter().map(|d| Term::new(*d).unwrap()).collect()
    }

    fn info(id: &str) -> LendingProviderInfo {
        LendingProviderInfo {
            id: id.to_string(),
            description: "Test venue".to_string(),
            image: "https://acme.example/logo.png".to_string(),
            website: "https://acme.example".to_string(),
        }
    }

    fn usdc() -> AssetClass {
        AssetClass::new("USDC", "ethereum", "USD Coin", 86_400, terms(&[7.0, 30.5, 180.0])).unwrap()
    }

    #[test]
    fn test_asset_class_valid() {
        let asset = usdc();
        assert_eq!(asset.symbol(), "USDC");
        assert_eq!(asset.yield_freq(), 86_400);
        assert!(asset.offers_term(Term::new(30.5).unwrap()));
        assert!(!asset.offers_term(Term::new(30.0).unwrap()));
    }

    #[test]
    fn test_asset_class_rejects_non_positive_yield_freq() {
        let err = AssetClass::new("USDC", "ethereum", "", 0, vec![]).unwrap_err();
        assert_eq!(err.field(), Some("yield_freq"));

        let err = AssetClass::new("USDC", "ethereum", "", -86_400, vec![]).unwrap_err();
        assert_eq!(err.field(), Some("yield_freq"));
    }

    #[test]
    fn test_asset_class_rejects_unsorted_or_duplicate_terms() {
        let err = AssetClass::new("USDC", "ethereum", "", 86_400, terms(&[30.0, 7.0])).unwrap_err();
        assert_eq!(err.field(), Some("terms"));

        let err = AssetClass::new("USDC", "ethereum", "", 86_400, terms(&[7.0, 7.0])).unwrap_err();
        assert!(err.to_string().contains("duplicate term 7"));
    }

    #[test]
    fn test_asset_class_empty_terms_allowed() {
        let asset = AssetClass::new("ETH", "ethereum", "Ether", 3_600, vec![]).unwrap();
        assert!(asset.terms().is_empty());
    }

    #[test]
    fn test_provider_rejects_empty_id() {
        let err = LendingProvider::new("", info(""), vec![]).unwrap_err();
        assert_eq!(err.field(), Some("id"));
    }

    #[test]
    fn test_provider_info_id_must_match() {
        let err = LendingProvider::new("acme", info("other"), vec![]).unwrap_err();
        assert_eq!(err.field(), Some("info.id"));
    }

    #[test]
    fn test_provider_rejects_duplicate_asset_on_same_chain() {
        let err = LendingProvider::new("acme", info("acme"), vec![usdc(), usdc()]).unwrap_err();
        assert_eq!(err.field(), Some("assets"));
    }

    #[test]
    fn test_provider_allows_same_symbol_on_other_chain() {
        let polygon = AssetClass::new("USDC", "polygon", "USD Coin", 86_400, vec![]).unwrap();
        let provider = LendingProvider::new("acme", info("acme"), vec![usdc(), polygon]).unwrap();

        assert!(provider.supports_symbol("USDC"));
        assert!(!provider.supports_symbol("DAI"));
        assert_eq!(provider.asset("USDC", "polygon").unwrap().chain(), "polygon");
        assert!(provider.asset("USDC", "solana").is_none());
    }

    #[test]
    fn test_provider_deserialize_validates() {
        let value = json!({
            "id": "acme",
            "info": { "id": "acme", "description": "", "image": "", "website": "" },
            "assets": [
                { "symbol": "USDC", "chain": "ethereum", "description": "",
                  "yield_freq": 86400, "terms": [7, 30.5, 180] }
            ]
        });
        let provider: LendingProvider = serde_json::from_value(value).unwrap();
        assert_eq!(provider.assets()[0].terms().len(), 3);

        let bad = json!({
            "id": "acme",
            "info": { "id": "acme", "description": "", "image": "", "website": "" },
            "assets": [
                { "symbol": "USDC", "chain": "ethereum", "description": "",
                  "yield_freq": 0, "terms": [] }
            ]
        });
        let err = serde_json::from_value::<LendingProvider>(bad).unwrap_err();
        assert!(err.to_string().contains("yield_freq"));
    }

    #[test]
    fn test_provider_serializes_wire_names() {
        let provider = LendingProvider::new("acme", info("acme"), vec![usdc()]).unwrap();
        let value = serde_json::to_value(&provider).unwrap();
        assert_eq!(value["assets"][0]["yield_freq"], 86_400);
        assert_eq!(value["assets"][0]["terms"], json!([7, 30.5, 180]));
        assert_eq!(value["info"]["website"], "https://acme.example");
    }
}

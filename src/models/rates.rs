use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::models::common::Term;

/// Rates API request. An empty `assets` list asks for every supported asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatesRequest {
    pub assets: Vec<String>,
}

impl RatesRequest {
    pub fn all() -> Self {
        RatesRequest { assets: vec![] }
    }

    pub fn for_assets<I, S>(assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RatesRequest {
            assets: assets.into_iter().map(Into::into).collect(),
        }
    }

    pub fn includes(&self, symbol: &str) -> bool {
        self.assets.is_empty() || self.assets.iter().any(|a| a == symbol)
    }
}

/// APR of one asset for one term, e.g. `{30, 1.45}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LendingTermAprWire")]
pub struct LendingTermAPR {
    term: Term,
    /// Percentage, 1.45 means 1.45%.
    apr: f64,
}

#[derive(Deserialize)]
struct LendingTermAprWire {
    term: Term,
    apr: f64,
}

impl TryFrom<LendingTermAprWire> for LendingTermAPR {
    type Error = ModelError;

    fn try_from(wire: LendingTermAprWire) -> Result<Self, Self::Error> {
        LendingTermAPR::new(wire.term, wire.apr)
    }
}

impl LendingTermAPR {
    pub fn new(term: Term, apr: f64) -> ModelResult<Self> {
        validate_apr("apr", apr)?;
        Ok(LendingTermAPR { term, apr })
    }

    pub fn term(&self) -> Term {
        self.term
    }

    pub fn apr(&self) -> f64 {
        self.apr
    }
}

pub(crate) fn validate_apr(field: &'static str, apr: f64) -> ModelResult<()> {
    if !apr.is_finite() || apr < 0.0 {
        return Err(ModelError::invalid(
            field,
            format!("must be a non-negative percentage, got {}", apr),
        ));
    }
    Ok(())
}

/// Drops repeated terms, keeping the first rate seen for each one.
///
/// `LendingAssetRates::new` rejects duplicates, so callers feeding raw
/// provider data run it through here first.
pub fn dedup_term_rates(rates: impl IntoIterator<Item = LendingTermAPR>) -> Vec<LendingTermAPR> {
    let mut seen = HashSet::new();
    rates
        .into_iter()
        .filter(|rate| seen.insert(rate.term()))
        .collect()
}

/// Rates for one asset across one or more terms, e.g. `[{7, 0.9}, {30, 1.45}]`.
///
/// The highest APR is derived from `term_rates` on access and written to the
/// wire as `max_apr`. An incoming `max_apr` may be omitted, but if present it
/// must equal the highest term rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LendingAssetRatesWire", into = "LendingAssetRatesWire")]
pub struct LendingAssetRates {
    asset: String,
    term_rates: Vec<LendingTermAPR>,
}

#[derive(Serialize, Deserialize)]
struct LendingAssetRatesWire {
    asset: String,
    term_rates: Vec<LendingTermAPR>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_apr: Option<f64>,
}

impl TryFrom<LendingAssetRatesWire> for LendingAssetRates {
    type Error = ModelError;

    fn try_from(wire: LendingAssetRatesWire) -> Result<Self, Self::Error> {
        let rates = LendingAssetRates::new(wire.asset, wire.term_rates)?;

        if let Some(claimed) = wire.max_apr {
            if claimed != rates.max_apr() {
                return Err(ModelError::invalid(
                    "max_apr",
                    format!(
                        "{} does not match the highest term rate {} for {}",
                        claimed,
                        rates.max_apr(),
                        rates.asset
                    ),
                ));
            }
        }

        Ok(rates)
    }
}

impl From<LendingAssetRates> for LendingAssetRatesWire {
    fn from(rates: LendingAssetRates) -> Self {
        let max_apr = Some(rates.max_apr());
        LendingAssetRatesWire {
            asset: rates.asset,
            term_rates: rates.term_rates,
            max_apr,
        }
    }
}

impl LendingAssetRates {
    /// Builds the rates for `asset`. An empty `term_rates` means no terms are
    /// currently offered; a repeated term is an error.
    pub fn new(asset: impl Into<String>, term_rates: Vec<LendingTermAPR>) -> ModelResult<Self> {
        let asset = asset.into();
        if asset.trim().is_empty() {
            return Err(ModelError::invalid("asset", "cannot be empty"));
        }

        let mut seen = HashSet::new();
        for rate in &term_rates {
            if !seen.insert(rate.term()) {
                return Err(ModelError::invalid(
                    "term_rates",
                    format!("duplicate term {} for {}", rate.term(), asset),
                ));
            }
        }

        Ok(LendingAssetRates { asset, term_rates })
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn term_rates(&self) -> &[LendingTermAPR] {
        &self.term_rates
    }

    /// Highest APR across all terms, 0 when no terms are offered.
    pub fn max_apr(&self) -> f64 {
        self.term_rates
            .iter()
            .map(LendingTermAPR::apr)
            .fold(0.0, f64::max)
    }

    /// Term carrying the highest APR; the earliest one wins a tie.
    pub fn best_rate(&self) -> Option<&LendingTermAPR> {
        self.term_rates
            .iter()
            .fold(None, |best: Option<&LendingTermAPR>, rate| match best {
                Some(b) if b.apr() >= rate.apr() => Some(b),
                _ => Some(rate),
            })
    }

    pub fn rate_for(&self, term: Term) -> Option<f64> {
        self.term_rates
            .iter()
            .find(|r| r.term() == term)
            .map(LendingTermAPR::apr)
    }
}

/// Rates for several assets, at most one entry per asset symbol.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<LendingAssetRates>", into = "Vec<LendingAssetRates>")]
pub struct LendingRates(Vec<LendingAssetRates>);

impl TryFrom<Vec<LendingAssetRates>> for LendingRates {
    type Error = ModelError;

    fn try_from(entries: Vec<LendingAssetRates>) -> Result<Self, Self::Error> {
        LendingRates::new(entries)
    }
}

impl From<LendingRates> for Vec<LendingAssetRates> {
    fn from(rates: LendingRates) -> Self {
        rates.0
    }
}

impl LendingRates {
    pub fn new(entries: Vec<LendingAssetRates>) -> ModelResult<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.asset()) {
                return Err(ModelError::invalid(
                    "rates",
                    format!("duplicate asset {}", entry.asset()),
                ));
            }
        }
        Ok(LendingRates(entries))
    }

    pub fn get(&self, asset: &str) -> Option<&LendingAssetRates> {
        self.0.iter().find(|r| r.asset() == asset)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LendingAssetRates> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries answering `request`, in the order they are held here.
    /// Requested symbols without an entry are skipped.
    pub fn select(&self, request: &RatesRequest) -> LendingRates {
        let selected: Vec<LendingAssetRates> = self
            .0
            .iter()
            .filter(|r| request.includes(r.asset()))
            .cloned()
            .collect();

        tracing::debug!(
            "Selected {} of {} asset rates for {} requested assets",
            selected.len(),
            self.0.len(),
            request.assets.len()
        );

        LendingRates(selected)
    }
}

impl<'a> IntoIterator for &'a LendingRates {
    type Item = &'a LendingAssetRates;
    type IntoIter = std::slice::Iter<'a, LendingAssetRates>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Rates API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RatesResponseWire")]
pub struct RatesResponse {
    provider: String,
    rates: LendingRates,
}

#[derive(Deserialize)]
struct RatesResponseWire {
    provider: String,
    rates: LendingRates,
}

impl TryFrom<RatesResponseWire> for RatesResponse {
    type Error = ModelError;

    fn try_from(wire: RatesResponseWire) -> Result<Self, Self::Error> {
        RatesResponse::new(wire.provider, wire.rates)
    }
}

impl RatesResponse {
    pub fn new(provider: impl Into<String>, rates: LendingRates) -> ModelResult<Self> {
        let provider = provider.into();
        if provider.trim().is_empty() {
            return Err(ModelError::invalid("provider", "cannot be empty"));
        }
        Ok(RatesResponse { provider, rates })
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn rates(&self) -> &LendingRates {
        &self.rates
    }
}

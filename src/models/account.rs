use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::models::common::{Amount, Term, Time};
use crate::models::rates::validate_apr;

/// Account API request: contracts held by `address`, optionally limited to some assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AccountRequestWire")]
pub struct AccountRequest {
    address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    assets: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct AccountRequestWire {
    address: String,
    #[serde(default)]
    assets: Option<Vec<String>>,
}

impl TryFrom<AccountRequestWire> for AccountRequest {
    type Error = ModelError;

    fn try_from(wire: AccountRequestWire) -> Result<Self, Self::Error> {
        AccountRequest::new(wire.address, wire.assets)
    }
}

impl AccountRequest {
    pub fn new(address: impl Into<String>, assets: Option<Vec<String>>) -> ModelResult<Self> {
        let address = address.into();
        if address.trim().is_empty() {
            return Err(ModelError::invalid("address", "cannot be empty"));
        }
        Ok(AccountRequest { address, assets })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn assets(&self) -> Option<&[String]> {
        self.assets.as_deref()
    }

    /// A missing or empty filter matches every asset.
    pub fn includes(&self, symbol: &str) -> bool {
        match &self.assets {
            Some(assets) if !assets.is_empty() => assets.iter().any(|a| a == symbol),
            _ => true,
        }
    }
}

/// Account API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountResponse {
    pub contracts: AccountLendingContracts,
}

/// Unvalidated fields of a [`LendingContract`], as they appear on the wire.
///
/// Amounts stay as decimal strings here; they are parsed and checked when the
/// contract is built.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LendingContractParams {
    pub asset: String,
    pub term: Term,
    pub start_amount: String,
    pub current_amount: String,
    pub end_amount_estimate: String,
    pub current_apr: f64,
    pub start_time: Time,
    pub current_time: Time,
    pub end_time: Time,
}

/// A user's lending contract for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LendingContractParams")]
pub struct LendingContract {
    asset: String,
    term: Term,
    start_amount: Amount,
    current_amount: Amount,
    end_amount_estimate: Amount,
    current_apr: f64,
    start_time: Time,
    current_time: Time,
    end_time: Time,
}

impl TryFrom<LendingContractParams> for LendingContract {
    type Error = ModelError;

    fn try_from(params: LendingContractParams) -> Result<Self, Self::Error> {
        LendingContract::new(params)
    }
}

impl LendingContract {
    pub fn new(params: LendingContractParams) -> ModelResult<Self> {
        if params.asset.trim().is_empty() {
            return Err(ModelError::invalid("asset", "cannot be empty"));
        }

        let start_amount = Amount::parse_field("start_amount", params.start_amount)?;
        let current_amount = Amount::parse_field("current_amount", params.current_amount)?;
        let end_amount_estimate =
            Amount::parse_field("end_amount_estimate", params.end_amount_estimate)?;

        validate_apr("current_apr", params.current_apr)?;

        if params.current_time < params.start_time {
            return Err(ModelError::invalid(
                "current_time",
                format!(
                    "{} precedes start_time {}",
                    params.current_time, params.start_time
                ),
            ));
        }
        if params.end_time < params.current_time {
            return Err(ModelError::invalid(
                "end_time",
                format!(
                    "{} precedes current_time {}",
                    params.end_time, params.current_time
                ),
            ));
        }

        Ok(LendingContract {
            asset: params.asset,
            term: params.term,
            start_amount,
            current_amount,
            end_amount_estimate,
            current_apr: params.current_apr,
            start_time: params.start_time,
            current_time: params.current_time,
            end_time: params.end_time,
        })
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    pub fn term(&self) -> Term {
        self.term
    }

    pub fn start_amount(&self) -> &Amount {
        &self.start_amount
    }

    pub fn current_amount(&self) -> &Amount {
        &self.current_amount
    }

    pub fn end_amount_estimate(&self) -> &Amount {
        &self.end_amount_estimate
    }

    pub fn current_apr(&self) -> f64 {
        self.current_apr
    }

    pub fn start_time(&self) -> Time {
        self.start_time
    }

    pub fn current_time(&self) -> Time {
        self.current_time
    }

    pub fn end_time(&self) -> Time {
        self.end_time
    }

    /// Interest earned so far. Negative only if the position lost value.
    pub fn accrued(&self) -> ModelResult<Decimal> {
        checked_difference("current_amount", &self.current_amount, &self.start_amount)
    }

    /// Interest expected by the end of the term.
    pub fn estimated_yield(&self) -> ModelResult<Decimal> {
        checked_difference("end_amount_estimate", &self.end_amount_estimate, &self.start_amount)
    }

    pub fn duration_secs(&self) -> i64 {
        self.start_time.secs_until(self.end_time)
    }

    pub fn remaining_secs(&self) -> i64 {
        self.current_time.secs_until(self.end_time)
    }

    pub fn is_matured(&self) -> bool {
        self.current_time == self.end_time
    }
}

/// Contracts of one address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AccountLendingContractsWire")]
pub struct AccountLendingContracts {
    address: String,
    contracts: Vec<LendingContract>,
}

#[derive(Deserialize)]
struct AccountLendingContractsWire {
    address: String,
    contracts: Vec<LendingContract>,
}

impl TryFrom<AccountLendingContractsWire> for AccountLendingContracts {
    type Error = ModelError;

    fn try_from(wire: AccountLendingContractsWire) -> Result<Self, Self::Error> {
        AccountLendingContracts::new(wire.address, wire.contracts)
    }
}

impl AccountLendingContracts {
    pub fn new(address: impl Into<String>, contracts: Vec<LendingContract>) -> ModelResult<Self> {
        let address = address.into();
        if address.trim().is_empty() {
            return Err(ModelError::invalid("address", "cannot be empty"));
        }
        Ok(AccountLendingContracts { address, contracts })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn contracts(&self) -> &[LendingContract] {
        &self.contracts
    }

    /// Contracts matching the request's asset filter.
    pub fn filtered(&self, request: &AccountRequest) -> AccountLendingContracts {
        if request.address() != self.address {
            tracing::debug!(
                "Filtering contracts of {} with a request for {}",
                self.address,
                request.address()
            );
        }

        AccountLendingContracts {
            address: self.address.clone(),
            contracts: self
                .contracts
                .iter()
                .filter(|c| request.includes(c.asset()))
                .cloned()
                .collect(),
        }
    }

    /// Sum of current amounts across all contracts for `asset`.
    pub fn total_current(&self, asset: &str) -> ModelResult<Decimal> {
        self.contracts
            .iter()
            .filter(|c| c.asset() == asset)
            .try_fold(Decimal::ZERO, |total, c| {
                total.checked_add(c.current_amount().value()?).ok_or_else(|| {
                    ModelError::invalid(
                        "current_amount",
                        format!("total for {} overflows a 28-digit decimal", asset),
                    )
                })
            })
    }
}

fn checked_difference(field: &'static str, minuend: &Amount, subtrahend: &Amount) -> ModelResult<Decimal> {
    minuend
        .value()?
        .checked_sub(subtrahend.value()?)
        .ok_or_else(|| ModelError::invalid(field, "difference overflows a 28-digit decimal"))
}

pub mod account;
pub mod common;
pub mod provider;
pub mod rates;

pub use account::{
    AccountLendingContracts, AccountRequest, AccountResponse, LendingContract,
    LendingContractParams,
};
pub use common::{Amount, Term, Time};
pub use provider::{AssetClass, LendingProvider, LendingProviderInfo};
pub use rates::{
    dedup_term_rates, LendingAssetRates, LendingRates, LendingTermAPR, RatesRequest,
    RatesResponse,
};

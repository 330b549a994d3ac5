//! Wire shapes for the indexer, simulator and oracle endpoints.
//!
//! Only the fields the router consumes are modelled; anything else in a
//! response is ignored.

use serde::{Deserialize, Serialize};

use stableswap_core::{
    amount_serde, Address, Allocation, Amount, Hop, SimulationResult, WithdrawSelection,
};

/// `GET {indexer}/pools`
///
/// Pools are kept as raw JSON so one malformed entry can be skipped without
/// failing the whole listing.
#[derive(Debug, Deserialize)]
pub struct PoolsResponse {
    pub pools: Vec<serde_json::Value>,
}

/// `GET {indexer}/hops`
#[derive(Debug, Deserialize)]
pub struct HopsResponse {
    pub hops: Vec<Hop>,
}

/// `POST {simulator}/simulate/swap`
#[derive(Debug, Deserialize)]
pub struct SwapSimulationResponse {
    pub results: Vec<SimulationResult>,
}

/// `POST {simulator}/simulate/deposit`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositSimulationBody<'a> {
    pub pool: &'a Address,
    pub allocations: &'a [Allocation],
}

/// `POST {simulator}/simulate/withdraw`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawSimulationBody<'a> {
    pub pool: &'a Address,
    #[serde(with = "amount_serde")]
    pub burn_lp_amount: Amount,
    pub selection: &'a WithdrawSelection,
}

/// Error envelope returned by the services on non-2xx responses
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(alias = "error")]
    pub message: String,
}

//! Simulation request/result shapes exchanged with the pool simulator and rate oracle

use serde::{Deserialize, Serialize};

use crate::pool::Hop;
use crate::types::{amount_serde, Address, Allocation, Amount, Asset};

/// Which side of a swap is fixed by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapMode {
    ExactIn,
    ExactOut,
}

/// Swap simulation request over one or more hops.
///
/// `amount` is the input of the first hop for `ExactIn`, the output of the last
/// hop for `ExactOut`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapSimulationRequest {
    pub mode: SwapMode,
    #[serde(with = "amount_serde")]
    pub amount: Amount,
    pub hops: Vec<Hop>,
}

/// Per-hop simulation outcome.
///
/// The computed side is `amount_out` for `ExactIn` results and `amount_in` for
/// `ExactOut` results; the other side echoes what the simulator was given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub mode: SwapMode,
    #[serde(with = "amount_serde")]
    pub amount_in: Amount,
    #[serde(with = "amount_serde")]
    pub amount_out: Amount,
    #[serde(default, with = "amount_serde::option")]
    pub virtual_price_before: Option<Amount>,
    #[serde(default, with = "amount_serde::option")]
    pub virtual_price_after: Option<Amount>,
}

impl SimulationResult {
    /// The amount the simulator computed for this hop
    pub fn computed_amount(&self) -> Amount {
        match self.mode {
            SwapMode::ExactIn => self.amount_out,
            SwapMode::ExactOut => self.amount_in,
        }
    }
}

/// Deposit simulation outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositSimulation {
    #[serde(with = "amount_serde")]
    pub lp_token_out: Amount,
    #[serde(with = "amount_serde")]
    pub lp_total_supply: Amount,
    #[serde(default, with = "amount_serde::option")]
    pub virtual_price_before: Option<Amount>,
    #[serde(default, with = "amount_serde::option")]
    pub virtual_price_after: Option<Amount>,
}

/// What a withdraw burns the LP asset into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", content = "asset", rename_all = "lowercase")]
pub enum WithdrawSelection {
    /// All value paid out in one member asset
    Single(Asset),
    /// Value paid out across all member assets in pool proportion
    Balanced,
}

/// Withdraw simulation outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawSimulation {
    pub amount_outs: Vec<Allocation>,
    #[serde(default, with = "amount_serde::option")]
    pub virtual_price_before: Option<Amount>,
    #[serde(default, with = "amount_serde::option")]
    pub virtual_price_after: Option<Amount>,
}

impl WithdrawSimulation {
    pub fn amount_of(&self, asset: &Asset) -> Option<Amount> {
        self.amount_outs
            .iter()
            .find(|a| a.asset == *asset)
            .map(|a| a.amount)
    }
}

/// Oracle-attested rate payload, passed through to the on-chain call untouched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedRatePayload {
    /// Pools the payload covers
    pub pools: Vec<Address>,
    /// Opaque signed payload (serialized cell)
    pub payload: String,
    /// Unix timestamp after which the signature is rejected on-chain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

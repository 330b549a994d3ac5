//! Router State Types
//!
//! Errors, nested call payloads, quotes and build results.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stableswap_core::{
    amount_serde, Address, Allocation, Amount, Asset, DepositSimulation, Hop, HopAction,
    SignedRatePayload, SimulationResult, SourceError, SwapMode, TypeError, WithdrawSelection,
    WithdrawSimulation,
};

/// Router errors. Every variant aborts the whole route/quote/compose pipeline.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("Pool not found: {0}")]
    PoolNotFound(Address),

    #[error("Route is empty")]
    EmptyRoute,

    #[error("No asset connects pool {from} to pool {to}")]
    NoValidConnection { from: Address, to: Address },

    #[error("Cannot classify {asset_in} -> {asset_out} in pool {pool}")]
    UndeterminedAction {
        pool: Address,
        asset_in: Asset,
        asset_out: Asset,
    },

    #[error("Invalid hop chain: {0}")]
    InvalidHopChain(String),

    #[error("Simulation returned {got} results for {expected} hops")]
    LengthMismatch { expected: usize, got: usize },

    #[error("Invalid simulation sequence: {0}")]
    InvalidSequence(String),

    #[error("Missing meta asset: {0}")]
    MissingMetaAsset(String),

    #[error("Missing meta allocation: {0}")]
    MissingMetaAllocation(String),

    #[error("Invalid withdraw target {pool}: {reason}")]
    InvalidWithdrawTarget { pool: Address, reason: String },

    #[error("Withdraw in pool {pool} must be the last hop")]
    WithdrawNotTerminal { pool: Address },

    #[error("Conflicting bounds: {0}")]
    ConflictingBounds(String),

    #[error("Amount in must be positive")]
    ZeroAmountIn,

    #[error("Amount out must be positive")]
    ZeroAmountOut,

    #[error("Asset in and asset out are both {0}")]
    SameAsset(Asset),

    #[error("Single-mode withdraw needs a withdraw asset or a next withdraw")]
    MissingWithdrawAsset,

    #[error("Duplicate asset in allocations: {0}")]
    DuplicateAsset(Asset),

    #[error("Asset {asset} is not a member of pool {pool}")]
    InvalidAsset { pool: Address, asset: Asset },

    #[error("Invalid intent: {0}")]
    InvalidIntent(String),

    #[error("Quoted amount in {amount_in} exceeds maximum {max_amount_in}")]
    BoundExceeded {
        amount_in: Amount,
        max_amount_in: Amount,
    },

    #[error("Hop {hop} produces no output")]
    InsufficientOutput { hop: usize },

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("Collaborator error: {0}")]
    Source(#[from] SourceError),
}

impl RouteError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PoolNotFound(_) => "pool_not_found",
            Self::EmptyRoute => "empty_route",
            Self::NoValidConnection { .. } => "no_valid_connection",
            Self::UndeterminedAction { .. } => "undetermined_action",
            Self::InvalidHopChain(_) => "invalid_hop_chain",
            Self::LengthMismatch { .. } => "length_mismatch",
            Self::InvalidSequence(_) => "invalid_sequence",
            Self::MissingMetaAsset(_) => "missing_meta_asset",
            Self::MissingMetaAllocation(_) => "missing_meta_allocation",
            Self::InvalidWithdrawTarget { .. } => "invalid_withdraw_target",
            Self::WithdrawNotTerminal { .. } => "withdraw_not_terminal",
            Self::ConflictingBounds(_) => "conflicting_bounds",
            Self::ZeroAmountIn => "zero_amount_in",
            Self::ZeroAmountOut => "zero_amount_out",
            Self::SameAsset(_) => "same_asset",
            Self::MissingWithdrawAsset => "missing_withdraw_asset",
            Self::DuplicateAsset(_) => "duplicate_asset",
            Self::InvalidAsset { .. } => "invalid_asset",
            Self::InvalidIntent(_) => "invalid_intent",
            Self::BoundExceeded { .. } => "bound_exceeded",
            Self::InsufficientOutput { .. } => "insufficient_output",
            Self::Type(e) => e.error_code(),
            Self::Source(e) => e.error_code(),
        }
    }
}

/// Result type alias for router operations
pub type Result<T> = std::result::Result<T, RouteError>;

// ---------------------------------------------------------------------------
// Nested call payloads
// ---------------------------------------------------------------------------

/// Operation to run after the current hop completes on-chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NextOp {
    Swap(SwapNext),
    Deposit(DepositNext),
    Withdraw(WithdrawNext),
}

impl NextOp {
    pub fn pool(&self) -> &Address {
        match self {
            Self::Swap(s) => &s.pool,
            Self::Deposit(d) => &d.pool,
            Self::Withdraw(w) => &w.pool,
        }
    }

    pub fn action(&self) -> HopAction {
        match self {
            Self::Swap(_) => HopAction::Swap,
            Self::Deposit(_) => HopAction::Deposit,
            Self::Withdraw(_) => HopAction::Withdraw,
        }
    }

    /// Nested continuation, if any
    pub fn next(&self) -> Option<&NextOp> {
        match self {
            Self::Swap(s) => s.next.as_deref(),
            Self::Deposit(d) => d.next.as_deref(),
            Self::Withdraw(_) => None,
        }
    }

    /// Number of operations in this chain, including self
    pub fn depth(&self) -> usize {
        1 + self.next().map_or(0, NextOp::depth)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapNext {
    pub pool: Address,
    pub asset_out: Asset,
    #[serde(default, with = "amount_serde::option")]
    pub min_amount_out: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Box<NextOp>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositNext {
    pub pool: Address,
    /// The member the previous hop does not forward, sent with amount zero.
    pub meta_allocation: Allocation,
    #[serde(default, with = "amount_serde::option")]
    pub min_lp_amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Box<NextOp>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawNext {
    pub pool: Address,
    pub selection: WithdrawSelection,
    #[serde(default)]
    pub min_amount_outs: Vec<Allocation>,
}

// ---------------------------------------------------------------------------
// Top-level call descriptor
// ---------------------------------------------------------------------------

/// What the top-level message asks the first pool to do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CallAction {
    Swap {
        #[serde(rename = "assetOut")]
        asset_out: Asset,
    },
    Deposit,
    Withdraw { selection: WithdrawSelection },
}

impl CallAction {
    pub fn hop_action(&self) -> HopAction {
        match self {
            Self::Swap { .. } => HopAction::Swap,
            Self::Deposit => HopAction::Deposit,
            Self::Withdraw { .. } => HopAction::Withdraw,
        }
    }
}

/// One top-level call, ready for the contract-call layer to serialize and submit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallDescriptor {
    pub target_pool: Address,
    pub action: CallAction,
    /// Assets sent with the message
    pub amounts: Vec<Allocation>,
    /// Minimum amounts the first pool must produce
    pub minimums: Vec<Allocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_rates: Option<SignedRatePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<NextOp>,
}

// ---------------------------------------------------------------------------
// Quotes and build results
// ---------------------------------------------------------------------------

/// Reconciled per-hop amounts for one hop chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainedQuote {
    pub mode: SwapMode,
    #[serde(with = "amount_serde")]
    pub amount_in: Amount,
    /// Output of each hop, in hop order
    pub amount_outs: Vec<Amount>,
    /// Per-hop floors from the explicit-bound pass, when one was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount_outs: Option<Vec<Amount>>,
    pub results: Vec<SimulationResult>,
}

impl ChainedQuote {
    pub fn amount_out(&self) -> Amount {
        self.amount_outs.last().copied().unwrap_or(0)
    }
}

/// Quote for a swap intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuote {
    pub hops: Vec<Hop>,
    #[serde(with = "amount_serde")]
    pub amount_in: Amount,
    #[serde(with = "amount_serde")]
    pub amount_out: Amount,
    pub amount_outs: Vec<Amount>,
    /// Per-hop minimum outputs (from slippage or an explicit bound)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_amount_outs: Option<Vec<Amount>>,
    pub results: Vec<SimulationResult>,
}

/// Build result for a swap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapPlan {
    pub quote: SwapQuote,
    pub call: CallDescriptor,
}

/// Build result for a deposit (optionally chained into a meta pool)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositPlan {
    /// LP minted by the first pool
    #[serde(with = "amount_serde")]
    pub lp_amount: Amount,
    /// LP minted by the meta pool, when chained
    #[serde(default, with = "amount_serde::option")]
    pub next_lp_amount: Option<Amount>,
    pub simulations: Vec<DepositSimulation>,
    pub call: CallDescriptor,
}

/// Build result for a withdraw (optionally chained into the base pool)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawPlan {
    /// Assets the caller ends up with
    pub amount_outs: Vec<Allocation>,
    pub simulations: Vec<WithdrawSimulation>,
    pub call: CallDescriptor,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::new(0, [n; 32])
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(RouteError::ZeroAmountIn.error_code(), "zero_amount_in");
        assert_eq!(
            RouteError::PoolNotFound(addr(1)).error_code(),
            "pool_not_found"
        );
        let err: RouteError = SourceError::Timeout { secs: 5 }.into();
        assert_eq!(err.error_code(), "source_timeout");
    }

    #[test]
    fn test_next_op_depth_and_serde() {
        let op = NextOp::Swap(SwapNext {
            pool: addr(1),
            asset_out: Asset::Jetton(addr(2)),
            min_amount_out: Some(10),
            next: Some(Box::new(NextOp::Withdraw(WithdrawNext {
                pool: addr(3),
                selection: WithdrawSelection::Single(Asset::Native),
                min_amount_outs: vec![],
            }))),
        });
        assert_eq!(op.depth(), 2);
        assert_eq!(op.action(), HopAction::Swap);
        assert_eq!(op.next().unwrap().pool(), &addr(3));

        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["type"], "swap");
        assert_eq!(json["minAmountOut"], "10");
        assert_eq!(json["next"]["type"], "withdraw");

        let parsed: NextOp = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, op);
    }
}

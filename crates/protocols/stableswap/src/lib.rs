//! Stableswap Router
//!
//! This crate resolves multi-hop routes across stableswap base and meta pools,
//! chains quotes through an external simulator, derives slippage bounds and
//! composes the nested call payloads the pools forward hop to hop.

pub mod calculator;
pub mod catalog;
pub mod composer;
pub mod intent;
pub mod quote;
pub mod router;
pub mod sdk;
pub mod state;

#[cfg(test)]
mod test_support;

// Re-exports
pub use calculator::{min_out, min_outs};
pub use catalog::PoolCatalog;
pub use composer::{
    compose_deposit_call, compose_next, compose_swap_call, compose_withdraw_call,
    counter_allocation, meta_allocation_for,
};
pub use intent::{
    DepositIntent, DepositParams, Guarantee, NextDeposit, NextWithdraw, NextWithdrawParams,
    SwapAmount, SwapIntent, SwapParams, WithdrawIntent, WithdrawMode, WithdrawParams,
};
pub use quote::{chain_quotes, quote_exact_in, quote_exact_out, PassQuote};
pub use router::{classify_action, resolve_hops, validate_hop_chain};
pub use sdk::StableswapSdk;
pub use state::{
    CallAction, CallDescriptor, ChainedQuote, DepositNext, DepositPlan, NextOp, RouteError,
    SwapNext, SwapPlan, SwapQuote, WithdrawNext, WithdrawPlan,
};

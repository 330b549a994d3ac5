//! Interfaces of the external collaborators
//!
//! The router only orchestrates call order and reconciles shapes; pool
//! discovery, AMM math and rate signing all live behind these traits.

use async_trait::async_trait;

use crate::errors::SourceError;
use crate::pool::{Hop, Pool};
use crate::simulation::{
    DepositSimulation, SignedRatePayload, SimulationResult, SwapSimulationRequest,
    WithdrawSelection, WithdrawSimulation,
};
use crate::types::{Address, Allocation, Amount, Asset};

/// Result type for collaborator calls
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Full-catalog pool metadata source
#[async_trait]
pub trait PoolSource: Send + Sync {
    async fn fetch_all_pools(&self) -> SourceResult<Vec<Pool>>;
}

/// Pre-resolved routes for callers that do not supply one
#[async_trait]
pub trait HopLookup: Send + Sync {
    async fn lookup_hops(&self, asset_in: &Asset, asset_out: &Asset) -> SourceResult<Vec<Hop>>;
}

/// AMM simulation service
#[async_trait]
pub trait PoolSimulator: Send + Sync {
    /// Returns one result per hop in `request.hops`.
    async fn simulate_swap(
        &self,
        request: &SwapSimulationRequest,
    ) -> SourceResult<Vec<SimulationResult>>;

    async fn simulate_deposit(
        &self,
        pool: &Pool,
        allocations: &[Allocation],
    ) -> SourceResult<DepositSimulation>;

    async fn simulate_withdraw(
        &self,
        pool: &Pool,
        burn_lp_amount: Amount,
        selection: &WithdrawSelection,
    ) -> SourceResult<WithdrawSimulation>;
}

/// Signed-rate oracle for pools priced from external rate feeds
#[async_trait]
pub trait RateOracle: Send + Sync {
    async fn get_signed_rates(&self, pools: &[Address]) -> SourceResult<SignedRatePayload>;
}

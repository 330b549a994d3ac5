//! Shared fixtures and in-memory collaborators for unit tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use stableswap_core::{
    Address, Allocation, Amount, Asset, DepositSimulation, Hop, HopLookup, Pool, PoolKind,
    PoolSimulator, PoolSource, RateOracle, SignedRatePayload, SimulationResult, SourceError,
    SourceResult, SwapMode, SwapSimulationRequest, WithdrawSelection, WithdrawSimulation,
};

pub const VIRTUAL_PRICE: Amount = 1_000_000_000_000_000_000;

pub fn addr(n: u8) -> Address {
    Address::new(0, [n; 32])
}

pub fn token(n: u8) -> Asset {
    Asset::Jetton(addr(n))
}

pub fn base_pool(n: u8, assets: Vec<Asset>) -> Pool {
    Pool::new(addr(n), PoolKind::Base, assets, false).unwrap()
}

pub fn rated_pool(n: u8, assets: Vec<Asset>) -> Pool {
    Pool::new(addr(n), PoolKind::Base, assets, true).unwrap()
}

pub fn meta_pool(n: u8, base_n: u8, assets: Vec<Asset>) -> Pool {
    Pool::new(
        addr(n),
        PoolKind::Meta {
            base_pool: addr(base_n),
        },
        assets,
        false,
    )
    .unwrap()
}

pub fn exact_in_result(amount_in: Amount, amount_out: Amount) -> SimulationResult {
    SimulationResult {
        mode: SwapMode::ExactIn,
        amount_in,
        amount_out,
        virtual_price_before: None,
        virtual_price_after: None,
    }
}

pub fn exact_out_result(amount_in: Amount, amount_out: Amount) -> SimulationResult {
    SimulationResult {
        mode: SwapMode::ExactOut,
        amount_in,
        amount_out,
        virtual_price_before: None,
        virtual_price_after: None,
    }
}

fn scripted_error(what: &str) -> SourceError {
    SourceError::Api {
        status: 500,
        message: format!("no scripted {}", what),
    }
}

// ---------------------------------------------------------------------------
// Pool source
// ---------------------------------------------------------------------------

pub struct FakePoolSource {
    pools: Mutex<Vec<Pool>>,
    fetches: AtomicUsize,
    fail_next: AtomicBool,
}

impl FakePoolSource {
    pub fn new(pools: Vec<Pool>) -> Self {
        Self {
            pools: Mutex::new(pools),
            fetches: AtomicUsize::new(0),
            fail_next: AtomicBool::new(false),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn set_pools(&self, pools: Vec<Pool>) {
        *self.pools.lock().unwrap() = pools;
    }

    pub fn fail_next_fetch(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PoolSource for FakePoolSource {
    async fn fetch_all_pools(&self) -> SourceResult<Vec<Pool>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(SourceError::Unreachable {
                url: "fake://pools".to_string(),
                message: "connection refused".to_string(),
            });
        }
        Ok(self.pools.lock().unwrap().clone())
    }
}

// ---------------------------------------------------------------------------
// Hop lookup
// ---------------------------------------------------------------------------

pub struct FakeHopLookup {
    hops: Vec<Hop>,
    calls: AtomicUsize,
}

impl FakeHopLookup {
    pub fn new(hops: Vec<Hop>) -> Self {
        Self {
            hops,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HopLookup for FakeHopLookup {
    async fn lookup_hops(&self, _asset_in: &Asset, _asset_out: &Asset) -> SourceResult<Vec<Hop>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.hops.clone())
    }
}

// ---------------------------------------------------------------------------
// Simulators
// ---------------------------------------------------------------------------

/// Constant-product simulator with equal reserves of `liquidity` on every
/// hop and no fee. Deposits mint LP 1:1; withdraws pay out 1:1.
pub struct CurveSimulator {
    liquidity: Amount,
    swap_calls: AtomicUsize,
    fail_swaps_from: AtomicUsize,
    deposits: Mutex<Vec<(Address, Vec<Allocation>)>>,
    withdraws: Mutex<Vec<(Address, Amount, WithdrawSelection)>>,
}

impl CurveSimulator {
    pub fn with_liquidity(liquidity: Amount) -> Self {
        Self {
            liquidity,
            swap_calls: AtomicUsize::new(0),
            fail_swaps_from: AtomicUsize::new(usize::MAX),
            deposits: Mutex::new(Vec::new()),
            withdraws: Mutex::new(Vec::new()),
        }
    }

    pub fn swap_calls(&self) -> usize {
        self.swap_calls.load(Ordering::SeqCst)
    }

    /// Fail every swap simulation from the `call`-th one on (1-based).
    pub fn fail_swaps_from(&self, call: usize) {
        self.fail_swaps_from.store(call, Ordering::SeqCst);
    }

    pub fn deposits(&self) -> Vec<(Address, Vec<Allocation>)> {
        self.deposits.lock().unwrap().clone()
    }

    pub fn withdraws(&self) -> Vec<(Address, Amount, WithdrawSelection)> {
        self.withdraws.lock().unwrap().clone()
    }

    fn out_given_in(&self, amount_in: Amount) -> Amount {
        self.liquidity * amount_in / (self.liquidity + amount_in)
    }

    fn in_given_out(&self, amount_out: Amount) -> SourceResult<Amount> {
        if amount_out >= self.liquidity {
            return Err(SourceError::Api {
                status: 422,
                message: "insufficient liquidity".to_string(),
            });
        }
        let numerator = self.liquidity * amount_out;
        let denominator = self.liquidity - amount_out;
        Ok(numerator.div_ceil(denominator))
    }
}

#[async_trait]
impl PoolSimulator for CurveSimulator {
    async fn simulate_swap(
        &self,
        request: &SwapSimulationRequest,
    ) -> SourceResult<Vec<SimulationResult>> {
        let call = self.swap_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call >= self.fail_swaps_from.load(Ordering::SeqCst) {
            return Err(SourceError::Unreachable {
                url: "fake://simulator".to_string(),
                message: "connection reset".to_string(),
            });
        }
        match request.mode {
            SwapMode::ExactIn => {
                let mut amount = request.amount;
                let mut results = Vec::new();
                for _ in &request.hops {
                    let out = self.out_given_in(amount);
                    results.push(exact_in_result(amount, out));
                    amount = out;
                }
                Ok(results)
            }
            SwapMode::ExactOut => {
                let mut amount = request.amount;
                let mut results = Vec::new();
                for _ in &request.hops {
                    let amount_in = self.in_given_out(amount)?;
                    results.push(exact_out_result(amount_in, amount));
                    amount = amount_in;
                }
                results.reverse();
                Ok(results)
            }
        }
    }

    async fn simulate_deposit(
        &self,
        pool: &Pool,
        allocations: &[Allocation],
    ) -> SourceResult<DepositSimulation> {
        self.deposits
            .lock()
            .unwrap()
            .push((*pool.address(), allocations.to_vec()));
        let minted: Amount = allocations.iter().map(|a| a.amount).sum();
        Ok(DepositSimulation {
            lp_token_out: minted,
            lp_total_supply: self.liquidity + minted,
            virtual_price_before: Some(VIRTUAL_PRICE),
            virtual_price_after: Some(VIRTUAL_PRICE),
        })
    }

    async fn simulate_withdraw(
        &self,
        pool: &Pool,
        burn_lp_amount: Amount,
        selection: &WithdrawSelection,
    ) -> SourceResult<WithdrawSimulation> {
        self.withdraws
            .lock()
            .unwrap()
            .push((*pool.address(), burn_lp_amount, *selection));
        let amount_outs = match selection {
            WithdrawSelection::Single(asset) => vec![Allocation::new(*asset, burn_lp_amount)],
            WithdrawSelection::Balanced => {
                let share = burn_lp_amount / pool.assets().len() as Amount;
                pool.assets()
                    .iter()
                    .map(|asset| Allocation::new(*asset, share))
                    .collect()
            }
        };
        Ok(WithdrawSimulation {
            amount_outs,
            virtual_price_before: Some(VIRTUAL_PRICE),
            virtual_price_after: Some(VIRTUAL_PRICE),
        })
    }
}

/// Replays canned swap responses in order
pub struct ScriptedSimulator {
    responses: Mutex<VecDeque<Vec<SimulationResult>>>,
    swap_calls: AtomicUsize,
}

impl ScriptedSimulator {
    pub fn new(responses: Vec<Vec<SimulationResult>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            swap_calls: AtomicUsize::new(0),
        }
    }

    pub fn swap_calls(&self) -> usize {
        self.swap_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PoolSimulator for ScriptedSimulator {
    async fn simulate_swap(
        &self,
        _request: &SwapSimulationRequest,
    ) -> SourceResult<Vec<SimulationResult>> {
        self.swap_calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| scripted_error("swap"))
    }

    async fn simulate_deposit(
        &self,
        _pool: &Pool,
        _allocations: &[Allocation],
    ) -> SourceResult<DepositSimulation> {
        Err(scripted_error("deposit"))
    }

    async fn simulate_withdraw(
        &self,
        _pool: &Pool,
        _burn_lp_amount: Amount,
        _selection: &WithdrawSelection,
    ) -> SourceResult<WithdrawSimulation> {
        Err(scripted_error("withdraw"))
    }
}

// ---------------------------------------------------------------------------
// Rate oracle
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeOracle {
    requests: Mutex<Vec<Vec<Address>>>,
    fail_next: AtomicBool,
}

impl FakeOracle {
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<Vec<Address>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RateOracle for FakeOracle {
    async fn get_signed_rates(&self, pools: &[Address]) -> SourceResult<SignedRatePayload> {
        self.requests.lock().unwrap().push(pools.to_vec());
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(SourceError::Timeout { secs: 30 });
        }
        Ok(SignedRatePayload {
            pools: pools.to_vec(),
            payload: "b5ee9c72".to_string(),
            expires_at: Some(1_700_000_000),
        })
    }
}

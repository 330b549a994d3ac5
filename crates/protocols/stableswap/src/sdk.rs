//! SDK facade
//!
//! Ties the catalog, router, quote chainer, slippage engine and composer
//! together behind the five request-level operations.

use std::sync::Arc;

use stableswap_api_client::ApiClient;
use stableswap_core::{
    Address, Allocation, ApiConfig, Hop, HopLookup, Pool, PoolSimulator, PoolSource,
    RateOracle, SignedRatePayload, Slippage, WithdrawSelection,
};

use crate::calculator::{min_out, min_outs};
use crate::catalog::PoolCatalog;
use crate::composer::{
    compose_deposit_call, compose_swap_call, compose_withdraw_call, meta_allocation_for,
};
use crate::intent::{DepositIntent, Guarantee, SwapIntent, WithdrawIntent};
use crate::quote::chain_quotes;
use crate::router::{resolve_hops, validate_hop_chain};
use crate::state::{
    ChainedQuote, DepositNext, DepositPlan, Result, RouteError, SwapPlan, SwapQuote, WithdrawNext,
    WithdrawPlan,
};

/// Entry point for routing, quoting and building stableswap operations
pub struct StableswapSdk {
    catalog: PoolCatalog,
    hop_lookup: Arc<dyn HopLookup>,
    simulator: Arc<dyn PoolSimulator>,
    oracle: Arc<dyn RateOracle>,
}

impl StableswapSdk {
    pub fn new(
        pool_source: Arc<dyn PoolSource>,
        hop_lookup: Arc<dyn HopLookup>,
        simulator: Arc<dyn PoolSimulator>,
        oracle: Arc<dyn RateOracle>,
    ) -> Self {
        Self {
            catalog: PoolCatalog::new(pool_source),
            hop_lookup,
            simulator,
            oracle,
        }
    }

    /// Use one backend for all four collaborators.
    pub fn with_backend<B>(backend: Arc<B>) -> Self
    where
        B: PoolSource + HopLookup + PoolSimulator + RateOracle + 'static,
    {
        Self::new(backend.clone(), backend.clone(), backend.clone(), backend)
    }

    /// Build an SDK backed by the HTTP services in `config`.
    pub fn connect(config: ApiConfig) -> Result<Self> {
        let client = ApiClient::new(config)?;
        Ok(Self::with_backend(Arc::new(client)))
    }

    pub fn catalog(&self) -> &PoolCatalog {
        &self.catalog
    }

    // -----------------------------------------------------------------------
    // Swap
    // -----------------------------------------------------------------------

    /// Hops for a swap: from the caller's route via the catalog, otherwise
    /// from the hop lookup service.
    pub async fn resolve_route(&self, intent: &SwapIntent) -> Result<Vec<Hop>> {
        match intent.route() {
            Some(route) => {
                let pools = self.catalog.get_pools(route).await?;
                resolve_hops(&pools, intent.asset_in(), intent.asset_out())
            }
            None => {
                let hops = self
                    .hop_lookup
                    .lookup_hops(intent.asset_in(), intent.asset_out())
                    .await?;
                validate_hop_chain(&hops, intent.asset_in(), intent.asset_out())?;
                Ok(hops)
            }
        }
    }

    pub async fn quote_swap(&self, intent: &SwapIntent) -> Result<SwapQuote> {
        let hops = self.resolve_route(intent).await?;
        self.quote_hops(hops, intent).await
    }

    /// Quote and compose the top-level call. Signed rates are fetched
    /// alongside the quote when any pool on the route prices from them.
    pub async fn build_swap(&self, intent: &SwapIntent) -> Result<SwapPlan> {
        let hops = self.resolve_route(intent).await?;
        let rated = rated_pools(hops.iter().map(|hop| &hop.pool));

        let (quote, signed_rates) =
            tokio::try_join!(self.quote_hops(hops, intent), self.signed_rates(&rated))?;

        let call = compose_swap_call(
            &quote.hops,
            quote.amount_in,
            quote.min_amount_outs.as_deref(),
            intent.recipient().copied(),
            signed_rates,
        )?;

        tracing::debug!(
            target_pool = %call.target_pool,
            hops = quote.hops.len(),
            amount_in = %quote.amount_in,
            amount_out = %quote.amount_out,
            "Swap built"
        );

        Ok(SwapPlan { quote, call })
    }

    async fn quote_hops(&self, hops: Vec<Hop>, intent: &SwapIntent) -> Result<SwapQuote> {
        let chained = chain_quotes(self.simulator.as_ref(), &hops, intent).await?;
        Ok(into_swap_quote(hops, chained, intent.guarantee()))
    }

    async fn signed_rates(&self, pools: &[Address]) -> Result<Option<SignedRatePayload>> {
        if pools.is_empty() {
            return Ok(None);
        }
        let payload = self.oracle.get_signed_rates(pools).await?;
        tracing::debug!("Fetched signed rates for {} pools", pools.len());
        Ok(Some(payload))
    }

    // -----------------------------------------------------------------------
    // Deposit
    // -----------------------------------------------------------------------

    pub async fn build_deposit(&self, intent: &DepositIntent) -> Result<DepositPlan> {
        let mut addresses = vec![*intent.pool()];
        if let Some(next) = intent.next() {
            addresses.push(next.pool);
        }
        let pools = self.catalog.get_pools(&addresses).await?;
        let pool = &pools[0];

        for allocation in intent.allocations() {
            if !pool.is_member(&allocation.asset) {
                return Err(RouteError::InvalidAsset {
                    pool: *pool.address(),
                    asset: allocation.asset,
                });
            }
        }

        let next = match (intent.next(), pools.get(1)) {
            (Some(next), Some(meta)) => {
                let allocation = linked_meta_allocation(pool, meta, next.meta_allocation.clone())?;
                Some((meta, allocation))
            }
            _ => None,
        };

        let rated = rated_pools(pools.iter());
        let (first, signed_rates) = tokio::try_join!(
            async {
                self.simulator
                    .simulate_deposit(pool, intent.allocations())
                    .await
                    .map_err(RouteError::from)
            },
            self.signed_rates(&rated)
        )?;
        if first.lp_token_out == 0 {
            return Err(RouteError::InsufficientOutput { hop: 0 });
        }

        let slippage = intent.slippage();
        let min_lp = slippage.map(|s| min_out(first.lp_token_out, s));

        let mut simulations = vec![first.clone()];
        let mut next_lp_amount = None;
        let mut next_op = None;

        if let Some((meta, meta_allocation)) = next {
            let meta_allocations = [
                Allocation::new(pool.lp_asset(), first.lp_token_out),
                meta_allocation.clone(),
            ];
            let second = self
                .simulator
                .simulate_deposit(meta, &meta_allocations)
                .await?;
            if second.lp_token_out == 0 {
                return Err(RouteError::InsufficientOutput { hop: 1 });
            }

            next_lp_amount = Some(second.lp_token_out);
            next_op = Some(DepositNext {
                pool: *meta.address(),
                meta_allocation,
                min_lp_amount: slippage.map(|s| min_out(second.lp_token_out, s)),
                next: None,
            });
            simulations.push(second);
        }

        let call = compose_deposit_call(
            pool,
            intent.allocations(),
            min_lp,
            next_op,
            intent.recipient().copied(),
            signed_rates,
        );

        tracing::debug!(
            pool = %pool.address(),
            lp_amount = %first.lp_token_out,
            chained = next_lp_amount.is_some(),
            "Deposit built"
        );

        Ok(DepositPlan {
            lp_amount: first.lp_token_out,
            next_lp_amount,
            simulations,
            call,
        })
    }

    // -----------------------------------------------------------------------
    // Withdraw
    // -----------------------------------------------------------------------

    pub async fn build_withdraw(&self, intent: &WithdrawIntent) -> Result<WithdrawPlan> {
        let mut addresses = vec![*intent.pool()];
        if let Some(next) = intent.next() {
            addresses.push(next.pool);
        }
        let pools = self.catalog.get_pools(&addresses).await?;
        let pool = &pools[0];

        let base = match (intent.next(), pools.get(1)) {
            (Some(next), Some(base)) => {
                ensure_base_of(pool, base)?;
                ensure_selectable(base, &next.selection)?;
                Some((base, next.selection))
            }
            _ => {
                ensure_selectable(pool, intent.selection())?;
                None
            }
        };

        let rated = rated_pools(pools.iter());
        let (first, signed_rates) = tokio::try_join!(
            async {
                self.simulator
                    .simulate_withdraw(pool, intent.burn_lp_amount(), intent.selection())
                    .await
                    .map_err(RouteError::from)
            },
            self.signed_rates(&rated)
        )?;

        let slippage = intent.slippage();
        let minimums = allocation_floors(&first.amount_outs, slippage);
        let mut simulations = vec![first.clone()];
        let mut amount_outs = first.amount_outs.clone();
        let mut next_op = None;

        if let Some((base, selection)) = base {
            let base_lp = base.lp_asset();
            let base_lp_amount = first
                .amount_of(&base_lp)
                .filter(|amount| *amount > 0)
                .ok_or(RouteError::InsufficientOutput { hop: 0 })?;

            let second = self
                .simulator
                .simulate_withdraw(base, base_lp_amount, &selection)
                .await?;

            amount_outs.retain(|a| a.asset != base_lp);
            amount_outs = merge_allocations(amount_outs, &second.amount_outs);
            next_op = Some(WithdrawNext {
                pool: *base.address(),
                selection,
                min_amount_outs: allocation_floors(&second.amount_outs, slippage),
            });
            simulations.push(second);
        }

        let call = compose_withdraw_call(
            pool,
            intent.burn_lp_amount(),
            *intent.selection(),
            minimums,
            next_op,
            intent.recipient().copied(),
            signed_rates,
        );

        tracing::debug!(
            pool = %pool.address(),
            burn = %intent.burn_lp_amount(),
            outputs = amount_outs.len(),
            "Withdraw built"
        );

        Ok(WithdrawPlan {
            amount_outs,
            simulations,
            call,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn into_swap_quote(
    hops: Vec<Hop>,
    chained: ChainedQuote,
    guarantee: Option<&Guarantee>,
) -> SwapQuote {
    let amount_out = chained.amount_out();
    let min_amount_outs = match guarantee {
        Some(Guarantee::Slippage(tolerance)) => Some(min_outs(&chained.amount_outs, tolerance)),
        _ => chained.min_amount_outs,
    };

    SwapQuote {
        hops,
        amount_in: chained.amount_in,
        amount_out,
        amount_outs: chained.amount_outs,
        min_amount_outs,
        results: chained.results,
    }
}

/// Addresses of pools that need oracle-signed rates, deduplicated in order
fn rated_pools<'a>(pools: impl Iterator<Item = &'a Pool>) -> Vec<Address> {
    let mut rated: Vec<Address> = Vec::new();
    for pool in pools.filter(|pool| pool.use_rates()) {
        if !rated.contains(pool.address()) {
            rated.push(*pool.address());
        }
    }
    rated
}

/// Meta allocation for a deposit continuing from `pool` into `meta`.
fn linked_meta_allocation(
    pool: &Pool,
    meta: &Pool,
    supplied: Option<Allocation>,
) -> Result<Allocation> {
    if meta.base_pool() != Some(pool.address()) {
        return Err(RouteError::MissingMetaAsset(format!(
            "pool {} is not a meta pool over {}",
            meta.address(),
            pool.address()
        )));
    }

    match supplied {
        None => meta_allocation_for(meta),
        Some(allocation)
            if allocation.asset != pool.lp_asset() && meta.is_member(&allocation.asset) =>
        {
            Ok(allocation)
        }
        Some(allocation) => Err(RouteError::MissingMetaAllocation(format!(
            "{} is not the meta asset of pool {}",
            allocation.asset,
            meta.address()
        ))),
    }
}

fn ensure_base_of(pool: &Pool, base: &Pool) -> Result<()> {
    if !base.is_base() {
        return Err(RouteError::InvalidWithdrawTarget {
            pool: *base.address(),
            reason: "not a base pool".to_string(),
        });
    }
    if pool.base_pool() != Some(base.address()) {
        return Err(RouteError::InvalidWithdrawTarget {
            pool: *base.address(),
            reason: format!("not the base pool of {}", pool.address()),
        });
    }
    Ok(())
}

fn ensure_selectable(pool: &Pool, selection: &WithdrawSelection) -> Result<()> {
    match selection {
        WithdrawSelection::Single(asset) if !pool.is_member(asset) => Err(RouteError::InvalidAsset {
            pool: *pool.address(),
            asset: *asset,
        }),
        _ => Ok(()),
    }
}

fn allocation_floors(outs: &[Allocation], slippage: Option<&Slippage>) -> Vec<Allocation> {
    match slippage {
        Some(tolerance) => outs
            .iter()
            .map(|a| Allocation::new(a.asset, min_out(a.amount, tolerance)))
            .collect(),
        None => Vec::new(),
    }
}

/// Append `more` to `outs`, summing amounts of assets already present.
fn merge_allocations(mut outs: Vec<Allocation>, more: &[Allocation]) -> Vec<Allocation> {
    for allocation in more {
        match outs.iter_mut().find(|a| a.asset == allocation.asset) {
            Some(existing) => existing.amount = existing.amount.saturating_add(allocation.amount),
            None => outs.push(allocation.clone()),
        }
    }
    outs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::{
        DepositParams, NextDeposit, NextWithdrawParams, SwapParams, WithdrawMode, WithdrawParams,
    };
    use crate::state::{CallAction, NextOp};
    use crate::test_support::{
        addr, base_pool, meta_pool, rated_pool, token, CurveSimulator, FakeHopLookup,
        FakeOracle, FakePoolSource,
    };
    use stableswap_core::{Asset, HopAction, SourceError};

    // A: base [TON, B]; M: meta over A [A.lp, D]; X: base [TON, B, C]; R: rated base [B, E]

    fn pools() -> Vec<Pool> {
        vec![
            base_pool(1, vec![Asset::Native, token(2)]),
            meta_pool(3, 1, vec![token(1), token(4)]),
            base_pool(5, vec![Asset::Native, token(2), token(6)]),
            rated_pool(7, vec![token(2), token(8)]),
        ]
    }

    struct Harness {
        sdk: StableswapSdk,
        source: Arc<FakePoolSource>,
        lookup: Arc<FakeHopLookup>,
        simulator: Arc<CurveSimulator>,
        oracle: Arc<FakeOracle>,
    }

    fn harness(lookup_hops: Vec<Hop>) -> Harness {
        let source = Arc::new(FakePoolSource::new(pools()));
        let lookup = Arc::new(FakeHopLookup::new(lookup_hops));
        let simulator = Arc::new(CurveSimulator::with_liquidity(1_000_000_000_000_000));
        let oracle = Arc::new(FakeOracle::default());
        let sdk = StableswapSdk::new(
            source.clone(),
            lookup.clone(),
            simulator.clone(),
            oracle.clone(),
        );
        Harness {
            sdk,
            source,
            lookup,
            simulator,
            oracle,
        }
    }

    fn bps(n: u64) -> Slippage {
        Slippage::from_bps(n).unwrap()
    }

    // -- Route resolution --

    #[tokio::test]
    async fn test_explicit_route_goes_through_catalog() {
        let h = harness(vec![]);
        let intent = SwapParams::exact_in(Asset::Native, token(4), 1_000)
            .route(vec![addr(1), addr(3)])
            .build()
            .unwrap();

        let hops = h.sdk.resolve_route(&intent).await.unwrap();
        assert_eq!(hops.len(), 2);
        assert_eq!(hops[0].action, HopAction::Deposit);
        assert_eq!(h.source.fetch_count(), 1);
        assert_eq!(h.lookup.calls(), 0);
    }

    #[tokio::test]
    async fn test_lookup_hops_are_validated() {
        let x = pools().remove(2);
        let good = resolve_hops(&[x.clone()], &Asset::Native, &token(2)).unwrap();
        let h = harness(good);
        let intent = SwapParams::exact_in(Asset::Native, token(2), 1_000)
            .build()
            .unwrap();
        assert_eq!(h.sdk.resolve_route(&intent).await.unwrap().len(), 1);
        assert_eq!(h.lookup.calls(), 1);
        assert_eq!(h.source.fetch_count(), 0);

        let wrong_end = resolve_hops(&[x], &Asset::Native, &token(6)).unwrap();
        let h = harness(wrong_end);
        let err = h.sdk.resolve_route(&intent).await.unwrap_err();
        assert!(matches!(err, RouteError::InvalidHopChain(_)));
    }

    #[tokio::test]
    async fn test_unknown_pool_in_route() {
        let h = harness(vec![]);
        let intent = SwapParams::exact_in(Asset::Native, token(2), 1_000)
            .route(vec![addr(9)])
            .build()
            .unwrap();
        let err = h.sdk.quote_swap(&intent).await.unwrap_err();
        assert!(matches!(err, RouteError::PoolNotFound(a) if a == addr(9)));
    }

    // -- Swap --

    #[tokio::test]
    async fn test_quote_applies_slippage_per_hop() {
        let h = harness(vec![]);
        let intent = SwapParams::exact_in(Asset::Native, token(4), 1_000_000_000)
            .route(vec![addr(1), addr(3)])
            .slippage(bps(50))
            .build()
            .unwrap();

        let quote = h.sdk.quote_swap(&intent).await.unwrap();
        assert_eq!(quote.amount_in, 1_000_000_000);
        assert_eq!(quote.amount_out, quote.amount_outs[1]);
        assert_eq!(
            quote.min_amount_outs,
            Some(min_outs(&quote.amount_outs, &bps(50)))
        );
    }

    #[tokio::test]
    async fn test_exact_out_quote_with_max_bound() {
        let h = harness(vec![]);
        let intent = SwapParams::exact_out(Asset::Native, token(2), 1_000_000)
            .route(vec![addr(5)])
            .max_amount_in(1_100_000)
            .build()
            .unwrap();

        let quote = h.sdk.quote_swap(&intent).await.unwrap();
        assert!(quote.amount_in > 1_000_000 && quote.amount_in <= 1_100_000);
        assert_eq!(quote.amount_out, 1_000_000);
        assert_eq!(quote.min_amount_outs, Some(vec![1_000_000]));
    }

    #[tokio::test]
    async fn test_build_swap_composes_tail() {
        let h = harness(vec![]);
        let intent = SwapParams::exact_in(Asset::Native, token(4), 1_000_000)
            .route(vec![addr(1), addr(3)])
            .slippage(bps(100))
            .recipient(addr(42))
            .build()
            .unwrap();

        let plan = h.sdk.build_swap(&intent).await.unwrap();
        let mins = plan.quote.min_amount_outs.clone().unwrap();

        assert_eq!(plan.call.target_pool, addr(1));
        assert_eq!(plan.call.action, CallAction::Deposit);
        assert_eq!(plan.call.minimums, vec![Allocation::new(token(1), mins[0])]);
        assert_eq!(plan.call.recipient, Some(addr(42)));
        assert!(plan.call.signed_rates.is_none());
        assert_eq!(h.oracle.calls(), 0);

        match plan.call.next {
            Some(NextOp::Swap(next)) => {
                assert_eq!(next.pool, addr(3));
                assert_eq!(next.asset_out, token(4));
                assert_eq!(next.min_amount_out, Some(mins[1]));
            }
            other => panic!("unexpected next: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_build_swap_attaches_signed_rates() {
        let h = harness(vec![]);
        let intent = SwapParams::exact_in(Asset::Native, token(8), 1_000_000)
            .route(vec![addr(5), addr(7)])
            .build()
            .unwrap();

        let plan = h.sdk.build_swap(&intent).await.unwrap();
        assert_eq!(h.oracle.requests(), vec![vec![addr(7)]]);
        assert_eq!(plan.call.signed_rates.unwrap().pools, vec![addr(7)]);
        assert!(plan.quote.min_amount_outs.is_none());
        assert!(plan.call.minimums.is_empty());
    }

    #[tokio::test]
    async fn test_simulator_failure_mid_chain_aborts_build() {
        let h = harness(vec![]);
        h.simulator.fail_swaps_from(2);
        let intent = SwapParams::exact_in(Asset::Native, token(4), 1_000_000)
            .route(vec![addr(1), addr(3)])
            .slippage(bps(50))
            .build()
            .unwrap();

        let err = h.sdk.build_swap(&intent).await.unwrap_err();
        assert!(matches!(
            err,
            RouteError::Source(SourceError::Unreachable { .. })
        ));
        assert_eq!(h.simulator.swap_calls(), 2);

        let err = h.sdk.quote_swap(&intent).await.unwrap_err();
        assert!(matches!(err, RouteError::Source(_)));
    }

    #[tokio::test]
    async fn test_oracle_failure_aborts_build() {
        let h = harness(vec![]);
        h.oracle.fail_next();
        let intent = SwapParams::exact_in(Asset::Native, token(8), 1_000_000)
            .route(vec![addr(5), addr(7)])
            .build()
            .unwrap();

        let err = h.sdk.build_swap(&intent).await.unwrap_err();
        assert!(matches!(
            err,
            RouteError::Source(SourceError::Timeout { secs: 30 })
        ));
        assert_eq!(h.oracle.calls(), 1);

        // The failure is not sticky
        assert!(h.sdk.build_swap(&intent).await.is_ok());
    }

    // -- Deposit --

    fn deposit(allocations: Vec<Allocation>, next: Option<NextDeposit>) -> DepositParams {
        DepositParams {
            pool: addr(1),
            allocations,
            next,
            slippage: Some(bps(100)),
            recipient: None,
        }
    }

    #[tokio::test]
    async fn test_chained_deposit_links_meta_pool() {
        let h = harness(vec![]);
        let intent = deposit(
            vec![
                Allocation::new(Asset::Native, 600),
                Allocation::new(token(2), 400),
            ],
            Some(NextDeposit {
                pool: addr(3),
                meta_allocation: None,
            }),
        )
        .build()
        .unwrap();

        let plan = h.sdk.build_deposit(&intent).await.unwrap();
        assert_eq!(plan.lp_amount, 1_000);
        assert_eq!(plan.next_lp_amount, Some(1_000));
        assert_eq!(plan.simulations.len(), 2);

        let deposits = h.simulator.deposits();
        assert_eq!(deposits[1].0, addr(3));
        assert_eq!(
            deposits[1].1,
            vec![Allocation::new(token(1), 1_000), Allocation::new(token(4), 0)]
        );

        assert_eq!(plan.call.minimums, vec![Allocation::new(token(1), 990)]);
        match plan.call.next {
            Some(NextOp::Deposit(next)) => {
                assert_eq!(next.pool, addr(3));
                assert_eq!(next.meta_allocation, Allocation::new(token(4), 0));
                assert_eq!(next.min_lp_amount, Some(990));
            }
            other => panic!("unexpected next: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_deposit_into_unlinked_pool() {
        let h = harness(vec![]);
        let intent = deposit(
            vec![Allocation::new(Asset::Native, 600)],
            Some(NextDeposit {
                pool: addr(5),
                meta_allocation: None,
            }),
        )
        .build()
        .unwrap();

        let err = h.sdk.build_deposit(&intent).await.unwrap_err();
        assert!(matches!(err, RouteError::MissingMetaAsset(_)));
        assert!(h.simulator.deposits().is_empty());
    }

    #[tokio::test]
    async fn test_deposit_rejects_foreign_assets() {
        let h = harness(vec![]);
        let intent = deposit(vec![Allocation::new(token(6), 10)], None)
            .build()
            .unwrap();
        let err = h.sdk.build_deposit(&intent).await.unwrap_err();
        assert!(matches!(err, RouteError::InvalidAsset { asset, .. } if asset == token(6)));

        let intent = deposit(
            vec![Allocation::new(Asset::Native, 10)],
            Some(NextDeposit {
                pool: addr(3),
                meta_allocation: Some(Allocation::new(token(1), 5)),
            }),
        )
        .build()
        .unwrap();
        let err = h.sdk.build_deposit(&intent).await.unwrap_err();
        assert!(matches!(err, RouteError::MissingMetaAllocation(_)));
    }

    #[tokio::test]
    async fn test_supplied_meta_allocation_is_kept() {
        let h = harness(vec![]);
        let intent = deposit(
            vec![Allocation::new(Asset::Native, 10)],
            Some(NextDeposit {
                pool: addr(3),
                meta_allocation: Some(Allocation::new(token(4), 5)),
            }),
        )
        .build()
        .unwrap();

        let plan = h.sdk.build_deposit(&intent).await.unwrap();
        assert_eq!(plan.next_lp_amount, Some(15));
    }

    // -- Withdraw --

    fn withdraw_into_base(base: Address) -> WithdrawParams {
        WithdrawParams {
            pool: addr(3),
            burn_lp_amount: 1_000,
            mode: WithdrawMode::Single,
            withdraw_asset: None,
            next: Some(NextWithdrawParams {
                pool: base,
                mode: WithdrawMode::Single,
                withdraw_asset: Some(Asset::Native),
            }),
            slippage: Some(bps(100)),
            recipient: None,
        }
    }

    #[tokio::test]
    async fn test_chained_withdraw_feeds_base_lp() {
        let h = harness(vec![]);
        let intent = withdraw_into_base(addr(1)).build().unwrap();

        let plan = h.sdk.build_withdraw(&intent).await.unwrap();
        assert_eq!(plan.amount_outs, vec![Allocation::new(Asset::Native, 1_000)]);

        let withdraws = h.simulator.withdraws();
        assert_eq!(withdraws[0], (addr(3), 1_000, WithdrawSelection::Single(token(1))));
        assert_eq!(
            withdraws[1],
            (addr(1), 1_000, WithdrawSelection::Single(Asset::Native))
        );

        assert_eq!(plan.call.amounts, vec![Allocation::new(token(3), 1_000)]);
        assert_eq!(plan.call.minimums, vec![Allocation::new(token(1), 990)]);
        match plan.call.next {
            Some(NextOp::Withdraw(next)) => {
                assert_eq!(next.pool, addr(1));
                assert_eq!(
                    next.min_amount_outs,
                    vec![Allocation::new(Asset::Native, 990)]
                );
            }
            other => panic!("unexpected next: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_withdraw_target_must_be_base_of_pool() {
        let h = harness(vec![]);
        let intent = withdraw_into_base(addr(5)).build().unwrap();
        let err = h.sdk.build_withdraw(&intent).await.unwrap_err();
        assert!(matches!(err, RouteError::InvalidWithdrawTarget { pool, .. } if pool == addr(5)));
    }

    #[tokio::test]
    async fn test_balanced_withdraw_without_next() {
        let h = harness(vec![]);
        let intent = WithdrawParams {
            pool: addr(5),
            burn_lp_amount: 900,
            mode: WithdrawMode::Balanced,
            withdraw_asset: None,
            next: None,
            slippage: None,
            recipient: None,
        }
        .build()
        .unwrap();

        let plan = h.sdk.build_withdraw(&intent).await.unwrap();
        assert_eq!(plan.amount_outs.len(), 3);
        assert!(plan.call.minimums.is_empty());
        assert!(plan.call.next.is_none());
        assert_eq!(
            plan.call.action,
            CallAction::Withdraw {
                selection: WithdrawSelection::Balanced
            }
        );
    }

    #[test]
    fn test_connect_builds_without_network() {
        assert!(StableswapSdk::connect(ApiConfig::default()).is_ok());
    }
}

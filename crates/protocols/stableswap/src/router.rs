//! Route Resolver: Pool Chains to Typed Hops
//!
//! Turns an ordered list of pools plus an (asset in, asset out) pair into the
//! hop sequence the quote chainer and payload composer operate on.

use stableswap_core::{Asset, Hop, HopAction, Pool};

use crate::state::{Result, RouteError};

// ---------------------------------------------------------------------------
// Step 1: Hop Classification
// ---------------------------------------------------------------------------

/// Classify the action a pool performs when turning `asset_in` into `asset_out`.
///
/// Returns `None` when no rule applies. Pool construction guarantees a member
/// asset never equals the pool's LP asset, so at most one rule can match.
pub fn classify_action(pool: &Pool, asset_in: &Asset, asset_out: &Asset) -> Option<HopAction> {
    let in_member = pool.is_member(asset_in);
    let out_member = pool.is_member(asset_out);

    if in_member && pool.is_lp_asset(asset_out) {
        Some(HopAction::Deposit)
    } else if in_member && out_member && asset_in != asset_out {
        Some(HopAction::Swap)
    } else if pool.is_lp_asset(asset_in) && out_member {
        Some(HopAction::Withdraw)
    } else {
        None
    }
}

fn make_hop(pool: &Pool, asset_in: Asset, asset_out: Asset) -> Result<Hop> {
    let action = classify_action(pool, &asset_in, &asset_out).ok_or_else(|| {
        RouteError::UndeterminedAction {
            pool: *pool.address(),
            asset_in,
            asset_out,
        }
    })?;

    Ok(Hop {
        action,
        pool: pool.clone(),
        asset_in,
        asset_out,
    })
}

// ---------------------------------------------------------------------------
// Step 2: Chain Resolution
// ---------------------------------------------------------------------------

/// Find the asset that carries value from `current` into `next`.
///
/// Candidates are `current`'s members in declared order followed by its LP
/// asset, skipping the asset currently held; the first one `next` also
/// touches wins.
fn connecting_asset(current: &Pool, next: &Pool, held: &Asset) -> Option<Asset> {
    current
        .assets_with_lp()
        .into_iter()
        .filter(|asset| asset != held)
        .find(|asset| next.touches(asset))
}

/// Resolve an ordered pool chain into hops.
///
/// The result satisfies `hops[0].asset_in == asset_in`,
/// `hops[n-1].asset_out == asset_out` and `hops[k].asset_out == hops[k+1].asset_in`.
pub fn resolve_hops(pools: &[Pool], asset_in: &Asset, asset_out: &Asset) -> Result<Vec<Hop>> {
    if pools.is_empty() {
        return Err(RouteError::EmptyRoute);
    }

    let mut hops = Vec::with_capacity(pools.len());
    let mut current_in = *asset_in;

    for (i, pool) in pools.iter().enumerate() {
        let out = match pools.get(i + 1) {
            Some(next_pool) => connecting_asset(pool, next_pool, &current_in).ok_or(
                RouteError::NoValidConnection {
                    from: *pool.address(),
                    to: *next_pool.address(),
                },
            )?,
            None => *asset_out,
        };

        let hop = make_hop(pool, current_in, out)?;
        tracing::debug!(
            pool = %pool.address(),
            action = %hop.action,
            asset_in = %hop.asset_in,
            asset_out = %hop.asset_out,
            "Resolved hop {}",
            i
        );
        hops.push(hop);
        current_in = out;
    }

    Ok(hops)
}

// ---------------------------------------------------------------------------
// Step 3: Externally Supplied Hops
// ---------------------------------------------------------------------------

/// Check a hop list obtained from the hop lookup service before using it.
///
/// Verifies endpoints, continuity and that each hop's declared action matches
/// what its pool and assets imply.
pub fn validate_hop_chain(hops: &[Hop], asset_in: &Asset, asset_out: &Asset) -> Result<()> {
    let (first, last) = match (hops.first(), hops.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(RouteError::EmptyRoute),
    };

    if first.asset_in != *asset_in {
        return Err(RouteError::InvalidHopChain(format!(
            "first hop consumes {}, expected {}",
            first.asset_in, asset_in
        )));
    }
    if last.asset_out != *asset_out {
        return Err(RouteError::InvalidHopChain(format!(
            "last hop produces {}, expected {}",
            last.asset_out, asset_out
        )));
    }

    for (i, pair) in hops.windows(2).enumerate() {
        if pair[0].asset_out != pair[1].asset_in {
            return Err(RouteError::InvalidHopChain(format!(
                "hop {} produces {} but hop {} consumes {}",
                i,
                pair[0].asset_out,
                i + 1,
                pair[1].asset_in
            )));
        }
    }

    for hop in hops {
        let expected = classify_action(&hop.pool, &hop.asset_in, &hop.asset_out);
        if expected != Some(hop.action) {
            return Err(RouteError::InvalidHopChain(format!(
                "hop in pool {} is declared {} but {} -> {} is {}",
                hop.pool.address(),
                hop.action,
                hop.asset_in,
                hop.asset_out,
                expected.map_or_else(|| "unclassifiable".to_string(), |a| a.to_string())
            )));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

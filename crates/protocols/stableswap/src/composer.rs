//! Payload Composer
//!
//! Builds the nested "next operation" chain a pool forwards after its own hop,
//! and the top-level call descriptors that carry it.

use stableswap_core::{
    Address, Allocation, Amount, Asset, Hop, HopAction, Pool, SignedRatePayload,
    WithdrawSelection,
};

use crate::state::{
    CallAction, CallDescriptor, DepositNext, NextOp, Result, RouteError, SwapNext, WithdrawNext,
};

/// The meta pool member that is not its base pool's LP, sent with amount zero.
pub fn meta_allocation_for(pool: &Pool) -> Result<Allocation> {
    let base = pool.base_pool().ok_or_else(|| {
        RouteError::MissingMetaAsset(format!("pool {} is not a meta pool", pool.address()))
    })?;
    counter_allocation(pool, &Asset::Jetton(*base))
}

/// The meta pool member other than `forwarded`, sent with amount zero.
///
/// A chained deposit only carries the asset the previous hop produced, so the
/// pool's other side has to be named explicitly.
pub fn counter_allocation(pool: &Pool, forwarded: &Asset) -> Result<Allocation> {
    if pool.base_pool().is_none() {
        return Err(RouteError::MissingMetaAsset(format!(
            "pool {} is not a meta pool",
            pool.address()
        )));
    }
    if !pool.is_member(forwarded) {
        return Err(RouteError::MissingMetaAsset(format!(
            "meta pool {} does not hold forwarded asset {}",
            pool.address(),
            forwarded
        )));
    }

    pool.assets()
        .iter()
        .find(|asset| *asset != forwarded)
        .map(|asset| Allocation::new(*asset, 0))
        .ok_or_else(|| {
            RouteError::MissingMetaAllocation(format!(
                "meta pool {} holds no asset besides {}",
                pool.address(),
                forwarded
            ))
        })
}

/// Compose the continuation for a hop tail.
///
/// `min_outs`, when given, must hold one floor per hop in `hops`.
pub fn compose_next(hops: &[Hop], min_outs: Option<&[Amount]>) -> Result<Option<NextOp>> {
    if let Some(mins) = min_outs {
        if mins.len() != hops.len() {
            return Err(RouteError::LengthMismatch {
                expected: hops.len(),
                got: mins.len(),
            });
        }
    }
    compose_from(hops, min_outs)
}

fn compose_from(hops: &[Hop], min_outs: Option<&[Amount]>) -> Result<Option<NextOp>> {
    let (hop, rest) = match hops.split_first() {
        Some(split) => split,
        None => return Ok(None),
    };
    let min_out = min_outs.and_then(|m| m.first().copied());
    let rest_mins = min_outs.map(|m| &m[1..]);

    let op = match hop.action {
        HopAction::Swap => NextOp::Swap(SwapNext {
            pool: *hop.pool.address(),
            asset_out: hop.asset_out,
            min_amount_out: min_out,
            next: compose_from(rest, rest_mins)?.map(Box::new),
        }),
        HopAction::Deposit => {
            if hop.pool.is_base() {
                return Err(RouteError::MissingMetaAsset(format!(
                    "chained deposit into {} needs a meta pool",
                    hop.pool.address()
                )));
            }
            NextOp::Deposit(DepositNext {
                pool: *hop.pool.address(),
                meta_allocation: counter_allocation(&hop.pool, &hop.asset_in)?,
                min_lp_amount: min_out,
                next: compose_from(rest, rest_mins)?.map(Box::new),
            })
        }
        HopAction::Withdraw => {
            if !hop.pool.is_base() {
                return Err(RouteError::InvalidWithdrawTarget {
                    pool: *hop.pool.address(),
                    reason: "chained withdraw must target a base pool".to_string(),
                });
            }
            if !rest.is_empty() {
                return Err(RouteError::WithdrawNotTerminal {
                    pool: *hop.pool.address(),
                });
            }
            NextOp::Withdraw(WithdrawNext {
                pool: *hop.pool.address(),
                selection: WithdrawSelection::Single(hop.asset_out),
                min_amount_outs: min_out
                    .map(|m| vec![Allocation::new(hop.asset_out, m)])
                    .unwrap_or_default(),
            })
        }
    };

    Ok(Some(op))
}

/// Top-level call for a swap route: the first hop plus the composed tail.
pub fn compose_swap_call(
    hops: &[Hop],
    amount_in: Amount,
    min_outs: Option<&[Amount]>,
    recipient: Option<Address>,
    signed_rates: Option<SignedRatePayload>,
) -> Result<CallDescriptor> {
    let first = hops.first().ok_or(RouteError::EmptyRoute)?;
    if let Some(mins) = min_outs {
        if mins.len() != hops.len() {
            return Err(RouteError::LengthMismatch {
                expected: hops.len(),
                got: mins.len(),
            });
        }
    }

    let action = match first.action {
        HopAction::Swap => CallAction::Swap {
            asset_out: first.asset_out,
        },
        HopAction::Deposit => CallAction::Deposit,
        HopAction::Withdraw => CallAction::Withdraw {
            selection: WithdrawSelection::Single(first.asset_out),
        },
    };

    let minimums = min_outs
        .and_then(|m| m.first())
        .map(|m| vec![Allocation::new(first.asset_out, *m)])
        .unwrap_or_default();

    let next = compose_from(&hops[1..], min_outs.map(|m| &m[1..]))?;

    Ok(CallDescriptor {
        target_pool: *first.pool.address(),
        action,
        amounts: vec![Allocation::new(first.asset_in, amount_in)],
        minimums,
        recipient,
        signed_rates,
        next,
    })
}

/// Top-level call for a deposit into `pool`, optionally continuing into a meta pool.
pub fn compose_deposit_call(
    pool: &Pool,
    allocations: &[Allocation],
    min_lp_amount: Option<Amount>,
    next: Option<DepositNext>,
    recipient: Option<Address>,
    signed_rates: Option<SignedRatePayload>,
) -> CallDescriptor {
    CallDescriptor {
        target_pool: *pool.address(),
        action: CallAction::Deposit,
        amounts: allocations.to_vec(),
        minimums: min_lp_amount
            .map(|m| vec![Allocation::new(pool.lp_asset(), m)])
            .unwrap_or_default(),
        recipient,
        signed_rates,
        next: next.map(NextOp::Deposit),
    }
}

/// Top-level call burning `pool`'s LP, optionally continuing into its base pool.
pub fn compose_withdraw_call(
    pool: &Pool,
    burn_lp_amount: Amount,
    selection: WithdrawSelection,
    minimums: Vec<Allocation>,
    next: Option<WithdrawNext>,
    recipient: Option<Address>,
    signed_rates: Option<SignedRatePayload>,
) -> CallDescriptor {
    CallDescriptor {
        target_pool: *pool.address(),
        action: CallAction::Withdraw { selection },
        amounts: vec![Allocation::new(pool.lp_asset(), burn_lp_amount)],
        minimums,
        recipient,
        signed_rates,
        next: next.map(NextOp::Withdraw),
    }
}

//! Quote Chainer
//!
//! Drives the pool simulator across a hop chain and reconciles per-hop amounts.
//!
//! - ExactIn: one simulation per hop, each fed the previous hop's output.
//! - ExactOut: one simulation over the whole chain, seeded with the final
//!   output; hop i's required input is hop i-1's required output.
//!
//! Hops are quoted strictly in sequence since each depends on its neighbour's
//! result. Any shape violation aborts the whole quote.

use stableswap_core::{
    Amount, Hop, PoolSimulator, SimulationResult, SwapMode, SwapSimulationRequest,
};

use crate::intent::{Guarantee, SwapAmount, SwapIntent};
use crate::state::{ChainedQuote, Result, RouteError};

/// Reconciled amounts from a single simulation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassQuote {
    pub amount_in: Amount,
    pub amount_outs: Vec<Amount>,
    pub results: Vec<SimulationResult>,
}

/// Quote a hop chain for a swap intent, including the explicit-bound pass when
/// the intent carries one.
pub async fn chain_quotes(
    simulator: &dyn PoolSimulator,
    hops: &[Hop],
    intent: &SwapIntent,
) -> Result<ChainedQuote> {
    if hops.is_empty() {
        return Err(RouteError::EmptyRoute);
    }

    match intent.amount() {
        SwapAmount::ExactIn(amount_in) => {
            let pass = quote_exact_in(simulator, hops, amount_in).await?;

            let min_amount_outs = match intent.guarantee() {
                Some(Guarantee::MinAmountOut(min)) => {
                    let bound = quote_exact_out(simulator, hops, *min).await?;
                    // The floor chain must be reachable with the input actually sent
                    if bound.amount_in > amount_in {
                        return Err(RouteError::BoundExceeded {
                            amount_in: bound.amount_in,
                            max_amount_in: amount_in,
                        });
                    }
                    Some(bound.amount_outs)
                }
                _ => None,
            };

            Ok(ChainedQuote {
                mode: SwapMode::ExactIn,
                amount_in,
                amount_outs: pass.amount_outs,
                min_amount_outs,
                results: pass.results,
            })
        }
        SwapAmount::ExactOut(amount_out) => {
            let pass = quote_exact_out(simulator, hops, amount_out).await?;

            let min_amount_outs = match intent.guarantee() {
                Some(Guarantee::MaxAmountIn(max)) => {
                    if pass.amount_in > *max {
                        return Err(RouteError::BoundExceeded {
                            amount_in: pass.amount_in,
                            max_amount_in: *max,
                        });
                    }
                    Some(pass.amount_outs.clone())
                }
                _ => None,
            };

            Ok(ChainedQuote {
                mode: SwapMode::ExactOut,
                amount_in: pass.amount_in,
                amount_outs: pass.amount_outs,
                min_amount_outs,
                results: pass.results,
            })
        }
    }
}

/// Quote forward: one simulator call per hop.
pub async fn quote_exact_in(
    simulator: &dyn PoolSimulator,
    hops: &[Hop],
    amount_in: Amount,
) -> Result<PassQuote> {
    if amount_in == 0 {
        return Err(RouteError::ZeroAmountIn);
    }

    let mut current = amount_in;
    let mut amount_outs = Vec::with_capacity(hops.len());
    let mut results = Vec::with_capacity(hops.len());

    for (i, hop) in hops.iter().enumerate() {
        let request = SwapSimulationRequest {
            mode: SwapMode::ExactIn,
            amount: current,
            hops: vec![hop.clone()],
        };
        let mut hop_results = simulator.simulate_swap(&request).await?;
        if hop_results.len() != 1 {
            return Err(RouteError::LengthMismatch {
                expected: 1,
                got: hop_results.len(),
            });
        }

        let result = hop_results.remove(0);
        if result.mode != SwapMode::ExactIn {
            return Err(RouteError::InvalidSequence(format!(
                "hop {} reported {:?} in an ExactIn chain",
                i, result.mode
            )));
        }
        if result.amount_out == 0 {
            return Err(RouteError::InsufficientOutput { hop: i });
        }

        tracing::debug!(
            pool = %hop.pool.address(),
            amount_in = %current,
            amount_out = %result.amount_out,
            "ExactIn hop {} quoted",
            i
        );

        current = result.amount_out;
        amount_outs.push(current);
        results.push(result);
    }

    Ok(PassQuote {
        amount_in,
        amount_outs,
        results,
    })
}

/// Quote backward: a single simulator call seeded with the final output.
pub async fn quote_exact_out(
    simulator: &dyn PoolSimulator,
    hops: &[Hop],
    amount_out: Amount,
) -> Result<PassQuote> {
    if amount_out == 0 {
        return Err(RouteError::ZeroAmountOut);
    }

    let request = SwapSimulationRequest {
        mode: SwapMode::ExactOut,
        amount: amount_out,
        hops: hops.to_vec(),
    };
    let results = simulator.simulate_swap(&request).await?;

    if results.len() != hops.len() {
        return Err(RouteError::LengthMismatch {
            expected: hops.len(),
            got: results.len(),
        });
    }
    ensure_monotonic_exact_out(&results)?;

    let last = hops.len() - 1;
    let amount_outs: Vec<Amount> = (0..hops.len())
        .map(|i| {
            if i == last {
                amount_out
            } else if results[i + 1].mode == SwapMode::ExactOut {
                results[i + 1].amount_in
            } else {
                results[i].amount_out
            }
        })
        .collect();

    if let Some(hop) = amount_outs.iter().position(|a| *a == 0) {
        return Err(RouteError::InsufficientOutput { hop });
    }

    let amount_in = results[0].amount_in;
    if amount_in == 0 {
        return Err(RouteError::ZeroAmountIn);
    }

    tracing::debug!(
        hops = hops.len(),
        amount_in = %amount_in,
        amount_out = %amount_out,
        "ExactOut chain quoted"
    );

    Ok(PassQuote {
        amount_in,
        amount_outs,
        results,
    })
}

/// Once a result reports ExactOut, no later result may report ExactIn.
pub fn ensure_monotonic_exact_out(results: &[SimulationResult]) -> Result<()> {
    let mut exact_out_from = None;
    for (i, result) in results.iter().enumerate() {
        match (result.mode, exact_out_from) {
            (SwapMode::ExactOut, None) => exact_out_from = Some(i),
            (SwapMode::ExactIn, Some(first)) => {
                return Err(RouteError::InvalidSequence(format!(
                    "result {} reports ExactIn after ExactOut result {}",
                    i, first
                )))
            }
            _ => {}
        }
    }
    Ok(())
}

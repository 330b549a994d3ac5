//! Caller Intents
//!
//! Raw `*Params` structs mirror what a caller (or a JSON request) supplies.
//! Converting them into the matching intent runs every validation rule that
//! does not need pool data; the resulting intents cannot hold conflicting
//! fields.

use serde::{Deserialize, Serialize};

use stableswap_core::{
    amount_serde, find_duplicate_asset, Address, Allocation, Amount, Asset, Slippage, SwapMode,
    WithdrawSelection,
};

use crate::state::{Result, RouteError};

// ---------------------------------------------------------------------------
// Swap
// ---------------------------------------------------------------------------

/// The caller-fixed side of a swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "amount")]
pub enum SwapAmount {
    ExactIn(#[serde(with = "amount_serde")] Amount),
    ExactOut(#[serde(with = "amount_serde")] Amount),
}

impl SwapAmount {
    pub fn mode(&self) -> SwapMode {
        match self {
            Self::ExactIn(_) => SwapMode::ExactIn,
            Self::ExactOut(_) => SwapMode::ExactOut,
        }
    }

    pub fn amount(&self) -> Amount {
        match self {
            Self::ExactIn(a) | Self::ExactOut(a) => *a,
        }
    }
}

/// Relative or absolute protection attached to a swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Guarantee {
    Slippage(Slippage),
    /// ExactIn only: floor for the final output
    MinAmountOut(#[serde(with = "amount_serde")] Amount),
    /// ExactOut only: ceiling for the realized input
    MaxAmountIn(#[serde(with = "amount_serde")] Amount),
}

/// Swap request as supplied by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapParams {
    pub mode: SwapMode,
    pub asset_in: Asset,
    pub asset_out: Asset,
    #[serde(default, with = "amount_serde::option")]
    pub amount_in: Option<Amount>,
    #[serde(default, with = "amount_serde::option")]
    pub amount_out: Option<Amount>,
    #[serde(default)]
    pub route: Option<Vec<Address>>,
    #[serde(default)]
    pub slippage: Option<Slippage>,
    #[serde(default, with = "amount_serde::option")]
    pub min_amount_out: Option<Amount>,
    #[serde(default, with = "amount_serde::option")]
    pub max_amount_in: Option<Amount>,
    #[serde(default)]
    pub recipient: Option<Address>,
}

impl SwapParams {
    pub fn exact_in(asset_in: Asset, asset_out: Asset, amount_in: Amount) -> Self {
        Self::empty(SwapMode::ExactIn, asset_in, asset_out).with_amount_in(amount_in)
    }

    pub fn exact_out(asset_in: Asset, asset_out: Asset, amount_out: Amount) -> Self {
        let mut params = Self::empty(SwapMode::ExactOut, asset_in, asset_out);
        params.amount_out = Some(amount_out);
        params
    }

    fn empty(mode: SwapMode, asset_in: Asset, asset_out: Asset) -> Self {
        Self {
            mode,
            asset_in,
            asset_out,
            amount_in: None,
            amount_out: None,
            route: None,
            slippage: None,
            min_amount_out: None,
            max_amount_in: None,
            recipient: None,
        }
    }

    fn with_amount_in(mut self, amount_in: Amount) -> Self {
        self.amount_in = Some(amount_in);
        self
    }

    pub fn route(mut self, route: Vec<Address>) -> Self {
        self.route = Some(route);
        self
    }

    pub fn slippage(mut self, slippage: Slippage) -> Self {
        self.slippage = Some(slippage);
        self
    }

    pub fn min_amount_out(mut self, min_amount_out: Amount) -> Self {
        self.min_amount_out = Some(min_amount_out);
        self
    }

    pub fn max_amount_in(mut self, max_amount_in: Amount) -> Self {
        self.max_amount_in = Some(max_amount_in);
        self
    }

    pub fn recipient(mut self, recipient: Address) -> Self {
        self.recipient = Some(recipient);
        self
    }

    pub fn build(self) -> Result<SwapIntent> {
        SwapIntent::try_from(self)
    }
}

/// Validated swap intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapIntent {
    asset_in: Asset,
    asset_out: Asset,
    amount: SwapAmount,
    route: Option<Vec<Address>>,
    guarantee: Option<Guarantee>,
    recipient: Option<Address>,
}

impl SwapIntent {
    pub fn asset_in(&self) -> &Asset {
        &self.asset_in
    }

    pub fn asset_out(&self) -> &Asset {
        &self.asset_out
    }

    pub fn amount(&self) -> SwapAmount {
        self.amount
    }

    pub fn mode(&self) -> SwapMode {
        self.amount.mode()
    }

    pub fn route(&self) -> Option<&[Address]> {
        self.route.as_deref()
    }

    pub fn guarantee(&self) -> Option<&Guarantee> {
        self.guarantee.as_ref()
    }

    pub fn slippage(&self) -> Option<&Slippage> {
        match &self.guarantee {
            Some(Guarantee::Slippage(s)) => Some(s),
            _ => None,
        }
    }

    pub fn recipient(&self) -> Option<&Address> {
        self.recipient.as_ref()
    }
}

impl TryFrom<SwapParams> for SwapIntent {
    type Error = RouteError;

    fn try_from(params: SwapParams) -> Result<Self> {
        if params.asset_in == params.asset_out {
            return Err(RouteError::SameAsset(params.asset_in));
        }

        let amount = match params.mode {
            SwapMode::ExactIn => {
                if params.amount_out.is_some() {
                    return Err(RouteError::InvalidIntent(
                        "ExactIn swap must not fix amount out".to_string(),
                    ));
                }
                if params.max_amount_in.is_some() {
                    return Err(RouteError::InvalidIntent(
                        "max amount in only applies to ExactOut swaps".to_string(),
                    ));
                }
                match params.amount_in {
                    None => {
                        return Err(RouteError::InvalidIntent(
                            "ExactIn swap needs amount in".to_string(),
                        ))
                    }
                    Some(0) => return Err(RouteError::ZeroAmountIn),
                    Some(a) => SwapAmount::ExactIn(a),
                }
            }
            SwapMode::ExactOut => {
                if params.amount_in.is_some() {
                    return Err(RouteError::InvalidIntent(
                        "ExactOut swap must not fix amount in".to_string(),
                    ));
                }
                if params.min_amount_out.is_some() {
                    return Err(RouteError::InvalidIntent(
                        "min amount out only applies to ExactIn swaps".to_string(),
                    ));
                }
                match params.amount_out {
                    None => {
                        return Err(RouteError::InvalidIntent(
                            "ExactOut swap needs amount out".to_string(),
                        ))
                    }
                    Some(0) => return Err(RouteError::ZeroAmountOut),
                    Some(a) => SwapAmount::ExactOut(a),
                }
            }
        };

        let guarantee = match (params.slippage, params.min_amount_out, params.max_amount_in) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                return Err(RouteError::ConflictingBounds(
                    "slippage tolerance and explicit bound are mutually exclusive".to_string(),
                ))
            }
            (Some(s), None, None) => Some(Guarantee::Slippage(s)),
            (None, Some(min), None) => Some(Guarantee::MinAmountOut(min)),
            (None, None, Some(max)) => Some(Guarantee::MaxAmountIn(max)),
            (None, None, None) => None,
            (None, Some(_), Some(_)) => {
                return Err(RouteError::ConflictingBounds(
                    "min amount out and max amount in are mutually exclusive".to_string(),
                ))
            }
        };

        if let Some(route) = &params.route {
            if route.is_empty() {
                return Err(RouteError::EmptyRoute);
            }
        }

        Ok(Self {
            asset_in: params.asset_in,
            asset_out: params.asset_out,
            amount,
            route: params.route,
            guarantee,
            recipient: params.recipient,
        })
    }
}

// ---------------------------------------------------------------------------
// Deposit
// ---------------------------------------------------------------------------

/// Follow-up deposit of the freshly minted LP into a meta pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextDeposit {
    pub pool: Address,
    /// Amount of the meta pool's own asset sent alongside; derived as zero when absent
    #[serde(default)]
    pub meta_allocation: Option<Allocation>,
}

/// Deposit request as supplied by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositParams {
    pub pool: Address,
    pub allocations: Vec<Allocation>,
    #[serde(default)]
    pub next: Option<NextDeposit>,
    #[serde(default)]
    pub slippage: Option<Slippage>,
    #[serde(default)]
    pub recipient: Option<Address>,
}

impl DepositParams {
    pub fn build(self) -> Result<DepositIntent> {
        DepositIntent::try_from(self)
    }
}

/// Validated deposit intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositIntent {
    pool: Address,
    allocations: Vec<Allocation>,
    next: Option<NextDeposit>,
    slippage: Option<Slippage>,
    recipient: Option<Address>,
}

impl DepositIntent {
    pub fn pool(&self) -> &Address {
        &self.pool
    }

    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }

    pub fn next(&self) -> Option<&NextDeposit> {
        self.next.as_ref()
    }

    pub fn slippage(&self) -> Option<&Slippage> {
        self.slippage.as_ref()
    }

    pub fn recipient(&self) -> Option<&Address> {
        self.recipient.as_ref()
    }
}

impl TryFrom<DepositParams> for DepositIntent {
    type Error = RouteError;

    fn try_from(params: DepositParams) -> Result<Self> {
        if let Some(asset) = find_duplicate_asset(&params.allocations) {
            return Err(RouteError::DuplicateAsset(*asset));
        }
        if params.allocations.iter().all(|a| a.amount == 0) {
            return Err(RouteError::ZeroAmountIn);
        }
        if let Some(next) = &params.next {
            if next.pool == params.pool {
                return Err(RouteError::InvalidIntent(
                    "next deposit must target a different pool".to_string(),
                ));
            }
        }

        Ok(Self {
            pool: params.pool,
            allocations: params.allocations,
            next: params.next,
            slippage: params.slippage,
            recipient: params.recipient,
        })
    }
}

// ---------------------------------------------------------------------------
// Withdraw
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawMode {
    Single,
    Balanced,
}

/// Follow-up withdraw request from the base pool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextWithdrawParams {
    pub pool: Address,
    pub mode: WithdrawMode,
    #[serde(default)]
    pub withdraw_asset: Option<Asset>,
}

/// Withdraw request as supplied by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawParams {
    pub pool: Address,
    #[serde(with = "amount_serde")]
    pub burn_lp_amount: Amount,
    pub mode: WithdrawMode,
    #[serde(default)]
    pub withdraw_asset: Option<Asset>,
    #[serde(default)]
    pub next: Option<NextWithdrawParams>,
    #[serde(default)]
    pub slippage: Option<Slippage>,
    #[serde(default)]
    pub recipient: Option<Address>,
}

impl WithdrawParams {
    pub fn build(self) -> Result<WithdrawIntent> {
        WithdrawIntent::try_from(self)
    }
}

/// Validated follow-up withdraw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NextWithdraw {
    pub pool: Address,
    pub selection: WithdrawSelection,
}

/// Validated withdraw intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawIntent {
    pool: Address,
    burn_lp_amount: Amount,
    selection: WithdrawSelection,
    next: Option<NextWithdraw>,
    slippage: Option<Slippage>,
    recipient: Option<Address>,
}

impl WithdrawIntent {
    pub fn pool(&self) -> &Address {
        &self.pool
    }

    pub fn burn_lp_amount(&self) -> Amount {
        self.burn_lp_amount
    }

    /// Selection in the first pool. A single-mode withdraw chained into a base
    /// pool selects that pool's LP asset.
    pub fn selection(&self) -> &WithdrawSelection {
        &self.selection
    }

    pub fn next(&self) -> Option<&NextWithdraw> {
        self.next.as_ref()
    }

    pub fn slippage(&self) -> Option<&Slippage> {
        self.slippage.as_ref()
    }

    pub fn recipient(&self) -> Option<&Address> {
        self.recipient.as_ref()
    }
}

fn validate_next_withdraw(params: &NextWithdrawParams) -> Result<NextWithdraw> {
    let selection = match (params.mode, params.withdraw_asset) {
        (WithdrawMode::Single, Some(asset)) => WithdrawSelection::Single(asset),
        (WithdrawMode::Single, None) => return Err(RouteError::MissingWithdrawAsset),
        (WithdrawMode::Balanced, None) => WithdrawSelection::Balanced,
        (WithdrawMode::Balanced, Some(_)) => {
            return Err(RouteError::InvalidIntent(
                "balanced next withdraw must not name an asset".to_string(),
            ))
        }
    };
    Ok(NextWithdraw {
        pool: params.pool,
        selection,
    })
}

impl TryFrom<WithdrawParams> for WithdrawIntent {
    type Error = RouteError;

    fn try_from(params: WithdrawParams) -> Result<Self> {
        if params.burn_lp_amount == 0 {
            return Err(RouteError::ZeroAmountIn);
        }

        let next = params.next.as_ref().map(validate_next_withdraw).transpose()?;
        if let Some(next) = &next {
            if next.pool == params.pool {
                return Err(RouteError::InvalidIntent(
                    "next withdraw must target a different pool".to_string(),
                ));
            }
        }

        let selection = match (params.mode, params.withdraw_asset, &next) {
            (WithdrawMode::Single, Some(_), Some(_)) => {
                return Err(RouteError::ConflictingBounds(
                    "withdraw asset and next withdraw are mutually exclusive".to_string(),
                ))
            }
            (WithdrawMode::Single, None, None) => return Err(RouteError::MissingWithdrawAsset),
            (WithdrawMode::Single, Some(asset), None) => WithdrawSelection::Single(asset),
            (WithdrawMode::Single, None, Some(next)) => {
                WithdrawSelection::Single(Asset::Jetton(next.pool))
            }
            (WithdrawMode::Balanced, Some(_), _) => {
                return Err(RouteError::InvalidIntent(
                    "balanced withdraw must not name an asset".to_string(),
                ))
            }
            (WithdrawMode::Balanced, None, _) => WithdrawSelection::Balanced,
        };

        Ok(Self {
            pool: params.pool,
            burn_lp_amount: params.burn_lp_amount,
            selection,
            next,
            slippage: params.slippage,
            recipient: params.recipient,
        })
    }
}

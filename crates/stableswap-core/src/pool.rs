//! Pool and hop types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::TypeError;
use crate::types::{Address, Asset};

/// Pool kind. A meta pool holds the LP asset of its base pool as a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKind {
    Base,
    Meta { base_pool: Address },
}

/// Stableswap pool metadata
///
/// Constructed through [`Pool::new`] (or deserialized from a [`PoolRecord`]),
/// which enforces the layout invariants the router relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PoolRecord", into = "PoolRecord")]
pub struct Pool {
    address: Address,
    kind: PoolKind,
    assets: Vec<Asset>,
    use_rates: bool,
}

impl Pool {
    pub fn new(
        address: Address,
        kind: PoolKind,
        assets: Vec<Asset>,
        use_rates: bool,
    ) -> Result<Self, TypeError> {
        let invalid = |reason: String| TypeError::InvalidPool {
            address: address.to_string(),
            reason,
        };

        if assets.len() < 2 {
            return Err(invalid(format!(
                "expected at least 2 assets, found {}",
                assets.len()
            )));
        }

        let lp_asset = Asset::Jetton(address);
        for (i, asset) in assets.iter().enumerate() {
            if *asset == lp_asset {
                return Err(invalid("pool lists its own LP asset as a member".to_string()));
            }
            if assets[..i].contains(asset) {
                return Err(invalid(format!("duplicate asset {}", asset)));
            }
        }

        if let PoolKind::Meta { base_pool } = kind {
            if base_pool == address {
                return Err(invalid("meta pool references itself as base".to_string()));
            }
            if !assets.contains(&Asset::Jetton(base_pool)) {
                return Err(invalid(format!(
                    "meta pool does not hold the LP asset of base pool {}",
                    base_pool
                )));
            }
        }

        Ok(Self {
            address,
            kind,
            assets,
            use_rates,
        })
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn kind(&self) -> &PoolKind {
        &self.kind
    }

    pub fn is_base(&self) -> bool {
        matches!(self.kind, PoolKind::Base)
    }

    pub fn base_pool(&self) -> Option<&Address> {
        match &self.kind {
            PoolKind::Base => None,
            PoolKind::Meta { base_pool } => Some(base_pool),
        }
    }

    /// Member assets in declared order
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// Whether swaps through this pool need a signed-rate payload
    pub fn use_rates(&self) -> bool {
        self.use_rates
    }

    /// The LP asset minted by this pool (the pool contract is its own jetton master).
    pub fn lp_asset(&self) -> Asset {
        Asset::Jetton(self.address)
    }

    pub fn is_member(&self, asset: &Asset) -> bool {
        self.assets.contains(asset)
    }

    pub fn is_lp_asset(&self, asset: &Asset) -> bool {
        *asset == self.lp_asset()
    }

    /// Member assets followed by the LP asset
    pub fn assets_with_lp(&self) -> Vec<Asset> {
        let mut all = self.assets.clone();
        all.push(self.lp_asset());
        all
    }

    pub fn touches(&self, asset: &Asset) -> bool {
        self.is_member(asset) || self.is_lp_asset(asset)
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            PoolKind::Base => "Base",
            PoolKind::Meta { .. } => "Meta",
        };
        write!(f, "{} Pool {} | {} assets", kind, self.address, self.assets.len())
    }
}

/// Pool kind tag as it appears in serialized records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolKindTag {
    Base,
    Meta,
}

/// Flat, serializable pool layout with the base-pool reference as an optional field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolRecord {
    pub address: Address,
    #[serde(rename = "type")]
    pub kind: PoolKindTag,
    pub assets: Vec<Asset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_pool: Option<Address>,
    #[serde(default)]
    pub use_rates: bool,
}

impl TryFrom<PoolRecord> for Pool {
    type Error = TypeError;

    fn try_from(record: PoolRecord) -> Result<Self, Self::Error> {
        let kind = match (record.kind, record.base_pool) {
            (PoolKindTag::Base, None) => PoolKind::Base,
            (PoolKindTag::Meta, Some(base_pool)) => PoolKind::Meta { base_pool },
            (PoolKindTag::Base, Some(_)) => {
                return Err(TypeError::InvalidPool {
                    address: record.address.to_string(),
                    reason: "base pool must not reference a base pool".to_string(),
                })
            }
            (PoolKindTag::Meta, None) => {
                return Err(TypeError::InvalidPool {
                    address: record.address.to_string(),
                    reason: "meta pool is missing its base pool".to_string(),
                })
            }
        };
        Pool::new(record.address, kind, record.assets, record.use_rates)
    }
}

impl From<Pool> for PoolRecord {
    fn from(pool: Pool) -> Self {
        let (kind, base_pool) = match pool.kind {
            PoolKind::Base => (PoolKindTag::Base, None),
            PoolKind::Meta { base_pool } => (PoolKindTag::Meta, Some(base_pool)),
        };
        Self {
            address: pool.address,
            kind,
            assets: pool.assets,
            base_pool,
            use_rates: pool.use_rates,
        }
    }
}

/// Pool-level operation performed by a hop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HopAction {
    Swap,
    Deposit,
    Withdraw,
}

impl fmt::Display for HopAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Swap => "swap",
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
        };
        f.write_str(s)
    }
}

/// One pool-level operation in a multi-pool route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hop {
    pub action: HopAction,
    pub pool: Pool,
    pub asset_in: Asset,
    pub asset_out: Asset,
}

//! Pool Catalog
//!
//! In-memory address -> pool mapping, refreshed wholesale from a [`PoolSource`].
//! Readers always see a complete snapshot: a refresh builds a new map off-lock
//! and swaps it in, it never edits the current one.

use std::collections::HashMap;
use std::sync::Arc;

use stableswap_core::{Address, Pool, PoolSource};
use tokio::sync::RwLock;

use crate::state::{Result, RouteError};

type Snapshot = Arc<HashMap<Address, Pool>>;

/// Lazily populated pool cache owned by an SDK instance
pub struct PoolCatalog {
    source: Arc<dyn PoolSource>,
    snapshot: RwLock<Snapshot>,
}

impl PoolCatalog {
    /// Create an empty catalog; the first lookup triggers a refresh.
    pub fn new(source: Arc<dyn PoolSource>) -> Self {
        Self {
            source,
            snapshot: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    /// Current snapshot (cheap clone of the shared map)
    pub async fn snapshot(&self) -> Snapshot {
        self.snapshot.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.snapshot.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshot.read().await.is_empty()
    }

    /// Replace the whole catalog with a fresh pull from the source.
    ///
    /// On failure the previous snapshot stays in place.
    pub async fn refresh(&self) -> Result<usize> {
        let pools = self.source.fetch_all_pools().await?;

        let mut map = HashMap::with_capacity(pools.len());
        for pool in pools {
            let address = *pool.address();
            if map.insert(address, pool).is_some() {
                tracing::warn!("Pool source returned {} more than once, keeping the last", address);
            }
        }

        let count = map.len();
        *self.snapshot.write().await = Arc::new(map);
        tracing::info!("Pool catalog refreshed with {} pools", count);
        Ok(count)
    }

    /// Look up pools in request order.
    ///
    /// A miss triggers exactly one refresh followed by one retry; a miss after
    /// that fails with `PoolNotFound` for the first absent address.
    pub async fn get_pools(&self, addresses: &[Address]) -> Result<Vec<Pool>> {
        let missing = match lookup(&*self.snapshot().await, addresses) {
            Ok(pools) => return Ok(pools),
            Err(missing) => missing,
        };

        tracing::debug!("Pool {} not cached, refreshing catalog", missing);
        self.refresh().await?;

        lookup(&*self.snapshot().await, addresses).map_err(RouteError::PoolNotFound)
    }

    pub async fn get_pool(&self, address: &Address) -> Result<Pool> {
        let mut pools = self.get_pools(std::slice::from_ref(address)).await?;
        pools.pop().ok_or(RouteError::PoolNotFound(*address))
    }
}

/// Resolve every address against one snapshot, or report the first miss.
fn lookup(
    snapshot: &HashMap<Address, Pool>,
    addresses: &[Address],
) -> std::result::Result<Vec<Pool>, Address> {
    addresses
        .iter()
        .map(|address| snapshot.get(address).cloned().ok_or(*address))
        .collect()
}

//! stableswap-api-client: HTTP client for the stableswap indexer, simulator and rate oracle
//!
//! One [`ApiClient`] implements every collaborator trait the router needs, so a
//! single instance can back a whole SDK.

pub mod dto;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use stableswap_core::{
    Address, Allocation, Amount, ApiConfig, Asset, DepositSimulation, Hop, HopLookup, Pool,
    PoolSimulator, PoolSource, RateOracle, SignedRatePayload, SimulationResult, SourceError,
    SourceResult, SwapSimulationRequest, WithdrawSelection, WithdrawSimulation,
};

use dto::{
    DepositSimulationBody, ErrorBody, HopsResponse, PoolsResponse, SwapSimulationResponse,
    WithdrawSimulationBody,
};

/// HTTP client for the external stableswap services
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> SourceResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent("stableswap-sdk")
            .build()
            .map_err(|e| SourceError::Unreachable {
                url: config.indexer_url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self { http, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
    ) -> SourceResult<T> {
        let request = self.http.get(&url).query(query);
        self.execute(url, request).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: String,
        body: &B,
    ) -> SourceResult<T> {
        let request = self.http.post(&url).json(body);
        self.execute(url, request).await
    }

    /// Send, check status and decode, all under one deadline.
    async fn execute<T: DeserializeOwned>(
        &self,
        url: String,
        request: RequestBuilder,
    ) -> SourceResult<T> {
        timed_request(self.config.request_timeout(), async {
            let response = request.send().await.map_err(|e| SourceError::Unreachable {
                url: url.clone(),
                message: e.to_string(),
            })?;
            decode(&url, response).await
        })
        .await
    }
}

async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> SourceResult<T> {
    let status = response.status();
    let body = response.text().await.map_err(|e| SourceError::Unreachable {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.message)
            .unwrap_or(body);
        tracing::debug!("{} returned {}: {}", url, status, message);
        return Err(SourceError::Api {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| SourceError::Parse(format!("{}: {}", url, e)))
}

/// Wrap a service call with a timeout to prevent indefinite hangs.
async fn timed_request<T>(
    timeout: Duration,
    fut: impl Future<Output = SourceResult<T>>,
) -> SourceResult<T> {
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| SourceError::Timeout {
            secs: timeout.as_secs(),
        })?
}

fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}

#[async_trait]
impl PoolSource for ApiClient {
    async fn fetch_all_pools(&self) -> SourceResult<Vec<Pool>> {
        let url = endpoint(&self.config.indexer_url, "pools");
        let response: PoolsResponse = self.get_json(url, &[]).await?;

        let total = response.pools.len();
        let pools: Vec<Pool> = response
            .pools
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<Pool>(raw) {
                Ok(pool) => Some(pool),
                Err(e) => {
                    tracing::warn!("Skipping malformed pool: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!("Fetched {} of {} pools from indexer", pools.len(), total);
        Ok(pools)
    }
}

#[async_trait]
impl HopLookup for ApiClient {
    async fn lookup_hops(&self, asset_in: &Asset, asset_out: &Asset) -> SourceResult<Vec<Hop>> {
        let url = endpoint(&self.config.indexer_url, "hops");
        let query = [
            ("assetIn", asset_in.to_string()),
            ("assetOut", asset_out.to_string()),
        ];
        let response: HopsResponse = self.get_json(url, &query).await?;
        Ok(response.hops)
    }
}

#[async_trait]
impl PoolSimulator for ApiClient {
    async fn simulate_swap(
        &self,
        request: &SwapSimulationRequest,
    ) -> SourceResult<Vec<SimulationResult>> {
        let url = endpoint(&self.config.simulator_url, "simulate/swap");
        let response: SwapSimulationResponse = self.post_json(url, request).await?;
        Ok(response.results)
    }

    async fn simulate_deposit(
        &self,
        pool: &Pool,
        allocations: &[Allocation],
    ) -> SourceResult<DepositSimulation> {
        let url = endpoint(&self.config.simulator_url, "simulate/deposit");
        let body = DepositSimulationBody {
            pool: pool.address(),
            allocations,
        };
        self.post_json(url, &body).await
    }

    async fn simulate_withdraw(
        &self,
        pool: &Pool,
        burn_lp_amount: Amount,
        selection: &WithdrawSelection,
    ) -> SourceResult<WithdrawSimulation> {
        let url = endpoint(&self.config.simulator_url, "simulate/withdraw");
        let body = WithdrawSimulationBody {
            pool: pool.address(),
            burn_lp_amount,
            selection,
        };
        self.post_json(url, &body).await
    }
}

#[async_trait]
impl RateOracle for ApiClient {
    async fn get_signed_rates(&self, pools: &[Address]) -> SourceResult<SignedRatePayload> {
        let url = endpoint(&self.config.oracle_url, "signed-rates");
        let joined = pools
            .iter()
            .map(Address::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.get_json(url, &[("pools", joined)]).await
    }
}

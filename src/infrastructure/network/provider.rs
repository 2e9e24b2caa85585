// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::domain::error::AppError;
use crate::common::retry::retry_read;
use crate::domain::constants::chain_name;
use alloy::network::Ethereum;
use alloy::providers::{Provider, RootProvider};
use url::Url;

pub type HttpProvider = RootProvider<Ethereum>;

pub struct ConnectionFactory;

impl ConnectionFactory {
    pub fn http(rpc_url: &str) -> Result<HttpProvider, AppError> {
        let url =
            Url::parse(rpc_url).map_err(|e| AppError::Config(format!("Invalid RPC URL: {}", e)))?;

        let provider = RootProvider::new_http(url);
        Ok(provider)
    }

    /// Use the configured chain id when present, otherwise ask the node.
    /// A configured id that disagrees with the node is rejected.
    pub async fn resolve_chain_id(
        provider: &HttpProvider,
        configured: Option<u64>,
    ) -> Result<u64, AppError> {
        let detected: u64 = retry_read("eth_chainId", |_| async move { provider.get_chain_id().await })
            .await
            .map_err(|e| AppError::Connection(format!("chain_id detect failed: {e}")))?;
        if let Some(expected) = configured
            && expected != detected
        {
            return Err(AppError::Config(format!(
                "CHAIN_ID {expected} does not match RPC chain {detected}"
            )));
        }
        tracing::info!(target: "rpc", chain_id = detected, chain = chain_name(detected), "Connected");
        Ok(detected)
    }
}

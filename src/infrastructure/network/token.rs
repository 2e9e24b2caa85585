// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::domain::error::AppError;
use crate::common::retry::retry_read;
use crate::data::erc20::IERC20Permit;
use crate::domain::constants::DEFAULT_PERMIT_VERSION;
use crate::network::provider::HttpProvider;
use alloy::primitives::{Address, U256};

/// Token facts needed to build an EIP-2612 permit domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermitTokenInfo {
    pub address: Address,
    pub name: String,
    pub version: String,
    pub decimals: u8,
}

/// Read-only view of an EIP-2612 token.
#[derive(Clone)]
pub struct PermitToken {
    address: Address,
    contract: IERC20Permit::IERC20PermitInstance<HttpProvider>,
}

impl PermitToken {
    pub fn new(provider: HttpProvider, address: Address) -> Self {
        Self {
            address,
            contract: IERC20Permit::new(address, provider),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn read_err(&self, call: &str, e: impl std::fmt::Display) -> AppError {
        AppError::Connection(format!("{call} on token {:#x} failed: {e}", self.address))
    }

    pub async fn name(&self) -> Result<String, AppError> {
        retry_read("name", |_| async move { self.contract.name().call().await })
            .await
            .map_err(|e| self.read_err("name()", e))
    }

    pub async fn decimals(&self) -> Result<u8, AppError> {
        retry_read("decimals", |_| async move { self.contract.decimals().call().await })
            .await
            .map_err(|e| self.read_err("decimals()", e))
    }

    /// `version()` is optional in EIP-2612; a revert means the default "1".
    pub async fn version(&self) -> String {
        match self.contract.version().call().await {
            Ok(version) => version,
            Err(e) => {
                tracing::debug!(
                    target: "permit",
                    token = %format!("{:#x}", self.address),
                    error = %e,
                    "version() unavailable; using default"
                );
                DEFAULT_PERMIT_VERSION.to_string()
            }
        }
    }

    pub async fn nonces(&self, owner: Address) -> Result<U256, AppError> {
        retry_read("nonces", |_| async move { self.contract.nonces(owner).call().await })
            .await
            .map_err(|e| self.read_err("nonces()", e))
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256, AppError> {
        retry_read("balanceOf", |_| async move {
            self.contract.balanceOf(account).call().await
        })
        .await
        .map_err(|e| self.read_err("balanceOf()", e))
    }

    pub async fn permit_info(&self) -> Result<PermitTokenInfo, AppError> {
        Ok(PermitTokenInfo {
            address: self.address,
            name: self.name().await?,
            version: self.version().await,
            decimals: self.decimals().await?,
        })
    }
}

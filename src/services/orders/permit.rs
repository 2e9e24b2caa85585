// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::domain::error::AppError;
use crate::common::retry::retry_read;
use crate::data::erc20::Permit;
use crate::data::order_processor::IOrderProcessor;
use crate::network::provider::HttpProvider;
use crate::network::token::{PermitToken, PermitTokenInfo};
use alloy::primitives::{Address, B256, U256};
use alloy::providers::Provider;
use alloy::rpc::types::BlockNumberOrTag;
use alloy::signers::SignerSync;
use alloy::signers::local::PrivateKeySigner;
use alloy_sol_types::{Eip712Domain, SolStruct};
use std::borrow::Cow;

/// EIP-2612 approval split into the `(v, r, s)` form `selfPermit` takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPermit {
    pub token: Address,
    pub owner: Address,
    pub spender: Address,
    pub value: U256,
    pub nonce: U256,
    pub deadline: U256,
    pub v: u8,
    pub r: B256,
    pub s: B256,
}

impl SignedPermit {
    pub fn self_permit_call(&self) -> IOrderProcessor::selfPermitCall {
        IOrderProcessor::selfPermitCall {
            permitToken: self.token,
            owner: self.owner,
            value: self.value,
            deadline: self.deadline,
            v: self.v,
            r: self.r,
            s: self.s,
        }
    }
}

pub fn permit_domain(info: &PermitTokenInfo, chain_id: u64) -> Eip712Domain {
    Eip712Domain::new(
        Some(Cow::Owned(info.name.clone())),
        Some(Cow::Owned(info.version.clone())),
        Some(U256::from(chain_id)),
        Some(info.address),
        None,
    )
}

pub fn sign_permit(
    signer: &PrivateKeySigner,
    domain: &Eip712Domain,
    token: Address,
    permit: Permit,
) -> Result<SignedPermit, AppError> {
    if permit.owner != signer.address() {
        return Err(AppError::validation(
            "permit.owner",
            format!(
                "owner {:#x} is not the signing wallet {:#x}",
                permit.owner,
                signer.address()
            ),
        ));
    }
    let hash = permit.eip712_signing_hash(domain);
    let sig = signer
        .sign_hash_sync(&hash)
        .map_err(|e| AppError::Order(format!("Permit signing failed: {e}")))?;
    tracing::debug!(
        target: "permit",
        token = %format!("{token:#x}"),
        value = %permit.value,
        deadline = %permit.deadline,
        "Permit signed"
    );
    Ok(SignedPermit {
        token,
        owner: permit.owner,
        spender: permit.spender,
        value: permit.value,
        nonce: permit.nonce,
        deadline: permit.deadline,
        v: 27 + u8::from(sig.v()),
        r: B256::from(sig.r()),
        s: B256::from(sig.s()),
    })
}

/// Latest block timestamp plus `window_secs`; chain time, not wall clock.
pub async fn permit_deadline(provider: &HttpProvider, window_secs: u64) -> Result<U256, AppError> {
    let block = retry_read("latest block", |_| async move {
        provider.get_block_by_number(BlockNumberOrTag::Latest).await
    })
    .await
    .map_err(|e| AppError::Connection(format!("Latest block fetch failed: {e}")))?
    .ok_or_else(|| AppError::Connection("no block time".into()))?;
    Ok(U256::from(block.header.timestamp.saturating_add(window_secs)))
}

/// Read the token's nonce and domain, then sign a permit for `value`.
pub async fn permit_for(
    token: &PermitToken,
    signer: &PrivateKeySigner,
    chain_id: u64,
    spender: Address,
    value: U256,
    deadline: U256,
) -> Result<SignedPermit, AppError> {
    let owner = signer.address();
    let info = token.permit_info().await?;
    let nonce = token.nonces(owner).await?;
    let domain = permit_domain(&info, chain_id);
    sign_permit(
        signer,
        &domain,
        token.address(),
        Permit {
            owner,
            spender,
            value,
            nonce,
            deadline,
        },
    )
}

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::domain::error::AppError;
use crate::common::retry::retry_read;
use crate::domain::constants::GAS_LIMIT_BUFFER_BPS;
use crate::network::gas::{GasFees, GasOracle};
use crate::network::provider::HttpProvider;
use alloy::consensus::{SignableTransaction, TxEip1559};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, B256, Bytes, TxKind, U256};
use alloy::providers::Provider;
use alloy::rpc::types::eth::{TransactionInput, TransactionReceipt, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy_consensus::TxEnvelope;
use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Apply the safety margin on top of the node's gas estimate.
pub fn buffered_gas_limit(estimate: u64) -> u64 {
    let scaled = u128::from(estimate) * u128::from(GAS_LIMIT_BUFFER_BPS) / 10_000;
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

/// The node must echo the hash we signed; anything else means the raw bytes
/// were altered or a different transaction was accepted.
pub fn check_broadcast_hash(local: B256, remote: B256) -> Result<(), AppError> {
    if local != remote {
        return Err(AppError::Transaction {
            hash: format!("{local:#x}"),
            reason: format!("node reported hash {remote:#x}"),
        });
    }
    Ok(())
}

/// Signs and broadcasts single EIP-1559 transactions from the configured wallet.
pub struct OrderSubmitter {
    provider: HttpProvider,
    signer: PrivateKeySigner,
    chain_id: u64,
    gas_oracle: GasOracle,
    poll_interval: Duration,
    timeout: Duration,
}

impl OrderSubmitter {
    pub fn new(
        provider: HttpProvider,
        signer: PrivateKeySigner,
        chain_id: u64,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            gas_oracle: GasOracle::new(provider.clone()),
            provider,
            signer,
            chain_id,
            poll_interval,
            timeout,
        }
    }

    fn request(&self, to: Address, calldata: &Bytes) -> TransactionRequest {
        TransactionRequest {
            from: Some(self.signer.address()),
            to: Some(TxKind::Call(to)),
            input: TransactionInput::new(calldata.clone()),
            ..Default::default()
        }
    }

    /// Sign `calldata` against `to` with the given nonce, gas and fees.
    pub fn sign(
        &self,
        to: Address,
        calldata: Bytes,
        nonce: u64,
        gas_limit: u64,
        fees: &GasFees,
    ) -> Result<(Vec<u8>, B256), AppError> {
        let mut tx = TxEip1559 {
            chain_id: self.chain_id,
            nonce,
            max_priority_fee_per_gas: fees.max_priority_fee_per_gas,
            max_fee_per_gas: fees.max_fee_per_gas,
            gas_limit,
            to: TxKind::Call(to),
            value: U256::ZERO,
            access_list: Default::default(),
            input: calldata,
        };
        let sig = TxSignerSync::sign_transaction_sync(&self.signer, &mut tx)
            .map_err(|e| AppError::Order(format!("Sign tx failed: {e}")))?;
        let signed: TxEnvelope = tx.into_signed(sig).into();
        Ok((signed.encoded_2718(), *signed.tx_hash()))
    }

    /// Estimate, sign, broadcast, and wait for the receipt.
    /// A revert or a missing receipt after the timeout is an error.
    pub async fn submit(&self, to: Address, calldata: Bytes) -> Result<TransactionReceipt, AppError> {
        let provider = &self.provider;
        let from = self.signer.address();
        let request = self.request(to, &calldata);

        let estimate = provider
            .estimate_gas(request)
            .await
            .map_err(|e| AppError::Transaction {
                hash: "unsent".into(),
                reason: format!("estimate_gas failed: {e}"),
            })?;
        let gas_limit = buffered_gas_limit(estimate);
        let fees = self.gas_oracle.estimate_eip1559_fees().await?;
        let nonce = retry_read("pending nonce", |_| async move {
            provider.get_transaction_count(from).pending().await
        })
        .await
        .map_err(|e| AppError::Connection(format!("Nonce fetch failed: {e}")))?;

        let (raw, hash) = self.sign(to, calldata, nonce, gas_limit, &fees)?;
        tracing::info!(
            target: "submit",
            tx_hash = %format!("{hash:#x}"),
            nonce,
            gas_limit,
            max_fee_per_gas = fees.max_fee_per_gas,
            max_priority_fee_per_gas = fees.max_priority_fee_per_gas,
            "Broadcasting transaction"
        );
        let pending = provider
            .send_raw_transaction(&raw)
            .await
            .map_err(|e| AppError::Transaction {
                hash: format!("{hash:#x}"),
                reason: format!("broadcast failed: {e}"),
            })?;
        check_broadcast_hash(hash, *pending.tx_hash())?;

        self.await_receipt(hash).await
    }

    pub async fn await_receipt(&self, hash: B256) -> Result<TransactionReceipt, AppError> {
        let started = Instant::now();
        let poll = self.poll_interval.max(Duration::from_millis(1));
        loop {
            match self.provider.get_transaction_receipt(hash).await {
                Ok(Some(receipt)) => {
                    if !receipt.status() {
                        return Err(AppError::Transaction {
                            hash: format!("{hash:#x}"),
                            reason: "reverted".into(),
                        });
                    }
                    tracing::info!(
                        target: "submit",
                        tx_hash = %format!("{hash:#x}"),
                        block = ?receipt.block_number,
                        gas_used = receipt.gas_used,
                        "Transaction confirmed"
                    );
                    return Ok(receipt);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(target: "submit", error = %e, "Receipt poll failed");
                }
            }
            if started.elapsed() >= self.timeout {
                return Err(AppError::Transaction {
                    hash: format!("{hash:#x}"),
                    reason: format!("no receipt after {}s", self.timeout.as_secs()),
                });
            }
            sleep(poll).await;
        }
    }
}

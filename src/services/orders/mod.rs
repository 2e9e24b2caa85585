// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

pub mod batch;
pub mod buy;
pub mod permit;
pub mod report;
pub mod sell;
pub mod submit;

use crate::domain::order::OrderTif;
use crate::network::processor::OrderProcessorClient;
use crate::network::provider::HttpProvider;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

/// Everything a flow needs to read chain state and sign on behalf of the wallet.
#[derive(Clone)]
pub struct OrderContext {
    pub provider: HttpProvider,
    pub signer: PrivateKeySigner,
    pub chain_id: u64,
    pub processor: OrderProcessorClient,
    pub tif: OrderTif,
    pub permit_deadline_secs: u64,
}

impl OrderContext {
    pub fn wallet(&self) -> Address {
        self.signer.address()
    }

    pub fn processor_address(&self) -> Address {
        self.processor.address()
    }
}

/// Order `requestTimestamp` is milliseconds since the epoch.
pub fn request_timestamp_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}

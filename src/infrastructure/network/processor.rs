// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::domain::error::AppError;
use crate::common::retry::retry_read;
use crate::data::order_processor::IOrderProcessor;
use crate::domain::order::OrderStatus;
use crate::network::provider::HttpProvider;
use alloy::primitives::{Address, U256};

/// Read-only calls against the deployed order processor.
#[derive(Clone)]
pub struct OrderProcessorClient {
    address: Address,
    contract: IOrderProcessor::IOrderProcessorInstance<HttpProvider>,
}

impl OrderProcessorClient {
    pub fn new(provider: HttpProvider, address: Address) -> Self {
        Self {
            address,
            contract: IOrderProcessor::new(address, provider),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Number of trailing decimals the processor strips from asset quantities.
    pub async fn order_decimal_reduction(&self, token: Address) -> Result<u8, AppError> {
        retry_read("orderDecimalReduction", |_| async move {
            self.contract.orderDecimalReduction(token).call().await
        })
        .await
        .map_err(|e| {
            AppError::Connection(format!(
                "orderDecimalReduction({token:#x}) failed: {e}"
            ))
        })
    }

    pub async fn order_status(&self, order_id: U256) -> Result<(OrderStatus, u8), AppError> {
        let code = retry_read("getOrderStatus", |_| async move {
            self.contract.getOrderStatus(order_id).call().await
        })
        .await
        .map_err(|e| AppError::Connection(format!("getOrderStatus({order_id}) failed: {e}")))?;
        Ok((OrderStatus::from_code(code), code))
    }
}

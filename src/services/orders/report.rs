// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::domain::error::AppError;
use crate::data::order_processor::IOrderProcessor;
use crate::domain::order::OrderStatus;
use crate::network::processor::OrderProcessorClient;
use alloy::primitives::{Address, Log, U256};
use alloy_sol_types::SolEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedOrder {
    pub id: U256,
    pub requester: Address,
    pub asset_token: Address,
    pub sell: bool,
    pub asset_quantity: U256,
    pub payment_quantity: U256,
    pub fees_escrowed: U256,
}

/// Pull every `OrderCreated` emitted by `processor` out of a receipt's logs.
/// Logs from other contracts are ignored; finding none is an error since the
/// batch is expected to create at least one order.
pub fn parse_order_created<'a>(
    processor: Address,
    logs: impl IntoIterator<Item = &'a Log>,
) -> Result<Vec<CreatedOrder>, AppError> {
    let mut orders = Vec::new();
    for log in logs {
        if log.address != processor
            || log.data.topics().first() != Some(&IOrderProcessor::OrderCreated::SIGNATURE_HASH)
        {
            continue;
        }
        let event = IOrderProcessor::OrderCreated::decode_log_data(&log.data)
            .map_err(|e| AppError::Order(format!("Malformed OrderCreated log: {e}")))?;
        orders.push(CreatedOrder {
            id: event.id,
            requester: event.requester,
            asset_token: event.order.assetToken,
            sell: event.order.sell,
            asset_quantity: event.order.assetTokenQuantity,
            payment_quantity: event.order.paymentTokenQuantity,
            fees_escrowed: event.feesEscrowed,
        });
    }
    if orders.is_empty() {
        return Err(AppError::Order("No OrderCreated events found".into()));
    }
    Ok(orders)
}

/// Query and log the current status of each created order.
pub async fn report_statuses(
    processor: &OrderProcessorClient,
    orders: &[CreatedOrder],
) -> Result<Vec<(CreatedOrder, OrderStatus)>, AppError> {
    let mut out = Vec::with_capacity(orders.len());
    for (idx, order) in orders.iter().enumerate() {
        let (status, code) = processor.order_status(order.id).await?;
        tracing::info!(
            target: "orders",
            index = idx + 1,
            order_id = %order.id,
            requester = %format!("{:#x}", order.requester),
            side = if order.sell { "sell" } else { "buy" },
            asset_token = %format!("{:#x}", order.asset_token),
            fees_escrowed = %order.fees_escrowed,
            status = %status,
            code,
            "Order status"
        );
        out.push((order.clone(), status));
    }
    Ok(out)
}

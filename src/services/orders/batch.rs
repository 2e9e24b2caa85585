// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::data::order_processor::IOrderProcessor;
use crate::domain::order::{OrderTif, OrderType};
use crate::network::dinari::FeeQuoteResponse;
use crate::services::orders::permit::SignedPermit;
use alloy::primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;

/// Market buy spending `payment_quantity` base units of the payment token.
pub fn buy_order(
    request_timestamp_ms: u64,
    recipient: Address,
    asset_token: Address,
    payment_token: Address,
    payment_quantity: U256,
    tif: OrderTif,
) -> IOrderProcessor::Order {
    IOrderProcessor::Order {
        requestTimestamp: request_timestamp_ms,
        recipient,
        assetToken: asset_token,
        paymentToken: payment_token,
        sell: false,
        orderType: OrderType::Market.code(),
        assetTokenQuantity: U256::ZERO,
        paymentTokenQuantity: payment_quantity,
        price: U256::ZERO,
        tif: tif.code(),
    }
}

/// Market sell of `asset_quantity` base units of the asset token.
pub fn sell_order(
    request_timestamp_ms: u64,
    recipient: Address,
    asset_token: Address,
    payment_token: Address,
    asset_quantity: U256,
    tif: OrderTif,
) -> IOrderProcessor::Order {
    IOrderProcessor::Order {
        requestTimestamp: request_timestamp_ms,
        recipient,
        assetToken: asset_token,
        paymentToken: payment_token,
        sell: true,
        orderType: OrderType::Market.code(),
        assetTokenQuantity: asset_quantity,
        paymentTokenQuantity: U256::ZERO,
        price: U256::ZERO,
        tif: tif.code(),
    }
}

/// Ordered payloads for a single `multicall` transaction.
#[derive(Debug, Clone, Default)]
pub struct MulticallBatch {
    calls: Vec<Bytes>,
    permits: usize,
    orders: usize,
}

impl MulticallBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_permit(&mut self, permit: &SignedPermit) {
        self.calls
            .push(Bytes::from(permit.self_permit_call().abi_encode()));
        self.permits += 1;
    }

    pub fn push_order(&mut self, order: IOrderProcessor::Order, quote: &FeeQuoteResponse) {
        let call = IOrderProcessor::createOrderCall {
            order,
            feeQuote: quote.quote().into(),
            feeQuoteSignature: quote.signature().clone(),
        };
        self.calls.push(Bytes::from(call.abi_encode()));
        self.orders += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn order_count(&self) -> usize {
        self.orders
    }

    pub fn permit_count(&self) -> usize {
        self.permits
    }

    pub fn calls(&self) -> &[Bytes] {
        &self.calls
    }

    /// Calldata for `multicall(bytes[])` on the order processor.
    pub fn calldata(&self) -> Bytes {
        Bytes::from(
            IOrderProcessor::multicallCall {
                data: self.calls.clone(),
            }
            .abi_encode(),
        )
    }
}

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::domain::constants::caip2_chain_id;
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Time-in-force. Discriminants match `IOrderProcessor.TIF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderTif {
    #[default]
    Day = 0,
    Gtc = 1,
    Ioc = 2,
    Fok = 3,
}

impl OrderTif {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Discriminants match `IOrderProcessor.OrderType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    #[default]
    Market = 0,
    Limit = 1,
}

impl OrderType {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// On-chain order lifecycle as reported by `getOrderStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Unknown,
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => OrderStatus::Pending,
            2 => OrderStatus::Completed,
            3 => OrderStatus::Cancelled,
            _ => OrderStatus::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Unknown => "Unknown",
            OrderStatus::Pending => "Pending",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Body of the brokerage EIP-155 fee-quote request.
///
/// Quantities are decimal strings in whole-token units; exactly one of them
/// is set depending on side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteRequest {
    pub chain_id: String,
    pub order_side: OrderSide,
    pub order_tif: OrderTif,
    pub order_type: OrderType,
    pub stock_id: String,
    pub payment_token: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_token_quantity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_token_quantity: Option<String>,
}

impl QuoteRequest {
    pub fn market_buy(
        chain_id: u64,
        tif: OrderTif,
        stock_id: &str,
        payment_token: Address,
        payment_quantity: String,
    ) -> Self {
        Self {
            chain_id: caip2_chain_id(chain_id),
            order_side: OrderSide::Buy,
            order_tif: tif,
            order_type: OrderType::Market,
            stock_id: stock_id.to_string(),
            payment_token,
            payment_token_quantity: Some(payment_quantity),
            asset_token_quantity: None,
        }
    }

    pub fn market_sell(
        chain_id: u64,
        tif: OrderTif,
        stock_id: &str,
        payment_token: Address,
        asset_quantity: String,
    ) -> Self {
        Self {
            chain_id: caip2_chain_id(chain_id),
            order_side: OrderSide::Sell,
            order_tif: tif,
            order_type: OrderType::Market,
            stock_id: stock_id.to_string(),
            payment_token,
            payment_token_quantity: None,
            asset_token_quantity: Some(asset_quantity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_codes_map_to_labels() {
        assert_eq!(OrderStatus::from_code(1).label(), "Pending");
        assert_eq!(OrderStatus::from_code(2).label(), "Completed");
        assert_eq!(OrderStatus::from_code(3), OrderStatus::Cancelled);
        assert_eq!(OrderStatus::from_code(0), OrderStatus::Unknown);
        assert_eq!(OrderStatus::from_code(42), OrderStatus::Unknown);
    }

    #[test]
    fn enum_codes_match_contract() {
        assert_eq!(OrderTif::Day.code(), 0);
        assert_eq!(OrderTif::Gtc.code(), 1);
        assert_eq!(OrderType::Market.code(), 0);
        assert_eq!(OrderType::Limit.code(), 1);
    }

    #[test]
    fn buy_request_serializes_payment_quantity_only() {
        let token = Address::from([0x66; 20]);
        let req = QuoteRequest::market_buy(11_155_111, OrderTif::Day, "stock-1", token, "5.2".into());
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "chain_id": "eip155:11155111",
                "order_side": "BUY",
                "order_tif": "DAY",
                "order_type": "MARKET",
                "stock_id": "stock-1",
                "payment_token": format!("{token}"),
                "payment_token_quantity": "5.2",
            })
        );
    }

    #[test]
    fn sell_request_serializes_asset_quantity_only() {
        let req = QuoteRequest::market_sell(
            1,
            OrderTif::Day,
            "stock-2",
            Address::ZERO,
            "0.25".into(),
        );
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["order_side"], "SELL");
        assert_eq!(value["asset_token_quantity"], "0.25");
        assert!(value.get("payment_token_quantity").is_none());
    }
}

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::domain::error::AppError;
use crate::common::parsing::format_decimal_units;
use crate::data::order_processor::IOrderProcessor;
use crate::domain::basket::Allocation;
use crate::domain::order::{OrderTif, QuoteRequest};
use crate::network::dinari::{DinariClient, FeeQuoteResponse};
use crate::services::orders::batch::{MulticallBatch, buy_order};
use crate::services::orders::permit::SignedPermit;
use alloy::primitives::{Address, U256};

/// Everything fixed for one buy run.
#[derive(Debug, Clone)]
pub struct BuyParams {
    pub chain_id: u64,
    pub recipient: Address,
    pub payment_token: Address,
    pub payment_decimals: u8,
    pub tif: OrderTif,
    pub request_timestamp_ms: u64,
}

/// A leg before its fee quote arrives.
#[derive(Debug, Clone)]
pub struct BuyDraft {
    pub stock_id: String,
    pub asset_token: Address,
    pub payment_quantity: U256,
    pub request: QuoteRequest,
    pub order: IOrderProcessor::Order,
}

#[derive(Debug, Clone)]
pub struct BuyLeg {
    pub draft: BuyDraft,
    pub quote: FeeQuoteResponse,
}

#[derive(Debug, Clone)]
pub struct BuyPlan {
    pub payment_token: Address,
    pub payment_decimals: u8,
    pub legs: Vec<BuyLeg>,
    pub dust: U256,
}

pub fn draft_buy_legs(params: &BuyParams, allocation: &Allocation) -> Vec<BuyDraft> {
    allocation
        .legs
        .iter()
        .map(|leg| {
            let quantity_str = format_decimal_units(leg.payment_quantity, params.payment_decimals);
            BuyDraft {
                stock_id: leg.asset.stock_id.clone(),
                asset_token: leg.asset.asset_token,
                payment_quantity: leg.payment_quantity,
                request: QuoteRequest::market_buy(
                    params.chain_id,
                    params.tif,
                    &leg.asset.stock_id,
                    params.payment_token,
                    quantity_str,
                ),
                order: buy_order(
                    params.request_timestamp_ms,
                    params.recipient,
                    leg.asset.asset_token,
                    params.payment_token,
                    leg.payment_quantity,
                    params.tif,
                ),
            }
        })
        .collect()
}

/// Pair drafts with their quotes. Quotes must be issued to the wallet that
/// will send the transaction, since the processor checks the requester.
pub fn assemble_plan(
    params: &BuyParams,
    drafts: Vec<BuyDraft>,
    quotes: Vec<FeeQuoteResponse>,
    dust: U256,
) -> Result<BuyPlan, AppError> {
    if drafts.len() != quotes.len() {
        return Err(AppError::Order(format!(
            "{} drafts but {} fee quotes",
            drafts.len(),
            quotes.len()
        )));
    }
    let mut legs = Vec::with_capacity(drafts.len());
    for (draft, quote) in drafts.into_iter().zip(quotes) {
        if quote.quote().requester != params.recipient {
            return Err(AppError::Order(format!(
                "fee quote for {} issued to {:#x}, expected {:#x}",
                draft.stock_id,
                quote.quote().requester,
                params.recipient
            )));
        }
        legs.push(BuyLeg { draft, quote });
    }
    Ok(BuyPlan {
        payment_token: params.payment_token,
        payment_decimals: params.payment_decimals,
        legs,
        dust,
    })
}

/// Quote every leg in basket order.
pub async fn quote_buy(
    dinari: &DinariClient,
    account_id: &str,
    params: &BuyParams,
    allocation: &Allocation,
) -> Result<BuyPlan, AppError> {
    let drafts = draft_buy_legs(params, allocation);
    let mut quotes = Vec::with_capacity(drafts.len());
    for draft in &drafts {
        tracing::info!(
            target: "orders",
            stock_id = %draft.stock_id,
            payment_quantity = %draft.payment_quantity,
            formatted = %draft.request.payment_token_quantity.as_deref().unwrap_or_default(),
            "Quoting buy leg"
        );
        quotes.push(dinari.get_fee_quote(account_id, &draft.request).await?);
    }
    assemble_plan(params, drafts, quotes, allocation.dust)
}

impl BuyPlan {
    pub fn total_order_amount(&self) -> U256 {
        self.legs
            .iter()
            .fold(U256::ZERO, |acc, leg| acc + leg.draft.payment_quantity)
    }

    pub fn total_fees(&self) -> U256 {
        self.legs
            .iter()
            .fold(U256::ZERO, |acc, leg| acc + leg.quote.fee())
    }

    /// Amount the processor pulls from the wallet: orders plus escrowed fees.
    pub fn total_spend(&self) -> U256 {
        self.total_order_amount() + self.total_fees()
    }

    pub fn log_summary(&self) {
        let fmt = |v: U256| format_decimal_units(v, self.payment_decimals);
        for (idx, leg) in self.legs.iter().enumerate() {
            tracing::info!(
                target: "orders",
                leg = idx + 1,
                stock_id = %leg.draft.stock_id,
                asset_token = %format!("{:#x}", leg.draft.asset_token),
                amount = %fmt(leg.draft.payment_quantity),
                fee = %fmt(leg.quote.fee()),
                quote_order_id = %leg.quote.quote().order_id,
                "Buy leg"
            );
        }
        tracing::info!(
            target: "orders",
            orders = self.legs.len(),
            total_order_amount = %fmt(self.total_order_amount()),
            total_fees = %fmt(self.total_fees()),
            total_spend = %fmt(self.total_spend()),
            dust = %fmt(self.dust),
            "Buy plan"
        );
    }

    /// One payment-token permit covering the whole spend, then every order.
    pub fn to_batch(&self, permit: &SignedPermit) -> Result<MulticallBatch, AppError> {
        if permit.token != self.payment_token {
            return Err(AppError::Order(format!(
                "permit token {:#x} is not the payment token {:#x}",
                permit.token, self.payment_token
            )));
        }
        if permit.value < self.total_spend() {
            return Err(AppError::Order(format!(
                "permit value {} below total spend {}",
                permit.value,
                self.total_spend()
            )));
        }
        let mut batch = MulticallBatch::new();
        batch.push_permit(permit);
        for leg in &self.legs {
            batch.push_order(leg.draft.order.clone(), &leg.quote);
        }
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::basket::{Basket, BasketAsset};
    use alloy::primitives::B256;
    use serde_json::json;

    const WALLET: Address = Address::new([0xda; 20]);
    const USDC: Address = Address::new([0x66; 20]);

    fn params() -> BuyParams {
        BuyParams {
            chain_id: 11_155_111,
            recipient: WALLET,
            payment_token: USDC,
            payment_decimals: 6,
            tif: OrderTif::Day,
            request_timestamp_ms: 1_752_000_000_000,
        }
    }

    fn allocation() -> Allocation {
        Basket::new(vec![
            BasketAsset {
                stock_id: "a".into(),
                asset_token: Address::new([1; 20]),
                weight: 40,
            },
            BasketAsset {
                stock_id: "b".into(),
                asset_token: Address::new([2; 20]),
                weight: 60,
            },
        ])
        .unwrap()
        .allocate(U256::from(13_000_000u64))
        .unwrap()
    }

    fn quote(requester: Address, fee: u64, order_id: u64) -> FeeQuoteResponse {
        serde_json::from_value(json!({
            "order_fee_contract_object": {
                "fee_quote": {
                    "orderId": order_id.to_string(),
                    "requester": format!("{requester:#x}"),
                    "fee": fee.to_string(),
                    "timestamp": 1,
                    "deadline": 2
                },
                "fee_quote_signature": "0x01"
            }
        }))
        .unwrap()
    }

    fn permit(value: U256) -> SignedPermit {
        SignedPermit {
            token: USDC,
            owner: WALLET,
            spender: Address::new([0x0f; 20]),
            value,
            nonce: U256::ZERO,
            deadline: U256::from(10u64),
            v: 28,
            r: B256::ZERO,
            s: B256::ZERO,
        }
    }

    #[test]
    fn drafts_carry_decimal_quote_and_base_unit_order() {
        let drafts = draft_buy_legs(&params(), &allocation());
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].request.payment_token_quantity.as_deref(), Some("5.2"));
        assert_eq!(drafts[1].request.payment_token_quantity.as_deref(), Some("7.8"));
        assert_eq!(drafts[0].order.paymentTokenQuantity, U256::from(5_200_000u64));
        assert_eq!(drafts[0].order.recipient, WALLET);
        assert_eq!(drafts[0].request.chain_id, "eip155:11155111");
    }

    #[test]
    fn totals_include_fees() {
        let p = params();
        let drafts = draft_buy_legs(&p, &allocation());
        let plan = assemble_plan(
            &p,
            drafts,
            vec![quote(WALLET, 100_000, 1), quote(WALLET, 150_000, 2)],
            U256::ZERO,
        )
        .unwrap();
        assert_eq!(plan.total_order_amount(), U256::from(13_000_000u64));
        assert_eq!(plan.total_fees(), U256::from(250_000u64));
        assert_eq!(plan.total_spend(), U256::from(13_250_000u64));

        let batch = plan.to_batch(&permit(plan.total_spend())).unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.order_count(), 2);
        assert!(plan.to_batch(&permit(U256::from(13_000_000u64))).is_err());
    }

    #[test]
    fn quote_for_other_requester_is_rejected() {
        let p = params();
        let drafts = draft_buy_legs(&p, &allocation());
        let err = assemble_plan(
            &p,
            drafts,
            vec![quote(WALLET, 1, 1), quote(Address::new([9; 20]), 1, 2)],
            U256::ZERO,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Order(msg) if msg.contains("issued to")));
    }

    #[test]
    fn quote_count_mismatch_is_rejected() {
        let p = params();
        let drafts = draft_buy_legs(&p, &allocation());
        assert!(assemble_plan(&p, drafts, vec![quote(WALLET, 1, 1)], U256::ZERO).is_err());
    }
}

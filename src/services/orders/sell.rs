// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::domain::error::AppError;
use crate::common::parsing::{format_decimal_units, pow10};
use crate::data::erc20::Permit;
use crate::data::ledger::{CrateEntry, CrateLedger};
use crate::data::order_processor::IOrderProcessor;
use crate::domain::order::QuoteRequest;
use crate::network::dinari::{DinariClient, FeeQuoteResponse};
use crate::network::token::{PermitToken, PermitTokenInfo};
use crate::services::orders::batch::{MulticallBatch, sell_order};
use crate::services::orders::permit::{SignedPermit, permit_deadline, permit_domain, sign_permit};
use crate::services::orders::{OrderContext, request_timestamp_ms};
use alloy::primitives::{Address, U256};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Drop the digits the processor would strip, so the escrowed amount matches
/// what the order actually fills.
pub fn round_to_order_precision(amount: U256, decimal_reduction: u8) -> U256 {
    if decimal_reduction == 0 {
        return amount;
    }
    let step = pow10(decimal_reduction);
    amount - amount % step
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SellDecision {
    Sell {
        /// Asset base units, already rounded to order precision.
        quantity: U256,
        /// Same quantity as whole shares, used for the quote and the ledger.
        shares: String,
    },
    Skip(String),
}

/// Decide what to do with one crate given on-chain state.
pub fn evaluate_crate(
    entry: &CrateEntry,
    decimals: u8,
    balance: U256,
    decimal_reduction: u8,
) -> Result<SellDecision, AppError> {
    let wanted = entry.shares_units(decimals)?;
    if wanted.is_zero() {
        return Ok(SellDecision::Skip("no shares recorded".into()));
    }
    if balance < wanted {
        return Ok(SellDecision::Skip(format!(
            "balance {} below recorded {}",
            format_decimal_units(balance, decimals),
            format_decimal_units(wanted, decimals)
        )));
    }
    let quantity = round_to_order_precision(wanted, decimal_reduction);
    if quantity.is_zero() {
        return Ok(SellDecision::Skip(format!(
            "{} shares below order precision (reduction {decimal_reduction})",
            format_decimal_units(wanted, decimals)
        )));
    }
    Ok(SellDecision::Sell {
        quantity,
        shares: format_decimal_units(quantity, decimals),
    })
}

/// Balance and permit nonce of one asset token, shared by every crate that
/// sells it within a single batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBudget {
    pub info: PermitTokenInfo,
    pub reduction: u8,
    pub remaining: U256,
    pub next_nonce: U256,
}

impl TokenBudget {
    async fn load(ctx: &OrderContext, asset: Address) -> Result<Self, AppError> {
        let wallet = ctx.wallet();
        let token = PermitToken::new(ctx.provider.clone(), asset);
        Ok(Self {
            info: token.permit_info().await?,
            reduction: ctx.processor.order_decimal_reduction(asset).await?,
            remaining: token.balance_of(wallet).await?,
            next_nonce: token.nonces(wallet).await?,
        })
    }

    /// Evaluate a crate against what is left of the balance, reserving the
    /// quantity when it sells.
    pub fn take(&mut self, entry: &CrateEntry) -> Result<SellDecision, AppError> {
        let decision = evaluate_crate(entry, self.info.decimals, self.remaining, self.reduction)?;
        if let SellDecision::Sell { quantity, .. } = &decision {
            self.remaining = self.remaining.saturating_sub(*quantity);
        }
        Ok(decision)
    }

    /// Permits consume nonces in batch order.
    pub fn claim_nonce(&mut self) -> U256 {
        let nonce = self.next_nonce;
        self.next_nonce += U256::from(1u64);
        nonce
    }
}

#[derive(Debug, Clone)]
pub struct SellLeg {
    /// Position of the crate in the ledger.
    pub ledger_index: usize,
    pub stock_id: String,
    pub asset_token: Address,
    pub decimals: u8,
    pub quantity: U256,
    pub shares: String,
    pub order: IOrderProcessor::Order,
    pub quote: FeeQuoteResponse,
    pub permit: SignedPermit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCrate {
    pub stock_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct SellPlan {
    pub legs: Vec<SellLeg>,
    pub skipped: Vec<SkippedCrate>,
}

impl SellPlan {
    /// Each leg contributes its own asset permit followed by its order.
    pub fn to_batch(&self) -> MulticallBatch {
        let mut batch = MulticallBatch::new();
        for leg in &self.legs {
            batch.push_permit(&leg.permit);
            batch.push_order(leg.order.clone(), &leg.quote);
        }
        batch
    }

    pub fn log_summary(&self) {
        for leg in &self.legs {
            tracing::info!(
                target: "orders",
                stock_id = %leg.stock_id,
                asset_token = %format!("{:#x}", leg.asset_token),
                shares = %leg.shares,
                fee = %leg.quote.fee(),
                "Sell leg"
            );
        }
        for skip in &self.skipped {
            tracing::warn!(target: "orders", stock_id = %skip.stock_id, reason = %skip.reason, "Crate skipped");
        }
        tracing::info!(
            target: "orders",
            orders = self.legs.len(),
            skipped = self.skipped.len(),
            "Sell plan"
        );
    }

    /// Deduct what was sold. Call only after the batch succeeded.
    pub fn apply_to_ledger(&self, ledger: &mut CrateLedger) -> Result<(), AppError> {
        for leg in &self.legs {
            ledger.deduct(leg.ledger_index, &leg.shares)?;
        }
        Ok(())
    }
}

/// Walk the ledger, quote and permit every sellable crate.
pub async fn plan_sell(
    ctx: &OrderContext,
    dinari: &DinariClient,
    account_id: &str,
    payment_token: Address,
    ledger: &CrateLedger,
) -> Result<SellPlan, AppError> {
    let wallet = ctx.wallet();
    let deadline = permit_deadline(&ctx.provider, ctx.permit_deadline_secs).await?;
    let timestamp = request_timestamp_ms();
    let mut budgets: HashMap<Address, TokenBudget> = HashMap::new();
    let mut plan = SellPlan::default();

    for (ledger_index, entry) in ledger.entries().iter().enumerate() {
        let budget = match budgets.entry(entry.share) {
            Entry::Occupied(slot) => slot.into_mut(),
            Entry::Vacant(slot) => slot.insert(TokenBudget::load(ctx, entry.share).await?),
        };

        let (quantity, shares) = match budget.take(entry)? {
            SellDecision::Sell { quantity, shares } => (quantity, shares),
            SellDecision::Skip(reason) => {
                plan.skipped.push(SkippedCrate {
                    stock_id: entry.stock_id.clone(),
                    reason,
                });
                continue;
            }
        };

        let request = QuoteRequest::market_sell(
            ctx.chain_id,
            ctx.tif,
            &entry.stock_id,
            payment_token,
            shares.clone(),
        );
        let quote = dinari.get_fee_quote(account_id, &request).await?;
        if quote.quote().requester != wallet {
            return Err(AppError::Order(format!(
                "fee quote for {} issued to {:#x}, expected {wallet:#x}",
                entry.stock_id,
                quote.quote().requester
            )));
        }

        let nonce = budget.claim_nonce();
        let permit = sign_permit(
            &ctx.signer,
            &permit_domain(&budget.info, ctx.chain_id),
            entry.share,
            Permit {
                owner: wallet,
                spender: ctx.processor_address(),
                value: quantity,
                nonce,
                deadline,
            },
        )?;

        plan.legs.push(SellLeg {
            ledger_index,
            stock_id: entry.stock_id.clone(),
            asset_token: entry.share,
            decimals: budget.info.decimals,
            quantity,
            shares,
            order: sell_order(
                timestamp,
                wallet,
                entry.share,
                payment_token,
                quantity,
                ctx.tif,
            ),
            quote,
            permit,
        });
    }
    Ok(plan)
}

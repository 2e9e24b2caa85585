// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::domain::error::AppError;
use crate::common::retry::retry_read;
use crate::network::provider::HttpProvider;
use alloy::providers::Provider;
use alloy::rpc::types::BlockNumberOrTag;
use alloy::rpc::types::eth::FeeHistory;

/// 1.5 gwei, used when the node reports no base fee.
const FALLBACK_BASE_FEE: u128 = 1_500_000_000;
/// 2 gwei tip floor when no reward history is available.
const FALLBACK_PRIORITY_FEE: u128 = 2_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasFees {
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
    pub next_base_fee_per_gas: u128,
}

#[derive(Clone)]
pub struct GasOracle {
    provider: HttpProvider,
}

impl GasOracle {
    pub fn new(provider: HttpProvider) -> Self {
        Self { provider }
    }

    pub async fn estimate_eip1559_fees(&self) -> Result<GasFees, AppError> {
        let provider = &self.provider;
        let history = retry_read("eth_feeHistory", |_| async move {
            provider
                .get_fee_history(5, BlockNumberOrTag::Latest, &[50.0f64])
                .await
        })
        .await;

        match history {
            Ok(history) => match fees_from_history(&history) {
                Some(fees) => Ok(fees),
                None => self.fallback_estimate().await,
            },
            Err(e) => {
                tracing::warn!(target: "rpc", error = %e, "feeHistory unavailable; using latest block");
                self.fallback_estimate().await
            }
        }
    }

    // Some public RPCs disable eth_feeHistory.
    async fn fallback_estimate(&self) -> Result<GasFees, AppError> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await
            .map_err(|e| AppError::Connection(format!("Latest block fetch failed: {}", e)))?;

        let base: u128 = block
            .as_ref()
            .and_then(|b| b.header.base_fee_per_gas)
            .map(u128::from)
            .unwrap_or(FALLBACK_BASE_FEE);

        let priority: u128 = self
            .provider
            .get_max_priority_fee_per_gas()
            .await
            .unwrap_or(FALLBACK_PRIORITY_FEE);

        Ok(fees_with_tip(bumped_base_fee(base), priority))
    }
}

/// 12.5% is the maximum per-block base fee increase.
fn bumped_base_fee(base: u128) -> u128 {
    base.saturating_mul(1125) / 1000
}

/// Max fee leaves room for one more full base-fee doubling.
fn fees_with_tip(next_base: u128, priority: u128) -> GasFees {
    GasFees {
        max_fee_per_gas: next_base.saturating_mul(2).saturating_add(priority),
        max_priority_fee_per_gas: priority,
        next_base_fee_per_gas: next_base,
    }
}

fn fees_from_history(history: &FeeHistory) -> Option<GasFees> {
    let latest_base_fee = history
        .latest_block_base_fee()
        .or_else(|| history.base_fee_per_gas.iter().rev().nth(1).copied())?;
    let next_base = match history.next_block_base_fee() {
        Some(0) | None => bumped_base_fee(latest_base_fee),
        Some(next) => next,
    };

    let tips: Vec<u128> = history
        .reward
        .as_ref()
        .map(|rewards| rewards.iter().filter_map(|r| r.first().copied()).collect())
        .unwrap_or_default();
    let priority = if tips.is_empty() {
        FALLBACK_PRIORITY_FEE
    } else {
        tips.iter().sum::<u128>() / tips.len() as u128
    };

    Some(fees_with_tip(next_base, priority))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(base: Vec<u128>, rewards: Option<Vec<Vec<u128>>>) -> FeeHistory {
        FeeHistory {
            oldest_block: 100,
            base_fee_per_gas: base,
            gas_used_ratio: vec![0.5, 0.5],
            reward: rewards,
            ..Default::default()
        }
    }

    #[test]
    fn averages_p50_rewards() {
        let h = history(vec![10, 12, 14], Some(vec![vec![4], vec![6]]));
        let fees = fees_from_history(&h).unwrap();
        assert_eq!(fees.next_base_fee_per_gas, 14);
        assert_eq!(fees.max_priority_fee_per_gas, 5);
        assert_eq!(fees.max_fee_per_gas, 33);
    }

    #[test]
    fn zero_next_base_gets_bumped() {
        let h = history(vec![1000, 0], None);
        let fees = fees_from_history(&h).unwrap();
        assert_eq!(fees.next_base_fee_per_gas, 1125);
        assert_eq!(fees.max_priority_fee_per_gas, FALLBACK_PRIORITY_FEE);
    }

    #[test]
    fn empty_history_yields_none() {
        assert!(fees_from_history(&history(vec![], None)).is_none());
    }
}

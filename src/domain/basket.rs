// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::domain::error::AppError;
use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// One stock in a basket and its relative weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketAsset {
    #[serde(rename = "stockId")]
    pub stock_id: String,
    #[serde(rename = "assetAddress")]
    pub asset_token: Address,
    #[serde(rename = "weightage")]
    pub weight: u32,
}

#[derive(Debug, Clone)]
pub struct Basket {
    assets: Vec<BasketAsset>,
}

/// Payment-token quantity assigned to one basket asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetAllocation {
    pub asset: BasketAsset,
    pub payment_quantity: U256,
}

#[derive(Debug, Clone)]
pub struct Allocation {
    pub legs: Vec<AssetAllocation>,
    /// Base units left over after flooring each leg.
    pub dust: U256,
}

impl Allocation {
    pub fn allocated(&self) -> U256 {
        self.legs
            .iter()
            .fold(U256::ZERO, |acc, leg| acc + leg.payment_quantity)
    }
}

impl Basket {
    pub fn new(assets: Vec<BasketAsset>) -> Result<Self, AppError> {
        if assets.is_empty() {
            return Err(AppError::validation("basket", "basket has no assets"));
        }
        let mut seen = HashSet::new();
        for asset in &assets {
            if asset.stock_id.trim().is_empty() {
                return Err(AppError::validation("basket.stockId", "empty stock id"));
            }
            if asset.asset_token == Address::ZERO {
                return Err(AppError::InvalidAddress(format!(
                    "zero asset token for {}",
                    asset.stock_id
                )));
            }
            if !seen.insert(asset.stock_id.as_str()) {
                return Err(AppError::validation(
                    "basket.stockId",
                    format!("duplicate stock {}", asset.stock_id),
                ));
            }
        }
        let basket = Self { assets };
        if basket.total_weight() == 0 {
            return Err(AppError::validation("basket.weightage", "weights sum to zero"));
        }
        Ok(basket)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read basket {}: {e}", path.display()))
        })?;
        let assets: Vec<BasketAsset> = serde_json::from_str(&raw).map_err(|e| {
            AppError::Config(format!("Invalid basket JSON {}: {e}", path.display()))
        })?;
        Self::new(assets)
    }

    pub fn assets(&self) -> &[BasketAsset] {
        &self.assets
    }

    pub fn total_weight(&self) -> u64 {
        self.assets.iter().map(|a| u64::from(a.weight)).sum()
    }

    /// Split `total` base units across the basket by weight, flooring each leg.
    ///
    /// Zero-weight assets are left out. A positive-weight asset whose share
    /// floors to zero is an error: the order processor rejects empty orders.
    pub fn allocate(&self, total: U256) -> Result<Allocation, AppError> {
        if total.is_zero() {
            return Err(AppError::validation("amount", "deposit amount is zero"));
        }
        let total_weight = U256::from(self.total_weight());
        let mut legs = Vec::with_capacity(self.assets.len());
        let mut allocated = U256::ZERO;

        for asset in self.assets.iter().filter(|a| a.weight > 0) {
            let payment_quantity = total
                .checked_mul(U256::from(asset.weight))
                .ok_or_else(|| AppError::validation("amount", "allocation overflow"))?
                / total_weight;
            if payment_quantity.is_zero() {
                return Err(AppError::validation(
                    "amount",
                    format!(
                        "{total} base units too small to fund {} at weight {}",
                        asset.stock_id, asset.weight
                    ),
                ));
            }
            allocated += payment_quantity;
            legs.push(AssetAllocation {
                asset: asset.clone(),
                payment_quantity,
            });
        }

        Ok(Allocation {
            legs,
            dust: total - allocated,
        })
    }
}

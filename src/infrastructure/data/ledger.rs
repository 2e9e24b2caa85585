// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::parsing::{format_decimal_units, parse_decimal_units};
use crate::domain::constants::LEDGER_DECIMALS;
use crate::domain::error::AppError;
use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One holding tracked in `crates.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrateEntry {
    #[serde(rename = "stockId")]
    pub stock_id: String,
    /// Asset token address.
    pub share: Address,
    /// Whole shares held, as a decimal (string or number in the file).
    #[serde(rename = "minShares")]
    pub min_shares: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CrateEntry {
    pub fn shares_decimal(&self) -> Result<String, AppError> {
        match &self.min_shares {
            Value::String(s) => Ok(s.trim().to_string()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Null => Ok("0".to_string()),
            other => Err(AppError::Ledger(format!(
                "minShares for {} is not numeric: {other}",
                self.stock_id
            ))),
        }
    }

    /// Shares in base units of a token with `decimals`.
    pub fn shares_units(&self, decimals: u8) -> Result<U256, AppError> {
        parse_decimal_units(&self.shares_decimal()?, decimals)
    }
}

#[derive(Debug, Clone)]
pub struct CrateLedger {
    path: PathBuf,
    entries: Vec<CrateEntry>,
}

impl CrateLedger {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AppError::Ledger(format!("Failed to read ledger {}: {e}", path.display()))
        })?;
        let entries: Vec<CrateEntry> = serde_json::from_str(&raw).map_err(|e| {
            AppError::Ledger(format!("Invalid ledger JSON {}: {e}", path.display()))
        })?;
        tracing::debug!(target: "ledger", path = %path.display(), crates = entries.len(), "Loaded ledger");
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn from_entries(path: &Path, entries: Vec<CrateEntry>) -> Self {
        Self {
            path: path.to_path_buf(),
            entries,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[CrateEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, stock_id: &str) -> Option<&CrateEntry> {
        self.entries.iter().find(|c| c.stock_id == stock_id)
    }

    /// Subtract `sold` whole shares from the crate at `index`, clamping at
    /// zero. Crates are addressed by position because the same stockId may
    /// appear more than once. Returns the remaining balance, or `None` when
    /// the index is out of range.
    pub fn deduct(&mut self, index: usize, sold: &str) -> Result<Option<String>, AppError> {
        let Some(entry) = self.entries.get_mut(index) else {
            tracing::warn!(target: "ledger", index, "Sold crate not present in ledger");
            return Ok(None);
        };
        let held = entry.shares_units(LEDGER_DECIMALS)?;
        let sold_units = parse_decimal_units(sold, LEDGER_DECIMALS)?;
        let remaining = held.saturating_sub(sold_units);
        let remaining_str = format_decimal_units(remaining, LEDGER_DECIMALS);

        // Keep the file's representation: numbers stay numbers when exact.
        entry.min_shares = match &entry.min_shares {
            Value::Number(_) => remaining_str
                .parse::<serde_json::Number>()
                .map(Value::Number)
                .unwrap_or_else(|_| Value::String(remaining_str.clone())),
            _ => Value::String(remaining_str.clone()),
        };
        tracing::info!(target: "ledger", stock_id = %entry.stock_id, sold, remaining = %remaining_str, "Ledger crate updated");
        Ok(Some(remaining_str))
    }

    pub fn to_json(&self) -> Result<String, AppError> {
        serde_json::to_string_pretty(&self.entries)
            .map_err(|e| AppError::Ledger(format!("Failed to serialize ledger: {e}")))
    }

    /// Write through a sibling temp file and rename so a crash never leaves
    /// a truncated ledger behind.
    pub fn save(&self) -> Result<(), AppError> {
        let body = self.to_json()?;
        let tmp = self.path.with_extension("json.tmp");
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Ledger(format!("Failed to create {}: {e}", parent.display())))?;
        }
        let mut file = fs::File::create(&tmp)
            .map_err(|e| AppError::Ledger(format!("Failed to create {}: {e}", tmp.display())))?;
        file.write_all(body.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| AppError::Ledger(format!("Failed to write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            AppError::Ledger(format!("Failed to replace {}: {e}", self.path.display()))
        })?;
        tracing::info!(target: "ledger", path = %self.path.display(), "Ledger saved");
        Ok(())
    }
}

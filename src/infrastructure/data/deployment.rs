// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::domain::error::AppError;
use crate::data::order_processor::IOrderProcessor;
use alloy::primitives::{Address, Selector};
use alloy_json_abi::JsonAbi;
use alloy_sol_types::SolCall;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Functions this tool encodes against the deployed order processor.
const REQUIRED_FUNCTIONS: &[(&str, [u8; 4])] = &[
    ("selfPermit", IOrderProcessor::selfPermitCall::SELECTOR),
    ("createOrder", IOrderProcessor::createOrderCall::SELECTOR),
    ("multicall", IOrderProcessor::multicallCall::SELECTOR),
    ("getOrderStatus", IOrderProcessor::getOrderStatusCall::SELECTOR),
    (
        "orderDecimalReduction",
        IOrderProcessor::orderDecimalReductionCall::SELECTOR,
    ),
];

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawManifest {
    #[serde(default)]
    abi: Option<JsonAbi>,
    #[serde(default)]
    network_addresses: HashMap<String, String>,
}

/// Release artifact for the order processor (`order_processor.json`).
#[derive(Debug, Clone)]
pub struct DeploymentManifest {
    abi: Option<JsonAbi>,
    addresses: HashMap<u64, Address>,
}

impl DeploymentManifest {
    pub fn load_from_file(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!(
                "Failed to read order processor manifest {}: {e}",
                path.display()
            ))
        })?;
        let manifest = Self::parse(&raw)?;
        tracing::info!(
            target: "config",
            path = %path.display(),
            networks = manifest.addresses.len(),
            "Loaded order processor manifest"
        );
        Ok(manifest)
    }

    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let parsed: RawManifest = serde_json::from_str(raw)
            .map_err(|e| AppError::Config(format!("Invalid order processor manifest: {e}")))?;

        let mut addresses = HashMap::new();
        for (chain_str, addr_str) in parsed.network_addresses {
            let chain_id = chain_str.trim().parse::<u64>().map_err(|_| {
                AppError::Config(format!("Invalid chain id '{chain_str}' in networkAddresses"))
            })?;
            let addr = addr_str
                .parse::<Address>()
                .map_err(|_| AppError::InvalidAddress(addr_str.clone()))?;
            addresses.insert(chain_id, addr);
        }

        let manifest = Self {
            abi: parsed.abi,
            addresses,
        };
        manifest.check_abi()?;
        Ok(manifest)
    }

    /// An ABI shipped with the manifest must expose every call we encode.
    fn check_abi(&self) -> Result<(), AppError> {
        let Some(abi) = &self.abi else {
            return Ok(());
        };
        for (name, selector) in REQUIRED_FUNCTIONS {
            let found = abi
                .function(name)
                .is_some_and(|overloads| overloads.iter().any(|f| f.selector() == Selector::from(*selector)));
            if !found {
                return Err(AppError::Config(format!(
                    "Order processor ABI is missing {name} (selector 0x{})",
                    hex::encode(selector)
                )));
            }
        }
        Ok(())
    }

    pub fn address_for_chain(&self, chain_id: u64) -> Result<Address, AppError> {
        self.addresses.get(&chain_id).copied().ok_or_else(|| {
            AppError::Config(format!(
                "Order processor not deployed on chain {chain_id}; set ORDER_PROCESSOR_ADDRESS"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const ADDR: &str = "0xd0d00Ee8457d79C12B4D7429F59e896F11364247";

    #[test]
    fn resolves_address_by_chain() {
        let raw = format!(r#"{{"networkAddresses": {{"11155111": "{ADDR}", "1": "{ADDR}"}}}}"#);
        let manifest = DeploymentManifest::parse(&raw).unwrap();
        assert_eq!(
            manifest.address_for_chain(11_155_111).unwrap(),
            Address::from_str(ADDR).unwrap()
        );
        assert_eq!(manifest.address_for_chain(1).unwrap(), Address::from_str(ADDR).unwrap());
        assert!(manifest.address_for_chain(42_161).is_err());
    }

    #[test]
    fn abi_missing_required_function_is_rejected() {
        let raw = format!(
            r#"{{"abi": [{{"type":"function","name":"multicall","inputs":[{{"name":"data","type":"bytes[]"}}],"outputs":[],"stateMutability":"nonpayable"}}],
                "networkAddresses": {{"1": "{ADDR}"}}}}"#
        );
        let err = DeploymentManifest::parse(&raw).unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("selfPermit")));
    }

    #[test]
    fn bad_chain_key_is_rejected() {
        let raw = format!(r#"{{"networkAddresses": {{"sepolia": "{ADDR}"}}}}"#);
        assert!(DeploymentManifest::parse(&raw).is_err());
    }
}

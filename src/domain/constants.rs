// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

// Chains
pub const CHAIN_ETHEREUM: u64 = 1;
pub const CHAIN_SEPOLIA: u64 = 11_155_111;
pub const CHAIN_ARBITRUM: u64 = 42_161;
pub const CHAIN_BASE: u64 = 8_453;

/// Brokerage REST endpoints.
pub const DINARI_SANDBOX_URL: &str = "https://api-enterprise.sandbox.dinari.com";
pub const DINARI_PRODUCTION_URL: &str = "https://api-enterprise.sbt.dinari.com";
pub const DINARI_KEY_ID_HEADER: &str = "X-API-Key-Id";
pub const DINARI_SECRET_HEADER: &str = "X-API-Secret-Key";

/// Companion holdings backend.
pub const DEFAULT_BACKEND_URL: &str = "https://use-crates.onrender.com";
pub const BACKEND_CRATES_PATH: &str = "/api/crates";

// Files resolved under the data dir
pub const DEFAULT_ORDER_PROCESSOR_FILE: &str = "order_processor.json";
pub const DEFAULT_BASKET_FILE: &str = "basket.json";
pub const DEFAULT_CRATES_FILE: &str = "crates.json";

/// USDC-style stablecoins settle with 6 decimals.
pub const DEFAULT_PAYMENT_DECIMALS: u8 = 6;
pub const DEFAULT_PERMIT_DEADLINE_SECS: u64 = 5 * 60;
pub const DEFAULT_RECEIPT_POLL_MS: u64 = 1_500;
pub const DEFAULT_RECEIPT_TIMEOUT_MS: u64 = 120_000;

/// Fixed-point precision used for ledger share arithmetic.
pub const LEDGER_DECIMALS: u8 = 18;

/// Token `version()` is optional under EIP-2612; OpenZeppelin defaults to "1".
pub const DEFAULT_PERMIT_VERSION: &str = "1";

/// Gas headroom applied on top of `eth_estimateGas`, in basis points.
pub const GAS_LIMIT_BUFFER_BPS: u64 = 12_000;

pub fn caip2_chain_id(chain_id: u64) -> String {
    format!("eip155:{chain_id}")
}

pub fn chain_name(chain_id: u64) -> &'static str {
    match chain_id {
        CHAIN_ETHEREUM => "ethereum",
        CHAIN_SEPOLIA => "sepolia",
        CHAIN_ARBITRUM => "arbitrum",
        CHAIN_BASE => "base",
        _ => "unknown",
    }
}

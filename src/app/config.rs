// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::common::data_path::{resolve_data_path, resolve_required_data_path};
use crate::domain::constants;
use crate::domain::error::AppError;
use crate::domain::order::OrderTif;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DinariEnvironment {
    #[default]
    Sandbox,
    Production,
}

impl DinariEnvironment {
    pub fn base_url(self) -> &'static str {
        match self {
            DinariEnvironment::Sandbox => constants::DINARI_SANDBOX_URL,
            DinariEnvironment::Production => constants::DINARI_PRODUCTION_URL,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DinariCredentials {
    pub key_id: String,
    pub secret_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GlobalSettings {
    // General
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub log_json: bool,
    pub data_dir: Option<String>,

    // Identity / chain
    pub private_key: Option<String>,
    pub rpc_url: Option<String>,
    pub chain_id: Option<u64>,
    #[serde(alias = "paymenttoken")]
    pub payment_token: Option<Address>,
    #[serde(default = "default_payment_decimals")]
    pub payment_decimals: u8,

    // Brokerage
    /// API key id; the secret lives in `dinari_api_secret_key`.
    pub dinari_api_key: Option<String>,
    pub dinari_api_secret_key: Option<String>,
    #[serde(default)]
    pub dinari_environment: DinariEnvironment,
    pub dinari_base_url: Option<String>,
    pub account_id: Option<String>,
    #[serde(default)]
    pub order_tif: OrderTif,

    // Contracts / files
    pub order_processor_path: Option<String>,
    pub order_processor_address: Option<Address>,
    pub basket_path: Option<String>,
    pub crates_path: Option<String>,

    // Holdings backend
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default)]
    pub backend_sync: bool,

    // Transaction
    #[serde(default = "default_permit_deadline_secs")]
    pub permit_deadline_secs: u64,
    #[serde(default = "default_receipt_poll_ms")]
    pub receipt_poll_ms: u64,
    #[serde(default = "default_receipt_timeout_ms")]
    pub receipt_timeout_ms: u64,
}

fn default_payment_decimals() -> u8 {
    constants::DEFAULT_PAYMENT_DECIMALS
}
fn default_backend_url() -> String {
    constants::DEFAULT_BACKEND_URL.to_string()
}
fn default_permit_deadline_secs() -> u64 {
    constants::DEFAULT_PERMIT_DEADLINE_SECS
}
fn default_receipt_poll_ms() -> u64 {
    constants::DEFAULT_RECEIPT_POLL_MS
}
fn default_receipt_timeout_ms() -> u64 {
    constants::DEFAULT_RECEIPT_TIMEOUT_MS
}

fn non_empty(raw: Option<&String>) -> Option<&str> {
    raw.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl GlobalSettings {
    pub fn load_with_path(path: Option<&str>) -> Result<Self, AppError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let mut builder = Config::builder();
        if let Some(selected_path) = resolve_config_path(path) {
            builder = builder.add_source(File::from(Path::new(&selected_path)).required(true));
        } else {
            builder = builder.add_source(File::with_name("config").required(false));
        }
        // CLI (in main) > env/.env > config file.
        builder = builder.add_source(Environment::default());

        let settings: GlobalSettings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.permit_deadline_secs == 0 {
            return Err(AppError::Config(
                "PERMIT_DEADLINE_SECS must be positive".into(),
            ));
        }
        if self.receipt_poll_ms == 0 || self.receipt_timeout_ms < self.receipt_poll_ms {
            return Err(AppError::Config(
                "RECEIPT_TIMEOUT_MS must be >= RECEIPT_POLL_MS > 0".into(),
            ));
        }
        if let Some(url) = non_empty(self.rpc_url.as_ref()) {
            Url::parse(url).map_err(|e| AppError::Config(format!("Invalid RPC_URL: {e}")))?;
        }
        Url::parse(&self.backend_url)
            .map_err(|e| AppError::Config(format!("Invalid BACKEND_URL: {e}")))?;
        Ok(())
    }

    pub fn signer(&self) -> Result<PrivateKeySigner, AppError> {
        let key = non_empty(self.private_key.as_ref())
            .ok_or_else(|| AppError::Config("PRIVATE_KEY is missing".into()))?;
        PrivateKeySigner::from_str(key)
            .map_err(|e| AppError::Config(format!("Invalid PRIVATE_KEY: {e}")))
    }

    pub fn rpc_url(&self) -> Result<&str, AppError> {
        non_empty(self.rpc_url.as_ref()).ok_or_else(|| AppError::Config("RPC_URL is missing".into()))
    }

    pub fn payment_token(&self) -> Result<Address, AppError> {
        match self.payment_token {
            Some(addr) if addr != Address::ZERO => Ok(addr),
            _ => Err(AppError::Config("PAYMENT_TOKEN is missing".into())),
        }
    }

    pub fn dinari_credentials(&self) -> Result<DinariCredentials, AppError> {
        let key_id = non_empty(self.dinari_api_key.as_ref())
            .ok_or_else(|| AppError::Config("DINARI_API_KEY is missing".into()))?;
        let secret_key = non_empty(self.dinari_api_secret_key.as_ref())
            .ok_or_else(|| AppError::Config("DINARI_API_SECRET_KEY is missing".into()))?;
        Ok(DinariCredentials {
            key_id: key_id.to_string(),
            secret_key: secret_key.to_string(),
        })
    }

    pub fn dinari_base_url(&self) -> String {
        non_empty(self.dinari_base_url.as_ref())
            .unwrap_or(self.dinari_environment.base_url())
            .trim_end_matches('/')
            .to_string()
    }

    pub fn account_id(&self) -> Result<&str, AppError> {
        non_empty(self.account_id.as_ref())
            .ok_or_else(|| AppError::Config("ACCOUNT_ID is missing".into()))
    }

    fn data_dir_value(&self) -> Option<&str> {
        non_empty(self.data_dir.as_ref())
    }

    fn path_setting(&self, configured: Option<&String>, default_file: &str) -> String {
        non_empty(configured).unwrap_or(default_file).to_string()
    }

    pub fn order_processor_path(&self) -> Result<PathBuf, AppError> {
        let raw = self.path_setting(
            self.order_processor_path.as_ref(),
            constants::DEFAULT_ORDER_PROCESSOR_FILE,
        );
        resolve_required_data_path(&raw, self.data_dir_value())
    }

    pub fn basket_path(&self) -> Result<PathBuf, AppError> {
        let raw = self.path_setting(self.basket_path.as_ref(), constants::DEFAULT_BASKET_FILE);
        resolve_required_data_path(&raw, self.data_dir_value())
    }

    /// Ledger path; may not exist yet when pulling from the backend.
    pub fn crates_path(&self) -> PathBuf {
        let raw = self.path_setting(self.crates_path.as_ref(), constants::DEFAULT_CRATES_FILE);
        resolve_data_path(&raw, self.data_dir_value())
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_ms)
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_millis(self.receipt_timeout_ms)
    }
}

fn resolve_config_path(path: Option<&str>) -> Option<String> {
    if let Some(path) = path.map(str::trim).filter(|p| !p.is_empty()) {
        return Some(path.to_string());
    }
    std::env::var("CONFIG_PATH")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::domain::error::AppError;
use crate::common::retry::retry_read;
use crate::data::ledger::CrateEntry;
use crate::domain::constants::BACKEND_CRATES_PATH;
use reqwest::Client;
use std::time::Duration;

const PROVIDER: &str = "crates backend";
// Free-tier hosts cold-start slowly.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

/// Companion service mirroring the local crate ledger.
#[derive(Clone)]
pub struct HoldingsBackend {
    client: Client,
    base_url: String,
}

impl HoldingsBackend {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Initialization(format!("HTTP client build failed: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn crates_url(&self) -> String {
        format!("{}{BACKEND_CRATES_PATH}", self.base_url)
    }

    pub async fn fetch_crates(&self) -> Result<Vec<CrateEntry>, AppError> {
        let url = self.crates_url();
        let resp = retry_read("backend crates", |_| {
            let req = self.client.get(&url);
            async move { req.send().await }
        })
        .await
        .map_err(|e| AppError::Connection(format!("{PROVIDER} GET failed: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::ApiCall {
                provider: PROVIDER.into(),
                status: status.as_u16(),
            });
        }
        let entries: Vec<CrateEntry> = resp.json().await.map_err(|e| AppError::ApiCall {
            provider: format!("{PROVIDER} JSON ({e})"),
            status: status.as_u16(),
        })?;
        tracing::info!(target: "backend", crates = entries.len(), "Fetched holdings");
        Ok(entries)
    }

    pub async fn push_crates(&self, entries: &[CrateEntry]) -> Result<(), AppError> {
        let resp = self
            .client
            .post(self.crates_url())
            .json(entries)
            .send()
            .await
            .map_err(|e| AppError::Connection(format!("{PROVIDER} POST failed: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(target: "backend", status = %status, body = %body, "Holdings push rejected");
            return Err(AppError::ApiCall {
                provider: PROVIDER.into(),
                status: status.as_u16(),
            });
        }
        tracing::info!(target: "backend", crates = entries.len(), "Holdings pushed");
        Ok(())
    }
}

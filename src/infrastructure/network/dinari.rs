// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::app::config::DinariCredentials;
use crate::domain::error::AppError;
use crate::common::parsing::parse_u256_flexible;
use crate::data::order_processor::IOrderProcessor;
use crate::domain::constants::{DINARI_KEY_ID_HEADER, DINARI_SECRET_HEADER};
use crate::domain::order::QuoteRequest;
use alloy::primitives::{Address, Bytes, U256};
use reqwest::Client;
use serde::de::{DeserializeOwned, Error as DeError};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::time::Duration;

const PROVIDER: &str = "Dinari";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

fn de_u256_flexible<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => {
            parse_u256_flexible(&s).ok_or_else(|| D::Error::custom(format!("invalid integer '{s}'")))
        }
        Value::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| D::Error::custom(format!("integer {n} out of u64 range; send as string"))),
        other => Err(D::Error::custom(format!("expected integer, got {other}"))),
    }
}

fn de_u64_flexible<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = de_u256_flexible(deserializer)?;
    u64::try_from(value).map_err(|_| D::Error::custom(format!("{value} exceeds u64")))
}

/// Fill amounts arrive as JSON numbers or numeric strings depending on the
/// endpoint version.
fn de_opt_f64_flexible<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid amount '{s}'"))),
        other => Err(D::Error::custom(format!("expected amount, got {other}"))),
    }
}

/// Fee quote as signed by the brokerage, in the shape `createOrder` expects.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContractFeeQuote {
    #[serde(rename = "orderId", deserialize_with = "de_u256_flexible")]
    pub order_id: U256,
    pub requester: Address,
    #[serde(deserialize_with = "de_u256_flexible")]
    pub fee: U256,
    #[serde(deserialize_with = "de_u64_flexible")]
    pub timestamp: u64,
    #[serde(deserialize_with = "de_u64_flexible")]
    pub deadline: u64,
}

impl From<&ContractFeeQuote> for IOrderProcessor::FeeQuote {
    fn from(q: &ContractFeeQuote) -> Self {
        IOrderProcessor::FeeQuote {
            orderId: q.order_id,
            requester: q.requester,
            fee: q.fee,
            timestamp: q.timestamp,
            deadline: q.deadline,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderFeeContractObject {
    pub fee_quote: ContractFeeQuote,
    pub fee_quote_signature: Bytes,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeeQuoteResponse {
    pub order_fee_contract_object: OrderFeeContractObject,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FeeQuoteResponse {
    pub fn quote(&self) -> &ContractFeeQuote {
        &self.order_fee_contract_object.fee_quote
    }

    pub fn fee(&self) -> U256 {
        self.quote().fee
    }

    pub fn signature(&self) -> &Bytes {
        &self.order_fee_contract_object.fee_quote_signature
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderFulfillment {
    pub id: String,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64_flexible")]
    pub asset_token_filled: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64_flexible")]
    pub asset_token_spent: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64_flexible")]
    pub payment_token_filled: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64_flexible")]
    pub payment_token_spent: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64_flexible")]
    pub payment_token_fee: Option<f64>,
    #[serde(default)]
    pub transaction_dt: Option<String>,
    #[serde(default)]
    pub transaction_hash: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Thin client over the brokerage v2 REST API.
#[derive(Clone)]
pub struct DinariClient {
    client: Client,
    base_url: String,
    credentials: DinariCredentials,
}

impl DinariClient {
    pub fn new(base_url: &str, credentials: DinariCredentials) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Initialization(format!("HTTP client build failed: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn fee_quote_url(&self, account_id: &str) -> String {
        format!(
            "{}/api/v2/accounts/{account_id}/orders/stocks/eip155/fee_quote",
            self.base_url
        )
    }

    pub fn fulfillments_url(&self, account_id: &str, order_id: &str) -> String {
        format!(
            "{}/api/v2/accounts/{account_id}/orders/{order_id}/fulfillments",
            self.base_url
        )
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header(DINARI_KEY_ID_HEADER, &self.credentials.key_id)
            .header(DINARI_SECRET_HEADER, &self.credentials.secret_key)
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        resp: reqwest::Response,
    ) -> Result<T, AppError> {
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| AppError::Connection(format!("{PROVIDER} {endpoint} body read failed: {e}")))?;
        if !status.is_success() {
            tracing::warn!(target: "dinari", endpoint, status = %status, body = %body, "Request rejected");
            return Err(AppError::ApiCall {
                provider: format!("{PROVIDER} {endpoint}"),
                status: status.as_u16(),
            });
        }
        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(target: "dinari", endpoint, body = %body, "Unexpected response shape");
            AppError::ApiCall {
                provider: format!("{PROVIDER} {endpoint} JSON ({e})"),
                status: status.as_u16(),
            }
        })
    }

    pub async fn get_fee_quote(
        &self,
        account_id: &str,
        request: &QuoteRequest,
    ) -> Result<FeeQuoteResponse, AppError> {
        let url = self.fee_quote_url(account_id);
        tracing::debug!(target: "dinari", stock_id = %request.stock_id, side = ?request.order_side, "Requesting fee quote");
        let resp = self
            .authed(self.client.post(&url))
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Connection(format!("{PROVIDER} fee_quote POST failed: {e}")))?;
        let quote: FeeQuoteResponse = self.decode("fee_quote", resp).await?;
        tracing::info!(
            target: "dinari",
            stock_id = %request.stock_id,
            order_id = %quote.quote().order_id,
            fee = %quote.fee(),
            "Fee quote received"
        );
        Ok(quote)
    }

    pub async fn get_fulfillments(
        &self,
        account_id: &str,
        order_id: &str,
    ) -> Result<Vec<OrderFulfillment>, AppError> {
        let url = self.fulfillments_url(account_id, order_id);
        let resp = self
            .authed(self.client.get(&url))
            .send()
            .await
            .map_err(|e| AppError::Connection(format!("{PROVIDER} fulfillments GET failed: {e}")))?;
        self.decode("fulfillments", resp).await
    }
}

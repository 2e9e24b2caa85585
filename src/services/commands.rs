// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::app::config::GlobalSettings;
use crate::domain::error::AppError;
use crate::common::parsing::{format_decimal_units, parse_decimal_units, parse_u256_flexible};
use crate::data::deployment::DeploymentManifest;
use crate::data::ledger::CrateLedger;
use crate::domain::basket::Basket;
use crate::network::backend::HoldingsBackend;
use crate::network::dinari::{DinariClient, FeeQuoteResponse};
use crate::network::processor::OrderProcessorClient;
use crate::network::provider::{ConnectionFactory, HttpProvider};
use crate::network::token::PermitToken;
use crate::services::orders::batch::MulticallBatch;
use crate::services::orders::buy::{BuyParams, BuyPlan, quote_buy};
use crate::services::orders::permit::{permit_deadline, permit_for};
use crate::services::orders::report::{CreatedOrder, parse_order_created, report_statuses};
use crate::services::orders::sell::{SellPlan, plan_sell};
use crate::services::orders::submit::OrderSubmitter;
use crate::services::orders::{OrderContext, request_timestamp_ms};
use alloy::primitives::Address;
use alloy::rpc::types::eth::TransactionReceipt;
use std::path::{Path, PathBuf};

/// Provider plus resolved chain id and order processor; no signer needed.
struct ReadContext {
    provider: HttpProvider,
    chain_id: u64,
    processor: OrderProcessorClient,
}

async fn read_context(settings: &GlobalSettings) -> Result<ReadContext, AppError> {
    let provider = ConnectionFactory::http(settings.rpc_url()?)?;
    let chain_id = ConnectionFactory::resolve_chain_id(&provider, settings.chain_id).await?;
    let address = resolve_processor_address(settings, chain_id)?;
    tracing::info!(target: "orders", processor = %format!("{address:#x}"), "Order processor");
    Ok(ReadContext {
        processor: OrderProcessorClient::new(provider.clone(), address),
        provider,
        chain_id,
    })
}

fn resolve_processor_address(settings: &GlobalSettings, chain_id: u64) -> Result<Address, AppError> {
    if let Some(addr) = settings.order_processor_address
        && addr != Address::ZERO
    {
        return Ok(addr);
    }
    DeploymentManifest::load_from_file(&settings.order_processor_path()?)?.address_for_chain(chain_id)
}

async fn order_context(settings: &GlobalSettings) -> Result<OrderContext, AppError> {
    let signer = settings.signer()?;
    let read = read_context(settings).await?;
    tracing::info!(target: "orders", wallet = %format!("{:#x}", signer.address()), "Wallet");
    Ok(OrderContext {
        provider: read.provider,
        signer,
        chain_id: read.chain_id,
        processor: read.processor,
        tif: settings.order_tif,
        permit_deadline_secs: settings.permit_deadline_secs,
    })
}

fn dinari_client(settings: &GlobalSettings) -> Result<DinariClient, AppError> {
    DinariClient::new(&settings.dinari_base_url(), settings.dinari_credentials()?)
}

/// Quotes are signed with an expiry; an expired one makes `createOrder` revert.
fn warn_stale_quotes<'a>(quotes: impl IntoIterator<Item = (&'a str, &'a FeeQuoteResponse)>) {
    let now = request_timestamp_ms() / 1_000;
    for (stock_id, quote) in quotes {
        if quote.quote().deadline <= now {
            tracing::warn!(
                target: "orders",
                stock_id,
                deadline = quote.quote().deadline,
                now,
                "Fee quote already expired"
            );
        }
    }
}

async fn plan_buy(
    settings: &GlobalSettings,
    ctx: &OrderContext,
    amount: &str,
    basket_path: Option<&Path>,
) -> Result<BuyPlan, AppError> {
    let basket_path = match basket_path {
        Some(p) => p.to_path_buf(),
        None => settings.basket_path()?,
    };
    let basket = Basket::load_from_file(&basket_path)?;
    let payment_token = settings.payment_token()?;
    let total = parse_decimal_units(amount, settings.payment_decimals)?;
    let allocation = basket.allocate(total)?;

    let params = BuyParams {
        chain_id: ctx.chain_id,
        recipient: ctx.wallet(),
        payment_token,
        payment_decimals: settings.payment_decimals,
        tif: ctx.tif,
        request_timestamp_ms: request_timestamp_ms(),
    };
    let plan = quote_buy(&dinari_client(settings)?, settings.account_id()?, &params, &allocation).await?;
    warn_stale_quotes(
        plan.legs
            .iter()
            .map(|leg| (leg.draft.stock_id.as_str(), &leg.quote)),
    );
    plan.log_summary();
    Ok(plan)
}

/// Allocate, quote, and print the plan without touching the wallet.
pub async fn run_quote(settings: &GlobalSettings, amount: &str, basket: Option<&Path>) -> Result<(), AppError> {
    let ctx = order_context(settings).await?;
    plan_buy(settings, &ctx, amount, basket).await?;
    Ok(())
}

pub async fn run_buy(
    settings: &GlobalSettings,
    amount: &str,
    basket: Option<&Path>,
    dry_run: bool,
) -> Result<Option<Vec<CreatedOrder>>, AppError> {
    let ctx = order_context(settings).await?;
    let plan = plan_buy(settings, &ctx, amount, basket).await?;
    if plan.legs.is_empty() {
        tracing::info!(target: "orders", "No orders");
        return Ok(None);
    }

    let payment = PermitToken::new(ctx.provider.clone(), plan.payment_token);
    let on_chain_decimals = payment.decimals().await?;
    if on_chain_decimals != settings.payment_decimals {
        return Err(AppError::Config(format!(
            "PAYMENT_DECIMALS is {} but token reports {on_chain_decimals}",
            settings.payment_decimals
        )));
    }
    let spend = plan.total_spend();
    let balance = payment.balance_of(ctx.wallet()).await?;
    if balance < spend {
        return Err(AppError::InsufficientFunds {
            required: format_decimal_units(spend, settings.payment_decimals),
            available: format_decimal_units(balance, settings.payment_decimals),
        });
    }

    let deadline = permit_deadline(&ctx.provider, ctx.permit_deadline_secs).await?;
    let permit = permit_for(
        &payment,
        &ctx.signer,
        ctx.chain_id,
        ctx.processor_address(),
        spend,
        deadline,
    )
    .await?;
    let batch = plan.to_batch(&permit)?;
    match execute_batch(settings, &ctx, &batch, dry_run).await? {
        BatchOutcome::Confirmed(receipt) => report_created(&ctx, &receipt).await.map(Some),
        BatchOutcome::Empty | BatchOutcome::DryRun => Ok(None),
    }
}

pub async fn run_sell(
    settings: &GlobalSettings,
    crates: Option<&Path>,
    dry_run: bool,
) -> Result<Option<Vec<CreatedOrder>>, AppError> {
    let path = crates.map(Path::to_path_buf).unwrap_or_else(|| settings.crates_path());
    let mut ledger = CrateLedger::load(&path)?;
    if ledger.is_empty() {
        tracing::info!(target: "orders", path = %path.display(), "No crates in ledger");
        return Ok(None);
    }

    let ctx = order_context(settings).await?;
    let plan = plan_sell(
        &ctx,
        &dinari_client(settings)?,
        settings.account_id()?,
        settings.payment_token()?,
        &ledger,
    )
    .await?;
    warn_stale_quotes(plan.legs.iter().map(|leg| (leg.stock_id.as_str(), &leg.quote)));
    plan.log_summary();

    let outcome = execute_batch(settings, &ctx, &plan.to_batch(), dry_run).await?;
    if !settle_sell(&plan, &mut ledger, &outcome)? {
        return Ok(None);
    }
    sync_backend(settings, &ledger).await;
    match &outcome {
        BatchOutcome::Confirmed(receipt) => report_created(&ctx, receipt).await.map(Some),
        BatchOutcome::Empty | BatchOutcome::DryRun => Ok(None),
    }
}

/// What happened to a multicall batch.
#[derive(Debug)]
enum BatchOutcome {
    Empty,
    DryRun,
    Confirmed(TransactionReceipt),
}

/// Deduct and persist the sold crates once the batch is on chain. The
/// ledger is written before anything else can fail so a confirmed sale is
/// never left unrecorded.
fn settle_sell(plan: &SellPlan, ledger: &mut CrateLedger, outcome: &BatchOutcome) -> Result<bool, AppError> {
    if !matches!(outcome, BatchOutcome::Confirmed(_)) {
        return Ok(false);
    }
    plan.apply_to_ledger(ledger)?;
    ledger.save()?;
    Ok(true)
}

/// Decode the receipt's `OrderCreated` events and log each order's status.
async fn report_created(ctx: &OrderContext, receipt: &TransactionReceipt) -> Result<Vec<CreatedOrder>, AppError> {
    let created = parse_order_created(
        ctx.processor_address(),
        receipt.inner.logs().iter().map(|log| &log.inner),
    )?;
    report_statuses(&ctx.processor, &created).await?;
    Ok(created)
}

/// Submit the batch unless it is empty or this is a dry run.
async fn execute_batch(
    settings: &GlobalSettings,
    ctx: &OrderContext,
    batch: &MulticallBatch,
    dry_run: bool,
) -> Result<BatchOutcome, AppError> {
    if batch.is_empty() {
        tracing::info!(target: "orders", "No orders");
        return Ok(BatchOutcome::Empty);
    }
    let calldata = batch.calldata();
    tracing::info!(
        target: "orders",
        calls = batch.len(),
        permits = batch.permit_count(),
        orders = batch.order_count(),
        calldata_bytes = calldata.len(),
        "Multicall batch ready"
    );
    if dry_run {
        tracing::info!(target: "orders", calldata = %calldata, "Dry run; not submitting");
        return Ok(BatchOutcome::DryRun);
    }

    let submitter = OrderSubmitter::new(
        ctx.provider.clone(),
        ctx.signer.clone(),
        ctx.chain_id,
        settings.receipt_poll_interval(),
        settings.receipt_timeout(),
    );
    let receipt = submitter.submit(ctx.processor_address(), calldata).await?;
    Ok(BatchOutcome::Confirmed(receipt))
}

async fn sync_backend(settings: &GlobalSettings, ledger: &CrateLedger) {
    if !settings.backend_sync {
        return;
    }
    let result = match HoldingsBackend::new(&settings.backend_url) {
        Ok(backend) => backend.push_crates(ledger.entries()).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        tracing::warn!(target: "backend", error = %e, "Holdings sync failed; local ledger is current");
    }
}

pub async fn run_status(settings: &GlobalSettings, order_id: &str) -> Result<(), AppError> {
    let id = parse_u256_flexible(order_id)
        .ok_or_else(|| AppError::validation("order_id", format!("not a number: {order_id}")))?;
    let read = read_context(settings).await?;
    let (status, code) = read.processor.order_status(id).await?;
    println!("Order {id}: {status} ({code})");
    Ok(())
}

pub async fn run_fulfillments(settings: &GlobalSettings, order_id: &str) -> Result<(), AppError> {
    let fills = dinari_client(settings)?
        .get_fulfillments(settings.account_id()?, order_id)
        .await?;
    if fills.is_empty() {
        println!("No fulfillments for order {order_id}");
    }
    for fill in &fills {
        println!(
            "{} filled={} spent={} fee={} tx={}",
            fill.id,
            fill.asset_token_filled.unwrap_or_default(),
            fill.payment_token_spent.unwrap_or_default(),
            fill.payment_token_fee.unwrap_or_default(),
            fill.transaction_hash.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

/// Print the ledger, optionally replacing it with the backend copy first.
pub async fn run_ledger(settings: &GlobalSettings, crates: Option<&Path>, pull: bool) -> Result<(), AppError> {
    let path: PathBuf = crates.map(Path::to_path_buf).unwrap_or_else(|| settings.crates_path());
    let ledger = if pull {
        let entries = HoldingsBackend::new(&settings.backend_url)?.fetch_crates().await?;
        let ledger = CrateLedger::from_entries(&path, entries);
        ledger.save()?;
        ledger
    } else {
        CrateLedger::load(&path)?
    };
    println!("{}", ledger.to_json()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::orders::sell::tests::{leg, units};
    use crate::app::config::tests::base_settings;
    use crate::domain::order::OrderTif;
    use alloy::signers::local::PrivateKeySigner;
    use std::fs;

    #[test]
    fn explicit_processor_address_wins() {
        let mut settings = base_settings();
        settings.order_processor_address = Some(Address::from([0x0f; 20]));
        settings.order_processor_path = Some("/nonexistent/manifest.json".into());
        assert_eq!(
            resolve_processor_address(&settings, 1).unwrap(),
            Address::from([0x0f; 20])
        );
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let mut settings = base_settings();
        settings.order_processor_address = None;
        settings.order_processor_path = Some("/nonexistent/manifest.json".into());
        assert!(resolve_processor_address(&settings, 1).is_err());
    }

    fn offline_context() -> OrderContext {
        let provider = ConnectionFactory::http("http://127.0.0.1:8545").unwrap();
        OrderContext {
            processor: OrderProcessorClient::new(provider.clone(), Address::from([0x0f; 20])),
            provider,
            signer: PrivateKeySigner::random(),
            chain_id: 11_155_111,
            tif: OrderTif::Day,
            permit_deadline_secs: 300,
        }
    }

    #[tokio::test]
    async fn dry_run_leaves_ledger_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crates.json");
        let body = r#"[{"stockId": "AAPL", "share": "0x0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a", "minShares": "2"}]"#;
        fs::write(&path, body).unwrap();
        let mut ledger = CrateLedger::load(&path).unwrap();

        let plan = SellPlan {
            legs: vec![leg(0, Address::from([0x0a; 20]), units(2), 0)],
            skipped: vec![],
        };
        let outcome = execute_batch(&base_settings(), &offline_context(), &plan.to_batch(), true)
            .await
            .unwrap();
        assert!(matches!(outcome, BatchOutcome::DryRun));
        assert!(!settle_sell(&plan, &mut ledger, &outcome).unwrap());

        assert_eq!(fs::read_to_string(&path).unwrap(), body);
        assert_eq!(ledger.entries()[0].min_shares, serde_json::json!("2"));
    }

    #[tokio::test]
    async fn empty_batch_is_not_submitted() {
        let outcome = execute_batch(&base_settings(), &offline_context(), &MulticallBatch::new(), false)
            .await
            .unwrap();
        assert!(matches!(outcome, BatchOutcome::Empty));
    }
}

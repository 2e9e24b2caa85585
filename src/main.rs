// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use basket_trader::app::config::GlobalSettings;
use basket_trader::app::logging::setup_logging;
use basket_trader::domain::error::AppError;
use basket_trader::services::commands;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "basket trader for tokenized equities")]
struct Cli {
    /// Path to config file (default: config.{toml,yaml,...})
    #[arg(long, global = true)]
    config: Option<String>,

    /// Build, quote and sign, but do not submit the transaction
    #[arg(long, global = true, default_value_t = false)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Buy the basket for a payment-token amount
    Buy {
        /// Decimal amount of the payment token, e.g. 13.42
        #[arg(long)]
        amount: String,
        #[arg(long)]
        basket: Option<PathBuf>,
    },
    /// Sell every crate recorded in the ledger
    Sell {
        #[arg(long)]
        crates: Option<PathBuf>,
    },
    /// Allocate and fetch fee quotes without signing
    Quote {
        #[arg(long)]
        amount: String,
        #[arg(long)]
        basket: Option<PathBuf>,
    },
    /// On-chain status of an order id
    Status { order_id: String },
    /// Brokerage fulfillments for an order id
    Fulfillments { order_id: String },
    /// Print the crate ledger
    Ledger {
        #[arg(long)]
        crates: Option<PathBuf>,
        /// Replace the local ledger with the backend copy first
        #[arg(long, default_value_t = false)]
        pull: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let settings = GlobalSettings::load_with_path(cli.config.as_deref())?;
    setup_logging(
        if settings.debug { "debug" } else { "info" },
        settings.log_json,
    );

    match cli.command {
        Command::Buy { amount, basket } => {
            commands::run_buy(&settings, &amount, basket.as_deref(), cli.dry_run).await?;
        }
        Command::Sell { crates } => {
            commands::run_sell(&settings, crates.as_deref(), cli.dry_run).await?;
        }
        Command::Quote { amount, basket } => {
            commands::run_quote(&settings, &amount, basket.as_deref()).await?;
        }
        Command::Status { order_id } => commands::run_status(&settings, &order_id).await?,
        Command::Fulfillments { order_id } => {
            commands::run_fulfillments(&settings, &order_id).await?
        }
        Command::Ledger { crates, pull } => {
            commands::run_ledger(&settings, crates.as_deref(), pull).await?
        }
    }
    Ok(())
}

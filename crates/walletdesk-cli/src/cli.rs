//! CLI argument definitions for walletdesk.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `customers list` | Filtered, paginated customer list |
//! | `customers show` | Single customer |
//! | `customers create` | Create a customer from a JSON payload |
//! | `customers update` | Replace a customer from a JSON payload |
//! | `customers delete` | Delete a customer |
//! | `transactions list` | Transactions of a customer |
//! | `wallet show` | Wallet of a customer |
//! | `limits update` | Change a wallet's spending limits |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--base-url` | `$WALLETDESK_API_BASE_URL` | Backend base URL |
//! | `--timeout-ms` | `$WALLETDESK_API_TIMEOUT_MS` or `12000` | Request timeout, `0` disables it |
//! | `--lang` | session or `en` | Message language (`en`, `tr`) |
//! | `--token` | session | Bearer token |
//! | `--session-file` | none | JSON session document |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--verbose` | `false` | Debug logging when `RUST_LOG` is unset |
//!
//! # Examples
//!
//! ```bash
//! walletdesk customers list --search ada --kyc-status verified --pretty
//! walletdesk transactions list cus-001 --direction incoming --from 2024-01-01
//! walletdesk limits update cus-001 --available-limit 5000 --daily-limit 750
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use time::Date;
use walletdesk_core::domain::{KycStatus, TransactionType, TransferDirection, WalletStatus};
use walletdesk_core::Language;

/// Customer and wallet dashboard client.
#[derive(Debug, Parser)]
#[command(name = "walletdesk", author, version, about = "Customer and wallet dashboard client")]
pub struct Cli {
    /// Backend base URL.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in milliseconds; 0 disables the timer.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Language of notifications and Accept-Language.
    #[arg(long, global = true, value_parser = parse_language)]
    pub lang: Option<String>,

    /// Bearer token sent with every request.
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// JSON document holding `language` and `token`.
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Customer records.
    #[command(subcommand)]
    Customers(CustomersCommand),
    /// Wallet transactions.
    #[command(subcommand)]
    Transactions(TransactionsCommand),
    /// Wallet balances.
    #[command(subcommand)]
    Wallet(WalletCommand),
    /// Wallet spending limits.
    #[command(subcommand)]
    Limits(LimitsCommand),
}

#[derive(Debug, Subcommand)]
pub enum CustomersCommand {
    List(CustomerListArgs),
    Show(CustomerIdArgs),
    Create(PayloadArgs),
    Update(CustomerUpdateArgs),
    Delete(CustomerIdArgs),
}

#[derive(Debug, Subcommand)]
pub enum TransactionsCommand {
    List(TransactionListArgs),
}

#[derive(Debug, Subcommand)]
pub enum WalletCommand {
    Show(CustomerIdArgs),
}

#[derive(Debug, Subcommand)]
pub enum LimitsCommand {
    Update(LimitsArgs),
}

#[derive(Debug, Clone, Args)]
pub struct CustomerIdArgs {
    pub customer_id: String,
}

#[derive(Debug, Clone, Args)]
pub struct PageArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u64,

    #[arg(long, default_value_t = 10)]
    pub page_size: u64,
}

#[derive(Debug, Clone, Args)]
pub struct CustomerListArgs {
    /// Case-insensitive match on name, email and wallet id.
    #[arg(long, default_value = "")]
    pub search: String,

    #[arg(long, value_enum, default_value_t = WalletStatusArg::All)]
    pub status: WalletStatusArg,

    #[arg(long, value_enum, default_value_t = KycStatusArg::All)]
    pub kyc_status: KycStatusArg,

    #[arg(long, value_enum, default_value_t = ActiveArg::All)]
    pub active: ActiveArg,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Debug, Clone, Args)]
pub struct TransactionListArgs {
    pub customer_id: String,

    #[arg(long, value_enum, default_value_t = DirectionArg::All)]
    pub direction: DirectionArg,

    #[arg(long = "type", value_enum, default_value_t = TransactionTypeArg::All)]
    pub transaction_type: TransactionTypeArg,

    #[arg(long)]
    pub currency: Option<String>,

    /// First day, `YYYY-MM-DD`.
    #[arg(long, value_parser = parse_date)]
    pub from: Option<Date>,

    /// Last day, `YYYY-MM-DD`.
    #[arg(long, value_parser = parse_date)]
    pub to: Option<Date>,

    #[command(flatten)]
    pub page: PageArgs,
}

/// JSON payload given inline or as a file.
#[derive(Debug, Clone, Args)]
pub struct PayloadArgs {
    #[arg(long, conflicts_with = "payload_file")]
    pub payload: Option<String>,

    #[arg(long)]
    pub payload_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct CustomerUpdateArgs {
    pub customer_id: String,

    #[command(flatten)]
    pub payload: PayloadArgs,
}

#[derive(Debug, Clone, Args)]
pub struct LimitsArgs {
    pub customer_id: String,

    #[arg(long, allow_negative_numbers = true)]
    pub available_limit: f64,

    #[arg(long, allow_negative_numbers = true)]
    pub daily_limit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WalletStatusArg {
    All,
    Active,
    Restricted,
    Suspended,
}

impl WalletStatusArg {
    pub const fn selection(self) -> Option<WalletStatus> {
        match self {
            Self::All => None,
            Self::Active => Some(WalletStatus::Active),
            Self::Restricted => Some(WalletStatus::Restricted),
            Self::Suspended => Some(WalletStatus::Suspended),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KycStatusArg {
    All,
    Unknown,
    Unverified,
    Verified,
    Contracted,
}

impl KycStatusArg {
    pub const fn selection(self) -> Option<KycStatus> {
        match self {
            Self::All => None,
            Self::Unknown => Some(KycStatus::Unknown),
            Self::Unverified => Some(KycStatus::Unverified),
            Self::Verified => Some(KycStatus::Verified),
            Self::Contracted => Some(KycStatus::Contracted),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActiveArg {
    All,
    True,
    False,
}

impl ActiveArg {
    pub const fn selection(self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::True => Some(true),
            Self::False => Some(false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    All,
    Incoming,
    Outgoing,
}

impl DirectionArg {
    pub const fn selection(self) -> Option<TransferDirection> {
        match self {
            Self::All => None,
            Self::Incoming => Some(TransferDirection::Incoming),
            Self::Outgoing => Some(TransferDirection::Outgoing),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransactionTypeArg {
    All,
    Debit,
    Credit,
}

impl TransactionTypeArg {
    pub const fn selection(self) -> Option<TransactionType> {
        match self {
            Self::All => None,
            Self::Debit => Some(TransactionType::Debit),
            Self::Credit => Some(TransactionType::Credit),
        }
    }
}

/// Normalizes `EN`, `tr-TR` and the like to the stored key form.
fn parse_language(raw: &str) -> Result<String, String> {
    Language::parse(raw)
        .map(|language| language.as_str().to_owned())
        .ok_or_else(|| format!("unsupported language `{raw}`, expected en or tr"))
}

fn parse_date(raw: &str) -> Result<Date, String> {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    Date::parse(raw, format).map_err(|error| format!("expected YYYY-MM-DD: {error}"))
}

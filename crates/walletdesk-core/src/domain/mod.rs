//! # Domain Models
//!
//! Resource types exchanged with the dashboard backend.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Customer`] | Customer profile with optional embedded wallet |
//! | [`Wallet`] | Balance and spending limits |
//! | [`Transaction`] | Wallet movement |
//! | [`CustomerFilters`] | Customer list filter state |
//! | [`TransactionFilters`] | Transaction list filter state |
//! | [`CreateCustomerPayload`], [`UpdateCustomerPayload`], [`UpdateWalletLimitPayload`] | Mutation bodies |
//!
//! Wire names are camelCase. Missing optional fields decode to `None`, and
//! unrecognized KYC or transaction statuses decode to `Unknown`.

mod filters;
mod models;
mod payloads;

pub use filters::{CustomerFilters, TransactionFilters, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
pub use models::{
    Address, Customer, KycStatus, RiskLevel, Transaction, TransactionSide, TransactionStatus,
    TransactionType, TransferDirection, Wallet, WalletStatus,
};
pub use payloads::{CreateCustomerPayload, UpdateCustomerPayload, UpdateWalletLimitPayload};

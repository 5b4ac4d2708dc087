//! Offline datasets and the fallback responses built from them.
//!
//! Every producer here is pure: given the dataset and the call's inputs it
//! returns the envelope the resource would have resolved with, so the
//! dashboard stays usable while the backend is unreachable.

use std::sync::Arc;

use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::domain::{
    CreateCustomerPayload, Customer, CustomerFilters, KycStatus, RiskLevel, Transaction,
    TransactionSide, TransactionStatus, UpdateCustomerPayload, UpdateWalletLimitPayload, Wallet,
    WalletStatus, DEFAULT_PAGE, DEFAULT_PAGE_SIZE,
};
use crate::envelope::ApiResponse;
use crate::pagination::Paginated;

/// Source of offline records.
pub trait FallbackDataset: Send + Sync {
    fn customers(&self) -> &[Customer];
    fn transactions(&self) -> &[Transaction];
}

/// In-memory dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticDataset {
    customers: Vec<Customer>,
    transactions: Vec<Transaction>,
}

impl StaticDataset {
    pub fn new(customers: Vec<Customer>, transactions: Vec<Transaction>) -> Self {
        Self {
            customers,
            transactions,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Small demo dataset shipped with the client.
    pub fn demo() -> Self {
        let customers = vec![
            demo_customer(
                "cus-001",
                "Ayşe Demir",
                "ayse.demir@example.com",
                KycStatus::Verified,
                true,
                WalletStatus::Active,
                12_450.0,
            ),
            demo_customer(
                "cus-002",
                "Mehmet Kaya",
                "mehmet.kaya@example.com",
                KycStatus::Unverified,
                true,
                WalletStatus::Restricted,
                310.5,
            ),
            demo_customer(
                "cus-003",
                "Elif Yılmaz",
                "elif.yilmaz@example.com",
                KycStatus::Contracted,
                false,
                WalletStatus::Suspended,
                0.0,
            ),
            demo_customer(
                "cus-004",
                "John Carter",
                "john.carter@example.com",
                KycStatus::Verified,
                true,
                WalletStatus::Active,
                5_020.0,
            ),
        ];
        let transactions = vec![
            demo_transaction(
                "trx-001",
                "cus-001",
                250.0,
                TransactionSide::Credit,
                "INCOMING",
                "2024-05-02T09:15:00Z",
            ),
            demo_transaction(
                "trx-002",
                "cus-001",
                75.4,
                TransactionSide::Debit,
                "OUTGOING",
                "2024-05-03T14:40:00Z",
            ),
            demo_transaction(
                "trx-003",
                "cus-002",
                19.99,
                TransactionSide::Debit,
                "OUTGOING",
                "2024-05-04T08:05:00Z",
            ),
            demo_transaction(
                "trx-004",
                "cus-004",
                1_200.0,
                TransactionSide::Credit,
                "INCOMING",
                "2024-05-05T17:30:00Z",
            ),
            demo_transaction(
                "trx-005",
                "cus-004",
                300.0,
                TransactionSide::Debit,
                "OUTGOING",
                "2024-05-06T11:00:00Z",
            ),
        ];

        Self::new(customers, transactions)
    }
}

impl FallbackDataset for StaticDataset {
    fn customers(&self) -> &[Customer] {
        &self.customers
    }

    fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }
}

impl<D: FallbackDataset + ?Sized> FallbackDataset for Arc<D> {
    fn customers(&self) -> &[Customer] {
        (**self).customers()
    }

    fn transactions(&self) -> &[Transaction] {
        (**self).transactions()
    }
}

fn demo_customer(
    id: &str,
    name: &str,
    email: &str,
    kyc_status: KycStatus,
    is_active: bool,
    wallet_status: WalletStatus,
    balance: f64,
) -> Customer {
    Customer {
        id: id.to_owned(),
        name: name.to_owned(),
        email: email.to_owned(),
        kyc_status: Some(kyc_status),
        is_active: Some(is_active),
        risk_level: Some(RiskLevel::Low),
        created_at: Some(String::from("2024-01-15T10:00:00Z")),
        wallet: Some(Wallet {
            id: format!("wal-{}", id.trim_start_matches("cus-")),
            customer_id: Some(id.to_owned()),
            balance,
            currency: String::from("TRY"),
            available_limit: Some(20_000.0),
            daily_limit: Some(5_000.0),
            status: Some(wallet_status),
            ..Wallet::default()
        }),
        ..Customer::default()
    }
}

fn demo_transaction(
    id: &str,
    customer_id: &str,
    amount: f64,
    side: TransactionSide,
    direction: &str,
    created_at: &str,
) -> Transaction {
    Transaction {
        id: id.to_owned(),
        customer_id: customer_id.to_owned(),
        amount,
        currency: String::from("TRY"),
        description: None,
        status: Some(TransactionStatus::Completed),
        side: Some(side),
        kind: Some(match side {
            TransactionSide::Credit => String::from("CREDIT"),
            TransactionSide::Debit => String::from("DEBIT"),
        }),
        transfer_direction: Some(direction.to_owned()),
        merchant_name: None,
        created_at: created_at.to_owned(),
        counterparty: None,
        channel: None,
    }
}

fn fallback_envelope<T>(data: T, message: &str) -> ApiResponse<T> {
    ApiResponse::ok(data).with_message(message)
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

fn timestamp(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_default()
}

fn unix_millis(at: OffsetDateTime) -> i128 {
    at.unix_timestamp_nanos() / 1_000_000
}

/// Filters the dataset's customers with `filters`, then slices the requested page.
pub fn customer_page(
    dataset: &dyn FallbackDataset,
    filters: &CustomerFilters,
    message: &str,
) -> ApiResponse<Paginated<Customer>> {
    let page = filters.page.max(DEFAULT_PAGE);
    let page_size = if filters.page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        filters.page_size
    };

    let filtered: Vec<&Customer> = dataset
        .customers()
        .iter()
        .filter(|customer| filters.matches(customer))
        .collect();
    let total = filtered.len() as u64;
    let start = usize::try_from((page - 1).saturating_mul(page_size)).unwrap_or(usize::MAX);
    let take = usize::try_from(page_size).unwrap_or(usize::MAX);
    let items = filtered.into_iter().skip(start).take(take).cloned().collect();

    fallback_envelope(Paginated::new(items, page, page_size, total), message)
}

/// All of one customer's transactions as a single page.
pub fn transaction_page(
    dataset: &dyn FallbackDataset,
    customer_id: Option<&str>,
    message: &str,
) -> ApiResponse<Paginated<Transaction>> {
    let Some(customer_id) = customer_id.filter(|id| !id.is_empty()) else {
        return fallback_envelope(Paginated::empty(DEFAULT_PAGE, DEFAULT_PAGE_SIZE), message);
    };

    let items: Vec<Transaction> = dataset
        .transactions()
        .iter()
        .filter(|transaction| transaction.customer_id == customer_id)
        .cloned()
        .collect();
    let total = items.len() as u64;
    let page_size = total.max(1);

    fallback_envelope(Paginated::new(items, DEFAULT_PAGE, page_size, total), message)
}

/// The dataset's customer with `customer_id`, or an empty customer.
pub fn customer(
    dataset: &dyn FallbackDataset,
    customer_id: &str,
    message: &str,
) -> ApiResponse<Customer> {
    let customer = dataset
        .customers()
        .iter()
        .find(|customer| customer.id == customer_id)
        .cloned()
        .unwrap_or_default();
    fallback_envelope(customer, message)
}

/// Zero-balance USD wallet.
pub fn wallet(customer_id: &str, message: &str) -> ApiResponse<Wallet> {
    let wallet = Wallet {
        id: customer_id.to_owned(),
        customer_id: Some(customer_id.to_owned()),
        balance: 0.0,
        currency: String::from("USD"),
        daily_limit: Some(0.0),
        monthly_limit: Some(0.0),
        ..Wallet::default()
    };
    fallback_envelope(wallet, message)
}

/// Locally fabricated customer for a create that could not reach the backend.
pub fn created_customer(payload: &CreateCustomerPayload, message: &str) -> ApiResponse<Customer> {
    created_customer_at(payload, message, now())
}

fn created_customer_at(
    payload: &CreateCustomerPayload,
    message: &str,
    at: OffsetDateTime,
) -> ApiResponse<Customer> {
    let millis = unix_millis(at);
    let stamp = timestamp(at);
    let customer = Customer {
        id: format!("mock-{millis}"),
        name: payload.name.clone(),
        email: payload.email.clone(),
        phone: Some(payload.phone.clone()),
        date_of_birth: Some(payload.date_of_birth.clone()),
        national_id: Some(payload.national_id),
        address: Some(payload.address.clone()),
        kyc_status: Some(KycStatus::Unknown),
        is_active: Some(true),
        risk_level: Some(RiskLevel::Low),
        created_at: Some(stamp.clone()),
        wallet: Some(Wallet {
            id: format!("mock-wallet-{millis}"),
            balance: 0.0,
            currency: payload.currency.clone(),
            available_limit: Some(payload.available_limit),
            daily_limit: Some(payload.daily_limit),
            status: Some(WalletStatus::Active),
            last_updated: Some(stamp),
            ..Wallet::default()
        }),
        ..Customer::default()
    };

    fallback_envelope(customer, message).with_status(201)
}

/// Echo of an update that could not reach the backend.
pub fn updated_customer(
    customer_id: &str,
    payload: &UpdateCustomerPayload,
    message: &str,
) -> ApiResponse<Customer> {
    let fields = &payload.customer;
    let customer = Customer {
        id: customer_id.to_owned(),
        name: fields.name.clone(),
        email: fields.email.clone(),
        phone: Some(fields.phone.clone()),
        date_of_birth: Some(fields.date_of_birth.clone()),
        national_id: Some(fields.national_id),
        address: Some(fields.address.clone()),
        kyc_status: Some(payload.kyc_status),
        is_active: Some(payload.is_active),
        ..Customer::default()
    };
    fallback_envelope(customer, message)
}

/// Customer stub carrying a wallet with the requested limits.
pub fn updated_limits(payload: &UpdateWalletLimitPayload, message: &str) -> ApiResponse<Customer> {
    let customer = Customer {
        id: payload.customer_id.clone(),
        wallet: Some(Wallet {
            id: payload.customer_id.clone(),
            balance: 0.0,
            currency: String::from("TRY"),
            available_limit: Some(payload.available_limit),
            daily_limit: Some(payload.daily_limit),
            status: Some(WalletStatus::Active),
            last_updated: Some(timestamp(now())),
            ..Wallet::default()
        }),
        ..Customer::default()
    };
    fallback_envelope(customer, message)
}

pub fn deleted(message: &str) -> ApiResponse<Value> {
    fallback_envelope(Value::Null, message)
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    const NOTICE: &str = "offline";

    #[test]
    fn customer_page_filters_then_pages() {
        let dataset = StaticDataset::demo();
        let filters = CustomerFilters {
            is_active: Some(true),
            ..CustomerFilters::default()
        }
        .page_size(2)
        .page(2);

        let response = customer_page(&dataset, &filters, NOTICE);

        assert_eq!(response.status, 200);
        assert!(response.success);
        assert_eq!(response.message.as_deref(), Some(NOTICE));
        assert_eq!(response.data.meta.total, 3);
        assert_eq!(response.data.meta.page, 2);
        let ids: Vec<&str> = response.data.items.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["cus-004"]);
    }

    #[test]
    fn customer_page_past_the_end_is_empty() {
        let dataset = StaticDataset::demo();
        let response = customer_page(&dataset, &CustomerFilters::default().page(9), NOTICE);
        assert!(response.data.items.is_empty());
        assert_eq!(response.data.total, 4);
    }

    #[test]
    fn transaction_page_is_a_single_page() {
        let dataset = StaticDataset::demo();

        let page = transaction_page(&dataset, Some("cus-004"), NOTICE).data;
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.meta.page_size, 2);
        assert_eq!(page.meta.page, 1);

        let none = transaction_page(&dataset, Some("cus-003"), NOTICE).data;
        assert_eq!(none.meta.page_size, 1);
        assert_eq!(none.total, 0);

        let missing = transaction_page(&dataset, None, NOTICE).data;
        assert_eq!(missing.meta.page_size, 10);
        assert!(missing.items.is_empty());
    }

    #[test]
    fn unknown_customer_falls_back_to_empty_record() {
        let dataset = StaticDataset::empty();
        assert_eq!(customer(&dataset, "nope", NOTICE).data, Customer::default());
    }

    #[test]
    fn wallet_fallback_is_zero_balance_usd() {
        let wallet = wallet("cus-9", NOTICE).data;
        assert_eq!(wallet.id, "cus-9");
        assert_eq!(wallet.currency, "USD");
        assert_eq!(wallet.balance, 0.0);
    }

    #[test]
    fn created_customer_uses_mock_ids_and_defaults() {
        let payload = CreateCustomerPayload {
            name: String::from("Ada"),
            currency: String::from("EUR"),
            daily_limit: 100.0,
            available_limit: 1_000.0,
            ..CreateCustomerPayload::default()
        };

        let response = created_customer_at(&payload, NOTICE, datetime!(2024-05-01 00:00:00 UTC));

        assert_eq!(response.status, 201);
        let customer = response.data;
        assert_eq!(customer.id, "mock-1714521600000");
        assert_eq!(customer.kyc_status, Some(KycStatus::Unknown));
        assert_eq!(customer.is_active, Some(true));
        assert_eq!(customer.risk_level, Some(RiskLevel::Low));
        let wallet = customer.wallet.expect("wallet");
        assert_eq!(wallet.id, "mock-wallet-1714521600000");
        assert_eq!(wallet.currency, "EUR");
        assert_eq!(wallet.available_limit, Some(1_000.0));
    }

    #[test]
    fn limit_fallback_echoes_requested_limits() {
        let payload = UpdateWalletLimitPayload::new("cus-1", 900.0, 90.0).expect("valid");
        let wallet = updated_limits(&payload, NOTICE).data.wallet.expect("wallet");
        assert_eq!(wallet.available_limit, Some(900.0));
        assert_eq!(wallet.daily_limit, Some(90.0));
        assert_eq!(wallet.currency, "TRY");
    }
}

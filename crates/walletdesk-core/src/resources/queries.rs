use crate::cache::QueryKey;
use crate::domain::{Customer, CustomerFilters, Transaction, TransactionFilters, Wallet};
use crate::error::{ApiError, ClientError, ValidationError};
use crate::hooks::QuerySpec;
use crate::pagination::Paginated;

use super::{DashboardApi, CUSTOMERS_ERROR, TRANSACTIONS_ERROR};

pub fn customers_key(filters: &CustomerFilters) -> QueryKey {
    QueryKey::new("customers").with(filters)
}

pub fn customer_key(customer_id: Option<&str>) -> QueryKey {
    QueryKey::new("customer").with(customer_id)
}

pub fn transactions_key(customer_id: Option<&str>, filters: &TransactionFilters) -> QueryKey {
    QueryKey::new("transactions").with(customer_id).with(filters)
}

pub fn wallet_key(customer_id: Option<&str>) -> QueryKey {
    QueryKey::new("wallet").with(customer_id)
}

fn present(customer_id: Option<String>) -> Option<String> {
    customer_id.filter(|id| !id.trim().is_empty())
}

fn missing_customer(path: &str) -> ClientError {
    ClientError::Api(ApiError::transport(ValidationError::MissingCustomerId.to_string(), path))
}

/// Customer list; keeps the previous page visible while the next one loads.
pub fn customers_query(
    api: &DashboardApi,
    filters: CustomerFilters,
) -> QuerySpec<Paginated<Customer>> {
    let api = api.clone();
    let key = customers_key(&filters);

    QuerySpec::new(key, move |signal| {
        let api = api.clone();
        let filters = filters.clone();
        async move { api.fetch_customers(&filters, Some(signal)).await }
    })
    .keep_previous_data()
    .error_message_key(CUSTOMERS_ERROR)
}

/// Single customer; disabled until an id is known.
pub fn customer_query(api: &DashboardApi, customer_id: Option<String>) -> QuerySpec<Customer> {
    let api = api.clone();
    let customer_id = present(customer_id);
    let key = customer_key(customer_id.as_deref());
    let enabled = customer_id.is_some();

    QuerySpec::new(key, move |signal| {
        let api = api.clone();
        let customer_id = customer_id.clone();
        async move {
            match customer_id {
                Some(id) => api.fetch_customer(&id, Some(signal)).await,
                None => Err(missing_customer("/customers")),
            }
        }
    })
    .enabled(enabled)
    .error_message_key(CUSTOMERS_ERROR)
}

pub fn transactions_query(
    api: &DashboardApi,
    customer_id: Option<String>,
    filters: TransactionFilters,
) -> QuerySpec<Paginated<Transaction>> {
    let api = api.clone();
    let customer_id = present(customer_id);
    let key = transactions_key(customer_id.as_deref(), &filters);
    let enabled = customer_id.is_some();

    QuerySpec::new(key, move |signal| {
        let api = api.clone();
        let customer_id = customer_id.clone();
        let filters = filters.clone();
        async move {
            match customer_id {
                Some(id) => api.fetch_transactions(&id, &filters, Some(signal)).await,
                None => Err(missing_customer("/transactions")),
            }
        }
    })
    .enabled(enabled)
    .keep_previous_data()
    .error_message_key(TRANSACTIONS_ERROR)
}

pub fn wallet_query(api: &DashboardApi, customer_id: Option<String>) -> QuerySpec<Wallet> {
    let api = api.clone();
    let customer_id = present(customer_id);
    let key = wallet_key(customer_id.as_deref());
    let enabled = customer_id.is_some();

    QuerySpec::new(key, move |signal| {
        let api = api.clone();
        let customer_id = customer_id.clone();
        async move {
            match customer_id {
                Some(id) => api.fetch_wallet(&id, Some(signal)).await,
                None => Err(missing_customer("/wallets")),
            }
        }
    })
    .enabled(enabled)
    .error_message_key(TRANSACTIONS_ERROR)
}

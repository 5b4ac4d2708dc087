use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{instrument, warn};

use crate::descriptor::{RequestBody, RequestOptions};
use crate::domain::{
    CreateCustomerPayload, Customer, CustomerFilters, Transaction, TransactionFilters,
    UpdateCustomerPayload, UpdateWalletLimitPayload, Wallet,
};
use crate::engine::ApiClient;
use crate::envelope::ApiResponse;
use crate::error::{ApiError, ClientError};
use crate::fallback::{self, FallbackDataset, StaticDataset};
use crate::i18n;
use crate::pagination::{normalize_paginated, PageDefaults, Paginated};

/// Single-resource payload that may still be wrapped in `{ "data": ... }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum MaybeWrapped<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> MaybeWrapped<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

/// Typed access to the dashboard backend with offline fallbacks.
#[derive(Clone)]
pub struct DashboardApi {
    client: ApiClient,
    dataset: Arc<dyn FallbackDataset>,
}

impl DashboardApi {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            dataset: Arc::new(StaticDataset::demo()),
        }
    }

    pub fn with_dataset(mut self, dataset: Arc<dyn FallbackDataset>) -> Self {
        self.dataset = dataset;
        self
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn fallback_notice(&self) -> String {
        self.client.notifier().translate(i18n::FALLBACK_NOTICE)
    }

    #[instrument(skip(self, signal))]
    pub async fn fetch_customers(
        &self,
        filters: &CustomerFilters,
        signal: Option<CancellationToken>,
    ) -> Result<ApiResponse<Paginated<Customer>>, ClientError> {
        let produce = {
            let dataset = Arc::clone(&self.dataset);
            let filters = filters.clone();
            let notice = self.fallback_notice();
            move || fallback::customer_page(dataset.as_ref(), &filters, &notice)
        };

        let options = RequestOptions::new()
            .params(filters.query_params())
            .maybe_signal(signal)
            .fallback(erased(produce.clone()));
        let response = self.client.get::<Value>("/customers", options).await?;

        Ok(self.typed_page(response, filters.page_defaults(), produce))
    }

    #[instrument(skip(self, signal))]
    pub async fn fetch_customer(
        &self,
        customer_id: &str,
        signal: Option<CancellationToken>,
    ) -> Result<ApiResponse<Customer>, ClientError> {
        let dataset = Arc::clone(&self.dataset);
        let id = customer_id.to_owned();
        let notice = self.fallback_notice();

        let options = RequestOptions::new()
            .maybe_signal(signal)
            .fallback(move || {
                fallback::customer(dataset.as_ref(), &id, &notice).map(MaybeWrapped::Bare)
            });
        let response = self
            .client
            .get::<MaybeWrapped<Customer>>(&format!("/customers/{}", segment(customer_id)), options)
            .await?;

        Ok(response.map(MaybeWrapped::into_inner))
    }

    #[instrument(skip(self, signal))]
    pub async fn fetch_transactions(
        &self,
        customer_id: &str,
        filters: &TransactionFilters,
        signal: Option<CancellationToken>,
    ) -> Result<ApiResponse<Paginated<Transaction>>, ClientError> {
        let produce = {
            let dataset = Arc::clone(&self.dataset);
            let id = customer_id.to_owned();
            let notice = self.fallback_notice();
            move || fallback::transaction_page(dataset.as_ref(), Some(id.as_str()), &notice)
        };

        let options = RequestOptions::new()
            .params(filters.query_params())
            .maybe_signal(signal)
            .fallback(erased(produce.clone()));
        let response = self
            .client
            .get::<Value>(&format!("/transactions/{}", segment(customer_id)), options)
            .await?;

        Ok(self.typed_page(response, filters.page_defaults(), produce))
    }

    #[instrument(skip(self, signal))]
    pub async fn fetch_wallet(
        &self,
        customer_id: &str,
        signal: Option<CancellationToken>,
    ) -> Result<ApiResponse<Wallet>, ClientError> {
        let id = customer_id.to_owned();
        let notice = self.fallback_notice();

        let options = RequestOptions::new()
            .maybe_signal(signal)
            .fallback(move || fallback::wallet(&id, &notice).map(MaybeWrapped::Bare));
        let response = self
            .client
            .get::<MaybeWrapped<Wallet>>(&format!("/wallets/{}", segment(customer_id)), options)
            .await?;

        Ok(response.map(MaybeWrapped::into_inner))
    }

    #[instrument(skip_all)]
    pub async fn create_customer(
        &self,
        payload: &CreateCustomerPayload,
    ) -> Result<ApiResponse<Customer>, ClientError> {
        let body = encode(payload, "/customers")?;
        let echo = payload.clone();
        let notice = self.fallback_notice();

        let options =
            RequestOptions::new().fallback(move || fallback::created_customer(&echo, &notice));
        self.client.post("/customers", body, options).await
    }

    #[instrument(skip(self, payload))]
    pub async fn update_customer(
        &self,
        customer_id: &str,
        payload: &UpdateCustomerPayload,
    ) -> Result<ApiResponse<Customer>, ClientError> {
        let path = format!("/customers/{}", segment(customer_id));
        let body = encode(payload, &path)?;
        let id = customer_id.to_owned();
        let echo = payload.clone();
        let notice = self.fallback_notice();

        let options = RequestOptions::new()
            .fallback(move || fallback::updated_customer(&id, &echo, &notice));
        self.client.put(&path, body, options).await
    }

    #[instrument(skip_all, fields(customer_id = %payload.customer_id))]
    pub async fn update_wallet_limits(
        &self,
        payload: &UpdateWalletLimitPayload,
    ) -> Result<ApiResponse<Customer>, ClientError> {
        let path = format!("/wallets/{}", segment(&payload.customer_id));
        let echo = payload.clone();
        let notice = self.fallback_notice();

        let options =
            RequestOptions::new().fallback(move || fallback::updated_limits(&echo, &notice));
        self.client.patch(&path, payload.body(), options).await
    }

    #[instrument(skip(self))]
    pub async fn delete_customer(
        &self,
        customer_id: &str,
    ) -> Result<ApiResponse<Value>, ClientError> {
        let notice = self.fallback_notice();
        let options = RequestOptions::new().fallback(move || fallback::deleted(&notice));
        self.client
            .delete(&format!("/customers/{}", segment(customer_id)), None, options)
            .await
    }

    /// Normalizes a list payload; items that do not decode degrade to the
    /// fallback page like any other unusable response.
    fn typed_page<T>(
        &self,
        response: ApiResponse<Value>,
        defaults: PageDefaults,
        produce: impl FnOnce() -> ApiResponse<Paginated<T>>,
    ) -> ApiResponse<Paginated<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let typed = response.try_map(|data| normalize_paginated(&data, defaults).into_typed::<T>());
        match typed {
            Ok(response) => response,
            Err(error) => {
                warn!(error = %error, "undecodable list items, resolving with fallback data");
                self.client.notifier().notify_fallback(i18n::FALLBACK_NOTICE);
                produce()
            }
        }
    }
}

/// Turns a typed fallback producer into one the untyped list request accepts.
fn erased<T, F>(produce: F) -> impl FnOnce() -> ApiResponse<Value> + Send + 'static
where
    T: Serialize,
    F: FnOnce() -> ApiResponse<T> + Send + 'static,
{
    move || produce().map(|data| serde_json::to_value(data).unwrap_or(Value::Null))
}

fn encode<B: Serialize>(payload: &B, path: &str) -> Result<RequestBody, ClientError> {
    RequestBody::json(payload).map_err(|error| {
        ClientError::Api(ApiError::transport(
            format!("request body could not be encoded: {error}"),
            path,
        ))
    })
}

/// Percent-encodes one path segment.
fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

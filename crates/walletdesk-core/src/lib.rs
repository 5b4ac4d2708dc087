//! # Walletdesk Core
//!
//! Data layer of the walletdesk customer and wallet dashboard.
//!
//! ## Overview
//!
//! - **Query normalization** turning filter state into query strings
//! - **Pagination normalization** for the backend's list payload shapes
//! - **Request engine** with timeout, cancellation and offline fallbacks
//! - **Error notification** through modal and toast sinks
//! - **Query cache** keyed by structured keys, with prefix invalidation
//! - **Query and mutation hooks** used by the presentation layer
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Keyed query cache with staleness and in-flight de-duplication |
//! | [`config`] | Base URL, timeout and user agent |
//! | [`descriptor`] | Request descriptors and per-request options |
//! | [`domain`] | Customers, wallets, transactions, filters, payloads |
//! | [`engine`] | `ApiClient`, the request engine |
//! | [`envelope`] | `ApiResponse` envelope and response shape detection |
//! | [`error`] | `ApiError`, `ClientError`, validation errors |
//! | [`fallback`] | Mock datasets and fallback producers |
//! | [`hooks`] | Query observers and mutations |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`i18n`] | Message catalog and language variants |
//! | [`notify`] | Notification sinks and the error notifier |
//! | [`pagination`] | List payload normalization |
//! | [`query`] | Query string builder |
//! | [`resources`] | Dashboard service, query and mutation specs |
//! | [`retry`] | Retry policies and backoff |
//! | [`session`] | Persisted language and token |
//! | [`telemetry`] | Tracing subscriber setup |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use walletdesk_core::{ApiClient, ClientConfig, CustomerFilters, DashboardApi};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::builder(ClientConfig::from_env()).build();
//!     let api = DashboardApi::new(client);
//!
//!     let filters = CustomerFilters::default().search("ada");
//!     let response = api.fetch_customers(&filters, None).await?;
//!     for customer in &response.data.items {
//!         println!("{}", customer.name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / UI       │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Query Observer  │────▶│ Query Cache      │
//! │ / Mutation      │     │ (keyed, shared)  │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ DashboardApi    │────▶│ Fallback Dataset │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ ApiClient       │────▶│ HTTP Client      │
//! │ (engine)        │     │ (reqwest)        │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Notifier        │
//! │ (modal + toast) │
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Callers only ever see [`ClientError`]:
//!
//! ```rust
//! use walletdesk_core::ClientError;
//!
//! fn describe(error: &ClientError) -> String {
//!     match error {
//!         ClientError::Cancelled => String::from("cancelled"),
//!         ClientError::Api(api) if api.is_transport() => {
//!             format!("unreachable: {}", api.message())
//!         }
//!         ClientError::Api(api) => format!("{} ({})", api.message(), api.status()),
//!     }
//! }
//! ```

pub mod cache;
pub mod config;
pub mod descriptor;
pub mod domain;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod fallback;
pub mod hooks;
pub mod http_client;
pub mod i18n;
pub mod notify;
pub mod pagination;
pub mod query;
pub mod resources;
pub mod retry;
pub mod session;
pub mod telemetry;

// Caching
pub use cache::{CacheMode, QueryClient, QueryKey, DEFAULT_GC_TIME, DEFAULT_STALE_TIME};

// Configuration
pub use config::ClientConfig;

// Requests
pub use descriptor::{RequestBody, RequestDescriptor, RequestOptions};
pub use engine::{ApiClient, ApiClientBuilder};
pub use envelope::{ApiResponse, ResponseShape};

// Domain models
pub use domain::{
    CreateCustomerPayload, Customer, CustomerFilters, Transaction, TransactionFilters,
    UpdateCustomerPayload, UpdateWalletLimitPayload, Wallet,
};

// Error types
pub use error::{is_api_error, is_cancellation, ApiError, ClientError, ValidationError};

// Fallbacks
pub use fallback::{FallbackDataset, StaticDataset};

// Hooks
pub use hooks::{
    Mutation, MutationSpec, MutationStatus, QueryContext, QueryObserver, QueryOptions, QuerySpec,
    QueryState, QueryStatus,
};

// HTTP client types
pub use http_client::{
    FormField, HttpAuth, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse,
    ReqwestHttpClient,
};

// Localization and notifications
pub use i18n::{Language, MessageCatalog, Translator};
pub use notify::{
    Channel, Notification, NotificationSink, Notifier, RecordingSink, Severity, TracingSink,
};

// Query building and pagination
pub use pagination::{normalize_paginated, PageDefaults, PageMeta, Paginated};
pub use query::{build_query, ArrayStyle, BuildQueryOptions, QueryParams, QueryValue};

// Resources
pub use resources::{CustomerUpdate, DashboardApi};

// Retry
pub use retry::{Backoff, RetryConfig};

// Session
pub use session::{JsonFileSessionStore, MemorySessionStore, SessionStore};

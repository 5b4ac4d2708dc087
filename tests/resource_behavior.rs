//! Behavior-driven tests for the dashboard resources
//!
//! These tests run `DashboardApi` and the resource query and mutation specs
//! against a stubbed backend and verify filter normalization, payload
//! unwrapping, offline datasets and cache invalidation.

use serde_json::{json, Value};
use walletdesk_core::domain::{KycStatus, WalletStatus};
use walletdesk_core::resources::{
    create_customer_mutation, customer_key, customers_key, customers_query, update_limits_mutation,
    wallet_key,
};
use walletdesk_core::{
    ApiClient, ClientConfig, CreateCustomerPayload, Customer, CustomerFilters, DashboardApi,
    MemorySessionStore, QueryClient, QueryContext, RecordingSink, StaticDataset, Transaction,
    TransactionFilters, UpdateWalletLimitPayload,
};
use walletdesk_tests::{recording_notifier, unreachable_base_url, Arc};
use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OFFLINE_NOTICE: &str = "The server is unreachable. Showing offline data.";

struct Harness {
    api: DashboardApi,
    queries: QueryContext,
    toast: Arc<RecordingSink>,
}

fn harness(base_url: &str) -> Harness {
    let (notifier, _modal, toast) = recording_notifier();
    let client = ApiClient::builder(ClientConfig::new(base_url))
        .session(Arc::new(MemorySessionStore::default()))
        .notifier(notifier)
        .build();
    let queries = QueryContext::new(QueryClient::default(), client.notifier().clone());

    Harness {
        api: DashboardApi::new(client).with_dataset(Arc::new(fixture_dataset())),
        queries,
        toast,
    }
}

fn fixture_customer(id: &str, name: &str, kyc: KycStatus, active: bool) -> Customer {
    Customer {
        id: id.to_owned(),
        name: name.to_owned(),
        email: format!("{id}@example.com"),
        kyc_status: Some(kyc),
        is_active: Some(active),
        ..Customer::default()
    }
}

fn fixture_transaction(id: &str, customer_id: &str) -> Transaction {
    serde_json::from_value(json!({
        "id": id,
        "customerId": customer_id,
        "amount": 10.0,
        "currency": "TRY",
        "createdAt": "2024-06-01T10:00:00Z"
    }))
    .expect("valid transaction fixture")
}

fn fixture_dataset() -> StaticDataset {
    StaticDataset::new(
        vec![
            fixture_customer("c-1", "Ada Lovelace", KycStatus::Verified, true),
            fixture_customer("c-2", "Alan Turing", KycStatus::Unverified, true),
            fixture_customer("c-3", "Grace Hopper", KycStatus::Verified, false),
        ],
        vec![
            fixture_transaction("t-1", "c-1"),
            fixture_transaction("t-2", "c-1"),
            fixture_transaction("t-3", "c-2"),
        ],
    )
}

fn create_payload() -> CreateCustomerPayload {
    CreateCustomerPayload {
        name: String::from("Ada Lovelace"),
        email: String::from("ada@example.com"),
        currency: String::from("TRY"),
        daily_limit: 500.0,
        available_limit: 2_000.0,
        ..CreateCustomerPayload::default()
    }
}

// =============================================================================
// Filter normalization and list shapes
// =============================================================================

#[tokio::test]
async fn when_listing_customers_only_selected_filters_are_sent() {
    // Given: A backend expecting normalized query parameters
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customers"))
        .and(query_param("page", "1"))
        .and(query_param("pageSize", "10"))
        .and(query_param("search", "ada"))
        .and(query_param("kycStatus", "VERIFIED"))
        .and(query_param("isActive", "false"))
        .and(query_param_is_missing("status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "c-9",
                "name": "Ada",
                "email": "ada@example.com",
                "kycStatus": "VERIFIED"
            }],
            "page": 1,
            "pageSize": 10,
            "total": 1
        })))
        .expect(1)
        .mount(&server)
        .await;
    let harness = harness(&server.uri());

    // When: Customers are listed with search, KYC and activity filters
    let filters = CustomerFilters {
        kyc_status: Some(KycStatus::Verified),
        is_active: Some(false),
        ..CustomerFilters::default()
    }
    .search("ada");
    let response = harness
        .api
        .fetch_customers(&filters, None)
        .await
        .expect("list should resolve");

    // Then: The page is decoded into customers
    assert_eq!(response.data.items.len(), 1);
    assert_eq!(response.data.items[0].kyc_status, Some(KycStatus::Verified));
    assert_eq!(response.data.total, 1);
    assert_eq!(harness.toast.count(), 0);
}

#[tokio::test]
async fn when_backend_nests_pagination_in_meta_list_is_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/transactions/c-1"))
        .and(query_param("transferDirection", "INCOMING"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "items": [
                    {
                        "id": "t-1",
                        "customerId": "c-1",
                        "amount": 5.0,
                        "currency": "TRY",
                        "createdAt": "2024-06-01T10:00:00Z"
                    }
                ],
                "meta": {"currentPage": 2, "pageSize": 5, "totalCount": 11}
            }
        })))
        .mount(&server)
        .await;
    let harness = harness(&server.uri());

    let filters = TransactionFilters {
        transfer_direction: Some(walletdesk_core::domain::TransferDirection::Incoming),
        ..TransactionFilters::default()
    };
    let response = harness
        .api
        .fetch_transactions("c-1", &filters, None)
        .await
        .expect("transactions should resolve");

    let page = response.data;
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.meta.page, 2);
    assert_eq!(page.meta.page_size, 5);
    assert_eq!(page.total, 11);
}

#[tokio::test]
async fn when_single_customer_is_double_wrapped_service_unwraps_it() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customers/c-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"data": {"id": "c-1", "name": "Ada", "email": "ada@example.com"}}
        })))
        .mount(&server)
        .await;
    let harness = harness(&server.uri());

    let response = harness
        .api
        .fetch_customer("c-1", None)
        .await
        .expect("customer should resolve");

    assert_eq!(response.data.id, "c-1");
    assert_eq!(response.data.name, "Ada");
}

// =============================================================================
// Offline datasets
// =============================================================================

#[tokio::test]
async fn when_backend_is_unreachable_customer_list_is_served_from_dataset() {
    // Given: No backend
    let harness = harness(&unreachable_base_url().await);

    // When: Verified customers are listed
    let filters = CustomerFilters {
        kyc_status: Some(KycStatus::Verified),
        ..CustomerFilters::default()
    };
    let response = harness
        .api
        .fetch_customers(&filters, None)
        .await
        .expect("fallback should resolve");

    // Then: The dataset is filtered locally and a single warning is raised
    let ids: Vec<&str> = response.data.items.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["c-1", "c-3"]);
    assert_eq!(response.data.total, 2);
    assert_eq!(response.message.as_deref(), Some(OFFLINE_NOTICE));
    assert!(response.success);
    assert_eq!(harness.toast.count(), 1);
    assert_eq!(harness.toast.notifications()[0].message, OFFLINE_NOTICE);
}

#[tokio::test]
async fn when_backend_is_unreachable_transactions_come_back_as_one_page() {
    let harness = harness(&unreachable_base_url().await);

    let response = harness
        .api
        .fetch_transactions("c-1", &TransactionFilters::default(), None)
        .await
        .expect("fallback should resolve");

    assert_eq!(response.data.items.len(), 2);
    assert_eq!(response.data.meta.page_size, 2);
    assert_eq!(response.data.meta.page, 1);
}

#[tokio::test]
async fn when_backend_is_unreachable_wallet_is_an_empty_usd_wallet() {
    let harness = harness(&unreachable_base_url().await);

    let response = harness
        .api
        .fetch_wallet("c-2", None)
        .await
        .expect("fallback should resolve");

    assert_eq!(response.data.currency, "USD");
    assert_eq!(response.data.balance, 0.0);
}

#[tokio::test]
async fn when_list_items_do_not_decode_dataset_is_used_instead() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [1, 2], "total": 2})))
        .mount(&server)
        .await;
    let harness = harness(&server.uri());

    let response = harness
        .api
        .fetch_customers(&CustomerFilters::default(), None)
        .await
        .expect("fallback should resolve");

    assert_eq!(response.data.total, 3);
    assert_eq!(harness.toast.count(), 1);
}

#[tokio::test]
async fn when_create_cannot_reach_backend_payload_is_echoed_as_mock_customer() {
    let harness = harness(&unreachable_base_url().await);

    let response = harness
        .api
        .create_customer(&create_payload())
        .await
        .expect("fallback should resolve");

    assert_eq!(response.status, 201);
    assert!(response.data.id.starts_with("mock-"));
    assert_eq!(response.data.kyc_status, Some(KycStatus::Unknown));
    assert_eq!(response.data.is_active, Some(true));
    let wallet = response.data.wallet.expect("wallet");
    assert_eq!(wallet.status, Some(WalletStatus::Active));
    assert_eq!(wallet.daily_limit, Some(500.0));
}

// =============================================================================
// Mutations
// =============================================================================

#[tokio::test]
async fn when_limits_are_updated_wallet_path_and_body_are_used() {
    // Given: A backend accepting the limit change
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/wallets/c-1"))
        .and(body_json(json!({"availableLimit": 5000.0, "dailyLimit": 750.0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "c-1"}})))
        .expect(1)
        .mount(&server)
        .await;
    let harness = harness(&server.uri());
    let cache = harness.queries.cache();
    cache.set_query_data(customers_key(&CustomerFilters::default()), Value::Null);
    cache.set_query_data(customer_key(Some("c-1")), Value::Null);
    cache.set_query_data(wallet_key(Some("c-1")), Value::Null);

    // When: The limit mutation runs
    let payload = UpdateWalletLimitPayload::new("c-1", 5_000.0, 750.0).expect("valid limits");
    let mutation = harness.queries.mutation(update_limits_mutation(&harness.api));
    mutation.mutate(payload).await.expect("mutation should succeed");

    // Then: Customer, customer list and wallet entries are all stale
    let stale_time = cache.stale_time();
    assert!(!cache.is_fresh(&customers_key(&CustomerFilters::default()), stale_time));
    assert!(!cache.is_fresh(&customer_key(Some("c-1")), stale_time));
    assert!(!cache.is_fresh(&wallet_key(Some("c-1")), stale_time));
}

#[tokio::test]
async fn when_customer_is_created_list_query_refetches() {
    // Given: A cached customer list
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [], "total": 0})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/customers"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"data": {"id": "c-9", "name": "Ada Lovelace"}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    let harness = harness(&server.uri());
    let list = customers_query(&harness.api, CustomerFilters::default());
    harness.queries.query(&list).await.expect("first load");
    harness.queries.query(&list).await.expect("served from cache");

    // When: A customer is created
    let mutation = harness.queries.mutation(create_customer_mutation(&harness.api));
    let created = mutation.mutate(create_payload()).await.expect("create");
    assert_eq!(created.data.id, "c-9");

    // Then: The next list read goes back to the backend
    harness.queries.query(&list).await.expect("reload");
}

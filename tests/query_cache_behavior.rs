//! Behavior-driven tests for the query cache and hooks
//!
//! These tests verify how observers follow changing keys, how superseded
//! results are discarded, and how concurrent readers share one fetch.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use walletdesk_core::{
    ApiError, ApiResponse, ClientError, MutationSpec, QueryClient, QueryContext, QueryKey,
    QuerySpec, QueryStatus, RecordingSink,
};
use walletdesk_tests::{recording_notifier, Arc};

fn context() -> (QueryContext, Arc<RecordingSink>, Arc<RecordingSink>) {
    let (notifier, modal, toast) = recording_notifier();
    (QueryContext::new(QueryClient::default(), notifier), modal, toast)
}

fn page_key(page: u64) -> QueryKey {
    QueryKey::new("customers").with(page)
}

/// A page query answering `items` after `delay`.
fn page_spec(page: u64, delay: Duration, calls: &Arc<AtomicUsize>) -> QuerySpec<Vec<String>> {
    let calls = Arc::clone(calls);
    QuerySpec::new(page_key(page), move |_signal| {
        calls.fetch_add(1, Ordering::SeqCst);
        async move {
            tokio::time::sleep(delay).await;
            Ok(ApiResponse::ok(vec![format!("page-{page}")]))
        }
    })
    .keep_previous_data()
}

// =============================================================================
// Key isolation
// =============================================================================

#[tokio::test]
async fn when_page_changes_previous_page_stays_visible_until_next_page_arrives() {
    // Given: An observer showing page 1
    let (context, _, _) = context();
    let calls = Arc::new(AtomicUsize::new(0));
    let mut observer = context.observe::<Vec<String>>();
    observer.set_spec(page_spec(1, Duration::ZERO, &calls));
    let first = observer.settled().await;
    assert_eq!(first.data.as_deref(), Some(&vec![String::from("page-1")]));

    // When: The filters move to page 2
    observer.set_spec(page_spec(2, Duration::from_millis(50), &calls));

    // Then: Page 1 is shown as a placeholder while page 2 loads
    let loading = observer.state();
    assert!(loading.is_fetching);
    assert!(loading.is_placeholder);
    assert_eq!(loading.status, QueryStatus::Success);
    assert_eq!(loading.data.as_deref(), Some(&vec![String::from("page-1")]));

    // And: Page 2 replaces it once resolved, each page cached under its own key
    let second = observer.settled().await;
    assert!(!second.is_placeholder);
    assert_eq!(second.data.as_deref(), Some(&vec![String::from("page-2")]));
    assert!(context.cache().get_query_data::<Vec<String>>(&page_key(1)).is_some());
    assert!(context.cache().get_query_data::<Vec<String>>(&page_key(2)).is_some());
    assert_ne!(page_key(1), page_key(2));
}

#[tokio::test]
async fn when_returning_to_a_cached_page_no_fetch_is_issued() {
    let (context, _, _) = context();
    let calls = Arc::new(AtomicUsize::new(0));

    context.query(&page_spec(1, Duration::ZERO, &calls)).await.expect("page 1");
    context.query(&page_spec(2, Duration::ZERO, &calls)).await.expect("page 2");
    let again = context.query(&page_spec(1, Duration::ZERO, &calls)).await.expect("page 1 again");

    assert_eq!(again.as_deref(), Some(&vec![String::from("page-1")]));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn when_a_page_goes_unused_past_gc_time_it_is_evicted() {
    // Given: A cache that forgets entries unused for 50ms
    let (notifier, _, _) = recording_notifier();
    let context = QueryContext::new(
        QueryClient::default().with_gc_time(Duration::from_millis(50)),
        notifier,
    );
    let calls = Arc::new(AtomicUsize::new(0));
    context.query(&page_spec(1, Duration::ZERO, &calls)).await.expect("page 1");

    // When: Another page is fetched after page 1 sat unused
    tokio::time::sleep(Duration::from_millis(100)).await;
    context.query(&page_spec(2, Duration::ZERO, &calls)).await.expect("page 2");

    // Then: Page 1 is gone and reading it again goes back to the backend
    assert!(context.cache().get_query_data::<Vec<String>>(&page_key(1)).is_none());
    assert_eq!(context.cache().len(), 1);
    context.query(&page_spec(1, Duration::ZERO, &calls)).await.expect("page 1 again");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

// =============================================================================
// Superseded results
// =============================================================================

#[tokio::test]
async fn when_key_changes_mid_flight_late_result_never_overwrites_state() {
    // Given: A slow query for page 1
    let (context, _, _) = context();
    let calls = Arc::new(AtomicUsize::new(0));
    let mut observer = context.observe::<Vec<String>>();
    observer.set_spec(page_spec(1, Duration::from_millis(200), &calls));

    // When: Page 2 is requested before page 1 resolves
    tokio::time::sleep(Duration::from_millis(20)).await;
    observer.set_spec(page_spec(2, Duration::ZERO, &calls));
    let settled = observer.settled().await;

    // Then: Page 2 wins and stays after page 1 would have finished
    assert_eq!(settled.data.as_deref(), Some(&vec![String::from("page-2")]));
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(observer.state().data.as_deref(), Some(&vec![String::from("page-2")]));

    // And: The abandoned fetch was cancelled rather than cached
    assert!(context.cache().get_query_data::<Vec<String>>(&page_key(1)).is_none());
    assert_eq!(context.cache().in_flight(), 0);
}

#[tokio::test]
async fn when_observer_is_disposed_running_fetch_is_cancelled_silently() {
    let (context, modal, toast) = context();
    let spec = QuerySpec::new(page_key(9), |signal| async move {
        signal.cancelled().await;
        Err::<ApiResponse<Vec<String>>, _>(ClientError::Cancelled)
    });

    let mut observer = context.observe::<Vec<String>>();
    observer.set_spec(spec);
    tokio::time::sleep(Duration::from_millis(20)).await;
    observer.dispose();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(!observer.state().is_fetching);
    assert_eq!(context.cache().in_flight(), 0);
    assert_eq!(modal.count() + toast.count(), 0);
}

// =============================================================================
// Sharing and failures
// =============================================================================

#[tokio::test]
async fn when_two_readers_ask_for_the_same_key_one_fetch_is_shared() {
    let (context, _, _) = context();
    let calls = Arc::new(AtomicUsize::new(0));
    let spec = page_spec(1, Duration::from_millis(30), &calls);

    let (left, right) = tokio::join!(context.query(&spec), context.query(&spec));

    assert_eq!(left.expect("left"), right.expect("right"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn when_query_fails_terminally_both_channels_are_notified_once() {
    // Given: A query that keeps failing with a client error
    let (context, modal, toast) = context();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let spec = QuerySpec::new(QueryKey::new("customer").with("x"), move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        async {
            let error = ApiError::new("Customer not found", 404, "/customers/x");
            Err::<ApiResponse<String>, _>(ClientError::Api(error))
        }
    })
    .error_message_key("dashboard.errors.customers");

    // When: The query runs
    let result = context.query(&spec).await;

    // Then: 404 is not retried and each channel sees the server message once
    assert_eq!(result.expect_err("should fail").status(), Some(404));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(modal.count(), 1);
    assert_eq!(toast.count(), 1);
    assert_eq!(modal.notifications()[0].message, "Customer not found");
    assert!(context.cache().is_empty());
}

#[tokio::test]
async fn when_mutation_succeeds_declared_prefixes_become_stale() {
    // Given: Two cached customer pages and a cached wallet
    let (context, _, _) = context();
    context.cache().set_query_data(page_key(1), vec![String::from("a")]);
    context.cache().set_query_data(page_key(2), vec![String::from("b")]);
    context.cache().set_query_data(QueryKey::new("wallet").with("cus-001"), 10_u32);

    let mutation = context.mutation(
        MutationSpec::new(|name: String| async move { Ok(ApiResponse::ok(name)) })
            .invalidates(QueryKey::new("customers")),
    );

    // When: The mutation resolves
    mutation.mutate(String::from("Ada")).await.expect("mutation");

    // Then: Only keys under the prefix are stale
    let stale_time = context.cache().stale_time();
    assert!(!context.cache().is_fresh(&page_key(1), stale_time));
    assert!(!context.cache().is_fresh(&page_key(2), stale_time));
    assert!(context.cache().is_fresh(&QueryKey::new("wallet").with("cus-001"), stale_time));
}

//! Query and mutation hooks.
//!
//! A [`QuerySpec`] pairs a cache key with a fetcher. [`QueryContext::query`]
//! resolves it once through the shared [`QueryClient`]; a [`QueryObserver`]
//! follows a changing spec over time (e.g. filters edited in the UI) and
//! exposes its [`QueryState`]. Only the run started for the observer's current
//! key may write its state; superseded runs are aborted and their results
//! dropped.
//!
//! [`Mutation`]s run on demand, retry once on transient failures and
//! invalidate declared cache prefixes on success. Terminal failures of either
//! kind are reported through the [`Notifier`] exactly once per execution;
//! cancellations are silent.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cache::{CacheMode, QueryClient, QueryKey, DEFAULT_STALE_TIME};
use crate::envelope::ApiResponse;
use crate::error::ClientError;
use crate::i18n;
use crate::notify::Notifier;
use crate::retry::RetryConfig;

/// Async producer behind a query; receives the request's cancellation token.
pub type QueryFetcher<T> =
    Arc<dyn Fn(CancellationToken) -> BoxFuture<'static, ApiResult<T>> + Send + Sync>;

/// Async producer behind a mutation.
pub type MutationFn<T, V> = Arc<dyn Fn(V) -> BoxFuture<'static, ApiResult<T>> + Send + Sync>;

type ApiResult<T> = Result<ApiResponse<T>, ClientError>;

#[derive(Debug, Clone, PartialEq)]
pub struct QueryOptions {
    /// When false the query never executes.
    pub enabled: bool,
    pub retry: RetryConfig,
    pub stale_time: Duration,
    pub error_message_key: String,
    /// Show the previous key's data while the new key loads.
    pub keep_previous_data: bool,
    pub cache_mode: CacheMode,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            retry: RetryConfig::for_queries(),
            stale_time: DEFAULT_STALE_TIME,
            error_message_key: String::from(i18n::ERROR_DESCRIPTION),
            keep_previous_data: false,
            cache_mode: CacheMode::Use,
        }
    }
}

/// Keyed query description.
pub struct QuerySpec<T> {
    key: QueryKey,
    fetcher: QueryFetcher<T>,
    options: QueryOptions,
}

impl<T> Clone for QuerySpec<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            fetcher: Arc::clone(&self.fetcher),
            options: self.options.clone(),
        }
    }
}

impl<T> fmt::Debug for QuerySpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySpec")
            .field("key", &self.key)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> QuerySpec<T> {
    pub fn new<F, Fut>(key: QueryKey, fetcher: F) -> Self
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ApiResponse<T>, ClientError>> + Send + 'static,
    {
        Self {
            key,
            fetcher: Arc::new(move |signal| fetcher(signal).boxed()),
            options: QueryOptions::default(),
        }
    }
}

impl<T> QuerySpec<T> {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.options.enabled = enabled;
        self
    }

    pub fn keep_previous_data(mut self) -> Self {
        self.options.keep_previous_data = true;
        self
    }

    pub fn error_message_key(mut self, key: impl Into<String>) -> Self {
        self.options.error_message_key = key.into();
        self
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.options.retry = retry;
        self
    }

    pub fn stale_time(mut self, stale_time: Duration) -> Self {
        self.options.stale_time = stale_time;
        self
    }

    pub fn cache_mode(mut self, cache_mode: CacheMode) -> Self {
        self.options.cache_mode = cache_mode;
        self
    }
}

/// Cache plus notifier shared by all hooks of one client.
#[derive(Clone, Default)]
pub struct QueryContext {
    cache: QueryClient,
    notifier: Notifier,
}

impl QueryContext {
    pub fn new(cache: QueryClient, notifier: Notifier) -> Self {
        Self { cache, notifier }
    }

    pub fn cache(&self) -> &QueryClient {
        &self.cache
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Resolves `spec` once. `Ok(None)` means the query is disabled.
    pub async fn query<T>(&self, spec: &QuerySpec<T>) -> Result<Option<Arc<T>>, ClientError>
    where
        T: Send + Sync + 'static,
    {
        if !spec.options.enabled {
            debug!(key = %spec.key, "query disabled");
            return Ok(None);
        }

        let fetcher = Arc::clone(&spec.fetcher);
        let retry = spec.options.retry.clone();
        let options = &spec.options;
        let result = self
            .cache
            .fetch(&spec.key, options.cache_mode, options.stale_time, move |signal| {
                async move {
                    retry
                        .run(&signal, || fetcher(signal.clone()))
                        .await
                        .map(ApiResponse::into_data)
                }
            })
            .await;

        match result {
            Ok(data) => Ok(Some(data)),
            Err(error) => {
                self.notifier
                    .notify_failure(&error, &spec.options.error_message_key);
                Err(error)
            }
        }
    }

    pub fn observe<T>(&self) -> QueryObserver<T>
    where
        T: Send + Sync + 'static,
    {
        QueryObserver::new(self.clone())
    }

    pub fn mutation<T, V>(&self, spec: MutationSpec<T, V>) -> Mutation<T, V> {
        Mutation {
            context: self.clone(),
            spec,
            status: Mutex::new(MutationStatus::Idle),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Disabled, or no spec yet.
    Idle,
    /// Fetching with nothing to show.
    Loading,
    Success,
    Error,
}

/// Snapshot of an observed query.
pub struct QueryState<T> {
    pub key: Option<QueryKey>,
    pub status: QueryStatus,
    pub data: Option<Arc<T>>,
    pub error: Option<ClientError>,
    pub is_fetching: bool,
    /// `data` belongs to a previous key.
    pub is_placeholder: bool,
    run: u64,
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            is_fetching: self.is_fetching,
            is_placeholder: self.is_placeholder,
            run: self.run,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for QueryState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryState")
            .field("key", &self.key)
            .field("status", &self.status)
            .field("data", &self.data)
            .field("error", &self.error)
            .field("is_fetching", &self.is_fetching)
            .field("is_placeholder", &self.is_placeholder)
            .finish()
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            key: None,
            status: QueryStatus::Idle,
            data: None,
            error: None,
            is_fetching: false,
            is_placeholder: false,
            run: 0,
        }
    }
}

impl<T> QueryState<T> {
    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }
}

/// Follows one logical query across key changes.
pub struct QueryObserver<T> {
    context: QueryContext,
    state: Arc<watch::Sender<QueryState<T>>>,
    spec: Option<QuerySpec<T>>,
    task: Option<JoinHandle<()>>,
}

impl<T> QueryObserver<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(context: QueryContext) -> Self {
        let (state, _) = watch::channel(QueryState::default());
        Self {
            context,
            state: Arc::new(state),
            spec: None,
            task: None,
        }
    }

    pub fn state(&self) -> QueryState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<T>> {
        self.state.subscribe()
    }

    /// Points the observer at `spec`. A spec with the current key and the
    /// same enabled flag is a no-op; anything else supersedes the running query.
    pub fn set_spec(&mut self, spec: QuerySpec<T>) {
        let unchanged = self.spec.as_ref().is_some_and(|current| {
            current.key == spec.key && current.options.enabled == spec.options.enabled
        });
        if unchanged {
            return;
        }

        self.spec = Some(spec.clone());
        self.start(spec);
    }

    /// Re-runs the current spec, ignoring cached freshness.
    pub fn refetch(&mut self) {
        if let Some(spec) = self.spec.clone() {
            self.start(spec.cache_mode(CacheMode::Refresh));
        }
    }

    /// Waits until the current run has settled and returns the final state.
    pub async fn settled(&self) -> QueryState<T> {
        let mut receiver = self.state.subscribe();
        let settled = receiver.wait_for(|state| !state.is_fetching).await;
        match settled {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    /// Cancels the running query.
    pub fn dispose(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.state.send_modify(|state| {
            state.run += 1;
            state.is_fetching = false;
        });
    }

    fn start(&mut self, spec: QuerySpec<T>) {
        if let Some(task) = self.task.take() {
            task.abort();
        }

        let cached = self.context.cache.get_query_data::<T>(&spec.key);
        let mut run = 0;
        self.state.send_modify(|state| {
            state.run += 1;
            run = state.run;
            Self::begin(state, &spec, cached);
        });

        if !spec.options.enabled {
            return;
        }

        let context = self.context.clone();
        let state = Arc::clone(&self.state);
        self.task = Some(tokio::spawn(async move {
            let result = context.query(&spec).await;
            state.send_if_modified(|state| {
                if state.run != run {
                    debug!(key = %spec.key, "dropping result of superseded query");
                    return false;
                }
                Self::finish(state, result);
                true
            });
        }));
    }

    fn begin(state: &mut QueryState<T>, spec: &QuerySpec<T>, cached: Option<Arc<T>>) {
        let same_key = state.key.as_ref() == Some(&spec.key);
        state.key = Some(spec.key.clone());
        state.error = None;

        if !spec.options.enabled {
            state.status = QueryStatus::Idle;
            state.is_fetching = false;
            if !(spec.options.keep_previous_data || same_key) {
                state.data = None;
                state.is_placeholder = false;
            }
            return;
        }

        state.is_fetching = true;
        if let Some(cached) = cached {
            state.data = Some(cached);
            state.is_placeholder = false;
            state.status = QueryStatus::Success;
        } else if state.data.is_some() && (spec.options.keep_previous_data || same_key) {
            state.is_placeholder = !same_key || state.is_placeholder;
            state.status = QueryStatus::Success;
        } else {
            state.data = None;
            state.is_placeholder = false;
            state.status = QueryStatus::Loading;
        }
    }

    fn finish(state: &mut QueryState<T>, result: Result<Option<Arc<T>>, ClientError>) {
        state.is_fetching = false;
        match result {
            Ok(Some(data)) => {
                state.data = Some(data);
                state.error = None;
                state.is_placeholder = false;
                state.status = QueryStatus::Success;
            }
            Ok(None) => state.status = QueryStatus::Idle,
            Err(ClientError::Cancelled) => {
                if state.data.is_none() {
                    state.status = QueryStatus::Idle;
                }
            }
            Err(error) => {
                state.error = Some(error);
                state.status = QueryStatus::Error;
            }
        }
    }
}

impl<T> Drop for QueryObserver<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// On-demand write operation.
pub struct MutationSpec<T, V> {
    mutate: MutationFn<T, V>,
    retry: RetryConfig,
    error_message_key: String,
    invalidates: Vec<QueryKey>,
}

impl<T: Send + 'static, V: Send + 'static> MutationSpec<T, V> {
    pub fn new<F, Fut>(mutate: F) -> Self
    where
        F: Fn(V) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ApiResponse<T>, ClientError>> + Send + 'static,
    {
        Self {
            mutate: Arc::new(move |variables| mutate(variables).boxed()),
            retry: RetryConfig::for_mutations(),
            error_message_key: String::from(i18n::ERROR_DESCRIPTION),
            invalidates: Vec::new(),
        }
    }
}

impl<T, V> MutationSpec<T, V> {
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn error_message_key(mut self, key: impl Into<String>) -> Self {
        self.error_message_key = key.into();
        self
    }

    /// Cache prefix invalidated after every successful run.
    pub fn invalidates(mut self, prefix: QueryKey) -> Self {
        self.invalidates.push(prefix);
        self
    }

    pub fn invalidated_keys(&self) -> &[QueryKey] {
        &self.invalidates
    }

    pub fn error_key(&self) -> &str {
        &self.error_message_key
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStatus {
    Idle,
    Pending,
    Success,
    Error,
}

pub struct Mutation<T, V> {
    context: QueryContext,
    spec: MutationSpec<T, V>,
    status: Mutex<MutationStatus>,
}

impl<T, V> Mutation<T, V>
where
    V: Clone,
{
    pub fn status(&self) -> MutationStatus {
        *self.status.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_status(&self, status: MutationStatus) {
        *self.status.lock().unwrap_or_else(|e| e.into_inner()) = status;
    }

    pub async fn mutate(&self, variables: V) -> Result<ApiResponse<T>, ClientError> {
        self.mutate_with_signal(variables, &CancellationToken::new()).await
    }

    /// Runs the mutation; `signal` only interrupts the wait between retries.
    pub async fn mutate_with_signal(
        &self,
        variables: V,
        signal: &CancellationToken,
    ) -> Result<ApiResponse<T>, ClientError> {
        self.set_status(MutationStatus::Pending);
        let result = self
            .spec
            .retry
            .run(signal, || (self.spec.mutate)(variables.clone()))
            .await;

        match result {
            Ok(response) => {
                for prefix in &self.spec.invalidates {
                    self.context.cache.invalidate(prefix);
                }
                self.set_status(MutationStatus::Success);
                Ok(response)
            }
            Err(error) => {
                self.context
                    .notifier
                    .notify_failure(&error, &self.spec.error_message_key);
                self.set_status(MutationStatus::Error);
                Err(error)
            }
        }
    }
}

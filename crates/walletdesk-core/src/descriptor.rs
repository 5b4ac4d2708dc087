//! Per-call request descriptors.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::envelope::ApiResponse;
use crate::http_client::{FormField, HttpMethod};
use crate::i18n;
use crate::query::{QueryParams, QueryValue};

/// Produces substitute data when the backend cannot be reached.
pub type FallbackProducer<T> = Box<dyn FnOnce() -> ApiResponse<T> + Send>;

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Multipart(Vec<FormField>),
}

impl RequestBody {
    pub fn json<B: Serialize + ?Sized>(body: &B) -> Result<Self, serde_json::Error> {
        serde_json::to_value(body).map(Self::Json)
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Vec<FormField>> for RequestBody {
    fn from(fields: Vec<FormField>) -> Self {
        Self::Multipart(fields)
    }
}

/// Everything about a call except its path, method and body.
pub struct RequestOptions<T> {
    pub(crate) params: QueryParams,
    pub(crate) signal: Option<CancellationToken>,
    pub(crate) headers: BTreeMap<String, String>,
    pub(crate) timeout: TimeoutSetting,
    pub(crate) skip_auth: bool,
    pub(crate) fallback: Option<FallbackProducer<T>>,
    pub(crate) fallback_message_key: String,
}

/// Per-call timeout override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum TimeoutSetting {
    #[default]
    Configured,
    Disabled,
    Custom(Duration),
}

impl<T> Default for RequestOptions<T> {
    fn default() -> Self {
        Self {
            params: QueryParams::new(),
            signal: None,
            headers: BTreeMap::new(),
            timeout: TimeoutSetting::Configured,
            skip_auth: false,
            fallback: None,
            fallback_message_key: String::from(i18n::FALLBACK_NOTICE),
        }
    }
}

impl<T> fmt::Debug for RequestOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("params", &self.params)
            .field("signal", &self.signal)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("timeout", &self.timeout)
            .field("skip_auth", &self.skip_auth)
            .field("fallback", &self.fallback.is_some())
            .field("fallback_message_key", &self.fallback_message_key)
            .finish()
    }
}

impl<T> RequestOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.params.insert(key, value);
        self
    }

    /// Caller-owned cancellation signal; the engine only listens to it.
    pub fn signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }

    pub fn maybe_signal(mut self, signal: Option<CancellationToken>) -> Self {
        self.signal = signal;
        self
    }

    /// Header override; wins over the engine's defaults.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = if timeout.is_zero() {
            TimeoutSetting::Disabled
        } else {
            TimeoutSetting::Custom(timeout)
        };
        self
    }

    pub fn no_timeout(mut self) -> Self {
        self.timeout = TimeoutSetting::Disabled;
        self
    }

    /// Suppresses the bearer token for this call.
    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    pub fn fallback(mut self, producer: impl FnOnce() -> ApiResponse<T> + Send + 'static) -> Self {
        self.fallback = Some(Box::new(producer));
        self
    }

    pub fn fallback_message_key(mut self, key: impl Into<String>) -> Self {
        self.fallback_message_key = key.into();
        self
    }

    pub(crate) fn resolve_timeout(&self, configured: Option<Duration>) -> Option<Duration> {
        match self.timeout {
            TimeoutSetting::Configured => configured,
            TimeoutSetting::Disabled => None,
            TimeoutSetting::Custom(timeout) => Some(timeout),
        }
    }
}

/// A fully described call, owned by its call site.
#[derive(Debug)]
pub struct RequestDescriptor<T> {
    pub(crate) path: String,
    pub(crate) method: HttpMethod,
    pub(crate) body: Option<RequestBody>,
    pub(crate) options: RequestOptions<T>,
}

impl<T> RequestDescriptor<T> {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            body: None,
            options: RequestOptions::default(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn maybe_body(mut self, body: Option<RequestBody>) -> Self {
        self.body = body;
        self
    }

    pub fn options(mut self, options: RequestOptions<T>) -> Self {
        self.options = options;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub const fn method(&self) -> HttpMethod {
        self.method
    }
}

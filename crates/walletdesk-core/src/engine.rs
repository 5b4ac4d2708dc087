//! Request engine.
//!
//! [`ApiClient::request`] issues exactly one HTTP call and classifies every
//! outcome:
//!
//! | Outcome | Result |
//! |---------|--------|
//! | 2xx | `Ok(ApiResponse<T>)`, body unwrapped via [`ResponseShape`] |
//! | non-2xx | `Err(ClientError::Api)` with the HTTP status; never replaced by fallback data |
//! | caller cancellation or timeout | `Err(ClientError::Cancelled)`; silent |
//! | transport / decoding failure | fallback data plus a warning toast, else status-0 `ClientError::Api` |

use std::collections::BTreeMap;
use std::future::{self, Future};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::descriptor::{RequestBody, RequestDescriptor, RequestOptions};
use crate::envelope::{ApiResponse, EnvelopeFields, ResponseShape};
use crate::error::{ApiError, ClientError};
use crate::http_client::{
    HttpAuth, HttpBody, HttpClient, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
    ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, JSON_MEDIA_TYPE,
};
use crate::i18n;
use crate::notify::Notifier;
use crate::query::{build_query, BuildQueryOptions};
use crate::session::{MemorySessionStore, SessionStore};

/// Raw failure before classification.
#[derive(Debug)]
enum Failure {
    Aborted { timed_out: bool },
    Api(ApiError),
    Transport(String),
}

/// REST client for the dashboard backend.
#[derive(Clone)]
pub struct ApiClient {
    config: ClientConfig,
    http: Arc<dyn HttpClient>,
    session: Arc<dyn SessionStore>,
    notifier: Notifier,
}

/// Builder for [`ApiClient`]; unset collaborators get production defaults.
pub struct ApiClientBuilder {
    config: ClientConfig,
    http: Option<Arc<dyn HttpClient>>,
    session: Option<Arc<dyn SessionStore>>,
    notifier: Option<Notifier>,
}

impl ApiClientBuilder {
    pub fn http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    pub fn session(mut self, session: Arc<dyn SessionStore>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn build(self) -> ApiClient {
        let session = self
            .session
            .unwrap_or_else(|| Arc::new(MemorySessionStore::default()));
        let http = self
            .http
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new(self.config.user_agent())));
        let notifier = self
            .notifier
            .unwrap_or_default()
            .with_session(Arc::clone(&session));

        ApiClient {
            config: self.config,
            http,
            session,
            notifier,
        }
    }
}

impl ApiClient {
    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            http: None,
            session: None,
            notifier: None,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Issues one call described by `descriptor`.
    #[instrument(skip_all, fields(method = %descriptor.method, path = %descriptor.path))]
    pub async fn request<T>(
        &self,
        descriptor: RequestDescriptor<T>,
    ) -> Result<ApiResponse<T>, ClientError>
    where
        T: DeserializeOwned + Send,
    {
        let timeout = descriptor.options.resolve_timeout(self.config.timeout());
        let RequestDescriptor {
            path,
            method,
            body,
            options,
        } = descriptor;
        let RequestOptions {
            params,
            signal,
            headers,
            skip_auth,
            fallback,
            fallback_message_key,
            ..
        } = options;

        // Child of the caller's token: caller cancellation propagates here, our
        // timeout cancels only this call.
        let abort = signal
            .as_ref()
            .map_or_else(CancellationToken::new, CancellationToken::child_token);

        let outcome = {
            let deadline = deadline(timeout);
            tokio::pin!(deadline);

            let url = self
                .config
                .url_for(&path, &build_query(&params, &BuildQueryOptions::default()));
            let call = self.perform::<T>(url, method, body, headers, skip_auth);

            tokio::select! {
                biased;
                () = abort.cancelled() => Err(Failure::Aborted { timed_out: false }),
                () = &mut deadline => {
                    abort.cancel();
                    Err(Failure::Aborted { timed_out: true })
                }
                result = call => result,
            }
        };

        match outcome {
            Ok(response) => Ok(response),
            Err(Failure::Aborted { timed_out }) => {
                debug!(timed_out, "request aborted");
                Err(ClientError::Cancelled)
            }
            Err(Failure::Api(error)) => Err(ClientError::Api(error)),
            Err(Failure::Transport(message)) => match fallback {
                Some(produce) => {
                    warn!(error = %message, "backend unreachable, resolving with fallback data");
                    self.notifier.notify_fallback(&fallback_message_key);
                    Ok(produce())
                }
                None => {
                    let details = json!({ "cause": message });
                    Err(ClientError::Api(
                        ApiError::transport(message, path).with_details(details),
                    ))
                }
            },
        }
    }

    pub async fn get<T>(
        &self,
        path: &str,
        options: RequestOptions<T>,
    ) -> Result<ApiResponse<T>, ClientError>
    where
        T: DeserializeOwned + Send,
    {
        self.request(RequestDescriptor::new(HttpMethod::Get, path).options(options))
            .await
    }

    pub async fn post<T>(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        options: RequestOptions<T>,
    ) -> Result<ApiResponse<T>, ClientError>
    where
        T: DeserializeOwned + Send,
    {
        self.request(
            RequestDescriptor::new(HttpMethod::Post, path)
                .body(body.into())
                .options(options),
        )
        .await
    }

    pub async fn put<T>(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        options: RequestOptions<T>,
    ) -> Result<ApiResponse<T>, ClientError>
    where
        T: DeserializeOwned + Send,
    {
        self.request(
            RequestDescriptor::new(HttpMethod::Put, path)
                .body(body.into())
                .options(options),
        )
        .await
    }

    pub async fn patch<T>(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        options: RequestOptions<T>,
    ) -> Result<ApiResponse<T>, ClientError>
    where
        T: DeserializeOwned + Send,
    {
        self.request(
            RequestDescriptor::new(HttpMethod::Patch, path)
                .body(body.into())
                .options(options),
        )
        .await
    }

    pub async fn delete<T>(
        &self,
        path: &str,
        body: Option<RequestBody>,
        options: RequestOptions<T>,
    ) -> Result<ApiResponse<T>, ClientError>
    where
        T: DeserializeOwned + Send,
    {
        self.request(
            RequestDescriptor::new(HttpMethod::Delete, path)
                .maybe_body(body)
                .options(options),
        )
        .await
    }

    fn default_headers(&self) -> BTreeMap<String, String> {
        let language = self.session.language();
        BTreeMap::from([
            (String::from(ACCEPT), String::from(JSON_MEDIA_TYPE)),
            (String::from(CONTENT_TYPE), String::from(JSON_MEDIA_TYPE)),
            (
                String::from(ACCEPT_LANGUAGE),
                String::from(i18n::accept_language(language.as_deref())),
            ),
        ])
    }

    fn build_http_request(
        &self,
        url: String,
        method: HttpMethod,
        body: Option<RequestBody>,
        overrides: &BTreeMap<String, String>,
        skip_auth: bool,
    ) -> HttpRequest {
        let mut request = HttpRequest::new(method, url).with_headers(&self.default_headers());
        if !skip_auth {
            request = request.with_auth(&HttpAuth::from_token(self.session.token()));
        }
        request = request.with_headers(overrides);

        if method == HttpMethod::Get {
            return request;
        }

        match body {
            Some(RequestBody::Json(Value::Null)) | None => request,
            Some(RequestBody::Json(value)) => request.with_body(HttpBody::Text(value.to_string())),
            // the transport sets the multipart boundary itself
            Some(RequestBody::Multipart(fields)) => request
                .with_body(HttpBody::Multipart(fields))
                .without_header(CONTENT_TYPE),
        }
    }

    async fn perform<T>(
        &self,
        url: String,
        method: HttpMethod,
        body: Option<RequestBody>,
        headers: BTreeMap<String, String>,
        skip_auth: bool,
    ) -> Result<ApiResponse<T>, Failure>
    where
        T: DeserializeOwned,
    {
        let request = self.build_http_request(url, method, body, &headers, skip_auth);
        let url = request.url.clone();
        debug!(%url, "sending request");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|error| Failure::Transport(error.message().to_owned()))?;

        let payload = parse_payload(&response)?;

        if !response.is_success() {
            let error = self.classify_http_failure(&response, payload, &url);
            warn!(status = error.status(), %url, "request rejected by server");
            return Err(Failure::Api(error));
        }

        let fields = payload
            .as_ref()
            .map(EnvelopeFields::from_payload)
            .unwrap_or_default();
        let data = payload.map_or(Value::Null, |payload| {
            ResponseShape::classify(payload).into_data()
        });
        let data = serde_json::from_value::<T>(data)
            .map_err(|error| Failure::Transport(format!("unexpected response shape: {error}")))?;

        debug!(status = response.status, "request succeeded");
        Ok(ApiResponse {
            data,
            message: fields.message,
            status: fields.status.unwrap_or(response.status),
            success: fields.success.unwrap_or(true),
        })
    }

    fn classify_http_failure(
        &self,
        response: &HttpResponse,
        payload: Option<Value>,
        url: &str,
    ) -> ApiError {
        let message_key = if response.status == 401 {
            i18n::ERROR_UNAUTHORIZED
        } else {
            i18n::ERROR_DESCRIPTION
        };
        let message = payload
            .as_ref()
            .and_then(server_message)
            .unwrap_or_else(|| self.notifier.translate(message_key));

        let error = ApiError::new(message, response.status, url);
        match payload {
            Some(payload) => error.with_details(payload),
            None => error,
        }
    }
}

fn parse_payload(response: &HttpResponse) -> Result<Option<Value>, Failure> {
    if !response.is_json() || response.body.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(&response.body)
        .map(Some)
        .map_err(|error| Failure::Transport(format!("invalid JSON response: {error}")))
}

fn server_message(payload: &Value) -> Option<String> {
    ["errorMessage", "message"].iter().find_map(|field| {
        payload
            .get(*field)
            .and_then(Value::as_str)
            .filter(|text| !text.trim().is_empty())
            .map(str::to_owned)
    })
}

fn deadline(timeout: Option<Duration>) -> impl Future<Output = ()> {
    async move {
        match timeout {
            Some(timeout) => tokio::time::sleep(timeout).await,
            None => future::pending::<()>().await,
        }
    }
}

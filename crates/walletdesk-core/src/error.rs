use serde_json::Value;
use thiserror::Error;

/// Name tag carried by every classified API failure.
pub const API_ERROR_NAME: &str = "ApiError";

/// Classified API failure: a non-2xx answer from the server, or a transport
/// failure escalated with `status == 0`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ApiError {
    message: String,
    status: u16,
    path: String,
    details: Option<Value>,
}

impl ApiError {
    pub fn new(message: impl Into<String>, status: u16, path: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status,
            path: path.into(),
            details: None,
        }
    }

    /// Transport-level failure (network, body decoding, unexpected error).
    pub fn transport(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(message, 0, path)
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub const fn name(&self) -> &'static str {
        API_ERROR_NAME
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn status(&self) -> u16 {
        self.status
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    pub const fn is_transport(&self) -> bool {
        self.status == 0
    }

    pub const fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Error surfaced by the request engine and the query/mutation hooks.
///
/// Timeout expiry and caller cancellation share the `Cancelled` variant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    #[error("request did not complete: aborted")]
    Cancelled,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ClientError {
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(error) => Some(error),
            Self::Cancelled => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.as_api_error().map(ApiError::status)
    }
}

/// Structural check: true when the error is (or wraps) a classified [`ApiError`].
pub fn is_api_error(error: &(dyn std::error::Error + 'static)) -> bool {
    if error.is::<ApiError>() {
        return true;
    }

    matches!(error.downcast_ref::<ClientError>(), Some(ClientError::Api(_)))
}

/// True when the error denotes cancellation or abort.
pub fn is_cancellation(error: &(dyn std::error::Error + 'static)) -> bool {
    matches!(error.downcast_ref::<ClientError>(), Some(ClientError::Cancelled))
}

/// Validation errors raised while building requests and domain values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid date format description '{value}'")]
    InvalidDateFormat { value: String },

    #[error("customer id cannot be empty")]
    MissingCustomerId,

    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("field '{field}' must be a finite number")]
    NonFiniteValue { field: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_is_recognized_directly_and_through_client_error() {
        let api = ApiError::new("boom", 500, "/customers");
        assert!(is_api_error(&api));

        let wrapped = ClientError::from(api);
        assert!(is_api_error(&wrapped));
        assert!(!is_cancellation(&wrapped));
        assert_eq!(wrapped.status(), Some(500));
    }

    #[test]
    fn cancelled_is_not_an_api_error() {
        let error = ClientError::Cancelled;
        assert!(!is_api_error(&error));
        assert!(is_cancellation(&error));
        assert!(error.as_api_error().is_none());
    }

    #[test]
    fn foreign_errors_are_neither() {
        let error = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        assert!(!is_api_error(&error));
        assert!(!is_cancellation(&error));
    }

    #[test]
    fn transport_errors_use_status_zero() {
        let error = ApiError::transport("connection refused", "/wallets/1");
        assert!(error.is_transport());
        assert_eq!(error.name(), "ApiError");
        assert_eq!(error.to_string(), "connection refused");
    }
}

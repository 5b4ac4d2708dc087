use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Uniform result of every resolved call, real or fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status: u16,
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, status: u16, success: bool) -> Self {
        Self {
            data,
            message: None,
            status,
            success,
        }
    }

    /// Successful envelope with status 200.
    pub fn ok(data: T) -> Self {
        Self::new(data, 200, true)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            data: f(self.data),
            message: self.message,
            status: self.status,
            success: self.success,
        }
    }

    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<ApiResponse<U>, E> {
        Ok(ApiResponse {
            data: f(self.data)?,
            message: self.message,
            status: self.status,
            success: self.success,
        })
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

/// Shape of a successful response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    /// Pagination fields at the top level: the whole body is the data.
    Paginated(Value),
    /// A conventional `{ "data": ... }` wrapper.
    Wrapped(Value),
    /// Anything else is used as-is.
    Bare(Value),
}

impl ResponseShape {
    const PAGINATION_FIELDS: [&'static str; 3] = ["page", "pageSize", "total"];

    /// Decides how a parsed body maps onto envelope data.
    pub fn classify(payload: Value) -> Self {
        let Some(object) = payload.as_object() else {
            return Self::Bare(payload);
        };

        let paginated = Self::PAGINATION_FIELDS
            .iter()
            .any(|field| object.get(*field).is_some_and(|value| !value.is_null()));
        if paginated {
            return Self::Paginated(payload);
        }

        match object.get("data") {
            Some(data) if !data.is_null() => Self::Wrapped(data.clone()),
            _ => Self::Bare(payload),
        }
    }

    pub fn into_data(self) -> Value {
        match self {
            Self::Paginated(value) | Self::Wrapped(value) | Self::Bare(value) => value,
        }
    }
}

/// Server-supplied envelope fields that override transport defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct EnvelopeFields {
    pub message: Option<String>,
    pub status: Option<u16>,
    pub success: Option<bool>,
}

impl EnvelopeFields {
    pub(crate) fn from_payload(payload: &Value) -> Self {
        Self {
            message: payload
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned),
            status: payload
                .get("status")
                .and_then(Value::as_u64)
                .and_then(|status| u16::try_from(status).ok()),
            success: payload.get("success").and_then(Value::as_bool),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn paginated_body_is_kept_whole() {
        let body = json!({"data": [1, 2], "page": 1, "pageSize": 2, "total": 10});
        assert_eq!(ResponseShape::classify(body.clone()), ResponseShape::Paginated(body));
    }

    #[test]
    fn data_wrapper_is_unwrapped() {
        let body = json!({"data": {"id": "c-1"}, "message": "ok"});
        assert_eq!(
            ResponseShape::classify(body),
            ResponseShape::Wrapped(json!({"id": "c-1"}))
        );
    }

    #[test]
    fn bare_bodies_pass_through() {
        let array = json!([{"id": 1}]);
        assert_eq!(ResponseShape::classify(array.clone()), ResponseShape::Bare(array));

        let object = json!({"id": "w-1", "balance": 10});
        assert_eq!(ResponseShape::classify(object.clone()), ResponseShape::Bare(object));

        let null_data = json!({"data": null});
        assert_eq!(
            ResponseShape::classify(null_data.clone()),
            ResponseShape::Bare(null_data)
        );
    }

    #[test]
    fn envelope_fields_are_extracted_when_typed_correctly() {
        let fields = EnvelopeFields::from_payload(&json!({
            "message": "created",
            "status": 201,
            "success": "yes"
        }));

        assert_eq!(fields.message.as_deref(), Some("created"));
        assert_eq!(fields.status, Some(201));
        assert_eq!(fields.success, None);
    }

    #[test]
    fn map_preserves_envelope_fields() {
        let response = ApiResponse::ok(2).with_message("fine").map(|n| n * 2);
        assert_eq!(response.data, 4);
        assert_eq!(response.message.as_deref(), Some("fine"));
        assert!(response.success);
    }
}

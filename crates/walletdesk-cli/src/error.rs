use thiserror::Error;
use walletdesk_core::{ApiError, ClientError};

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] walletdesk_core::ValidationError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{} (status {}, {})", .0.message(), .0.status(), .0.path())]
    Api(ApiError),

    #[error("request cancelled")]
    Cancelled,

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ClientError> for CliError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Cancelled => Self::Cancelled,
            ClientError::Api(error) => Self::Api(error),
        }
    }
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::InvalidInput(_) => 2,
            Self::Api(_) => 3,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
            Self::Cancelled => 130,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_exit_codes() {
        assert_eq!(CliError::from(ClientError::Cancelled).exit_code(), 130);

        let api = CliError::from(ClientError::Api(ApiError::new("Not found", 404, "/customers/x")));
        assert_eq!(api.exit_code(), 3);
        assert_eq!(api.to_string(), "Not found (status 404, /customers/x)");
    }
}

use serde::{Deserialize, Serialize};

use super::models::{Address, KycStatus};
use crate::error::ValidationError;

/// Body of `POST /customers`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerPayload {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub national_id: u64,
    pub address: Address,
    pub daily_limit: f64,
    pub available_limit: f64,
    pub currency: String,
}

/// Body of `PUT /customers/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerPayload {
    #[serde(flatten)]
    pub customer: CreateCustomerPayload,
    pub kyc_status: KycStatus,
    pub is_active: bool,
}

/// New limits for a customer's wallet; sent as `PATCH /wallets/{customerId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWalletLimitPayload {
    pub customer_id: String,
    pub available_limit: f64,
    pub daily_limit: f64,
}

impl UpdateWalletLimitPayload {
    pub fn new(
        customer_id: impl Into<String>,
        available_limit: f64,
        daily_limit: f64,
    ) -> Result<Self, ValidationError> {
        let customer_id = customer_id.into();
        if customer_id.trim().is_empty() {
            return Err(ValidationError::MissingCustomerId);
        }
        validate_limit("availableLimit", available_limit)?;
        validate_limit("dailyLimit", daily_limit)?;

        Ok(Self {
            customer_id,
            available_limit,
            daily_limit,
        })
    }

    /// Wire body; the customer id travels in the path.
    pub(crate) fn body(&self) -> serde_json::Value {
        serde_json::json!({
            "availableLimit": self.available_limit,
            "dailyLimit": self.daily_limit,
        })
    }
}

fn validate_limit(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

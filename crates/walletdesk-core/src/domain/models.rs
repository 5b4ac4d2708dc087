use serde::{Deserialize, Serialize};

/// Operational state of a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletStatus {
    Active,
    Restricted,
    Suspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Know-your-customer verification state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KycStatus {
    Unverified,
    Verified,
    Contracted,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Reversed,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionSide {
    Credit,
    Debit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Debit,
    Credit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransferDirection {
    Incoming,
    Outgoing,
}

/// Postal address of a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub country: String,
    pub city: String,
    pub postal_code: String,
    pub line1: String,
}

/// Customer wallet with balance and spending limits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Wallet {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    pub balance: f64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<WalletStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_received: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_spent: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kyc_status: Option<KycStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet: Option<Wallet>,
}

impl Customer {
    /// Text matched by free-text search: name, email and wallet id.
    pub fn search_haystack(&self) -> String {
        let wallet_id = self.wallet.as_ref().map_or("", |wallet| wallet.id.as_str());
        format!("{}{}{}", self.name, self.email, wallet_id).to_lowercase()
    }
}

/// Wallet movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub customer_id: String,
    pub amount: f64,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<TransactionSide>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_name: Option<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn customer_tolerates_partial_payloads() {
        let customer: Customer = serde_json::from_value(json!({
            "id": "c-1",
            "name": "Ada",
            "kycStatus": "SOMETHING_NEW",
            "wallet": { "id": "w-1", "balance": 12.5, "currency": "TRY", "status": "restricted" }
        }))
        .expect("valid customer");

        assert_eq!(customer.email, "");
        assert_eq!(customer.kyc_status, Some(KycStatus::Unknown));
        let wallet = customer.wallet.expect("wallet");
        assert_eq!(wallet.status, Some(WalletStatus::Restricted));
        assert_eq!(wallet.available_limit, None);
    }

    #[test]
    fn transaction_uses_wire_names() {
        let transaction: Transaction = serde_json::from_value(json!({
            "id": "t-1",
            "customerId": "c-1",
            "amount": 10,
            "currency": "USD",
            "type": "DEBIT",
            "transferDirection": "OUTGOING",
            "status": "completed",
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .expect("valid transaction");

        assert_eq!(transaction.kind.as_deref(), Some("DEBIT"));
        assert_eq!(transaction.status, Some(TransactionStatus::Completed));
        let value = serde_json::to_value(&transaction).expect("serializable");
        assert_eq!(value["type"], "DEBIT");
        assert!(value.get("side").is_none());
    }

    #[test]
    fn search_haystack_is_lowercase_and_includes_wallet() {
        let customer = Customer {
            name: String::from("Ada Lovelace"),
            email: String::from("ADA@example.com"),
            wallet: Some(Wallet {
                id: String::from("W-77"),
                ..Wallet::default()
            }),
            ..Customer::default()
        };

        assert_eq!(customer.search_haystack(), "ada lovelaceada@example.comw-77");
    }
}

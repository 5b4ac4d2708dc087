use serde::{Deserialize, Serialize};
use time::Date;

use super::models::{Customer, KycStatus, TransactionType, TransferDirection, WalletStatus};
use crate::pagination::PageDefaults;
use crate::query::QueryParams;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;

const fn default_page() -> u64 {
    DEFAULT_PAGE
}

const fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

/// Customer list filter state. `None` selectors mean "all".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerFilters {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub status: Option<WalletStatus>,
    #[serde(default)]
    pub kyc_status: Option<KycStatus>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl Default for CustomerFilters {
    fn default() -> Self {
        Self {
            search: String::new(),
            status: None,
            kyc_status: None,
            is_active: None,
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl CustomerFilters {
    pub fn page(mut self, page: u64) -> Self {
        self.page = page;
        self
    }

    pub fn page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub const fn page_defaults(&self) -> PageDefaults {
        PageDefaults::new(self.page, self.page_size)
    }

    /// Query parameters sent to the backend; unset selectors and blank
    /// search text are omitted.
    pub fn query_params(&self) -> QueryParams {
        let mut params = QueryParams::new()
            .with("page", self.page)
            .with("pageSize", self.page_size);

        if !self.search.trim().is_empty() {
            params.insert("search", self.search.as_str());
        }
        if let Some(status) = self.status {
            params.insert("status", wire_name(&status));
        }
        if let Some(kyc_status) = self.kyc_status {
            params.insert("kycStatus", wire_name(&kyc_status));
        }
        if let Some(is_active) = self.is_active {
            params.insert("isActive", is_active);
        }
        params
    }

    /// Client-side evaluation of the same filters.
    pub fn matches(&self, customer: &Customer) -> bool {
        let search = self.search.trim().to_lowercase();
        let matches_search = search.is_empty() || customer.search_haystack().contains(&search);
        let matches_kyc = self
            .kyc_status
            .map_or(true, |status| customer.kyc_status == Some(status));
        let matches_active = self
            .is_active
            .map_or(true, |active| customer.is_active == Some(active));
        let matches_status = self.status.map_or(true, |status| {
            customer.wallet.as_ref().and_then(|wallet| wallet.status) == Some(status)
        });

        matches_search && matches_kyc && matches_active && matches_status
    }
}

/// Transaction list filter state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilters {
    #[serde(default)]
    pub transfer_direction: Option<TransferDirection>,
    #[serde(rename = "type", default)]
    pub transaction_type: Option<TransactionType>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, with = "iso_date::option")]
    pub from: Option<Date>,
    #[serde(default, with = "iso_date::option")]
    pub to: Option<Date>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl Default for TransactionFilters {
    fn default() -> Self {
        Self {
            transfer_direction: None,
            transaction_type: None,
            currency: None,
            from: None,
            to: None,
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TransactionFilters {
    pub const fn page_defaults(&self) -> PageDefaults {
        PageDefaults::new(self.page, self.page_size)
    }

    pub fn query_params(&self) -> QueryParams {
        let mut params = QueryParams::new()
            .with("page", self.page)
            .with("pageSize", self.page_size);

        if let Some(direction) = self.transfer_direction {
            params.insert("transferDirection", wire_name(&direction));
        }
        if let Some(kind) = self.transaction_type {
            params.insert("type", wire_name(&kind));
        }
        if let Some(currency) = self.currency.as_deref().filter(|value| !value.trim().is_empty()) {
            params.insert("currency", currency);
        }
        if let Some(from) = self.from {
            params.insert("from", from);
        }
        if let Some(to) = self.to {
            params.insert("to", to);
        }
        params
    }
}

/// Serialized spelling of a unit enum variant.
fn wire_name<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(name)) => name,
        _ => String::new(),
    }
}

//! Dashboard resources: the backend service plus the query and mutation
//! specs the UI layer subscribes to.
//!
//! | Resource | Query key | Fallback |
//! |----------|-----------|----------|
//! | customer list | `["customers", filters]` | dataset filtered and paged locally |
//! | customer | `["customer", id]` | dataset entry or an empty customer |
//! | transactions | `["transactions", id, filters]` | the customer's transactions as one page |
//! | wallet | `["wallet", id]` | zero-balance USD wallet |

mod mutations;
mod queries;
mod service;

pub use mutations::{
    create_customer_mutation, delete_customer_mutation, update_customer_mutation,
    update_limits_mutation, CustomerUpdate,
};
pub use queries::{
    customer_key, customer_query, customers_key, customers_query, transactions_key,
    transactions_query, wallet_key, wallet_query,
};
pub use service::DashboardApi;

pub const CUSTOMERS_ERROR: &str = "dashboard.errors.customers";
pub const TRANSACTIONS_ERROR: &str = "dashboard.errors.transactions";
pub const CREATE_CUSTOMER_ERROR: &str = "dashboard.errors.createCustomer";
pub const UPDATE_LIMIT_ERROR: &str = "dashboard.errors.updateLimit";

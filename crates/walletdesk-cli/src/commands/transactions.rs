use serde_json::Value;
use walletdesk_core::resources::transactions_query;
use walletdesk_core::{TransactionFilters, ValidationError};

use crate::cli::TransactionListArgs;
use crate::error::CliError;

use super::{to_value, Runtime};

pub fn filters(args: &TransactionListArgs) -> TransactionFilters {
    TransactionFilters {
        transfer_direction: args.direction.selection(),
        transaction_type: args.transaction_type.selection(),
        currency: args.currency.clone(),
        from: args.from,
        to: args.to,
        page: args.page.page,
        page_size: args.page.page_size,
    }
}

pub async fn list(runtime: &Runtime, args: &TransactionListArgs) -> Result<Value, CliError> {
    let spec = transactions_query(&runtime.api, Some(args.customer_id.clone()), filters(args));
    let page = runtime
        .queries
        .query(&spec)
        .await?
        .ok_or(ValidationError::MissingCustomerId)?;
    to_value(page.as_ref())
}

use serde_json::Value;
use walletdesk_core::resources::wallet_query;
use walletdesk_core::ValidationError;

use crate::cli::CustomerIdArgs;
use crate::error::CliError;

use super::{to_value, Runtime};

pub async fn show(runtime: &Runtime, args: &CustomerIdArgs) -> Result<Value, CliError> {
    let spec = wallet_query(&runtime.api, Some(args.customer_id.clone()));
    let wallet = runtime
        .queries
        .query(&spec)
        .await?
        .ok_or(ValidationError::MissingCustomerId)?;
    to_value(wallet.as_ref())
}

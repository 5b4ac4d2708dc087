use serde_json::Value;
use walletdesk_core::resources::update_limits_mutation;
use walletdesk_core::UpdateWalletLimitPayload;

use crate::cli::LimitsArgs;
use crate::error::CliError;

use super::{to_value, Runtime};

pub async fn update(runtime: &Runtime, args: &LimitsArgs) -> Result<Value, CliError> {
    let payload =
        UpdateWalletLimitPayload::new(&args.customer_id, args.available_limit, args.daily_limit)?;
    let mutation = runtime.queries.mutation(update_limits_mutation(&runtime.api));
    let response = mutation.mutate(payload).await?;
    to_value(&response.data)
}

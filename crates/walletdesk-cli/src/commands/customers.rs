use serde_json::Value;
use walletdesk_core::resources::{
    create_customer_mutation, customer_query, customers_query, delete_customer_mutation,
    update_customer_mutation,
};
use walletdesk_core::{
    CreateCustomerPayload, CustomerFilters, CustomerUpdate, UpdateCustomerPayload, ValidationError,
};

use crate::cli::{CustomerIdArgs, CustomerListArgs, CustomerUpdateArgs, PayloadArgs};
use crate::error::CliError;

use super::{read_payload, to_value, Runtime};

pub fn filters(args: &CustomerListArgs) -> CustomerFilters {
    CustomerFilters {
        search: args.search.clone(),
        status: args.status.selection(),
        kyc_status: args.kyc_status.selection(),
        is_active: args.active.selection(),
        page: args.page.page,
        page_size: args.page.page_size,
    }
}

pub async fn list(runtime: &Runtime, args: &CustomerListArgs) -> Result<Value, CliError> {
    let spec = customers_query(&runtime.api, filters(args));
    let page = runtime.queries.query(&spec).await?;
    to_value(&page.as_deref())
}

pub async fn show(runtime: &Runtime, args: &CustomerIdArgs) -> Result<Value, CliError> {
    let spec = customer_query(&runtime.api, Some(args.customer_id.clone()));
    let customer = runtime
        .queries
        .query(&spec)
        .await?
        .ok_or(ValidationError::MissingCustomerId)?;
    to_value(customer.as_ref())
}

pub async fn create(runtime: &Runtime, args: &PayloadArgs) -> Result<Value, CliError> {
    let payload: CreateCustomerPayload = read_payload(args)?;
    let mutation = runtime.queries.mutation(create_customer_mutation(&runtime.api));
    let response = mutation.mutate(payload).await?;
    to_value(&response.data)
}

pub async fn update(runtime: &Runtime, args: &CustomerUpdateArgs) -> Result<Value, CliError> {
    if args.customer_id.trim().is_empty() {
        return Err(ValidationError::MissingCustomerId.into());
    }
    let payload: UpdateCustomerPayload = read_payload(&args.payload)?;
    let mutation = runtime.queries.mutation(update_customer_mutation(&runtime.api));
    let response = mutation
        .mutate(CustomerUpdate {
            id: args.customer_id.clone(),
            payload,
        })
        .await?;
    to_value(&response.data)
}

pub async fn delete(runtime: &Runtime, args: &CustomerIdArgs) -> Result<Value, CliError> {
    if args.customer_id.trim().is_empty() {
        return Err(ValidationError::MissingCustomerId.into());
    }
    let mutation = runtime.queries.mutation(delete_customer_mutation(&runtime.api));
    let response = mutation.mutate(args.customer_id.clone()).await?;
    Ok(response.data)
}

use serde_json::Value;

use crate::cache::QueryKey;
use crate::domain::{
    CreateCustomerPayload, Customer, UpdateCustomerPayload, UpdateWalletLimitPayload,
};
use crate::hooks::MutationSpec;

use super::{DashboardApi, CREATE_CUSTOMER_ERROR, UPDATE_LIMIT_ERROR};

/// Variables of [`update_customer_mutation`].
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerUpdate {
    pub id: String,
    pub payload: UpdateCustomerPayload,
}

fn customer_prefixes<T, V>(spec: MutationSpec<T, V>) -> MutationSpec<T, V> {
    spec.invalidates(QueryKey::new("customers"))
        .invalidates(QueryKey::new("customer"))
}

pub fn create_customer_mutation(
    api: &DashboardApi,
) -> MutationSpec<Customer, CreateCustomerPayload> {
    let api = api.clone();
    let spec = MutationSpec::new(move |payload: CreateCustomerPayload| {
        let api = api.clone();
        async move { api.create_customer(&payload).await }
    })
    .error_message_key(CREATE_CUSTOMER_ERROR);

    customer_prefixes(spec)
}

pub fn update_customer_mutation(api: &DashboardApi) -> MutationSpec<Customer, CustomerUpdate> {
    let api = api.clone();
    let spec = MutationSpec::new(move |update: CustomerUpdate| {
        let api = api.clone();
        async move { api.update_customer(&update.id, &update.payload).await }
    })
    .error_message_key(CREATE_CUSTOMER_ERROR);

    customer_prefixes(spec)
}

pub fn update_limits_mutation(
    api: &DashboardApi,
) -> MutationSpec<Customer, UpdateWalletLimitPayload> {
    let api = api.clone();
    let spec = MutationSpec::new(move |payload: UpdateWalletLimitPayload| {
        let api = api.clone();
        async move { api.update_wallet_limits(&payload).await }
    })
    .error_message_key(UPDATE_LIMIT_ERROR);

    customer_prefixes(spec).invalidates(QueryKey::new("wallet"))
}

pub fn delete_customer_mutation(api: &DashboardApi) -> MutationSpec<Value, String> {
    let api = api.clone();
    let spec = MutationSpec::new(move |customer_id: String| {
        let api = api.clone();
        async move { api.delete_customer(&customer_id).await }
    })
    .error_message_key(CREATE_CUSTOMER_ERROR);

    customer_prefixes(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::engine::ApiClient;

    #[test]
    fn mutations_declare_invalidated_prefixes() {
        let client = ApiClient::builder(ClientConfig::new("http://127.0.0.1:9")).build();
        let api = DashboardApi::new(client);

        let create = create_customer_mutation(&api);
        assert_eq!(
            create.invalidated_keys(),
            &[QueryKey::new("customers"), QueryKey::new("customer")]
        );
        assert_eq!(create.error_key(), CREATE_CUSTOMER_ERROR);

        let limits = update_limits_mutation(&api);
        assert_eq!(limits.invalidated_keys().len(), 3);
        assert_eq!(limits.error_key(), UPDATE_LIMIT_ERROR);

        assert_eq!(delete_customer_mutation(&api).invalidated_keys().len(), 2);
        assert_eq!(update_customer_mutation(&api).invalidated_keys().len(), 2);
    }
}

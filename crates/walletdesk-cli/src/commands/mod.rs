mod customers;
mod limits;
mod transactions;
mod wallet;

use std::fs;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use walletdesk_core::{
    ApiClient, ClientConfig, DashboardApi, JsonFileSessionStore, MemorySessionStore, Notifier,
    QueryClient, QueryContext, SessionStore, TracingSink,
};

use crate::cli::{
    Cli, Command, CustomersCommand, LimitsCommand, PayloadArgs, TransactionsCommand, WalletCommand,
};
use crate::error::CliError;
use crate::output::StderrSink;

/// Services shared by every command.
pub struct Runtime {
    pub api: DashboardApi,
    pub queries: QueryContext,
}

pub async fn run(cli: &Cli) -> Result<Value, CliError> {
    let runtime = build_runtime(cli);

    match &cli.command {
        Command::Customers(command) => match command {
            CustomersCommand::List(args) => customers::list(&runtime, args).await,
            CustomersCommand::Show(args) => customers::show(&runtime, args).await,
            CustomersCommand::Create(args) => customers::create(&runtime, args).await,
            CustomersCommand::Update(args) => customers::update(&runtime, args).await,
            CustomersCommand::Delete(args) => customers::delete(&runtime, args).await,
        },
        Command::Transactions(TransactionsCommand::List(args)) => {
            transactions::list(&runtime, args).await
        }
        Command::Wallet(WalletCommand::Show(args)) => wallet::show(&runtime, args).await,
        Command::Limits(LimitsCommand::Update(args)) => limits::update(&runtime, args).await,
    }
}

fn build_runtime(cli: &Cli) -> Runtime {
    let session = session_store(cli);

    let mut config = ClientConfig::from_env();
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout_ms);
    }
    debug!(base_url = config.base_url(), timeout = ?config.timeout(), "client configured");

    let notifier = Notifier::new(Arc::new(StderrSink), Arc::new(TracingSink));
    let client = ApiClient::builder(config)
        .session(session)
        .notifier(notifier)
        .build();

    let queries = QueryContext::new(QueryClient::default(), client.notifier().clone());
    Runtime {
        api: DashboardApi::new(client),
        queries,
    }
}

fn session_store(cli: &Cli) -> Arc<dyn SessionStore> {
    let base: Option<Arc<dyn SessionStore>> = cli
        .session_file
        .as_ref()
        .map(|path| Arc::new(JsonFileSessionStore::new(path)) as Arc<dyn SessionStore>);

    match base {
        Some(base) if cli.lang.is_none() && cli.token.is_none() => base,
        Some(base) => Arc::new(FlagSession {
            base,
            language: cli.lang.clone(),
            token: cli.token.clone(),
        }),
        None => Arc::new(MemorySessionStore::new(cli.lang.clone(), cli.token.clone())),
    }
}

/// Session file with command-line overrides on top.
struct FlagSession {
    base: Arc<dyn SessionStore>,
    language: Option<String>,
    token: Option<String>,
}

impl SessionStore for FlagSession {
    fn language(&self) -> Option<String> {
        self.language.clone().or_else(|| self.base.language())
    }

    fn token(&self) -> Option<String> {
        self.token.clone().or_else(|| self.base.token())
    }
}

fn read_payload<T: DeserializeOwned>(args: &PayloadArgs) -> Result<T, CliError> {
    let raw = match (&args.payload, &args.payload_file) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => fs::read_to_string(path)?,
        (None, None) => {
            return Err(CliError::InvalidInput(String::from(
                "one of --payload or --payload-file is required",
            )))
        }
    };

    serde_json::from_str(&raw)
        .map_err(|error| CliError::InvalidInput(format!("payload is not valid: {error}")))
}

fn to_value<T: Serialize + ?Sized>(data: &T) -> Result<Value, CliError> {
    Ok(serde_json::to_value(data)?)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use walletdesk_core::CreateCustomerPayload;

    #[test]
    fn flags_override_session_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"language":"tr","token":"from-file"}}"#).expect("write session");

        let session = FlagSession {
            base: Arc::new(JsonFileSessionStore::new(file.path())),
            language: None,
            token: Some(String::from("from-flag")),
        };

        assert_eq!(session.language().as_deref(), Some("tr"));
        assert_eq!(session.token().as_deref(), Some("from-flag"));
    }

    #[test]
    fn payload_is_required() {
        let args = PayloadArgs {
            payload: None,
            payload_file: None,
        };
        let error = read_payload::<CreateCustomerPayload>(&args).expect_err("missing payload");
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn malformed_payload_is_invalid_input() {
        let args = PayloadArgs {
            payload: Some(String::from("{not json")),
            payload_file: None,
        };
        let error = read_payload::<CreateCustomerPayload>(&args).expect_err("bad payload");
        assert!(matches!(error, CliError::InvalidInput(_)));
    }
}

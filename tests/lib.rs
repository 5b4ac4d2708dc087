// Shared fixtures for the walletdesk behavior tests
pub use std::sync::Arc;

use walletdesk_core::{Notifier, RecordingSink};

/// A notifier whose modal and toast channels record into separate sinks.
pub fn recording_notifier() -> (Notifier, Arc<RecordingSink>, Arc<RecordingSink>) {
    let modal = Arc::new(RecordingSink::new());
    let toast = Arc::new(RecordingSink::new());
    let notifier = Notifier::new(modal.clone(), toast.clone());
    (notifier, modal, toast)
}

/// Base URL of a stub server that has already shut down.
pub async fn unreachable_base_url() -> String {
    // wiremock pools servers, so a dropped MockServer keeps listening;
    // bind and release an ephemeral port instead.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

//! User-visible notifications for failed and degraded requests.
//!
//! Terminal errors are dispatched to two independent channels, a modal alert
//! and a transient toast; both receive every error. Fallback resolutions only
//! raise a warning toast.

use std::sync::{Arc, Mutex};

use tracing::{error, warn};

use crate::error::{is_cancellation, ApiError, ClientError};
use crate::i18n::{self, Language, MessageCatalog, Translator};
use crate::session::{MemorySessionStore, SessionStore};

/// Display channel of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Modal,
    Toast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub channel: Channel,
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

/// Destination for notifications (a dialog, a toast area, a log, ...).
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Sink that forwards notifications to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: &Notification) {
        match notification.severity {
            Severity::Error => error!(
                channel = ?notification.channel,
                title = %notification.title,
                "{}",
                notification.message
            ),
            Severity::Warning | Severity::Info => warn!(
                channel = ?notification.channel,
                title = %notification.title,
                "{}",
                notification.message
            ),
        }
    }
}

/// Sink that records every notification, used by tests and previews.
#[derive(Debug, Default)]
pub struct RecordingSink {
    received: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.received
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn count(&self) -> usize {
        self.received
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: &Notification) {
        self.received
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification.clone());
    }
}

/// Resolves localized messages and dispatches them to the modal and toast sinks.
#[derive(Clone)]
pub struct Notifier {
    modal: Arc<dyn NotificationSink>,
    toast: Arc<dyn NotificationSink>,
    translator: Arc<dyn Translator>,
    session: Arc<dyn SessionStore>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink), Arc::new(TracingSink))
    }
}

impl Notifier {
    pub fn new(modal: Arc<dyn NotificationSink>, toast: Arc<dyn NotificationSink>) -> Self {
        Self {
            modal,
            toast,
            translator: Arc::new(MessageCatalog::default()),
            session: Arc::new(MemorySessionStore::default()),
        }
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    pub fn with_session(mut self, session: Arc<dyn SessionStore>) -> Self {
        self.session = session;
        self
    }

    pub fn language(&self) -> Language {
        self.session.resolved_language()
    }

    pub fn translate(&self, key: &str) -> String {
        self.translator.translate(key, self.language())
    }

    /// Message shown for `error`: an API error's message verbatim, otherwise
    /// the error's own text, otherwise the localized `fallback_key`.
    pub fn extract_error_message(
        &self,
        error: &(dyn std::error::Error + 'static),
        fallback_key: &str,
    ) -> String {
        if let Some(api) = as_api_error(error) {
            return api.message().to_owned();
        }

        let text = error.to_string();
        if text.trim().is_empty() {
            self.translate(fallback_key)
        } else {
            text
        }
    }

    /// Sends `error` to both the modal and the toast channel.
    pub fn notify_error(
        &self,
        error: &(dyn std::error::Error + 'static),
        title_key: &str,
        fallback_key: &str,
    ) {
        let message = self.extract_error_message(error, fallback_key);
        let title = self.translate(title_key);

        self.modal.notify(&Notification {
            channel: Channel::Modal,
            severity: Severity::Warning,
            title: title.clone(),
            message: message.clone(),
        });
        self.toast.notify(&Notification {
            channel: Channel::Toast,
            severity: Severity::Warning,
            title,
            message,
        });
    }

    /// Notifies a terminal hook failure; cancellations stay silent.
    pub fn notify_failure(&self, error: &ClientError, message_key: &str) {
        if is_cancellation(error) {
            return;
        }
        self.notify_error(error, i18n::ERROR_TITLE, message_key);
    }

    /// Warning toast announcing that fallback data is being shown.
    pub fn notify_fallback(&self, message_key: &str) {
        self.toast.notify(&Notification {
            channel: Channel::Toast,
            severity: Severity::Warning,
            title: self.translate(i18n::ERROR_TITLE),
            message: self.translate(message_key),
        });
    }
}

fn as_api_error<'a>(error: &'a (dyn std::error::Error + 'static)) -> Option<&'a ApiError> {
    error.downcast_ref::<ApiError>().or_else(|| {
        error
            .downcast_ref::<ClientError>()
            .and_then(ClientError::as_api_error)
    })
}

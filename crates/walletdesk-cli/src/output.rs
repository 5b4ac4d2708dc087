use std::io::{self, Write};

use serde_json::Value;
use walletdesk_core::{Notification, NotificationSink};

use crate::error::CliError;

pub fn render(data: &Value, pretty: bool) -> Result<(), CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(data)?
    } else {
        serde_json::to_string(data)?
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{payload}")?;
    Ok(())
}

/// Writes notifications to stderr, one line each.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl StderrSink {
    fn line(notification: &Notification) -> String {
        format!("{}: {}", notification.title, notification.message)
    }
}

impl NotificationSink for StderrSink {
    fn notify(&self, notification: &Notification) {
        let _ = writeln!(io::stderr().lock(), "{}", Self::line(notification));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use walletdesk_core::{Channel, Severity};

    #[test]
    fn notification_line_joins_title_and_message() {
        let notification = Notification {
            channel: Channel::Modal,
            severity: Severity::Warning,
            title: String::from("Something went wrong"),
            message: String::from("Customer not found"),
        };
        assert_eq!(StderrSink::line(&notification), "Something went wrong: Customer not found");
    }
}

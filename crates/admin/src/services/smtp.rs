//! SMTP connection test.
//!
//! Opens a real connection to an operator-supplied SMTP server, performs
//! the TLS handshake and authentication lettre does on connect, then closes
//! it. Nothing is sent. Port 465 uses implicit TLS; every other port uses
//! STARTTLS.

use std::fmt;
use std::time::Duration;

use lettre::{
    AsyncSmtpTransport, Tokio1Executor,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, instrument, warn};

/// Port that speaks TLS from the first byte.
pub const IMPLICIT_TLS_PORT: u16 = 465;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection parameters, as posted by the settings page.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmtpTestRequest {
    #[serde(default)]
    pub smtp_server: String,
    #[serde(deserialize_with = "port_number_or_text")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_user: String,
    #[serde(default)]
    pub smtp_password: String,
}

impl fmt::Debug for SmtpTestRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpTestRequest")
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_user", &self.smtp_user)
            .field("smtp_password", &"[REDACTED]")
            .finish()
    }
}

/// Browsers post the port from a text input, scripts as a number.
fn port_number_or_text<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Outcome of a connection test, returned to the caller as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmtpTestResult {
    pub success: bool,
    pub message: String,
}

impl SmtpTestResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

fn build_transport(request: &SmtpTestRequest) -> Result<AsyncSmtpTransport<Tokio1Executor>, SmtpError> {
    let host = request.smtp_server.trim();
    let builder = if request.smtp_port == IMPLICIT_TLS_PORT {
        AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
    };

    let mut builder = builder
        .port(request.smtp_port)
        .timeout(Some(CONNECT_TIMEOUT));
    if !request.smtp_user.is_empty() {
        builder = builder.credentials(Credentials::new(
            request.smtp_user.clone(),
            request.smtp_password.clone(),
        ));
    }
    Ok(builder.build())
}

/// Connect to the server described by `request` and report whether it
/// accepted the connection. Never fails: every problem becomes an
/// unsuccessful result carrying the error text.
#[instrument]
pub async fn test_connection(request: &SmtpTestRequest) -> SmtpTestResult {
    if request.smtp_server.trim().is_empty() {
        return SmtpTestResult::failed("smtpServer is required");
    }
    if request.smtp_port == 0 {
        return SmtpTestResult::failed("smtpPort must be between 1 and 65535");
    }

    let transport = match build_transport(request) {
        Ok(transport) => transport,
        Err(e) => {
            warn!(error = %e, "Could not configure SMTP transport");
            return SmtpTestResult::failed(e.to_string());
        }
    };

    match transport.test_connection().await {
        Ok(true) => {
            info!(server = %request.smtp_server, port = request.smtp_port, "SMTP test succeeded");
            SmtpTestResult::ok(format!(
                "Connected to {}:{}",
                request.smtp_server.trim(),
                request.smtp_port
            ))
        }
        Ok(false) => SmtpTestResult::failed("Server did not accept the connection"),
        Err(e) => {
            warn!(server = %request.smtp_server, error = %e, "SMTP test failed");
            SmtpTestResult::failed(e.to_string())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(server: &str, port: u16) -> SmtpTestRequest {
        SmtpTestRequest {
            smtp_server: server.to_string(),
            smtp_port: port,
            smtp_user: "noreply@angohost.ao".to_string(),
            smtp_password: "hunter2-super".to_string(),
        }
    }

    #[test]
    fn test_request_accepts_numeric_and_text_port() {
        let numeric: SmtpTestRequest = serde_json::from_str(
            r#"{"smtpServer":"mail.angohost.ao","smtpPort":587,"smtpUser":"u","smtpPassword":"p"}"#,
        )
        .unwrap();
        assert_eq!(numeric.smtp_port, 587);

        let text: SmtpTestRequest = serde_json::from_str(
            r#"{"smtpServer":"mail.angohost.ao","smtpPort":"465","smtpUser":"u","smtpPassword":"p"}"#,
        )
        .unwrap();
        assert_eq!(text.smtp_port, 465);
    }

    #[test]
    fn test_request_debug_redacts_password() {
        let debug = format!("{:?}", request("mail.angohost.ao", 587));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_missing_server_fails_without_connecting() {
        let result = test_connection(&request("  ", 587)).await;
        assert!(!result.success);
        assert_eq!(result.message, "smtpServer is required");
    }

    #[tokio::test]
    async fn test_unreachable_server_reports_failure() {
        // nothing listens on port 1
        let result = test_connection(&request("127.0.0.1", 1)).await;
        assert!(!result.success);
        assert!(!result.message.is_empty());
    }
}

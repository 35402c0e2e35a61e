//! SMTP connection test.

use angohost_admin::services::{SmtpTestRequest, test_connection};

use super::CommandError;

/// Connect to `server`, authenticate when a user is given, and disconnect.
///
/// # Errors
///
/// Returns [`CommandError::Smtp`] with the server's answer on failure.
pub async fn test(request: SmtpTestRequest) -> Result<String, CommandError> {
    tracing::info!(
        "Testing SMTP connection to {}:{}",
        request.smtp_server,
        request.smtp_port
    );
    let result = test_connection(&request).await;
    if result.success {
        tracing::info!("{}", result.message);
        Ok(result.message)
    } else {
        Err(CommandError::Smtp(result.message))
    }
}

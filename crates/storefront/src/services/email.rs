//! Order confirmation email.
//!
//! Sent over SMTP via lettre with Askama HTML and plain-text bodies. Sending
//! is best-effort: checkout never fails because a confirmation bounced.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use angohost_core::models::{Order, OrderItem};

use crate::config::SmtpConfig;
use crate::filters;

#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationHtml<'a> {
    name: &'a str,
    order_number: &'a str,
    items: &'a [OrderItem],
    total: rust_decimal::Decimal,
    account_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/order_confirmation.txt")]
struct OrderConfirmationText<'a> {
    name: &'a str,
    order_number: &'a str,
    items: &'a [OrderItem],
    total: rust_decimal::Decimal,
    account_url: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Transactional email sender.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    base_url: String,
}

impl EmailService {
    /// Build a STARTTLS transport from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the relay host is invalid.
    pub fn new(config: &SmtpConfig, base_url: &str) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.username.clone(),
            config.password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Send the confirmation for a freshly placed order.
    ///
    /// # Errors
    ///
    /// Returns error if rendering, addressing or delivery fails.
    pub async fn send_order_confirmation(
        &self,
        to: &str,
        name: &str,
        order: &Order,
    ) -> Result<(), EmailError> {
        let account_url = format!("{}/account/orders", self.base_url);
        let html = OrderConfirmationHtml {
            name,
            order_number: &order.order_number,
            items: &order.items,
            total: order.total_amount,
            account_url: &account_url,
        }
        .render()?;
        let text = OrderConfirmationText {
            name,
            order_number: &order.order_number,
            items: &order.items,
            total: order.total_amount,
            account_url: &account_url,
        }
        .render()?;

        let subject = format!("AngoHost order {}", order.order_number);
        self.send_multipart_email(to, &subject, &text, &html).await
    }

    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;
        Ok(())
    }
}

impl std::fmt::Debug for EmailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailService")
            .field("from_address", &self.from_address)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use angohost_core::CartItemKind;
    use rust_decimal::Decimal;

    use super::*;

    fn items() -> Vec<OrderItem> {
        vec![OrderItem {
            id: "domain-loja.ao".to_string(),
            title: "Domain registration: loja.ao".to_string(),
            kind: CartItemKind::DomainRegistration,
            price: Decimal::from(19_900),
            quantity: 1,
            domain: Some("loja.ao".to_string()),
            period: Some(1),
            subtotal: Decimal::from(19_900),
        }]
    }

    #[test]
    fn test_text_body_lists_items_and_total() {
        let items = items();
        let body = OrderConfirmationText {
            name: "Ana",
            order_number: "ORD-1-ABCDE",
            items: &items,
            total: Decimal::from(19_900),
            account_url: "https://angohost.ao/account/orders",
        }
        .render()
        .unwrap();
        assert!(body.contains("ORD-1-ABCDE"));
        assert!(body.contains("Domain registration: loja.ao"));
        assert!(body.contains("19.900,00 Kz"));
    }

    #[test]
    fn test_html_body_escapes_name() {
        let items = items();
        let body = OrderConfirmationHtml {
            name: "<Ana>",
            order_number: "ORD-1-ABCDE",
            items: &items,
            total: Decimal::from(19_900),
            account_url: "https://angohost.ao/account/orders",
        }
        .render()
        .unwrap();
        assert!(body.contains("&#60;Ana&#62;") || body.contains("&lt;Ana&gt;"));
    }

    #[tokio::test]
    async fn test_service_builds_from_config() {
        let config = SmtpConfig {
            host: "smtp.example.ao".to_string(),
            port: 587,
            username: "orders@example.ao".to_string(),
            password: secrecy::SecretString::from("pw".to_string()),
            from_address: "AngoHost <orders@example.ao>".to_string(),
        };
        let service = EmailService::new(&config, "https://angohost.ao/").unwrap();
        assert_eq!(service.base_url, "https://angohost.ao");
    }
}

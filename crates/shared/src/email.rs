//! Email service for sending transactional emails.
//!
//! Uses `lettre` for SMTP transport. Every notification here is best-effort:
//! callers log failures and continue, they never fail the triggering write.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType, transport::smtp::authentication::Credentials,
};
use thiserror::Error;

use crate::config::EmailConfig;

/// Email service errors.
#[derive(Debug, Error)]
pub enum EmailError {
    /// Failed to build email message.
    #[error("Failed to build email: {0}")]
    BuildError(String),
    /// Failed to send email.
    #[error("Failed to send email: {0}")]
    SendError(String),
    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    /// Creates a new email service.
    #[must_use]
    pub const fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Creates an SMTP transport.
    fn create_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
            .map_err(|e| EmailError::SendError(e.to_string()))?
            .port(self.config.smtp_port);

        let builder = if self.config.smtp_username.is_empty() {
            builder
        } else {
            builder.credentials(Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            ))
        };

        Ok(builder.build())
    }

    /// Sends a welcome email after registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the email cannot be sent.
    pub async fn send_welcome_email(&self, to_email: &str, to_name: &str) -> Result<(), EmailError> {
        let subject = "Welcome to Kantor";
        let body = format!(
            r"Hi {to_name},

Your Kantor account has been created. You can now order accounting
services, upload documents, and track your orders from the dashboard.

Best regards,
The Kantor Team"
        );

        self.send_email(to_email, subject, &body).await
    }

    /// Sends an order confirmation to the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the email cannot be sent.
    pub async fn send_order_created_email(
        &self,
        to_email: &str,
        to_name: &str,
        service_name: &str,
        total_amount: &str,
    ) -> Result<(), EmailError> {
        let subject = "Your order has been received - Kantor";
        let body = format!(
            r"Hi {to_name},

We received your order for {service_name} (total: {total_amount}).
Please complete the payment so our accountants can start working on it.

Best regards,
The Kantor Team"
        );

        self.send_email(to_email, subject, &body).await
    }

    /// Notifies the client that a payment has been verified.
    ///
    /// # Errors
    ///
    /// Returns an error if the email cannot be sent.
    pub async fn send_payment_verified_email(
        &self,
        to_email: &str,
        to_name: &str,
        service_name: &str,
    ) -> Result<(), EmailError> {
        let subject = "Payment verified - Kantor";
        let body = format!(
            r"Hi {to_name},

Your payment for {service_name} has been verified. An accountant will
start working on your order shortly.

Best regards,
The Kantor Team"
        );

        self.send_email(to_email, subject, &body).await
    }

    /// Notifies the client that their order is done.
    ///
    /// # Errors
    ///
    /// Returns an error if the email cannot be sent.
    pub async fn send_order_completed_email(
        &self,
        to_email: &str,
        to_name: &str,
        service_name: &str,
    ) -> Result<(), EmailError> {
        let subject = "Your order is complete - Kantor";
        let body = format!(
            r"Hi {to_name},

Your order for {service_name} has been completed. The result documents
are available on your dashboard. If anything needs adjusting you can
request a revision (up to 2 per order).

Best regards,
The Kantor Team"
        );

        self.send_email(to_email, subject, &body).await
    }

    /// Notifies the office side that a client filed a revision request.
    ///
    /// # Errors
    ///
    /// Returns an error if the email cannot be sent.
    pub async fn send_revision_filed_email(
        &self,
        to_email: &str,
        to_name: &str,
        revision_title: &str,
    ) -> Result<(), EmailError> {
        let subject = "New revision request - Kantor";
        let body = format!(
            r"Hi {to_name},

A client filed a new revision request: '{revision_title}'.
Please review it from the dashboard and claim it when you pick it up.

Best regards,
The Kantor Team"
        );

        self.send_email(to_email, subject, &body).await
    }

    /// Notifies the counterpart that a revision was filed or picked up.
    ///
    /// # Errors
    ///
    /// Returns an error if the email cannot be sent.
    pub async fn send_revision_update_email(
        &self,
        to_email: &str,
        to_name: &str,
        revision_title: &str,
        status: &str,
    ) -> Result<(), EmailError> {
        let subject = "Revision update - Kantor";
        let body = format!(
            r"Hi {to_name},

The revision request '{revision_title}' is now {status}.
Check the order detail page for the latest documents and notes.

Best regards,
The Kantor Team"
        );

        self.send_email(to_email, subject, &body).await
    }

    /// Sends a generic email.
    ///
    /// # Errors
    ///
    /// Returns an error if the email cannot be sent.
    pub async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), EmailError> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| EmailError::BuildError(e.to_string()))?;

        let transport = self.create_transport()?;
        transport
            .send(email)
            .await
            .map_err(|e| EmailError::SendError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_builds_without_credentials() {
        let service = EmailService::new(EmailConfig::default());
        assert!(service.create_transport().is_ok());
    }
}

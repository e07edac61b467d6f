// Email Service Module
// Renders templated emails and hands them to the configured transport

pub mod builders;
pub mod sender;
pub mod types;

use self::types::EmailBuilder;
use crate::app_config::EmailConfig;
use anyhow::Result;
use builders::{InvitationEmailBuilder, PasswordResetEmailBuilder};
use handlebars::Handlebars;
use std::sync::Arc;
use tracing::{info, instrument};

pub use sender::{EmailTransport, LogTransport, MemoryTransport};
pub use types::{EmailError, EmailMessage};

/// Email service for account emails
#[derive(Clone)]
pub struct EmailService {
    transport: Arc<dyn EmailTransport>,
    config: EmailConfig,
    templates: Arc<Handlebars<'static>>,
}

impl EmailService {
    /// Email service that writes messages to the log
    pub fn new(config: EmailConfig) -> Result<Self> {
        Self::with_transport(config, Arc::new(LogTransport))
    }

    pub fn with_transport(config: EmailConfig, transport: Arc<dyn EmailTransport>) -> Result<Self> {
        let mut templates = Handlebars::new();
        templates.set_strict_mode(true);
        Self::register_templates(&mut templates)?;

        Ok(Self {
            transport,
            config,
            templates: Arc::new(templates),
        })
    }

    fn register_templates(templates: &mut Handlebars) -> Result<(), EmailError> {
        templates
            .register_template_string(
                "password_reset",
                include_str!("../../templates/email/password_reset.html"),
            )
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        templates
            .register_template_string(
                "invitation",
                include_str!("../../templates/email/invitation.html"),
            )
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        Ok(())
    }

    fn validate_recipient(to_email: &str) -> Result<(), EmailError> {
        if validator::validate_email(to_email) {
            Ok(())
        } else {
            Err(EmailError::InvalidEmail(to_email.to_string()))
        }
    }

    /// Send the password reset link
    #[instrument(skip(self, reset_token))]
    pub async fn send_password_reset_email(
        &self,
        to_email: &str,
        user_name: &str,
        reset_token: &str,
        expiry_minutes: u32,
    ) -> Result<(), EmailError> {
        Self::validate_recipient(to_email)?;
        info!("Sending password reset email to {}", to_email);

        let message = PasswordResetEmailBuilder {
            to_email,
            user_name,
            reset_token,
            expiry_minutes,
            config: &self.config,
            templates: &self.templates,
        }
        .build()?;

        self.transport.send(&message).await
    }

    /// Send the complete-registration link to an invited user
    #[instrument(skip(self, registration_token))]
    pub async fn send_invitation_email(
        &self,
        to_email: &str,
        user_name: &str,
        username: &str,
        registration_token: &str,
        expiry_hours: u32,
    ) -> Result<(), EmailError> {
        Self::validate_recipient(to_email)?;
        info!("Sending invitation email to {}", to_email);

        let message = InvitationEmailBuilder {
            to_email,
            user_name,
            username,
            registration_token,
            expiry_hours,
            config: &self.config,
            templates: &self.templates,
        }
        .build()?;

        self.transport.send(&message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> EmailConfig {
        EmailConfig {
            from_email: "noreply@test.com".to_string(),
            from_name: "Test Inn".to_string(),
            client_url: "https://app.test.com".to_string(),
        }
    }

    #[test]
    fn test_email_service_creation() {
        assert!(EmailService::new(create_test_config()).is_ok());
    }

    #[tokio::test]
    async fn test_password_reset_email_contains_link() {
        let transport = MemoryTransport::new();
        let service =
            EmailService::with_transport(create_test_config(), Arc::new(transport.clone())).unwrap();

        service
            .send_password_reset_email("guest@test.com", "Ada Lovelace", "tok123", 30)
            .await
            .unwrap();

        let message = transport.last_to("guest@test.com").unwrap();
        assert_eq!(message.subject, "Password Reset Request");
        assert_eq!(message.from, "Test Inn <noreply@test.com>");
        assert!(message.html.contains("https://app.test.com/password/reset/tok123"));
        assert!(message.text.unwrap().contains("30 minutes"));
    }

    #[tokio::test]
    async fn test_invitation_email_contains_link() {
        let transport = MemoryTransport::new();
        let service =
            EmailService::with_transport(create_test_config(), Arc::new(transport.clone())).unwrap();

        service
            .send_invitation_email("sam@test.com", "Sam Rivera", "frontdesk1", "inv456", 72)
            .await
            .unwrap();

        let message = transport.last_to("sam@test.com").unwrap();
        assert!(message
            .html
            .contains("https://app.test.com/complete-registration/inv456"));
        assert!(message.html.contains("frontdesk1"));
    }

    #[tokio::test]
    async fn test_invalid_recipient_rejected() {
        let service = EmailService::new(create_test_config()).unwrap();
        let result = service
            .send_password_reset_email("not-an-email", "X", "tok", 30)
            .await;
        assert!(matches!(result, Err(EmailError::InvalidEmail(_))));
    }
}

// Email Builders - Builders for different types of emails
// Each builder knows how to construct its specific email type

use super::types::{
    EmailBuilder, EmailError, EmailMessage, InvitationEmailData, PasswordResetEmailData,
};
use crate::app_config::EmailConfig;
use handlebars::Handlebars;
use tracing::instrument;

fn sender_address(config: &EmailConfig) -> String {
    format!("{} <{}>", config.from_name, config.from_email)
}

/// Builder for password reset emails
pub struct PasswordResetEmailBuilder<'a> {
    pub to_email: &'a str,
    pub user_name: &'a str,
    pub reset_token: &'a str,
    pub expiry_minutes: u32,
    pub config: &'a EmailConfig,
    pub templates: &'a Handlebars<'a>,
}

impl<'a> PasswordResetEmailBuilder<'a> {
    pub fn reset_url(&self) -> String {
        format!("{}/password/reset/{}", self.config.client_url, self.reset_token)
    }
}

impl<'a> EmailBuilder for PasswordResetEmailBuilder<'a> {
    #[instrument(skip(self))]
    fn build(&self) -> Result<EmailMessage, EmailError> {
        let reset_url = self.reset_url();
        let data = PasswordResetEmailData {
            reset_url: reset_url.clone(),
            user_name: self.user_name.to_string(),
            app_name: self.config.from_name.clone(),
            expiry_minutes: self.expiry_minutes,
        };

        let html = self
            .templates
            .render("password_reset", &data)
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        let text = format!(
            "Hi {},\n\n\
            You requested a password reset. Open the link below to choose a new password:\n\n\
            {}\n\n\
            The link expires in {} minutes.\n\n\
            The {} Team",
            self.user_name, reset_url, self.expiry_minutes, self.config.from_name
        );

        Ok(EmailMessage::new(
            sender_address(self.config),
            vec![self.to_email.to_string()],
            "Password Reset Request".to_string(),
            html,
        )
        .with_text(text))
    }
}

/// Builder for staff invitation emails
pub struct InvitationEmailBuilder<'a> {
    pub to_email: &'a str,
    pub user_name: &'a str,
    pub username: &'a str,
    pub registration_token: &'a str,
    pub expiry_hours: u32,
    pub config: &'a EmailConfig,
    pub templates: &'a Handlebars<'a>,
}

impl<'a> InvitationEmailBuilder<'a> {
    pub fn registration_url(&self) -> String {
        format!(
            "{}/complete-registration/{}",
            self.config.client_url, self.registration_token
        )
    }
}

impl<'a> EmailBuilder for InvitationEmailBuilder<'a> {
    #[instrument(skip(self))]
    fn build(&self) -> Result<EmailMessage, EmailError> {
        let registration_url = self.registration_url();
        let data = InvitationEmailData {
            registration_url: registration_url.clone(),
            user_name: self.user_name.to_string(),
            username: self.username.to_string(),
            app_name: self.config.from_name.clone(),
            expiry_hours: self.expiry_hours,
        };

        let html = self
            .templates
            .render("invitation", &data)
            .map_err(|e| EmailError::TemplateError(e.to_string()))?;

        let text = format!(
            "Hi {},\n\n\
            An account with the username {} has been created for you. \
            Complete your registration here:\n\n\
            {}\n\n\
            The link expires in {} hours.\n\n\
            The {} Team",
            self.user_name, self.username, registration_url, self.expiry_hours, self.config.from_name
        );

        Ok(EmailMessage::new(
            sender_address(self.config),
            vec![self.to_email.to_string()],
            format!("You're invited to {}", self.config.from_name),
            html,
        )
        .with_text(text))
    }
}

// Email Sender - delivery of rendered messages
// Transports are swappable; the default one only logs

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, instrument, warn};

use super::types::{EmailError, EmailMessage};

/// Delivers a rendered email
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError>;
}

/// Writes every message to the log instead of delivering it
#[derive(Debug, Clone, Default)]
pub struct LogTransport;

#[async_trait]
impl EmailTransport for LogTransport {
    #[instrument(skip(self, message), fields(to = ?message.to, subject = %message.subject))]
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        info!(
            from = %message.from,
            body = message.text.as_deref().unwrap_or_default(),
            "Email delivered to log transport"
        );
        Ok(())
    }
}

/// Keeps sent messages in memory; can be switched to fail every send
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    /// Most recent message sent to `address`
    pub fn last_to(&self, address: &str) -> Option<EmailMessage> {
        self.sent()
            .into_iter()
            .rev()
            .find(|m| m.to.iter().any(|to| to.eq_ignore_ascii_case(address)))
    }
}

#[async_trait]
impl EmailTransport for MemoryTransport {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        if self.failing.load(Ordering::SeqCst) {
            warn!("Memory transport configured to fail");
            return Err(EmailError::SendError("transport unavailable".to_string()));
        }

        self.sent
            .lock()
            .map_err(|e| EmailError::SendError(e.to_string()))?
            .push(message.clone());
        Ok(())
    }
}

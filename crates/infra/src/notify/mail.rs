//! Outgoing mail and the transports that carry it.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;
use tracing::info;

/// A rendered plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("mail transport rejected message: {0}")]
    Rejected(String),
    #[error("mail transport unavailable: {0}")]
    Unavailable(String),
}

/// External mail sink (SMTP relay, provider API, ...).
pub trait MailTransport: Send + Sync {
    fn send(&self, mail: &Mail) -> Result<(), TransportError>;
}

impl<T> MailTransport for std::sync::Arc<T>
where
    T: MailTransport + ?Sized,
{
    fn send(&self, mail: &Mail) -> Result<(), TransportError> {
        (**self).send(mail)
    }
}

/// Writes every mail to the log instead of sending it (dev default).
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingTransport;

impl MailTransport for LoggingTransport {
    fn send(&self, mail: &Mail) -> Result<(), TransportError> {
        info!(
            from = %mail.from,
            to = %mail.to,
            subject = %mail.subject,
            body_len = mail.body.len(),
            "mail sent"
        );
        Ok(())
    }
}

/// Keeps delivered mail in memory; can be told to fail the first N sends.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    delivered: Mutex<Vec<Mail>>,
    failures_left: AtomicUsize,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_first(failures: usize) -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            failures_left: AtomicUsize::new(failures),
        }
    }

    pub fn delivered(&self) -> Vec<Mail> {
        self.delivered.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

impl MailTransport for RecordingTransport {
    fn send(&self, mail: &Mail) -> Result<(), TransportError> {
        let failed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(TransportError::Unavailable("simulated outage".into()));
        }

        self.delivered
            .lock()
            .map_err(|_| TransportError::Unavailable("recorder lock poisoned".into()))?
            .push(mail.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail() -> Mail {
        Mail {
            from: "noreply@procura.local".into(),
            to: "buyer@example.com".into(),
            subject: "hi".into(),
            body: "hello".into(),
        }
    }

    #[test]
    fn recording_transport_fails_first_sends_then_records() {
        let t = RecordingTransport::failing_first(2);
        assert!(t.send(&mail()).is_err());
        assert!(t.send(&mail()).is_err());
        assert!(t.send(&mail()).is_ok());
        assert_eq!(t.delivered(), vec![mail()]);
    }
}

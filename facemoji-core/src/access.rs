//! Optional shared-secret gate in front of the editor.
//!
//! This is a courtesy lock, not a security boundary: the secret lives in the settings file
//! and nothing about an unlocked session is persisted.

use std::time::{Duration, Instant};

use facemoji_utils::config::AccessSettings;
use log::info;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("incorrect password")]
    WrongSecret,
}

/// Proof that the gate was passed, with an optional expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessSession {
    expires_at: Option<Instant>,
}

impl AccessSession {
    pub fn is_valid_at(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|expiry| now < expiry)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Instant::now())
    }

    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    secret: Option<String>,
    ttl: Option<Duration>,
}

impl AccessGate {
    pub fn new(secret: Option<String>, ttl: Option<Duration>) -> Self {
        Self {
            secret: secret.filter(|secret| !secret.is_empty()),
            ttl,
        }
    }

    pub fn from_settings(settings: &AccessSettings) -> Self {
        Self::new(
            settings.secret.clone(),
            settings
                .ttl_minutes
                .map(|minutes| Duration::from_secs(minutes.saturating_mul(60))),
        )
    }

    /// `true` when no secret is configured and anyone may edit.
    pub fn is_open(&self) -> bool {
        self.secret.is_none()
    }

    /// Session for an open gate; `None` when a secret must be entered first.
    pub fn open_session(&self) -> Option<AccessSession> {
        self.is_open().then(|| self.grant(Instant::now()))
    }

    pub fn unlock(&self, attempt: &str) -> Result<AccessSession, AccessDenied> {
        self.unlock_at(attempt, Instant::now())
    }

    pub fn unlock_at(&self, attempt: &str, now: Instant) -> Result<AccessSession, AccessDenied> {
        match &self.secret {
            Some(secret) if secret != attempt => Err(AccessDenied::WrongSecret),
            _ => {
                info!("Editor unlocked");
                Ok(self.grant(now))
            }
        }
    }

    fn grant(&self, now: Instant) -> AccessSession {
        AccessSession {
            expires_at: self.ttl.map(|ttl| now + ttl),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_secret_is_denied_without_lockout() {
        let gate = AccessGate::new(Some("kanai0".into()), None);
        assert!(!gate.is_open());
        assert!(gate.open_session().is_none());
        for _ in 0..5 {
            assert_eq!(gate.unlock("guess"), Err(AccessDenied::WrongSecret));
        }
        let session = gate.unlock("kanai0").expect("unlock");
        assert!(session.is_valid());
        assert!(session.expires_at().is_none());
    }

    #[test]
    fn sessions_expire_after_ttl() {
        let gate = AccessGate::from_settings(&AccessSettings {
            secret: Some("pw".into()),
            ttl_minutes: Some(10),
        });
        let start = Instant::now();
        let session = gate.unlock_at("pw", start).expect("unlock");
        assert!(session.is_valid_at(start + Duration::from_secs(9 * 60)));
        assert!(!session.is_valid_at(start + Duration::from_secs(10 * 60)));
    }

    #[test]
    fn missing_or_empty_secret_leaves_gate_open() {
        assert!(AccessGate::default().open_session().is_some());
        let gate = AccessGate::new(Some(String::new()), None);
        assert!(gate.is_open());
        assert!(gate.unlock("anything").is_ok());
    }
}

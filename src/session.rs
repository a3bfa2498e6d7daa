use std::fmt;

/// Credentials for the one SSH endpoint the server is talking to.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredentials {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl SessionCredentials {
    /// `user@host`, the form ssh takes as its destination argument.
    #[must_use]
    pub fn destination(&self) -> String {
        format!("{}@{}", self.username, self.host)
    }
}

// Hand-written so the password never reaches a log line.
impl fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Whether the stored credentials have been shown to work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Verified,
    /// Stored without proof: the probe was deferred, failed, or timed out.
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected { verified: bool },
}

#[derive(Debug)]
struct ActiveSession {
    credentials: SessionCredentials,
    verification: Verification,
}

/// Holds at most one set of credentials. Owned by the protocol loop and
/// lent to each tool call.
#[derive(Debug, Default)]
pub struct Session {
    active: Option<ActiveSession>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever is stored. The new credentials start out `Pending`.
    pub fn store(&mut self, credentials: SessionCredentials) {
        if let Some(previous) = &self.active {
            tracing::debug!(
                "Replacing session for {} with {}",
                previous.credentials.destination(),
                credentials.destination()
            );
        }
        self.active = Some(ActiveSession {
            credentials,
            verification: Verification::Pending,
        });
    }

    pub fn mark_verified(&mut self) {
        if let Some(active) = &mut self.active {
            active.verification = Verification::Verified;
        }
    }

    /// Drop the stored credentials. Returns whether anything was stored.
    pub fn clear(&mut self) -> bool {
        self.active.take().is_some()
    }

    #[must_use]
    pub fn credentials(&self) -> Option<&SessionCredentials> {
        self.active.as_ref().map(|a| &a.credentials)
    }

    #[must_use]
    pub fn verification(&self) -> Option<Verification> {
        self.active.as_ref().map(|a| a.verification)
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        match &self.active {
            None => SessionState::Disconnected,
            Some(active) => SessionState::Connected {
                verified: active.verification == Verification::Verified,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(host: &str) -> SessionCredentials {
        SessionCredentials {
            host: host.to_string(),
            port: 22,
            username: "deploy".to_string(),
            password: "hunter2".to_string(),
        }
    }

    #[test]
    fn starts_disconnected() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(session.credentials().is_none());
    }

    #[test]
    fn store_is_pending_until_verified() {
        let mut session = Session::new();
        session.store(creds("a.example.com"));
        assert_eq!(session.state(), SessionState::Connected { verified: false });
        session.mark_verified();
        assert_eq!(session.state(), SessionState::Connected { verified: true });
    }

    #[test]
    fn store_replaces_and_resets_verification() {
        let mut session = Session::new();
        session.store(creds("a.example.com"));
        session.mark_verified();
        session.store(creds("b.example.com"));
        assert_eq!(session.credentials().unwrap().host, "b.example.com");
        assert_eq!(session.verification(), Some(Verification::Pending));
    }

    #[test]
    fn clear_is_idempotent() {
        let mut session = Session::new();
        session.store(creds("a.example.com"));
        assert!(session.clear());
        assert!(!session.clear());
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[test]
    fn mark_verified_without_session_is_noop() {
        let mut session = Session::new();
        session.mark_verified();
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[test]
    fn debug_redacts_password() {
        let rendered = format!("{:?}", creds("a.example.com"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}

//! Auth module - two-state session gate guarding the main app
//!
//! A placeholder equality check against a fixed credential pair, not a
//! security boundary.

const EXPECTED_USERNAME: &str = "Username";
const EXPECTED_PASSWORD: &str = "Password";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticated,
}

#[derive(Debug, Default)]
pub struct SessionGate {
    state: SessionState,
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt the one guarded transition. Anything but an exact match of
    /// both fields leaves the gate unauthenticated.
    pub fn login(&mut self, username: &str, password: &str) -> bool {
        if username == EXPECTED_USERNAME && password == EXPECTED_PASSWORD {
            self.state = SessionState::Authenticated;
        }
        self.is_authenticated()
    }

    /// Explicit reverse transition
    pub fn logout(&mut self) {
        self.state = SessionState::Unauthenticated;
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }
}

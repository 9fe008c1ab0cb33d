//! Identity providers.

use turnwright_core::persistence::SessionProvider;

/// No authenticated user; saves are always skipped.
pub struct AnonymousSession;

impl SessionProvider for AnonymousSession {
    fn current_user_id(&self) -> Option<String> {
        None
    }
}

/// A fixed identity, e.g. from configuration.
pub struct StaticSession {
    user_id: Option<String>,
}

impl StaticSession {
    pub fn new(user_id: Option<String>) -> Self {
        Self {
            user_id: user_id.filter(|id| !id.trim().is_empty()),
        }
    }
}

impl SessionProvider for StaticSession {
    fn current_user_id(&self) -> Option<String> {
        self.user_id.clone()
    }
}

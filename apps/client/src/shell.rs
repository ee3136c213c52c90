use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::session::SessionStore;

/// The application shell's "authenticated" flag. The auth page raises it,
/// logout lowers it; the shell decides which page to show from it.
#[derive(Debug, Clone, Default)]
pub struct AuthFlag(Arc<AtomicBool>);

impl AuthFlag {
    /// Starts raised when a complete session is already stored.
    pub fn from_session(session: &SessionStore) -> Self {
        let flag = AuthFlag::default();
        flag.set(matches!(session.load(), Ok(Some(_))));
        flag
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn set(&self, authenticated: bool) {
        self.0.store(authenticated, Ordering::SeqCst);
    }
}

//! Cooperative cancellation for a running encode.
//!
//! The CLI hands a clone of the token to its signal watcher and another to the
//! orchestrator; the orchestrator polls it while waiting for progress and
//! kills ffmpeg once it is set.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared, clonable cancel flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancellationToken::new();
        let watcher = token.clone();
        assert!(!token.is_cancelled());
        watcher.cancel();
        assert!(token.is_cancelled());
        watcher.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn cancel_is_visible_across_threads() {
        let token = CancellationToken::new();
        let remote = token.clone();
        std::thread::spawn(move || remote.cancel()).join().unwrap();
        assert!(token.is_cancelled());
    }
}

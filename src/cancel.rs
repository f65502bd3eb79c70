/*!
Cooperative cancellation for long-running solves.

A solver polls its token between units of work; nothing is interrupted
forcibly. Clones share one flag, so any thread holding a clone may cancel.
*/

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    interrupted: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// A token that is only ever cancelled through [`CancelToken::cancel`].
    pub fn new() -> Self {
        Default::default()
    }

    /// Alias of [`CancelToken::new`] for call sites that never cancel.
    pub fn none() -> Self {
        Self::new()
    }

    /// A token that expires once `timeout` has elapsed from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        CancelToken {
            interrupted: Default::default(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn cancel(&self) {
        self.interrupted.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.interrupted.load(Ordering::Relaxed)
            || self
                .deadline
                .map_or(false, |deadline| Instant::now() >= deadline)
    }
}

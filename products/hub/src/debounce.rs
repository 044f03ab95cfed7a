use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::time::sleep;

/// Quiet period applied to search-as-you-type input.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Runs only the most recent call made within the debounce window.
///
/// Clones share one generation counter, so a view can hand a clone to each
/// keystroke handler. A call that is overtaken by a newer one before its
/// window elapses resolves to `None` without running its work.
#[derive(Clone, Debug)]
pub struct SearchDebouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn run<F, Fut, T>(&self, work: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        sleep(self.delay).await;
        if self.generation.load(Ordering::SeqCst) != ticket {
            return None;
        }
        Some(work().await)
    }
}

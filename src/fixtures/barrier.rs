//! One-shot "all fixtures loaded" signal.
//!
//! Loads are registered while discovery is still enumerating files and may
//! complete in any order relative to it. The barrier fires exactly once, when
//! discovery has finished AND no registered load is outstanding. Tracking the
//! two conditions separately means a load that completes before discovery is
//! done can never trigger a premature fire, whatever the interleaving.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

type Continuation = Box<dyn FnOnce() + Send>;

/// Counter-plus-flag completion barrier.
#[derive(Default)]
pub struct LoadBarrier {
    outstanding: AtomicUsize,
    discovery_done: AtomicBool,
    fired: AtomicBool,
    continuation: Mutex<Option<Continuation>>,
    waiters: Mutex<Vec<oneshot::Sender<()>>>,
}

impl std::fmt::Debug for LoadBarrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadBarrier")
            .field("outstanding", &self.outstanding())
            .field("discovery_done", &self.is_discovery_complete())
            .field("fired", &self.is_settled())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl LoadBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the barrier and install the action to run once it fires.
    ///
    /// Pending `settled()` receivers from a previous round are dropped.
    pub fn configure<F>(&self, on_settled: F)
    where
        F: FnOnce() + Send + 'static,
    {
        *lock(&self.continuation) = Some(Box::new(on_settled));
        lock(&self.waiters).clear();
        self.outstanding.store(0, Ordering::SeqCst);
        self.discovery_done.store(false, Ordering::SeqCst);
        self.fired.store(false, Ordering::SeqCst);
    }

    /// Announce one more pending load.
    pub fn register(&self) {
        if self.fired.load(Ordering::SeqCst) {
            log::warn!("[Barrier] load registered after the barrier fired; ignored for firing");
        }
        self.outstanding.fetch_add(1, Ordering::SeqCst);
    }

    /// Mark one pending load as finished.
    ///
    /// Extra completions saturate at zero.
    pub fn complete(&self) {
        let previous = self
            .outstanding
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if previous.is_err() {
            log::warn!("[Barrier] completion without a matching registration");
        }
        self.try_fire();
    }

    /// Signal that enumeration is over; no further loads will be registered.
    pub fn finish_discovery(&self) {
        self.discovery_done.store(true, Ordering::SeqCst);
        self.try_fire();
    }

    /// Receiver resolved when the barrier fires.
    ///
    /// Resolves immediately if it already has. The sender is dropped without a
    /// value if the barrier is reconfigured first.
    pub fn settled(&self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        let mut waiters = lock(&self.waiters);
        if self.fired.load(Ordering::SeqCst) {
            let _ = tx.send(());
        } else {
            waiters.push(tx);
        }
        rx
    }

    pub fn is_settled(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    pub fn is_discovery_complete(&self) -> bool {
        self.discovery_done.load(Ordering::SeqCst)
    }

    fn try_fire(&self) {
        if !self.discovery_done.load(Ordering::SeqCst) || self.outstanding.load(Ordering::SeqCst) != 0
        {
            return;
        }
        if self.fired.swap(true, Ordering::SeqCst) {
            return;
        }

        let continuation = lock(&self.continuation).take();
        if let Some(on_settled) = continuation {
            on_settled();
        }

        let waiters = std::mem::take(&mut *lock(&self.waiters));
        for waiter in waiters {
            let _ = waiter.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn counting(barrier: &LoadBarrier) -> Arc<AtomicUsize> {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        barrier.configure(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        fired
    }

    #[test]
    fn loads_finishing_before_discovery_wait_for_it() {
        let barrier = LoadBarrier::new();
        let fired = counting(&barrier);

        barrier.register();
        barrier.complete();
        barrier.register();
        barrier.complete();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(!barrier.is_settled());

        barrier.finish_discovery();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(barrier.is_settled());
    }

    #[test]
    fn loads_finishing_after_discovery_fire_on_last_completion() {
        let barrier = LoadBarrier::new();
        let fired = counting(&barrier);

        barrier.register();
        barrier.register();
        barrier.finish_discovery();
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        barrier.complete();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        barrier.complete();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_discovery_fires_immediately() {
        let barrier = LoadBarrier::new();
        let fired = counting(&barrier);
        barrier.finish_discovery();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fires_at_most_once() {
        let barrier = LoadBarrier::new();
        let fired = counting(&barrier);

        barrier.finish_discovery();
        barrier.complete();
        barrier.finish_discovery();
        barrier.register();
        barrier.complete();

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(barrier.outstanding(), 0);
    }

    #[test]
    fn extra_completion_saturates() {
        let barrier = LoadBarrier::new();
        let _fired = counting(&barrier);
        barrier.complete();
        barrier.complete();
        assert_eq!(barrier.outstanding(), 0);
        barrier.register();
        assert_eq!(barrier.outstanding(), 1);
    }

    #[test]
    fn configure_resets_for_another_round() {
        let barrier = LoadBarrier::new();
        let first = counting(&barrier);
        barrier.finish_discovery();
        assert_eq!(first.load(Ordering::SeqCst), 1);

        let second = counting(&barrier);
        assert!(!barrier.is_settled());
        assert!(!barrier.is_discovery_complete());
        barrier.register();
        barrier.finish_discovery();
        barrier.complete();
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn settled_receiver_resolves_before_and_after_fire() {
        let barrier = LoadBarrier::new();
        let _fired = counting(&barrier);
        let mut early = barrier.settled();
        assert!(early.try_recv().is_err());

        barrier.finish_discovery();
        assert!(early.try_recv().is_ok());

        let mut late = barrier.settled();
        assert!(late.try_recv().is_ok());
    }

    #[test]
    fn concurrent_loads_fire_once() {
        let barrier = Arc::new(LoadBarrier::new());
        let fired = counting(&barrier);

        let mut handles = Vec::new();
        for _ in 0..32 {
            barrier.register();
            let barrier = Arc::clone(&barrier);
            handles.push(thread::spawn(move || barrier.complete()));
        }
        barrier.finish_discovery();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(barrier.is_settled());
    }

    #[tokio::test]
    async fn settled_can_be_awaited() {
        let barrier = Arc::new(LoadBarrier::new());
        let _fired = counting(&barrier);
        barrier.register();
        let rx = barrier.settled();

        let worker = Arc::clone(&barrier);
        tokio::spawn(async move {
            worker.finish_discovery();
            worker.complete();
        });

        rx.await.unwrap();
        assert!(barrier.is_settled());
    }
}

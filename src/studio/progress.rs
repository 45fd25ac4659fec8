//! ProgressAnimator - cosmetic progress fill while a request is in flight.
//!
//! The value carries no information about backend progress. It creeps up by a
//! random step on every tick, never passing [`ProgressAnimator::CAP`] until the
//! caller reports success with [`ProgressAnimator::complete`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Default interval between progress steps.
pub const DEFAULT_TICK: Duration = Duration::from_millis(500);

/// Default delay before the bar returns to zero after resolution.
pub const DEFAULT_RESET_DELAY: Duration = Duration::from_millis(1000);

/// Randomized, capped progress animation.
///
/// Values are published on a watch channel; call [`subscribe`](Self::subscribe)
/// to observe them. Must be used from within a tokio runtime.
pub struct ProgressAnimator {
    tx: Arc<watch::Sender<f64>>,
    tick: Duration,
    seed: Option<u64>,
    /// Bumped on every start so stale resets can tell they are stale.
    epoch: Arc<AtomicU64>,
    ticker: Option<JoinHandle<()>>,
}

impl ProgressAnimator {
    /// Highest value reached while waiting.
    pub const CAP: f64 = 90.0;

    /// Value shown after a successful resolution.
    pub const COMPLETE: f64 = 100.0;

    /// Upper bound (exclusive) of a single random step.
    pub const MAX_STEP: f64 = 15.0;

    pub fn new(tick: Duration) -> Self {
        let (tx, _rx) = watch::channel(0.0);
        Self {
            tx: Arc::new(tx),
            tick,
            seed: None,
            epoch: Arc::new(AtomicU64::new(0)),
            ticker: None,
        }
    }

    /// Create an animator whose steps are reproducible.
    pub fn with_seed(tick: Duration, seed: u64) -> Self {
        let mut animator = Self::new(tick);
        animator.seed = Some(seed);
        animator
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    pub fn subscribe(&self) -> watch::Receiver<f64> {
        self.tx.subscribe()
    }

    /// Current percentage.
    pub fn value(&self) -> f64 {
        *self.tx.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.ticker.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Restart the animation from zero.
    pub fn start(&mut self) {
        self.stop();
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.tx.send_replace(0.0);

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(epoch)),
            None => StdRng::from_entropy(),
        };
        let tx = Arc::clone(&self.tx);
        let tick = self.tick;

        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            // the first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let step = rng.gen_range(0.0..Self::MAX_STEP);
                tx.send_modify(|value| *value = (*value + step).min(Self::CAP));
            }
        }));
    }

    /// Cancel the ticking task, freezing the current value.
    pub fn stop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    /// Stop and jump to 100%.
    pub fn complete(&mut self) {
        self.stop();
        self.tx.send_replace(Self::COMPLETE);
    }

    /// Return to zero after `delay`, unless the animation is restarted first.
    pub fn schedule_reset(&self, delay: Duration) -> JoinHandle<()> {
        let expected = self.epoch.load(Ordering::SeqCst);
        let epoch = Arc::clone(&self.epoch);
        let tx = Arc::clone(&self.tx);

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if epoch.load(Ordering::SeqCst) == expected {
                tx.send_replace(0.0);
            }
        })
    }
}

impl Default for ProgressAnimator {
    fn default() -> Self {
        Self::new(DEFAULT_TICK)
    }
}

impl Drop for ProgressAnimator {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_value_is_monotonic_and_capped() {
        let mut animator = ProgressAnimator::with_seed(DEFAULT_TICK, 7);
        let rx = animator.subscribe();
        animator.start();

        let mut last = 0.0;
        for _ in 0..200 {
            tokio::time::sleep(DEFAULT_TICK).await;
            let value = *rx.borrow();
            assert!(value >= last, "progress went backwards: {} -> {}", last, value);
            assert!((0.0..=ProgressAnimator::CAP).contains(&value));
            last = value;
        }
        assert_eq!(last, ProgressAnimator::CAP);
        animator.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_freezes_value() {
        let mut animator = ProgressAnimator::with_seed(DEFAULT_TICK, 1);
        animator.start();
        tokio::time::sleep(DEFAULT_TICK * 4).await;
        animator.stop();
        tokio::task::yield_now().await;
        let frozen = animator.value();

        tokio::time::sleep(DEFAULT_TICK * 10).await;
        assert_eq!(animator.value(), frozen);
        assert!(!animator.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_then_reset() {
        let mut animator = ProgressAnimator::with_seed(DEFAULT_TICK, 3);
        animator.start();
        tokio::time::sleep(DEFAULT_TICK * 3).await;

        animator.complete();
        assert_eq!(animator.value(), ProgressAnimator::COMPLETE);

        let reset = animator.schedule_reset(DEFAULT_RESET_DELAY);
        tokio::time::sleep(DEFAULT_RESET_DELAY / 2).await;
        assert_eq!(animator.value(), ProgressAnimator::COMPLETE);

        reset.await.unwrap();
        assert_eq!(animator.value(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_reset_does_not_clobber_new_animation() {
        let mut animator = ProgressAnimator::with_seed(DEFAULT_TICK, 5);
        animator.start();
        animator.stop();
        let reset = animator.schedule_reset(DEFAULT_RESET_DELAY);

        animator.start();
        tokio::time::sleep(DEFAULT_RESET_DELAY * 4).await;
        reset.await.unwrap();

        assert!(animator.is_running());
        assert!(animator.value() > 0.0);
    }

    #[tokio::test]
    async fn test_start_resets_to_zero() {
        let mut animator = ProgressAnimator::default();
        animator.complete();
        assert_eq!(animator.value(), ProgressAnimator::COMPLETE);
        animator.start();
        assert_eq!(animator.value(), 0.0);
        assert!(animator.is_running());
    }
}

//! Simulated response latency.
//!
//! Delays each reply by a configured latency, then awaits the reply under a
//! timeout. A reply that times out, or comes back empty, is replaced with the
//! locale's fallback response so the conversation never stalls.
//!
//! The scheduler never sees message text. Scripted latencies are keyed by
//! the order in which replies are scheduled.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rand::Rng;

use krishi_core::config::ChatConfig;

/// Computes the delay for the n-th scheduled reply (0-based). Lets callers
/// script latencies.
pub type DelayFn = Box<dyn Fn(u64) -> Duration + Send + Sync>;

/// How long a reply takes to "arrive".
pub enum Latency {
    Fixed(Duration),
    /// Uniformly random between `min` and `max`, inclusive.
    Uniform { min: Duration, max: Duration },
    Custom(DelayFn),
}

impl fmt::Debug for Latency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Latency::Fixed(d) => f.debug_tuple("Fixed").field(d).finish(),
            Latency::Uniform { min, max } => f
                .debug_struct("Uniform")
                .field("min", min)
                .field("max", max)
                .finish(),
            Latency::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Default upper bound on how long a reply may take once its delay elapsed.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);

/// Latency and timeout policy for reply generation.
#[derive(Debug)]
pub struct ResponseScheduler {
    latency: Latency,
    timeout: Duration,
    scheduled: AtomicU64,
}

impl Default for ResponseScheduler {
    fn default() -> Self {
        Self::immediate()
    }
}

impl ResponseScheduler {
    pub fn new(latency: Latency, timeout: Duration) -> Self {
        Self {
            latency,
            timeout,
            scheduled: AtomicU64::new(0),
        }
    }

    /// No artificial delay.
    pub fn immediate() -> Self {
        Self::new(Latency::Fixed(Duration::ZERO), DEFAULT_RESPONSE_TIMEOUT)
    }

    /// Delays computed by `delay_fn` from the sequence number.
    pub fn with_delay_fn(delay_fn: DelayFn, timeout: Duration) -> Self {
        Self::new(Latency::Custom(delay_fn), timeout)
    }

    /// Build from the `[chat]` config section. Equal bounds give a fixed delay.
    pub fn from_config(chat: &ChatConfig) -> Self {
        let min = Duration::from_millis(chat.min_latency_ms);
        let max = Duration::from_millis(chat.max_latency_ms);
        let latency = if min >= max {
            Latency::Fixed(min)
        } else {
            Latency::Uniform { min, max }
        };
        Self::new(latency, Duration::from_millis(chat.response_timeout_ms))
    }

    pub fn latency(&self) -> &Latency {
        &self.latency
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Delay for the next reply. Advances the sequence number.
    pub fn next_delay(&self) -> Duration {
        let sequence = self.scheduled.fetch_add(1, Ordering::Relaxed);
        match &self.latency {
            Latency::Fixed(d) => *d,
            Latency::Uniform { min, max } => {
                if min >= max {
                    return *min;
                }
                let lo = min.as_millis() as u64;
                let hi = max.as_millis() as u64;
                Duration::from_millis(rand::rng().random_range(lo..=hi))
            }
            Latency::Custom(delay_fn) => delay_fn(sequence),
        }
    }

    /// Wait out the next delay, then await `work`.
    ///
    /// Returns `fallback` if `work` exceeds the timeout or yields blank text.
    pub async fn schedule<F>(&self, work: F, fallback: &str) -> String
    where
        F: Future<Output = String>,
    {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match tokio::time::timeout(self.timeout, work).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                tracing::warn!("Responder returned empty text, using fallback");
                fallback.to_string()
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Response timed out, using fallback"
                );
                fallback.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future;
    use tokio::time::Instant;

    #[test]
    fn test_from_config_fixed() {
        let scheduler = ResponseScheduler::from_config(&ChatConfig::default());
        assert!(matches!(scheduler.latency(), Latency::Fixed(d) if *d == Duration::from_secs(2)));
        assert_eq!(scheduler.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_from_config_uniform() {
        let chat = ChatConfig {
            min_latency_ms: 100,
            max_latency_ms: 300,
            ..ChatConfig::default()
        };
        let scheduler = ResponseScheduler::from_config(&chat);
        for _ in 0..50 {
            let d = scheduler.next_delay();
            assert!(d >= Duration::from_millis(100) && d <= Duration::from_millis(300));
        }
    }

    #[test]
    fn test_custom_delay_fn_follows_sequence() {
        let scheduler = ResponseScheduler::with_delay_fn(
            Box::new(|n| Duration::from_millis(10 * n)),
            DEFAULT_RESPONSE_TIMEOUT,
        );
        assert_eq!(scheduler.next_delay(), Duration::ZERO);
        assert_eq!(scheduler.next_delay(), Duration::from_millis(10));
        assert_eq!(scheduler.next_delay(), Duration::from_millis(20));
        assert_eq!(format!("{:?}", scheduler.latency()), "Custom(..)");
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_waits_for_delay() {
        let scheduler = ResponseScheduler::new(
            Latency::Fixed(Duration::from_millis(200)),
            DEFAULT_RESPONSE_TIMEOUT,
        );
        let start = Instant::now();
        let reply = scheduler.schedule(async { "R1".to_string() }, "F").await;
        assert_eq!(reply, "R1");
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_timeout_downgrades_to_fallback() {
        let scheduler = ResponseScheduler::new(
            Latency::Fixed(Duration::ZERO),
            Duration::from_millis(500),
        );
        let reply = scheduler.schedule(future::pending::<String>(), "F").await;
        assert_eq!(reply, "F");
    }

    #[tokio::test]
    async fn test_schedule_blank_reply_uses_fallback() {
        let scheduler = ResponseScheduler::immediate();
        let reply = scheduler.schedule(async { "  ".to_string() }, "F").await;
        assert_eq!(reply, "F");
    }
}

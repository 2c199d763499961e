//! Reconnection Policy
//!
//! Delay policy for re-establishing the WebSocket session after a close or
//! transport error. The defaults implement the feed's required behavior:
//! a fixed 500 ms wait between attempts, no growth, unlimited retries.
//! Exponential backoff with jitter is available through configuration.

use std::time::Duration;

use rand::Rng;

/// Configuration for reconnection behavior.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt.
    pub initial_delay: Duration,
    /// Maximum delay between reconnection attempts.
    pub max_delay: Duration,
    /// Multiplier applied to the delay after each attempt (1.0 = fixed).
    pub multiplier: f64,
    /// Jitter factor as a fraction (e.g. 0.1 = ±10% randomization).
    pub jitter_factor: f64,
    /// Maximum number of reconnection attempts (0 = unlimited).
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            multiplier: 1.0,
            jitter_factor: 0.0,
            max_attempts: 0, // Unlimited
        }
    }
}

impl ReconnectConfig {
    /// Create configuration from [`WebSocketSettings`](crate::WebSocketSettings).
    #[must_use]
    pub const fn from_websocket_settings(settings: &crate::WebSocketSettings) -> Self {
        Self {
            initial_delay: settings.reconnect_delay_initial,
            max_delay: settings.reconnect_delay_max,
            multiplier: settings.reconnect_delay_multiplier,
            jitter_factor: 0.0,
            max_attempts: settings.max_reconnect_attempts,
        }
    }
}

/// Reconnection delay policy.
///
/// Each call to [`next_delay`](Self::next_delay) yields the wait before the
/// next connect attempt, or `None` once the attempt budget is exhausted.
#[derive(Debug)]
pub struct ReconnectPolicy {
    config: ReconnectConfig,
    current_delay: Duration,
    attempt_count: u32,
}

impl ReconnectPolicy {
    /// Create a new reconnection policy.
    #[must_use]
    pub const fn new(config: ReconnectConfig) -> Self {
        let initial_delay = config.initial_delay;
        Self {
            config,
            current_delay: initial_delay,
            attempt_count: 0,
        }
    }

    /// Get the next delay, or `None` if max attempts have been exceeded.
    #[must_use]
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.config.max_attempts > 0 && self.attempt_count >= self.config.max_attempts {
            return None;
        }

        self.attempt_count += 1;
        let delay = self.apply_jitter(self.current_delay);

        self.current_delay = self
            .current_delay
            .mul_f64(self.config.multiplier.max(0.0))
            .min(self.config.max_delay);

        Some(delay)
    }

    /// Reset the policy after a successful connection.
    pub const fn reset(&mut self) {
        self.current_delay = self.config.initial_delay;
        self.attempt_count = 0;
    }

    /// Get the current attempt count.
    #[must_use]
    pub const fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    fn apply_jitter(&self, duration: Duration) -> Duration {
        if self.config.jitter_factor <= 0.0 {
            return duration;
        }

        let jitter_range = duration.as_secs_f64() * self.config.jitter_factor;
        let jitter: f64 = rand::rng().random_range(-jitter_range..=jitter_range);
        Duration::from_secs_f64((duration.as_secs_f64() + jitter).max(0.001))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_fixed_half_second_unlimited() {
        let mut policy = ReconnectPolicy::new(ReconnectConfig::default());

        for _ in 0..100 {
            assert_eq!(policy.next_delay(), Some(Duration::from_millis(500)));
        }
        assert_eq!(policy.attempt_count(), 100);
    }

    #[test]
    fn exponential_backoff_when_configured() {
        let mut policy = ReconnectPolicy::new(ReconnectConfig {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter_factor: 0.0,
            max_attempts: 0,
        });

        assert_eq!(policy.next_delay(), Some(Duration::from_millis(100)));
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(200)));
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(400)));
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(800)));
    }

    #[test]
    fn delay_capped_at_max() {
        let mut policy = ReconnectPolicy::new(ReconnectConfig {
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(2000),
            multiplier: 4.0,
            jitter_factor: 0.0,
            max_attempts: 0,
        });

        let _ = policy.next_delay();
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(2000)));
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(2000)));
    }

    #[test]
    fn max_attempts_exhausts() {
        let mut policy = ReconnectPolicy::new(ReconnectConfig {
            max_attempts: 3,
            ..Default::default()
        });

        assert!(policy.next_delay().is_some());
        assert!(policy.next_delay().is_some());
        assert!(policy.next_delay().is_some());
        assert!(policy.next_delay().is_none());
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut policy = ReconnectPolicy::new(ReconnectConfig {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter_factor: 0.0,
            max_attempts: 3,
        });

        let _ = policy.next_delay();
        let _ = policy.next_delay();
        assert_eq!(policy.attempt_count(), 2);

        policy.reset();
        assert_eq!(policy.attempt_count(), 0);
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(100)));
    }

    #[test]
    fn jitter_stays_within_bounds() {
        for _ in 0..100 {
            let mut policy = ReconnectPolicy::new(ReconnectConfig {
                initial_delay: Duration::from_millis(1000),
                max_delay: Duration::from_secs(10),
                multiplier: 1.0,
                jitter_factor: 0.1,
                max_attempts: 0,
            });

            let millis = policy.next_delay().unwrap().as_millis();
            assert!((900..=1100).contains(&millis), "delay {millis}ms out of bounds");
        }
    }
}

use std::time::Duration;

const MIN_FACTOR: f64 = 1.0;

/// How the interval multiplier grows on empty or failed polls.
#[derive(Debug, Clone, Copy)]
pub enum BackoffPolicy {
    /// Factor multiplies per event, capped. Used by the generic feed
    /// schedulers.
    Multiplicative { growth: f64, max_factor: f64 },
    /// Factor grows by a fixed step per event, capped. Used by the
    /// notification engine: slow bounded idling, instant reset on a burst.
    Additive { step: f64, max_factor: f64 },
}

impl BackoffPolicy {
    pub fn default_multiplicative() -> Self {
        BackoffPolicy::Multiplicative {
            growth: 2.0,
            max_factor: 8.0,
        }
    }

    pub fn default_additive() -> Self {
        BackoffPolicy::Additive {
            step: 0.5,
            max_factor: 5.0,
        }
    }
}

/// Tracks the interval multiplier and the consecutive-failure count for
/// one scheduler. Empty polls grow the factor but are not failures; only
/// failed polls drive the status projection.
#[derive(Debug, Clone)]
pub struct BackoffState {
    policy: BackoffPolicy,
    factor: f64,
    consecutive_failures: u32,
}

impl BackoffState {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            policy,
            factor: MIN_FACTOR,
            consecutive_failures: 0,
        }
    }

    /// A poll that yielded data: clears failures and resets the factor.
    pub fn record_data(&mut self) {
        self.consecutive_failures = 0;
        self.factor = MIN_FACTOR;
    }

    /// A successful but empty poll: clears failures, grows the factor.
    pub fn record_empty(&mut self) {
        self.consecutive_failures = 0;
        self.grow();
    }

    /// A failed poll: counts toward status projection, grows the factor.
    pub fn record_failure(&mut self) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.grow();
    }

    fn grow(&mut self) {
        self.factor = match self.policy {
            BackoffPolicy::Multiplicative { growth, max_factor } => {
                (self.factor * growth).min(max_factor)
            }
            BackoffPolicy::Additive { step, max_factor } => (self.factor + step).min(max_factor),
        };
    }

    pub fn current_delay(&self, base: Duration) -> Duration {
        base.mul_f64(self.factor)
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = BackoffState::new(BackoffPolicy::default_multiplicative());
        assert!((state.factor() - 1.0).abs() < f64::EPSILON);
        assert_eq!(state.consecutive_failures(), 0);
        assert_eq!(
            state.current_delay(Duration::from_secs(10)),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn test_multiplicative_growth_and_cap() {
        let mut state = BackoffState::new(BackoffPolicy::Multiplicative {
            growth: 2.0,
            max_factor: 8.0,
        });

        state.record_failure();
        assert!((state.factor() - 2.0).abs() < f64::EPSILON);

        state.record_failure();
        assert!((state.factor() - 4.0).abs() < f64::EPSILON);

        for _ in 0..10 {
            state.record_failure();
        }
        assert!((state.factor() - 8.0).abs() < f64::EPSILON);
        assert_eq!(state.consecutive_failures(), 12);
    }

    #[test]
    fn test_additive_growth_and_cap() {
        let mut state = BackoffState::new(BackoffPolicy::Additive {
            step: 0.5,
            max_factor: 5.0,
        });

        state.record_empty();
        assert!((state.factor() - 1.5).abs() < f64::EPSILON);

        state.record_empty();
        assert!((state.factor() - 2.0).abs() < f64::EPSILON);

        for _ in 0..20 {
            state.record_empty();
        }
        assert!((state.factor() - 5.0).abs() < f64::EPSILON);
        // empty polls are not failures
        assert_eq!(state.consecutive_failures(), 0);
    }

    #[test]
    fn test_data_resets_factor_and_failures() {
        let mut state = BackoffState::new(BackoffPolicy::default_multiplicative());
        state.record_failure();
        state.record_failure();
        state.record_failure();
        assert_eq!(state.consecutive_failures(), 3);
        assert!(state.factor() > 1.0);

        state.record_data();
        assert_eq!(state.consecutive_failures(), 0);
        assert!((state.factor() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_clears_failures_but_keeps_backoff() {
        let mut state = BackoffState::new(BackoffPolicy::default_multiplicative());
        state.record_failure();
        state.record_failure();
        let factor_after_failures = state.factor();

        state.record_empty();
        assert_eq!(state.consecutive_failures(), 0);
        assert!(state.factor() >= factor_after_failures);
    }
}

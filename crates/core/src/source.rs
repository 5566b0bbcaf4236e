//! Clock and token sources injected into the paginate cache.

use rand::Rng;
use rand::distr::Alphanumeric;

/// Wall clock reading in epoch seconds.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> i64;
}

/// Opaque, unpredictable token strings of a fixed length.
pub trait TokenGenerator: Send + Sync {
    fn generate(&self, length: usize) -> String;
}

/// [`TimeSource`] backed by the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// [`TokenGenerator`] drawing alphanumeric characters from the thread-local CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureRandom;

impl TokenGenerator for SecureRandom {
    fn generate(&self, length: usize) -> String {
        rand::rng()
            .sample_iter(Alphanumeric)
            .take(length)
            .map(char::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_random_length_and_charset() {
        let token = SecureRandom.generate(32);
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(SecureRandom.generate(0).is_empty());
    }

    #[test]
    fn test_secure_random_distinct() {
        assert_ne!(SecureRandom.generate(32), SecureRandom.generate(32));
    }

    #[test]
    fn test_system_clock_is_epoch_seconds() {
        let now = SystemClock.now();
        // 2020-01-01T00:00:00Z
        assert!(now > 1_577_836_800);
    }
}

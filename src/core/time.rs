//! Time provider abstraction for testable time-dependent logic

#[cfg(test)]
use std::sync::{Arc, Mutex};
#[cfg(test)]
use std::time::Duration;
use std::time::SystemTime;

/// Abstraction over system time for testable time-dependent logic
pub trait TimeProvider: Send + Sync {
    /// Get the current system time (for timestamps and expiry checks)
    fn system_time(&self) -> SystemTime;
}

/// Production time provider using actual system time
#[derive(Debug, Default, Clone)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn system_time(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Mock time provider for deterministic testing
#[derive(Clone)]
#[cfg(test)]
pub struct MockTimeProvider {
    current_system_time: Arc<Mutex<SystemTime>>,
}

#[cfg(test)]
impl MockTimeProvider {
    /// Create a new mock time provider starting at the current time
    pub fn new() -> Self {
        Self {
            current_system_time: Arc::new(Mutex::new(SystemTime::now())),
        }
    }

    /// Advance the mock clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut time = self.current_system_time.lock().unwrap();
        *time += duration;
    }
}

#[cfg(test)]
impl TimeProvider for MockTimeProvider {
    fn system_time(&self) -> SystemTime {
        *self.current_system_time.lock().unwrap()
    }
}

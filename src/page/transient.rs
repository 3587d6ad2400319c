use std::time::{Duration, Instant};

/// How long the error banner stays up.
pub const BANNER_TTL: Duration = Duration::from_secs(5);
/// How long the copy control shows its success state.
pub const COPY_FEEDBACK_TTL: Duration = Duration::from_secs(2);

/// A UI element that switches itself off after a fixed delay.
///
/// Re-arming replaces the previous deadline, so a new error restarts the
/// banner's five seconds.
#[derive(Debug, Clone)]
pub struct Transient {
    ttl: Duration,
    expires_at: Option<Instant>,
}

impl Transient {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            expires_at: None,
        }
    }

    pub fn arm(&mut self, now: Instant) {
        self.expires_at = Some(now + self.ttl);
    }

    pub fn disarm(&mut self) {
        self.expires_at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.expires_at.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.expires_at
    }

    /// Returns true exactly once, on the first call at or after the deadline.
    pub fn take_expired(&mut self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) if now >= deadline => {
                self.expires_at = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_once_after_ttl() {
        let start = Instant::now();
        let mut t = Transient::new(Duration::from_secs(5));
        assert!(!t.take_expired(start));

        t.arm(start);
        assert!(!t.take_expired(start + Duration::from_secs(4)));
        assert!(t.take_expired(start + Duration::from_secs(5)));
        assert!(!t.take_expired(start + Duration::from_secs(6)));
    }

    #[test]
    fn rearming_pushes_deadline() {
        let start = Instant::now();
        let mut t = Transient::new(Duration::from_secs(5));
        t.arm(start);
        t.arm(start + Duration::from_secs(3));
        assert!(!t.take_expired(start + Duration::from_secs(6)));
        assert!(t.take_expired(start + Duration::from_secs(8)));
    }
}

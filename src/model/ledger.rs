use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

///
/// Failed OTP attempts for the current validation cycle, and any block they caused.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct LedgerEntry {
    pub user_id: String,
    pub attempts: u32,
    pub blocked_until: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(user_id: &str, now: DateTime<Utc>) -> Self {
        LedgerEntry {
            user_id: user_id.to_string(),
            attempts: 0,
            blocked_until: None,
            updated_at: now,
        }
    }

    ///
    /// How much longer the user must wait, if they are blocked right now.
    ///
    pub fn blocked_for(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self.blocked_until {
            Some(until) if now < until => Some(until - now),
            _ => None,
        }
    }

    ///
    /// Once a block has lapsed the whole entry is void and the attempt cycle starts again.
    ///
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        match self.blocked_until {
            Some(until) => now < until,
            None => true,
        }
    }

    ///
    /// Count one more failure, blocking the user if this reaches the limit. A lapsed entry
    /// restarts from zero.
    ///
    pub fn record_failure(&mut self, now: DateTime<Utc>, max_attempts: u32, block_for: Duration) {
        if !self.is_live(now) {
            self.attempts = 0;
            self.blocked_until = None;
        }

        self.attempts += 1;
        self.updated_at = now;

        if self.attempts >= max_attempts {
            self.blocked_until = Some(now + block_for);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.ymd(2024, 3, 1).and_hms(12, 0, 0)
    }

    #[test]
    fn test_third_failure_blocks() {
        let mut entry = LedgerEntry::new("u1", noon());
        entry.record_failure(noon(), 3, Duration::hours(1));
        entry.record_failure(noon(), 3, Duration::hours(1));
        assert_eq!(entry.blocked_for(noon()), None);

        entry.record_failure(noon(), 3, Duration::hours(1));
        assert_eq!(entry.attempts, 3);
        assert_eq!(entry.blocked_for(noon()), Some(Duration::hours(1)));
        assert_eq!(entry.blocked_for(noon() + Duration::minutes(59)), Some(Duration::minutes(1)));
    }

    #[test]
    fn test_lapsed_block_restarts_the_cycle() {
        let mut entry = LedgerEntry::new("u1", noon());
        for _ in 0..3 {
            entry.record_failure(noon(), 3, Duration::hours(1));
        }

        let later = noon() + Duration::hours(1);
        assert!(!entry.is_live(later));
        assert_eq!(entry.blocked_for(later), None);

        entry.record_failure(later, 3, Duration::hours(1));
        assert_eq!(entry.attempts, 1);
        assert_eq!(entry.blocked_until, None);
    }
}

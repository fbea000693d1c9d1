use chrono::{DateTime, Utc};

///
/// An overridable clock - integration tests fix it to time-travel through OTP expiry and blocks.
///
/// All instants handed out are UTC so every stored timestamp is compared in one zone.
///
#[derive(Debug, Default)]
pub struct TimeProvider {
    fixed: Option<DateTime<Utc>>
}

impl TimeProvider {
    pub fn now(&self) -> DateTime<Utc> {
        match self.fixed {
            Some(fixed) => fixed,
            None => Utc::now()
        }
    }

    pub fn fix(&mut self, fixed: Option<DateTime<Utc>>) {
        self.fixed = fixed;
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed.is_some()
    }
}

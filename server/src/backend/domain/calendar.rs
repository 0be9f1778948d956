//! Calendar access for the reward engine.
//!
//! Allocation and ledger logic never read the wall clock themselves. They take
//! a `MonthKey` or a date string explicitly, and the scheduler asks a `Clock`
//! for "today". Tests inject a `FixedClock`.

use chrono::{Local, NaiveDate};
use std::sync::{Mutex, PoisonError};

use crate::backend::domain::models::MonthKey;

pub trait Clock: Send + Sync {
    fn today_date(&self) -> NaiveDate;

    /// Today as `YYYY-MM-DD`
    fn today(&self) -> String {
        self.today_date().format("%Y-%m-%d").to_string()
    }

    fn current_month_key(&self) -> MonthKey {
        MonthKey::from_date(self.today_date())
    }

    fn days_in_month(&self, month: MonthKey) -> u32 {
        month.days_in_month()
    }
}

/// Local server time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today_date(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock that stays on one date until moved
#[derive(Debug)]
pub struct FixedClock {
    date: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Mutex::new(date),
        }
    }

    /// Clock fixed at the given calendar day; out-of-range dates fall back to the Unix epoch day
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Self {
        Self::new(NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default())
    }

    pub fn advance_days(&self, days: u64) {
        let mut date = self.date.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(next) = date.checked_add_days(chrono::Days::new(days)) {
            *date = next;
        }
    }
}

impl Clock for FixedClock {
    fn today_date(&self) -> NaiveDate {
        *self.date.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

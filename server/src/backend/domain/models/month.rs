//! Domain model for the (year, month) partition key.
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::reward::RewardError;

/// Identifies one allocation/ledger partition. Serialized as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, RewardError> {
        if !(1..=12).contains(&month) {
            return Err(RewardError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Number of days in this month (28-31)
    pub fn days_in_month(&self) -> u32 {
        match self.month {
            2 => {
                if self.is_leap_year() {
                    29
                } else {
                    28
                }
            }
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    pub fn is_leap_year(&self) -> bool {
        let year = self.year;
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    /// Whether `day` (1-based) is a calendar day of this month
    pub fn contains_day(&self, day: u32) -> bool {
        day >= 1 && day <= self.days_in_month()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = RewardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RewardError::InvalidMonthKey(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        MonthKey::new(year, month)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = RewardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_in_month() {
        assert_eq!(MonthKey::new(2025, 1).unwrap().days_in_month(), 31);
        assert_eq!(MonthKey::new(2025, 4).unwrap().days_in_month(), 30);
        assert_eq!(MonthKey::new(2025, 2).unwrap().days_in_month(), 28);
        assert_eq!(MonthKey::new(2024, 2).unwrap().days_in_month(), 29);
        assert_eq!(MonthKey::new(1900, 2).unwrap().days_in_month(), 28);
        assert_eq!(MonthKey::new(2000, 2).unwrap().days_in_month(), 29);
    }

    #[test]
    fn test_invalid_month_is_rejected() {
        assert_eq!(MonthKey::new(2025, 0), Err(RewardError::InvalidMonth(0)));
        assert_eq!(MonthKey::new(2025, 13), Err(RewardError::InvalidMonth(13)));
    }

    #[test]
    fn test_parse_and_format() {
        let key: MonthKey = "2026-03".parse().unwrap();
        assert_eq!(key, MonthKey { year: 2026, month: 3 });
        assert_eq!(key.to_string(), "2026-03");
        assert!("2026".parse::<MonthKey>().is_err());
        assert!("2026-xx".parse::<MonthKey>().is_err());
        assert!("2026-13".parse::<MonthKey>().is_err());
    }

    #[test]
    fn test_from_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(MonthKey::from_date(date), MonthKey::new(2026, 10).unwrap());
    }

    #[test]
    fn test_contains_day() {
        let feb = MonthKey::new(2025, 2).unwrap();
        assert!(!feb.contains_day(0));
        assert!(feb.contains_day(1));
        assert!(feb.contains_day(28));
        assert!(!feb.contains_day(29));
    }

    #[test]
    fn test_serializes_as_string() {
        let key = MonthKey::new(2026, 10).unwrap();
        let yaml = serde_yaml::to_string(&key).unwrap();
        assert_eq!(yaml.trim(), "2026-10");
        let parsed: MonthKey = serde_yaml::from_str("2026-10").unwrap();
        assert_eq!(parsed, key);
    }
}

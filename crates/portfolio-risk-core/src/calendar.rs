//! Calendar quarters used to bucket cash flows.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::defaults::EARLIEST_USABLE_YEAR;

/// A calendar quarter, Q1 = Jan–Mar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FiscalQuarter {
    pub year: i32,
    /// 1..=4
    pub quarter: u32,
}

impl FiscalQuarter {
    /// The quarter a date falls in.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            quarter: date.month0() / 3 + 1,
        }
    }

    /// Move forward (positive) or backward (negative) by whole quarters.
    pub fn shift(self, quarters: i32) -> Self {
        let index = self.year * 4 + (self.quarter as i32 - 1) + quarters;
        Self {
            year: index.div_euclid(4),
            quarter: index.rem_euclid(4) as u32 + 1,
        }
    }

    pub fn start_date(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, (self.quarter - 1) * 3 + 1, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last calendar day of the quarter, inclusive.
    pub fn end_date(self) -> NaiveDate {
        self.shift(1)
            .start_date()
            .pred_opt()
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date >= self.start_date() && date <= self.end_date()
    }

    /// `{year}-Q{n}`
    pub fn key(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FiscalQuarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-Q{}", self.year, self.quarter)
    }
}

/// Dates before the epoch come from corrupt or placeholder data.
pub fn is_usable_date(date: NaiveDate) -> bool {
    date.year() >= EARLIEST_USABLE_YEAR
}

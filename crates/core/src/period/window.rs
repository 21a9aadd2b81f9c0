//! Half-open date windows for today, this week, and this month.

use chrono::{Datelike, Months, NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

/// A half-open range of calendar dates, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    /// First date inside the window.
    pub start: NaiveDate,
    /// First date after the window.
    pub end: NaiveDate,
}

impl DateWindow {
    /// Creates a window; `end` is exclusive.
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Returns true if the date falls within `[start, end)`.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    /// Number of days covered.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days().max(0)
    }

    /// The window of identical length that ends where this one starts.
    #[must_use]
    pub fn preceding(&self) -> Self {
        Self {
            start: shift_days(self.start, -self.days()),
            end: self.start,
        }
    }
}

/// Dashboard reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// The current calendar day.
    Today,
    /// The current ISO week, Monday first.
    Week,
    /// The current calendar month.
    Month,
}

impl Period {
    /// Window of this period containing `today`.
    #[must_use]
    pub fn window(self, today: NaiveDate) -> DateWindow {
        match self {
            Self::Today => DateWindow::new(today, shift_days(today, 1)),
            Self::Week => {
                let monday = shift_days(
                    today,
                    -i64::from(today.weekday().num_days_from_monday()),
                );
                DateWindow::new(monday, shift_days(monday, 7))
            }
            Self::Month => {
                let first = first_of_month(today);
                let next = first
                    .checked_add_months(Months::new(1))
                    .unwrap_or(NaiveDate::MAX);
                DateWindow::new(first, next)
            }
        }
    }

    /// Window immediately before [`window`](Self::window).
    ///
    /// Months use the preceding calendar month, so the two windows can differ
    /// in length.
    #[must_use]
    pub fn previous_window(self, today: NaiveDate) -> DateWindow {
        let current = self.window(today);
        match self {
            Self::Today | Self::Week => current.preceding(),
            Self::Month => DateWindow::new(
                current
                    .start
                    .checked_sub_months(Months::new(1))
                    .unwrap_or(NaiveDate::MIN),
                current.start,
            ),
        }
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    shift_days(date, -i64::from(date.day0()))
}

fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(TimeDelta::days(days))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

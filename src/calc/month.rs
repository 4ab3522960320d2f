use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

/// The (year, month) pair currently displayed in the grid. `month` is 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthCursor {
    pub year: i32,
    pub month: u32,
}

impl MonthCursor {
    pub fn new(year: i32, month: u32) -> Self {
        // Normalize out-of-range months the same way `shift` does.
        MonthCursor { year, month: 1 }.shift(month as i32 - 1)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        MonthCursor {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Moves the cursor by `months`, rolling the year over at either end.
    pub fn shift(self, months: i32) -> Self {
        let total = self.month as i32 - 1 + months;
        MonthCursor {
            year: self.year + total.div_euclid(12),
            month: (total.rem_euclid(12) + 1) as u32,
        }
    }

    pub fn next(self) -> Self {
        self.shift(1)
    }

    pub fn prev(self) -> Self {
        self.shift(-1)
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn days(self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Title shown above the grid, e.g. "February 2024".
    pub fn title(self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }

    /// Parses `YYYY-MM`.
    pub fn parse(s: &str) -> Option<Self> {
        let (y, m) = s.trim().split_once('-')?;
        let year = y.parse().ok()?;
        let month: u32 = m.parse().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(MonthCursor::new(year, month))
    }
}

/// First column of the month grid.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    /// Column index (0..7) of `day` in a grid starting on this weekday.
    pub fn offset(self, day: Weekday) -> u32 {
        match self {
            WeekStart::Sunday => day.num_days_from_sunday(),
            WeekStart::Monday => day.num_days_from_monday(),
        }
    }

    pub fn header(self) -> [&'static str; 7] {
        match self {
            WeekStart::Sunday => ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"],
            WeekStart::Monday => ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"],
        }
    }
}

/// Read-only source of the real current date and time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock pinned to one date. Time of day still follows the wall clock so
/// the header clock keeps ticking.
pub struct FixedClock {
    pub date: NaiveDate,
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.date.and_time(Local::now().time())
    }

    fn today(&self) -> NaiveDate {
        self.date
    }
}

pub fn date_key(year: i32, month: u32, day: u32) -> String {
    format!("{:04}-{:02}-{:02}", year, month, day)
}

pub(crate) fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let next = MonthCursor { year, month }.next();
    match (next.first_day(), NaiveDate::from_ymd_opt(year, month, 1)) {
        (Some(next_first), Some(first)) => next_first.signed_duration_since(first).num_days() as u32,
        _ => 0,
    }
}

/// Shifts `date` by whole months, clamping the day to the target month's length.
pub(crate) fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let target = MonthCursor::from_date(date).shift(months);
    let day = date.day().min(target.days());
    NaiveDate::from_ymd_opt(target.year, target.month, day).unwrap_or(date)
}

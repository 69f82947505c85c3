// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Calendar instants and the DATE / DATE-TIME grammar of RFC 5545
//! Sections 3.3.4 and 3.3.5.
//!
//! A [`Time`] is an opaque, totally ordered point on the proleptic Gregorian
//! calendar. It carries a "date only" flag and a UTC marker but no time zone:
//! all calendar math works on its own fields, never on ambient clock state.

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chumsky::extra::{self, ParserExtra};
use chumsky::input::ValueInput;
use chumsky::label::LabelError;
use chumsky::prelude::*;
use chumsky::span::SimpleSpan;
use jiff::ToSpan;
use jiff::civil::{Date, DateTime};

use crate::duration::Duration;
use crate::error::RecurrenceError;
use crate::grammar::{
    Expected, i8_0_1, i8_0_2, i8_0_3, i8_0_5, i8_0_9, i8_1_2, i8_1_9, i16_0_9, parse_complete,
};
use crate::rule::WeekDay;

/// A calendar instant, either a whole day or a date-time with second
/// precision.
///
/// Equality, ordering and hashing look at the calendar fields only; the
/// date-only and UTC flags are carried along but do not take part.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "TimeData", try_from = "TimeData")
)]
pub struct Time {
    civil: DateTime,
    is_date: bool,
    utc: bool,
}

impl Time {
    /// Creates a date-only instant.
    ///
    /// # Errors
    ///
    /// Fails when the date does not exist.
    pub fn date(year: i16, month: i8, day: i8) -> Result<Self, RecurrenceError> {
        let date = Date::new(year, month, day)
            .map_err(|_| RecurrenceError::InvalidTime(format!("{year:04}{month:02}{day:02}")))?;
        Ok(Self::from_civil_date(date))
    }

    /// Creates a floating date-time instant. A leap second 60 is contracted
    /// to 59.
    ///
    /// # Errors
    ///
    /// Fails when the date or the time of day does not exist.
    pub fn date_time(
        year: i16,
        month: i8,
        day: i8,
        hour: i8,
        minute: i8,
        second: i8,
    ) -> Result<Self, RecurrenceError> {
        DateTime::new(year, month, day, hour, minute, second.min(59), 0)
            .map(Self::from_civil)
            .map_err(|_| {
                RecurrenceError::InvalidTime(format!(
                    "{year:04}{month:02}{day:02}T{hour:02}{minute:02}{second:02}"
                ))
            })
    }

    /// Wraps a civil date-time as a floating date-time instant.
    #[must_use]
    pub const fn from_civil(civil: DateTime) -> Self {
        Self {
            civil,
            is_date: false,
            utc: false,
        }
    }

    /// Wraps a civil date as a date-only instant.
    #[must_use]
    pub fn from_civil_date(date: Date) -> Self {
        Self {
            civil: date.to_datetime(jiff::civil::Time::midnight()),
            is_date: true,
            utc: false,
        }
    }

    /// Returns a copy marked (or unmarked) as UTC.
    #[must_use]
    pub const fn with_utc(mut self, utc: bool) -> Self {
        self.utc = utc;
        self
    }

    /// Returns a copy at `date` keeping the time of day and the flags.
    #[must_use]
    pub fn with_date(self, date: Date) -> Self {
        Self {
            civil: date.to_datetime(self.civil.time()),
            ..self
        }
    }

    /// The underlying civil date-time.
    #[must_use]
    pub const fn civil(&self) -> DateTime {
        self.civil
    }

    /// The calendar date part.
    #[must_use]
    pub fn civil_date(&self) -> Date {
        self.civil.date()
    }

    /// Whether this instant denotes a whole day.
    #[must_use]
    pub const fn is_date(&self) -> bool {
        self.is_date
    }

    /// Whether this instant was written in UTC.
    #[must_use]
    pub const fn is_utc(&self) -> bool {
        self.utc
    }

    /// Year, e.g. 2012.
    #[must_use]
    pub fn year(&self) -> i16 {
        self.civil.year()
    }

    /// Month, 1-12.
    #[must_use]
    pub fn month(&self) -> i8 {
        self.civil.month()
    }

    /// Day of the month, 1-31.
    #[must_use]
    pub fn day(&self) -> i8 {
        self.civil.day()
    }

    /// Hour, 0-23.
    #[must_use]
    pub fn hour(&self) -> i8 {
        self.civil.hour()
    }

    /// Minute, 0-59.
    #[must_use]
    pub fn minute(&self) -> i8 {
        self.civil.minute()
    }

    /// Second, 0-59.
    #[must_use]
    pub fn second(&self) -> i8 {
        self.civil.second()
    }

    /// Day of the week.
    #[must_use]
    pub fn weekday(&self) -> WeekDay {
        self.civil.weekday().into()
    }

    /// Day of the year, 1-366.
    #[must_use]
    pub fn day_of_year(&self) -> i16 {
        self.civil.day_of_year()
    }

    /// Number of days in this instant's month.
    #[must_use]
    pub fn days_in_month(&self) -> i8 {
        days_in_month(self.year(), self.month())
    }

    /// Week-numbering year and week number for weeks starting on `wkst`.
    #[must_use]
    pub fn week_number(&self, wkst: WeekDay) -> (i16, i8) {
        week_of(self.civil_date(), wkst)
    }

    /// The first day of the week containing this instant, same time of day.
    #[must_use]
    pub fn start_of_week(&self, wkst: WeekDay) -> Self {
        self.with_date(start_of_week(self.civil_date(), wkst))
    }

    /// The `n`-th `weekday` of this instant's month, counting from the end
    /// when `n` is negative. Same time of day.
    #[must_use]
    pub fn nth_weekday(&self, weekday: WeekDay, n: i8) -> Option<Self> {
        self.civil_date()
            .nth_weekday_of_month(n, weekday.into())
            .ok()
            .map(|date| self.with_date(date))
    }

    /// Adds a signed duration. Date-only instants move by whole days.
    ///
    /// # Errors
    ///
    /// Fails when the result leaves the supported calendar range.
    pub fn add_duration(&self, duration: &Duration) -> Result<Self, RecurrenceError> {
        let span = if self.is_date {
            jiff::Span::new().try_days(duration.to_days())?
        } else {
            jiff::Span::new().try_seconds(duration.to_seconds())?
        };
        let civil = self.civil.checked_add(span)?;
        Ok(Self { civil, ..*self })
    }

    /// Signed duration from `other` to `self`.
    ///
    /// # Errors
    ///
    /// Fails when the distance cannot be represented.
    pub fn subtract(&self, other: &Self) -> Result<Duration, RecurrenceError> {
        let span = other.civil.until((jiff::Unit::Second, self.civil))?;
        Ok(Duration::from_seconds(span.get_seconds()))
    }

    /// Compares the date parts only.
    #[must_use]
    pub fn compare_date_only(&self, other: &Self) -> Ordering {
        self.civil_date().cmp(&other.civil_date())
    }
}

impl PartialEq for Time {
    fn eq(&self, other: &Self) -> bool {
        self.civil == other.civil
    }
}

impl Eq for Time {}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Time {
    fn cmp(&self, other: &Self) -> Ordering {
        self.civil.cmp(&other.civil)
    }
}

impl Hash for Time {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.civil.hash(state);
    }
}

impl Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}{:02}", self.year(), self.month(), self.day())?;
        if !self.is_date {
            write!(
                f,
                "T{:02}{:02}{:02}",
                self.hour(),
                self.minute(),
                self.second()
            )?;
            if self.utc {
                write!(f, "Z")?;
            }
        }
        Ok(())
    }
}

impl FromStr for Time {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_complete!(value_date_or_date_time::<'_, _, extra::Err<Rich<'_, char>>>(), s)
            .map_err(|_| RecurrenceError::InvalidTime(s.to_owned()))
    }
}

impl From<DateTime> for Time {
    fn from(civil: DateTime) -> Self {
        Self::from_civil(civil)
    }
}

impl From<Date> for Time {
    fn from(date: Date) -> Self {
        Self::from_civil_date(date)
    }
}

/// Field-wise form of [`Time`] used for structured snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeData {
    /// Year
    pub year: i16,
    /// Month, 1-12
    pub month: i8,
    /// Day, 1-31
    pub day: i8,
    /// Hour, 0-23
    #[cfg_attr(feature = "serde", serde(default))]
    pub hour: i8,
    /// Minute, 0-59
    #[cfg_attr(feature = "serde", serde(default))]
    pub minute: i8,
    /// Second, 0-59
    #[cfg_attr(feature = "serde", serde(default))]
    pub second: i8,
    /// Whether the instant is a whole day
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_date: bool,
    /// Whether the instant is in UTC
    #[cfg_attr(feature = "serde", serde(default))]
    pub utc: bool,
}

impl From<Time> for TimeData {
    fn from(time: Time) -> Self {
        Self {
            year: time.year(),
            month: time.month(),
            day: time.day(),
            hour: time.hour(),
            minute: time.minute(),
            second: time.second(),
            is_date: time.is_date,
            utc: time.utc,
        }
    }
}

impl TryFrom<TimeData> for Time {
    type Error = RecurrenceError;

    fn try_from(data: TimeData) -> Result<Self, Self::Error> {
        let time = if data.is_date {
            Self::date(data.year, data.month, data.day)?
        } else {
            Self::date_time(
                data.year,
                data.month,
                data.day,
                data.hour,
                data.minute,
                data.second,
            )?
        };
        Ok(time.with_utc(data.utc))
    }
}

/// Whether `year` is a leap year in the proleptic Gregorian calendar.
#[must_use]
pub fn is_leap_year(year: i16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` of `year`.
#[must_use]
pub fn days_in_month(year: i16, month: i8) -> i8 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Number of days in `year`.
#[must_use]
pub fn days_in_year(year: i16) -> i16 {
    if is_leap_year(year) { 366 } else { 365 }
}

/// Number of weeks in `year` for weeks starting on `wkst`.
///
/// December 28th always falls in the last week of its year.
#[must_use]
pub fn weeks_in_year(year: i16, wkst: WeekDay) -> i8 {
    Date::new(year, 12, 28).map_or(52, |date| week_of(date, wkst).1)
}

/// The first day of the week containing `date`.
#[must_use]
pub fn start_of_week(date: Date, wkst: WeekDay) -> Date {
    let offset = (date.weekday().to_sunday_zero_offset() - wkst.to_sunday_zero_offset() + 7) % 7;
    date.saturating_sub(i64::from(offset).days())
}

/// Week-numbering year and week number of `date`.
///
/// Week 1 is the first week, starting on `wkst`, that holds at least four
/// days of the year.
#[must_use]
pub fn week_of(date: Date, wkst: WeekDay) -> (i16, i8) {
    let midweek = start_of_week(date, wkst).saturating_add(3.days());
    let week = (midweek.day_of_year() - 1) / 7 + 1;
    (midweek.year(), i8::try_from(week).unwrap_or(53))
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// date               = date-value
///
/// date-value         = date-fullyear date-month date-mday
/// date-fullyear      = 4DIGIT
/// date-month         = 2DIGIT        ;01-12
/// date-mday          = 2DIGIT        ;01-28, 01-29, 01-30, 01-31
///                                    ;based on month/year
/// ```
fn value_date<'src, I, E>() -> impl Parser<'src, I, Date, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, Expected>,
{
    let year = i16_0_9()
        .then(i16_0_9())
        .then(i16_0_9())
        .then(i16_0_9())
        .map(|(((a, b), c), d)| 1000 * a + 100 * b + 10 * c + d);

    let month = choice((
        just('0').ignore_then(i8_1_9()),
        just('1').ignore_then(i8_0_2()).map(|b| 10 + b),
    ));

    let day = choice((
        just('0').ignore_then(i8_1_9()),
        i8_1_2().then(i8_0_9()).map(|(a, b)| 10 * a + b),
        just('3').ignore_then(i8_0_1()).map(|b| 30 + b),
    ));

    year.then(month)
        .then(day)
        .try_map(|((year, month), day), span| {
            Date::new(year, month, day)
                .map_err(|_| E::Error::expected_found([Expected::Date], None, span))
        })
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// time         = time-hour time-minute time-second [time-utc]
///
/// time-hour    = 2DIGIT        ;00-23
/// time-minute  = 2DIGIT        ;00-59
/// time-second  = 2DIGIT        ;00-60
/// ;The "60" value is used to account for positive "leap" seconds.
///
/// time-utc     = "Z"
/// ```
fn value_time<'src, I, E>() -> impl Parser<'src, I, (jiff::civil::Time, bool), E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, Expected>,
{
    let hour = choice((
        i8_0_1().then(i8_0_9()).map(|(a, b)| 10 * a + b),
        just('2').ignore_then(i8_0_3()).map(|b| 20 + b),
    ));
    let minute = i8_0_5().then(i8_0_9()).map(|(a, b)| 10 * a + b);
    let second = choice((
        i8_0_5().then(i8_0_9()).map(|(a, b)| 10 * a + b),
        just("60").to(60), // leap second
    ));

    hour.then(minute)
        .then(second)
        .then(just('Z').or_not())
        .try_map(|(((hour, minute), second), utc), span| {
            // NOTE: leap second 60 is contracted to 59
            jiff::civil::Time::new(hour, minute, second.min(59), 0)
                .map(|time| (time, utc.is_some()))
                .map_err(|_| E::Error::expected_found([Expected::Time], None, span))
        })
}

/// ```txt
/// date-time  = date "T" time ;As specified in the DATE and TIME
/// ```
fn value_date_time<'src, I, E>() -> impl Parser<'src, I, Time, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, Expected>,
{
    value_date()
        .then_ignore(just('T'))
        .then(value_time())
        .map(|(date, (time, utc))| Time::from_civil(date.to_datetime(time)).with_utc(utc))
}

/// ```txt
/// enddate     = date / date-time
/// ```
pub(crate) fn value_date_or_date_time<'src, I, E>() -> impl Parser<'src, I, Time, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, Expected>,
{
    choice((value_date_time(), value_date().map(Time::from_civil_date)))
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Recurrence rule model as defined in RFC 5545 Section 3.3.10.

mod data;
mod parser;

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::error::RecurrenceError;
use crate::iterator::RecurrenceIterator;
use crate::keyword::{
    KW_DAY_FR, KW_DAY_MO, KW_DAY_SA, KW_DAY_SU, KW_DAY_TH, KW_DAY_TU, KW_DAY_WE, KW_RRULE_COUNT,
    KW_RRULE_FREQ, KW_RRULE_FREQ_DAILY, KW_RRULE_FREQ_HOURLY, KW_RRULE_FREQ_MINUTELY,
    KW_RRULE_FREQ_MONTHLY, KW_RRULE_FREQ_SECONDLY, KW_RRULE_FREQ_WEEKLY, KW_RRULE_FREQ_YEARLY,
    KW_RRULE_INTERVAL, KW_RRULE_UNTIL, KW_RRULE_WKST,
};
use crate::time::Time;

pub use data::{PartData, PartValue, RecurrenceRuleData, WeekStartData};

/// A single recurrence rule.
///
/// Every by-part kind appears at most once and holds at least one value.
/// Values are kept in the order they were first given, without duplicates.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "RecurrenceRuleData", try_from = "RecurrenceRuleData")
)]
pub struct RecurrenceRule {
    freq: Frequency,
    interval: u32,
    wkst: WeekDay,
    bound: RecurrenceBound,
    parts: Vec<ByPart>,
    extensions: Vec<(String, String)>,
}

impl RecurrenceRule {
    /// Creates an unbounded rule with interval 1 and weeks starting on Monday.
    #[must_use]
    pub const fn new(freq: Frequency) -> Self {
        Self {
            freq,
            interval: 1,
            wkst: WeekDay::Monday,
            bound: RecurrenceBound::None,
            parts: Vec::new(),
            extensions: Vec::new(),
        }
    }

    /// Sets the interval; zero becomes 1.
    #[must_use]
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval.max(1);
        self
    }

    /// Bounds the rule by a number of occurrences.
    ///
    /// # Errors
    ///
    /// Fails when `count` is zero or the rule is already bounded by UNTIL.
    pub fn with_count(mut self, count: u32) -> Result<Self, RecurrenceError> {
        if count == 0 {
            return Err(RecurrenceError::InvalidCount(count.to_string()));
        }
        if matches!(self.bound, RecurrenceBound::Until(_)) {
            return Err(RecurrenceError::CountUntilExclusion);
        }
        self.bound = RecurrenceBound::Count(count);
        Ok(self)
    }

    /// Bounds the rule by an inclusive last instant.
    ///
    /// # Errors
    ///
    /// Fails when the rule is already bounded by COUNT.
    pub fn with_until(mut self, until: Time) -> Result<Self, RecurrenceError> {
        if matches!(self.bound, RecurrenceBound::Count(_)) {
            return Err(RecurrenceError::CountUntilExclusion);
        }
        self.bound = RecurrenceBound::Until(until);
        Ok(self)
    }

    /// Sets the day a week starts on.
    #[must_use]
    pub const fn with_wkst(mut self, wkst: WeekDay) -> Self {
        self.wkst = wkst;
        self
    }

    /// Adds or replaces a by-part.
    ///
    /// # Errors
    ///
    /// Fails when the part is empty or holds an out-of-range value.
    pub fn with_part(mut self, part: ByPart) -> Result<Self, RecurrenceError> {
        self.set_part(part)?;
        Ok(self)
    }

    /// Adds or replaces a by-part, returning the part it replaced.
    ///
    /// # Errors
    ///
    /// Fails when the part is empty or holds an out-of-range value.
    pub fn set_part(&mut self, part: ByPart) -> Result<Option<ByPart>, RecurrenceError> {
        let part = part.checked()?;
        match self.parts.iter_mut().find(|p| p.kind() == part.kind()) {
            Some(slot) => Ok(Some(std::mem::replace(slot, part))),
            None => {
                self.parts.push(part);
                Ok(None)
            }
        }
    }

    /// Removes a by-part.
    pub fn remove_part(&mut self, kind: ByPartKind) -> Option<ByPart> {
        let index = self.parts.iter().position(|p| p.kind() == kind)?;
        Some(self.parts.remove(index))
    }

    /// Adds an extension part that is carried along verbatim.
    pub fn set_extension(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_ascii_uppercase();
        let value = value.into();
        match self.extensions.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.extensions.push((name, value)),
        }
    }

    /// Frequency of the rule.
    #[must_use]
    pub const fn freq(&self) -> Frequency {
        self.freq
    }

    /// Interval between periods, at least 1.
    #[must_use]
    pub const fn interval(&self) -> u32 {
        self.interval
    }

    /// Day a week starts on.
    #[must_use]
    pub const fn wkst(&self) -> WeekDay {
        self.wkst
    }

    /// How the rule ends.
    #[must_use]
    pub const fn bound(&self) -> RecurrenceBound {
        self.bound
    }

    /// Maximum number of occurrences, if bounded by COUNT.
    #[must_use]
    pub const fn count(&self) -> Option<u32> {
        match self.bound {
            RecurrenceBound::Count(count) => Some(count),
            _ => None,
        }
    }

    /// Inclusive last instant, if bounded by UNTIL.
    #[must_use]
    pub const fn until(&self) -> Option<&Time> {
        match &self.bound {
            RecurrenceBound::Until(until) => Some(until),
            _ => None,
        }
    }

    /// By-parts in insertion order.
    #[must_use]
    pub fn parts(&self) -> &[ByPart] {
        &self.parts
    }

    /// The by-part of the given kind.
    #[must_use]
    pub fn part(&self, kind: ByPartKind) -> Option<&ByPart> {
        self.parts.iter().find(|p| p.kind() == kind)
    }

    /// Whether a by-part of the given kind is present.
    #[must_use]
    pub fn has_part(&self, kind: ByPartKind) -> bool {
        self.part(kind).is_some()
    }

    /// Unknown parts kept verbatim, in input order.
    #[must_use]
    pub fn extensions(&self) -> &[(String, String)] {
        &self.extensions
    }

    /// Whether the rule has a COUNT or an UNTIL.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        !matches!(self.bound, RecurrenceBound::None)
    }

    /// Whether the rule is bounded by COUNT.
    #[must_use]
    pub const fn is_by_count(&self) -> bool {
        matches!(self.bound, RecurrenceBound::Count(_))
    }

    /// Creates an iterator over the occurrences of this rule from `dtstart`.
    ///
    /// # Errors
    ///
    /// Fails when the by-parts do not fit the frequency.
    pub fn iterator(&self, dtstart: Time) -> Result<RecurrenceIterator, RecurrenceError> {
        RecurrenceIterator::new(self, dtstart)
    }

    /// The first occurrence strictly after `recurrence_id`, for a series
    /// anchored at `start`.
    ///
    /// # Errors
    ///
    /// Fails when the by-parts do not fit the frequency.
    pub fn next_occurrence(
        &self,
        start: Time,
        recurrence_id: Time,
    ) -> Result<Option<Time>, RecurrenceError> {
        let mut iter = self.iterator(start)?;
        Ok(iter.find(|occurrence| *occurrence > recurrence_id))
    }

    /// Values of BYSECOND, empty if absent.
    #[must_use]
    pub fn by_second(&self) -> &[u8] {
        match self.part(ByPartKind::BySecond) {
            Some(ByPart::BySecond(v)) => v,
            _ => &[],
        }
    }

    /// Values of BYMINUTE, empty if absent.
    #[must_use]
    pub fn by_minute(&self) -> &[u8] {
        match self.part(ByPartKind::ByMinute) {
            Some(ByPart::ByMinute(v)) => v,
            _ => &[],
        }
    }

    /// Values of BYHOUR, empty if absent.
    #[must_use]
    pub fn by_hour(&self) -> &[u8] {
        match self.part(ByPartKind::ByHour) {
            Some(ByPart::ByHour(v)) => v,
            _ => &[],
        }
    }

    /// Values of BYDAY, empty if absent.
    #[must_use]
    pub fn by_day(&self) -> &[WeekDayNum] {
        match self.part(ByPartKind::ByDay) {
            Some(ByPart::ByDay(v)) => v,
            _ => &[],
        }
    }

    /// Values of BYMONTHDAY, empty if absent.
    #[must_use]
    pub fn by_month_day(&self) -> &[i8] {
        match self.part(ByPartKind::ByMonthDay) {
            Some(ByPart::ByMonthDay(v)) => v,
            _ => &[],
        }
    }

    /// Values of BYYEARDAY, empty if absent.
    #[must_use]
    pub fn by_year_day(&self) -> &[i16] {
        match self.part(ByPartKind::ByYearDay) {
            Some(ByPart::ByYearDay(v)) => v,
            _ => &[],
        }
    }

    /// Values of BYWEEKNO, empty if absent.
    #[must_use]
    pub fn by_week_no(&self) -> &[i8] {
        match self.part(ByPartKind::ByWeekNo) {
            Some(ByPart::ByWeekNo(v)) => v,
            _ => &[],
        }
    }

    /// Values of BYMONTH, empty if absent.
    #[must_use]
    pub fn by_month(&self) -> &[u8] {
        match self.part(ByPartKind::ByMonth) {
            Some(ByPart::ByMonth(v)) => v,
            _ => &[],
        }
    }

    /// Values of BYSETPOS, empty if absent.
    #[must_use]
    pub fn by_set_pos(&self) -> &[i16] {
        match self.part(ByPartKind::BySetPos) {
            Some(ByPart::BySetPos(v)) => v,
            _ => &[],
        }
    }
}

/// Rules are equal when their fields are; by-parts compare regardless of
/// the order they were added in.
impl PartialEq for RecurrenceRule {
    fn eq(&self, other: &Self) -> bool {
        self.freq == other.freq
            && self.interval == other.interval
            && self.wkst == other.wkst
            && self.bound == other.bound
            && self.extensions == other.extensions
            && self.parts.len() == other.parts.len()
            && self
                .parts
                .iter()
                .all(|part| other.part(part.kind()) == Some(part))
    }
}

impl Eq for RecurrenceRule {}

impl FromStr for RecurrenceRule {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse_rule(s)
    }
}

/// Canonical form: FREQ, COUNT, INTERVAL, by-parts, UNTIL, WKST, extensions.
impl Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{KW_RRULE_FREQ}={}", self.freq)?;
        if let RecurrenceBound::Count(count) = self.bound {
            write!(f, ";{KW_RRULE_COUNT}={count}")?;
        }
        if self.interval > 1 {
            write!(f, ";{KW_RRULE_INTERVAL}={}", self.interval)?;
        }
        for part in &self.parts {
            write!(f, ";{part}")?;
        }
        if let RecurrenceBound::Until(until) = &self.bound {
            write!(f, ";{KW_RRULE_UNTIL}={until}")?;
        }
        if self.wkst != WeekDay::Monday {
            write!(f, ";{KW_RRULE_WKST}={}", self.wkst)?;
        }
        for (name, value) in &self.extensions {
            write!(f, ";{name}={value}")?;
        }
        Ok(())
    }
}

/// How a rule ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecurrenceBound {
    /// No end, the rule recurs forever.
    #[default]
    None,
    /// End after this many occurrences.
    Count(u32),
    /// End after this instant, inclusive.
    Until(Time),
}

/// Recurrence frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[expect(missing_docs)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Whether the period is shorter than a day.
    #[must_use]
    pub const fn is_sub_daily(self) -> bool {
        matches!(self, Self::Secondly | Self::Minutely | Self::Hourly)
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Secondly => write!(f, "{KW_RRULE_FREQ_SECONDLY}"),
            Frequency::Minutely => write!(f, "{KW_RRULE_FREQ_MINUTELY}"),
            Frequency::Hourly => write!(f, "{KW_RRULE_FREQ_HOURLY}"),
            Frequency::Daily => write!(f, "{KW_RRULE_FREQ_DAILY}"),
            Frequency::Weekly => write!(f, "{KW_RRULE_FREQ_WEEKLY}"),
            Frequency::Monthly => write!(f, "{KW_RRULE_FREQ_MONTHLY}"),
            Frequency::Yearly => write!(f, "{KW_RRULE_FREQ_YEARLY}"),
        }
    }
}

impl FromStr for Frequency {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            KW_RRULE_FREQ_SECONDLY => Ok(Self::Secondly),
            KW_RRULE_FREQ_MINUTELY => Ok(Self::Minutely),
            KW_RRULE_FREQ_HOURLY => Ok(Self::Hourly),
            KW_RRULE_FREQ_DAILY => Ok(Self::Daily),
            KW_RRULE_FREQ_WEEKLY => Ok(Self::Weekly),
            KW_RRULE_FREQ_MONTHLY => Ok(Self::Monthly),
            KW_RRULE_FREQ_YEARLY => Ok(Self::Yearly),
            _ => Err(RecurrenceError::InvalidFrequency(s.to_owned())),
        }
    }
}

/// Day of the week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[expect(missing_docs)]
pub enum WeekDay {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl WeekDay {
    /// Numeric form with Sunday as 1 and Saturday as 7.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Sunday => 1,
            Self::Monday => 2,
            Self::Tuesday => 3,
            Self::Wednesday => 4,
            Self::Thursday => 5,
            Self::Friday => 6,
            Self::Saturday => 7,
        }
    }

    /// Inverse of [`WeekDay::number`].
    #[must_use]
    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::Sunday),
            2 => Some(Self::Monday),
            3 => Some(Self::Tuesday),
            4 => Some(Self::Wednesday),
            5 => Some(Self::Thursday),
            6 => Some(Self::Friday),
            7 => Some(Self::Saturday),
            _ => None,
        }
    }

    /// Days since Sunday, 0-6.
    #[must_use]
    #[expect(clippy::cast_possible_wrap)]
    pub const fn to_sunday_zero_offset(self) -> i8 {
        self.number() as i8 - 1
    }
}

impl From<jiff::civil::Weekday> for WeekDay {
    fn from(weekday: jiff::civil::Weekday) -> Self {
        use jiff::civil::Weekday;
        match weekday {
            Weekday::Sunday => Self::Sunday,
            Weekday::Monday => Self::Monday,
            Weekday::Tuesday => Self::Tuesday,
            Weekday::Wednesday => Self::Wednesday,
            Weekday::Thursday => Self::Thursday,
            Weekday::Friday => Self::Friday,
            Weekday::Saturday => Self::Saturday,
        }
    }
}

impl From<WeekDay> for jiff::civil::Weekday {
    fn from(weekday: WeekDay) -> Self {
        match weekday {
            WeekDay::Sunday => Self::Sunday,
            WeekDay::Monday => Self::Monday,
            WeekDay::Tuesday => Self::Tuesday,
            WeekDay::Wednesday => Self::Wednesday,
            WeekDay::Thursday => Self::Thursday,
            WeekDay::Friday => Self::Friday,
            WeekDay::Saturday => Self::Saturday,
        }
    }
}

impl Display for WeekDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekDay::Sunday => write!(f, "{KW_DAY_SU}"),
            WeekDay::Monday => write!(f, "{KW_DAY_MO}"),
            WeekDay::Tuesday => write!(f, "{KW_DAY_TU}"),
            WeekDay::Wednesday => write!(f, "{KW_DAY_WE}"),
            WeekDay::Thursday => write!(f, "{KW_DAY_TH}"),
            WeekDay::Friday => write!(f, "{KW_DAY_FR}"),
            WeekDay::Saturday => write!(f, "{KW_DAY_SA}"),
        }
    }
}

impl FromStr for WeekDay {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            KW_DAY_SU => Ok(Self::Sunday),
            KW_DAY_MO => Ok(Self::Monday),
            KW_DAY_TU => Ok(Self::Tuesday),
            KW_DAY_WE => Ok(Self::Wednesday),
            KW_DAY_TH => Ok(Self::Thursday),
            KW_DAY_FR => Ok(Self::Friday),
            KW_DAY_SA => Ok(Self::Saturday),
            _ => Err(RecurrenceError::InvalidWeekDay(s.to_owned())),
        }
    }
}

/// Day of week with optional occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeekDayNum {
    /// Day of the week
    pub day: WeekDay,
    /// Occurrence within the month or year, negative counts from the end
    pub occurrence: Option<i8>,
}

impl WeekDayNum {
    /// Every `day` of the period.
    #[must_use]
    pub const fn every(day: WeekDay) -> Self {
        Self {
            day,
            occurrence: None,
        }
    }

    /// The `n`-th `day` of the period.
    #[must_use]
    pub const fn nth(n: i8, day: WeekDay) -> Self {
        Self {
            day,
            occurrence: Some(n),
        }
    }
}

impl Display for WeekDayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.occurrence {
            write!(f, "{n}")?;
        }
        write!(f, "{}", self.day)
    }
}

impl FromStr for WeekDayNum {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse_weekdaynum(s).map_err(|reason| RecurrenceError::InvalidPartValue {
            part: ByPartKind::ByDay,
            token: s.to_owned(),
            reason,
        })
    }
}

/// Kind of a by-part, in the order RFC 5545 applies them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "UPPERCASE")
)]
#[expect(missing_docs)]
pub enum ByPartKind {
    #[strum(serialize = "BYSECOND")]
    BySecond,
    #[strum(serialize = "BYMINUTE")]
    ByMinute,
    #[strum(serialize = "BYHOUR")]
    ByHour,
    #[strum(serialize = "BYDAY")]
    ByDay,
    #[strum(serialize = "BYMONTHDAY")]
    ByMonthDay,
    #[strum(serialize = "BYYEARDAY")]
    ByYearDay,
    #[strum(serialize = "BYWEEKNO")]
    ByWeekNo,
    #[strum(serialize = "BYMONTH")]
    ByMonth,
    #[strum(serialize = "BYSETPOS")]
    BySetPos,
}

/// One by-part with its typed values.
#[derive(Debug, Clone, PartialEq, Eq)]
#[expect(missing_docs)]
pub enum ByPart {
    BySecond(Vec<u8>),
    ByMinute(Vec<u8>),
    ByHour(Vec<u8>),
    ByDay(Vec<WeekDayNum>),
    ByMonthDay(Vec<i8>),
    ByYearDay(Vec<i16>),
    ByWeekNo(Vec<i8>),
    ByMonth(Vec<u8>),
    BySetPos(Vec<i16>),
}

impl ByPart {
    /// Kind of this part.
    #[must_use]
    pub const fn kind(&self) -> ByPartKind {
        match self {
            Self::BySecond(_) => ByPartKind::BySecond,
            Self::ByMinute(_) => ByPartKind::ByMinute,
            Self::ByHour(_) => ByPartKind::ByHour,
            Self::ByDay(_) => ByPartKind::ByDay,
            Self::ByMonthDay(_) => ByPartKind::ByMonthDay,
            Self::ByYearDay(_) => ByPartKind::ByYearDay,
            Self::ByWeekNo(_) => ByPartKind::ByWeekNo,
            Self::ByMonth(_) => ByPartKind::ByMonth,
            Self::BySetPos(_) => ByPartKind::BySetPos,
        }
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::BySecond(v) | Self::ByMinute(v) | Self::ByHour(v) | Self::ByMonth(v) => v.len(),
            Self::ByMonthDay(v) | Self::ByWeekNo(v) => v.len(),
            Self::ByYearDay(v) | Self::BySetPos(v) => v.len(),
            Self::ByDay(v) => v.len(),
        }
    }

    /// Whether the part holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks value ranges and drops duplicates, keeping first occurrences.
    fn checked(self) -> Result<Self, RecurrenceError> {
        let kind = self.kind();
        let out_of_range = |token: String| RecurrenceError::InvalidPartValue {
            part: kind,
            token,
            reason: "value out of range".to_owned(),
        };
        if self.is_empty() {
            return Err(RecurrenceError::InvalidPartValue {
                part: kind,
                token: String::new(),
                reason: "empty value list".to_owned(),
            });
        }

        let part = match self {
            Self::BySecond(v) => Self::BySecond(unique(v)),
            Self::ByMinute(v) => Self::ByMinute(unique(v)),
            Self::ByHour(v) => Self::ByHour(unique(v)),
            Self::ByDay(v) => Self::ByDay(unique(v)),
            Self::ByMonthDay(v) => Self::ByMonthDay(unique(v)),
            Self::ByYearDay(v) => Self::ByYearDay(unique(v)),
            Self::ByWeekNo(v) => Self::ByWeekNo(unique(v)),
            Self::ByMonth(v) => Self::ByMonth(unique(v)),
            Self::BySetPos(v) => Self::BySetPos(unique(v)),
        };

        let bad = match &part {
            Self::BySecond(v) => v.iter().find(|&&n| n > 60).map(ToString::to_string),
            Self::ByMinute(v) => v.iter().find(|&&n| n > 59).map(ToString::to_string),
            Self::ByHour(v) => v.iter().find(|&&n| n > 23).map(ToString::to_string),
            Self::ByDay(v) => v
                .iter()
                .find(|d| d.occurrence.is_some_and(|n| n == 0 || n.unsigned_abs() > 53))
                .map(ToString::to_string),
            Self::ByMonthDay(v) => v
                .iter()
                .find(|&&n| n == 0 || n.unsigned_abs() > 31)
                .map(ToString::to_string),
            Self::ByYearDay(v) | Self::BySetPos(v) => v
                .iter()
                .find(|&&n| n == 0 || n.unsigned_abs() > 366)
                .map(ToString::to_string),
            Self::ByWeekNo(v) => v
                .iter()
                .find(|&&n| n == 0 || n.unsigned_abs() > 53)
                .map(ToString::to_string),
            Self::ByMonth(v) => v
                .iter()
                .find(|&&n| n == 0 || n > 12)
                .map(ToString::to_string),
        };
        match bad {
            Some(token) => Err(out_of_range(token)),
            None => Ok(part),
        }
    }
}

impl Display for ByPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join<T: Display>(f: &mut fmt::Formatter<'_>, values: &[T]) -> fmt::Result {
            for (i, v) in values.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{v}")?;
            }
            Ok(())
        }

        write!(f, "{}=", self.kind())?;
        match self {
            Self::BySecond(v) | Self::ByMinute(v) | Self::ByHour(v) | Self::ByMonth(v) => join(f, v),
            Self::ByMonthDay(v) | Self::ByWeekNo(v) => join(f, v),
            Self::ByYearDay(v) | Self::BySetPos(v) => join(f, v),
            Self::ByDay(v) => join(f, v),
        }
    }
}

fn unique<T: PartialEq>(values: Vec<T>) -> Vec<T> {
    let mut out = Vec::with_capacity(values.len());
    for v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_rules_with_bounds() {
        let rule = RecurrenceRule::new(Frequency::Daily).with_count(3).unwrap();
        assert!(rule.is_finite());
        assert!(rule.is_by_count());
        assert_eq!(rule.count(), Some(3));

        let until = Time::date(2012, 1, 1).unwrap();
        let rule = RecurrenceRule::new(Frequency::Daily)
            .with_until(until)
            .unwrap();
        assert!(rule.is_finite());
        assert!(!rule.is_by_count());
        assert_eq!(rule.until(), Some(&until));

        let err = rule.with_count(2).unwrap_err();
        assert_eq!(err, RecurrenceError::CountUntilExclusion);

        let rule = RecurrenceRule::new(Frequency::Weekly);
        assert!(!rule.is_finite());
        assert!(!rule.is_by_count());
        assert!(rule.clone().with_count(0).is_err());
    }

    #[test]
    fn coerces_zero_interval() {
        let rule = RecurrenceRule::new(Frequency::Daily).with_interval(0);
        assert_eq!(rule.interval(), 1);
    }

    #[test]
    fn replaces_and_dedups_parts() {
        let mut rule = RecurrenceRule::new(Frequency::Monthly)
            .with_part(ByPart::ByMonthDay(vec![1, 15, 1]))
            .unwrap();
        assert_eq!(rule.by_month_day(), &[1, 15]);

        let previous = rule.set_part(ByPart::ByMonthDay(vec![-1])).unwrap();
        assert_eq!(previous, Some(ByPart::ByMonthDay(vec![1, 15])));
        assert_eq!(rule.parts().len(), 1);

        assert_eq!(
            rule.remove_part(ByPartKind::ByMonthDay),
            Some(ByPart::ByMonthDay(vec![-1]))
        );
        assert!(rule.parts().is_empty());
    }

    #[test]
    fn rejects_out_of_range_parts() {
        let cases = [
            ByPart::BySecond(vec![61]),
            ByPart::ByMinute(vec![60]),
            ByPart::ByHour(vec![24]),
            ByPart::ByMonthDay(vec![0]),
            ByPart::ByMonthDay(vec![-32]),
            ByPart::ByYearDay(vec![367]),
            ByPart::ByWeekNo(vec![54]),
            ByPart::ByMonth(vec![13]),
            ByPart::BySetPos(vec![0]),
            ByPart::ByDay(vec![WeekDayNum::nth(54, WeekDay::Monday)]),
            ByPart::ByHour(vec![]),
        ];
        for part in cases {
            let kind = part.kind();
            let err = RecurrenceRule::new(Frequency::Yearly)
                .with_part(part)
                .unwrap_err();
            assert!(
                matches!(err, RecurrenceError::InvalidPartValue { part, .. } if part == kind),
                "unexpected error {err:?}"
            );
        }
    }

    #[test]
    fn converts_weekdays() {
        for n in 1..=7 {
            let day = WeekDay::from_number(n).unwrap();
            assert_eq!(day.number(), n);
            let jiff_day: jiff::civil::Weekday = day.into();
            assert_eq!(WeekDay::from(jiff_day), day);
        }
        assert_eq!(WeekDay::from_number(0), None);
        assert_eq!(WeekDay::from_number(8), None);
        assert_eq!(WeekDay::Sunday.to_sunday_zero_offset(), 0);
        assert_eq!(WeekDay::Saturday.to_sunday_zero_offset(), 6);
        assert_eq!("mo".parse::<WeekDay>().unwrap(), WeekDay::Monday);

        let err = "MON".parse::<WeekDay>().unwrap_err();
        assert_eq!(err, RecurrenceError::InvalidWeekDay("MON".to_owned()));
        assert_eq!(err.to_string(), "invalid weekday \"MON\"");
    }

    #[test]
    fn formats_parts() {
        let part = ByPart::ByDay(vec![
            WeekDayNum::nth(-1, WeekDay::Friday),
            WeekDayNum::every(WeekDay::Monday),
        ]);
        assert_eq!(part.to_string(), "BYDAY=-1FR,MO");
        assert_eq!(ByPart::BySetPos(vec![1, -2]).to_string(), "BYSETPOS=1,-2");
        assert_eq!("BYMONTHDAY".parse::<ByPartKind>().unwrap(), ByPartKind::ByMonthDay);
        assert_eq!("bymonth".parse::<ByPartKind>().unwrap(), ByPartKind::ByMonth);
    }

    #[test]
    fn compares_parts_regardless_of_order() {
        let a = RecurrenceRule::new(Frequency::Yearly)
            .with_part(ByPart::ByMonth(vec![1]))
            .and_then(|r| r.with_part(ByPart::ByDay(vec![WeekDayNum::every(WeekDay::Sunday)])))
            .unwrap();
        let b = RecurrenceRule::new(Frequency::Yearly)
            .with_part(ByPart::ByDay(vec![WeekDayNum::every(WeekDay::Sunday)]))
            .and_then(|r| r.with_part(ByPart::ByMonth(vec![1])))
            .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, b.with_interval(2));
    }

    #[test]
    fn finds_next_occurrence_after_recurrence_id() {
        let rule: RecurrenceRule = "FREQ=DAILY;COUNT=3".parse().unwrap();
        let start = Time::date_time(2012, 1, 1, 9, 0, 0).unwrap();
        let second = Time::date_time(2012, 1, 2, 9, 0, 0).unwrap();
        let third = Time::date_time(2012, 1, 3, 9, 0, 0).unwrap();
        assert_eq!(rule.next_occurrence(start, start).unwrap(), Some(second));
        assert_eq!(rule.next_occurrence(start, second).unwrap(), Some(third));
        assert_eq!(rule.next_occurrence(start, third).unwrap(), None);
    }
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Expansion of one recurrence period into its candidate instants.

use jiff::ToSpan;
use jiff::civil::{Date, DateTime};

use crate::rule::{Frequency, RecurrenceRule, WeekDay, WeekDayNum};
use crate::time::{Time, days_in_month, days_in_year, start_of_week, week_of, weeks_in_year};

/// By-parts of a rule with the defaults implied by the start instant filled
/// in. Numeric lists are sorted and free of duplicates.
///
/// An empty time list means any value of that unit; it only stays empty for
/// frequencies at or below that unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalizedParts {
    by_second: Vec<i8>,
    by_minute: Vec<i8>,
    by_hour: Vec<i8>,
    by_day: Vec<WeekDayNum>,
    by_month_day: Vec<i8>,
    by_year_day: Vec<i16>,
    by_week_no: Vec<i8>,
    by_month: Vec<i8>,
    by_set_pos: Vec<i16>,
}

impl NormalizedParts {
    pub(crate) fn new(rule: &RecurrenceRule, dtstart: &Time) -> Self {
        let freq = rule.freq();
        let time_part = |values: &[u8], default: i8, implied: bool| {
            if values.is_empty() {
                if implied { vec![default] } else { Vec::new() }
            } else {
                sorted(values.iter().filter_map(|&v| i8::try_from(v.min(59)).ok()))
            }
        };

        let mut parts = Self {
            by_second: time_part(rule.by_second(), dtstart.second(), freq > Frequency::Secondly),
            by_minute: time_part(rule.by_minute(), dtstart.minute(), freq > Frequency::Minutely),
            by_hour: time_part(rule.by_hour(), dtstart.hour(), freq > Frequency::Hourly),
            by_day: rule.by_day().to_vec(),
            by_month_day: sorted(rule.by_month_day().iter().copied()),
            by_year_day: sorted(rule.by_year_day().iter().copied()),
            by_week_no: sorted(rule.by_week_no().iter().copied()),
            by_month: sorted(rule.by_month().iter().filter_map(|&m| i8::try_from(m).ok())),
            by_set_pos: sorted(rule.by_set_pos().iter().copied()),
        };

        let no_day_parts = parts.by_week_no.is_empty()
            && parts.by_year_day.is_empty()
            && parts.by_month_day.is_empty()
            && parts.by_day.is_empty();
        if no_day_parts {
            match freq {
                Frequency::Yearly => {
                    if parts.by_month.is_empty() {
                        parts.by_month = vec![dtstart.month()];
                    }
                    parts.by_month_day = vec![dtstart.day()];
                }
                Frequency::Monthly => parts.by_month_day = vec![dtstart.day()],
                Frequency::Weekly => parts.by_day = vec![WeekDayNum::every(dtstart.weekday())],
                _ => {}
            }
        }
        parts
    }

    /// Candidates of the period anchored at `anchor`, sorted ascending, with
    /// BYSETPOS applied.
    pub(crate) fn expand_period(
        &self,
        rule: &RecurrenceRule,
        dtstart: &Time,
        anchor: &Time,
    ) -> Vec<Time> {
        let dates = self.period_dates(rule, anchor.civil_date());
        if dates.is_empty() {
            return Vec::new();
        }
        let times = self.period_times(rule.freq(), dtstart, anchor);

        let mut candidates: Vec<Time> = dates
            .iter()
            .flat_map(|date| times.iter().map(move |time| make_time(dtstart, *date, *time)))
            .collect();
        candidates.sort_unstable();
        candidates.dedup();

        if self.by_set_pos.is_empty() {
            candidates
        } else {
            select_positions(&candidates, &self.by_set_pos)
        }
    }

    fn period_dates(&self, rule: &RecurrenceRule, anchor: Date) -> Vec<Date> {
        match rule.freq() {
            Frequency::Yearly => (1..=12)
                .filter(|m| self.by_month.is_empty() || self.by_month.contains(m))
                .flat_map(|m| self.month_dates(rule, anchor.year(), m))
                .collect(),
            Frequency::Monthly => {
                if self.by_month.is_empty() || self.by_month.contains(&anchor.month()) {
                    self.month_dates(rule, anchor.year(), anchor.month())
                } else {
                    Vec::new()
                }
            }
            Frequency::Weekly => anchor
                .series(1.day())
                .take(7)
                .filter(|date| self.matches_day(rule, *date))
                .collect(),
            _ => {
                if self.matches_day(rule, anchor) {
                    vec![anchor]
                } else {
                    Vec::new()
                }
            }
        }
    }

    fn month_dates(&self, rule: &RecurrenceRule, year: i16, month: i8) -> Vec<Date> {
        let days = if self.by_month_day.is_empty() {
            (1..=days_in_month(year, month)).collect()
        } else {
            normalize_by_month_day_rules(year, month, &self.by_month_day)
        };
        days.into_iter()
            .filter_map(|day| Date::new(year, month, day).ok())
            .filter(|date| self.matches_day(rule, *date))
            .collect()
    }

    fn matches_day(&self, rule: &RecurrenceRule, date: Date) -> bool {
        if !self.by_month.is_empty() && !self.by_month.contains(&date.month()) {
            return false;
        }

        if !self.by_week_no.is_empty() {
            let (week_year, week) = week_of(date, rule.wkst());
            let total = weeks_in_year(week_year, rule.wkst());
            let hit = self
                .by_week_no
                .iter()
                .any(|&n| if n > 0 { n == week } else { total + n + 1 == week });
            if !hit {
                return false;
            }
        }

        if !self.by_year_day.is_empty() {
            let total = days_in_year(date.year());
            let day = date.day_of_year();
            let hit = self
                .by_year_day
                .iter()
                .any(|&n| if n > 0 { n == day } else { total + n + 1 == day });
            if !hit {
                return false;
            }
        }

        if !self.by_month_day.is_empty()
            && !normalize_by_month_day_rules(date.year(), date.month(), &self.by_month_day)
                .contains(&date.day())
        {
            return false;
        }

        if !self.by_day.is_empty() {
            let in_month = rule.freq() == Frequency::Monthly
                || (rule.freq() == Frequency::Yearly && !self.by_month.is_empty());
            let weekday = WeekDay::from(date.weekday());
            let hit = self.by_day.iter().any(|d| {
                d.day == weekday
                    && d.occurrence.is_none_or(|n| {
                        if in_month {
                            nth_matches(n, i16::from(date.day()), i16::from(date.days_in_month()))
                        } else {
                            nth_matches(n, date.day_of_year(), date.days_in_year())
                        }
                    })
            });
            if !hit {
                return false;
            }
        }

        true
    }

    /// Times of day for one period. Units finer than the frequency come from
    /// the by-lists; the anchor fixes the others, which must pass their list.
    fn period_times(
        &self,
        freq: Frequency,
        dtstart: &Time,
        anchor: &Time,
    ) -> Vec<jiff::civil::Time> {
        if dtstart.is_date() {
            return vec![jiff::civil::Time::midnight()];
        }

        let hours = if freq.is_sub_daily() {
            fixed(anchor.hour(), &self.by_hour)
        } else {
            self.by_hour.clone()
        };
        let minutes = if freq <= Frequency::Minutely {
            fixed(anchor.minute(), &self.by_minute)
        } else {
            self.by_minute.clone()
        };
        let seconds = if freq == Frequency::Secondly {
            fixed(anchor.second(), &self.by_second)
        } else {
            self.by_second.clone()
        };

        let mut times = Vec::with_capacity(hours.len() * minutes.len() * seconds.len());
        for &h in &hours {
            for &m in &minutes {
                for &s in &seconds {
                    if let Ok(time) = jiff::civil::Time::new(h, m, s, 0) {
                        times.push(time);
                    }
                }
            }
        }
        times
    }

    /// Whether some BYSETPOS position fits into the most candidates a single
    /// period of `freq` can hold. When none does, the rule never occurs.
    pub(crate) fn set_positions_reachable(&self, freq: Frequency, dtstart: &Time) -> bool {
        if self.by_set_pos.is_empty() {
            return true;
        }

        let unit = |values: &[i8], fixed: bool, full: usize| {
            if fixed {
                1
            } else if values.is_empty() {
                full
            } else {
                values.len()
            }
        };
        let times = if dtstart.is_date() {
            1
        } else {
            unit(&self.by_hour, freq.is_sub_daily(), 24)
                * unit(&self.by_minute, freq <= Frequency::Minutely, 60)
                * unit(&self.by_second, freq == Frequency::Secondly, 60)
        };
        let days = match freq {
            Frequency::Yearly => 366,
            Frequency::Monthly => 31,
            Frequency::Weekly => 7,
            _ => 1,
        };

        let most = days * times;
        self.by_set_pos
            .iter()
            .any(|&pos| usize::from(pos.unsigned_abs()) <= most)
    }

    /// For sub-daily frequencies, the number of frequency units from the
    /// anchor to the end of the first enclosing day, hour or minute that
    /// cannot produce a candidate.
    pub(crate) fn skip_units(&self, rule: &RecurrenceRule, anchor: &Time) -> Option<i64> {
        let freq = rule.freq();
        if !freq.is_sub_daily() {
            return None;
        }

        let (h, m, s) = (
            i64::from(anchor.hour()),
            i64::from(anchor.minute()),
            i64::from(anchor.second()),
        );
        let day_left = match freq {
            Frequency::Hourly => 24 - h,
            Frequency::Minutely => 1440 - (60 * h + m),
            _ => 86_400 - (3600 * h + 60 * m + s),
        };
        if !self.matches_day(rule, anchor.civil_date()) {
            return Some(day_left);
        }
        if freq == Frequency::Hourly {
            return None;
        }

        if !self.by_hour.is_empty() && !self.by_hour.contains(&anchor.hour()) {
            return Some(match freq {
                Frequency::Minutely => 60 - m,
                _ => 3600 - (60 * m + s),
            });
        }
        if freq == Frequency::Secondly
            && !self.by_minute.is_empty()
            && !self.by_minute.contains(&anchor.minute())
        {
            return Some(60 - s);
        }
        None
    }
}

/// The start of the period containing `t`, at midnight for day-sized and
/// longer periods.
pub(crate) fn period_start(freq: Frequency, wkst: WeekDay, t: &Time) -> Time {
    let date = t.civil_date();
    let civil = match freq {
        Frequency::Yearly => date.first_of_year().to_datetime(jiff::civil::Time::midnight()),
        Frequency::Monthly => date.first_of_month().to_datetime(jiff::civil::Time::midnight()),
        Frequency::Weekly => start_of_week(date, wkst).to_datetime(jiff::civil::Time::midnight()),
        Frequency::Daily => date.to_datetime(jiff::civil::Time::midnight()),
        Frequency::Hourly => DateTime::from_parts(date, truncate(t.hour(), 0, 0)),
        Frequency::Minutely => DateTime::from_parts(date, truncate(t.hour(), t.minute(), 0)),
        Frequency::Secondly => t.civil(),
    };
    Time::from_civil(civil)
}

/// Moves a period anchor by `n` frequency units.
pub(crate) fn step(freq: Frequency, anchor: &Time, n: i64) -> Option<Time> {
    let span = jiff::Span::new();
    let span = match freq {
        Frequency::Yearly => span.try_years(n),
        Frequency::Monthly => span.try_months(n),
        Frequency::Weekly => span.try_weeks(n),
        Frequency::Daily => span.try_days(n),
        Frequency::Hourly => span.try_hours(n),
        Frequency::Minutely => span.try_minutes(n),
        Frequency::Secondly => span.try_seconds(n),
    }
    .ok()?;
    anchor.civil().checked_add(span).ok().map(Time::from_civil)
}

/// Converts BYMONTHDAY values to day numbers of `month` in `year`.
///
/// Negative values count back from the last day. Zero and values beyond the
/// month's length are dropped. The result is sorted and free of duplicates.
///
/// ```
/// use aimcal_recur::normalize_by_month_day_rules;
///
/// assert_eq!(normalize_by_month_day_rules(2012, 2, &[1, -1]), vec![1, 29]);
/// assert_eq!(normalize_by_month_day_rules(2013, 2, &[1, -1, 30]), vec![1, 28]);
/// ```
#[must_use]
pub fn normalize_by_month_day_rules(year: i16, month: i8, rules: &[i8]) -> Vec<i8> {
    let total = days_in_month(year, month);
    let mut days: Vec<i8> = rules
        .iter()
        .filter(|&&rule| rule != 0 && rule.unsigned_abs() <= total.unsigned_abs())
        .map(|&rule| if rule < 0 { total + rule + 1 } else { rule })
        .collect();
    days.sort_unstable();
    days.dedup();
    days
}

/// Keeps the 1-based positions of `candidates` named by `positions`,
/// negative positions counting from the end.
fn select_positions(candidates: &[Time], positions: &[i16]) -> Vec<Time> {
    let len = i64::try_from(candidates.len()).unwrap_or(i64::MAX);
    let mut selected: Vec<Time> = positions
        .iter()
        .filter_map(|&p| {
            let p = i64::from(p);
            let index = if p > 0 { p - 1 } else { len + p };
            usize::try_from(index).ok().and_then(|i| candidates.get(i)).copied()
        })
        .collect();
    selected.sort_unstable();
    selected.dedup();
    selected
}

fn nth_matches(n: i8, position: i16, length: i16) -> bool {
    let n = i16::from(n);
    if n > 0 {
        (position - 1) / 7 + 1 == n
    } else {
        (length - position) / 7 + 1 == -n
    }
}

fn fixed(value: i8, allowed: &[i8]) -> Vec<i8> {
    if allowed.is_empty() || allowed.contains(&value) {
        vec![value]
    } else {
        Vec::new()
    }
}

fn truncate(hour: i8, minute: i8, second: i8) -> jiff::civil::Time {
    jiff::civil::Time::new(hour, minute, second, 0).unwrap_or(jiff::civil::Time::midnight())
}

fn make_time(dtstart: &Time, date: Date, time: jiff::civil::Time) -> Time {
    if dtstart.is_date() {
        Time::from_civil_date(date)
    } else {
        Time::from_civil(date.to_datetime(time)).with_utc(dtstart.is_utc())
    }
}

fn sorted<T: Ord>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut values: Vec<T> = values.into_iter().collect();
    values.sort_unstable();
    values.dedup();
    values
}

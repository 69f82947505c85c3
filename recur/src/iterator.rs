// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Lazy enumeration of the occurrences of a single recurrence rule.

mod expand;

use tracing::{debug, trace, warn};

use crate::error::{RecurrenceError, RuleValidationError};
use crate::rule::{Frequency, RecurrenceRule};
use crate::time::Time;

pub use expand::{NormalizedParts, normalize_by_month_day_rules};

/// How many years, per INTERVAL step, the iterator searches past the last
/// occurrence before it gives up on finding another one.
pub const SEARCH_HORIZON_YEARS: i64 = 400;

/// How many consecutive periods a sub-daily rule may step through without a
/// candidate before the iterator gives up.
pub const SEARCH_HORIZON_PERIODS: u64 = 100_000;

/// Iterator over the occurrences of a recurrence rule from a start instant.
///
/// Occurrences are strictly increasing. Once the iterator reports no further
/// occurrence it keeps doing so.
#[derive(Debug, Clone)]
pub struct RecurrenceIterator {
    rule: RecurrenceRule,
    dtstart: Time,
    last: Time,
    parts: NormalizedParts,
    period: Time,
    days: Vec<Time>,
    days_index: usize,
    initialized: bool,
    occurrence_number: u64,
    idle_periods: u64,
    completed: bool,
}

impl RecurrenceIterator {
    /// Creates an iterator for `rule` starting at `dtstart`.
    ///
    /// # Errors
    ///
    /// Fails when the by-parts of the rule do not fit its frequency.
    pub fn new(rule: &RecurrenceRule, dtstart: Time) -> Result<Self, RecurrenceError> {
        validate(rule)?;
        let parts = NormalizedParts::new(rule, &dtstart);
        let period = expand::period_start(rule.freq(), rule.wkst(), &dtstart);
        debug!(
            freq = %rule.freq(),
            interval = rule.interval(),
            %dtstart,
            "recurrence iterator created"
        );
        Ok(Self {
            rule: rule.clone(),
            dtstart,
            last: dtstart,
            parts,
            period,
            days: Vec::new(),
            days_index: 0,
            initialized: false,
            occurrence_number: 0,
            idle_periods: 0,
            completed: false,
        })
    }

    /// Restores an iterator from a snapshot. It continues exactly where the
    /// snapshot was taken.
    ///
    /// # Errors
    ///
    /// Fails when the rule in the snapshot does not validate.
    pub fn resume(snapshot: IteratorSnapshot) -> Result<Self, RecurrenceError> {
        validate(&snapshot.rule)?;
        let days_index = snapshot.days_index.min(snapshot.days.len());
        Ok(Self {
            rule: snapshot.rule,
            dtstart: snapshot.dtstart,
            last: snapshot.last,
            parts: snapshot.parts,
            period: snapshot.period,
            days: snapshot.days,
            days_index,
            initialized: snapshot.initialized,
            occurrence_number: snapshot.occurrence_number,
            idle_periods: 0,
            completed: snapshot.completed,
        })
    }

    /// Captures the full state of the iterator.
    #[must_use]
    pub fn snapshot(&self) -> IteratorSnapshot {
        IteratorSnapshot {
            rule: self.rule.clone(),
            dtstart: self.dtstart,
            last: self.last,
            parts: self.parts.clone(),
            period: self.period,
            days: self.days.clone(),
            days_index: self.days_index,
            initialized: self.initialized,
            occurrence_number: self.occurrence_number,
            completed: self.completed,
        }
    }

    /// The rule being expanded.
    #[must_use]
    pub fn rule(&self) -> &RecurrenceRule {
        &self.rule
    }

    /// The start instant.
    #[must_use]
    pub fn dtstart(&self) -> &Time {
        &self.dtstart
    }

    /// The most recently returned occurrence, if any.
    #[must_use]
    pub fn last_occurrence(&self) -> Option<&Time> {
        (self.occurrence_number > 0).then_some(&self.last)
    }

    /// How many occurrences have been returned.
    #[must_use]
    pub fn occurrence_number(&self) -> u64 {
        self.occurrence_number
    }

    /// Whether the iterator is exhausted.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    fn complete(&mut self, reason: &'static str) {
        self.completed = true;
        self.days.clear();
        self.days_index = 0;
        debug!(
            reason,
            occurrences = self.occurrence_number,
            "recurrence iterator completed"
        );
    }

    fn expand_current(&mut self) {
        self.days = self
            .parts
            .expand_period(&self.rule, &self.dtstart, &self.period);
        self.days_index = 0;
        trace!(period = %self.period, candidates = self.days.len(), "expanded period");
    }

    /// Moves to the next period that may hold candidates. Returns false when
    /// the iterator completed instead.
    fn advance_period(&mut self) -> bool {
        let interval = i64::from(self.rule.interval());
        let freq = self.rule.freq();
        let horizon = i64::from(self.last.year()) + SEARCH_HORIZON_YEARS * interval;

        loop {
            let steps = self
                .parts
                .skip_units(&self.rule, &self.period)
                .map_or(1, |units| ((units + interval - 1) / interval).max(1));

            let Some(next) = expand::step(freq, &self.period, steps * interval) else {
                self.complete("calendar range exhausted");
                return false;
            };
            self.period = next;

            if freq.is_sub_daily() {
                self.idle_periods += 1;
                if self.idle_periods > SEARCH_HORIZON_PERIODS {
                    warn!(
                        rule = %self.rule,
                        dtstart = %self.dtstart,
                        periods = SEARCH_HORIZON_PERIODS,
                        "no occurrence found within the period budget"
                    );
                    self.complete("period budget exhausted");
                    return false;
                }
            }

            if self.rule.until().is_some_and(|until| self.period > *until) {
                self.complete("until passed");
                return false;
            }

            if i64::from(self.period.year()) > horizon {
                warn!(
                    rule = %self.rule,
                    dtstart = %self.dtstart,
                    "no occurrence found within the search horizon"
                );
                self.complete("search horizon exhausted");
                return false;
            }

            if self.parts.skip_units(&self.rule, &self.period).is_none() {
                self.expand_current();
                return true;
            }
        }
    }
}

impl Iterator for RecurrenceIterator {
    type Item = Time;

    fn next(&mut self) -> Option<Time> {
        if self.completed {
            return None;
        }
        if self
            .rule
            .count()
            .is_some_and(|count| self.occurrence_number >= u64::from(count))
        {
            self.complete("count reached");
            return None;
        }

        if !self.initialized {
            self.initialized = true;
            if !self
                .parts
                .set_positions_reachable(self.rule.freq(), &self.dtstart)
            {
                warn!(
                    rule = %self.rule,
                    "BYSETPOS asks for more candidates than any period holds"
                );
                self.complete("set position out of reach");
                return None;
            }
            self.expand_current();
        }

        loop {
            while let Some(candidate) = self.days.get(self.days_index).copied() {
                self.days_index += 1;
                if candidate < self.dtstart
                    || (self.occurrence_number > 0 && candidate <= self.last)
                {
                    continue;
                }
                if self.rule.until().is_some_and(|until| candidate > *until) {
                    self.complete("until passed");
                    return None;
                }
                self.occurrence_number += 1;
                self.idle_periods = 0;
                self.last = candidate;
                return Some(candidate);
            }

            if !self.advance_period() {
                return None;
            }
        }
    }
}

/// Serializable state of a [`RecurrenceIterator`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IteratorSnapshot {
    /// The rule being expanded
    pub rule: RecurrenceRule,
    /// Start instant
    pub dtstart: Time,
    /// Last returned occurrence, or the start instant before the first one
    pub last: Time,
    /// By-parts with defaults from the start instant
    pub parts: NormalizedParts,
    /// Anchor of the current period
    pub period: Time,
    /// Candidates of the current period
    pub days: Vec<Time>,
    /// Position of the next unread candidate in `days`
    pub days_index: usize,
    /// Whether the first period has been expanded
    pub initialized: bool,
    /// Number of occurrences returned so far
    pub occurrence_number: u64,
    /// Whether the iterator is exhausted
    pub completed: bool,
}

/// Checks the constraints between by-parts that depend on the frequency.
///
/// # Errors
///
/// Returns the first constraint the rule violates.
pub fn validate(rule: &RecurrenceRule) -> Result<(), RuleValidationError> {
    let freq = rule.freq();
    let has_month = !rule.by_month().is_empty();
    let has_week_no = !rule.by_week_no().is_empty();
    let has_year_day = !rule.by_year_day().is_empty();
    let has_month_day = !rule.by_month_day().is_empty();

    if has_year_day && (has_month || has_week_no || has_month_day) {
        return Err(RuleValidationError::InvalidByYearDay);
    }
    if has_week_no && has_month_day {
        return Err(RuleValidationError::ByWeekNoWithByMonthDay);
    }
    if freq == Frequency::Monthly && (has_year_day || has_week_no) {
        return Err(RuleValidationError::MonthlyWithYearParts);
    }
    if freq == Frequency::Weekly && (has_month_day || has_year_day) {
        return Err(RuleValidationError::WeeklyWithDayParts);
    }
    if has_year_day && freq != Frequency::Yearly {
        return Err(RuleValidationError::ByYearDayNotYearly);
    }
    if has_week_no && freq != Frequency::Yearly {
        return Err(RuleValidationError::ByWeekNoNotYearly);
    }

    let malformed_day = rule.by_day().iter().any(|d| {
        d.occurrence.is_some_and(|n| {
            let n = n.unsigned_abs();
            match freq {
                Frequency::Monthly => n > 5,
                Frequency::Yearly => (has_month && n > 5) || has_week_no,
                _ => true,
            }
        })
    });
    if malformed_day {
        return Err(RuleValidationError::MalformedByDay);
    }

    if has_month && has_month_day {
        let fits = rule.by_month().iter().any(|&month| {
            let max = max_days_in_month(month);
            rule.by_month_day().iter().any(|d| d.unsigned_abs() <= max)
        });
        if !fits {
            return Err(RuleValidationError::ByMonthDayOutOfMonth);
        }
    }

    Ok(())
}

/// Longest possible length of `month`, counting February as 29 days.
fn max_days_in_month(month: u8) -> u8 {
    match month {
        2 => 29,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

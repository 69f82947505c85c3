// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Merged occurrence stream of a component.
//!
//! Every RRULE of the component gets its own [`RecurrenceIterator`]. Their
//! heads are merged with the sorted RDATE list into one ascending stream,
//! from which EXDATE values and EXRULE occurrences are removed.

use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::component::{PropertyName, PropertyValue, RecurrenceSource};
use crate::error::RecurrenceError;
use crate::iterator::{IteratorSnapshot, RecurrenceIterator};
use crate::keyword::KW_DTSTART;
use crate::time::Time;

/// How many candidates the expansion may discard in a row before it gives up.
pub const MAX_TRIES: usize = 500;

/// Lazy, resumable expansion of all instances of a component.
///
/// Instances are strictly increasing. An [`RecurrenceError::ImpossibleRule`]
/// is returned when [`MAX_TRIES`] candidates in a row are discarded.
#[derive(Debug, Clone)]
pub struct RecurrenceExpansion {
    dtstart: Time,
    last: Time,
    rule_iterators: Vec<RecurrenceIterator>,
    exclusion_iterators: Vec<RecurrenceIterator>,
    rule_dates: Vec<Time>,
    rule_date_index: usize,
    ex_dates: Vec<Time>,
    ex_date_index: usize,
    complete: bool,
}

impl RecurrenceExpansion {
    /// Builds the expansion of `source` anchored at `dtstart`.
    ///
    /// # Errors
    ///
    /// Fails when an RRULE or EXRULE does not validate.
    #[tracing::instrument(level = "debug", skip(source))]
    pub fn build<S>(source: &S, dtstart: Time) -> Result<Self, RecurrenceError>
    where
        S: RecurrenceSource + ?Sized,
    {
        let mut this = Self {
            dtstart,
            last: dtstart,
            rule_iterators: Vec::new(),
            exclusion_iterators: Vec::new(),
            rule_dates: Vec::new(),
            rule_date_index: 0,
            ex_dates: Vec::new(),
            ex_date_index: 0,
            complete: false,
        };

        let has_rdate = source.has_property(PropertyName::RDate);
        let has_rrule = source.has_property(PropertyName::RRule);
        let has_recurrence_id = source.has_property(PropertyName::RecurrenceId);
        if !has_rdate && !has_rrule && !has_recurrence_id {
            // A single instance at DTSTART.
            this.rule_dates.push(dtstart);
            return Ok(this);
        }

        if has_rdate {
            this.rule_dates = extract_dates(source, PropertyName::RDate);
            match this.rule_dates.first() {
                Some(first) if *first < dtstart => this.last = *first,
                _ => this.rule_date_index = this.rule_dates.partition_point(|d| *d < dtstart),
            }
        }

        this.ex_dates = extract_dates(source, PropertyName::ExDate);
        let last = this.last;
        this.ex_date_index = this
            .ex_dates
            .partition_point(|ex| compare_special(&last, ex) == Ordering::Greater);

        this.rule_iterators = rule_iterators(source, PropertyName::RRule, dtstart)?;
        this.exclusion_iterators = rule_iterators(source, PropertyName::ExRule, dtstart)?;

        debug!(
            rules = this.rule_iterators.len(),
            exclusion_rules = this.exclusion_iterators.len(),
            rdates = this.rule_dates.len(),
            exdates = this.ex_dates.len(),
            "recurrence expansion built"
        );
        Ok(this)
    }

    /// Builds the expansion of a source anchored at its own DTSTART.
    ///
    /// # Errors
    ///
    /// Fails when DTSTART is missing or a rule does not validate.
    pub fn from_component<S>(source: &S) -> Result<Self, RecurrenceError>
    where
        S: RecurrenceSource + ?Sized,
    {
        let dtstart = source
            .first_value(PropertyName::DtStart)
            .and_then(PropertyValue::as_time)
            .copied()
            .ok_or(RecurrenceError::MissingProperty(KW_DTSTART))?;
        Self::build(source, dtstart)
    }

    /// Restores an expansion from a snapshot. It continues exactly where the
    /// snapshot was taken.
    ///
    /// # Errors
    ///
    /// Fails when a rule in the snapshot does not validate.
    pub fn resume(snapshot: ExpansionSnapshot) -> Result<Self, RecurrenceError> {
        let resume_all = |snapshots: Vec<IteratorSnapshot>| {
            snapshots
                .into_iter()
                .map(RecurrenceIterator::resume)
                .collect::<Result<Vec<_>, _>>()
        };

        Ok(Self {
            dtstart: snapshot.dtstart,
            last: snapshot.last,
            rule_iterators: resume_all(snapshot.rule_iterators)?,
            exclusion_iterators: resume_all(snapshot.exclusion_iterators)?,
            rule_date_index: snapshot.rule_date_index.min(snapshot.rule_dates.len()),
            rule_dates: snapshot.rule_dates,
            ex_date_index: snapshot.ex_date_index.min(snapshot.ex_dates.len()),
            ex_dates: snapshot.ex_dates,
            complete: snapshot.complete,
        })
    }

    /// Captures the full state of the expansion.
    #[must_use]
    pub fn snapshot(&self) -> ExpansionSnapshot {
        ExpansionSnapshot {
            dtstart: self.dtstart,
            last: self.last,
            rule_iterators: self
                .rule_iterators
                .iter()
                .map(RecurrenceIterator::snapshot)
                .collect(),
            exclusion_iterators: self
                .exclusion_iterators
                .iter()
                .map(RecurrenceIterator::snapshot)
                .collect(),
            rule_dates: self.rule_dates.clone(),
            rule_date_index: self.rule_date_index,
            ex_dates: self.ex_dates.clone(),
            ex_date_index: self.ex_date_index,
            complete: self.complete,
        }
    }

    /// The anchor instant.
    #[must_use]
    pub fn dtstart(&self) -> &Time {
        &self.dtstart
    }

    /// The most recently returned instance, or the starting point before the
    /// first one.
    #[must_use]
    pub fn last_occurrence(&self) -> &Time {
        &self.last
    }

    /// Whether every source is exhausted.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Returns the next instance, or `None` once every source is exhausted.
    ///
    /// # Errors
    ///
    /// Fails with [`RecurrenceError::ImpossibleRule`] when [`MAX_TRIES`]
    /// candidates in a row are excluded.
    pub fn next_occurrence(&mut self) -> Result<Option<Time>, RecurrenceError> {
        if self.complete {
            return Ok(None);
        }

        for _ in 0..MAX_TRIES {
            let Some(candidate) = self.take_candidate() else {
                self.complete = true;
                debug!(last = %self.last, "recurrence expansion complete");
                return Ok(None);
            };

            while self
                .ex_dates
                .get(self.ex_date_index)
                .is_some_and(|ex| compare_special(&candidate, ex) == Ordering::Greater)
            {
                self.ex_date_index += 1;
            }

            if self
                .ex_dates
                .get(self.ex_date_index)
                .is_some_and(|ex| compare_special(&candidate, ex) == Ordering::Equal)
            {
                self.ex_date_index += 1;
                continue;
            }

            if self.is_excluded_by_rule(&candidate) {
                continue;
            }

            self.last = candidate;
            return Ok(Some(candidate));
        }

        warn!(
            tries = MAX_TRIES,
            last = %self.last,
            "too many excluded candidates, giving up"
        );
        Err(RecurrenceError::ImpossibleRule { tries: MAX_TRIES })
    }

    /// Picks the earliest head among all rule iterators and the pending RDATE
    /// and advances every source sitting on it.
    fn take_candidate(&mut self) -> Option<Time> {
        self.rule_iterators.retain(|iter| !iter.is_completed());

        let rule_head = self
            .rule_iterators
            .iter()
            .filter_map(|iter| iter.last_occurrence().copied())
            .min();
        let date_head = self.rule_dates.get(self.rule_date_index).copied();
        let candidate = match (rule_head, date_head) {
            (Some(rule), Some(date)) => rule.min(date),
            (Some(head), None) | (None, Some(head)) => head,
            (None, None) => return None,
        };

        for iter in &mut self.rule_iterators {
            if iter.last_occurrence() == Some(&candidate) {
                iter.next();
            }
        }
        while self.rule_dates.get(self.rule_date_index) == Some(&candidate) {
            self.rule_date_index += 1;
        }
        Some(candidate)
    }

    fn is_excluded_by_rule(&mut self, candidate: &Time) -> bool {
        let mut excluded = false;
        for iter in &mut self.exclusion_iterators {
            while !iter.is_completed()
                && iter.last_occurrence().is_some_and(|head| head < candidate)
            {
                iter.next();
            }
            excluded |= iter.last_occurrence() == Some(candidate);
        }
        self.exclusion_iterators
            .retain(|iter| !iter.is_completed() || iter.last_occurrence() >= Some(candidate));
        excluded
    }
}

impl Iterator for RecurrenceExpansion {
    type Item = Result<Time, RecurrenceError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_occurrence() {
            Ok(next) => next.map(Ok),
            Err(err) => {
                self.complete = true;
                Some(Err(err))
            }
        }
    }
}

/// Serializable state of a [`RecurrenceExpansion`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpansionSnapshot {
    /// Anchor instant
    pub dtstart: Time,
    /// Last returned instance
    pub last: Time,
    /// States of the RRULE iterators still running
    pub rule_iterators: Vec<IteratorSnapshot>,
    /// States of the EXRULE iterators still running
    #[cfg_attr(feature = "serde", serde(default))]
    pub exclusion_iterators: Vec<IteratorSnapshot>,
    /// Sorted RDATE values
    pub rule_dates: Vec<Time>,
    /// Position of the next pending RDATE
    pub rule_date_index: usize,
    /// Sorted EXDATE values
    pub ex_dates: Vec<Time>,
    /// Position of the next pending EXDATE
    pub ex_date_index: usize,
    /// Whether every source is exhausted
    pub complete: bool,
}

/// A date-only EXDATE removes every candidate on that day, otherwise the
/// full instants are compared.
fn compare_special(candidate: &Time, exdate: &Time) -> Ordering {
    if !candidate.is_date() && exdate.is_date() {
        candidate.compare_date_only(exdate)
    } else {
        candidate.cmp(exdate)
    }
}

fn extract_dates<S>(source: &S, name: PropertyName) -> Vec<Time>
where
    S: RecurrenceSource + ?Sized,
{
    let mut dates: Vec<Time> = Vec::new();
    for property in source.all_properties(name) {
        for time in property.values().iter().filter_map(PropertyValue::as_time) {
            let index = dates.partition_point(|d| d <= time);
            dates.insert(index, *time);
        }
    }
    dates
}

/// One primed iterator per rule value; rules with no occurrence at all are
/// dropped right away.
fn rule_iterators<S>(
    source: &S,
    name: PropertyName,
    dtstart: Time,
) -> Result<Vec<RecurrenceIterator>, RecurrenceError>
where
    S: RecurrenceSource + ?Sized,
{
    let mut iters = Vec::new();
    for property in source.all_properties(name) {
        for rule in property.values().iter().filter_map(PropertyValue::as_rule) {
            let mut iter = rule.iterator(dtstart)?;
            if iter.next().is_some() {
                iters.push(iter);
            }
        }
    }
    Ok(iters)
}

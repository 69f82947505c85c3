// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for recurrence rules, iterators and expansions.

use crate::rule::ByPartKind;

/// Errors raised while parsing, building or expanding recurrences.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecurrenceError {
    /// FREQ is not one of the seven frequency tokens.
    #[error("invalid FREQ value \"{0}\"")]
    InvalidFrequency(String),

    /// A by-part value failed its grammar or range check.
    #[error("invalid {part} value \"{token}\": {reason}")]
    InvalidPartValue {
        /// The offending by-part.
        part: ByPartKind,
        /// The literal token as written.
        token: String,
        /// Why the token was rejected.
        reason: String,
    },

    /// COUNT is not a positive base-10 integer.
    #[error("invalid COUNT value \"{0}\"")]
    InvalidCount(String),

    /// INTERVAL is not a base-10 integer.
    #[error("invalid INTERVAL value \"{0}\"")]
    InvalidInterval(String),

    /// UNTIL is neither a DATE nor a DATE-TIME.
    #[error("invalid UNTIL value \"{0}\"")]
    InvalidUntil(String),

    /// WKST is not a two-letter weekday token.
    #[error("invalid WKST value \"{0}\"")]
    InvalidWeekStart(String),

    /// A weekday is not one of SU, MO, TU, WE, TH, FR or SA.
    #[error("invalid weekday \"{0}\"")]
    InvalidWeekDay(String),

    /// A rule segment is not of the form `NAME=value`.
    #[error("malformed rule segment \"{0}\"")]
    MalformedSegment(String),

    /// A rule part occurs more than once.
    #[error("duplicate {0} part")]
    DuplicatePart(String),

    /// The rule has no FREQ part.
    #[error("FREQ is required")]
    MissingFrequency,

    /// Both COUNT and UNTIL are present.
    #[error("COUNT and UNTIL must not occur in the same rule")]
    CountUntilExclusion,

    /// A DATE or DATE-TIME value could not be parsed or is not a real date.
    #[error("invalid date or date-time value \"{0}\"")]
    InvalidTime(String),

    /// A DURATION value could not be parsed.
    #[error("invalid duration value \"{0}\"")]
    InvalidDuration(String),

    /// Calendar arithmetic left the supported range.
    #[error("date arithmetic out of range")]
    TimeOutOfRange,

    /// A required property is missing from the component.
    #[error("component has no {0} property")]
    MissingProperty(&'static str),

    /// The rule is syntactically fine but its parts do not fit together.
    #[error(transparent)]
    Validation(#[from] RuleValidationError),

    /// The expansion discarded too many candidates in a row.
    #[error("max tries have occurred, rule may be impossible to fulfill")]
    ImpossibleRule {
        /// How many candidates were tried.
        tries: usize,
    },
}

impl From<jiff::Error> for RecurrenceError {
    fn from(_: jiff::Error) -> Self {
        Self::TimeOutOfRange
    }
}

/// Cross-part constraints checked when an iterator is created.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RuleValidationError {
    /// BYYEARDAY mixed with BYMONTH, BYWEEKNO or BYMONTHDAY.
    #[error("Invalid BYYEARDAY rule")]
    InvalidByYearDay,

    /// BYYEARDAY outside a YEARLY rule.
    #[error("BYYEARDAY may only appear in YEARLY rules")]
    ByYearDayNotYearly,

    /// BYWEEKNO outside a YEARLY rule.
    #[error("BYWEEKNO may only appear in YEARLY rules")]
    ByWeekNoNotYearly,

    /// BYWEEKNO together with BYMONTHDAY.
    #[error("BYWEEKNO does not fit to BYMONTHDAY")]
    ByWeekNoWithByMonthDay,

    /// MONTHLY with BYYEARDAY or BYWEEKNO.
    #[error("For MONTHLY recurrences neither BYYEARDAY nor BYWEEKNO may appear")]
    MonthlyWithYearParts,

    /// WEEKLY with BYMONTHDAY or BYYEARDAY.
    #[error("For WEEKLY recurrences neither BYMONTHDAY nor BYYEARDAY may appear")]
    WeeklyWithDayParts,

    /// Ordinal BYDAY entries where the frequency does not allow them.
    #[error("Malformed values in BYDAY part")]
    MalformedByDay,

    /// No BYMONTHDAY value exists in any BYMONTH month.
    #[error("wrong combination of numeric values in BYMONTHDAY and BYMONTH")]
    ByMonthDayOutOfMonth,
}

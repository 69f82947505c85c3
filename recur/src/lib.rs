// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Expand iCalendar (RFC 5545) recurrence rules into occurrences.
//!
//! A [`RecurrenceRule`] is parsed from its RRULE text or built from data,
//! [`RecurrenceIterator`] lazily walks the occurrences of a single rule, and
//! [`RecurrenceExpansion`] merges all RRULE, RDATE, EXDATE and EXRULE values
//! of a component into one ordered stream. Both iterators can be captured as
//! snapshots and resumed later.
//!
//! ```
//! use aimcal_recur::{RecurrenceRule, Time};
//!
//! let rule: RecurrenceRule = "FREQ=MONTHLY;BYDAY=1FR;COUNT=3".parse().unwrap();
//! let start = Time::date_time(2012, 1, 7, 9, 0, 0).unwrap();
//! let dates: Vec<String> = rule
//!     .iterator(start)
//!     .unwrap()
//!     .map(|t| t.to_string())
//!     .collect();
//! assert_eq!(dates, ["20120203T090000", "20120302T090000", "20120406T090000"]);
//! ```

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(
    clippy::similar_names,
    clippy::single_match_else,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

pub mod component;
pub mod duration;
pub mod error;
pub mod expansion;
mod grammar;
pub mod iterator;
pub mod keyword;
pub mod rule;
pub mod time;

pub use crate::component::{Component, Property, PropertyName, PropertyValue, RecurrenceSource};
pub use crate::duration::Duration;
pub use crate::error::{RecurrenceError, RuleValidationError};
pub use crate::expansion::{ExpansionSnapshot, MAX_TRIES, RecurrenceExpansion};
pub use crate::iterator::{
    IteratorSnapshot, NormalizedParts, RecurrenceIterator, SEARCH_HORIZON_PERIODS,
    SEARCH_HORIZON_YEARS, normalize_by_month_day_rules, validate,
};
pub use crate::rule::{
    ByPart, ByPartKind, Frequency, PartData, PartValue, RecurrenceBound, RecurrenceRule,
    RecurrenceRuleData, WeekDay, WeekDayNum, WeekStartData,
};
pub use crate::time::Time;

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Duration value as defined in RFC 5545 Section 3.3.6.

use std::fmt::{self, Display};
use std::str::FromStr;

use chumsky::extra::{self, ParserExtra};
use chumsky::input::ValueInput;
use chumsky::label::LabelError;
use chumsky::prelude::*;
use chumsky::span::SimpleSpan;

use crate::error::RecurrenceError;
use crate::grammar::{Expected, parse_complete};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;
const SECONDS_PER_WEEK: i64 = 7 * SECONDS_PER_DAY;

/// Signed length of time, either in weeks or in days and clock units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Duration {
    /// Date and Time Duration
    DateTime {
        /// Whether the duration is positive
        positive: bool,
        /// Day Duration
        day: u32,
        /// Hour Duration
        hour: u32,
        /// Minute Duration
        minute: u32,
        /// Second Duration
        second: u32,
    },

    /// Week Duration
    Week {
        /// Whether the duration is positive
        positive: bool,
        /// Week Duration
        week: u32,
    },
}

impl Duration {
    /// A zero length duration.
    pub const ZERO: Self = Self::DateTime {
        positive: true,
        day: 0,
        hour: 0,
        minute: 0,
        second: 0,
    };

    /// Builds a duration from a signed number of seconds.
    ///
    /// Whole weeks are kept in week form, everything else is split into days
    /// and clock units.
    #[must_use]
    pub fn from_seconds(seconds: i64) -> Self {
        let positive = seconds >= 0;
        let mut rest = seconds.unsigned_abs();
        let split = |rest: &mut u64, unit: i64| {
            let unit = unit.unsigned_abs();
            let n = *rest / unit;
            *rest %= unit;
            u32::try_from(n).unwrap_or(u32::MAX)
        };

        if rest != 0 && rest % SECONDS_PER_WEEK.unsigned_abs() == 0 {
            let week = split(&mut rest, SECONDS_PER_WEEK);
            return Self::Week { positive, week };
        }

        let day = split(&mut rest, SECONDS_PER_DAY);
        let hour = split(&mut rest, SECONDS_PER_HOUR);
        let minute = split(&mut rest, SECONDS_PER_MINUTE);
        let second = split(&mut rest, 1);
        Self::DateTime {
            positive,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Total signed length in seconds.
    #[must_use]
    pub fn to_seconds(&self) -> i64 {
        let (positive, total) = match *self {
            Self::DateTime {
                positive,
                day,
                hour,
                minute,
                second,
            } => (
                positive,
                i64::from(day) * SECONDS_PER_DAY
                    + i64::from(hour) * SECONDS_PER_HOUR
                    + i64::from(minute) * SECONDS_PER_MINUTE
                    + i64::from(second),
            ),
            Self::Week { positive, week } => (positive, i64::from(week) * SECONDS_PER_WEEK),
        };
        if positive { total } else { -total }
    }

    /// Signed number of whole days, ignoring hours, minutes and seconds.
    #[must_use]
    pub fn to_days(&self) -> i64 {
        let (positive, days) = match *self {
            Self::DateTime { positive, day, .. } => (positive, i64::from(day)),
            Self::Week { positive, week } => (positive, i64::from(week) * 7),
        };
        if positive { days } else { -days }
    }

    /// Whether the duration points backwards in time.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        match *self {
            Self::DateTime { positive, .. } | Self::Week { positive, .. } => {
                !positive && self.to_seconds() != 0
            }
        }
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-")?;
        }
        write!(f, "P")?;
        match *self {
            Self::Week { week, .. } => write!(f, "{week}W"),
            Self::DateTime {
                day,
                hour,
                minute,
                second,
                ..
            } => {
                if day > 0 {
                    write!(f, "{day}D")?;
                }
                if hour > 0 || minute > 0 || second > 0 {
                    write!(f, "T")?;
                    if hour > 0 {
                        write!(f, "{hour}H")?;
                    }
                    if minute > 0 || (hour > 0 && second > 0) {
                        write!(f, "{minute}M")?;
                    }
                    if second > 0 {
                        write!(f, "{second}S")?;
                    }
                } else if day == 0 {
                    write!(f, "T0S")?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for Duration {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_complete!(value_duration::<'_, _, extra::Err<Rich<'_, char>>>(), s)
            .map_err(|_| RecurrenceError::InvalidDuration(s.to_owned()))
    }
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// dur-value  = (["+"] / "-") "P" (dur-date / dur-time / dur-week)
///
/// dur-date   = dur-day [dur-time]
/// dur-time   = "T" (dur-hour / dur-minute / dur-second)
/// dur-week   = 1*DIGIT "W"
/// dur-hour   = 1*DIGIT "H" [dur-minute]
/// dur-minute = 1*DIGIT "M" [dur-second]
/// dur-second = 1*DIGIT "S"
/// dur-day    = 1*DIGIT "D"
/// ```
pub(crate) fn value_duration<'src, I, E>() -> impl Parser<'src, I, Duration, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, Expected>,
{
    let int = select! { c @ '0'..='9' => c }
        .repeated()
        .at_least(1)
        .at_most(10) // u32 max is 10 digits: 4_294_967_295
        .collect::<String>()
        .try_map(|str, span| match lexical::parse_partial::<u32, _>(&str) {
            Ok((v, n)) if n == str.len() => Ok(v),
            _ => Err(E::Error::expected_found([Expected::U32], None, span)),
        });

    let week = int.then_ignore(just('W'));

    let second_val = int.then_ignore(just('S'));
    let minute_val = int.then_ignore(just('M'));
    let hour_val = int.then_ignore(just('H'));

    // dur-second = 1*DIGIT "S"
    let second_only = second_val.map(|s| (0, 0, s));

    // dur-minute = 1*DIGIT "M" [dur-second]
    let minute_with_second = minute_val
        .then(second_val.or_not())
        .map(|(m, s)| (0, m, s.unwrap_or(0)));

    // dur-hour = 1*DIGIT "H" [dur-minute]
    let hour_with_minute = hour_val
        .then(minute_val.then(second_val.or_not()).or_not())
        .map(|(h, ms)| match ms {
            Some((m, s)) => (h, m, s.unwrap_or(0)),
            None => (h, 0, 0),
        });

    let time = just('T').ignore_then(choice((hour_with_minute, minute_with_second, second_only)));

    let day = int.then_ignore(just('D'));
    let date = day.then(time.clone().or_not());

    let prefix = select! { c @ ('+' | '-') => c }
        .or_not()
        .map(|sign| !matches!(sign, Some('-')))
        .then_ignore(just('P'));

    choice((
        prefix.then(date).map(|(positive, (day, time))| {
            let (hour, minute, second) = time.unwrap_or((0, 0, 0));
            Duration::DateTime {
                positive,
                day,
                hour,
                minute,
                second,
            }
        }),
        prefix
            .then(time)
            .map(|(positive, (hour, minute, second))| Duration::DateTime {
                positive,
                day: 0,
                hour,
                minute,
                second,
            }),
        prefix
            .then(week)
            .map(|(positive, week)| Duration::Week { positive, week }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_duration() {
        #[rustfmt::skip]
        let success_cases = [
            // examples from RFC 5545 Section 3.3.6
            ("P15DT5H0M20S", Duration::DateTime { positive: true, day: 15, hour: 5, minute: 0, second: 20 }),
            ("P7W",          Duration::Week { positive: true, week: 7 }),
            // extra tests
            ("-PT15M",       Duration::DateTime { positive: false, day: 0, hour: 0, minute: 15, second: 0 }),
            ("+P1D",         Duration::DateTime { positive: true, day: 1, hour: 0, minute: 0, second: 0 }),
            ("PT1H30M",      Duration::DateTime { positive: true, day: 0, hour: 1, minute: 30, second: 0 }),
        ];
        for (src, expected) in success_cases {
            assert_eq!(src.parse::<Duration>().unwrap(), expected, "Failed for {src}");
        }

        let fail_cases = ["P", "PT", "1D", "P1H", "P1DT", "PT1S1M", "P1W2D", ""];
        for src in fail_cases {
            assert!(src.parse::<Duration>().is_err(), "Parse {src} should fail");
        }
    }

    #[test]
    fn converts_seconds_both_ways() {
        let d: Duration = "-P1DT2H3M4S".parse().unwrap();
        assert_eq!(d.to_seconds(), -(86_400 + 7_200 + 180 + 4));
        assert_eq!(Duration::from_seconds(d.to_seconds()), d);

        assert_eq!(
            Duration::from_seconds(14 * 86_400),
            Duration::Week {
                positive: true,
                week: 2
            }
        );
        assert_eq!(Duration::from_seconds(0), Duration::ZERO);
    }

    #[test]
    fn formats_duration() {
        let cases = [
            ("P15DT5H0M20S", "P15DT5H0M20S"),
            ("P7W", "P7W"),
            ("-PT15M", "-PT15M"),
            ("PT0S", "PT0S"),
            ("-PT0S", "PT0S"),
            ("P2D", "P2D"),
            ("PT1H", "PT1H"),
        ];
        for (src, expected) in cases {
            let d: Duration = src.parse().unwrap();
            assert_eq!(d.to_string(), expected, "Failed for {src}");
        }
    }
}

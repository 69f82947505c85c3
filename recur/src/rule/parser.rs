// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Recurrence rule value grammar.
//!
//! A rule is split into `NAME=value` segments first; each by-part value is
//! then split on `,` and every element runs through its own grammar so a
//! failure can name the offending token.

use chumsky::extra::{self, ParserExtra};
use chumsky::input::ValueInput;
use chumsky::prelude::*;
use chumsky::span::SimpleSpan;

use crate::error::RecurrenceError;
use crate::grammar::{
    describe, i8_0_1, i8_0_3, i8_0_9, i8_1_2, i8_1_4, i8_1_9, i16_0_5, i16_0_6, i16_0_9, i16_1_2,
    i16_1_9, is_positive, parse_complete, u8_0_1, u8_0_3, u8_0_5, u8_0_9, u8_1_9,
};
use crate::keyword::{
    KW_DAY_FR, KW_DAY_MO, KW_DAY_SA, KW_DAY_SU, KW_DAY_TH, KW_DAY_TU, KW_DAY_WE, KW_RRULE_COUNT,
    KW_RRULE_FREQ, KW_RRULE_INTERVAL, KW_RRULE_UNTIL, KW_RRULE_WKST,
};
use crate::rule::{
    ByPart, ByPartKind, Frequency, RecurrenceBound, RecurrenceRule, WeekDay, WeekDayNum,
};
use crate::time::Time;

/// Runs one element grammar over a whole token.
macro_rules! element {
    ($grammar:ident, $kind:expr, $token:expr) => {
        parse_complete!($grammar::<'_, _, extra::Err<Rich<'_, char>>>(), $token).map_err(|errs| {
            RecurrenceError::InvalidPartValue {
                part: $kind,
                token: $token.to_owned(),
                reason: describe(&errs),
            }
        })
    };
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// recur           = recur-rule-part *( ";" recur-rule-part )
///                 ;
///                 ; The rule parts are not ordered in any
///                 ; particular sequence.
///                 ;
///                 ; The FREQ rule part is REQUIRED,
///                 ; but MUST NOT occur more than once.
///                 ;
///                 ; The UNTIL or COUNT rule parts are OPTIONAL,
///                 ; but they MUST NOT occur in the same 'recur'.
///                 ;
///                 ; The other rule parts are OPTIONAL,
///                 ; but MUST NOT occur more than once.
/// ```
///
/// Part names are matched case-insensitively. Names that are not rule parts
/// are kept as extensions.
pub(super) fn parse_rule(src: &str) -> Result<RecurrenceRule, RecurrenceError> {
    let mut builder = RuleBuilder::default();
    for segment in src.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let (name, value) = segment
            .split_once('=')
            .ok_or_else(|| RecurrenceError::MalformedSegment(segment.to_owned()))?;
        let name = name.trim().to_ascii_uppercase();
        let value = value.trim();
        match name.as_str() {
            KW_RRULE_FREQ => builder.freq(&name, value.parse()?)?,
            KW_RRULE_COUNT => builder.count(&name, parse_count(value)?)?,
            KW_RRULE_INTERVAL => builder.interval(&name, parse_interval(value)?)?,
            KW_RRULE_UNTIL => {
                let until = value
                    .parse::<Time>()
                    .map_err(|_| RecurrenceError::InvalidUntil(value.to_owned()))?;
                builder.until(&name, until)?;
            }
            KW_RRULE_WKST => {
                let wkst = value
                    .parse::<WeekDay>()
                    .map_err(|_| RecurrenceError::InvalidWeekStart(value.to_owned()))?;
                builder.wkst(&name, wkst)?;
            }
            _ => match name.parse::<ByPartKind>() {
                Ok(kind) => {
                    let upper = value.to_ascii_uppercase();
                    builder.part(parse_part(kind, upper.split(','))?)?;
                }
                Err(_) => builder.extension(name, value.to_owned())?,
            },
        }
    }
    builder.build()
}

/// ```txt
/// ( "COUNT" "=" 1*DIGIT )
/// ```
pub(super) fn parse_count(value: &str) -> Result<u32, RecurrenceError> {
    match lexical::parse::<u32, _>(value.trim()) {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(RecurrenceError::InvalidCount(value.to_owned())),
    }
}

/// ```txt
/// ( "INTERVAL" "=" 1*DIGIT )
/// ```
///
/// A non-positive interval is taken as 1.
pub(super) fn parse_interval(value: &str) -> Result<u32, RecurrenceError> {
    let interval = lexical::parse::<i64, _>(value.trim())
        .map_err(|_| RecurrenceError::InvalidInterval(value.to_owned()))?;
    interval_from_i64(interval).ok_or_else(|| RecurrenceError::InvalidInterval(value.to_owned()))
}

pub(super) fn interval_from_i64(interval: i64) -> Option<u32> {
    if interval < 1 {
        Some(1)
    } else {
        u32::try_from(interval).ok()
    }
}

/// Parses the elements of one by-part, each already split off the list.
pub(super) fn parse_part<'a>(
    kind: ByPartKind,
    tokens: impl IntoIterator<Item = &'a str>,
) -> Result<ByPart, RecurrenceError> {
    fn collect<'a, T>(
        tokens: impl IntoIterator<Item = &'a str>,
        f: impl Fn(&'a str) -> Result<T, RecurrenceError>,
    ) -> Result<Vec<T>, RecurrenceError> {
        tokens.into_iter().map(str::trim).map(f).collect()
    }

    Ok(match kind {
        ByPartKind::BySecond => ByPart::BySecond(collect(tokens, |t| element!(seconds, kind, t))?),
        ByPartKind::ByMinute => ByPart::ByMinute(collect(tokens, |t| element!(minutes, kind, t))?),
        ByPartKind::ByHour => ByPart::ByHour(collect(tokens, |t| element!(hour, kind, t))?),
        ByPartKind::ByDay => ByPart::ByDay(collect(tokens, |t| element!(weekdaynum, kind, t))?),
        ByPartKind::ByMonthDay => {
            ByPart::ByMonthDay(collect(tokens, |t| element!(monthdaynum, kind, t))?)
        }
        ByPartKind::ByYearDay => {
            ByPart::ByYearDay(collect(tokens, |t| element!(yeardaynum, kind, t))?)
        }
        ByPartKind::ByWeekNo => ByPart::ByWeekNo(collect(tokens, |t| element!(weeknum, kind, t))?),
        ByPartKind::ByMonth => ByPart::ByMonth(collect(tokens, |t| element!(monthnum, kind, t))?),
        ByPartKind::BySetPos => {
            ByPart::BySetPos(collect(tokens, |t| element!(setposday, kind, t))?)
        }
    })
}

/// Parses a single BYDAY element such as `MO`, `+2TU` or `-1FR`.
pub(super) fn parse_weekdaynum(src: &str) -> Result<WeekDayNum, String> {
    let upper = src.trim().to_ascii_uppercase();
    parse_complete!(weekdaynum::<'_, _, extra::Err<Rich<'_, char>>>(), upper)
        .map_err(|errs| describe(&errs))
}

/// Collects rule parts, rejecting duplicates.
#[derive(Debug, Default)]
pub(super) struct RuleBuilder {
    seen: Vec<String>,
    freq: Option<Frequency>,
    count: Option<u32>,
    until: Option<Time>,
    interval: Option<u32>,
    wkst: Option<WeekDay>,
    parts: Vec<ByPart>,
    extensions: Vec<(String, String)>,
}

impl RuleBuilder {
    fn mark(&mut self, name: &str) -> Result<(), RecurrenceError> {
        if self.seen.iter().any(|n| n == name) {
            return Err(RecurrenceError::DuplicatePart(name.to_owned()));
        }
        self.seen.push(name.to_owned());
        Ok(())
    }

    pub(super) fn freq(&mut self, name: &str, freq: Frequency) -> Result<(), RecurrenceError> {
        self.mark(name)?;
        self.freq = Some(freq);
        Ok(())
    }

    pub(super) fn count(&mut self, name: &str, count: u32) -> Result<(), RecurrenceError> {
        self.mark(name)?;
        self.count = Some(count);
        Ok(())
    }

    pub(super) fn until(&mut self, name: &str, until: Time) -> Result<(), RecurrenceError> {
        self.mark(name)?;
        self.until = Some(until);
        Ok(())
    }

    pub(super) fn interval(&mut self, name: &str, interval: u32) -> Result<(), RecurrenceError> {
        self.mark(name)?;
        self.interval = Some(interval);
        Ok(())
    }

    pub(super) fn wkst(&mut self, name: &str, wkst: WeekDay) -> Result<(), RecurrenceError> {
        self.mark(name)?;
        self.wkst = Some(wkst);
        Ok(())
    }

    pub(super) fn part(&mut self, part: ByPart) -> Result<(), RecurrenceError> {
        let name: &'static str = part.kind().into();
        self.mark(name)?;
        self.parts.push(part.checked()?);
        Ok(())
    }

    pub(super) fn extension(&mut self, name: String, value: String) -> Result<(), RecurrenceError> {
        self.mark(&name)?;
        self.extensions.push((name, value));
        Ok(())
    }

    pub(super) fn build(self) -> Result<RecurrenceRule, RecurrenceError> {
        let freq = self.freq.ok_or(RecurrenceError::MissingFrequency)?;
        let bound = match (self.count, self.until) {
            (Some(_), Some(_)) => return Err(RecurrenceError::CountUntilExclusion),
            (Some(count), None) => RecurrenceBound::Count(count),
            (None, Some(until)) => RecurrenceBound::Until(until),
            (None, None) => RecurrenceBound::None,
        };
        Ok(RecurrenceRule {
            freq,
            interval: self.interval.unwrap_or(1),
            wkst: self.wkst.unwrap_or(WeekDay::Monday),
            bound,
            parts: self.parts,
            extensions: self.extensions,
        })
    }
}

/// ```txt
/// seconds     = 1*2DIGIT       ;0 to 60
/// ```
fn seconds<'src, I, E>() -> impl Parser<'src, I, u8, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        u8_0_5().then(u8_0_9()).map(|(a, b)| a * 10 + b), // 00-59
        just("60").to(60),                                // 60
        u8_0_9(),                                         // 0-9
    ))
}

/// ```txt
/// minutes     = 1*2DIGIT       ;0 to 59
/// ```
fn minutes<'src, I, E>() -> impl Parser<'src, I, u8, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        u8_0_5().then(u8_0_9()).map(|(a, b)| a * 10 + b), // 00-59
        u8_0_9(),                                         // 0-9
    ))
}

/// ```txt
/// hour        = 1*2DIGIT       ;0 to 23
/// ```
fn hour<'src, I, E>() -> impl Parser<'src, I, u8, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        u8_0_1().then(u8_0_9()).map(|(a, b)| a * 10 + b), // 00-19
        just('2').ignore_then(u8_0_3()).map(|b| 20 + b),  // 20-23
        u8_0_9(),                                         // 0-9
    ))
}

/// ```txt
/// weekdaynum  = [[plus / minus] ordwk] weekday
/// plus        = "+"
/// minus       = "-"
/// ```
fn weekdaynum<'src, I, E>() -> impl Parser<'src, I, WeekDayNum, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    is_positive()
        .then(ordwk())
        .map(|(positive, n)| if positive { n } else { -n })
        .or_not()
        .then(weekday())
        .map(|(occurrence, day)| WeekDayNum { day, occurrence })
}

/// ```txt
/// ordwk       = 1*2DIGIT       ;1 to 53
/// ```
fn ordwk<'src, I, E>() -> impl Parser<'src, I, i8, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        i8_1_4().then(i8_0_9()).map(|(a, b)| a * 10 + b), // 10-49
        just('5').ignore_then(i8_0_3()).map(|a| 50 + a),  // 50-53
        just('0').ignore_then(i8_1_9()),                  // 01-09
        i8_1_9(),                                         // 1-9
    ))
}

/// ```txt
/// weekday     = "SU" / "MO" / "TU" / "WE" / "TH" / "FR" / "SA"
/// ```
fn weekday<'src, I, E>() -> impl Parser<'src, I, WeekDay, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        just(KW_DAY_SU).to(WeekDay::Sunday),
        just(KW_DAY_MO).to(WeekDay::Monday),
        just(KW_DAY_TU).to(WeekDay::Tuesday),
        just(KW_DAY_WE).to(WeekDay::Wednesday),
        just(KW_DAY_TH).to(WeekDay::Thursday),
        just(KW_DAY_FR).to(WeekDay::Friday),
        just(KW_DAY_SA).to(WeekDay::Saturday),
    ))
}

/// ```txt
/// monthdaynum = [plus / minus] ordmoday
/// ```
fn monthdaynum<'src, I, E>() -> impl Parser<'src, I, i8, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    is_positive()
        .then(ordmoday())
        .map(|(positive, n)| if positive { n } else { -n })
}

/// ```txt
/// ordmoday    = 1*2DIGIT       ;1 to 31
/// ```
fn ordmoday<'src, I, E>() -> impl Parser<'src, I, i8, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        i8_1_2().then(i8_0_9()).map(|(a, b)| a * 10 + b), // 10-29
        just('3').ignore_then(i8_0_1()).map(|a| 30 + a),  // 30-31
        just('0').or_not().ignore_then(i8_1_9()),         // 1-9 / 01-09
    ))
}

/// ```txt
/// yeardaynum  = [plus / minus] ordyrday
/// ```
fn yeardaynum<'src, I, E>() -> impl Parser<'src, I, i16, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    is_positive()
        .then(ordyrday())
        .map(|(positive, n)| if positive { n } else { -n })
}

/// ```txt
/// ordyrday    = 1*3DIGIT      ;1 to 366
/// ```
fn ordyrday<'src, I, E>() -> impl Parser<'src, I, i16, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    let i16_1_99 = i16_1_9().then(i16_0_9().or_not()).map(|(a, b)| match b {
        Some(b) => a * 10 + b, // 10-99
        None => a,             // 1-9
    });

    choice((
        just('3').ignore_then(choice((
            just('6').ignore_then(i16_0_6()).map(|a| 360 + a), // 360-366
            i16_0_5().then(i16_0_9()).map(|(a, b)| 300 + a * 10 + b), // 300-359
        ))),
        i16_1_2()
            .then(i16_0_9())
            .then(i16_0_9())
            .map(|((a, b), c)| a * 100 + b * 10 + c), // 100-299
        just('0').or_not().ignore_then(choice((
            just('0').ignore_then(i16_1_9()), // 001-009
            i16_1_99,                         // 1-99 / 01-99 / 010-099
        ))),
    ))
}

/// ```txt
/// weeknum     = [plus / minus] ordwk
/// ```
fn weeknum<'src, I, E>() -> impl Parser<'src, I, i8, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    is_positive()
        .then(ordwk())
        .map(|(positive, n)| if positive { n } else { -n })
}

/// ```txt
/// monthnum    = 1*2DIGIT       ;1 to 12
/// ```
fn monthnum<'src, I, E>() -> impl Parser<'src, I, u8, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        just('0').ignore_then(u8_1_9()),                 // 01-09
        just('1').ignore_then(u8_0_9()).map(|a| 10 + a), // 10-19, range checked later
        u8_1_9(),                                        // 1-9
    ))
}

/// ```txt
/// setposday   = yeardaynum
/// ```
fn setposday<'src, I, E>() -> impl Parser<'src, I, i16, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    yeardaynum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Result<RecurrenceRule, RecurrenceError> {
        parse_rule(src)
    }

    #[test]
    fn parses_rrule_freq_only() {
        let freqs = [
            ("FREQ=SECONDLY", Frequency::Secondly),
            ("FREQ=MINUTELY", Frequency::Minutely),
            ("FREQ=HOURLY", Frequency::Hourly),
            ("FREQ=DAILY", Frequency::Daily),
            ("FREQ=WEEKLY", Frequency::Weekly),
            ("FREQ=MONTHLY", Frequency::Monthly),
            ("FREQ=YEARLY", Frequency::Yearly),
            ("freq=yearly", Frequency::Yearly),
        ];

        for (src, expected_freq) in freqs {
            let result = parse(src).unwrap();
            assert_eq!(result.freq(), expected_freq, "Failed for {src}");
            assert_eq!(result.bound(), RecurrenceBound::None);
            assert_eq!(result.interval(), 1);
            assert_eq!(result.wkst(), WeekDay::Monday);
        }
    }

    #[test]
    fn parses_rrule_with_interval() {
        let result = parse("FREQ=DAILY;INTERVAL=2").unwrap();
        assert_eq!(result.freq(), Frequency::Daily);
        assert_eq!(result.interval(), 2);

        // non-positive intervals are taken as 1
        assert_eq!(parse("FREQ=DAILY;INTERVAL=0").unwrap().interval(), 1);
        assert_eq!(parse("FREQ=DAILY;INTERVAL=-3").unwrap().interval(), 1);

        let err = parse("FREQ=DAILY;INTERVAL=x").unwrap_err();
        assert_eq!(err, RecurrenceError::InvalidInterval("x".to_owned()));
    }

    #[test]
    fn parses_rrule_with_until() {
        let result = parse("FREQ=DAILY;UNTIL=19971224T000000Z").unwrap();
        let until = result.until().unwrap();
        assert_eq!((until.year(), until.month(), until.day()), (1997, 12, 24));
        assert!(until.is_utc());
        assert!(!until.is_date());

        let result = parse("FREQ=DAILY;UNTIL=19971224").unwrap();
        let until = result.until().unwrap();
        assert_eq!((until.year(), until.month(), until.day()), (1997, 12, 24));
        assert!(until.is_date());

        let err = parse("FREQ=DAILY;UNTIL=1997").unwrap_err();
        assert_eq!(err, RecurrenceError::InvalidUntil("1997".to_owned()));
    }

    #[test]
    fn parses_rrule_with_count() {
        let result = parse("FREQ=DAILY;COUNT=10").unwrap();
        assert_eq!(result.count(), Some(10));

        for src in ["FREQ=DAILY;COUNT=0", "FREQ=DAILY;COUNT=ten"] {
            let err = parse(src).unwrap_err();
            assert!(
                matches!(err, RecurrenceError::InvalidCount(_)),
                "Failed for {src}"
            );
        }
    }

    #[test]
    fn parses_rrule_with_byday() {
        let result = parse("FREQ=WEEKLY;BYDAY=MO,WE,FR").unwrap();
        assert_eq!(
            result.by_day(),
            &[
                WeekDayNum::every(WeekDay::Monday),
                WeekDayNum::every(WeekDay::Wednesday),
                WeekDayNum::every(WeekDay::Friday),
            ]
        );

        let result = parse("FREQ=MONTHLY;BYDAY=1MO,-1MO,+2fr").unwrap();
        assert_eq!(
            result.by_day(),
            &[
                WeekDayNum::nth(1, WeekDay::Monday),
                WeekDayNum::nth(-1, WeekDay::Monday),
                WeekDayNum::nth(2, WeekDay::Friday),
            ]
        );
    }

    #[test]
    fn parses_rrule_with_numeric_parts() {
        #[rustfmt::skip]
        let cases = [
            ("FREQ=DAILY;BYHOUR=9,10,11,12,13,14,15,16", ByPart::ByHour(vec![9, 10, 11, 12, 13, 14, 15, 16])),
            ("FREQ=DAILY;BYMINUTE=0,20,40",              ByPart::ByMinute(vec![0, 20, 40])),
            ("FREQ=HOURLY;BYSECOND=0,15,30,45,60",       ByPart::BySecond(vec![0, 15, 30, 45, 60])),
            ("FREQ=MONTHLY;BYMONTHDAY=1,15,-1,+02",      ByPart::ByMonthDay(vec![1, 15, -1, 2])),
            ("FREQ=YEARLY;BYYEARDAY=1,100,200,-1,366",   ByPart::ByYearDay(vec![1, 100, 200, -1, 366])),
            ("FREQ=YEARLY;BYWEEKNO=20,21,-1,53",         ByPart::ByWeekNo(vec![20, 21, -1, 53])),
            ("FREQ=YEARLY;BYMONTH=1,2,03,12",            ByPart::ByMonth(vec![1, 2, 3, 12])),
            ("FREQ=MONTHLY;BYDAY=MO;BYSETPOS=-1,3",      ByPart::BySetPos(vec![-1, 3])),
        ];
        for (src, expected) in cases {
            let result = parse(src).unwrap();
            assert_eq!(result.part(expected.kind()), Some(&expected), "Failed for {src}");
        }
    }

    #[test]
    fn dedups_part_values() {
        let result = parse("FREQ=MONTHLY;BYMONTHDAY=3,1,3,2,1").unwrap();
        assert_eq!(result.by_month_day(), &[3, 1, 2]);
    }

    #[test]
    fn parses_rrule_with_wkst() {
        let result = parse("FREQ=WEEKLY;WKST=SU").unwrap();
        assert_eq!(result.wkst(), WeekDay::Sunday);

        let err = parse("FREQ=WEEKLY;WKST=SUN").unwrap_err();
        assert_eq!(err, RecurrenceError::InvalidWeekStart("SUN".to_owned()));
    }

    #[test]
    fn parses_rrule_complex() {
        // Example from RFC 5545
        let src = "FREQ=YEARLY;INTERVAL=2;BYMONTH=1;BYDAY=SU;BYHOUR=8,9;BYMINUTE=30";
        let result = parse(src).unwrap();
        assert_eq!(result.freq(), Frequency::Yearly);
        assert_eq!(result.interval(), 2);
        assert_eq!(result.by_month(), &[1]);
        assert_eq!(result.by_day(), &[WeekDayNum::every(WeekDay::Sunday)]);
        assert_eq!(result.by_hour(), &[8, 9]);
        assert_eq!(result.by_minute(), &[30]);
    }

    #[test]
    fn keeps_unknown_parts_as_extensions() {
        let result = parse("RSCALE=GREGORIAN;FREQ=YEARLY;X-NAME=Some Value").unwrap();
        assert_eq!(
            result.extensions(),
            &[
                ("RSCALE".to_owned(), "GREGORIAN".to_owned()),
                ("X-NAME".to_owned(), "Some Value".to_owned()),
            ]
        );
    }

    #[test]
    fn parses_rrule_rejects_invalid_values() {
        #[rustfmt::skip]
        let cases = [
            ("FREQ=WEEKLY;BYDAY=MO,XX",   ByPartKind::ByDay,      "XX"),
            ("FREQ=WEEKLY;BYDAY=0MO",     ByPartKind::ByDay,      "0MO"),
            ("FREQ=DAILY;BYHOUR=24",      ByPartKind::ByHour,     "24"),
            ("FREQ=DAILY;BYMINUTE=60",    ByPartKind::ByMinute,   "60"),
            ("FREQ=DAILY;BYSECOND=61",    ByPartKind::BySecond,   "61"),
            ("FREQ=MONTHLY;BYMONTHDAY=0", ByPartKind::ByMonthDay, "0"),
            ("FREQ=MONTHLY;BYMONTHDAY=32",ByPartKind::ByMonthDay, "32"),
            ("FREQ=YEARLY;BYYEARDAY=367", ByPartKind::ByYearDay,  "367"),
            ("FREQ=YEARLY;BYWEEKNO=54",   ByPartKind::ByWeekNo,   "54"),
            ("FREQ=YEARLY;BYMONTH=13",    ByPartKind::ByMonth,    "13"),
            ("FREQ=YEARLY;BYMONTH=1,,2",  ByPartKind::ByMonth,    ""),
            ("FREQ=YEARLY;BYSETPOS=a",    ByPartKind::BySetPos,   "A"),
        ];
        for (src, kind, bad) in cases {
            match parse(src) {
                Err(RecurrenceError::InvalidPartValue { part, token, .. }) => {
                    assert_eq!(part, kind, "Failed for {src}");
                    assert_eq!(token, bad, "Failed for {src}");
                }
                other => panic!("Parse {src} should fail, got {other:?}"),
            }
        }
    }

    #[test]
    fn parses_rrule_rejects_malformed_rules() {
        assert_eq!(
            parse("INTERVAL=2;COUNT=10").unwrap_err(),
            RecurrenceError::MissingFrequency
        );
        assert_eq!(
            parse("FREQ=DAILY;UNTIL=19971224T000000Z;COUNT=10").unwrap_err(),
            RecurrenceError::CountUntilExclusion
        );
        assert_eq!(
            parse("FREQ=FORTNIGHTLY").unwrap_err(),
            RecurrenceError::InvalidFrequency("FORTNIGHTLY".to_owned())
        );
        assert_eq!(
            parse("FREQ=DAILY;BYDAY").unwrap_err(),
            RecurrenceError::MalformedSegment("BYDAY".to_owned())
        );
    }

    #[test]
    fn parses_rrule_handles_reordered_parts() {
        let result = parse("COUNT=10;INTERVAL=2;FREQ=DAILY;").unwrap();
        assert_eq!(result.freq(), Frequency::Daily);
        assert_eq!(result.count(), Some(10));
        assert_eq!(result.interval(), 2);
    }

    #[test]
    fn parses_rrule_rejects_duplicate_parts() {
        let test_cases = [
            ("FREQ=DAILY;FREQ=WEEKLY", "FREQ"),
            (
                "FREQ=DAILY;UNTIL=19971224T000000Z;UNTIL=19971225T000000Z",
                "UNTIL",
            ),
            ("FREQ=DAILY;COUNT=10;COUNT=20", "COUNT"),
            ("FREQ=DAILY;INTERVAL=1;INTERVAL=2", "INTERVAL"),
            ("FREQ=WEEKLY;BYDAY=MO;BYDAY=FR", "BYDAY"),
            ("FREQ=DAILY;BYHOUR=9;byhour=10", "BYHOUR"),
        ];

        for (src, part_name) in test_cases {
            assert_eq!(
                parse(src).unwrap_err(),
                RecurrenceError::DuplicatePart(part_name.to_owned()),
                "Duplicate {part_name} should fail for input: {src}"
            );
        }
    }

    #[test]
    fn parses_single_weekdaynum() {
        assert_eq!(
            parse_weekdaynum("-1fr").unwrap(),
            WeekDayNum::nth(-1, WeekDay::Friday)
        );
        assert_eq!(
            "TH".parse::<WeekDayNum>().unwrap(),
            WeekDayNum::every(WeekDay::Thursday)
        );
        assert!(parse_weekdaynum("1").is_err());
        assert!(parse_weekdaynum("54MO").is_err());
    }
}

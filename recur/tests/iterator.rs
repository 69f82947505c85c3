// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use aimcal_recur::{
    RecurrenceError, RecurrenceRule, RuleValidationError, Time, normalize_by_month_day_rules,
};

fn occurrences(rule: &str, dtstart: &str, limit: usize) -> Vec<String> {
    let rule: RecurrenceRule = rule.parse().unwrap();
    let dtstart: Time = dtstart.parse().unwrap();
    rule.iterator(dtstart)
        .unwrap()
        .take(limit)
        .map(|t| t.to_string())
        .collect()
}

#[test]
fn daily_with_count() {
    let got = occurrences("FREQ=DAILY;COUNT=10", "20120901T090000", 100);
    let want: Vec<String> = (1..=10).map(|d| format!("201209{d:02}T090000")).collect();
    assert_eq!(got, want);
}

#[test]
fn weekly_with_count() {
    let got = occurrences("FREQ=WEEKLY;COUNT=10", "20120105T090000", 100);
    assert_eq!(
        got,
        [
            "20120105T090000",
            "20120112T090000",
            "20120119T090000",
            "20120126T090000",
            "20120202T090000",
            "20120209T090000",
            "20120216T090000",
            "20120223T090000",
            "20120301T090000",
            "20120308T090000",
        ]
    );
}

#[test]
fn monthly_first_friday() {
    let got = occurrences("FREQ=MONTHLY;BYDAY=1FR;COUNT=10", "20120107", 100);
    assert_eq!(
        got,
        [
            "20120203", "20120302", "20120406", "20120504", "20120601", "20120706", "20120803",
            "20120907", "20121005", "20121102",
        ]
    );
}

#[test]
fn monthly_negative_month_day() {
    let got = occurrences("FREQ=MONTHLY;BYMONTHDAY=-3", "20120101", 3);
    assert_eq!(got, ["20120129", "20120227", "20120329"]);
}

#[test]
fn monthly_skips_short_months() {
    let got = occurrences("FREQ=MONTHLY;BYMONTHDAY=31", "20120131", 4);
    assert_eq!(got, ["20120131", "20120331", "20120531", "20120731"]);
}

#[test]
fn monthly_last_workday() {
    let got = occurrences(
        "FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1;COUNT=3",
        "19970929T090000",
        10,
    );
    assert_eq!(got, ["19970930T090000", "19971031T090000", "19971128T090000"]);
}

#[test]
fn yearly_leap_day() {
    let got = occurrences("FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=29", "20120229", 3);
    assert_eq!(got, ["20120229", "20160229", "20200229"]);
}

#[test]
fn yearly_nth_weekday_of_year() {
    let got = occurrences("FREQ=YEARLY;BYDAY=20MO", "19970519T090000", 3);
    assert_eq!(got, ["19970519T090000", "19980518T090000", "19990517T090000"]);
}

#[test]
fn yearly_week_number() {
    let got = occurrences("FREQ=YEARLY;BYWEEKNO=20;BYDAY=MO", "19970512T090000", 3);
    assert_eq!(got, ["19970512T090000", "19980511T090000", "19990517T090000"]);
}

#[test]
fn daily_interval() {
    let got = occurrences("FREQ=DAILY;INTERVAL=10;COUNT=5", "19970902T090000", 100);
    assert_eq!(
        got,
        [
            "19970902T090000",
            "19970912T090000",
            "19970922T090000",
            "19971002T090000",
            "19971012T090000",
        ]
    );
}

#[test]
fn hourly_until() {
    let got = occurrences(
        "FREQ=HOURLY;INTERVAL=3;UNTIL=19970902T170000Z",
        "19970902T090000Z",
        100,
    );
    assert_eq!(got, ["19970902T090000Z", "19970902T120000Z", "19970902T150000Z"]);
}

#[test]
fn minutely_interval() {
    let got = occurrences("FREQ=MINUTELY;INTERVAL=15;COUNT=6", "19970902T090000", 100);
    assert_eq!(
        got,
        [
            "19970902T090000",
            "19970902T091500",
            "19970902T093000",
            "19970902T094500",
            "19970902T100000",
            "19970902T101500",
        ]
    );
}

#[test]
fn until_is_inclusive() {
    let got = occurrences("FREQ=DAILY;UNTIL=20120905T090000", "20120901T090000", 100);
    assert_eq!(got.len(), 5);
    assert_eq!(got.last().map(String::as_str), Some("20120905T090000"));
}

#[test]
fn occurrences_increase_strictly() {
    let rule: RecurrenceRule = "FREQ=MONTHLY;BYDAY=MO,FR;BYHOUR=9,17".parse().unwrap();
    let dtstart = Time::date_time(2012, 1, 2, 9, 0, 0).unwrap();
    let all: Vec<Time> = rule.iterator(dtstart).unwrap().take(300).collect();
    assert_eq!(all.len(), 300);
    assert!(all.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(all.first(), Some(&dtstart));
}

#[test]
fn enumeration_is_deterministic() {
    let a = occurrences("FREQ=YEARLY;BYMONTH=3;BYDAY=-1SU", "20000326T010000", 50);
    let b = occurrences("FREQ=YEARLY;BYMONTH=3;BYDAY=-1SU", "20000326T010000", 50);
    assert_eq!(a.len(), 50);
    assert_eq!(a, b);
}

#[test]
fn stays_complete() {
    let rule: RecurrenceRule = "FREQ=DAILY;COUNT=2".parse().unwrap();
    let mut iter = rule.iterator("20120101".parse().unwrap()).unwrap();
    assert!(iter.next().is_some());
    assert!(iter.next().is_some());
    assert!(iter.next().is_none());
    assert!(iter.is_completed());
    assert!(iter.next().is_none());
    assert_eq!(iter.occurrence_number(), 2);
}

#[test]
fn rejects_invalid_combinations() {
    #[rustfmt::skip]
    let cases = [
        ("FREQ=MONTHLY;BYWEEKNO=30",               RuleValidationError::MonthlyWithYearParts),
        ("FREQ=WEEKLY;BYMONTHDAY=1",               RuleValidationError::WeeklyWithDayParts),
        ("FREQ=DAILY;BYYEARDAY=1",                 RuleValidationError::ByYearDayNotYearly),
        ("FREQ=DAILY;BYWEEKNO=1",                  RuleValidationError::ByWeekNoNotYearly),
        ("FREQ=YEARLY;BYYEARDAY=1;BYMONTH=1",      RuleValidationError::InvalidByYearDay),
        ("FREQ=YEARLY;BYWEEKNO=1;BYMONTHDAY=1",    RuleValidationError::ByWeekNoWithByMonthDay),
        ("FREQ=WEEKLY;BYDAY=1MO",                  RuleValidationError::MalformedByDay),
        ("FREQ=MONTHLY;BYDAY=6MO",                 RuleValidationError::MalformedByDay),
        ("FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=30",    RuleValidationError::ByMonthDayOutOfMonth),
    ];

    let dtstart = Time::date(2012, 1, 1).unwrap();
    for (src, want) in cases {
        let rule: RecurrenceRule = src.parse().unwrap();
        let err = rule.iterator(dtstart).unwrap_err();
        assert_eq!(err, RecurrenceError::Validation(want), "case: {src}");
    }
}

#[test]
fn validation_messages() {
    let rule: RecurrenceRule = "FREQ=MONTHLY;BYWEEKNO=30".parse().unwrap();
    let err = rule.iterator(Time::date(2012, 1, 1).unwrap()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "For MONTHLY recurrences neither BYYEARDAY nor BYWEEKNO may appear"
    );
}

#[test]
fn normalizes_month_days() {
    assert_eq!(normalize_by_month_day_rules(2012, 2, &[-1, 1, 30]), [1, 29]);
    assert_eq!(normalize_by_month_day_rules(2012, 4, &[-30, 31, 15]), [1, 15]);
    assert_eq!(normalize_by_month_day_rules(2013, 2, &[-1, -28]), [1, 28]);
    assert!(normalize_by_month_day_rules(2013, 2, &[30, -31]).is_empty());
}

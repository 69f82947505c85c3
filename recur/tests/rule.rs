// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use aimcal_recur::{
    ByPart, ByPartKind, Frequency, RecurrenceBound, RecurrenceError, RecurrenceRule, Time, WeekDay,
    WeekDayNum,
};

#[test]
fn parse_and_format_round_trip() {
    #[rustfmt::skip]
    let cases = [
        "FREQ=DAILY;COUNT=10",
        "FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE,FR;WKST=SU",
        "FREQ=MONTHLY;BYDAY=-1FR,2MO;BYSETPOS=-1",
        "FREQ=YEARLY;BYMONTH=1,2;BYDAY=SU;BYHOUR=8,9;BYMINUTE=30",
        "FREQ=YEARLY;BYYEARDAY=1,100,-1;UNTIL=20201231T235959Z",
        "FREQ=YEARLY;BYWEEKNO=20;BYDAY=MO",
        "FREQ=MINUTELY;INTERVAL=15;BYHOUR=9,10,11",
        "FREQ=SECONDLY;BYSECOND=0,30",
    ];

    for src in cases {
        let rule: RecurrenceRule = src.parse().unwrap();
        assert_eq!(rule.to_string(), src, "case: {src}");
        let again: RecurrenceRule = rule.to_string().parse().unwrap();
        assert_eq!(again, rule, "case: {src}");
    }
}

#[test]
fn parse_is_case_insensitive() {
    let rule: RecurrenceRule = "freq=weekly;byday=mo,-1fr;wkst=su".parse().unwrap();
    assert_eq!(rule.freq(), Frequency::Weekly);
    assert_eq!(rule.wkst(), WeekDay::Sunday);
    assert_eq!(
        rule.by_day(),
        &[
            WeekDayNum::every(WeekDay::Monday),
            WeekDayNum::nth(-1, WeekDay::Friday)
        ]
    );
}

#[test]
fn parse_reads_until() {
    let rule: RecurrenceRule = "FREQ=DAILY;UNTIL=20121224".parse().unwrap();
    assert_eq!(
        rule.bound(),
        RecurrenceBound::Until(Time::date(2012, 12, 24).unwrap())
    );
    assert!(rule.until().unwrap().is_date());

    // the bound is a plain value that outlives the rule it came from
    let bound = rule.bound();
    drop(rule);
    assert!(matches!(bound, RecurrenceBound::Until(t) if t.is_date()));

    let rule: RecurrenceRule = "FREQ=DAILY;UNTIL=20121224T100000Z".parse().unwrap();
    let until = rule.until().unwrap();
    assert!(until.is_utc());
    assert_eq!(until.hour(), 10);
}

#[test]
fn parse_keeps_unknown_parts() {
    let rule: RecurrenceRule = "X-NAME=foo;FREQ=DAILY;RSCALE=GREGORIAN".parse().unwrap();
    assert_eq!(
        rule.extensions(),
        &[
            ("X-NAME".to_owned(), "foo".to_owned()),
            ("RSCALE".to_owned(), "GREGORIAN".to_owned())
        ]
    );
    assert_eq!(rule.to_string(), "FREQ=DAILY;X-NAME=foo;RSCALE=GREGORIAN");
}

#[test]
fn parse_rejects_bad_rules() {
    #[rustfmt::skip]
    let cases = [
        "",
        "COUNT=3",
        "FREQ=FORTNIGHTLY",
        "FREQ=DAILY;COUNT=0",
        "FREQ=DAILY;COUNT=abc",
        "FREQ=DAILY;INTERVAL=x",
        "FREQ=DAILY;COUNT=2;UNTIL=20120101",
        "FREQ=DAILY;BYHOUR=24",
        "FREQ=DAILY;BYMINUTE=60",
        "FREQ=MONTHLY;BYMONTHDAY=0",
        "FREQ=MONTHLY;BYMONTHDAY=32",
        "FREQ=YEARLY;BYYEARDAY=367",
        "FREQ=YEARLY;BYWEEKNO=54",
        "FREQ=YEARLY;BYMONTH=13",
        "FREQ=MONTHLY;BYDAY=XX",
        "FREQ=MONTHLY;BYSETPOS=0",
        "FREQ=DAILY;WKST=XY",
        "FREQ=DAILY;FREQ=WEEKLY",
        "FREQ=DAILY;BYHOUR",
    ];

    for src in cases {
        assert!(src.parse::<RecurrenceRule>().is_err(), "case: {src}");
    }
}

#[test]
fn parse_reports_the_failing_part() {
    let err = "FREQ=DAILY;COUNT=2;UNTIL=20120101"
        .parse::<RecurrenceRule>()
        .unwrap_err();
    assert_eq!(err, RecurrenceError::CountUntilExclusion);

    let err = "FREQ=DAILY;BYHOUR=25".parse::<RecurrenceRule>().unwrap_err();
    assert!(matches!(
        err,
        RecurrenceError::InvalidPartValue {
            part: ByPartKind::ByHour,
            ..
        }
    ));

    let err = "FREQ=DAILY;FREQ=DAILY".parse::<RecurrenceRule>().unwrap_err();
    assert!(matches!(err, RecurrenceError::DuplicatePart(_)));
}

#[test]
fn builder_matches_parsed_rule() {
    let built = RecurrenceRule::new(Frequency::Monthly)
        .with_interval(2)
        .with_count(5)
        .unwrap()
        .with_part(ByPart::ByDay(vec![WeekDayNum::nth(1, WeekDay::Friday)]))
        .unwrap();
    let parsed: RecurrenceRule = "FREQ=MONTHLY;INTERVAL=2;COUNT=5;BYDAY=1FR".parse().unwrap();
    assert_eq!(built, parsed);
    assert!(built.is_finite());
    assert!(built.is_by_count());
}

#[test]
fn clone_is_independent() {
    let rule: RecurrenceRule = "FREQ=WEEKLY;BYDAY=MO".parse().unwrap();
    let mut copy = rule.clone();
    copy.set_part(ByPart::ByDay(vec![WeekDayNum::every(WeekDay::Tuesday)]))
        .unwrap();
    assert_eq!(rule.to_string(), "FREQ=WEEKLY;BYDAY=MO");
    assert_eq!(copy.to_string(), "FREQ=WEEKLY;BYDAY=TU");
}

#[test]
fn finiteness() {
    #[rustfmt::skip]
    let cases = [
        ("FREQ=DAILY",                     false, false),
        ("FREQ=DAILY;COUNT=2",             true,  true),
        ("FREQ=DAILY;UNTIL=20120101",      true,  false),
    ];

    for (src, finite, by_count) in cases {
        let rule: RecurrenceRule = src.parse().unwrap();
        assert_eq!(rule.is_finite(), finite, "case: {src}");
        assert_eq!(rule.is_by_count(), by_count, "case: {src}");
    }
}

#[cfg(feature = "serde")]
#[test]
fn json_form() {
    let rule: RecurrenceRule = "FREQ=YEARLY;INTERVAL=2;BYMONTH=1;BYDAY=SU,-1MO;WKST=SU"
        .parse()
        .unwrap();
    let value = serde_json::to_value(&rule).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "freq": "YEARLY",
            "interval": 2,
            "wkst": "SU",
            "parts": {
                "BYDAY": ["SU", "-1MO"],
                "BYMONTH": 1,
            },
        })
    );

    let back: RecurrenceRule = serde_json::from_value(value).unwrap();
    assert_eq!(back, rule);

    // parts keep the order they were written in
    let text = serde_json::to_string(&rule).unwrap();
    assert_eq!(
        text,
        r#"{"freq":"YEARLY","interval":2,"wkst":"SU","parts":{"BYMONTH":1,"BYDAY":["SU","-1MO"]}}"#
    );
    let back: RecurrenceRule = serde_json::from_str(&text).unwrap();
    assert_eq!(back.to_string(), rule.to_string());

    let from_numbers: RecurrenceRule = serde_json::from_value(serde_json::json!({
        "freq": "weekly",
        "wkst": 1,
        "count": 3,
        "parts": { "BYMONTHDAY": "1,-1" },
    }))
    .unwrap();
    assert_eq!(from_numbers.wkst(), WeekDay::Sunday);
    assert_eq!(from_numbers.count(), Some(3));
    assert_eq!(from_numbers.by_month_day(), &[1, -1]);
}

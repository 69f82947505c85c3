// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Structured form of a recurrence rule.

use crate::error::RecurrenceError;
use crate::keyword::{
    KW_RRULE_COUNT, KW_RRULE_FREQ, KW_RRULE_INTERVAL, KW_RRULE_UNTIL, KW_RRULE_WKST,
};
use crate::rule::parser::{RuleBuilder, interval_from_i64, parse_part};
use crate::rule::{ByPart, ByPartKind, Frequency, RecurrenceBound, RecurrenceRule, WeekDay};
use crate::time::Time;

/// A recurrence rule as plain data, e.g. decoded from JSON.
///
/// Scalars may be missing; by-part values may be integers or strings, given
/// once or as a list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct RecurrenceRuleData {
    /// FREQ token
    pub freq: Option<String>,
    /// INTERVAL, non-positive values are taken as 1
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub interval: Option<i64>,
    /// WKST as a token or a number with Sunday as 1
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub wkst: Option<WeekStartData>,
    /// UNTIL as a DATE or DATE-TIME string
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub until: Option<String>,
    /// COUNT
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub count: Option<i64>,
    /// By-parts keyed by their upper-case name, in rule order
    #[cfg_attr(
        feature = "serde",
        serde(with = "ordered_parts", skip_serializing_if = "Vec::is_empty")
    )]
    pub parts: Vec<(ByPartKind, PartData)>,
    /// Unknown parts, kept verbatim
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    pub extensions: Vec<(String, String)>,
}

/// Week start given either way.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
#[expect(missing_docs)]
pub enum WeekStartData {
    Number(u8),
    Name(String),
}

/// One value or a list of values of a by-part.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
#[expect(missing_docs)]
pub enum PartData {
    One(PartValue),
    Many(Vec<PartValue>),
}

impl PartData {
    fn into_vec(self) -> Vec<PartValue> {
        match self {
            Self::One(v) => vec![v],
            Self::Many(v) => v,
        }
    }
}

/// A single by-part value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
#[expect(missing_docs)]
pub enum PartValue {
    Int(i64),
    Text(String),
}

impl RecurrenceRule {
    /// Builds a rule from structured data, with the same checks as parsing
    /// the string form.
    ///
    /// # Errors
    ///
    /// Fails on a missing or unknown frequency, on COUNT and UNTIL given
    /// together, or on any value that does not fit its part.
    pub fn from_data(data: RecurrenceRuleData) -> Result<Self, RecurrenceError> {
        let mut builder = RuleBuilder::default();

        let freq = data.freq.ok_or(RecurrenceError::MissingFrequency)?;
        builder.freq(KW_RRULE_FREQ, freq.parse::<Frequency>()?)?;

        if let Some(interval) = data.interval {
            let interval = interval_from_i64(interval)
                .ok_or_else(|| RecurrenceError::InvalidInterval(interval.to_string()))?;
            builder.interval(KW_RRULE_INTERVAL, interval)?;
        }

        if let Some(count) = data.count {
            let count = u32::try_from(count)
                .ok()
                .filter(|c| *c > 0)
                .ok_or_else(|| RecurrenceError::InvalidCount(count.to_string()))?;
            builder.count(KW_RRULE_COUNT, count)?;
        }

        if let Some(until) = data.until {
            let time = until
                .parse::<Time>()
                .map_err(|_| RecurrenceError::InvalidUntil(until.clone()))?;
            builder.until(KW_RRULE_UNTIL, time)?;
        }

        if let Some(wkst) = data.wkst {
            let wkst = match wkst {
                WeekStartData::Number(n) => WeekDay::from_number(n)
                    .ok_or_else(|| RecurrenceError::InvalidWeekStart(n.to_string()))?,
                WeekStartData::Name(name) => name
                    .parse::<WeekDay>()
                    .map_err(|_| RecurrenceError::InvalidWeekStart(name))?,
            };
            builder.wkst(KW_RRULE_WKST, wkst)?;
        }

        for (kind, values) in data.parts {
            let tokens: Vec<String> = values
                .into_vec()
                .into_iter()
                .flat_map(|v| match v {
                    PartValue::Int(n) => vec![n.to_string()],
                    PartValue::Text(s) => s
                        .to_ascii_uppercase()
                        .split(',')
                        .map(ToOwned::to_owned)
                        .collect(),
                })
                .collect();
            builder.part(parse_part(kind, tokens.iter().map(String::as_str))?)?;
        }

        for (name, value) in data.extensions {
            builder.extension(name.to_ascii_uppercase(), value)?;
        }

        builder.build()
    }

    /// Structured form of this rule. Numeric parts become integers, BYDAY
    /// entries become tokens; single values are not wrapped in a list.
    #[must_use]
    pub fn to_data(&self) -> RecurrenceRuleData {
        let parts = self
            .parts
            .iter()
            .map(|part| {
                let mut values = part_values(part);
                let data = if values.len() == 1 {
                    PartData::One(values.remove(0))
                } else {
                    PartData::Many(values)
                };
                (part.kind(), data)
            })
            .collect();

        let (count, until) = match &self.bound {
            RecurrenceBound::None => (None, None),
            RecurrenceBound::Count(count) => (Some(i64::from(*count)), None),
            RecurrenceBound::Until(until) => (None, Some(until.to_string())),
        };

        RecurrenceRuleData {
            freq: Some(self.freq.to_string()),
            interval: (self.interval > 1).then_some(i64::from(self.interval)),
            wkst: (self.wkst != WeekDay::Monday).then(|| WeekStartData::Name(self.wkst.to_string())),
            until,
            count,
            parts,
            extensions: self.extensions.clone(),
        }
    }
}

fn part_values(part: &ByPart) -> Vec<PartValue> {
    fn ints<T: Copy + Into<i64>>(values: &[T]) -> Vec<PartValue> {
        values.iter().map(|v| PartValue::Int((*v).into())).collect()
    }

    match part {
        ByPart::BySecond(v) | ByPart::ByMinute(v) | ByPart::ByHour(v) | ByPart::ByMonth(v) => {
            ints(v)
        }
        ByPart::ByMonthDay(v) | ByPart::ByWeekNo(v) => ints(v),
        ByPart::ByYearDay(v) | ByPart::BySetPos(v) => ints(v),
        ByPart::ByDay(v) => v.iter().map(|d| PartValue::Text(d.to_string())).collect(),
    }
}

/// Writes the parts as a map and reads them back without losing their order.
#[cfg(feature = "serde")]
mod ordered_parts {
    use std::fmt;

    use serde::de::{self, MapAccess};
    use serde::{Deserializer, Serializer};

    use super::PartData;
    use crate::rule::ByPartKind;

    pub fn serialize<S>(parts: &[(ByPartKind, PartData)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(parts.iter().map(|(kind, data)| (kind, data)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(ByPartKind, PartData)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PartsVisitor;

        impl<'de> de::Visitor<'de> for PartsVisitor {
            type Value = Vec<(ByPartKind, PartData)>;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a map from by-part names to values")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut parts = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    parts.push(entry);
                }
                Ok(parts)
            }
        }

        deserializer.deserialize_map(PartsVisitor)
    }
}

impl From<RecurrenceRule> for RecurrenceRuleData {
    fn from(rule: RecurrenceRule) -> Self {
        rule.to_data()
    }
}

impl TryFrom<RecurrenceRuleData> for RecurrenceRule {
    type Error = RecurrenceError;

    fn try_from(data: RecurrenceRuleData) -> Result<Self, Self::Error> {
        Self::from_data(data)
    }
}

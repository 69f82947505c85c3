// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Recurrence-related properties of a calendar component.
//!
//! The expansion only needs to ask a component for its properties by name,
//! so any calendar model can take part by implementing [`RecurrenceSource`].
//! [`Component`] is a small in-memory implementation of it:
//!
//! - 3.8.2.4: `DTSTART` - first instance, fixes the date kind of every instance
//! - 3.8.2.2: `DTEND` / 3.8.2.5: `DURATION` - length of each instance
//! - 3.8.5.1: `EXDATE` - excluded instances
//! - 3.8.5.2: `RDATE` - extra instances
//! - 3.8.5.3: `RRULE` - rule-generated instances
//! - 3.8.4.4: `RECURRENCE-ID` - identifies an overridden instance

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::duration::Duration;
use crate::error::RecurrenceError;
use crate::expansion::RecurrenceExpansion;
use crate::keyword::{
    KW_DTEND, KW_DTSTART, KW_DURATION, KW_EXDATE, KW_EXRULE, KW_RDATE, KW_RECURRENCE_ID, KW_RRULE,
};
use crate::rule::RecurrenceRule;
use crate::time::Time;

/// Names of the properties the expansion reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(missing_docs)]
pub enum PropertyName {
    DtStart,
    DtEnd,
    Duration,
    RRule,
    ExRule,
    RDate,
    ExDate,
    RecurrenceId,
}

impl PropertyName {
    /// Upper-case property name as written in iCalendar.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DtStart => KW_DTSTART,
            Self::DtEnd => KW_DTEND,
            Self::Duration => KW_DURATION,
            Self::RRule => KW_RRULE,
            Self::ExRule => KW_EXRULE,
            Self::RDate => KW_RDATE,
            Self::ExDate => KW_EXDATE,
            Self::RecurrenceId => KW_RECURRENCE_ID,
        }
    }

    const ALL: [Self; 8] = [
        Self::DtStart,
        Self::DtEnd,
        Self::Duration,
        Self::RRule,
        Self::ExRule,
        Self::RDate,
        Self::ExDate,
        Self::RecurrenceId,
    ];
}

impl Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl FromStr for PropertyName {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| RecurrenceError::MalformedSegment(s.to_owned()))
    }
}

/// A single property value.
#[derive(Debug, Clone, PartialEq)]
#[expect(missing_docs)]
pub enum PropertyValue {
    Time(Time),
    Duration(Duration),
    Rule(RecurrenceRule),
}

impl PropertyValue {
    /// The value as a date or date-time, if it is one.
    #[must_use]
    pub fn as_time(&self) -> Option<&Time> {
        match self {
            Self::Time(t) => Some(t),
            _ => None,
        }
    }

    /// The value as a rule, if it is one.
    #[must_use]
    pub fn as_rule(&self) -> Option<&RecurrenceRule> {
        match self {
            Self::Rule(r) => Some(r),
            _ => None,
        }
    }

    /// The value as a duration, if it is one.
    #[must_use]
    pub fn as_duration(&self) -> Option<&Duration> {
        match self {
            Self::Duration(d) => Some(d),
            _ => None,
        }
    }
}

/// One property line: a name and its values.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    name: PropertyName,
    values: Vec<PropertyValue>,
}

impl Property {
    /// Creates a property from already typed values.
    #[must_use]
    pub fn new(name: PropertyName, values: Vec<PropertyValue>) -> Self {
        Self { name, values }
    }

    /// Creates a property holding dates or date-times, such as RDATE or EXDATE.
    #[must_use]
    pub fn times(name: PropertyName, times: impl IntoIterator<Item = Time>) -> Self {
        Self::new(name, times.into_iter().map(PropertyValue::Time).collect())
    }

    /// Creates a property holding a single rule, such as RRULE or EXRULE.
    #[must_use]
    pub fn rule(name: PropertyName, rule: RecurrenceRule) -> Self {
        Self::new(name, vec![PropertyValue::Rule(rule)])
    }

    /// Parses the value text of a property.
    ///
    /// Rules take a single recurrence rule, DURATION a single duration, and
    /// every other name a comma-separated list of dates or date-times.
    ///
    /// # Errors
    ///
    /// Fails when the text does not fit the value type of the property.
    pub fn from_value_str(name: PropertyName, raw: &str) -> Result<Self, RecurrenceError> {
        let values = match name {
            PropertyName::RRule | PropertyName::ExRule => vec![PropertyValue::Rule(raw.parse()?)],
            PropertyName::Duration => vec![PropertyValue::Duration(raw.parse()?)],
            _ => raw
                .split(',')
                .map(|s| s.trim().parse().map(PropertyValue::Time))
                .collect::<Result<_, _>>()?,
        };
        Ok(Self { name, values })
    }

    /// Name of the property.
    #[must_use]
    pub const fn name(&self) -> PropertyName {
        self.name
    }

    /// All values of the property, in the order given.
    #[must_use]
    pub fn values(&self) -> &[PropertyValue] {
        &self.values
    }

    /// The first value, if any.
    #[must_use]
    pub fn first_value(&self) -> Option<&PropertyValue> {
        self.values.first()
    }
}

/// Something that can hand out its recurrence-related properties.
pub trait RecurrenceSource {
    /// All properties with the given name, in document order.
    fn all_properties(&self, name: PropertyName) -> Vec<&Property>;

    /// Whether at least one property with the given name exists.
    fn has_property(&self, name: PropertyName) -> bool {
        !self.all_properties(name).is_empty()
    }

    /// The first value of the first property with the given name.
    fn first_value(&self, name: PropertyName) -> Option<&PropertyValue> {
        self.all_properties(name)
            .into_iter()
            .find_map(Property::first_value)
    }
}

/// A minimal calendar component, e.g. a `VEVENT`.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    name: String,
    properties: Vec<Property>,
}

impl Component {
    /// Creates an empty component, e.g. `Component::new("VEVENT")`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    /// Adds a property, builder style.
    #[must_use]
    pub fn with_property(mut self, property: Property) -> Self {
        self.add_property(property);
        self
    }

    /// Adds a property.
    pub fn add_property(&mut self, property: Property) {
        self.properties.push(property);
    }

    /// Component name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All properties in insertion order.
    #[must_use]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// The DTSTART value.
    #[must_use]
    pub fn dtstart(&self) -> Option<&Time> {
        self.first_value(PropertyName::DtStart)
            .and_then(PropertyValue::as_time)
    }

    /// Whether the component has recurrence properties at all.
    #[must_use]
    pub fn is_recurring(&self) -> bool {
        self.has_property(PropertyName::RRule) || self.has_property(PropertyName::RDate)
    }

    /// Lazily expands all instances of this component.
    ///
    /// # Errors
    ///
    /// Fails when DTSTART is missing or a rule does not validate.
    pub fn iterator(&self) -> Result<RecurrenceExpansion, RecurrenceError> {
        RecurrenceExpansion::from_component(self)
    }

    /// End of the instance starting at `start`.
    ///
    /// The length comes from DTEND minus DTSTART, else from DURATION. A
    /// component with a DATE start and neither property lasts one day, any
    /// other ends where it starts.
    ///
    /// # Errors
    ///
    /// Fails when the end leaves the supported date range.
    pub fn occurrence_end(&self, start: &Time) -> Result<Time, RecurrenceError> {
        let dtend = self
            .first_value(PropertyName::DtEnd)
            .and_then(PropertyValue::as_time);
        let duration = match (dtend, self.dtstart()) {
            (Some(end), Some(dtstart)) => Some(end.subtract(dtstart)?),
            _ => self
                .first_value(PropertyName::Duration)
                .and_then(PropertyValue::as_duration)
                .copied(),
        };

        match duration {
            Some(duration) => start.add_duration(&duration),
            None if start.is_date() => start.add_duration(&Duration::from_seconds(86_400)),
            None => Ok(*start),
        }
    }
}

impl RecurrenceSource for Component {
    fn all_properties(&self, name: PropertyName) -> Vec<&Property> {
        self.properties.iter().filter(|p| p.name == name).collect()
    }
}

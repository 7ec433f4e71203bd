//! Renewal urgency policy
//!
//! Classifies a document's expiry against today's date and its configured
//! lead time. Everything here is pure: no store access, no clock.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DocPulseError, Result};

/// Urgency of an upcoming or passed expiry
///
/// Serialized with the literal labels the notification templates match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Overdue,
    #[serde(rename = "Due Today")]
    DueToday,
    #[serde(rename = "Due Soon")]
    DueSoon,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Overdue, Severity::DueToday, Severity::DueSoon];

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Overdue => "Overdue",
            Severity::DueToday => "Due Today",
            Severity::DueSoon => "Due Soon",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Named lead-time classes offered to users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadTimeClass {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    Custom,
}

impl LeadTimeClass {
    /// Day count for the named classes; `None` for Custom
    pub fn fixed_days(&self) -> Option<u32> {
        match self {
            LeadTimeClass::OneDay => Some(1),
            LeadTimeClass::OneWeek => Some(7),
            LeadTimeClass::OneMonth => Some(30),
            LeadTimeClass::ThreeMonths => Some(90),
            LeadTimeClass::Custom => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LeadTimeClass::OneDay => "1D",
            LeadTimeClass::OneWeek => "1W",
            LeadTimeClass::OneMonth => "1M",
            LeadTimeClass::ThreeMonths => "3M",
            LeadTimeClass::Custom => "Custom",
        }
    }
}

impl fmt::Display for LeadTimeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LeadTimeClass {
    type Err = DocPulseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "1D" => Ok(LeadTimeClass::OneDay),
            "1W" => Ok(LeadTimeClass::OneWeek),
            "1M" => Ok(LeadTimeClass::OneMonth),
            "3M" => Ok(LeadTimeClass::ThreeMonths),
            "Custom" | "custom" => Ok(LeadTimeClass::Custom),
            other => Err(DocPulseError::Configuration(format!(
                "Unknown renewal lead time type: {:?} (expected 1D, 1W, 1M, 3M or Custom)",
                other
            ))),
        }
    }
}

/// Lead-time configuration of a document
///
/// A named class always carries its fixed day count. Only `Custom` keeps a
/// caller-supplied value, and switching back to a named class discards it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LeadTimeRepr", into = "LeadTimeRepr")]
pub struct RenewalLeadTime {
    class: LeadTimeClass,
    days: u32,
}

impl RenewalLeadTime {
    /// Lead time for a named class. `Custom` starts at zero days until
    /// [`set_custom_days`](Self::set_custom_days) supplies a value.
    pub fn named(class: LeadTimeClass) -> Self {
        Self {
            class,
            days: class.fixed_days().unwrap_or(0),
        }
    }

    pub fn custom(days: i64) -> Result<Self> {
        let mut lead_time = Self::named(LeadTimeClass::Custom);
        lead_time.set_custom_days(days)?;
        Ok(lead_time)
    }

    /// Build from a class and an optional custom value, as read from config
    /// or a command line
    pub fn resolve(class: LeadTimeClass, custom_days: Option<i64>) -> Result<Self> {
        match (class, custom_days) {
            (LeadTimeClass::Custom, Some(days)) => Self::custom(days),
            (LeadTimeClass::Custom, None) => Err(DocPulseError::Configuration(
                "Custom renewal lead time requires a day count".to_string(),
            )),
            (named, _) => Ok(Self::named(named)),
        }
    }

    pub fn class(&self) -> LeadTimeClass {
        self.class
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    /// Change the class, recomputing the day count for named classes
    pub fn set_class(&mut self, class: LeadTimeClass) {
        self.class = class;
        if let Some(days) = class.fixed_days() {
            self.days = days;
        }
    }

    /// Switch to `Custom` with an explicit day count
    pub fn set_custom_days(&mut self, days: i64) -> Result<()> {
        let days = u32::try_from(days).map_err(|_| {
            DocPulseError::Configuration(format!(
                "Renewal lead time must be between 0 and {} days, got {}",
                u32::MAX,
                days
            ))
        })?;
        self.class = LeadTimeClass::Custom;
        self.days = days;
        Ok(())
    }
}

impl Default for RenewalLeadTime {
    fn default() -> Self {
        Self::named(LeadTimeClass::OneMonth)
    }
}

#[derive(Serialize, Deserialize)]
struct LeadTimeRepr {
    class: LeadTimeClass,
    #[serde(default)]
    days: Option<i64>,
}

impl TryFrom<LeadTimeRepr> for RenewalLeadTime {
    type Error = DocPulseError;

    fn try_from(repr: LeadTimeRepr) -> Result<Self> {
        Self::resolve(repr.class, repr.days)
    }
}

impl From<RenewalLeadTime> for LeadTimeRepr {
    fn from(lead_time: RenewalLeadTime) -> Self {
        Self {
            class: lead_time.class,
            days: Some(i64::from(lead_time.days)),
        }
    }
}

/// Outcome of evaluating one document against the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    /// Whole days until expiry; negative once the expiry date has passed
    pub days_to_expiry: i64,
    pub severity: Severity,
}

/// Renewal urgency rules
pub struct RenewalPolicy;

impl RenewalPolicy {
    pub fn days_to_expiry(expiry_date: NaiveDate, today: NaiveDate) -> i64 {
        (expiry_date - today).num_days()
    }

    /// Severity for a day count, or `None` when the expiry is still beyond
    /// the lead time
    pub fn classify(days_to_expiry: i64, lead_time_days: u32) -> Option<Severity> {
        if days_to_expiry < 0 {
            Some(Severity::Overdue)
        } else if days_to_expiry == 0 {
            Some(Severity::DueToday)
        } else if days_to_expiry <= i64::from(lead_time_days) {
            Some(Severity::DueSoon)
        } else {
            None
        }
    }

    pub fn assess(
        expiry_date: NaiveDate,
        lead_time_days: u32,
        today: NaiveDate,
    ) -> Option<Assessment> {
        let days_to_expiry = Self::days_to_expiry(expiry_date, today);
        Self::classify(days_to_expiry, lead_time_days).map(|severity| Assessment {
            days_to_expiry,
            severity,
        })
    }

    /// First day on which a document enters its reminder window
    pub fn remind_from_date(expiry_date: NaiveDate, lead_time_days: u32) -> Option<NaiveDate> {
        expiry_date.checked_sub_days(Days::new(u64::from(lead_time_days)))
    }
}

//! Tracked document records
//!
//! Documents live in an arena keyed by [`DocumentId`]. Renewal chains are
//! expressed through the `predecessor`/`successor` id fields, never by
//! nesting one document inside another.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{DocPulseError, Result};
use crate::policy::{Assessment, RenewalLeadTime, RenewalPolicy, Severity};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id for a newly registered document
    pub fn generate() -> Self {
        Self(format!("DOC-{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Document status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
    Draft,
    Active,
    #[serde(rename = "Active Soon to Expire")]
    ActiveSoonToExpire,
    #[serde(rename = "Renewal In Progress")]
    RenewalInProgress,
    Expired,
    Renewed,
    Revoked,
    Cancelled,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::Draft => "Draft",
            Status::Active => "Active",
            Status::ActiveSoonToExpire => "Active Soon to Expire",
            Status::RenewalInProgress => "Renewal In Progress",
            Status::Expired => "Expired",
            Status::Renewed => "Renewed",
            Status::Revoked => "Revoked",
            Status::Cancelled => "Cancelled",
        }
    }

    /// No user or scanner transition leads anywhere from here except the
    /// revoke/cancel escape hatch on `Expired`
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Status::Expired | Status::Renewed | Status::Revoked | Status::Cancelled
        )
    }

    /// Ended by a person rather than by time
    pub fn is_terminated(&self) -> bool {
        matches!(self, Status::Renewed | Status::Revoked | Status::Cancelled)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Position of a document in its renewal chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    Current,
    Historical,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Current => f.write_str("Current"),
            LifecycleState::Historical => f.write_str("Historical"),
        }
    }
}

/// A tracked license, contract or certification
///
/// Descriptive fields are public. Status, chain links and the version
/// counter only change through the operations in [`crate::lifecycle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub document_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_no: Option<String>,
    pub category: String,
    pub authority: String,
    pub company: String,
    pub owner_person: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) renewal_date: Option<NaiveDate>,
    pub is_renewable: bool,
    #[serde(default)]
    pub(crate) renewal_lead_time: RenewalLeadTime,
    pub(crate) lifecycle_state: LifecycleState,
    pub(crate) status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) previous_status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) predecessor: Option<DocumentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) successor: Option<DocumentId>,
    #[serde(default)]
    pub(crate) renewal_count: u32,
    #[serde(default)]
    pub(crate) version: u64,
}

impl Document {
    /// New Draft/Current document from registration input
    pub fn draft(id: DocumentId, new: NewDocument) -> Result<Self> {
        new.validate()?;
        Ok(Self {
            id,
            document_name: new.document_name,
            reference_no: new.reference_no,
            category: new.category,
            authority: new.authority,
            company: new.company,
            owner_person: new.owner_person,
            department: new.department,
            issue_date: new.issue_date,
            expiry_date: new.expiry_date,
            renewal_date: None,
            is_renewable: new.is_renewable,
            renewal_lead_time: new.renewal_lead_time,
            lifecycle_state: LifecycleState::Current,
            status: Status::Draft,
            previous_status: None,
            predecessor: None,
            successor: None,
            renewal_count: 0,
            version: 0,
        })
    }

    pub fn expiry_date(&self) -> Option<NaiveDate> {
        self.expiry_date
    }

    pub fn renewal_date(&self) -> Option<NaiveDate> {
        self.renewal_date
    }

    pub fn renewal_lead_time(&self) -> RenewalLeadTime {
        self.renewal_lead_time
    }

    pub fn renewal_lead_time_days(&self) -> u32 {
        self.renewal_lead_time.days()
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        self.lifecycle_state
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Status held before entering `RenewalInProgress`
    pub fn previous_status(&self) -> Option<Status> {
        self.previous_status
    }

    pub fn predecessor(&self) -> Option<&DocumentId> {
        self.predecessor.as_ref()
    }

    pub fn successor(&self) -> Option<&DocumentId> {
        self.successor.as_ref()
    }

    pub fn renewal_count(&self) -> u32 {
        self.renewal_count
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_current(&self) -> bool {
        self.lifecycle_state == LifecycleState::Current
    }

    pub fn remind_from_date(&self) -> Option<NaiveDate> {
        self.expiry_date
            .and_then(|expiry| RenewalPolicy::remind_from_date(expiry, self.renewal_lead_time_days()))
    }

    pub fn days_remaining(&self, today: NaiveDate) -> Option<i64> {
        self.expiry_date
            .map(|expiry| RenewalPolicy::days_to_expiry(expiry, today))
    }

    pub fn assess(&self, today: NaiveDate) -> Option<Assessment> {
        self.expiry_date
            .and_then(|expiry| RenewalPolicy::assess(expiry, self.renewal_lead_time_days(), today))
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.days_remaining(today).is_some_and(|days| days < 0)
    }

    /// Inside the reminder window but not yet past expiry
    pub fn is_expiring_soon(&self, today: NaiveDate) -> bool {
        matches!(
            self.assess(today).map(|a| a.severity),
            Some(Severity::DueToday | Severity::DueSoon)
        )
    }
}

/// Registration input for a new document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocument {
    pub document_name: String,
    #[serde(default)]
    pub reference_no: Option<String>,
    pub category: String,
    pub authority: String,
    pub company: String,
    pub owner_person: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default = "default_renewable")]
    pub is_renewable: bool,
    #[serde(default)]
    pub renewal_lead_time: RenewalLeadTime,
}

fn default_renewable() -> bool {
    true
}

impl NewDocument {
    pub fn new(
        document_name: &str,
        category: &str,
        authority: &str,
        company: &str,
        owner_person: &str,
    ) -> Self {
        Self {
            document_name: document_name.to_string(),
            reference_no: None,
            category: category.to_string(),
            authority: authority.to_string(),
            company: company.to_string(),
            owner_person: owner_person.to_string(),
            department: None,
            issue_date: None,
            expiry_date: None,
            is_renewable: true,
            renewal_lead_time: RenewalLeadTime::default(),
        }
    }

    pub fn with_expiry(mut self, expiry_date: NaiveDate) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }

    pub fn with_lead_time(mut self, lead_time: RenewalLeadTime) -> Self {
        self.renewal_lead_time = lead_time;
        self
    }

    pub fn with_renewable(mut self, is_renewable: bool) -> Self {
        self.is_renewable = is_renewable;
        self
    }

    pub fn with_department(mut self, department: &str) -> Self {
        self.department = Some(department.to_string());
        self
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            ("document_name", &self.document_name),
            ("category", &self.category),
            ("company", &self.company),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DocPulseError::Validation(format!("{} is required", field)));
            }
        }
        if let (Some(issue), Some(expiry)) = (self.issue_date, self.expiry_date) {
            if expiry < issue {
                return Err(DocPulseError::Validation(format!(
                    "expiry date {} is before issue date {}",
                    expiry, issue
                )));
            }
        }
        Ok(())
    }
}

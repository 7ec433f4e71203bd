//! Document lifecycle state machine
//!
//! Every transition is a function over a single [`Document`] that checks its
//! guard before touching anything, so a failed call leaves the document
//! exactly as it was. User-invoked operations reject repeats: calling
//! `activate` twice fails the second time. Scanner-driven transitions
//! ([`apply_assessment`]) instead treat an already-applied transition as a
//! no-op.
//!
//! ```text
//!            activate                scanner             scanner
//!   Draft ───────────▶ Active ───────────▶ ActiveSoonToExpire ───────▶ Expired
//!     │                  │  ╲                    │
//!     │                  │   ╲── renew ──▶ Renewed (Historical) + new Draft successor
//!     ▼                  ▼                       ▼
//!        RenewalInProgress  ──revert──▶ (previous status)
//!
//!   revoke_or_cancel: Active ─▶ Revoked, anything else live ─▶ Cancelled
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::document::{Document, DocumentId, LifecycleState, Status};
use crate::error::{DocPulseError, Result};
use crate::policy::{Assessment, RenewalLeadTime, Severity};

/// User-invoked operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    SetExpiryDate,
    SetLeadTime,
    Activate,
    Renew,
    MarkRenewalInProgress,
    RevertRenewalStatus,
    RevokeOrCancel,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::SetExpiryDate,
        Operation::SetLeadTime,
        Operation::Activate,
        Operation::Renew,
        Operation::MarkRenewalInProgress,
        Operation::RevertRenewalStatus,
        Operation::RevokeOrCancel,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::SetExpiryDate => "set expiry date of",
            Operation::SetLeadTime => "set lead time of",
            Operation::Activate => "activate",
            Operation::Renew => "renew",
            Operation::MarkRenewalInProgress => "mark renewal in progress on",
            Operation::RevertRenewalStatus => "revert renewal status of",
            Operation::RevokeOrCancel => "revoke or cancel",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Guard shared by the operations and by [`allowed_operations`]
fn guard(
    operation: Operation,
    status: Status,
    lifecycle_state: LifecycleState,
    is_renewable: bool,
) -> std::result::Result<(), &'static str> {
    match operation {
        Operation::SetExpiryDate | Operation::SetLeadTime => {
            if status != Status::Draft {
                return Err("document details can only change while Draft");
            }
        }
        Operation::Activate => {
            if status != Status::Draft {
                return Err("only Draft documents can be activated");
            }
        }
        Operation::Renew => {
            if !is_renewable {
                return Err("document is not renewable");
            }
            if lifecycle_state != LifecycleState::Current {
                return Err("only Current documents can be renewed");
            }
            if status != Status::Active {
                return Err("only Active documents can be renewed");
            }
        }
        Operation::MarkRenewalInProgress => {
            if !matches!(
                status,
                Status::Active | Status::ActiveSoonToExpire | Status::Draft
            ) {
                return Err("document must be Active, Active Soon to Expire, or Draft");
            }
        }
        Operation::RevertRenewalStatus => {
            if status != Status::RenewalInProgress {
                return Err("document status must be Renewal In Progress to revert");
            }
        }
        Operation::RevokeOrCancel => {
            if status.is_terminated() {
                return Err("document is already terminated");
            }
        }
    }
    Ok(())
}

/// Operations a presentation layer may offer for a document in this state
pub fn allowed_operations(
    status: Status,
    lifecycle_state: LifecycleState,
    is_renewable: bool,
) -> Vec<Operation> {
    Operation::ALL
        .into_iter()
        .filter(|op| guard(*op, status, lifecycle_state, is_renewable).is_ok())
        .collect()
}

pub fn is_allowed(operation: Operation, document: &Document) -> bool {
    check(operation, document).is_ok()
}

fn check(operation: Operation, document: &Document) -> Result<()> {
    guard(
        operation,
        document.status,
        document.lifecycle_state,
        document.is_renewable,
    )
    .map_err(|reason| invalid(operation, document, reason))
}

fn invalid(operation: Operation, document: &Document, reason: &'static str) -> DocPulseError {
    DocPulseError::InvalidTransition {
        document: document.id.clone(),
        operation,
        status: document.status,
        reason,
    }
}

pub fn set_expiry_date(document: &mut Document, expiry_date: NaiveDate) -> Result<()> {
    check(Operation::SetExpiryDate, document)?;
    if let Some(issue) = document.issue_date {
        if expiry_date < issue {
            return Err(DocPulseError::Validation(format!(
                "expiry date {} is before issue date {}",
                expiry_date, issue
            )));
        }
    }
    document.expiry_date = Some(expiry_date);
    Ok(())
}

pub fn set_lead_time(document: &mut Document, lead_time: RenewalLeadTime) -> Result<()> {
    check(Operation::SetLeadTime, document)?;
    document.renewal_lead_time = lead_time;
    Ok(())
}

/// Draft → Active
pub fn activate(document: &mut Document) -> Result<()> {
    check(Operation::Activate, document)?;
    if document.expiry_date.is_none() {
        return Err(invalid(
            Operation::Activate,
            document,
            "an expiry date is required before activation",
        ));
    }
    document.status = Status::Active;
    document.previous_status = None;
    Ok(())
}

pub fn mark_renewal_in_progress(document: &mut Document) -> Result<()> {
    check(Operation::MarkRenewalInProgress, document)?;
    document.previous_status = Some(document.status);
    document.status = Status::RenewalInProgress;
    Ok(())
}

/// Restore the status recorded when the renewal was started
pub fn revert_renewal_status(document: &mut Document) -> Result<Status> {
    check(Operation::RevertRenewalStatus, document)?;
    let previous = document.previous_status.ok_or_else(|| {
        invalid(
            Operation::RevertRenewalStatus,
            document,
            "no status was recorded before the renewal started",
        )
    })?;
    document.status = previous;
    document.previous_status = None;
    Ok(previous)
}

/// Revoke an Active document, cancel anything else. Irreversible.
pub fn revoke_or_cancel(document: &mut Document) -> Result<Status> {
    check(Operation::RevokeOrCancel, document)?;
    let next = if document.status == Status::Active {
        Status::Revoked
    } else {
        Status::Cancelled
    };
    document.status = next;
    document.previous_status = None;
    Ok(next)
}

/// Both halves of a renewal, computed without touching any store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renewal {
    /// The renewed document, now `Renewed`/`Historical` and linked forward
    pub predecessor: Document,
    /// The new chain head, `Draft`/`Current` and linked back
    pub successor: Document,
}

/// Renew `document`, producing its successor draft
///
/// The successor copies the descriptive and renewal configuration but not
/// the expiry date: a fresh one has to be set before it can be activated.
pub fn renew(document: &Document, successor_id: DocumentId, today: NaiveDate) -> Result<Renewal> {
    check(Operation::Renew, document)?;

    let successor = Document {
        id: successor_id.clone(),
        document_name: document.document_name.clone(),
        reference_no: document.reference_no.clone(),
        category: document.category.clone(),
        authority: document.authority.clone(),
        company: document.company.clone(),
        owner_person: document.owner_person.clone(),
        department: document.department.clone(),
        issue_date: Some(today),
        expiry_date: None,
        renewal_date: None,
        is_renewable: document.is_renewable,
        renewal_lead_time: document.renewal_lead_time,
        lifecycle_state: LifecycleState::Current,
        status: Status::Draft,
        previous_status: None,
        predecessor: Some(document.id.clone()),
        successor: None,
        renewal_count: 0,
        version: 0,
    };

    let mut predecessor = document.clone();
    predecessor.status = Status::Renewed;
    predecessor.lifecycle_state = LifecycleState::Historical;
    predecessor.previous_status = None;
    predecessor.successor = Some(successor_id);
    predecessor.renewal_date = Some(today);
    predecessor.renewal_count += 1;

    Ok(Renewal {
        predecessor,
        successor,
    })
}

/// Status change made by the daily scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AutoTransition {
    MarkedSoonToExpire,
    MarkedExpired,
}

impl AutoTransition {
    pub fn target(&self) -> Status {
        match self {
            AutoTransition::MarkedSoonToExpire => Status::ActiveSoonToExpire,
            AutoTransition::MarkedExpired => Status::Expired,
        }
    }
}

/// Apply the scanner transition implied by `assessment`, if any
///
/// Returns `None` when the document is already in the right state or the
/// assessment calls for no change; that is not an error.
pub fn apply_assessment(document: &mut Document, assessment: &Assessment) -> Option<AutoTransition> {
    let transition = match (assessment.severity, document.status) {
        // A renewal in progress counts as initiated; it is left alone
        (Severity::Overdue, Status::Active | Status::ActiveSoonToExpire) => {
            AutoTransition::MarkedExpired
        }
        (Severity::DueToday | Severity::DueSoon, Status::Active) if document.is_renewable => {
            AutoTransition::MarkedSoonToExpire
        }
        _ => return None,
    };
    document.status = transition.target();
    Some(transition)
}

//! Report artifact produced by one scan

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::document::{Document, DocumentId, Status};
use crate::policy::{Assessment, Severity};

/// One flagged document, snapshotted at scan time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalPendingItem {
    pub document: DocumentId,
    pub document_name: String,
    pub category: String,
    pub authority: String,
    pub owner_person: String,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: NaiveDate,
    pub remind_from_date: Option<NaiveDate>,
    pub days_to_expiry: i64,
    pub severity: Severity,
    pub current_status: Status,
}

impl RenewalPendingItem {
    pub fn snapshot(
        document: &Document,
        expiry_date: NaiveDate,
        assessment: &Assessment,
    ) -> Self {
        Self {
            document: document.id.clone(),
            document_name: document.document_name.clone(),
            category: document.category.clone(),
            authority: document.authority.clone(),
            owner_person: document.owner_person.clone(),
            issue_date: document.issue_date,
            expiry_date,
            remind_from_date: document.remind_from_date(),
            days_to_expiry: assessment.days_to_expiry,
            severity: assessment.severity,
            current_status: document.status(),
        }
    }
}

/// Summary of a single scan for one company
///
/// Items are ordered most urgent first, ties broken by document id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalLog {
    log_date: NaiveDate,
    company: String,
    items: Vec<RenewalPendingItem>,
    total_documents_flagged: usize,
}

impl RenewalLog {
    pub fn new(company: &str, log_date: NaiveDate, mut items: Vec<RenewalPendingItem>) -> Self {
        items.sort_by(|a, b| {
            a.days_to_expiry
                .cmp(&b.days_to_expiry)
                .then_with(|| a.document.cmp(&b.document))
        });
        Self {
            log_date,
            company: company.to_string(),
            total_documents_flagged: items.len(),
            items,
        }
    }

    pub fn log_date(&self) -> NaiveDate {
        self.log_date
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn items(&self) -> &[RenewalPendingItem] {
        &self.items
    }

    pub fn total_documents_flagged(&self) -> usize {
        self.total_documents_flagged
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &RenewalPendingItem> {
        self.items.iter().filter(move |item| item.severity == severity)
    }

    /// Items grouped per responsible person, each group keeping log order
    pub fn by_owner(&self) -> BTreeMap<&str, Vec<&RenewalPendingItem>> {
        let mut groups: BTreeMap<&str, Vec<&RenewalPendingItem>> = BTreeMap::new();
        for item in &self.items {
            groups.entry(item.owner_person.as_str()).or_default().push(item);
        }
        groups
    }

    /// Count per severity; every severity is present, possibly with zero
    pub fn severity_counts(&self) -> BTreeMap<Severity, usize> {
        let mut counts: BTreeMap<Severity, usize> =
            Severity::ALL.iter().map(|s| (*s, 0)).collect();
        for item in &self.items {
            *counts.entry(item.severity).or_default() += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(id: &str, owner: &str, days: i64, severity: Severity) -> RenewalPendingItem {
        RenewalPendingItem {
            document: DocumentId::new(id),
            document_name: format!("Document {}", id),
            category: "License".to_string(),
            authority: "Registry".to_string(),
            owner_person: owner.to_string(),
            issue_date: None,
            expiry_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            remind_from_date: None,
            days_to_expiry: days,
            severity,
            current_status: Status::Active,
        }
    }

    fn sample_log() -> RenewalLog {
        RenewalLog::new(
            "Acme",
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            vec![
                item("DOC-3", "dave", 4, Severity::DueSoon),
                item("DOC-1", "erin", -2, Severity::Overdue),
                item("DOC-2", "dave", 0, Severity::DueToday),
                item("DOC-0", "erin", 4, Severity::DueSoon),
            ],
        )
    }

    #[test]
    fn test_items_sorted_by_urgency_then_id() {
        let log = sample_log();
        let ids: Vec<_> = log.items().iter().map(|i| i.document.as_str()).collect();
        assert_eq!(ids, vec!["DOC-1", "DOC-2", "DOC-0", "DOC-3"]);
        assert_eq!(log.total_documents_flagged(), 4);
    }

    #[test]
    fn test_empty_log() {
        let log = RenewalLog::new("Acme", NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), vec![]);
        assert!(log.is_empty());
        assert_eq!(log.total_documents_flagged(), 0);
        assert!(log.by_owner().is_empty());
    }

    #[test]
    fn test_group_by_owner() {
        let log = sample_log();
        let groups = log.by_owner();
        let dave: Vec<_> = groups["dave"].iter().map(|i| i.document.as_str()).collect();
        let erin: Vec<_> = groups["erin"].iter().map(|i| i.document.as_str()).collect();
        assert_eq!(dave, vec!["DOC-2", "DOC-3"]);
        assert_eq!(erin, vec!["DOC-1", "DOC-0"]);
    }

    #[test]
    fn test_severity_counts() {
        let counts = sample_log().severity_counts();
        assert_eq!(counts[&Severity::Overdue], 1);
        assert_eq!(counts[&Severity::DueToday], 1);
        assert_eq!(counts[&Severity::DueSoon], 2);
        assert_eq!(sample_log().with_severity(Severity::DueSoon).count(), 2);
    }

    #[test]
    fn test_serialized_fields_for_notification() {
        let json = serde_json::to_value(sample_log()).unwrap();
        assert_eq!(json["company"], "Acme");
        assert_eq!(json["log_date"], "2025-01-01");
        assert_eq!(json["total_documents_flagged"], 4);
        assert_eq!(json["items"][0]["severity"], "Overdue");
        assert_eq!(json["items"][1]["severity"], "Due Today");
        assert_eq!(json["items"][0]["current_status"], "Active");
        assert_eq!(json["items"][0]["days_to_expiry"], -2);
    }
}

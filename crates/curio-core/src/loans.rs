//! Loan tracking.
//!
//! Items carry their loan state inline. The `overdue` state is derived
//! at read time from the expected return date, never written back by a
//! read; the stored `loan_status` only changes through a mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::item::{LoanStatus, MediaItem};

/// Details of a new loan.
#[derive(Debug, Clone)]
pub struct LoanInfo {
    /// Person the item is loaned to (non-empty)
    pub loaned_to: String,

    /// Contact details for the borrower
    pub loaned_to_contact: Option<String>,

    /// Agreed return date, if any
    pub expected_return_date: Option<DateTime<Utc>>,

    /// Free-form loan notes
    pub notes: Option<String>,
}

impl LoanInfo {
    pub fn new(loaned_to: impl Into<String>) -> Self {
        Self {
            loaned_to: loaned_to.into(),
            loaned_to_contact: None,
            expected_return_date: None,
            notes: None,
        }
    }

    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.loaned_to_contact = Some(contact.into());
        self
    }

    pub fn with_expected_return(mut self, date: DateTime<Utc>) -> Self {
        self.expected_return_date = Some(date);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Write the loan onto an item. Lifecycle stamping is the
    /// collection manager's job.
    pub fn apply(&self, item: &mut MediaItem) {
        item.loaned_to = Some(self.loaned_to.clone());
        item.loaned_to_contact = self.loaned_to_contact.clone();
        item.loaned_at = Some(Utc::now());
        item.expected_return_date = self.expected_return_date;
        item.loan_notes = self.notes.clone();
        item.loan_status = Some(LoanStatus::Loaned);
    }
}

/// Clear the loan fields when an item comes back.
pub fn record_return(item: &mut MediaItem) {
    item.loaned_to = None;
    item.loaned_to_contact = None;
    item.loaned_at = None;
    item.expected_return_date = None;
    item.loan_notes = None;
    item.loan_status = Some(LoanStatus::Available);
}

/// Effective loan state at `now`.
///
/// A loaned item past its expected return date reads as overdue. The
/// stored record is not touched; the state is recomputed on every read.
pub fn effective_loan_status(item: &MediaItem, now: DateTime<Utc>) -> LoanStatus {
    match item.loan_status {
        Some(LoanStatus::Loaned) => match item.expected_return_date {
            Some(expected) if expected < now => LoanStatus::Overdue,
            _ => LoanStatus::Loaned,
        },
        Some(status) => status,
        None => LoanStatus::Available,
    }
}

/// Items currently out on loan.
pub fn loaned_items(items: &[MediaItem]) -> Vec<&MediaItem> {
    items
        .iter()
        .filter(|item| {
            matches!(
                item.loan_status,
                Some(LoanStatus::Loaned) | Some(LoanStatus::Overdue)
            )
        })
        .collect()
}

/// Loaned items whose expected return date has passed.
pub fn overdue_loans(items: &[MediaItem], now: DateTime<Utc>) -> Vec<&MediaItem> {
    items
        .iter()
        .filter(|item| effective_loan_status(item, now) == LoanStatus::Overdue)
        .collect()
}

/// Items loaned to a person, matched case-insensitively on a substring.
pub fn loans_by_person<'a>(items: &'a [MediaItem], person: &str) -> Vec<&'a MediaItem> {
    let needle = person.to_lowercase();
    items
        .iter()
        .filter(|item| {
            item.loaned_to
                .as_ref()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Read model of one loan, derived from an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRecord {
    pub id: String,
    pub item_id: String,
    pub loaned_to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loaned_to_contact: Option<String>,
    pub loaned_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_return_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: LoanStatus,
}

/// Derive a loan record from an item, if it carries loan details.
pub fn loan_record(item: &MediaItem, now: DateTime<Utc>) -> Option<LoanRecord> {
    let loaned_to = item.loaned_to.clone()?;
    let loaned_at = item.loaned_at?;

    Some(LoanRecord {
        id: format!("loan-{}-{}", item.id, loaned_at.timestamp()),
        item_id: item.id.clone(),
        loaned_to,
        loaned_to_contact: item.loaned_to_contact.clone(),
        loaned_at,
        expected_return_date: item.expected_return_date,
        notes: item.loan_notes.clone(),
        status: effective_loan_status(item, now),
    })
}

/// All derivable loan records, newest loan first.
pub fn loan_records(items: &[MediaItem], now: DateTime<Utc>) -> Vec<LoanRecord> {
    let mut records: Vec<LoanRecord> = items
        .iter()
        .filter_map(|item| loan_record(item, now))
        .collect();
    records.sort_by(|a, b| b.loaned_at.cmp(&a.loaned_at));
    records
}

//! The case store: every case of the practice and the operations that
//! mutate the collection as a whole.
//!
//! Relation links are stored on both endpoints. The store is the only way to
//! commit a case, and every commit runs [`reconcile`] so that
//! `a ∈ b.related_case_ids ⇔ b ∈ a.related_case_ids` holds afterwards.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::CaseError;
use crate::legal::case::{CaseRecord, CaseStatus};
use crate::legal::entity::EntityType;

/// Number of cases in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub open: usize,
    pub archived: usize,
    pub provisionally_archived: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CaseStore {
    cases: Vec<CaseRecord>,
}

impl CaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[CaseRecord] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CaseRecord> {
        self.cases.iter().find(|case| case.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Detached working copy of a stored case.
    pub fn checkout(&self, id: &str) -> Result<CaseRecord, CaseError> {
        self.get(id).cloned().ok_or_else(|| CaseError::NotFound {
            id: id.to_string(),
        })
    }

    /// Add an already-built case (seed data, loaded snapshots). Relation
    /// links are reconciled the same way a save would, and stored cases that
    /// already point at the new id get their back-link.
    pub fn insert(&mut self, mut case: CaseRecord) -> Result<(), CaseError> {
        if self.contains(case.id()) {
            return Err(CaseError::AlreadyExists {
                id: case.id().to_string(),
            });
        }
        case.validate()?;
        let inbound: Vec<String> = self
            .cases
            .iter()
            .filter(|stored| stored.is_related_to(case.id()))
            .map(|stored| stored.id().to_string())
            .collect();
        for id in inbound {
            if !case.is_related_to(&id) {
                case.related_case_ids.push(id);
            }
        }
        let mut blank = case.clone();
        blank.related_case_ids.clear();
        self.cases.push(blank);
        self.cases = reconcile(&self.cases, case);
        Ok(())
    }

    /// Next `YEAR/SEQUENCE` for `year`.
    ///
    /// The sequence is one past the number of cases already numbered in that
    /// year; if that number is taken it keeps counting up. Only safe with a
    /// single writer.
    pub fn next_case_number(&self, year: i32) -> String {
        let prefix = format!("{year}/");
        let count = self
            .cases
            .iter()
            .filter(|case| case.case_number().starts_with(&prefix))
            .count();
        let mut sequence = count + 1;
        loop {
            let candidate = format!("{prefix}{sequence}");
            if !self.cases.iter().any(|case| case.case_number() == candidate) {
                return candidate;
            }
            sequence += 1;
        }
    }

    /// Create a blank open case opened on `today` and return a working copy.
    /// New cases go to the front of the collection.
    pub fn create(&mut self, today: NaiveDate) -> CaseRecord {
        let case_number = self.next_case_number(today.year());
        let case = CaseRecord::new(CaseRecord::new_id(), case_number, today);
        tracing::info!(
            case_id = case.id(),
            case_number = case.case_number(),
            "Created case"
        );
        self.cases.insert(0, case.clone());
        case
    }

    /// Replace the stored version of `updated` and propagate relation changes
    /// to the other endpoints.
    ///
    /// The submitted record is validated first; on any error the store is
    /// left exactly as it was. The case number is kept from the stored
    /// version.
    pub fn save(&mut self, mut updated: CaseRecord) -> Result<(), CaseError> {
        let stored = self.get(updated.id()).ok_or_else(|| CaseError::NotFound {
            id: updated.id().to_string(),
        })?;
        updated.validate()?;

        if updated.case_number() != stored.case_number() {
            tracing::debug!(
                case_id = updated.id(),
                "Ignoring edited case number on save"
            );
            updated = updated.with_case_number(stored.case_number().to_string());
        }

        let next = reconcile(&self.cases, updated);
        tracing::debug!(cases = next.len(), "Committed case save");
        self.cases = next;
        Ok(())
    }

    /// Cases the relation picker may offer for `case_id`: every other case
    /// not already linked to it.
    pub fn link_candidates(&self, case_id: &str) -> Result<Vec<&CaseRecord>, CaseError> {
        let case = self.get(case_id).ok_or_else(|| CaseError::NotFound {
            id: case_id.to_string(),
        })?;
        Ok(self
            .cases
            .iter()
            .filter(|other| other.id() != case_id && !case.is_related_to(other.id()))
            .collect())
    }

    /// Add a relation to a working copy after checking the target exists.
    /// Nothing is committed until the draft is saved.
    pub fn link_in_draft(&self, draft: &mut CaseRecord, target: &str) -> Result<(), CaseError> {
        if draft.id() == target {
            return Err(CaseError::SelfLink {
                id: target.to_string(),
            });
        }
        if draft.is_related_to(target) {
            return Err(CaseError::DuplicateLink {
                id: draft.id().to_string(),
                target: target.to_string(),
            });
        }
        if !self.contains(target) {
            return Err(CaseError::UnknownCase {
                id: target.to_string(),
            });
        }
        draft.related_case_ids.push(target.to_string());
        Ok(())
    }

    /// Link two stored cases and commit immediately.
    pub fn link_cases(&mut self, case_id: &str, target: &str) -> Result<(), CaseError> {
        let mut draft = self.checkout(case_id)?;
        if let Err(err) = self.link_in_draft(&mut draft, target) {
            tracing::warn!(case_id, target, %err, "Rejected case link");
            return Err(err);
        }
        self.save(draft)
    }

    /// Remove a link between two stored cases and commit immediately.
    /// Returns whether a link existed.
    pub fn unlink_cases(&mut self, case_id: &str, target: &str) -> Result<bool, CaseError> {
        let mut draft = self.checkout(case_id)?;
        if !draft.is_related_to(target) {
            return Ok(false);
        }
        draft.related_case_ids.retain(|id| id != target);
        self.save(draft)?;
        Ok(true)
    }

    /// Cases that hold `id` in any `kind` reference field.
    pub fn cases_referencing(&self, kind: EntityType, id: &str) -> Vec<&CaseRecord> {
        self.cases
            .iter()
            .filter(|case| case.references(kind, id))
            .collect()
    }

    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for case in &self.cases {
            match case.status {
                CaseStatus::Open => counts.open += 1,
                CaseStatus::Archived => counts.archived += 1,
                CaseStatus::ProvisionallyArchived => counts.provisionally_archived += 1,
            }
        }
        counts
    }
}

/// Produce the replacement collection for saving `updated`.
///
/// `updated` replaces the record with its id verbatim. Every case added to
/// its relations gains a back-link (if missing), every case dropped from
/// them loses its back-link, and all other cases are carried over unchanged.
/// Relation ids that match no case are left alone.
pub fn reconcile(cases: &[CaseRecord], updated: CaseRecord) -> Vec<CaseRecord> {
    let empty = Vec::new();
    let old_related = cases
        .iter()
        .find(|case| case.id() == updated.id())
        .map_or(&empty, |case| &case.related_case_ids);

    let old_set: HashSet<&str> = old_related.iter().map(String::as_str).collect();
    let new_set: HashSet<&str> = updated.related_case_ids.iter().map(String::as_str).collect();
    let added: HashSet<&str> = new_set.difference(&old_set).copied().collect();
    let removed: HashSet<&str> = old_set.difference(&new_set).copied().collect();

    let id = updated.id();
    let mut out = Vec::with_capacity(cases.len());
    for case in cases {
        if case.id() == id {
            out.push(updated.clone());
            continue;
        }

        let mut case = case.clone();
        if added.contains(case.id()) {
            if !case.is_related_to(id) {
                case.related_case_ids.push(id.to_string());
            }
        } else if removed.contains(case.id()) {
            case.related_case_ids.retain(|other| other != id);
        }
        out.push(case);
    }
    out
}

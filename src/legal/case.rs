//! The case record aggregate and its embedded timeline and ledger.
//!
//! A `CaseRecord` held outside the store is a detached working copy: edits
//! made through these methods stay local until the copy is submitted to
//! [`CaseStore::save`](crate::legal::store::CaseStore::save).

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::CaseError;
use crate::legal::entity::EntityType;
use crate::legal::ledger;

/// Case lifecycle state. Any state may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Open,
    Archived,
    ProvisionallyArchived,
}

impl CaseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Archived => "archived",
            Self::ProvisionallyArchived => "provisionally_archived",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    pub attachment_link: Option<String>,
}

/// Direction of a ledger movement. Signs are applied by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    Income,
    Expense,
    Advance,
}

impl LedgerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Advance => "advance",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    pub date: NaiveDate,
    pub kind: LedgerKind,
    pub description: String,
    pub amount: Decimal,
}

/// Single-valued reference fields of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceSlot {
    Lawyer,
    Solicitor,
    OpposingLawyer,
    OpposingSolicitor,
    Court,
    CaseType,
    ProcedureType,
}

impl ReferenceSlot {
    /// Registry the slot's id points into.
    pub fn kind(self) -> EntityType {
        match self {
            Self::Lawyer | Self::OpposingLawyer => EntityType::Lawyer,
            Self::Solicitor | Self::OpposingSolicitor => EntityType::Solicitor,
            Self::Court => EntityType::Court,
            Self::CaseType => EntityType::CaseType,
            Self::ProcedureType => EntityType::ProcedureType,
        }
    }
}

/// Single-valued reference ids: a blank string means unset.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|id| !id.trim().is_empty()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    id: String,
    case_number: String,
    pub opened_date: NaiveDate,
    #[serde(default)]
    pub archived_date: Option<NaiveDate>,
    #[serde(default)]
    pub client_ids: Vec<String>,
    #[serde(default)]
    pub opponent_ids: Vec<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub lawyer_id: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub solicitor_id: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub opposing_lawyer_id: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub opposing_solicitor_id: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub court_id: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub case_type_id: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub procedure_type_id: Option<String>,
    #[serde(default)]
    pub procedure_number: String,
    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,
    #[serde(default)]
    pub ledger: Vec<LedgerEntry>,
    #[serde(default)]
    pub notes: String,
    pub status: CaseStatus,
    #[serde(default)]
    pub related_case_ids: Vec<String>,
}

impl CaseRecord {
    /// Blank open case. Only the store assigns ids and case numbers.
    pub(crate) fn new(id: String, case_number: String, opened_date: NaiveDate) -> Self {
        Self {
            id,
            case_number,
            opened_date,
            archived_date: None,
            client_ids: Vec::new(),
            opponent_ids: Vec::new(),
            lawyer_id: None,
            solicitor_id: None,
            opposing_lawyer_id: None,
            opposing_solicitor_id: None,
            court_id: None,
            case_type_id: None,
            procedure_type_id: None,
            procedure_number: String::new(),
            timeline: Vec::new(),
            ledger: Vec::new(),
            notes: String::new(),
            status: CaseStatus::Open,
            related_case_ids: Vec::new(),
        }
    }

    pub(crate) fn new_id() -> String {
        format!("case-{}", Uuid::new_v4().simple())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn with_case_number(mut self, case_number: String) -> Self {
        self.case_number = case_number;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_id(mut self, id: String) -> Self {
        self.id = id;
        self
    }

    /// `YEAR/SEQUENCE`, fixed at creation.
    pub fn case_number(&self) -> &str {
        &self.case_number
    }

    pub fn is_related_to(&self, case_id: &str) -> bool {
        self.related_case_ids.iter().any(|id| id == case_id)
    }

    // --- references ---

    /// Attach a reference id: appended for clients/opponents, set for the
    /// primary single-valued slot of every other kind.
    pub fn attach(&mut self, kind: EntityType, id: &str) -> Result<(), CaseError> {
        match kind {
            EntityType::Client => push_unique(&mut self.client_ids, "client", id),
            EntityType::Opponent => push_unique(&mut self.opponent_ids, "opponent", id),
            EntityType::Lawyer => {
                self.set_reference(ReferenceSlot::Lawyer, id);
                Ok(())
            }
            EntityType::Solicitor => {
                self.set_reference(ReferenceSlot::Solicitor, id);
                Ok(())
            }
            EntityType::Court => {
                self.set_reference(ReferenceSlot::Court, id);
                Ok(())
            }
            EntityType::CaseType => {
                self.set_reference(ReferenceSlot::CaseType, id);
                Ok(())
            }
            EntityType::ProcedureType => {
                self.set_reference(ReferenceSlot::ProcedureType, id);
                Ok(())
            }
        }
    }

    /// Remove a client or opponent id. Returns whether it was present.
    pub fn detach(&mut self, kind: EntityType, id: &str) -> Result<bool, CaseError> {
        let list = match kind {
            EntityType::Client => &mut self.client_ids,
            EntityType::Opponent => &mut self.opponent_ids,
            other => return Err(CaseError::UnsupportedReference { kind: other }),
        };
        let before = list.len();
        list.retain(|existing| existing != id);
        Ok(list.len() != before)
    }

    /// Set a single-valued reference; a blank id clears the slot.
    pub fn set_reference(&mut self, slot: ReferenceSlot, id: &str) {
        let value = if id.trim().is_empty() {
            None
        } else {
            Some(id.to_string())
        };
        *self.slot_mut(slot) = value;
    }

    pub fn clear_reference(&mut self, slot: ReferenceSlot) {
        *self.slot_mut(slot) = None;
    }

    pub fn reference(&self, slot: ReferenceSlot) -> Option<&str> {
        match slot {
            ReferenceSlot::Lawyer => self.lawyer_id.as_deref(),
            ReferenceSlot::Solicitor => self.solicitor_id.as_deref(),
            ReferenceSlot::OpposingLawyer => self.opposing_lawyer_id.as_deref(),
            ReferenceSlot::OpposingSolicitor => self.opposing_solicitor_id.as_deref(),
            ReferenceSlot::Court => self.court_id.as_deref(),
            ReferenceSlot::CaseType => self.case_type_id.as_deref(),
            ReferenceSlot::ProcedureType => self.procedure_type_id.as_deref(),
        }
    }

    fn slot_mut(&mut self, slot: ReferenceSlot) -> &mut Option<String> {
        match slot {
            ReferenceSlot::Lawyer => &mut self.lawyer_id,
            ReferenceSlot::Solicitor => &mut self.solicitor_id,
            ReferenceSlot::OpposingLawyer => &mut self.opposing_lawyer_id,
            ReferenceSlot::OpposingSolicitor => &mut self.opposing_solicitor_id,
            ReferenceSlot::Court => &mut self.court_id,
            ReferenceSlot::CaseType => &mut self.case_type_id,
            ReferenceSlot::ProcedureType => &mut self.procedure_type_id,
        }
    }

    /// Whether any field of this case holds `id` as a `kind` reference.
    pub fn references(&self, kind: EntityType, id: &str) -> bool {
        match kind {
            EntityType::Client => self.client_ids.iter().any(|c| c == id),
            EntityType::Opponent => self.opponent_ids.iter().any(|o| o == id),
            EntityType::Lawyer => {
                self.lawyer_id.as_deref() == Some(id)
                    || self.opposing_lawyer_id.as_deref() == Some(id)
            }
            EntityType::Solicitor => {
                self.solicitor_id.as_deref() == Some(id)
                    || self.opposing_solicitor_id.as_deref() == Some(id)
            }
            EntityType::Court => self.court_id.as_deref() == Some(id),
            EntityType::CaseType => self.case_type_id.as_deref() == Some(id),
            EntityType::ProcedureType => self.procedure_type_id.as_deref() == Some(id),
        }
    }

    // --- timeline ---

    /// Append a blank event dated `today` and return it for editing.
    pub fn add_timeline_event(&mut self, today: NaiveDate) -> &mut TimelineEvent {
        self.timeline.push(TimelineEvent {
            id: format!("ev-{}", Uuid::new_v4().simple()),
            date: today,
            description: String::new(),
            attachment_link: None,
        });
        let last = self.timeline.len() - 1;
        &mut self.timeline[last]
    }

    pub fn timeline_event_mut(&mut self, id: &str) -> Result<&mut TimelineEvent, CaseError> {
        self.timeline
            .iter_mut()
            .find(|event| event.id == id)
            .ok_or_else(|| CaseError::EntryNotFound {
                collection: "timeline",
                id: id.to_string(),
            })
    }

    pub fn remove_timeline_event(&mut self, id: &str) -> Result<TimelineEvent, CaseError> {
        let pos = self
            .timeline
            .iter()
            .position(|event| event.id == id)
            .ok_or_else(|| CaseError::EntryNotFound {
                collection: "timeline",
                id: id.to_string(),
            })?;
        Ok(self.timeline.remove(pos))
    }

    // --- ledger ---

    /// Append a zero-amount expense dated `today` and return it for editing.
    pub fn add_ledger_entry(&mut self, today: NaiveDate) -> &mut LedgerEntry {
        self.ledger.push(LedgerEntry {
            id: format!("fin-{}", Uuid::new_v4().simple()),
            date: today,
            kind: LedgerKind::Expense,
            description: String::new(),
            amount: Decimal::ZERO,
        });
        let last = self.ledger.len() - 1;
        &mut self.ledger[last]
    }

    pub fn ledger_entry_mut(&mut self, id: &str) -> Result<&mut LedgerEntry, CaseError> {
        self.ledger
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| CaseError::EntryNotFound {
                collection: "ledger",
                id: id.to_string(),
            })
    }

    pub fn remove_ledger_entry(&mut self, id: &str) -> Result<LedgerEntry, CaseError> {
        let pos = self
            .ledger
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| CaseError::EntryNotFound {
                collection: "ledger",
                id: id.to_string(),
            })?;
        Ok(self.ledger.remove(pos))
    }

    pub fn balance(&self) -> Decimal {
        ledger::balance(&self.ledger)
    }

    /// Reject self-links and duplicated ids in the multi-valued fields.
    pub fn validate(&self) -> Result<(), CaseError> {
        if self.is_related_to(&self.id) {
            return Err(CaseError::SelfLink {
                id: self.id.clone(),
            });
        }
        if let Some(dup) = first_duplicate(&self.related_case_ids) {
            return Err(CaseError::DuplicateLink {
                id: self.id.clone(),
                target: dup.to_string(),
            });
        }
        if let Some(dup) = first_duplicate(&self.client_ids) {
            return Err(CaseError::DuplicateReference {
                field: "client",
                id: dup.to_string(),
            });
        }
        if let Some(dup) = first_duplicate(&self.opponent_ids) {
            return Err(CaseError::DuplicateReference {
                field: "opponent",
                id: dup.to_string(),
            });
        }
        Ok(())
    }
}

fn push_unique(list: &mut Vec<String>, field: &'static str, id: &str) -> Result<(), CaseError> {
    if list.iter().any(|existing| existing == id) {
        return Err(CaseError::DuplicateReference {
            field,
            id: id.to_string(),
        });
    }
    list.push(id.to_string());
    Ok(())
}

fn first_duplicate(ids: &[String]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter()
        .map(String::as_str)
        .find(|id| !seen.insert(*id))
}

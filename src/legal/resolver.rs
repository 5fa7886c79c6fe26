//! Read-only id → record lookups across the registries.
//!
//! Missing ids are a normal state (deleted records, half-finished imports),
//! so every lookup answers `None` instead of failing.

use serde::Serialize;

use crate::legal::case::{CaseRecord, ReferenceSlot};
use crate::legal::entity::{EntityType, ReferenceRecord};
use crate::legal::registry::Registries;

#[derive(Debug, Clone, Copy)]
pub struct ReferenceResolver<'a> {
    registries: &'a Registries,
}

/// One reference of a case with its label, if the id still resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedReference {
    pub kind: EntityType,
    pub id: String,
    pub name: Option<String>,
}

/// Labels for every reference a case holds, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseLabels {
    pub clients: Vec<ResolvedReference>,
    pub opponents: Vec<ResolvedReference>,
    pub lawyer: Option<ResolvedReference>,
    pub solicitor: Option<ResolvedReference>,
    pub opposing_lawyer: Option<ResolvedReference>,
    pub opposing_solicitor: Option<ResolvedReference>,
    pub court: Option<ResolvedReference>,
    pub case_type: Option<ResolvedReference>,
    pub procedure_type: Option<ResolvedReference>,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(registries: &'a Registries) -> Self {
        Self { registries }
    }

    pub fn resolve(&self, kind: EntityType, id: &str) -> Option<ReferenceRecord> {
        self.registries.get(kind, id)
    }

    pub fn label(&self, kind: EntityType, id: &str) -> Option<&'a str> {
        self.registries.name_of(kind, id)
    }

    /// Whether `id` can be attached as a `kind` reference.
    pub fn is_attachable(&self, kind: EntityType, id: &str) -> bool {
        self.registries.contains(kind, id)
    }

    pub fn case_labels(&self, case: &CaseRecord) -> CaseLabels {
        let many = |kind: EntityType, ids: &[String]| {
            ids.iter()
                .map(|id| self.reference(kind, id))
                .collect::<Vec<_>>()
        };
        let one = |slot: ReferenceSlot| case.reference(slot).map(|id| self.reference(slot.kind(), id));

        CaseLabels {
            clients: many(EntityType::Client, &case.client_ids),
            opponents: many(EntityType::Opponent, &case.opponent_ids),
            lawyer: one(ReferenceSlot::Lawyer),
            solicitor: one(ReferenceSlot::Solicitor),
            opposing_lawyer: one(ReferenceSlot::OpposingLawyer),
            opposing_solicitor: one(ReferenceSlot::OpposingSolicitor),
            court: one(ReferenceSlot::Court),
            case_type: one(ReferenceSlot::CaseType),
            procedure_type: one(ReferenceSlot::ProcedureType),
        }
    }

    fn reference(&self, kind: EntityType, id: &str) -> ResolvedReference {
        ResolvedReference {
            kind,
            id: id.to_string(),
            name: self.label(kind, id).map(str::to_string),
        }
    }
}

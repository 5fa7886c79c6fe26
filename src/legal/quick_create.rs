//! Inline creation of a reference record while a case is being edited.
//!
//! This is two sequenced commands: [`create_reference`] commits a label-only
//! record to its registry, then [`attach_to_draft`] wires the new id into the
//! working copy. The registry insert is not undone if the draft is later
//! abandoned; the record simply stays in the registry unreferenced.

use crate::error::QuickCreateError;
use crate::legal::case::{CaseRecord, ReferenceSlot};
use crate::legal::entity::{EntityType, ReferenceRecord};
use crate::legal::registry::Registries;

/// Where in a case a quick-created id lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachTarget {
    Clients,
    Opponents,
    Slot(ReferenceSlot),
}

impl AttachTarget {
    /// The default field for a kind: the party lists for clients and
    /// opponents, the own-side slot for everything else.
    pub fn primary(kind: EntityType) -> Self {
        match kind {
            EntityType::Client => Self::Clients,
            EntityType::Opponent => Self::Opponents,
            EntityType::Lawyer => Self::Slot(ReferenceSlot::Lawyer),
            EntityType::Solicitor => Self::Slot(ReferenceSlot::Solicitor),
            EntityType::Court => Self::Slot(ReferenceSlot::Court),
            EntityType::CaseType => Self::Slot(ReferenceSlot::CaseType),
            EntityType::ProcedureType => Self::Slot(ReferenceSlot::ProcedureType),
        }
    }

    pub fn kind(self) -> EntityType {
        match self {
            Self::Clients => EntityType::Client,
            Self::Opponents => EntityType::Opponent,
            Self::Slot(slot) => slot.kind(),
        }
    }
}

/// Insert a label-only record of `kind` and return its fresh id.
pub fn create_reference(
    registries: &mut Registries,
    kind: EntityType,
    label: &str,
) -> Result<String, QuickCreateError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(QuickCreateError::EmptyLabel);
    }

    let mut id = kind.new_id();
    while registries.contains(kind, &id) {
        id = kind.new_id();
    }

    registries.insert(ReferenceRecord::minimal(kind, id.clone(), label.to_string()))?;
    tracing::info!(%kind, id = %id, "Quick-created reference record");
    Ok(id)
}

/// Put `id` into the draft field named by `target`.
pub fn attach_to_draft(
    draft: &mut CaseRecord,
    target: AttachTarget,
    id: &str,
) -> Result<(), QuickCreateError> {
    match target {
        AttachTarget::Clients | AttachTarget::Opponents => draft.attach(target.kind(), id)?,
        AttachTarget::Slot(slot) => draft.set_reference(slot, id),
    }
    Ok(())
}

/// Run both steps in order and return the new id.
pub fn quick_create(
    registries: &mut Registries,
    draft: &mut CaseRecord,
    target: AttachTarget,
    label: &str,
) -> Result<String, QuickCreateError> {
    let id = create_reference(registries, target.kind(), label)?;
    attach_to_draft(draft, target, &id)?;
    Ok(id)
}

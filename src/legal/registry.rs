//! Keyed collections of reference records.

use crate::error::RegistryError;
use crate::legal::entity::{
    Court, EntityType, Party, Professional, ReferenceRecord, RegistryEntry, Tag,
};

/// Ordered, id-unique collection of one kind of reference record.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    kind: EntityType,
    entries: Vec<T>,
}

impl<T: RegistryEntry> Registry<T> {
    pub fn new(kind: EntityType) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    /// Insert a record whose id is not yet present. Insertion order is kept.
    pub fn add(&mut self, record: T) -> Result<(), RegistryError> {
        if record.name().trim().is_empty() {
            return Err(RegistryError::EmptyName { kind: self.kind });
        }
        if self.contains(record.id()) {
            return Err(RegistryError::DuplicateId {
                kind: self.kind,
                id: record.id().to_string(),
            });
        }
        self.entries.push(record);
        Ok(())
    }

    pub fn all(&self) -> &[T] {
        &self.entries
    }

    pub fn by_id(&self, id: &str) -> Option<&T> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whole-record update in place; the id must already exist.
    pub fn replace(&mut self, record: T) -> Result<(), RegistryError> {
        if record.name().trim().is_empty() {
            return Err(RegistryError::EmptyName { kind: self.kind });
        }
        let kind = self.kind;
        let slot = self
            .entries
            .iter_mut()
            .find(|entry| entry.id() == record.id())
            .ok_or_else(|| RegistryError::NotFound {
                kind,
                id: record.id().to_string(),
            })?;
        *slot = record;
        Ok(())
    }

    /// Drop a record. Cases that still point at it are left untouched.
    pub fn remove(&mut self, id: &str) -> Option<T> {
        let pos = self.entries.iter().position(|entry| entry.id() == id)?;
        Some(self.entries.remove(pos))
    }
}

/// The seven registries of a practice.
#[derive(Debug, Clone)]
pub struct Registries {
    pub clients: Registry<Party>,
    pub opponents: Registry<Party>,
    pub lawyers: Registry<Professional>,
    pub solicitors: Registry<Professional>,
    pub courts: Registry<Court>,
    pub case_types: Registry<Tag>,
    pub procedure_types: Registry<Tag>,
}

impl Default for Registries {
    fn default() -> Self {
        Self {
            clients: Registry::new(EntityType::Client),
            opponents: Registry::new(EntityType::Opponent),
            lawyers: Registry::new(EntityType::Lawyer),
            solicitors: Registry::new(EntityType::Solicitor),
            courts: Registry::new(EntityType::Court),
            case_types: Registry::new(EntityType::CaseType),
            procedure_types: Registry::new(EntityType::ProcedureType),
        }
    }
}

impl Registries {
    /// Insert into the registry matching the record's variant.
    pub fn insert(&mut self, record: ReferenceRecord) -> Result<(), RegistryError> {
        match record {
            ReferenceRecord::Client(p) => self.clients.add(p),
            ReferenceRecord::Opponent(p) => self.opponents.add(p),
            ReferenceRecord::Lawyer(p) => self.lawyers.add(p),
            ReferenceRecord::Solicitor(p) => self.solicitors.add(p),
            ReferenceRecord::Court(c) => self.courts.add(c),
            ReferenceRecord::CaseType(t) => self.case_types.add(t),
            ReferenceRecord::ProcedureType(t) => self.procedure_types.add(t),
        }
    }

    /// Whole-record update in the registry matching the record's variant.
    pub fn replace(&mut self, record: ReferenceRecord) -> Result<(), RegistryError> {
        match record {
            ReferenceRecord::Client(p) => self.clients.replace(p),
            ReferenceRecord::Opponent(p) => self.opponents.replace(p),
            ReferenceRecord::Lawyer(p) => self.lawyers.replace(p),
            ReferenceRecord::Solicitor(p) => self.solicitors.replace(p),
            ReferenceRecord::Court(c) => self.courts.replace(c),
            ReferenceRecord::CaseType(t) => self.case_types.replace(t),
            ReferenceRecord::ProcedureType(t) => self.procedure_types.replace(t),
        }
    }

    pub fn remove(&mut self, kind: EntityType, id: &str) -> Option<ReferenceRecord> {
        match kind {
            EntityType::Client => self.clients.remove(id).map(ReferenceRecord::Client),
            EntityType::Opponent => self.opponents.remove(id).map(ReferenceRecord::Opponent),
            EntityType::Lawyer => self.lawyers.remove(id).map(ReferenceRecord::Lawyer),
            EntityType::Solicitor => self.solicitors.remove(id).map(ReferenceRecord::Solicitor),
            EntityType::Court => self.courts.remove(id).map(ReferenceRecord::Court),
            EntityType::CaseType => self.case_types.remove(id).map(ReferenceRecord::CaseType),
            EntityType::ProcedureType => self
                .procedure_types
                .remove(id)
                .map(ReferenceRecord::ProcedureType),
        }
    }

    pub fn get(&self, kind: EntityType, id: &str) -> Option<ReferenceRecord> {
        match kind {
            EntityType::Client => self.clients.by_id(id).cloned().map(ReferenceRecord::Client),
            EntityType::Opponent => self
                .opponents
                .by_id(id)
                .cloned()
                .map(ReferenceRecord::Opponent),
            EntityType::Lawyer => self.lawyers.by_id(id).cloned().map(ReferenceRecord::Lawyer),
            EntityType::Solicitor => self
                .solicitors
                .by_id(id)
                .cloned()
                .map(ReferenceRecord::Solicitor),
            EntityType::Court => self.courts.by_id(id).cloned().map(ReferenceRecord::Court),
            EntityType::CaseType => self
                .case_types
                .by_id(id)
                .cloned()
                .map(ReferenceRecord::CaseType),
            EntityType::ProcedureType => self
                .procedure_types
                .by_id(id)
                .cloned()
                .map(ReferenceRecord::ProcedureType),
        }
    }

    /// Display label for an id, without cloning the record.
    pub fn name_of(&self, kind: EntityType, id: &str) -> Option<&str> {
        match kind {
            EntityType::Client => self.clients.by_id(id).map(RegistryEntry::name),
            EntityType::Opponent => self.opponents.by_id(id).map(RegistryEntry::name),
            EntityType::Lawyer => self.lawyers.by_id(id).map(RegistryEntry::name),
            EntityType::Solicitor => self.solicitors.by_id(id).map(RegistryEntry::name),
            EntityType::Court => self.courts.by_id(id).map(RegistryEntry::name),
            EntityType::CaseType => self.case_types.by_id(id).map(RegistryEntry::name),
            EntityType::ProcedureType => self.procedure_types.by_id(id).map(RegistryEntry::name),
        }
    }

    pub fn contains(&self, kind: EntityType, id: &str) -> bool {
        self.name_of(kind, id).is_some()
    }

    /// Every record of `kind`, in registry order.
    pub fn records(&self, kind: EntityType) -> Vec<ReferenceRecord> {
        match kind {
            EntityType::Client => wrap(self.clients.all(), ReferenceRecord::Client),
            EntityType::Opponent => wrap(self.opponents.all(), ReferenceRecord::Opponent),
            EntityType::Lawyer => wrap(self.lawyers.all(), ReferenceRecord::Lawyer),
            EntityType::Solicitor => wrap(self.solicitors.all(), ReferenceRecord::Solicitor),
            EntityType::Court => wrap(self.courts.all(), ReferenceRecord::Court),
            EntityType::CaseType => wrap(self.case_types.all(), ReferenceRecord::CaseType),
            EntityType::ProcedureType => {
                wrap(self.procedure_types.all(), ReferenceRecord::ProcedureType)
            }
        }
    }

    pub fn len(&self, kind: EntityType) -> usize {
        match kind {
            EntityType::Client => self.clients.len(),
            EntityType::Opponent => self.opponents.len(),
            EntityType::Lawyer => self.lawyers.len(),
            EntityType::Solicitor => self.solicitors.len(),
            EntityType::Court => self.courts.len(),
            EntityType::CaseType => self.case_types.len(),
            EntityType::ProcedureType => self.procedure_types.len(),
        }
    }
}

fn wrap<T: Clone>(entries: &[T], variant: fn(T) -> ReferenceRecord) -> Vec<ReferenceRecord> {
    entries.iter().cloned().map(variant).collect()
}

#[cfg(test)]
mod tests {
    use super::{Registries, Registry};
    use crate::error::RegistryError;
    use crate::legal::entity::{EntityType, ReferenceRecord, Tag};

    fn tag(id: &str, name: &str) -> Tag {
        Tag {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn add_keeps_insertion_order_and_rejects_duplicate_ids() {
        let mut registry = Registry::new(EntityType::CaseType);
        registry.add(tag("cty1", "Civil")).expect("add civil");
        registry.add(tag("cty2", "Penal")).expect("add penal");

        let err = registry
            .add(tag("cty1", "Laboral"))
            .expect_err("duplicate id must be rejected");
        assert_eq!(
            err,
            RegistryError::DuplicateId {
                kind: EntityType::CaseType,
                id: "cty1".to_string()
            }
        );

        let names: Vec<_> = registry.all().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Civil", "Penal"]);
    }

    #[test]
    fn add_rejects_blank_names() {
        let mut registry = Registry::new(EntityType::ProcedureType);
        let err = registry.add(tag("pt1", "   ")).expect_err("blank name");
        assert!(matches!(err, RegistryError::EmptyName { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn by_id_reports_not_found_softly() {
        let registry: Registry<Tag> = Registry::new(EntityType::CaseType);
        assert!(registry.by_id("missing").is_none());
    }

    #[test]
    fn replace_requires_existing_id() {
        let mut registry = Registry::new(EntityType::CaseType);
        registry.add(tag("cty1", "Civil")).expect("add");
        registry.replace(tag("cty1", "Civil y Mercantil")).expect("replace");
        assert_eq!(registry.by_id("cty1").map(|t| t.name.as_str()), Some("Civil y Mercantil"));

        let err = registry.replace(tag("cty9", "Nope")).expect_err("unknown id");
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }

    #[test]
    fn registries_dispatch_by_variant() {
        let mut registries = Registries::default();
        registries
            .insert(ReferenceRecord::minimal(
                EntityType::Court,
                "ct1".to_string(),
                "Juzgado nº 1".to_string(),
            ))
            .expect("insert court");

        assert!(registries.contains(EntityType::Court, "ct1"));
        assert!(!registries.contains(EntityType::Client, "ct1"));
        assert_eq!(registries.name_of(EntityType::Court, "ct1"), Some("Juzgado nº 1"));
        assert_eq!(registries.records(EntityType::Court).len(), 1);

        let removed = registries
            .remove(EntityType::Court, "ct1")
            .expect("court removed");
        assert_eq!(removed.kind(), EntityType::Court);
        assert_eq!(registries.len(EntityType::Court), 0);
    }
}

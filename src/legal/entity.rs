//! Reference records: the parties, professionals, venues and taxonomy tags a
//! case points to by id.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind tag for reference records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Client,
    Opponent,
    Lawyer,
    Solicitor,
    Court,
    CaseType,
    ProcedureType,
}

impl EntityType {
    pub const ALL: [EntityType; 7] = [
        Self::Client,
        Self::Opponent,
        Self::Lawyer,
        Self::Solicitor,
        Self::Court,
        Self::CaseType,
        Self::ProcedureType,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Opponent => "opponent",
            Self::Lawyer => "lawyer",
            Self::Solicitor => "solicitor",
            Self::Court => "court",
            Self::CaseType => "case_type",
            Self::ProcedureType => "procedure_type",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "client" => Some(Self::Client),
            "opponent" => Some(Self::Opponent),
            "lawyer" => Some(Self::Lawyer),
            "solicitor" => Some(Self::Solicitor),
            "court" => Some(Self::Court),
            "case_type" => Some(Self::CaseType),
            "procedure_type" => Some(Self::ProcedureType),
            _ => None,
        }
    }

    /// Lawyers and solicitors carry bar-association membership.
    pub fn is_professional(self) -> bool {
        matches!(self, Self::Lawyer | Self::Solicitor)
    }

    /// Mint a fresh opaque id for this kind.
    pub fn new_id(self) -> String {
        format!("{}-{}", self.as_str(), Uuid::new_v4().simple())
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptive fields shared by every non-tag record. All optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub document: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub street_address: Option<String>,
    pub locality: Option<String>,
    pub postal_code: Option<String>,
    pub province: Option<String>,
    pub bank_account: Option<String>,
    pub notes: Option<String>,
}

/// Client or opponent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub contact: ContactDetails,
}

/// Lawyer or solicitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Professional {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub contact: ContactDetails,
    pub association: Option<String>,
    pub registration_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Court {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub contact: ContactDetails,
    pub city: Option<String>,
}

/// Case-type or procedure-type label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
}

/// Anything a registry can hold.
pub trait RegistryEntry: Clone {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

macro_rules! impl_registry_entry {
    ($($ty:ty),*) => {
        $(impl RegistryEntry for $ty {
            fn id(&self) -> &str {
                &self.id
            }

            fn name(&self) -> &str {
                &self.name
            }
        })*
    };
}

impl_registry_entry!(Party, Professional, Court, Tag);

/// A reference record of any kind, tagged by [`EntityType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReferenceRecord {
    Client(Party),
    Opponent(Party),
    Lawyer(Professional),
    Solicitor(Professional),
    Court(Court),
    CaseType(Tag),
    ProcedureType(Tag),
}

impl ReferenceRecord {
    /// Build a label-only record of `kind`; every other field is blank.
    pub fn minimal(kind: EntityType, id: String, name: String) -> Self {
        match kind {
            EntityType::Client => Self::Client(Party {
                id,
                name,
                contact: ContactDetails::default(),
            }),
            EntityType::Opponent => Self::Opponent(Party {
                id,
                name,
                contact: ContactDetails::default(),
            }),
            EntityType::Lawyer => Self::Lawyer(Professional::blank(id, name)),
            EntityType::Solicitor => Self::Solicitor(Professional::blank(id, name)),
            EntityType::Court => Self::Court(Court {
                id,
                name,
                contact: ContactDetails::default(),
                city: None,
            }),
            EntityType::CaseType => Self::CaseType(Tag { id, name }),
            EntityType::ProcedureType => Self::ProcedureType(Tag { id, name }),
        }
    }

    pub fn kind(&self) -> EntityType {
        match self {
            Self::Client(_) => EntityType::Client,
            Self::Opponent(_) => EntityType::Opponent,
            Self::Lawyer(_) => EntityType::Lawyer,
            Self::Solicitor(_) => EntityType::Solicitor,
            Self::Court(_) => EntityType::Court,
            Self::CaseType(_) => EntityType::CaseType,
            Self::ProcedureType(_) => EntityType::ProcedureType,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Client(p) | Self::Opponent(p) => &p.id,
            Self::Lawyer(p) | Self::Solicitor(p) => &p.id,
            Self::Court(c) => &c.id,
            Self::CaseType(t) | Self::ProcedureType(t) => &t.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Client(p) | Self::Opponent(p) => &p.name,
            Self::Lawyer(p) | Self::Solicitor(p) => &p.name,
            Self::Court(c) => &c.name,
            Self::CaseType(t) | Self::ProcedureType(t) => &t.name,
        }
    }

    /// Contact block, absent for tags.
    pub fn contact(&self) -> Option<&ContactDetails> {
        match self {
            Self::Client(p) | Self::Opponent(p) => Some(&p.contact),
            Self::Lawyer(p) | Self::Solicitor(p) => Some(&p.contact),
            Self::Court(c) => Some(&c.contact),
            Self::CaseType(_) | Self::ProcedureType(_) => None,
        }
    }

    pub fn professional(&self) -> Option<&Professional> {
        match self {
            Self::Lawyer(p) | Self::Solicitor(p) => Some(p),
            _ => None,
        }
    }
}

impl Professional {
    fn blank(id: String, name: String) -> Self {
        Self {
            id,
            name,
            contact: ContactDetails::default(),
            association: None,
            registration_number: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityType, ReferenceRecord};

    #[test]
    fn entity_type_parses_its_own_names() {
        for kind in EntityType::ALL {
            assert_eq!(EntityType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(EntityType::parse("judge"), None);
    }

    #[test]
    fn new_ids_are_prefixed_and_distinct() {
        let a = EntityType::Court.new_id();
        let b = EntityType::Court.new_id();
        assert!(a.starts_with("court-"));
        assert_ne!(a, b);
    }

    #[test]
    fn minimal_record_has_only_a_label() {
        let record =
            ReferenceRecord::minimal(EntityType::Lawyer, "l9".to_string(), "Ana Ruiz".to_string());
        assert_eq!(record.kind(), EntityType::Lawyer);
        assert_eq!(record.id(), "l9");
        assert_eq!(record.name(), "Ana Ruiz");
        let professional = record.professional().expect("lawyer is a professional");
        assert_eq!(professional.association, None);
        assert_eq!(professional.contact, Default::default());

        let tag = ReferenceRecord::minimal(
            EntityType::ProcedureType,
            "pt9".to_string(),
            "Verbal".to_string(),
        );
        assert!(tag.contact().is_none());
    }

    #[test]
    fn reference_record_serializes_with_kind_tag() {
        let record =
            ReferenceRecord::minimal(EntityType::CaseType, "cty1".to_string(), "Civil".to_string());
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["kind"], "case_type");
        assert_eq!(json["name"], "Civil");
    }
}

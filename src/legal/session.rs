//! One practice's in-memory state: the seven registries and the case store.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::error::CaseError;
use crate::legal::case::{CaseRecord, LedgerEntry, LedgerKind, TimelineEvent};
use crate::legal::entity::{ContactDetails, Court, Party, Professional, ReferenceRecord, Tag};
use crate::legal::registry::Registries;
use crate::legal::resolver::ReferenceResolver;
use crate::legal::store::CaseStore;

#[derive(Debug, Default)]
pub struct PracticeSession {
    pub registries: Registries,
    pub cases: CaseStore,
}

impl PracticeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolver(&self) -> ReferenceResolver<'_> {
        ReferenceResolver::new(&self.registries)
    }

    /// New blank case dated today (UTC).
    pub fn create_case(&mut self) -> CaseRecord {
        self.cases.create(Utc::now().date_naive())
    }

    pub fn save_case(&mut self, case: CaseRecord) -> Result<(), CaseError> {
        self.cases.save(case)
    }

    /// A small demonstration practice with one open case.
    pub fn with_sample_data() -> Result<Self, anyhow::Error> {
        let mut session = Self::new();
        for record in sample_records() {
            session.registries.insert(record)?;
        }
        session.cases.insert(sample_case()?)?;
        tracing::debug!(cases = session.cases.len(), "Loaded sample practice");
        Ok(session)
    }
}

fn party(id: &str, name: &str, document: Option<&str>) -> Party {
    Party {
        id: id.to_string(),
        name: name.to_string(),
        contact: ContactDetails {
            document: document.map(str::to_string),
            ..ContactDetails::default()
        },
    }
}

fn professional(id: &str, name: &str, association: &str, number: &str) -> Professional {
    Professional {
        id: id.to_string(),
        name: name.to_string(),
        contact: ContactDetails::default(),
        association: Some(association.to_string()),
        registration_number: Some(number.to_string()),
    }
}

fn tag(id: &str, name: &str) -> Tag {
    Tag {
        id: id.to_string(),
        name: name.to_string(),
    }
}

fn sample_records() -> Vec<ReferenceRecord> {
    vec![
        ReferenceRecord::Client(party("c1", "Juan Pérez", Some("12345678A"))),
        ReferenceRecord::Client(party("c2", "María García", None)),
        ReferenceRecord::Opponent(party("o1", "Banco Falso S.A.", None)),
        ReferenceRecord::Lawyer(professional("l1", "Alberto Ruiz", "ICAM Madrid", "12345")),
        ReferenceRecord::Solicitor(professional("s1", "Lucía Pro", "ICPM Madrid", "9876")),
        ReferenceRecord::Court(Court {
            id: "ct1".to_string(),
            name: "Juzgado Primera Instancia nº 1".to_string(),
            contact: ContactDetails::default(),
            city: Some("Madrid".to_string()),
        }),
        ReferenceRecord::CaseType(tag("cty1", "Civil")),
        ReferenceRecord::CaseType(tag("cty2", "Penal")),
        ReferenceRecord::CaseType(tag("cty3", "Laboral")),
        ReferenceRecord::ProcedureType(tag("pt1", "Ordinario")),
        ReferenceRecord::ProcedureType(tag("pt2", "Verbal")),
        ReferenceRecord::ProcedureType(tag("pt3", "Monitorio")),
    ]
}

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate, anyhow::Error> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| anyhow::anyhow!("invalid date {year}-{month}-{day}"))
}

fn sample_case() -> Result<CaseRecord, anyhow::Error> {
    let mut case = CaseRecord::new("case-1".to_string(), "2024/1".to_string(), date(2024, 1, 15)?);
    case.client_ids = vec!["c1".to_string()];
    case.opponent_ids = vec!["o1".to_string()];
    case.lawyer_id = Some("l1".to_string());
    case.solicitor_id = Some("s1".to_string());
    case.court_id = Some("ct1".to_string());
    case.case_type_id = Some("cty1".to_string());
    case.procedure_type_id = Some("pt1".to_string());
    case.procedure_number = "123/2024".to_string();
    case.timeline.push(TimelineEvent {
        id: "ev1".to_string(),
        date: date(2024, 1, 20)?,
        description: "Presentación de demanda".to_string(),
        attachment_link: None,
    });
    case.ledger.push(LedgerEntry {
        id: "fin1".to_string(),
        date: date(2024, 1, 15)?,
        kind: LedgerKind::Income,
        description: "Provisión de fondos".to_string(),
        amount: Decimal::from(500),
    });
    case.notes = "Caso de reclamación de cantidad.".to_string();
    Ok(case)
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Utc};
    use rust_decimal_macros::dec;

    use super::PracticeSession;
    use crate::legal::entity::EntityType;

    #[test]
    fn sample_data_is_fully_resolvable() {
        let session = PracticeSession::with_sample_data().expect("sample data");
        let case = session.cases.get("case-1").expect("seed case");

        assert_eq!(case.case_number(), "2024/1");
        assert_eq!(case.balance(), dec!(500));

        let labels = session.resolver().case_labels(case);
        assert_eq!(labels.clients[0].name.as_deref(), Some("Juan Pérez"));
        assert_eq!(
            labels.lawyer.and_then(|l| l.name).as_deref(),
            Some("Alberto Ruiz")
        );
        assert_eq!(
            labels.procedure_type.and_then(|p| p.name).as_deref(),
            Some("Ordinario")
        );
        assert_eq!(session.registries.len(EntityType::CaseType), 3);
    }

    #[test]
    fn create_case_numbers_by_current_year() {
        let mut session = PracticeSession::with_sample_data().expect("sample data");
        let case = session.create_case();

        let year = Utc::now().date_naive().year();
        assert!(case.case_number().starts_with(&format!("{year}/")));
        assert_eq!(session.cases.all()[0].id(), case.id());
    }
}

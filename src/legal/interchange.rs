//! Bulk CSV import and export of reference records.
//!
//! Import accepts `;`, tab, `|` or `,` separated files, a UTF-8 BOM, and a set of
//! header synonyms per column. Export always writes the canonical headers.

use std::io::{Read, Write};

use serde::Serialize;

use crate::config::InterchangeConfig;
use crate::error::InterchangeError;
use crate::legal::entity::{
    ContactDetails, Court, EntityType, Party, Professional, ReferenceRecord, Tag,
};
use crate::legal::registry::Registries;

const BOM: char = '\u{FEFF}';

const BASE_HEADERS: [&str; 10] = [
    "Nombre",
    "Documento",
    "Telefono",
    "Email",
    "Direccion",
    "Localidad",
    "CP",
    "Provincia",
    "Cuenta Bancaria",
    "Observaciones",
];
const PROFESSIONAL_HEADERS: [&str; 2] = ["Colegio", "Nº Colegiado"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Name,
    Document,
    Phone,
    Email,
    StreetAddress,
    Locality,
    PostalCode,
    Province,
    BankAccount,
    Notes,
    Association,
    RegistrationNumber,
}

impl Column {
    fn from_header(raw: &str) -> Option<Self> {
        let header = normalize_header(raw);
        let column = match header.as_str() {
            "nombre" | "nombre completo" | "razon social" | "name" => Self::Name,
            "documento" | "dni" | "nif" | "cif" | "identificador" => Self::Document,
            "telefono" | "tel" | "movil" => Self::Phone,
            "email" | "correo" | "mail" => Self::Email,
            "direccion" | "postal" | "calle" => Self::StreetAddress,
            "localidad" | "ciudad" | "pueblo" | "municipio" => Self::Locality,
            "cp" | "codigo postal" | "postal code" | "zip" => Self::PostalCode,
            "provincia" | "estado" | "region" => Self::Province,
            "observaciones" | "notas" => Self::Notes,
            "cuenta" | "iban" | "cuenta bancaria" => Self::BankAccount,
            "colegio" => Self::Association,
            "numero" | "colegiado" | "nº" | "nº colegiado" => Self::RegistrationNumber,
            _ => return None,
        };
        Some(column)
    }
}

/// Lowercase, trim, drop quotes and a leading BOM, and fold Spanish accents.
fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_start_matches(BOM)
        .trim_matches('"')
        .trim()
        .chars()
        .map(|ch| match ch {
            'á' | 'Á' => 'a',
            'é' | 'É' => 'e',
            'í' | 'Í' => 'i',
            'ó' | 'Ó' => 'o',
            'ú' | 'Ú' | 'ü' | 'Ü' => 'u',
            other => other.to_lowercase().next().unwrap_or(other),
        })
        .collect()
}

/// Result of an import: the parsed records plus row accounting.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub kind: EntityType,
    pub records: Vec<ReferenceRecord>,
    pub accepted: usize,
    pub skipped: usize,
}

#[derive(Debug, Default)]
struct RowFields {
    name: String,
    contact: ContactDetails,
    association: Option<String>,
    registration_number: Option<String>,
}

impl RowFields {
    fn set(&mut self, column: Column, value: &str) {
        let value = value.trim();
        let opt = (!value.is_empty()).then(|| value.to_string());
        match column {
            Column::Name => self.name = value.to_string(),
            Column::Document => self.contact.document = opt,
            Column::Phone => self.contact.phone = opt,
            Column::Email => self.contact.email = opt,
            Column::StreetAddress => self.contact.street_address = opt,
            Column::Locality => self.contact.locality = opt,
            Column::PostalCode => self.contact.postal_code = opt,
            Column::Province => self.contact.province = opt,
            Column::BankAccount => self.contact.bank_account = opt,
            Column::Notes => self.contact.notes = opt,
            Column::Association => self.association = opt,
            Column::RegistrationNumber => self.registration_number = opt,
        }
    }

    fn into_record(self, kind: EntityType) -> ReferenceRecord {
        let id = kind.new_id();
        let RowFields {
            name,
            contact,
            association,
            registration_number,
        } = self;
        match kind {
            EntityType::Client => ReferenceRecord::Client(Party { id, name, contact }),
            EntityType::Opponent => ReferenceRecord::Opponent(Party { id, name, contact }),
            EntityType::Lawyer => ReferenceRecord::Lawyer(Professional {
                id,
                name,
                contact,
                association,
                registration_number,
            }),
            EntityType::Solicitor => ReferenceRecord::Solicitor(Professional {
                id,
                name,
                contact,
                association,
                registration_number,
            }),
            EntityType::Court => ReferenceRecord::Court(Court {
                id,
                name,
                contact,
                city: None,
            }),
            EntityType::CaseType => ReferenceRecord::CaseType(Tag { id, name }),
            EntityType::ProcedureType => ReferenceRecord::ProcedureType(Tag { id, name }),
        }
    }
}

/// Parse `kind` records from CSV. Unknown columns are ignored and rows
/// without a name are skipped. Every record gets a fresh id.
pub fn parse_records<R: Read>(
    kind: EntityType,
    mut reader: R,
) -> Result<ImportReport, InterchangeError> {
    let mut raw = String::new();
    reader.read_to_string(&mut raw)?;
    let text = raw.trim_start_matches(BOM);

    let first_line = text.lines().next().ok_or(InterchangeError::MissingHeader)?;
    if first_line.trim().is_empty() {
        return Err(InterchangeError::MissingHeader);
    }
    let delimiter = sniff_delimiter(first_line);

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: Vec<Option<Column>> = csv_reader
        .headers()?
        .iter()
        .map(|header| {
            Column::from_header(header)
                .filter(|col| kind.is_professional() || !is_professional_column(*col))
        })
        .collect();

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for row in csv_reader.records() {
        let row = row?;
        if row.iter().all(|value| value.trim().is_empty()) {
            continue;
        }

        let mut fields = RowFields::default();
        for (column, value) in columns.iter().zip(row.iter()) {
            if let Some(column) = column {
                fields.set(*column, value);
            }
        }

        if fields.name.is_empty() {
            skipped += 1;
            continue;
        }
        records.push(fields.into_record(kind));
    }

    tracing::debug!(%kind, accepted = records.len(), skipped, "Parsed import file");
    Ok(ImportReport {
        kind,
        accepted: records.len(),
        records,
        skipped,
    })
}

/// Separator used by the header row: the first of `;`, tab and `|` that
/// appears in it, otherwise `,`.
fn sniff_delimiter(header: &str) -> u8 {
    [b';', b'\t', b'|']
        .into_iter()
        .find(|candidate| header.as_bytes().contains(candidate))
        .unwrap_or(b',')
}

fn is_professional_column(column: Column) -> bool {
    matches!(column, Column::Association | Column::RegistrationNumber)
}

/// Parse and append the records to the matching registry.
pub fn import_into<R: Read>(
    registries: &mut Registries,
    kind: EntityType,
    reader: R,
) -> Result<ImportReport, InterchangeError> {
    let report = parse_records(kind, reader)?;
    let mut accepted = 0usize;
    let mut skipped = report.skipped;
    for record in &report.records {
        match registries.insert(record.clone()) {
            Ok(()) => accepted += 1,
            Err(err) => {
                tracing::warn!(%kind, %err, "Skipping imported row");
                skipped += 1;
            }
        }
    }
    tracing::info!(%kind, accepted, skipped, "Imported reference records");
    Ok(ImportReport {
        accepted,
        skipped,
        ..report
    })
}

/// Canonical header row for `kind`.
pub fn export_headers(kind: EntityType) -> Vec<&'static str> {
    let mut headers = BASE_HEADERS.to_vec();
    if kind.is_professional() {
        headers.extend(PROFESSIONAL_HEADERS);
    }
    headers
}

/// Write `records` of `kind` as CSV with the canonical headers.
/// Records of other kinds are ignored.
pub fn export_records<W: Write>(
    kind: EntityType,
    records: &[ReferenceRecord],
    mut writer: W,
    config: &InterchangeConfig,
) -> Result<usize, InterchangeError> {
    if config.write_bom {
        write!(writer, "{BOM}")?;
    }

    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(config.delimiter)
        .from_writer(writer);
    csv_writer.write_record(export_headers(kind))?;

    let blank = ContactDetails::default();
    let mut written = 0usize;
    for record in records.iter().filter(|r| r.kind() == kind) {
        let contact = record.contact().unwrap_or(&blank);
        let mut row: Vec<&str> = vec![
            record.name(),
            field(&contact.document),
            field(&contact.phone),
            field(&contact.email),
            field(&contact.street_address),
            field(&contact.locality),
            field(&contact.postal_code),
            field(&contact.province),
            field(&contact.bank_account),
            field(&contact.notes),
        ];
        if let Some(professional) = record.professional() {
            row.push(field(&professional.association));
            row.push(field(&professional.registration_number));
        }
        csv_writer.write_record(&row)?;
        written += 1;
    }
    csv_writer.flush()?;
    Ok(written)
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{
        Column, export_headers, export_records, normalize_header, parse_records, sniff_delimiter,
    };
    use crate::config::InterchangeConfig;
    use crate::error::InterchangeError;
    use crate::legal::entity::EntityType;

    #[test]
    fn header_synonyms_map_to_columns() {
        assert_eq!(Column::from_header("DNI"), Some(Column::Document));
        assert_eq!(Column::from_header("\"cif\""), Some(Column::Document));
        assert_eq!(Column::from_header("Teléfono"), Some(Column::Phone));
        assert_eq!(Column::from_header("Razón Social"), Some(Column::Name));
        assert_eq!(Column::from_header("IBAN"), Some(Column::BankAccount));
        assert_eq!(Column::from_header("favorite color"), None);
        assert_eq!(normalize_header("\u{FEFF}Nombre"), "nombre");
    }

    #[test]
    fn every_canonical_header_is_recognized() {
        for header in export_headers(EntityType::Lawyer) {
            assert!(Column::from_header(header).is_some(), "{header} not recognized");
        }
    }

    #[test]
    fn import_skips_rows_without_name_and_ignores_unknown_columns() {
        let csv = "nombre,nif,movil,favorito\n\
                   Juan Pérez,12345678A,600111222,rojo\n\
                   ,99999999Z,,azul\n\
                   \n\
                   María García,87654321B,,verde\n";
        let report = parse_records(EntityType::Client, csv.as_bytes()).expect("import");

        assert_eq!(report.accepted, 2);
        assert_eq!(report.skipped, 1);
        let first = &report.records[0];
        assert_eq!(first.name(), "Juan Pérez");
        let contact = first.contact().expect("client has contact");
        assert_eq!(contact.document.as_deref(), Some("12345678A"));
        assert_eq!(contact.phone.as_deref(), Some("600111222"));
        assert_eq!(report.records[1].contact().and_then(|c| c.phone.clone()), None);
    }

    #[test]
    fn import_detects_semicolons_and_bom() {
        let csv = "\u{FEFF}\"Nombre\";\"Colegio\";\"Nº\"\n\"Alberto Ruiz\";\"ICAM Madrid\";\"12345\"\n";
        let report = parse_records(EntityType::Lawyer, csv.as_bytes()).expect("import");
        assert_eq!(report.accepted, 1);
        let lawyer = report.records[0].professional().expect("lawyer");
        assert_eq!(lawyer.association.as_deref(), Some("ICAM Madrid"));
        assert_eq!(lawyer.registration_number.as_deref(), Some("12345"));
    }

    #[test]
    fn membership_columns_are_ignored_for_parties() {
        let csv = "nombre;colegio\nJuan;ICAM\n";
        let report = parse_records(EntityType::Client, csv.as_bytes()).expect("import");
        assert_eq!(report.accepted, 1);
        assert!(report.records[0].professional().is_none());
    }

    #[test]
    fn sniffing_picks_the_header_separator() {
        assert_eq!(sniff_delimiter("nombre;dni"), b';');
        assert_eq!(sniff_delimiter("nombre\tdni\temail"), b'\t');
        assert_eq!(sniff_delimiter("nombre|dni"), b'|');
        assert_eq!(sniff_delimiter("nombre,dni"), b',');
        assert_eq!(sniff_delimiter("razon social, s.l.;dni;email"), b';');
        assert_eq!(sniff_delimiter("nombre"), b',');
    }

    #[test]
    fn export_with_custom_delimiter_imports_back() {
        let csv = "nombre,dni,telefono\nJuan Pérez,12345678A,600111222\n";
        let report = parse_records(EntityType::Client, csv.as_bytes()).expect("import");

        for delimiter in [b'\t', b'|', b',', b';'] {
            let config = InterchangeConfig {
                delimiter,
                write_bom: false,
            };
            let mut out = Vec::new();
            export_records(EntityType::Client, &report.records, &mut out, &config)
                .expect("export");

            let again = parse_records(EntityType::Client, out.as_slice()).expect("re-import");
            assert_eq!(again.accepted, 1, "delimiter {:?}", delimiter as char);
            assert_eq!(again.skipped, 0);
            assert_eq!(again.records[0].name(), "Juan Pérez");
            assert_eq!(again.records[0].contact(), report.records[0].contact());
        }
    }

    #[test]
    fn empty_input_has_no_header() {
        let err = parse_records(EntityType::Client, "".as_bytes()).expect_err("empty");
        assert!(matches!(err, InterchangeError::MissingHeader));
    }

    #[test]
    fn export_writes_canonical_headers_and_bom() {
        let csv = "dni,nombre,correo\n11223344C,Lucía Pro,lucia@example.es\n";
        let report = parse_records(EntityType::Solicitor, csv.as_bytes()).expect("import");

        let mut out = Vec::new();
        let written = export_records(
            EntityType::Solicitor,
            &report.records,
            &mut out,
            &InterchangeConfig::default(),
        )
        .expect("export");
        assert_eq!(written, 1);

        let text = String::from_utf8(out).expect("utf8");
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("\u{FEFF}Nombre;Documento;Telefono;Email;Direccion;Localidad;CP;Provincia;Cuenta Bancaria;Observaciones;Colegio;Nº Colegiado")
        );
        assert_eq!(
            lines.next(),
            Some("Lucía Pro;11223344C;;lucia@example.es;;;;;;;;")
        );
    }
}

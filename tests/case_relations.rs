//! End-to-end checks of case relation links across save sequences.

use chrono::NaiveDate;
use legalcase::error::CaseError;
use legalcase::legal::{CaseRecord, CaseStore, EntityType, PracticeSession};
use pretty_assertions::assert_eq;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).expect("valid date")
}

fn store_with(n: u32) -> (CaseStore, Vec<String>) {
    let mut store = CaseStore::new();
    let ids = (1..=n)
        .map(|d| store.create(day(d)).id().to_string())
        .collect();
    (store, ids)
}

fn assert_symmetric(store: &CaseStore) {
    for case in store.all() {
        for other in &case.related_case_ids {
            if let Some(target) = store.get(other) {
                assert!(
                    target.is_related_to(case.id()),
                    "{} -> {} has no back-link",
                    case.id(),
                    other
                );
            }
        }
    }
}

fn related(store: &CaseStore, id: &str) -> Vec<String> {
    let mut ids = store.get(id).expect("case").related_case_ids.clone();
    ids.sort();
    ids
}

fn sorted(mut ids: Vec<String>) -> Vec<String> {
    ids.sort();
    ids
}

#[test]
fn symmetry_holds_across_a_sequence_of_saves() {
    let (mut store, ids) = store_with(4);
    let (a, b, c, d) = (&ids[0], &ids[1], &ids[2], &ids[3]);

    let mut draft = store.checkout(a).expect("a");
    draft.related_case_ids = vec![b.clone(), c.clone()];
    store.save(draft).expect("save a");
    assert_symmetric(&store);

    let mut draft = store.checkout(c).expect("c");
    draft.related_case_ids.push(d.clone());
    store.save(draft).expect("save c");
    assert_symmetric(&store);
    assert_eq!(related(&store, c), sorted(vec![a.clone(), d.clone()]));

    let mut draft = store.checkout(a).expect("a");
    draft.related_case_ids = vec![d.clone()];
    store.save(draft).expect("save a again");
    assert_symmetric(&store);

    assert_eq!(related(&store, a), vec![d.clone()]);
    assert!(related(&store, b).is_empty());
    assert_eq!(related(&store, c), vec![d.clone()]);
    assert_eq!(related(&store, d), sorted(vec![a.clone(), c.clone()]));
}

#[test]
fn saving_unchanged_relations_touches_nothing_else() {
    let (mut store, ids) = store_with(3);
    store.link_cases(&ids[0], &ids[1]).expect("link");
    let before: Vec<CaseRecord> = store.all().to_vec();

    let mut draft = store.checkout(&ids[0]).expect("checkout");
    draft.notes = "Vista señalada".to_string();
    store.save(draft).expect("save");

    for (old, new) in before.iter().zip(store.all()) {
        if old.id() == ids[0] {
            assert_eq!(new.notes, "Vista señalada");
        } else {
            assert_eq!(old, new);
        }
    }
}

#[test]
fn immediate_link_and_unlink_round_trip() {
    let (mut store, ids) = store_with(2);

    store.link_cases(&ids[0], &ids[1]).expect("link");
    assert_eq!(related(&store, &ids[1]), vec![ids[0].clone()]);
    assert!(store.link_candidates(&ids[0]).expect("candidates").is_empty());

    assert!(store.unlink_cases(&ids[1], &ids[0]).expect("unlink"));
    assert!(related(&store, &ids[0]).is_empty());
    assert!(related(&store, &ids[1]).is_empty());
    assert!(!store.unlink_cases(&ids[1], &ids[0]).expect("second unlink"));
}

#[test]
fn rejected_links_leave_the_store_untouched() {
    let (mut store, ids) = store_with(2);
    store.link_cases(&ids[0], &ids[1]).expect("link");
    let before: Vec<CaseRecord> = store.all().to_vec();

    assert_eq!(
        store.link_cases(&ids[0], &ids[0]),
        Err(CaseError::SelfLink { id: ids[0].clone() })
    );
    assert!(matches!(
        store.link_cases(&ids[0], &ids[1]),
        Err(CaseError::DuplicateLink { .. })
    ));
    assert!(matches!(
        store.link_cases(&ids[0], "case-missing"),
        Err(CaseError::UnknownCase { .. })
    ));
    assert_eq!(store.all(), before.as_slice());
}

#[test]
fn case_numbers_count_per_year() {
    let mut store = CaseStore::new();
    let first = store.create(day(1));
    let second = store.create(day(2));
    let next_year = store.create(NaiveDate::from_ymd_opt(2025, 1, 2).expect("date"));

    assert_eq!(first.case_number(), "2024/1");
    assert_eq!(second.case_number(), "2024/2");
    assert_eq!(next_year.case_number(), "2025/1");
    assert_eq!(store.all()[0].id(), next_year.id());
}

#[test]
fn removed_references_dangle_without_breaking_cases() {
    let mut session = PracticeSession::with_sample_data().expect("sample");
    assert_eq!(
        session.cases.cases_referencing(EntityType::Client, "c1").len(),
        1
    );

    let removed = session.registries.remove(EntityType::Client, "c1");
    assert!(removed.is_some());

    let case = session.cases.get("case-1").expect("case");
    assert_eq!(case.client_ids, ["c1"]);
    let labels = session.resolver().case_labels(case);
    assert_eq!(labels.clients[0].name, None);

    let draft = session.cases.checkout("case-1").expect("checkout");
    session.save_case(draft).expect("dangling ids still save");
}

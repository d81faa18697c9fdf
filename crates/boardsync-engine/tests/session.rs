//! Interactive session state machine.

use chrono::{NaiveDate, Utc};

use boardsync_engine::{ImportProfile, ImportSession, Importer, SessionError, SessionState};
use boardsync_map::{MappingRules, TransformSpec};
use boardsync_model::{
    Column, Entity, EntityId, ExternalRecord, FieldMap, FieldName, FieldValue,
};
use boardsync_store::{EntityStore, MemorySource, MemoryStore};

fn field(name: &str) -> FieldName {
    FieldName::new(name).expect("field name")
}

fn visit_rules() -> MappingRules {
    MappingRules::new("visit")
        .with_title(field("date"), &["Date", "Visit Date"])
        .with_title(field("school"), &["School"])
        .with_title(field("coach"), &["Coach"])
        .with_transform(field("date"), TransformSpec::Date)
        .with_required(vec![field("date"), field("school"), field("coach")])
        .with_duplicate_key(vec![field("date"), field("school")])
}

fn column(id: &str, title: &str, text: &str) -> Column {
    Column {
        id: id.to_string(),
        title: Some(title.to_string()),
        kind: Some("text".to_string()),
        text: Some(text.to_string()),
        value: None,
    }
}

fn board_record(external_id: &str, date: &str, school: &str, coach: &str) -> ExternalRecord {
    ExternalRecord {
        external_id: external_id.to_string(),
        name: format!("{school} visit"),
        columns: vec![
            column("date8", "Visit Date", date),
            column("school2", "School", school),
            column("coach1", "Coach", coach),
        ],
    }
}

fn persisted_visit(id: &str, date: NaiveDate, school: &str) -> Entity {
    let mut fields = FieldMap::new();
    fields.insert(field("date"), FieldValue::Date(date));
    fields.insert(field("school"), FieldValue::Text(school.to_string()));
    Entity {
        id: EntityId::new(id).expect("entity id"),
        kind: "visit".to_string(),
        external_id: None,
        fields,
        created_at: Utc::now(),
        last_synced_at: None,
    }
}

#[test]
fn incomplete_record_is_completed_and_committed() {
    let store = MemoryStore::new();
    let source = MemorySource::new(vec![board_record("99", "2026-03-14", "PS19", "")]);
    let importer = Importer::new(&store, &source, ImportProfile::from_rules(visit_rules()));
    let mut session = ImportSession::new(importer);

    let state = session.select("99").expect("select");
    let SessionState::Completing { candidate } = state else {
        panic!("expected the session to wait for completion");
    };
    assert_eq!(candidate.missing_required, vec![field("coach")]);
    assert_eq!(session.last_external_id(), Some("99"));

    let mut overrides = FieldMap::new();
    overrides.insert(field("coach"), FieldValue::Text("A. Lee".to_string()));
    let state = session.complete(&overrides).expect("complete");
    let SessionState::Success { entity_id } = state else {
        panic!("expected the completion to commit");
    };

    let entity = store
        .fetch(entity_id)
        .expect("fetch")
        .expect("entity persisted");
    assert_eq!(
        entity.field(&field("coach")),
        Some(&FieldValue::Text("A. Lee".to_string()))
    );
    assert_eq!(entity.external_id.as_deref(), Some("99"));
}

#[test]
fn valid_record_commits_straight_from_select() {
    let store = MemoryStore::new();
    let source = MemorySource::new(vec![board_record("42", "2026-03-14", "PS19", "J. Ortiz")]);
    let importer = Importer::new(&store, &source, ImportProfile::from_rules(visit_rules()));
    let mut session = ImportSession::new(importer);

    let state = session.select("42").expect("select");
    assert!(matches!(state, SessionState::Success { .. }));
    assert_eq!(store.len(), 1);
}

#[test]
fn duplicate_select_lands_in_error_and_commits_nothing() {
    let store = MemoryStore::with_entities(vec![persisted_visit(
        "existing1",
        NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date"),
        "PS19",
    )]);
    let source = MemorySource::new(vec![board_record("42", "2026-03-14", "PS19", "J. Ortiz")]);
    let importer = Importer::new(&store, &source, ImportProfile::from_rules(visit_rules()));
    let mut session = ImportSession::new(importer);

    let state = session.select("42").expect("select");
    let SessionState::Error { message } = state else {
        panic!("expected a duplicate error");
    };
    assert!(message.contains("existing1"));
    assert_eq!(store.len(), 1);
}

#[test]
fn fetch_failure_is_a_session_error_state() {
    let store = MemoryStore::new();
    let source = MemorySource::new(vec![]);
    let importer = Importer::new(&store, &source, ImportProfile::from_rules(visit_rules()));
    let mut session = ImportSession::new(importer);

    let state = session.select("404").expect("select");
    let SessionState::Error { message } = state else {
        panic!("expected an error state");
    };
    assert!(message.contains("404"));
}

#[test]
fn still_incomplete_completion_stays_parked_with_a_narrower_gap() {
    let store = MemoryStore::new();
    let source = MemorySource::new(vec![board_record("99", "2026-03-14", "", "")]);
    let importer = Importer::new(&store, &source, ImportProfile::from_rules(visit_rules()));
    let mut session = ImportSession::new(importer);

    session.select("99").expect("select");
    let mut overrides = FieldMap::new();
    overrides.insert(field("school"), FieldValue::Text("PS19".to_string()));
    let state = session.complete(&overrides).expect("complete");

    let SessionState::Completing { candidate } = state else {
        panic!("expected the session to keep waiting");
    };
    assert_eq!(candidate.missing_required, vec![field("coach")]);
    assert_eq!(store.len(), 0);
}

#[test]
fn operations_out_of_order_are_transition_errors() {
    let store = MemoryStore::new();
    let source = MemorySource::new(vec![board_record("99", "2026-03-14", "PS19", "")]);
    let importer = Importer::new(&store, &source, ImportProfile::from_rules(visit_rules()));
    let mut session = ImportSession::new(importer);

    // complete before anything is selected
    assert!(matches!(
        session.complete(&FieldMap::new()),
        Err(SessionError::InvalidTransition {
            operation: "complete",
            state: "selecting",
        })
    ));

    session.select("99").expect("select");
    // a second select while completing
    assert!(matches!(
        session.select("99"),
        Err(SessionError::InvalidTransition {
            operation: "select",
            state: "completing",
        })
    ));
}

#[test]
fn reset_clears_everything_from_any_state() {
    let store = MemoryStore::new();
    let source = MemorySource::new(vec![board_record("99", "2026-03-14", "PS19", "")]);
    let importer = Importer::new(&store, &source, ImportProfile::from_rules(visit_rules()));
    let mut session = ImportSession::new(importer);

    session.select("99").expect("select");
    assert!(matches!(session.state(), SessionState::Completing { .. }));

    session.reset();
    assert!(matches!(session.state(), SessionState::Selecting));
    assert!(session.last_external_id().is_none());

    // The session takes a fresh record after the reset.
    let state = session.select("99").expect("select");
    assert!(matches!(state, SessionState::Completing { .. }));
}

#[test]
fn completion_rechecks_duplicates_at_commit_time() {
    let store = MemoryStore::new();
    let source = MemorySource::new(vec![
        board_record("99", "2026-03-14", "PS19", ""),
        board_record("42", "2026-03-14", "PS19", "J. Ortiz"),
    ]);
    let importer = Importer::new(&store, &source, ImportProfile::from_rules(visit_rules()));

    // Another path imports record 42 while our session is parked.
    let mut session = ImportSession::new(Importer::new(
        &store,
        &source,
        ImportProfile::from_rules(visit_rules()),
    ));
    session.select("99").expect("select");

    let report = importer.preview(&["42"]).expect("preview");
    let result = importer.commit(&report.candidates).expect("commit");
    assert_eq!(result.imported_count(), 1);

    let mut overrides = FieldMap::new();
    overrides.insert(field("coach"), FieldValue::Text("A. Lee".to_string()));
    let state = session.complete(&overrides).expect("complete");
    let SessionState::Error { message } = state else {
        panic!("expected the late duplicate to be refused");
    };
    assert!(message.contains("duplicates"));
    assert_eq!(store.len(), 1);
}

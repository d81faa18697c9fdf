use boardsync_map::{MappingRules, Resolver};
use boardsync_model::{Column, ExternalRecord, FieldName};

fn field(name: &str) -> FieldName {
    FieldName::new(name).expect("field name")
}

fn column(id: &str, title: Option<&str>, kind: Option<&str>, text: Option<&str>) -> Column {
    Column {
        id: id.to_string(),
        title: title.map(str::to_string),
        kind: kind.map(str::to_string),
        text: text.map(str::to_string),
        value: None,
    }
}

fn record(columns: Vec<Column>) -> ExternalRecord {
    ExternalRecord {
        external_id: "42".to_string(),
        name: "PS19 visit".to_string(),
        columns,
    }
}

fn visit_rules() -> MappingRules {
    MappingRules::new("visit")
        .with_title(field("date"), &["Date", "Visit Date"])
        .with_title(field("school"), &["School"])
        .with_title(field("coach"), &["Coach"])
        .with_required(vec![field("date"), field("school"), field("coach")])
}

#[test]
fn resolves_all_fields_by_title() {
    let rules = visit_rules();
    let record = record(vec![
        column("c1", Some("Visit Date"), Some("date"), Some("2024-05-01")),
        column("c2", Some("School"), Some("text"), Some("PS19")),
        column("c3", Some("Coach"), Some("text"), Some("J. Smith")),
    ]);

    let resolution = Resolver::new(&rules).resolve(&record);

    assert_eq!(resolution.assignments.len(), 3);
    assert_eq!(resolution.assignments[&field("date")].id, "c1");
    assert_eq!(resolution.assignments[&field("school")].id, "c2");
    assert_eq!(resolution.assignments[&field("coach")].id, "c3");
    assert!(resolution.unclaimed.is_empty());
}

#[test]
fn unmatched_fields_stay_absent() {
    let rules = visit_rules();
    let record = record(vec![
        column("c1", Some("Visit Date"), Some("date"), Some("2024-05-01")),
        column("c2", Some("School"), Some("text"), Some("PS19")),
    ]);

    let resolution = Resolver::new(&rules).resolve(&record);

    assert!(resolution.assignments.contains_key(&field("date")));
    assert!(resolution.assignments.contains_key(&field("school")));
    assert!(!resolution.assignments.contains_key(&field("coach")));
}

#[test]
fn title_match_beats_type_match() {
    let rules = MappingRules::new("visit")
        .with_title(field("coach"), &["Coach"])
        .with_type("date", vec![field("date")]);
    // Title says coach, declared type says date. Title wins.
    let record = record(vec![column(
        "c1",
        Some("Coach"),
        Some("date"),
        Some("J. Smith"),
    )]);

    let resolution = Resolver::new(&rules).resolve(&record);

    assert_eq!(resolution.assignments[&field("coach")].id, "c1");
    assert!(!resolution.assignments.contains_key(&field("date")));
}

#[test]
fn type_pass_skips_fields_already_resolved() {
    let rules = MappingRules::new("visit")
        .with_title(field("date"), &["Visit Date"])
        .with_type("date", vec![field("date"), field("follow_up")]);
    let record = record(vec![
        column("c1", Some("Visit Date"), Some("date"), Some("2024-05-01")),
        column("c2", Some("Reminder"), Some("date"), Some("2024-05-08")),
    ]);

    let resolution = Resolver::new(&rules).resolve(&record);

    assert_eq!(resolution.assignments[&field("date")].id, "c1");
    assert_eq!(resolution.assignments[&field("follow_up")].id, "c2");
}

#[test]
fn type_tags_match_case_insensitively() {
    let rules = MappingRules::new("visit").with_type("date", vec![field("date")]);
    let record = record(vec![column("c1", None, Some("Date"), Some("2024-05-01"))]);

    let resolution = Resolver::new(&rules).resolve(&record);

    assert_eq!(resolution.assignments[&field("date")].id, "c1");
}

#[test]
fn id_patterns_claim_leftover_columns() {
    let rules = MappingRules::new("visit")
        .with_title(field("date"), &["Date"])
        .with_id_pattern("coach", field("coach"));
    let record = record(vec![
        column("date4", Some("Date"), None, Some("2024-05-01")),
        column("coach_txt7", None, None, Some("J. Smith")),
    ]);

    let resolution = Resolver::new(&rules).resolve(&record);

    assert_eq!(resolution.assignments[&field("coach")].id, "coach_txt7");
}

#[test]
fn id_pattern_does_not_steal_resolved_field() {
    let rules = MappingRules::new("visit")
        .with_title(field("coach"), &["Coach"])
        .with_id_pattern("coach", field("coach"));
    let record = record(vec![
        column("coach_old3", None, None, Some("Stale")),
        column("c2", Some("Coach"), None, Some("J. Smith")),
    ]);

    let resolution = Resolver::new(&rules).resolve(&record);

    // The title pass already resolved coach, so the pattern column stays
    // unclaimed.
    assert_eq!(resolution.assignments[&field("coach")].id, "c2");
    assert_eq!(resolution.unclaimed.len(), 1);
    assert_eq!(resolution.unclaimed[0].id, "coach_old3");
}

#[test]
fn first_rule_claims_first_matching_column() {
    let rules = MappingRules::new("visit")
        .with_title(field("date"), &["Date"])
        .with_title(field("follow_up"), &["Date"]);
    let record = record(vec![
        column("c1", Some("Date"), None, Some("2024-05-01")),
        column("c2", Some("Date"), None, Some("2024-05-08")),
    ]);

    let resolution = Resolver::new(&rules).resolve(&record);

    assert_eq!(resolution.assignments[&field("date")].id, "c1");
    assert_eq!(resolution.assignments[&field("follow_up")].id, "c2");
}

#[test]
fn titles_match_as_whole_phrases_only() {
    let rules = MappingRules::new("visit").with_title(field("date"), &["Date"]);
    let record = record(vec![
        column("c1", Some("Update"), None, Some("nope")),
        column("c2", Some("Planned Date"), None, Some("2024-05-01")),
    ]);

    let resolution = Resolver::new(&rules).resolve(&record);

    assert_eq!(resolution.assignments[&field("date")].id, "c2");
    assert_eq!(resolution.unclaimed.len(), 1);
    assert_eq!(resolution.unclaimed[0].id, "c1");
}

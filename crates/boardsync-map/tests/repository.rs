use boardsync_map::{MapError, MappingRules, RulesRepository, TransformSpec};
use boardsync_model::FieldName;

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
        .with_duplicate_key(vec![field("date"), field("school"), field("coach")])
}

#[test]
fn save_and_load_round_trip() {
    let dir = tempfile::tempdir().expect("temp dir");
    let repo = RulesRepository::new(dir.path()).expect("create repo");

    let rules = visit_rules();
    let path = repo.save(&rules).expect("save rules");
    assert!(path.exists());
    assert!(repo.exists("visit"));

    let loaded = repo.load("visit").expect("load rules");
    assert_eq!(loaded, rules);

    let stored = repo.load_stored("visit").expect("load stored");
    assert_eq!(stored.version, boardsync_map::RULES_VERSION);
}

#[test]
fn save_rejects_invalid_rules() {
    let dir = tempfile::tempdir().expect("temp dir");
    let repo = RulesRepository::new(dir.path()).expect("create repo");

    let mut rules = visit_rules();
    rules.duplicate_key.push(field("phantom"));

    let err = repo.save(&rules).expect_err("invalid rules");
    assert!(matches!(err, MapError::InvalidRules { .. }));
    assert!(!repo.exists("visit"));
}

#[test]
fn load_of_unknown_kind_reports_not_found() {
    let dir = tempfile::tempdir().expect("temp dir");
    let repo = RulesRepository::new(dir.path()).expect("create repo");

    let err = repo.load("schedule").expect_err("missing kind");
    assert!(matches!(err, MapError::NotFound { .. }));
}

#[test]
fn list_and_delete() {
    let dir = tempfile::tempdir().expect("temp dir");
    let repo = RulesRepository::new(dir.path()).expect("create repo");

    repo.save(&visit_rules()).expect("save visit");
    let mut plan_rules = MappingRules::new("coaching plan");
    plan_rules = plan_rules.with_title(field("school"), &["School"]);
    repo.save(&plan_rules).expect("save plan");

    let summaries = repo.list().expect("list rules");
    let kinds: Vec<&str> = summaries
        .iter()
        .map(|summary| summary.kind.as_str())
        .collect();
    assert_eq!(kinds, vec!["coaching plan", "visit"]);
    assert_eq!(summaries[1].required_count, 3);

    assert!(repo.delete("visit").expect("delete visit"));
    assert!(!repo.exists("visit"));
    assert!(!repo.delete("visit").expect("second delete is a no-op"));
}

use chrono::{NaiveDate, Utc};
use serde_json::{Value, json};

use boardsync_map::{MappingRules, TransformSpec, TransformerRegistry, plan_writes};
use boardsync_model::{Entity, EntityId, FieldMap, FieldName, FieldValue};

fn field(name: &str) -> FieldName {
    FieldName::new(name).expect("field name")
}

fn visit_rules() -> MappingRules {
    MappingRules::new("visit")
        .with_title(field("date"), &["Date", "Visit Date"])
        .with_title(field("school"), &["School"])
        .with_title(field("active"), &["Active", "Still Active"])
        .with_title(field("topics"), &["Topics"])
        .with_transform(field("date"), TransformSpec::Date)
        .with_transform(field("active"), TransformSpec::Flag)
        .with_transform(field("topics"), TransformSpec::List)
}

fn sample_entity(fields: FieldMap) -> Entity {
    Entity {
        id: EntityId::new("ent-000001").expect("entity id"),
        kind: "visit".to_string(),
        external_id: Some("42".to_string()),
        fields,
        created_at: Utc::now(),
        last_synced_at: None,
    }
}

#[test]
fn writes_use_first_title_and_reverse_transforms() {
    let rules = visit_rules();
    let registry = TransformerRegistry::from_rules(&rules);
    let mut fields = FieldMap::new();
    fields.insert(
        field("date"),
        FieldValue::Date(NaiveDate::from_ymd_opt(2024, 5, 1).expect("date")),
    );
    fields.insert(field("school"), FieldValue::Text("PS19".to_string()));
    fields.insert(field("active"), FieldValue::Flag(true));
    fields.insert(
        field("topics"),
        FieldValue::List(vec!["math".to_string(), "reading".to_string()]),
    );

    let writes = plan_writes(&rules, &registry, &sample_entity(fields));

    // Rule declaration order, always the first listed title.
    let titles: Vec<&str> = writes.iter().map(|write| write.title.as_str()).collect();
    assert_eq!(titles, vec!["Date", "School", "Active", "Topics"]);

    assert_eq!(writes[0].value, json!("2024-05-01"));
    assert_eq!(writes[1].value, json!("PS19"));
    assert_eq!(writes[2].value, Value::Bool(true));
    assert_eq!(writes[3].value, json!(["math", "reading"]));
}

#[test]
fn absent_empty_and_unaddressable_fields_are_skipped() {
    let rules = visit_rules();
    let registry = TransformerRegistry::from_rules(&rules);
    let mut fields = FieldMap::new();
    fields.insert(field("school"), FieldValue::Text(String::new()));
    // No title rule exists for this field, so it cannot be addressed.
    fields.insert(
        field("internal_notes"),
        FieldValue::Text("do not push".to_string()),
    );

    let writes = plan_writes(&rules, &registry, &sample_entity(fields));

    assert!(writes.is_empty());
}

#[test]
fn fields_without_transform_stringify() {
    let rules = MappingRules::new("visit").with_title(field("school"), &["School"]);
    let registry = TransformerRegistry::from_rules(&rules);
    let mut fields = FieldMap::new();
    fields.insert(field("school"), FieldValue::Text("PS19".to_string()));

    let writes = plan_writes(&rules, &registry, &sample_entity(fields));

    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].value, json!("PS19"));
}

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use boardsync_model::{
    CommitOutcome, FieldMap, FieldName, ImportBatchResult, ImportCandidate, PreviewReport,
};

/// One row of the sync-back report table.
pub struct SyncRow {
    pub entity_id: String,
    pub external_id: String,
    pub synced_at: Option<String>,
    pub error: Option<String>,
}

pub fn print_preview(report: &PreviewReport) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Record"),
        header_cell("Name"),
        header_cell("Status"),
        header_cell("Draft"),
        header_cell("Missing"),
        header_cell("Errors"),
        header_cell("Duplicate of"),
    ]);
    apply_table_style(&mut table);
    for candidate in &report.candidates {
        table.add_row(vec![
            record_cell(&candidate.external_id),
            Cell::new(&candidate.record.name),
            candidate_status_cell(candidate),
            text_cell(render_draft(&candidate.draft)),
            text_cell(join_names(&candidate.missing_required)),
            text_cell(render_errors(candidate)),
            match &candidate.duplicate_of {
                Some(id) => Cell::new(id.as_str()).fg(Color::Yellow),
                None => dim_cell("-"),
            },
        ]);
    }
    println!("{table}");
    println!();
    println!("Summary:");
    print_counts(vec![
        ("Ready", report.ready_count(), Color::Green),
        ("Duplicates", report.duplicate_count(), Color::Yellow),
        ("Invalid", report.invalid_count(), Color::Red),
        ("Fetch failures", report.failures.len(), Color::Red),
    ]);
    if !report.failures.is_empty() {
        eprintln!("Fetch failures:");
        for failure in &report.failures {
            eprintln!("- {}: {}", failure.external_id, failure.message);
        }
    }
}

pub fn print_batch(result: &ImportBatchResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Record"),
        header_cell("Outcome"),
        header_cell("Entity"),
        header_cell("Details"),
    ]);
    apply_table_style(&mut table);
    for entry in &result.entries {
        table.add_row(vec![
            record_cell(&entry.external_id),
            outcome_cell(&entry.outcome),
            entity_cell(&entry.outcome),
            text_cell(outcome_details(&entry.outcome)),
        ]);
    }
    println!("{table}");
    println!();
    println!("Summary:");
    print_counts(vec![
        ("Imported", result.imported_count(), Color::Green),
        ("Skipped duplicates", result.skipped_count(), Color::Yellow),
        ("Failed validation", result.failed_validation_count(), Color::Red),
        ("Failed persist", result.failed_persist_count(), Color::Red),
    ]);
    if !result.errors.is_empty() {
        eprintln!("Errors:");
        for error in &result.errors {
            eprintln!("- {}: {}", error.external_id, error.message);
        }
    }
}

pub fn print_sync(rows: &[SyncRow]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Entity"),
        header_cell("Board record"),
        header_cell("Synced at"),
        header_cell("Status"),
        header_cell("Details"),
    ]);
    apply_table_style(&mut table);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.entity_id)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&row.external_id),
            match &row.synced_at {
                Some(stamp) => Cell::new(stamp),
                None => dim_cell("-"),
            },
            match &row.error {
                Some(_) => Cell::new("failed").fg(Color::Red).add_attribute(Attribute::Bold),
                None => Cell::new("synced")
                    .fg(Color::Green)
                    .add_attribute(Attribute::Bold),
            },
            match &row.error {
                Some(message) => Cell::new(message).fg(Color::Red),
                None => dim_cell("-"),
            },
        ]);
    }
    println!("{table}");
}

fn print_counts(rows: Vec<(&str, usize, Color)>) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Outcome"), header_cell("Count")]);
    apply_counts_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (label, value, color) in rows {
        table.add_row(vec![Cell::new(label), count_cell(value, color)]);
    }
    println!("{table}");
}

fn render_draft(draft: &FieldMap) -> String {
    if draft.is_empty() {
        return "-".to_string();
    }
    draft
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_errors(candidate: &ImportCandidate) -> String {
    if candidate.field_errors.is_empty() {
        return "-".to_string();
    }
    candidate
        .field_errors
        .iter()
        .map(|(name, message)| format!("{name}: {message}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn join_names(names: &[FieldName]) -> String {
    if names.is_empty() {
        return "-".to_string();
    }
    names
        .iter()
        .map(FieldName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn outcome_details(outcome: &CommitOutcome) -> String {
    match outcome {
        CommitOutcome::FailedValidation {
            missing,
            field_errors,
        } => {
            let mut parts = Vec::new();
            if !missing.is_empty() {
                parts.push(format!("missing required: {}", join_names(missing)));
            }
            for (name, message) in field_errors {
                parts.push(format!("{name}: {message}"));
            }
            parts.join("\n")
        }
        CommitOutcome::FailedPersist { message } => message.clone(),
        CommitOutcome::Imported { .. } | CommitOutcome::SkippedDuplicate { .. } => "-".to_string(),
    }
}

fn candidate_status_cell(candidate: &ImportCandidate) -> Cell {
    if candidate.is_duplicate() {
        Cell::new("duplicate").fg(Color::Yellow)
    } else if candidate.is_valid() {
        Cell::new("ready")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new("invalid").fg(Color::Red)
    }
}

fn outcome_cell(outcome: &CommitOutcome) -> Cell {
    match outcome {
        CommitOutcome::Imported { .. } => Cell::new("imported")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        CommitOutcome::SkippedDuplicate { .. } => Cell::new("skipped duplicate").fg(Color::Yellow),
        CommitOutcome::FailedValidation { .. } => Cell::new("failed validation").fg(Color::Red),
        CommitOutcome::FailedPersist { .. } => Cell::new("failed persist")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    }
}

fn entity_cell(outcome: &CommitOutcome) -> Cell {
    match outcome {
        CommitOutcome::Imported { entity_id } => Cell::new(entity_id.as_str())
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        CommitOutcome::SkippedDuplicate { matched_id } => {
            Cell::new(matched_id.as_str()).fg(Color::DarkGrey)
        }
        CommitOutcome::FailedValidation { .. } | CommitOutcome::FailedPersist { .. } => {
            dim_cell("-")
        }
    }
}

fn record_cell(external_id: &str) -> Cell {
    Cell::new(external_id)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn text_cell(value: String) -> Cell {
    if value == "-" {
        dim_cell(value)
    } else {
        Cell::new(value)
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_counts_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use regimen_cli::types::RunResult;
use regimen_model::RegimenMatchCount;

pub fn print_summary(result: &RunResult) {
    let summary = &result.summary;
    match &result.output {
        Some(report) => println!(
            "Output: {} ({} rows{})",
            report.path.display(),
            report.rows_written,
            if report.replaced_existing { ", replaced" } else { "" }
        ),
        None => println!("Output: skipped (dry run)"),
    }
    for report in &result.intermediate {
        println!("Intermediate: {} ({} rows)", report.path.display(), report.rows_written);
    }
    println!(
        "Exposures: {} raw, {} excluded, {} duplicate, {} resolved via {}",
        result.raw_exposure_count,
        result.excluded_exposure_count,
        result.duplicate_exposure_count,
        summary.exposure_count,
        result.resolver
    );
    println!(
        "Persons: {}  Eras: {}  Unmatched eras: {}",
        summary.person_count, summary.era_count, summary.unmatched_era_count
    );

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Regimen"),
        header_cell("Name"),
        header_cell("Ingredients"),
        header_cell("Matched eras"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for count in &summary.regimen_counts {
        table.add_row(vec![
            Cell::new(count.regimen_id)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&count.regimen_name),
            Cell::new(count.ingredient_count),
            match_cell(count),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new("All regimens")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(summary.regimen_exposure_count).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    for ids in &result.shared_ingredient_sets {
        let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        println!("Note: regimens {} share one ingredient set", ids.join(", "));
    }
    if !summary.has_matches() {
        println!("No era matched any regimen.");
    }
    let timings: Vec<String> = summary
        .stages
        .iter()
        .map(|stage| format!("{} {}ms", stage.stage, stage.duration_ms))
        .collect();
    println!("Stages: {}", timings.join(", "));
    println!("Fingerprint: {}", summary.output_fingerprint);
}

fn match_cell(count: &RegimenMatchCount) -> Cell {
    if count.matched_eras == 0 {
        dim_cell(0)
    } else {
        Cell::new(count.matched_eras).fg(Color::Green)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
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

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use raccoon_model::{Bucket, BucketCounts};

use crate::types::MatchSummary;

pub fn print_summary(summary: &MatchSummary) {
    println!("Submissions: {}", summary.submissions.display());
    println!("Reference: {}", summary.reference.display());
    if summary.dry_run {
        println!("Dry run: no files written");
    } else {
        println!("Output: {}", summary.output_dir.display());
    }
    println!("{}", summary_table(&summary.counts));
}

/// Rows and share of the batch per outcome bucket.
pub fn summary_table(counts: &BucketCounts) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Outcome"),
        header_cell("Rows"),
        header_cell("Share"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);

    let total = counts.total();
    for bucket in Bucket::ALL {
        let rows = counts.get(bucket);
        table.add_row(vec![
            bucket_cell(bucket),
            count_cell(rows),
            Cell::new(share(rows, total)),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total).add_attribute(Attribute::Bold),
        Cell::new(share(counts.matched(), total)).add_attribute(Attribute::Bold),
    ]);
    table
}

fn share(rows: usize, total: usize) -> String {
    if total == 0 {
        return "-".to_string();
    }
    #[allow(clippy::cast_precision_loss)]
    let percent = rows as f64 * 100.0 / total as f64;
    format!("{percent:.1}%")
}

fn bucket_cell(bucket: Bucket) -> Cell {
    let color = match bucket {
        Bucket::ExactMatched | Bucket::FuzzyMatched => Color::Green,
        Bucket::FuzzyUnmatched => Color::Yellow,
        Bucket::NoDemo => Color::Red,
    };
    Cell::new(bucket.as_str()).fg(color)
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).add_attribute(Attribute::Bold)
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

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

//! Turning records into terminal output

use anyhow::{bail, Context, Result};
use catalyst_views::{ColumnMapping, FieldKind, FormModel, SortDirection, ViewTable};
use serde::Serialize;
use serde_json::Value;

use crate::cli::TableArgs;

/// Build the table for a list command: records, column choice, then order
pub fn build_table<T: Serialize>(
    columns: Vec<ColumnMapping>,
    records: &[T],
    args: &TableArgs,
) -> Result<ViewTable> {
    let mut table = ViewTable::from_records(columns, records).context("Failed to tabulate records")?;

    if args.all_columns && !table.all_columns_selected() {
        table.toggle_all_columns();
    }

    if !args.columns.is_empty() {
        // Start from nothing, then show the requested keys in order
        if !table.all_columns_selected() {
            table.toggle_all_columns();
        }
        table.toggle_all_columns();

        for key in &args.columns {
            if !table.toggle_column(key) {
                let known: Vec<&str> = table.columns().iter().map(|c| c.key.as_str()).collect();
                bail!("Unknown column '{}'; choose from: {}", key, known.join(", "));
            }
        }
    }

    if let Some(sort) = &args.sort {
        let (key, direction) = parse_sort(sort);
        if !table.columns().iter().any(|c| c.key == key) {
            bail!("Cannot sort by unknown column '{}'", key);
        }
        table.sort_by(key, direction);
    }

    Ok(table)
}

/// `name` sorts ascending, `-name` descending
pub fn parse_sort(sort: &str) -> (&str, SortDirection) {
    match sort.strip_prefix('-') {
        Some(key) => (key, SortDirection::Descending),
        None => (sort.strip_prefix('+').unwrap_or(sort), SortDirection::Ascending),
    }
}

/// Print the requested page (or every row) and write the export file if asked
pub fn emit_table(table: &ViewTable, args: &TableArgs) -> Result<()> {
    match args.page_size {
        Some(size) if size > 0 => {
            let index = args.page.saturating_sub(1);
            let mut page = table.clone();
            page.set_rows(table.page(index, size).to_vec());
            println!("{}", page.to_tsv());
            println!(
                "Page {} of {} ({} rows)",
                index + 1,
                table.page_count(size).max(1),
                table.rows().len()
            );
        }
        _ => {
            println!("{}", table.to_tsv());
            println!("{} rows", table.rows().len());
        }
    }

    if let Some(path) = &args.export {
        std::fs::write(path, table.export_csv())
            .with_context(|| format!("Failed to write export to {:?}", path))?;
        eprintln!("Exported {} rows to {}", table.rows().len(), path.display());
    }

    Ok(())
}

/// Label/value lines for a read-only record form
pub fn form_lines(form: &FormModel) -> Vec<String> {
    let width = form
        .fields()
        .iter()
        .map(|f| f.label.chars().count())
        .max()
        .unwrap_or(0);

    form.fields()
        .iter()
        .map(|field| {
            let value = form.value(&field.name).cloned().unwrap_or(Value::Null);
            let shown = match field.kind {
                FieldKind::Dropdown | FieldKind::Radio => field
                    .options
                    .iter()
                    .find(|option| field.option_value(option) == value)
                    .map(|option| field.format_option(option))
                    .unwrap_or_else(|| form.text(&field.name)),
                FieldKind::Password => "********".to_string(),
                _ => form.text(&field.name),
            };
            format!("{:<width$}  {}", field.label, shown, width = width)
        })
        .collect()
}

pub fn print_form(title: &str, form: &FormModel) {
    println!("{}", title);
    for line in form_lines(form) {
        println!("  {}", line);
    }
}

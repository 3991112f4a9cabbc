use std::collections::BTreeSet;

use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::{money, money_or_blank, MONTH_ABBRS};
use crate::reports::{company_summary, rent_tracker, rental_summary};
use crate::settings::{db_path, load_settings};

fn report_year(year: Option<i32>) -> i32 {
    year.unwrap_or_else(|| load_settings().report_year)
}

fn print_summary(
    title: &str,
    year: i32,
    summary: &std::collections::BTreeMap<String, std::collections::BTreeMap<String, f64>>,
) {
    println!("{} — {year}", title.bold());
    if summary.is_empty() {
        println!("No matching transactions.");
        return;
    }

    // One column per transaction type seen anywhere in the report.
    let types: BTreeSet<&String> = summary.values().flat_map(|m| m.keys()).collect();

    let mut table = Table::new();
    let mut header = vec!["Name".to_string()];
    header.extend(types.iter().map(|t| t.to_string()));
    header.push("Net".to_string());
    table.set_header(header);

    for (name, totals) in summary {
        let mut row = vec![Cell::new(name)];
        for ttype in &types {
            let val = totals.get(*ttype).copied().unwrap_or(0.0);
            row.push(Cell::new(money_or_blank(val)).set_alignment(CellAlignment::Right));
        }
        let net: f64 = totals.values().sum();
        row.push(Cell::new(money(net)).set_alignment(CellAlignment::Right));
        table.add_row(row);
    }
    println!("{table}");
}

pub fn rental(year: Option<i32>) -> Result<()> {
    let year = report_year(year);
    let conn = get_connection(&db_path())?;
    let summary = rental_summary(&conn, year)?;
    print_summary("Rental summary", year, &summary);
    Ok(())
}

pub fn company(year: Option<i32>) -> Result<()> {
    let year = report_year(year);
    let conn = get_connection(&db_path())?;
    let summary = company_summary(&conn, year)?;
    print_summary("Company summary", year, &summary);
    Ok(())
}

pub fn tracker(year: Option<i32>) -> Result<()> {
    let year = report_year(year);
    let conn = get_connection(&db_path())?;
    let rows = rent_tracker(&conn, year)?;

    println!("{} — {year}", "Rent tracker".bold());
    if rows.is_empty() {
        println!("No rent received.");
        return Ok(());
    }

    let mut table = Table::new();
    let mut header = vec!["Property".to_string()];
    header.extend(MONTH_ABBRS.iter().map(|m| m.to_string()));
    header.push("Total".to_string());
    table.set_header(header);

    for row in rows {
        let mut cells = vec![Cell::new(&row.property)];
        for val in row.monthly {
            cells.push(Cell::new(money_or_blank(val)).set_alignment(CellAlignment::Right));
        }
        cells.push(Cell::new(money(row.total)).set_alignment(CellAlignment::Right));
        table.add_row(cells);
    }
    println!("{table}");
    Ok(())
}

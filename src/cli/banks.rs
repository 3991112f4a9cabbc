use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::{RentbooksError, Result};
use crate::models::normalize_name;
use crate::settings::db_path;

#[allow(clippy::too_many_arguments)]
pub fn add(
    name: &str,
    delimiter: &str,
    date_format: &str,
    date_col: usize,
    description_col: usize,
    debit_col: usize,
    credit_col: usize,
    ignore_startswith: &[String],
    ignore_contains: &[String],
) -> Result<()> {
    if delimiter.len() != 1 {
        return Err(RentbooksError::Other(
            "delimiter must be a single character".to_string(),
        ));
    }
    if date_col == 0 || description_col == 0 {
        return Err(RentbooksError::Other(
            "date and description columns are required (1-based)".to_string(),
        ));
    }
    if debit_col == 0 && credit_col == 0 {
        return Err(RentbooksError::Other(
            "at least one of debit-col or credit-col is required".to_string(),
        ));
    }
    let conn = get_connection(&db_path())?;
    let key = normalize_name(name);
    conn.execute(
        "INSERT INTO banks (name, delimiter, date_format, date_col, description_col, \
         debit_col, credit_col, ignore_startswith, ignore_contains) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            key,
            delimiter,
            date_format,
            date_col as i64,
            description_col as i64,
            debit_col as i64,
            credit_col as i64,
            serde_json::to_string(ignore_startswith).unwrap_or_else(|_| "[]".to_string()),
            serde_json::to_string(ignore_contains).unwrap_or_else(|_| "[]".to_string()),
        ],
    )?;
    println!("Added bank format: {key}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let mut stmt = conn.prepare(
        "SELECT name, delimiter, date_format, date_col, description_col, debit_col, credit_col \
         FROM banks ORDER BY name",
    )?;
    let rows: Vec<(String, String, String, i64, i64, i64, i64)> = stmt
        .query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec![
        "Name", "Delim", "Date format", "Date", "Desc", "Debit", "Credit",
    ]);
    for (name, delim, fmt, date, desc, debit, credit) in rows {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(delim),
            Cell::new(fmt),
            Cell::new(date),
            Cell::new(desc),
            Cell::new(debit),
            Cell::new(credit),
        ]);
    }
    println!("Bank formats\n{table}");
    Ok(())
}

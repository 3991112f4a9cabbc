use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::{RentbooksError, Result};
use crate::models::normalize_name;
use crate::settings::db_path;

pub fn add(name: &str, bank: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let bank_key = normalize_name(bank);
    let known: bool = conn
        .prepare("SELECT 1 FROM banks WHERE name = ?1")?
        .exists([&bank_key])?;
    if !known {
        return Err(RentbooksError::UnknownBank(bank_key));
    }
    let key = normalize_name(name);
    conn.execute(
        "INSERT INTO bank_accounts (name, bank_name) VALUES (?1, ?2)",
        rusqlite::params![key, bank_key],
    )?;
    println!("Added account: {key}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let mut stmt = conn.prepare(
        "SELECT a.id, a.name, a.bank_name, count(t.id) \
         FROM bank_accounts a LEFT JOIN transactions t ON t.account_id = a.id \
         GROUP BY a.id ORDER BY a.name",
    )?;
    let rows: Vec<(i64, String, String, i64)> = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Bank", "Transactions"]);
    for (id, name, bank, count) in rows {
        table.add_row(vec![
            Cell::new(id),
            Cell::new(name),
            Cell::new(bank),
            Cell::new(count),
        ]);
    }
    println!("Accounts\n{table}");
    Ok(())
}

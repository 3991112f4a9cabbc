use comfy_table::{Cell, Table};
use rusqlite::Connection;

use crate::db::get_connection;
use crate::error::{RentbooksError, Result};
use crate::fmt::money;
use crate::models::normalize_name;
use crate::settings::db_path;

fn split_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(normalize_name)
        .filter(|s| !s.is_empty())
        .collect()
}

fn require_properties(conn: &Connection, names: &[String]) -> Result<()> {
    for name in names {
        let known: bool = conn
            .prepare("SELECT 1 FROM properties WHERE name = ?1")?
            .exists([name])?;
        if !known {
            return Err(RentbooksError::UnknownEntity {
                kind: "property",
                name: name.clone(),
            });
        }
    }
    Ok(())
}

fn delete_by_name(conn: &Connection, table: &str, kind: &'static str, name: &str) -> Result<()> {
    let key = normalize_name(name);
    let deleted = conn.execute(&format!("DELETE FROM {table} WHERE name = ?1"), [&key])?;
    if deleted == 0 {
        return Err(RentbooksError::UnknownEntity { kind, name: key });
    }
    println!("Deleted {kind}: {key}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
pub fn property_add(
    name: &str,
    cost: f64,
    land_value: f64,
    renovation: f64,
    loan_closing_cost: f64,
    owner_count: i64,
    purchase_date: &str,
    mgmt_company: &str,
) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let key = normalize_name(name);
    conn.execute(
        "INSERT INTO properties (name, cost, land_value, renovation, loan_closing_cost, \
         owner_count, purchase_date, mgmt_company) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            key,
            cost,
            land_value,
            renovation,
            loan_closing_cost,
            owner_count,
            purchase_date.trim(),
            normalize_name(mgmt_company),
        ],
    )?;
    println!("Added property: {key}");
    Ok(())
}

pub fn property_list() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let mut stmt = conn.prepare(
        "SELECT name, cost, renovation, owner_count, purchase_date, mgmt_company \
         FROM properties ORDER BY name",
    )?;
    let rows: Vec<(String, f64, f64, i64, String, String)> = stmt
        .query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec![
        "Name",
        "Cost",
        "Renovation",
        "Owners",
        "Purchased",
        "Mgmt company",
    ]);
    for (name, cost, renovation, owners, purchased, mgmt) in rows {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(money(cost)),
            Cell::new(money(renovation)),
            Cell::new(owners),
            Cell::new(purchased),
            Cell::new(mgmt),
        ]);
    }
    println!("Properties\n{table}");
    Ok(())
}

pub fn property_delete(name: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    delete_by_name(&conn, "properties", "property", name)
}

// ---------------------------------------------------------------------------
// Companies
// ---------------------------------------------------------------------------

pub fn company_add(name: &str, rent_percentage: i64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let key = normalize_name(name);
    conn.execute(
        "INSERT INTO companies (name, rent_percentage) VALUES (?1, ?2)",
        rusqlite::params![key, rent_percentage],
    )?;
    println!("Added company: {key}");
    Ok(())
}

pub fn company_list() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let mut stmt =
        conn.prepare("SELECT name, rent_percentage FROM companies ORDER BY name")?;
    let rows: Vec<(String, i64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec!["Name", "Rent %"]);
    for (name, pct) in rows {
        table.add_row(vec![Cell::new(name), Cell::new(pct)]);
    }
    println!("Companies\n{table}");
    Ok(())
}

pub fn company_delete(name: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    delete_by_name(&conn, "companies", "company", name)
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

pub fn group_add(name: &str, properties: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let key = normalize_name(name);
    let props = split_names(properties);
    if props.is_empty() {
        return Err(RentbooksError::Other(
            "a group needs at least one property".to_string(),
        ));
    }
    require_properties(&conn, &props)?;
    conn.execute(
        "INSERT INTO groups (name, property_list) VALUES (?1, ?2)",
        rusqlite::params![
            key,
            serde_json::to_string(&props).unwrap_or_else(|_| "[]".to_string())
        ],
    )?;
    println!("Added group: {key} ({})", props.join(", "));
    Ok(())
}

pub fn group_list() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let mut stmt = conn.prepare("SELECT name, property_list FROM groups ORDER BY name")?;
    let rows: Vec<(String, String)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec!["Name", "Properties"]);
    for (name, raw) in rows {
        let props: Vec<String> = serde_json::from_str(&raw).unwrap_or_default();
        table.add_row(vec![Cell::new(name), Cell::new(props.join(", "))]);
    }
    println!("Groups\n{table}");
    Ok(())
}

pub fn group_delete(name: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    delete_by_name(&conn, "groups", "group", name)
}

// ---------------------------------------------------------------------------
// Owners
// ---------------------------------------------------------------------------

pub fn owner_add(name: &str, accounts: &str, properties: &str, companies: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let key = normalize_name(name);
    let props = split_names(properties);
    require_properties(&conn, &props)?;
    let to_json =
        |v: &Vec<String>| serde_json::to_string(v).unwrap_or_else(|_| "[]".to_string());
    conn.execute(
        "INSERT INTO owners (name, bank_accounts, properties, companies) \
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            key,
            to_json(&split_names(accounts)),
            to_json(&props),
            to_json(&split_names(companies)),
        ],
    )?;
    println!("Added owner: {key}");
    Ok(())
}

pub fn owner_list() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let mut stmt = conn
        .prepare("SELECT name, bank_accounts, properties, companies FROM owners ORDER BY name")?;
    let rows: Vec<(String, String, String, String)> = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let join = |raw: &str| {
        serde_json::from_str::<Vec<String>>(raw)
            .unwrap_or_default()
            .join(", ")
    };
    let mut table = Table::new();
    table.set_header(vec!["Name", "Accounts", "Properties", "Companies"]);
    for (name, accounts, properties, companies) in rows {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(join(&accounts)),
            Cell::new(join(&properties)),
            Cell::new(join(&companies)),
        ]);
    }
    println!("Owners\n{table}");
    Ok(())
}

pub fn owner_delete(name: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    delete_by_name(&conn, "owners", "owner", name)
}

// ---------------------------------------------------------------------------
// Tax categories and transaction types
// ---------------------------------------------------------------------------

pub fn name_add(table: &str, name: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let key = normalize_name(name);
    if key.is_empty() {
        return Err(RentbooksError::Other("name is required".to_string()));
    }
    conn.execute(
        &format!("INSERT OR IGNORE INTO {table} (name) VALUES (?1)"),
        [&key],
    )?;
    println!("Added: {key}");
    Ok(())
}

pub fn name_list(table: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let mut stmt = conn.prepare(&format!("SELECT name FROM {table} ORDER BY name"))?;
    let names: Vec<String> = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    for name in names {
        println!("{name}");
    }
    Ok(())
}

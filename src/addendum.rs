use rusqlite::Connection;

use crate::db::account_id;
use crate::error::{RentbooksError, Result};

/// Manually entered transactions. These bypass the classification engine:
/// the classification fields default to empty at entry time and are only
/// ever changed through an explicit edit. Imported (normalized) rows are
/// immutable through this surface.

/// Dates are stored as YYYY-MM-DD everywhere; the year reports and list
/// filters rely on that prefix. Anything else is rejected here rather than
/// stored and silently dropped from every report.
fn validate_date(date: &str) -> Result<()> {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
        RentbooksError::Other(format!("invalid date '{date}', expected YYYY-MM-DD"))
    })?;
    Ok(())
}

pub fn add_entry(
    conn: &Connection,
    account: &str,
    date: &str,
    description: &str,
    credit: f64,
) -> Result<i64> {
    let acct = account_id(conn, account)?;
    let date = date.trim();
    let description = description.trim();
    if date.is_empty() || description.is_empty() {
        return Err(RentbooksError::Other(
            "date and description are required".to_string(),
        ));
    }
    validate_date(date)?;
    let duplicate: bool = conn
        .prepare(
            "SELECT 1 FROM transactions \
             WHERE account_id = ?1 AND date = ?2 AND description = ?3 AND credit = ?4",
        )?
        .exists(rusqlite::params![acct, date, description, credit])?;
    if duplicate {
        return Err(RentbooksError::DuplicateRow(format!(
            "{date} '{description}' {credit}"
        )));
    }
    conn.execute(
        "INSERT INTO transactions (account_id, date, description, credit, from_addendum) \
         VALUES (?1, ?2, ?3, ?4, 1)",
        rusqlite::params![acct, date, description, credit],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Fields an edit may change; `None` leaves the stored value alone.
#[derive(Debug, Default)]
pub struct EditFields {
    pub date: Option<String>,
    pub description: Option<String>,
    pub credit: Option<f64>,
    pub comment: Option<String>,
    pub transaction_type: Option<String>,
    pub tax_category: Option<String>,
    pub property: Option<String>,
    pub group: Option<String>,
    pub company: Option<String>,
    pub other_entity: Option<String>,
}

fn require_addendum(conn: &Connection, txn_id: i64) -> Result<()> {
    let from_addendum: bool = conn
        .query_row(
            "SELECT from_addendum FROM transactions WHERE id = ?1",
            [txn_id],
            |row| row.get(0),
        )
        .map_err(|_| RentbooksError::Other(format!("No transaction with id {txn_id}")))?;
    if !from_addendum {
        return Err(RentbooksError::NormalizedRowImmutable(txn_id));
    }
    Ok(())
}

pub fn edit_entry(conn: &Connection, txn_id: i64, fields: &EditFields) -> Result<()> {
    require_addendum(conn, txn_id)?;

    let mut sets: Vec<String> = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let mut push = |column: &str, value: Box<dyn rusqlite::types::ToSql>| {
        params.push(value);
        sets.push(format!("{column} = ?{}", params.len()));
    };
    if let Some(v) = &fields.date {
        let v = v.trim();
        validate_date(v)?;
        push("date", Box::new(v.to_string()));
    }
    if let Some(v) = &fields.description {
        push("description", Box::new(v.trim().to_string()));
    }
    if let Some(v) = fields.credit {
        push("credit", Box::new(v));
    }
    if let Some(v) = &fields.comment {
        push("comment", Box::new(v.clone()));
    }
    if let Some(v) = &fields.transaction_type {
        push("transaction_type", Box::new(crate::models::normalize_name(v)));
    }
    if let Some(v) = &fields.tax_category {
        push("tax_category", Box::new(crate::models::normalize_name(v)));
    }
    if let Some(v) = &fields.property {
        push("property", Box::new(crate::models::normalize_name(v)));
    }
    if let Some(v) = &fields.group {
        push("grp", Box::new(crate::models::normalize_name(v)));
    }
    if let Some(v) = &fields.company {
        push("company", Box::new(crate::models::normalize_name(v)));
    }
    if let Some(v) = &fields.other_entity {
        push("other_entity", Box::new(v.trim().to_string()));
    }
    if sets.is_empty() {
        return Ok(());
    }

    let sql = format!(
        "UPDATE transactions SET {} WHERE id = ?{}",
        sets.join(", "),
        params.len() + 1
    );
    params.push(Box::new(txn_id));
    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        params.iter().map(|p| p.as_ref()).collect();
    conn.execute(&sql, param_refs.as_slice())?;
    Ok(())
}

pub fn delete_entry(conn: &Connection, txn_id: i64) -> Result<()> {
    require_addendum(conn, txn_id)?;
    conn.execute("DELETE FROM transactions WHERE id = ?1", [txn_id])?;
    Ok(())
}

use comfy_table::{Cell, Table};

use crate::db::{account_id, get_connection};
use crate::error::Result;
use crate::fmt::money;
use crate::settings::db_path;

pub fn list(account: Option<&str>, year: Option<i32>, unclassified: bool) -> Result<()> {
    let conn = get_connection(&db_path())?;

    let mut sql = String::from(
        "SELECT t.id, a.name, t.date, t.description, t.credit, t.transaction_type, \
                t.tax_category, t.property, t.grp, t.company, t.from_addendum \
         FROM transactions t JOIN bank_accounts a ON a.id = t.account_id WHERE 1=1",
    );
    let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    if let Some(name) = account {
        let acct = account_id(&conn, name)?;
        params.push(Box::new(acct));
        sql.push_str(&format!(" AND t.account_id = ?{}", params.len()));
    }
    if let Some(y) = year {
        params.push(Box::new(format!("{y}%")));
        sql.push_str(&format!(" AND t.date LIKE ?{}", params.len()));
    }
    if unclassified {
        sql.push_str(" AND t.transaction_type = ''");
    }
    sql.push_str(" ORDER BY t.date, t.id");

    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        params.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let rows: Vec<(
        i64,
        String,
        String,
        String,
        f64,
        String,
        String,
        String,
        String,
        String,
        bool,
    )> = stmt
        .query_map(param_refs.as_slice(), |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
                row.get(8)?,
                row.get(9)?,
                row.get(10)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Account", "Date", "Description", "Amount", "Type", "Tax", "Property", "Group",
        "Company", "Src",
    ]);
    let count = rows.len();
    for (id, acct, date, desc, credit, ttype, tax, prop, grp, company, manual) in rows {
        table.add_row(vec![
            Cell::new(id),
            Cell::new(acct),
            Cell::new(date),
            Cell::new(desc),
            Cell::new(money(credit)),
            Cell::new(ttype),
            Cell::new(tax),
            Cell::new(prop),
            Cell::new(grp),
            Cell::new(company),
            Cell::new(if manual { "manual" } else { "import" }),
        ]);
    }
    println!("{table}");
    println!("{count} transactions");
    Ok(())
}

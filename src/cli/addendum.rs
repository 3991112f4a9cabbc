use crate::addendum::{add_entry, delete_entry, edit_entry, EditFields};
use crate::db::get_connection;
use crate::error::Result;
use crate::settings::db_path;

pub fn add(account: &str, date: &str, description: &str, credit: f64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let id = add_entry(&conn, account, date, description, credit)?;
    println!("Added transaction {id}");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn edit(
    id: i64,
    date: Option<String>,
    description: Option<String>,
    credit: Option<f64>,
    comment: Option<String>,
    transaction_type: Option<String>,
    tax: Option<String>,
    property: Option<String>,
    group: Option<String>,
    company: Option<String>,
    other_entity: Option<String>,
) -> Result<()> {
    let conn = get_connection(&db_path())?;
    edit_entry(
        &conn,
        id,
        &EditFields {
            date,
            description,
            credit,
            comment,
            transaction_type,
            tax_category: tax,
            property,
            group,
            company,
            other_entity,
        },
    )?;
    println!("Updated transaction {id}");
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    delete_entry(&conn, id)?;
    println!("Deleted transaction {id}");
    Ok(())
}

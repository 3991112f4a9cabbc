use comfy_table::{Cell, Table};

use crate::db::{account_id, get_connection};
use crate::error::Result;
use crate::rules::{
    add_bank_rule, add_common_rule, delete_bank_rule, delete_common_rule, delete_inherit_rule,
    load_bank_rules, load_common_rules, move_bank_rule, set_inherit_rule, NewBankRule,
};
use crate::settings::db_path;

#[allow(clippy::too_many_arguments)]
pub fn add(
    account: &str,
    pattern: &str,
    transaction_type: &str,
    tax: &str,
    property: &str,
    group: &str,
    company: &str,
    other_entity: &str,
    comment: &str,
    order: Option<i64>,
) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let order = match order {
        Some(o) => o,
        None => {
            let acct = account_id(&conn, account)?;
            let max: i64 = conn.query_row(
                "SELECT COALESCE(MAX(rule_order), 0) FROM bank_rules WHERE account_id = ?1",
                [acct],
                |r| r.get(0),
            )?;
            max + 1
        }
    };
    let rule = NewBankRule {
        order,
        pattern: pattern.to_string(),
        transaction_type: transaction_type.to_string(),
        tax_category: tax.to_string(),
        property: property.to_string(),
        group: group.to_string(),
        company: company.to_string(),
        other_entity: other_entity.to_string(),
        comment: comment.to_string(),
    };
    add_bank_rule(&conn, account, &rule)?;
    println!("Added rule at position {order}");
    Ok(())
}

pub fn list(account: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let acct = account_id(&conn, account)?;
    let rules = load_bank_rules(&conn, acct)?;

    let mut table = Table::new();
    table.set_header(vec![
        "Order", "Pattern", "Type", "Tax", "Property", "Group", "Company", "Used",
    ]);
    for rule in rules {
        table.add_row(vec![
            Cell::new(rule.rule_order),
            Cell::new(rule.pattern),
            Cell::new(rule.transaction_type),
            Cell::new(rule.tax_category),
            Cell::new(rule.property),
            Cell::new(rule.group),
            Cell::new(rule.company),
            Cell::new(rule.used_count),
        ]);
    }
    println!("Rules for {account}\n{table}");
    Ok(())
}

pub fn move_rule(account: &str, current: i64, new: i64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    move_bank_rule(&conn, account, current, new)?;
    println!("Moved rule {current} -> {new}");
    Ok(())
}

pub fn delete(account: &str, order: i64) -> Result<()> {
    let conn = get_connection(&db_path())?;
    delete_bank_rule(&conn, account, order)?;
    println!("Deleted rule at position {order}");
    Ok(())
}

pub fn common_add(pattern: &str, transaction_type: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    add_common_rule(&conn, transaction_type, pattern)?;
    println!("Added common rule");
    Ok(())
}

pub fn common_list() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let rules = load_common_rules(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Type", "Pattern"]);
    for rule in rules {
        table.add_row(vec![
            Cell::new(rule.id.unwrap_or_default()),
            Cell::new(rule.transaction_type),
            Cell::new(rule.pattern),
        ]);
    }
    println!("Common rules\n{table}");
    Ok(())
}

pub fn common_delete(pattern: &str, transaction_type: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    delete_common_rule(&conn, transaction_type, pattern)?;
    println!("Deleted common rule");
    Ok(())
}

pub fn inherit_set(
    account: &str,
    tax: &str,
    property: &str,
    group: &str,
    other_entity: &str,
) -> Result<()> {
    let conn = get_connection(&db_path())?;
    set_inherit_rule(&conn, account, tax, property, group, other_entity)?;
    println!("Set defaults for {account}");
    Ok(())
}

pub fn inherit_list() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let mut stmt = conn.prepare(
        "SELECT a.name, i.tax_category, i.property, i.grp, i.other_entity \
         FROM inherit_rules i JOIN bank_accounts a ON a.id = i.account_id ORDER BY a.name",
    )?;
    let rows: Vec<(String, String, String, String, String)> = stmt
        .query_map([], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec!["Account", "Tax", "Property", "Group", "Other entity"]);
    for (account, tax, property, group, other) in rows {
        table.add_row(vec![
            Cell::new(account),
            Cell::new(tax),
            Cell::new(property),
            Cell::new(group),
            Cell::new(other),
        ]);
    }
    println!("Account defaults\n{table}");
    Ok(())
}

pub fn inherit_delete(account: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    delete_inherit_rule(&conn, account)?;
    println!("Deleted defaults for {account}");
    Ok(())
}

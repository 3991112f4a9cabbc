use regex::Regex;
use rusqlite::Connection;

use crate::db::account_id;
use crate::error::{RentbooksError, Result};
use crate::models::{normalize_name, BankRule, CommonRule, InheritRule};

/// Entity names embedded in rules: lowercase alphanumeric and underscore only.
fn valid_name(s: &str) -> bool {
    Regex::new(r"^[a-z0-9_]+$").unwrap().is_match(s)
}

/// Collapse internal whitespace and lowercase, so `desc_contains= Rent` and
/// `desc_contains=rent` are treated as the same pattern when deduplicating.
fn normalize_pattern(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Business invariants on rule records, enforced at write time and never
/// silently coerced.
pub fn validate_rule_fields(
    tax_category: &str,
    property: &str,
    group: &str,
    company: &str,
) -> Result<()> {
    match tax_category {
        "personal" => {
            if !property.is_empty() || !group.is_empty() || !company.is_empty() {
                return Err(RentbooksError::InvalidRule(
                    "tax_category 'personal' requires property, group and company to be empty"
                        .to_string(),
                ));
            }
        }
        "rental" => {
            if property.is_empty() == group.is_empty() {
                return Err(RentbooksError::InvalidRule(
                    "tax_category 'rental' requires exactly one of property or group".to_string(),
                ));
            }
            if !company.is_empty() {
                return Err(RentbooksError::InvalidRule(
                    "tax_category 'rental' requires company to be empty".to_string(),
                ));
            }
        }
        "company" => {
            if company.is_empty() {
                return Err(RentbooksError::InvalidRule(
                    "tax_category 'company' requires a company".to_string(),
                ));
            }
            if !property.is_empty() || !group.is_empty() {
                return Err(RentbooksError::InvalidRule(
                    "tax_category 'company' requires property and group to be empty".to_string(),
                ));
            }
        }
        _ => {
            if !property.is_empty() && !group.is_empty() {
                return Err(RentbooksError::InvalidRule(
                    "only one of property or group may be set, not both".to_string(),
                ));
            }
        }
    }
    Ok(())
}

pub struct NewBankRule {
    pub order: i64,
    pub pattern: String,
    pub transaction_type: String,
    pub tax_category: String,
    pub property: String,
    pub group: String,
    pub company: String,
    pub other_entity: String,
    pub comment: String,
}

pub fn load_bank_rules(conn: &Connection, account_id: i64) -> Result<Vec<BankRule>> {
    let mut stmt = conn.prepare(
        "SELECT id, account_id, rule_order, pattern, transaction_type, tax_category, \
                property, grp, company, other_entity, comment, used_count \
         FROM bank_rules WHERE account_id = ?1 ORDER BY rule_order",
    )?;
    let rules = stmt
        .query_map([account_id], |row| {
            Ok(BankRule {
                id: row.get(0)?,
                account_id: row.get(1)?,
                rule_order: row.get(2)?,
                pattern: row.get(3)?,
                transaction_type: row.get(4)?,
                tax_category: row.get(5)?,
                property: row.get(6)?,
                group: row.get(7)?,
                company: row.get(8)?,
                other_entity: row.get(9)?,
                comment: row.get(10)?,
                used_count: row.get(11)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rules)
}

pub fn load_common_rules(conn: &Connection) -> Result<Vec<CommonRule>> {
    let mut stmt =
        conn.prepare("SELECT id, transaction_type, pattern FROM common_rules ORDER BY id")?;
    let rules = stmt
        .query_map([], |row| {
            Ok(CommonRule {
                id: row.get(0)?,
                transaction_type: row.get(1)?,
                pattern: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rules)
}

pub fn load_inherit_rules(conn: &Connection) -> Result<Vec<InheritRule>> {
    let mut stmt = conn.prepare(
        "SELECT id, account_id, tax_category, property, grp, other_entity \
         FROM inherit_rules ORDER BY id",
    )?;
    let rules = stmt
        .query_map([], |row| {
            Ok(InheritRule {
                id: row.get(0)?,
                account_id: row.get(1)?,
                tax_category: row.get(2)?,
                property: row.get(3)?,
                group: row.get(4)?,
                other_entity: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rules)
}

/// Rewrite an account's rule orders to a continuous 1..n sequence. Done in two
/// passes through negative values so the (account_id, rule_order) unique index
/// never sees a transient collision.
fn renumber(conn: &Connection, account_id: i64) -> Result<()> {
    let ids: Vec<i64> = conn
        .prepare("SELECT id FROM bank_rules WHERE account_id = ?1 ORDER BY rule_order")?
        .query_map([account_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    for (idx, id) in ids.iter().enumerate() {
        conn.execute(
            "UPDATE bank_rules SET rule_order = ?1 WHERE id = ?2",
            rusqlite::params![-((idx as i64) + 1), id],
        )?;
    }
    conn.execute(
        "UPDATE bank_rules SET rule_order = -rule_order WHERE account_id = ?1 AND rule_order < 0",
        [account_id],
    )?;
    Ok(())
}

/// Add a bank rule at the requested order, shifting later rules down.
///
/// If a rule with the same normalized pattern already exists for the account
/// it is updated in place and keeps its original order. Otherwise the order
/// must lie in 1..=max_order+1; existing rules at or after it shift by one and
/// the sequence stays continuous, so orders are always unique per account.
/// Returns the order the rule ended up at.
pub fn add_bank_rule(conn: &Connection, account: &str, rule: &NewBankRule) -> Result<i64> {
    let acct = account_id(conn, account)?;
    let ttype = normalize_name(&rule.transaction_type);
    let patt = rule.pattern.trim().to_string();
    let tax = normalize_name(&rule.tax_category);
    let prop = normalize_name(&rule.property);
    let group = normalize_name(&rule.group);
    let company = normalize_name(&rule.company);
    let other = rule.other_entity.trim().to_string();

    if ttype.is_empty() || patt.is_empty() || tax.is_empty() {
        return Err(RentbooksError::InvalidRule(
            "transaction_type, pattern and tax_category are required".to_string(),
        ));
    }
    if rule.order < 1 {
        return Err(RentbooksError::InvalidRule("order must be >= 1".to_string()));
    }
    for (label, value) in [("property", &prop), ("group", &group), ("company", &company)] {
        if !value.is_empty() && !valid_name(value) {
            return Err(RentbooksError::InvalidRule(format!(
                "invalid {label}: lowercase alphanumeric and underscore only"
            )));
        }
    }
    validate_rule_fields(&tax, &prop, &group, &company)?;

    let existing = load_bank_rules(conn, acct)?;
    let patt_norm = normalize_pattern(&patt);

    if let Some(dup) = existing.iter().find(|r| normalize_pattern(&r.pattern) == patt_norm) {
        // Same pattern: update in place, keep the original order and count.
        conn.execute(
            "UPDATE bank_rules SET pattern = ?1, transaction_type = ?2, tax_category = ?3, \
             property = ?4, grp = ?5, company = ?6, other_entity = ?7, comment = ?8 \
             WHERE id = ?9",
            rusqlite::params![
                patt,
                ttype,
                tax,
                prop,
                group,
                company,
                other,
                rule.comment.trim(),
                dup.id
            ],
        )?;
        return Ok(dup.rule_order);
    }

    let max_order = existing.iter().map(|r| r.rule_order).max().unwrap_or(0);
    if rule.order > max_order + 1 {
        return Err(RentbooksError::InvalidRule(format!(
            "order must be <= {}",
            max_order + 1
        )));
    }

    // Shift rules at or after the insertion point, negatives first to dodge
    // the unique index.
    conn.execute(
        "UPDATE bank_rules SET rule_order = -(rule_order + 1) \
         WHERE account_id = ?1 AND rule_order >= ?2",
        rusqlite::params![acct, rule.order],
    )?;
    conn.execute(
        "UPDATE bank_rules SET rule_order = -rule_order WHERE account_id = ?1 AND rule_order < 0",
        [acct],
    )?;
    conn.execute(
        "INSERT INTO bank_rules (account_id, rule_order, pattern, transaction_type, tax_category, \
         property, grp, company, other_entity, comment) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        rusqlite::params![
            acct,
            rule.order,
            patt,
            ttype,
            tax,
            prop,
            group,
            company,
            other,
            rule.comment.trim()
        ],
    )?;
    Ok(rule.order)
}

/// Move a rule from one order slot to another, renumbering 1..n.
pub fn move_bank_rule(conn: &Connection, account: &str, current: i64, new: i64) -> Result<()> {
    let acct = account_id(conn, account)?;
    if current < 1 || new < 1 {
        return Err(RentbooksError::InvalidRule("orders must be >= 1".to_string()));
    }
    let rules = load_bank_rules(conn, acct)?;
    if rules.is_empty() {
        return Err(RentbooksError::Other(format!("No rules found for account '{account}'")));
    }
    let max_order = rules.iter().map(|r| r.rule_order).max().unwrap_or(0);
    if new > max_order {
        return Err(RentbooksError::InvalidRule(format!(
            "new order must be between 1 and {max_order}"
        )));
    }
    let target = rules
        .iter()
        .find(|r| r.rule_order == current)
        .ok_or_else(|| RentbooksError::Other(format!("No rule with order {current}")))?;
    let target_id = target.id;

    // Rebuild the ordered id list with the target repositioned, then renumber.
    let mut ids: Vec<Option<i64>> = rules.iter().filter(|r| r.rule_order != current).map(|r| r.id).collect();
    let insert_at = ((new - 1).max(0) as usize).min(ids.len());
    ids.insert(insert_at, target_id);
    for (idx, id) in ids.iter().enumerate() {
        conn.execute(
            "UPDATE bank_rules SET rule_order = ?1 WHERE id = ?2",
            rusqlite::params![-((idx as i64) + 1), id],
        )?;
    }
    conn.execute(
        "UPDATE bank_rules SET rule_order = -rule_order WHERE account_id = ?1 AND rule_order < 0",
        [acct],
    )?;
    Ok(())
}

/// Delete the rule at the given order and close the gap.
pub fn delete_bank_rule(conn: &Connection, account: &str, order: i64) -> Result<()> {
    let acct = account_id(conn, account)?;
    let deleted = conn.execute(
        "DELETE FROM bank_rules WHERE account_id = ?1 AND rule_order = ?2",
        rusqlite::params![acct, order],
    )?;
    if deleted == 0 {
        return Err(RentbooksError::Other(format!("No rule with order {order}")));
    }
    renumber(conn, acct)
}

pub fn add_common_rule(conn: &Connection, transaction_type: &str, pattern: &str) -> Result<()> {
    let ttype = normalize_name(transaction_type);
    let patt = pattern.trim();
    if ttype.is_empty() || patt.is_empty() {
        return Err(RentbooksError::InvalidRule(
            "transaction_type and pattern are required".to_string(),
        ));
    }
    if !valid_name(&ttype) {
        return Err(RentbooksError::InvalidRule(
            "invalid transaction_type: lowercase alphanumeric and underscore only".to_string(),
        ));
    }
    conn.execute(
        "INSERT OR IGNORE INTO common_rules (transaction_type, pattern) VALUES (?1, ?2)",
        rusqlite::params![ttype, patt],
    )?;
    Ok(())
}

pub fn delete_common_rule(conn: &Connection, transaction_type: &str, pattern: &str) -> Result<()> {
    let deleted = conn.execute(
        "DELETE FROM common_rules WHERE transaction_type = ?1 AND pattern = ?2",
        rusqlite::params![normalize_name(transaction_type), pattern.trim()],
    )?;
    if deleted == 0 {
        return Err(RentbooksError::Other("Common rule not found".to_string()));
    }
    Ok(())
}

/// Set (or replace) the per-account defaults applied on common-rule matches.
pub fn set_inherit_rule(
    conn: &Connection,
    account: &str,
    tax_category: &str,
    property: &str,
    group: &str,
    other_entity: &str,
) -> Result<()> {
    let acct = account_id(conn, account)?;
    let tax = normalize_name(tax_category);
    let prop = normalize_name(property);
    let grp = normalize_name(group);
    for (label, value) in [("tax_category", &tax), ("property", &prop), ("group", &grp)] {
        if !value.is_empty() && !valid_name(value) {
            return Err(RentbooksError::InvalidRule(format!(
                "invalid {label}: lowercase alphanumeric and underscore only"
            )));
        }
    }
    conn.execute(
        "INSERT INTO inherit_rules (account_id, tax_category, property, grp, other_entity) \
         VALUES (?1, ?2, ?3, ?4, ?5) \
         ON CONFLICT(account_id) DO UPDATE SET tax_category = ?2, property = ?3, grp = ?4, \
         other_entity = ?5",
        rusqlite::params![acct, tax, prop, grp, other_entity.trim()],
    )?;
    Ok(())
}

pub fn delete_inherit_rule(conn: &Connection, account: &str) -> Result<()> {
    let acct = account_id(conn, account)?;
    let deleted = conn.execute("DELETE FROM inherit_rules WHERE account_id = ?1", [acct])?;
    if deleted == 0 {
        return Err(RentbooksError::Other("Inherit rule not found".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        conn.execute(
            "INSERT INTO bank_accounts (name, bank_name) VALUES ('chase_checking', 'chase')",
            [],
        )
        .unwrap();
        (dir, conn)
    }

    fn rule(order: i64, pattern: &str) -> NewBankRule {
        NewBankRule {
            order,
            pattern: pattern.to_string(),
            transaction_type: "rent".to_string(),
            tax_category: "rental".to_string(),
            property: "maple_st".to_string(),
            group: String::new(),
            company: String::new(),
            other_entity: String::new(),
            comment: String::new(),
        }
    }

    fn orders_and_patterns(conn: &Connection) -> Vec<(i64, String)> {
        load_bank_rules(conn, 1)
            .unwrap()
            .into_iter()
            .map(|r| (r.rule_order, r.pattern))
            .collect()
    }

    #[test]
    fn test_personal_with_property_rejected() {
        let err = validate_rule_fields("personal", "maple_st", "", "").unwrap_err();
        assert!(err.to_string().contains("personal"));
    }

    #[test]
    fn test_rental_xor_property_group() {
        assert!(validate_rule_fields("rental", "maple_st", "", "").is_ok());
        assert!(validate_rule_fields("rental", "", "downtown", "").is_ok());
        assert!(validate_rule_fields("rental", "maple_st", "downtown", "").is_err());
        assert!(validate_rule_fields("rental", "", "", "").is_err());
    }

    #[test]
    fn test_company_requires_company() {
        assert!(validate_rule_fields("company", "", "", "acme_llc").is_ok());
        assert!(validate_rule_fields("company", "", "", "").is_err());
        assert!(validate_rule_fields("company", "maple_st", "", "acme_llc").is_err());
    }

    #[test]
    fn test_add_appends_and_inserts_with_shift() {
        let (_dir, conn) = test_db();
        add_bank_rule(&conn, "chase_checking", &rule(1, "desc_contains=rent")).unwrap();
        add_bank_rule(&conn, "chase_checking", &rule(2, "desc_contains=fee")).unwrap();
        // Insert at the front: existing rules shift down.
        add_bank_rule(&conn, "chase_checking", &rule(1, "desc_startswith=zelle")).unwrap();
        assert_eq!(
            orders_and_patterns(&conn),
            vec![
                (1, "desc_startswith=zelle".to_string()),
                (2, "desc_contains=rent".to_string()),
                (3, "desc_contains=fee".to_string()),
            ]
        );
    }

    #[test]
    fn test_add_rejects_order_gap() {
        let (_dir, conn) = test_db();
        add_bank_rule(&conn, "chase_checking", &rule(1, "desc_contains=rent")).unwrap();
        let err = add_bank_rule(&conn, "chase_checking", &rule(5, "desc_contains=fee")).unwrap_err();
        assert!(err.to_string().contains("order must be <= 2"));
    }

    #[test]
    fn test_add_same_pattern_updates_in_place() {
        let (_dir, conn) = test_db();
        add_bank_rule(&conn, "chase_checking", &rule(1, "desc_contains=rent")).unwrap();
        add_bank_rule(&conn, "chase_checking", &rule(2, "desc_contains=fee")).unwrap();
        let mut updated = rule(2, "  DESC_CONTAINS=RENT  ");
        updated.transaction_type = "tenantfees".to_string();
        let kept_order = add_bank_rule(&conn, "chase_checking", &updated).unwrap();
        assert_eq!(kept_order, 1);
        let rules = load_bank_rules(&conn, 1).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].transaction_type, "tenantfees");
    }

    #[test]
    fn test_move_rule() {
        let (_dir, conn) = test_db();
        add_bank_rule(&conn, "chase_checking", &rule(1, "desc_contains=a")).unwrap();
        add_bank_rule(&conn, "chase_checking", &rule(2, "desc_contains=b")).unwrap();
        add_bank_rule(&conn, "chase_checking", &rule(3, "desc_contains=c")).unwrap();
        move_bank_rule(&conn, "chase_checking", 3, 1).unwrap();
        assert_eq!(
            orders_and_patterns(&conn),
            vec![
                (1, "desc_contains=c".to_string()),
                (2, "desc_contains=a".to_string()),
                (3, "desc_contains=b".to_string()),
            ]
        );
    }

    #[test]
    fn test_move_rejects_out_of_range() {
        let (_dir, conn) = test_db();
        add_bank_rule(&conn, "chase_checking", &rule(1, "desc_contains=a")).unwrap();
        assert!(move_bank_rule(&conn, "chase_checking", 1, 2).is_err());
    }

    #[test]
    fn test_delete_renumbers() {
        let (_dir, conn) = test_db();
        add_bank_rule(&conn, "chase_checking", &rule(1, "desc_contains=a")).unwrap();
        add_bank_rule(&conn, "chase_checking", &rule(2, "desc_contains=b")).unwrap();
        add_bank_rule(&conn, "chase_checking", &rule(3, "desc_contains=c")).unwrap();
        delete_bank_rule(&conn, "chase_checking", 2).unwrap();
        assert_eq!(
            orders_and_patterns(&conn),
            vec![(1, "desc_contains=a".to_string()), (2, "desc_contains=c".to_string())]
        );
    }

    #[test]
    fn test_bank_rule_entity_name_validation() {
        let (_dir, conn) = test_db();
        let mut bad = rule(1, "desc_contains=rent");
        bad.property = "maple st".to_string();
        let err = add_bank_rule(&conn, "chase_checking", &bad).unwrap_err();
        assert!(err.to_string().contains("invalid property"));

        bad.property = String::new();
        bad.group = "down-town".to_string();
        assert!(add_bank_rule(&conn, "chase_checking", &bad).is_err());
        assert!(load_bank_rules(&conn, 1).unwrap().is_empty());
    }

    #[test]
    fn test_common_rule_name_validation() {
        let (_dir, conn) = test_db();
        assert!(add_common_rule(&conn, "bank fee!", "desc_contains=fee").is_err());
        add_common_rule(&conn, "bankfees", "desc_contains=fee").unwrap();
        assert_eq!(load_common_rules(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_inherit_rule_upsert() {
        let (_dir, conn) = test_db();
        set_inherit_rule(&conn, "chase_checking", "rental", "maple_st", "", "").unwrap();
        set_inherit_rule(&conn, "chase_checking", "rental", "oak_ave", "", "").unwrap();
        let rules = load_inherit_rules(&conn).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].property, "oak_ave");
    }

    #[test]
    fn test_unknown_account_rejected() {
        let (_dir, conn) = test_db();
        let err = add_bank_rule(&conn, "nope", &rule(1, "desc_contains=a")).unwrap_err();
        assert!(err.to_string().contains("Unknown bank account"));
    }
}

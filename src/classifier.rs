use rusqlite::Connection;

use crate::error::Result;
use crate::models::{BankRule, CommonRule, InheritRule, Transaction};
use crate::pattern::pattern_matches;
use crate::rules::{load_bank_rules, load_common_rules, load_inherit_rules};

/// Outcome of classifying one transaction. `rule_order` is set only for
/// bank-rule matches; an empty `transaction_type` means unclassified, which
/// is a valid terminal state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub transaction_type: String,
    pub tax_category: String,
    pub property: String,
    pub group: String,
    pub company: String,
    pub other_entity: String,
    pub rule_order: Option<i64>,
}

impl Classification {
    pub fn is_classified(&self) -> bool {
        !self.transaction_type.is_empty()
    }
}

/// Classify one transaction against a snapshot of the rule collections.
///
/// Bank rules for the transaction's account are evaluated by ascending
/// `rule_order`, first match wins. If none match, common rules are tried in
/// stored order; a common match takes its transaction type and fills the
/// remaining fields from the account's inherit rule, leaving `rule_order`
/// unset.
pub fn classify(
    txn: &Transaction,
    bank_rules: &[BankRule],
    common_rules: &[CommonRule],
    inherit_rules: &[InheritRule],
) -> Classification {
    let mut account_rules: Vec<&BankRule> = bank_rules
        .iter()
        .filter(|r| r.account_id == txn.account_id)
        .collect();
    account_rules.sort_by_key(|r| r.rule_order);

    for rule in account_rules {
        if pattern_matches(&rule.pattern, &txn.description, txn.credit) {
            return Classification {
                transaction_type: rule.transaction_type.clone(),
                tax_category: rule.tax_category.clone(),
                property: rule.property.clone(),
                group: rule.group.clone(),
                company: rule.company.clone(),
                other_entity: rule.other_entity.clone(),
                rule_order: Some(rule.rule_order),
            };
        }
    }

    for rule in common_rules {
        if pattern_matches(&rule.pattern, &txn.description, txn.credit) {
            let inherit = inherit_rules.iter().find(|i| i.account_id == txn.account_id);
            return Classification {
                transaction_type: rule.transaction_type.clone(),
                tax_category: inherit.map(|i| i.tax_category.clone()).unwrap_or_default(),
                property: inherit.map(|i| i.property.clone()).unwrap_or_default(),
                group: inherit.map(|i| i.group.clone()).unwrap_or_default(),
                company: String::new(),
                other_entity: inherit.map(|i| i.other_entity.clone()).unwrap_or_default(),
                rule_order: None,
            };
        }
    }

    Classification::default()
}

pub struct ClassifyResult {
    pub classified: usize,
    pub unmatched: usize,
}

/// Re-run classification over every imported row of one account.
///
/// Addendum rows keep their manually supplied fields and are never touched.
/// `used_count` is recomputed from scratch on each run so the displayed
/// counts always reflect the current rule set.
pub fn classify_account(conn: &Connection, account_id: i64) -> Result<ClassifyResult> {
    let bank_rules = load_bank_rules(conn, account_id)?;
    let common_rules = load_common_rules(conn)?;
    let inherit_rules = load_inherit_rules(conn)?;

    conn.execute(
        "UPDATE bank_rules SET used_count = 0 WHERE account_id = ?1",
        [account_id],
    )?;

    let mut stmt = conn.prepare(
        "SELECT id, description, credit FROM transactions \
         WHERE account_id = ?1 AND from_addendum = 0 ORDER BY date, description, credit",
    )?;
    let rows: Vec<(i64, String, f64)> = stmt
        .query_map([account_id], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut classified = 0usize;
    let mut unmatched = 0usize;

    for (txn_id, description, credit) in &rows {
        let txn = Transaction {
            account_id,
            description: description.clone(),
            credit: *credit,
            ..Transaction::default()
        };
        let result = classify(&txn, &bank_rules, &common_rules, &inherit_rules);
        conn.execute(
            "UPDATE transactions SET rule_order = ?1, transaction_type = ?2, tax_category = ?3, \
             property = ?4, grp = ?5, company = ?6, other_entity = ?7 WHERE id = ?8",
            rusqlite::params![
                result.rule_order,
                result.transaction_type,
                result.tax_category,
                result.property,
                result.group,
                result.company,
                result.other_entity,
                txn_id
            ],
        )?;
        if let Some(order) = result.rule_order {
            conn.execute(
                "UPDATE bank_rules SET used_count = used_count + 1 \
                 WHERE account_id = ?1 AND rule_order = ?2",
                rusqlite::params![account_id, order],
            )?;
        }
        if result.is_classified() {
            classified += 1;
        } else {
            unmatched += 1;
        }
    }

    Ok(ClassifyResult {
        classified,
        unmatched,
    })
}

/// Classify every bank account in turn.
pub fn classify_all(conn: &Connection) -> Result<ClassifyResult> {
    let accounts: Vec<i64> = conn
        .prepare("SELECT id FROM bank_accounts ORDER BY name")?
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut total = ClassifyResult {
        classified: 0,
        unmatched: 0,
    };
    for acct in accounts {
        let result = classify_account(conn, acct)?;
        total.classified += result.classified;
        total.unmatched += result.unmatched;
    }
    Ok(total)
}

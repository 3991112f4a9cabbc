/// Reference-data and ledger records. Name fields are stored trimmed and
/// lowercased; `normalize_name` is the single place that convention lives.
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Statement layout for one bank: delimiter, column positions (1-based,
/// 0 = column absent) and line filters applied before CSV parsing.
#[derive(Debug, Clone)]
pub struct BankFormat {
    pub id: i64,
    pub name: String,
    pub delimiter: u8,
    pub date_format: String,
    pub date_col: usize,
    pub description_col: usize,
    pub debit_col: usize,
    pub credit_col: usize,
    pub ignore_startswith: Vec<String>,
    pub ignore_contains: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub properties: Vec<String>,
}

/// One ledger row. Imported rows carry a `tr_id` and are immutable through
/// the addendum surface; manually added rows have `tr_id = None` and
/// `from_addendum = true`.
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    pub id: Option<i64>,
    pub account_id: i64,
    pub tr_id: Option<String>,
    pub date: String,
    pub description: String,
    pub credit: f64,
    pub rule_order: Option<i64>,
    pub comment: String,
    pub transaction_type: String,
    pub tax_category: String,
    pub property: String,
    pub group: String,
    pub company: String,
    pub other_entity: String,
    pub from_addendum: bool,
}

/// Account-specific pattern -> classification mapping. `rule_order` is
/// continuous 1..n per account and decides evaluation priority.
#[derive(Debug, Clone)]
pub struct BankRule {
    pub id: Option<i64>,
    pub account_id: i64,
    pub rule_order: i64,
    pub pattern: String,
    pub transaction_type: String,
    pub tax_category: String,
    pub property: String,
    pub group: String,
    pub company: String,
    pub other_entity: String,
    pub comment: String,
    pub used_count: i64,
}

/// Account-agnostic pattern -> transaction-type mapping, evaluated after
/// bank rules in insertion order.
#[derive(Debug, Clone)]
pub struct CommonRule {
    pub id: Option<i64>,
    pub transaction_type: String,
    pub pattern: String,
}

/// Per-account defaults merged in when a common rule matches.
#[derive(Debug, Clone)]
pub struct InheritRule {
    pub id: Option<i64>,
    pub account_id: i64,
    pub tax_category: String,
    pub property: String,
    pub group: String,
    pub other_entity: String,
}

/// Intermediate representation from the statement parser before DB insert.
#[derive(Debug, Clone)]
pub struct ParsedRow {
    pub date: String,
    pub description: String,
    pub credit: f64,
}

use std::path::Path;

use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::classifier::classify_account;
use crate::error::{RentbooksError, Result};
use crate::models::{BankFormat, ParsedRow};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.replace(',', "").replace('"', "").replace('$', "");
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return inner.trim().parse::<f64>().ok().map(|v| -v);
    }
    s.parse().ok()
}

/// Map the bank-config date token syntax (yyyy, MM, dd) onto chrono format
/// specifiers.
fn chrono_format(raw_fmt: &str) -> String {
    raw_fmt
        .replace("yyyy", "%Y")
        .replace("yy", "%y")
        .replace("MM", "%m")
        .replace("dd", "%d")
}

/// Normalize a statement date to YYYY-MM-DD, trying the configured format
/// first and then the common fallbacks.
pub fn normalize_date(raw: &str, configured_fmt: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let mut formats = Vec::new();
    if !configured_fmt.is_empty() {
        formats.push(chrono_format(configured_fmt));
    }
    formats.push("%m/%d/%Y".to_string());
    formats.push("%Y-%m-%d".to_string());
    for fmt in &formats {
        if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, fmt) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    None
}

fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

/// Format a credit the way normalized rows store it: integral amounts drop
/// the decimal part ("1200", not "1200.0").
fn credit_text(credit: f64) -> String {
    if credit.fract() == 0.0 {
        format!("{}", credit as i64)
    } else {
        format!("{credit}")
    }
}

/// Stable row id: first 10 hex chars of sha256 over account, date,
/// description and credit, lowercased with all whitespace removed.
pub fn compute_tr_id(account: &str, date: &str, description: &str, credit: f64) -> String {
    let joined = format!("{account}{date}{description}{}", credit_text(credit)).to_lowercase();
    let squeezed: String = joined.split_whitespace().collect();
    let mut hasher = Sha256::new();
    hasher.update(squeezed.as_bytes());
    hex::encode(hasher.finalize())[..10].to_string()
}

// ---------------------------------------------------------------------------
// Bank format config
// ---------------------------------------------------------------------------

fn json_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

pub fn load_bank_format(conn: &Connection, bank_name: &str) -> Result<BankFormat> {
    conn.query_row(
        "SELECT id, name, delimiter, date_format, date_col, description_col, debit_col, \
                credit_col, ignore_startswith, ignore_contains \
         FROM banks WHERE name = ?1",
        [bank_name],
        |row| {
            let delim: String = row.get(2)?;
            let starts: String = row.get(8)?;
            let contains: String = row.get(9)?;
            Ok(BankFormat {
                id: row.get(0)?,
                name: row.get(1)?,
                delimiter: delim.bytes().next().unwrap_or(b','),
                date_format: row.get(3)?,
                date_col: row.get::<_, i64>(4)? as usize,
                description_col: row.get::<_, i64>(5)? as usize,
                debit_col: row.get::<_, i64>(6)? as usize,
                credit_col: row.get::<_, i64>(7)? as usize,
                ignore_startswith: json_list(&starts),
                ignore_contains: json_list(&contains),
            })
        },
    )
    .map_err(|_| RentbooksError::UnknownBank(bank_name.to_string()))
}

/// Parse one raw statement file according to a bank's format config.
///
/// Lines matching the ignore filters are dropped before CSV parsing; column
/// indexes are 1-based with 0 meaning "column absent". A populated debit
/// column yields a negative credit, a populated credit column a positive one.
pub fn parse_statement(file_path: &Path, format: &BankFormat) -> Result<Vec<ParsedRow>> {
    let content = std::fs::read_to_string(file_path)?;
    let kept: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !format.ignore_startswith.iter().any(|p| !p.is_empty() && line.starts_with(p.as_str())))
        .filter(|line| !format.ignore_contains.iter().any(|p| !p.is_empty() && line.contains(p.as_str())))
        .collect();

    let buf = kept.join("\n").into_bytes();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(format.delimiter)
        .from_reader(buf.as_slice());

    let field = |record: &csv::StringRecord, idx: usize| -> String {
        if idx == 0 {
            return String::new();
        }
        record.get(idx - 1).unwrap_or("").trim().to_string()
    };

    let mut rows = Vec::new();
    for result in rdr.records() {
        let Ok(record) = result else { continue };
        let Some(date) = normalize_date(&field(&record, format.date_col), &format.date_format)
        else {
            continue;
        };
        let description = field(&record, format.description_col);
        if description.is_empty() {
            continue;
        }
        let debit = parse_amount(&field(&record, format.debit_col));
        let credit = parse_amount(&field(&record, format.credit_col));
        let amount = match (debit, credit) {
            (Some(d), _) => -d.abs(),
            (None, Some(c)) => c.abs(),
            (None, None) => continue,
        };
        rows.push(ParsedRow {
            date,
            description,
            credit: amount,
        });
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// import_file
// ---------------------------------------------------------------------------

pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    pub duplicate_file: bool,
}

pub fn import_file(conn: &Connection, file_path: &Path, account_name: &str) -> Result<ImportResult> {
    let (account_id, account_key, bank_name) = {
        let mut stmt =
            conn.prepare("SELECT id, name, bank_name FROM bank_accounts WHERE name = ?1")?;
        stmt.query_row([&crate::models::normalize_name(account_name)], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })
        .map_err(|_| RentbooksError::UnknownAccount(account_name.to_string()))?
    };

    let checksum = compute_checksum(file_path)?;
    {
        let mut stmt =
            conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1 AND account_id = ?2")?;
        if stmt.exists(rusqlite::params![checksum, account_id])? {
            return Ok(ImportResult {
                imported: 0,
                skipped: 0,
                duplicate_file: true,
            });
        }
    }

    let format = load_bank_format(conn, &bank_name)?;
    let parsed_rows = parse_statement(file_path, &format)?;

    let mut imported = 0usize;
    let mut skipped = 0usize;
    for row in &parsed_rows {
        let tr_id = compute_tr_id(&account_key, &row.date, &row.description, row.credit);
        let exists: bool = conn
            .prepare_cached("SELECT 1 FROM transactions WHERE account_id = ?1 AND tr_id = ?2")?
            .exists(rusqlite::params![account_id, tr_id])?;
        if exists {
            skipped += 1;
            continue;
        }
        conn.execute(
            "INSERT INTO transactions (account_id, tr_id, date, description, credit) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![account_id, tr_id, row.date, row.description, row.credit],
        )?;
        imported += 1;
    }

    conn.execute(
        "INSERT INTO imports (filename, account_id, record_count, checksum) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            file_path.file_name().and_then(|n| n.to_str()).unwrap_or(""),
            account_id,
            parsed_rows.len() as i64,
            checksum,
        ],
    )?;

    classify_account(conn, account_id)?;

    Ok(ImportResult {
        imported,
        skipped,
        duplicate_file: false,
    })
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
            "INSERT INTO banks (name, delimiter, date_format, date_col, description_col, \
             debit_col, credit_col, ignore_startswith, ignore_contains) \
             VALUES ('chase', ',', 'MM/dd/yyyy', 1, 2, 0, 3, '[\"Date,\"]', '[\"Beginning balance\"]')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO bank_accounts (name, bank_name) VALUES ('chase_checking', 'chase')",
            [],
        )
        .unwrap();
        (dir, conn)
    }

    fn write_statement(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    const STATEMENT: &str = "\
Date,Description,Amount
01/15/2025,MONTHLY RENT PAYMENT,\"1,200.00\"
01/16/2025,Beginning balance,500.00
01/17/2025,WIRE FEE,(25.00)
";

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("\"500.00\""), Some(500.0));
        assert_eq!(parse_amount("(25.00)"), Some(-25.0));
        assert_eq!(parse_amount("$1,234.56"), Some(1234.56));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("not_a_number"), None);
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("01/15/2025", "MM/dd/yyyy"), Some("2025-01-15".to_string()));
        assert_eq!(normalize_date("2025-01-15", ""), Some("2025-01-15".to_string()));
        assert_eq!(normalize_date("15.01.2025", "dd.MM.yyyy"), Some("2025-01-15".to_string()));
        assert_eq!(normalize_date("garbage", "MM/dd/yyyy"), None);
        assert_eq!(normalize_date("", ""), None);
    }

    #[test]
    fn test_compute_tr_id_insensitive_to_case_and_spacing() {
        let a = compute_tr_id("chase_checking", "2025-01-15", "MONTHLY RENT", 1200.0);
        let b = compute_tr_id("chase_checking", "2025-01-15", "monthly  rent", 1200.0);
        assert_eq!(a, b);
        assert_eq!(a.len(), 10);
        let c = compute_tr_id("chase_checking", "2025-01-16", "monthly rent", 1200.0);
        assert_ne!(a, c);
    }

    #[test]
    fn test_parse_statement_applies_ignore_filters() {
        let dir = tempfile::tempdir().unwrap();
        let (_db_dir, conn) = test_db();
        let format = load_bank_format(&conn, "chase").unwrap();
        let path = write_statement(dir.path(), "stmt.csv", STATEMENT);
        let rows = parse_statement(&path, &format).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].description, "MONTHLY RENT PAYMENT");
        assert_eq!(rows[0].credit, 1200.0);
        // Single-amount-column formats always come through the credit column
        // as positive values.
        assert_eq!(rows[1].credit, 25.0);
    }

    #[test]
    fn test_parse_statement_debit_column_negates() {
        let dir = tempfile::tempdir().unwrap();
        let (_db_dir, conn) = test_db();
        conn.execute(
            "UPDATE banks SET debit_col = 3, credit_col = 4 WHERE name = 'chase'",
            [],
        )
        .unwrap();
        let format = load_bank_format(&conn, "chase").unwrap();
        let path = write_statement(
            dir.path(),
            "stmt.csv",
            "01/15/2025,MORTGAGE PAYMENT,850.00,\n01/16/2025,RENT RECEIVED,,1200.00\n",
        );
        let rows = parse_statement(&path, &format).unwrap();
        assert_eq!(rows[0].credit, -850.0);
        assert_eq!(rows[1].credit, 1200.0);
    }

    #[test]
    fn test_import_file_inserts_and_classifies_nothing_without_rules() {
        let (dir, conn) = test_db();
        let path = write_statement(dir.path(), "stmt.csv", STATEMENT);
        let result = import_file(&conn, &path, "chase_checking").unwrap();
        assert_eq!(result.imported, 2);
        assert!(!result.duplicate_file);
        let count: i64 = conn
            .query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 2);
        let with_id: i64 = conn
            .query_row("SELECT count(*) FROM transactions WHERE tr_id IS NOT NULL", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(with_id, 2);
    }

    #[test]
    fn test_import_file_detects_duplicate_file() {
        let (dir, conn) = test_db();
        let path = write_statement(dir.path(), "stmt.csv", STATEMENT);
        import_file(&conn, &path, "chase_checking").unwrap();
        let again = import_file(&conn, &path, "chase_checking").unwrap();
        assert!(again.duplicate_file);
        assert_eq!(again.imported, 0);
    }

    #[test]
    fn test_import_file_skips_duplicate_rows() {
        let (dir, conn) = test_db();
        let first = write_statement(dir.path(), "jan.csv", STATEMENT);
        import_file(&conn, &first, "chase_checking").unwrap();
        let overlap = "\
Date,Description,Amount
01/17/2025,WIRE FEE,(25.00)
02/01/2025,MONTHLY RENT PAYMENT,\"1,200.00\"
";
        let second = write_statement(dir.path(), "feb.csv", overlap);
        let result = import_file(&conn, &second, "chase_checking").unwrap();
        assert_eq!(result.imported, 1);
        assert_eq!(result.skipped, 1);
    }

    #[test]
    fn test_import_file_unknown_account() {
        let (dir, conn) = test_db();
        let path = write_statement(dir.path(), "stmt.csv", STATEMENT);
        assert!(import_file(&conn, &path, "nope").is_err());
    }
}

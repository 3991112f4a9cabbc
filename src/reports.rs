use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;

use crate::error::Result;
use crate::models::Group;

/// Straight-line depreciation rate applied to cost + renovation.
const DEPRECIATION_RATE: f64 = 3.64 / 100.0;

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn load_groups(conn: &Connection) -> Result<Vec<Group>> {
    let mut stmt = conn.prepare("SELECT id, name, property_list FROM groups ORDER BY name")?;
    let groups = stmt
        .query_map([], |row| {
            let raw: String = row.get(2)?;
            Ok(Group {
                id: row.get(0)?,
                name: row.get(1)?,
                properties: serde_json::from_str(&raw).unwrap_or_default(),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(groups)
}

/// Expand a row's property/group pair to the properties it applies to.
fn target_properties(property: &str, group: &str, groups: &[Group]) -> Vec<String> {
    if !property.is_empty() {
        return vec![property.to_string()];
    }
    if !group.is_empty() {
        if let Some(g) = groups.iter().find(|g| g.name == group) {
            return g.properties.iter().filter(|p| !p.is_empty()).cloned().collect();
        }
    }
    Vec::new()
}

// ---------------------------------------------------------------------------
// Rental summary
// ---------------------------------------------------------------------------

/// Per property: credit totals keyed by transaction type, over rental rows
/// for the given year. A group row contributes its full credit to every
/// property in the group. Each property additionally gets a negative
/// `depreciation` line derived from its cost basis.
pub fn rental_summary(conn: &Connection, year: i32) -> Result<BTreeMap<String, BTreeMap<String, f64>>> {
    let groups = load_groups(conn)?;
    let mut stmt = conn.prepare(
        "SELECT credit, transaction_type, property, grp FROM transactions \
         WHERE tax_category = 'rental' AND transaction_type != '' AND date LIKE ?1",
    )?;
    let rows: Vec<(f64, String, String, String)> = stmt
        .query_map([format!("{year}%")], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut summary: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for (credit, ttype, property, group) in &rows {
        for prop in target_properties(property, group, &groups) {
            *summary.entry(prop).or_default().entry(ttype.clone()).or_default() += credit;
        }
    }

    apply_depreciation(conn, year, &mut summary)?;

    for totals in summary.values_mut() {
        for v in totals.values_mut() {
            *v = round2(*v);
        }
    }
    Ok(summary)
}

/// depreciation = (cost + renovation) * 3.64%, prorated by days owned when
/// the property was purchased in the report year. Stored negative, it is an
/// expense line.
fn apply_depreciation(
    conn: &Connection,
    year: i32,
    summary: &mut BTreeMap<String, BTreeMap<String, f64>>,
) -> Result<()> {
    let mut stmt = conn.prepare("SELECT name, cost, renovation, purchase_date FROM properties")?;
    let props: Vec<(String, f64, f64, String)> = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    for (name, cost, renovation, purchase_date) in props {
        let mut depreciation = round2((cost + renovation) * DEPRECIATION_RATE);
        if let Ok(purchased) = NaiveDate::parse_from_str(purchase_date.trim(), "%Y-%m-%d") {
            if purchased.year() == year {
                let year_end = NaiveDate::from_ymd_opt(year, 12, 31).unwrap();
                let days_owned = (year_end - purchased).num_days() + 1;
                depreciation = round2(depreciation * (days_owned.max(0) as f64) / 365.0);
            }
        }
        summary
            .entry(name)
            .or_default()
            .insert("depreciation".to_string(), -depreciation);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Company summary
// ---------------------------------------------------------------------------

/// Per company: credit totals keyed by transaction type, over every row with
/// a non-empty company for the given year.
pub fn company_summary(conn: &Connection, year: i32) -> Result<BTreeMap<String, BTreeMap<String, f64>>> {
    let mut stmt = conn.prepare(
        "SELECT company, transaction_type, SUM(credit) FROM transactions \
         WHERE company != '' AND transaction_type != '' AND date LIKE ?1 \
         GROUP BY company, transaction_type",
    )?;
    let rows: Vec<(String, String, f64)> = stmt
        .query_map([format!("{year}%")], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut summary: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for (company, ttype, total) in rows {
        summary.entry(company).or_default().insert(ttype, round2(total));
    }
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Rent tracker
// ---------------------------------------------------------------------------

/// Per property, rent plus tenant fees received for each month (index 0 =
/// January). Group rows split the credit evenly across the group's
/// properties.
pub struct RentTrackerRow {
    pub property: String,
    pub monthly: [f64; 12],
    pub total: f64,
}

pub fn rent_tracker(conn: &Connection, year: i32) -> Result<Vec<RentTrackerRow>> {
    let groups = load_groups(conn)?;
    let mut stmt = conn.prepare(
        "SELECT date, credit, property, grp FROM transactions \
         WHERE tax_category = 'rental' AND transaction_type IN ('rent', 'tenantfees') \
         AND date LIKE ?1",
    )?;
    let rows: Vec<(String, f64, String, String)> = stmt
        .query_map([format!("{year}%")], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut tracker: BTreeMap<String, [f64; 12]> = BTreeMap::new();
    for (date, credit, property, group) in &rows {
        if *credit == 0.0 {
            continue;
        }
        let Some(month) = date
            .get(5..7)
            .and_then(|m| m.parse::<usize>().ok())
            .filter(|m| (1..=12).contains(m))
        else {
            continue;
        };
        let props = target_properties(property, group, &groups);
        if props.is_empty() {
            continue;
        }
        let share = credit / props.len() as f64;
        for prop in props {
            tracker.entry(prop).or_insert([0.0; 12])[month - 1] += share;
        }
    }

    Ok(tracker
        .into_iter()
        .map(|(property, mut monthly)| {
            for v in monthly.iter_mut() {
                *v = round2(*v);
            }
            let total = round2(monthly.iter().sum());
            RentTrackerRow {
                property,
                monthly,
                total,
            }
        })
        .collect())
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

    fn add_txn(conn: &Connection, date: &str, credit: f64, ttype: &str, tax: &str, prop: &str, grp: &str, company: &str) {
        conn.execute(
            "INSERT INTO transactions (account_id, date, description, credit, transaction_type, \
             tax_category, property, grp, company) VALUES (1, ?1, 'x', ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![date, credit, ttype, tax, prop, grp, company],
        )
        .unwrap();
    }

    #[test]
    fn test_rental_summary_totals_by_type() {
        let (_dir, conn) = test_db();
        add_txn(&conn, "2025-01-05", 1200.0, "rent", "rental", "maple_st", "", "");
        add_txn(&conn, "2025-02-05", 1200.0, "rent", "rental", "maple_st", "", "");
        add_txn(&conn, "2025-02-20", -300.0, "repairs", "rental", "maple_st", "", "");
        add_txn(&conn, "2025-03-01", -50.0, "bankfees", "personal", "", "", "");
        let summary = rental_summary(&conn, 2025).unwrap();
        let maple = &summary["maple_st"];
        assert_eq!(maple["rent"], 2400.0);
        assert_eq!(maple["repairs"], -300.0);
        assert!(!summary.contains_key(""));
    }

    #[test]
    fn test_rental_summary_group_fans_out_full_credit() {
        let (_dir, conn) = test_db();
        conn.execute(
            "INSERT INTO groups (name, property_list) VALUES ('downtown', '[\"unit_a\",\"unit_b\"]')",
            [],
        )
        .unwrap();
        add_txn(&conn, "2025-04-01", -600.0, "insurance", "rental", "", "downtown", "");
        let summary = rental_summary(&conn, 2025).unwrap();
        assert_eq!(summary["unit_a"]["insurance"], -600.0);
        assert_eq!(summary["unit_b"]["insurance"], -600.0);
    }

    #[test]
    fn test_rental_summary_ignores_other_years() {
        let (_dir, conn) = test_db();
        add_txn(&conn, "2024-12-31", 1200.0, "rent", "rental", "maple_st", "", "");
        let summary = rental_summary(&conn, 2025).unwrap();
        assert!(summary.get("maple_st").map_or(true, |m| !m.contains_key("rent")));
    }

    #[test]
    fn test_depreciation_full_year() {
        let (_dir, conn) = test_db();
        conn.execute(
            "INSERT INTO properties (name, cost, renovation, purchase_date) \
             VALUES ('maple_st', 100000, 10000, '2020-06-15')",
            [],
        )
        .unwrap();
        let summary = rental_summary(&conn, 2025).unwrap();
        // (100000 + 10000) * 3.64% = 4004, stored negative
        assert_eq!(summary["maple_st"]["depreciation"], -4004.0);
    }

    #[test]
    fn test_depreciation_prorated_in_purchase_year() {
        let (_dir, conn) = test_db();
        conn.execute(
            "INSERT INTO properties (name, cost, renovation, purchase_date) \
             VALUES ('oak_ave', 100000, 0, '2025-07-01')",
            [],
        )
        .unwrap();
        let summary = rental_summary(&conn, 2025).unwrap();
        // Jul 1 to Dec 31 inclusive = 184 days
        let expected = -round2(3640.0 * 184.0 / 365.0);
        assert_eq!(summary["oak_ave"]["depreciation"], expected);
    }

    #[test]
    fn test_company_summary() {
        let (_dir, conn) = test_db();
        add_txn(&conn, "2025-01-10", 5000.0, "management", "company", "", "", "acme_llc");
        add_txn(&conn, "2025-02-10", -1200.0, "insurance", "company", "", "", "acme_llc");
        add_txn(&conn, "2025-02-11", 900.0, "rent", "rental", "maple_st", "", "");
        let summary = company_summary(&conn, 2025).unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary["acme_llc"]["management"], 5000.0);
        assert_eq!(summary["acme_llc"]["insurance"], -1200.0);
    }

    #[test]
    fn test_rent_tracker_months_and_group_split() {
        let (_dir, conn) = test_db();
        conn.execute(
            "INSERT INTO groups (name, property_list) VALUES ('downtown', '[\"unit_a\",\"unit_b\"]')",
            [],
        )
        .unwrap();
        add_txn(&conn, "2025-01-03", 1200.0, "rent", "rental", "maple_st", "", "");
        add_txn(&conn, "2025-01-15", 100.0, "tenantfees", "rental", "maple_st", "", "");
        add_txn(&conn, "2025-02-03", 2000.0, "rent", "rental", "", "downtown", "");
        add_txn(&conn, "2025-02-28", -300.0, "repairs", "rental", "maple_st", "", "");
        let rows = rent_tracker(&conn, 2025).unwrap();
        assert_eq!(rows.len(), 3);
        let maple = rows.iter().find(|r| r.property == "maple_st").unwrap();
        assert_eq!(maple.monthly[0], 1300.0);
        assert_eq!(maple.monthly[1], 0.0); // repairs excluded
        assert_eq!(maple.total, 1300.0);
        let unit_a = rows.iter().find(|r| r.property == "unit_a").unwrap();
        assert_eq!(unit_a.monthly[1], 1000.0); // split evenly across the group
    }
}

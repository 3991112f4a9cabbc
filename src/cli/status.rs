use crate::db::get_connection;
use crate::error::Result;
use crate::settings::{db_path, load_settings};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db = db_path();

    println!("Data dir:     {}", settings.data_dir);
    println!("Database:     {}", db.display());
    println!("Report year:  {}", settings.report_year);

    if db.exists() {
        let conn = get_connection(&db)?;

        let count = |sql: &str| -> Result<i64> {
            Ok(conn.query_row(sql, [], |r| r.get(0))?)
        };
        let accounts = count("SELECT count(*) FROM bank_accounts")?;
        let properties = count("SELECT count(*) FROM properties")?;
        let companies = count("SELECT count(*) FROM companies")?;
        let transactions = count("SELECT count(*) FROM transactions")?;
        let manual = count("SELECT count(*) FROM transactions WHERE from_addendum = 1")?;
        let unclassified =
            count("SELECT count(*) FROM transactions WHERE transaction_type = ''")?;
        let bank_rules = count("SELECT count(*) FROM bank_rules")?;
        let common_rules = count("SELECT count(*) FROM common_rules")?;

        println!();
        println!("Accounts:      {accounts}");
        println!("Properties:    {properties}");
        println!("Companies:     {companies}");
        println!("Transactions:  {transactions} ({manual} manual, {unclassified} unclassified)");
        println!("Rules:         {bank_rules} per-account, {common_rules} common");
    } else {
        println!();
        println!("Database not found. Run `rentbooks init` to set up.");
    }

    Ok(())
}

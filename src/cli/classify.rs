use crate::classifier::{classify_account, classify_all};
use crate::db::{account_id, get_connection};
use crate::error::Result;
use crate::settings::db_path;

pub fn run(account: Option<&str>) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let result = match account {
        Some(name) => {
            let acct = account_id(&conn, name)?;
            classify_account(&conn, acct)?
        }
        None => classify_all(&conn)?,
    };
    println!(
        "{} classified, {} unmatched",
        result.classified, result.unmatched
    );
    Ok(())
}

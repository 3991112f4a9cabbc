use colored::Colorize;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    std::fs::create_dir_all(&settings.data_dir)?;
    save_settings(&settings)?;

    let db_path = std::path::PathBuf::from(&settings.data_dir).join("rentbooks.db");
    let conn = get_connection(&db_path)?;
    init_db(&conn)?;

    println!("{} {}", "Database ready:".green(), db_path.display());
    println!("Next: add a bank format (`rentbooks banks add`) and an account (`rentbooks accounts add`).");
    Ok(())
}
